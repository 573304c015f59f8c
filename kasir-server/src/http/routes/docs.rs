//! API reference
//!
//! `/docs` serves a Scalar page that renders the OpenAPI document served at
//! `/docs/openapi.json`.

use axum::{response::Html, routing::get, Json, Router};
use once_cell::sync::Lazy;
use serde_json::{json, Value};

const DOCS_PAGE: &str = r#"<!doctype html>
<html>
  <head>
    <title>Kasir API</title>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
  </head>
  <body>
    <script id="api-reference" data-url="/api/docs/openapi.json"></script>
    <script>
      document.getElementById("api-reference").dataset.configuration =
        JSON.stringify({ darkMode: true });
    </script>
    <script src="https://cdn.jsdelivr.net/npm/@scalar/api-reference"></script>
  </body>
</html>
"#;

fn envelope(data: Option<Value>) -> Value {
    let mut properties = json!({
        "code": { "type": "string", "example": "1000" },
        "message": { "type": "string" }
    });
    if let (Some(data), Some(map)) = (data, properties.as_object_mut()) {
        map.insert("data".to_string(), data);
    }
    json!({ "type": "object", "required": ["code", "message"], "properties": properties })
}

fn reply(description: &str, data: Option<Value>) -> Value {
    json!({
        "description": description,
        "content": { "application/json": { "schema": envelope(data) } }
    })
}

fn schema(name: &str) -> Value {
    json!({ "$ref": format!("#/components/schemas/{name}") })
}

fn id_param(noun: &str) -> Value {
    json!([{
        "name": "id",
        "in": "path",
        "required": true,
        "description": format!("{noun} id"),
        "schema": { "type": "integer", "format": "int64" }
    }])
}

fn body(name: &str) -> Value {
    json!({ "required": true, "content": { "application/json": { "schema": schema(name) } } })
}

fn health_op(tag: &str, summary: &str) -> Value {
    json!({ "get": {
        "tags": [tag],
        "summary": summary,
        "responses": {
            "200": reply("Healthy", None),
            "503": reply("Not healthy", None)
        }
    }})
}

/// Collection and item paths for one resource
fn crud_paths(tag: &str, noun: &str, response: &str, request: &str) -> (Value, Value) {
    let collection = json!({
        "get": {
            "tags": [tag],
            "summary": format!("List {tag}"),
            "responses": {
                "200": reply("Retrieved", Some(json!({ "type": "array", "items": schema(response) }))),
                "500": reply("Retrieval failed", None)
            }
        },
        "post": {
            "tags": [tag],
            "summary": format!("Create a {noun}"),
            "requestBody": body(request),
            "responses": {
                "201": reply("Created", None),
                "400": reply("Invalid request", None),
                "404": reply("Referenced row not found", None),
                "500": reply("Creation failed", None)
            }
        }
    });

    let item = json!({
        "get": {
            "tags": [tag],
            "summary": format!("Get a {noun}"),
            "parameters": id_param(noun),
            "responses": {
                "200": reply("Retrieved", Some(schema(response))),
                "400": reply("Invalid id", None),
                "404": reply("Not found", None),
                "500": reply("Retrieval failed", None)
            }
        },
        "put": {
            "tags": [tag],
            "summary": format!("Update a {noun}"),
            "parameters": id_param(noun),
            "requestBody": body(request),
            "responses": {
                "200": reply("Updated", None),
                "400": reply("Invalid id or request", None),
                "404": reply("Not found", None),
                "500": reply("Update failed", None)
            }
        },
        "delete": {
            "tags": [tag],
            "summary": format!("Delete a {noun}"),
            "parameters": id_param(noun),
            "responses": {
                "200": reply("Deleted", None),
                "400": reply("Invalid id", None),
                "404": reply("Not found", None),
                "500": reply("Deletion failed", None)
            }
        }
    });

    (collection, item)
}

static OPENAPI: Lazy<Value> = Lazy::new(|| {
    let (categories, category) =
        crud_paths("categories", "category", "CategoryResponse", "CategoryRequest");
    let (products, product) = crud_paths("products", "product", "ProductResponse", "ProductRequest");
    let timestamp = json!({ "type": "string", "format": "date-time" });

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "Kasir API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Products and categories for a point of sale"
        },
        "servers": [{ "url": "/api" }],
        "paths": {
            "/health/service": health_op("healthcheck", "Health of the API"),
            "/health/db": health_op("healthcheck", "Health of the database connection"),
            "/categories/health": health_op("categories", "Health of the categories API"),
            "/products/health": health_op("products", "Health of the products API"),
            "/categories": categories,
            "/categories/{id}": category,
            "/products": products,
            "/products/{id}": product
        },
        "components": { "schemas": {
            "CategoryRequest": {
                "type": "object",
                "required": ["name"],
                "properties": {
                    "name": { "type": "string" },
                    "description": { "type": "string" }
                }
            },
            "CategoryResponse": {
                "type": "object",
                "properties": {
                    "id": { "type": "integer", "format": "int64" },
                    "name": { "type": "string" },
                    "description": { "type": "string" },
                    "created_at": timestamp,
                    "updated_at": timestamp
                }
            },
            "ProductRequest": {
                "type": "object",
                "required": ["name", "price", "stock", "category_id"],
                "properties": {
                    "name": { "type": "string" },
                    "price": { "type": "integer", "format": "int64" },
                    "stock": { "type": "integer", "format": "int64" },
                    "category_id": { "type": "integer", "format": "int64" }
                }
            },
            "ProductResponse": {
                "type": "object",
                "properties": {
                    "id": { "type": "integer", "format": "int64" },
                    "name": { "type": "string" },
                    "price": { "type": "integer", "format": "int64" },
                    "stock": { "type": "integer", "format": "int64" },
                    "category_id": { "type": "integer", "format": "int64" },
                    "category_name": { "type": "string" },
                    "created_at": timestamp,
                    "updated_at": timestamp
                }
            }
        }}
    })
});

/// GET /docs
async fn docs_page() -> Html<&'static str> {
    Html(DOCS_PAGE)
}

/// GET /docs/openapi.json
async fn openapi() -> Json<Value> {
    Json(OPENAPI.clone())
}

/// Documentation routes
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/docs", get(docs_page))
        .route("/docs/openapi.json", get(openapi))
}
