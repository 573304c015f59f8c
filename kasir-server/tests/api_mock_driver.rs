//! Full stack tests: router, services and repositories over the scripted driver

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{TimeZone, Utc};
use kasir_db::testing::{MockConnector, Script, ScriptedQuery};
use kasir_db::{Db, Value};
use kasir_server::{build_router, AppState};
use serde_json::Value as Json;
use tower::ServiceExt;

const CATEGORY_BY_ID: &str =
    "SELECT id, name, description, created_at, updated_at FROM categories WHERE id = $1";
const INSERT_PRODUCT: &str = "INSERT INTO products (name, price, stock, category_id, created_at, updated_at) VALUES ($1, $2, $3, $4, now(), now())";
const PRODUCTS: &str = "SELECT products.id, products.name, products.price, products.stock, products.created_at, products.updated_at, categories.id as category_id, categories.name as category_name FROM products JOIN categories ON products.category_id = categories.id";

fn category_query() -> ScriptedQuery {
    ScriptedQuery::new(&["id", "name", "description", "created_at", "updated_at"])
}

fn app(script: Script) -> (Router, MockConnector) {
    let conn = MockConnector::new(script);
    let db = Db::new(conn.clone()).with_logging(true);
    (build_router(AppState::from_db(db), false), conn)
}

async fn send(app: Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Json) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app.oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn create_product_checks_category_then_commits() {
    let ts = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    let script = Script::new().with_query(
        CATEGORY_BY_ID,
        category_query().row(vec![
            Value::Int(2),
            Value::from("Minuman"),
            Value::from(""),
            Value::Timestamp(ts),
            Value::Timestamp(ts),
        ]),
    );
    let (app, conn) = app(script);

    let body = r#"{"name":"Teh","price":3500,"stock":20,"category_id":2}"#;
    let (status, json) = send(app, "POST", "/api/products", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["message"], "Product created successfully");

    let activity = conn.activity();
    assert_eq!(activity.queries[0].1, vec![Value::Int(2)]);
    assert_eq!(activity.execs[0].0, INSERT_PRODUCT);
    assert_eq!((activity.begins, activity.commits), (1, 1));
    assert_eq!(activity.prepared.len(), activity.closed_stmts);
}

#[tokio::test]
async fn create_product_with_unknown_category_writes_nothing() {
    let (app, conn) = app(Script::new().with_query(CATEGORY_BY_ID, category_query()));

    let body = r#"{"name":"Teh","price":3500,"stock":20,"category_id":9}"#;
    let (status, json) = send(app, "POST", "/api/products", Some(body)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "2000");
    assert_eq!(json["message"], "Product created failed: category not found");

    let activity = conn.activity();
    assert_eq!(activity.begins, 0);
    assert!(activity.execs.is_empty());
}

#[tokio::test]
async fn list_products_returns_local_timestamps() {
    let ts = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    let query = ScriptedQuery::new(&[
        "id",
        "name",
        "price",
        "stock",
        "created_at",
        "updated_at",
        "category_id",
        "category_name",
    ])
    .row(vec![
        Value::Int(1),
        Value::from("Teh"),
        Value::Int(3500),
        Value::Int(20),
        Value::Timestamp(ts),
        Value::Timestamp(ts),
        Value::Int(2),
        Value::from("Minuman"),
    ]);
    let (app, _) = app(Script::new().with_query(PRODUCTS, query));

    let (status, json) = send(app, "GET", "/api/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Products retrieved successfully");
    let product = &json["data"][0];
    assert_eq!(product["category_name"], "Minuman");
    assert_eq!(product["created_at"], "2024-01-02T07:00:00+07:00");
}

#[tokio::test]
async fn database_health_follows_ping() {
    let (down, _) = app(Script::new().ping_err("connection refused"));
    let (status, json) = send(down, "GET", "/api/health/db", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        json["message"],
        "Connection to Kasir Database is not healthy because connection refused"
    );

    let (up, _) = app(Script::new());
    let (status, _) = send(up, "GET", "/api/health/db", None).await;
    assert_eq!(status, StatusCode::OK);
}
