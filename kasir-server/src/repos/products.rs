//! Product repository
//!
//! Reads join `categories` so every product carries its category's name.

use async_trait::async_trait;
use kasir_db::{Db, DbError, Value};

use crate::models::{Category, ProductRequest, ProductWithCategory};

use super::categories::SELECT_CATEGORY_BY_ID;

pub(crate) const INSERT_PRODUCT: &str = "INSERT INTO products (name, price, stock, category_id, created_at, updated_at) VALUES ($1, $2, $3, $4, now(), now())";
pub(crate) const UPDATE_PRODUCT: &str = "UPDATE products SET name = $1, price = $2, stock = $3, category_id = $4, updated_at = now() WHERE id = $5";
pub(crate) const DELETE_PRODUCT: &str = "DELETE FROM products WHERE id = $1";
pub(crate) const SELECT_PRODUCTS: &str = "SELECT products.id, products.name, products.price, products.stock, products.created_at, products.updated_at, categories.id as category_id, categories.name as category_name FROM products JOIN categories ON products.category_id = categories.id";
pub(crate) const SELECT_PRODUCT_BY_ID: &str = "SELECT products.id, products.name, products.price, products.stock, products.created_at, products.updated_at, categories.id as category_id, categories.name as category_name FROM products JOIN categories ON products.category_id = categories.id WHERE products.id = $1";

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create_product(&self, product: &ProductRequest) -> Result<(), DbError>;

    async fn update_product(&self, id: i64, product: &ProductRequest) -> Result<(), DbError>;

    async fn delete_product(&self, id: i64) -> Result<(), DbError>;

    /// `None` when no product has this id
    async fn get_product_by_id(&self, id: i64) -> Result<Option<ProductWithCategory>, DbError>;

    async fn get_all_products(&self) -> Result<Vec<ProductWithCategory>, DbError>;

    /// Lookup of the category a product refers to
    async fn get_category_by_id(&self, id: i64) -> Result<Option<Category>, DbError>;
}

pub struct DbProductRepository {
    db: Db,
}

impl DbProductRepository {
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

fn product_args(product: &ProductRequest) -> Vec<Value> {
    vec![
        Value::from(product.name.as_str()),
        Value::from(product.price),
        Value::from(product.stock),
        Value::from(product.category_id),
    ]
}

/// Single-row lookup where an empty result means "absent". Callers also
/// treat a row with id 0 as absent, matching the category repository.
fn optional<T>(result: Result<T, DbError>) -> Result<Option<T>, DbError> {
    match result {
        Ok(row) => Ok(Some(row)),
        Err(e) if e.is_no_rows() => Ok(None),
        Err(e) => Err(e),
    }
}

#[async_trait]
impl ProductRepository for DbProductRepository {
    async fn create_product(&self, product: &ProductRequest) -> Result<(), DbError> {
        let args = product_args(product);
        self.db
            .with_tx(move |tx| {
                Box::pin(async move {
                    tx.with_stmt(INSERT_PRODUCT, move |stmt| {
                        Box::pin(async move { stmt.exec(&args).await.map(|_| ()) })
                    })
                    .await
                })
            })
            .await
    }

    async fn update_product(&self, id: i64, product: &ProductRequest) -> Result<(), DbError> {
        let mut args = product_args(product);
        args.push(Value::from(id));
        self.db
            .with_tx(move |tx| {
                Box::pin(async move {
                    tx.with_stmt(UPDATE_PRODUCT, move |stmt| {
                        Box::pin(async move { stmt.exec(&args).await.map(|_| ()) })
                    })
                    .await
                })
            })
            .await
    }

    async fn delete_product(&self, id: i64) -> Result<(), DbError> {
        self.db
            .with_tx(move |tx| {
                Box::pin(async move {
                    tx.with_stmt(DELETE_PRODUCT, move |stmt| {
                        Box::pin(async move { stmt.exec(&[Value::from(id)]).await.map(|_| ()) })
                    })
                    .await
                })
            })
            .await
    }

    async fn get_product_by_id(&self, id: i64) -> Result<Option<ProductWithCategory>, DbError> {
        let product: Option<ProductWithCategory> =
            optional(self.db.query_row(SELECT_PRODUCT_BY_ID, vec![Value::from(id)]).await)?;
        Ok(product.filter(|p| p.id != 0))
    }

    async fn get_all_products(&self) -> Result<Vec<ProductWithCategory>, DbError> {
        self.db
            .with_stmt(SELECT_PRODUCTS, |stmt| {
                Box::pin(async move {
                    let mut products: Vec<ProductWithCategory> = Vec::new();
                    stmt.query::<_, DbError>(&[], |rows| rows.scan_append(&mut products))
                        .await?;
                    Ok(products)
                })
            })
            .await
    }

    async fn get_category_by_id(&self, id: i64) -> Result<Option<Category>, DbError> {
        let category: Option<Category> =
            optional(self.db.query_row(SELECT_CATEGORY_BY_ID, vec![Value::from(id)]).await)?;
        Ok(category.filter(|c| c.id != 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use kasir_db::testing::{MockConnector, Script, ScriptedQuery};

    const COLUMNS: [&str; 8] = [
        "id",
        "name",
        "price",
        "stock",
        "created_at",
        "updated_at",
        "category_id",
        "category_name",
    ];

    fn product_row(id: i64, name: &str) -> Vec<Value> {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        vec![
            Value::Int(id),
            Value::from(name),
            Value::Int(3500),
            Value::Int(20),
            Value::Timestamp(ts),
            Value::Timestamp(ts),
            Value::Int(2),
            Value::from("Minuman"),
        ]
    }

    fn repo(script: Script) -> (DbProductRepository, MockConnector) {
        let conn = MockConnector::new(script);
        (DbProductRepository::new(Db::new(conn.clone())), conn)
    }

    fn request() -> ProductRequest {
        ProductRequest {
            name: "Teh".into(),
            price: 3500,
            stock: 20,
            category_id: 2,
        }
    }

    #[tokio::test]
    async fn create_binds_fields_in_column_order() {
        let (repo, conn) = repo(Script::new());
        repo.create_product(&request()).await.unwrap();

        let activity = conn.activity();
        assert_eq!(activity.execs[0].0, INSERT_PRODUCT);
        assert_eq!(
            activity.execs[0].1,
            vec![
                Value::from("Teh"),
                Value::Int(3500),
                Value::Int(20),
                Value::Int(2)
            ]
        );
        assert_eq!(activity.commits, 1);
    }

    #[tokio::test]
    async fn update_and_delete_bind_the_id() {
        let (repo, conn) = repo(Script::new());
        repo.update_product(9, &request()).await.unwrap();
        repo.delete_product(9).await.unwrap();

        let activity = conn.activity();
        assert_eq!(activity.execs[0].1[4], Value::Int(9));
        assert_eq!(activity.execs[1], (DELETE_PRODUCT.to_string(), vec![Value::Int(9)]));
        assert_eq!(activity.commits, 2);
    }

    #[tokio::test]
    async fn exec_error_rolls_back() {
        let script = Script::new().with_query(INSERT_PRODUCT, ScriptedQuery::new(&[]).exec_err("exec"));
        let (repo, conn) = repo(script);
        assert_eq!(repo.create_product(&request()).await.unwrap_err().to_string(), "exec");
        assert_eq!(conn.activity().rollbacks, 1);
    }

    #[tokio::test]
    async fn get_by_id_flattens_category() {
        let query = ScriptedQuery::new(&COLUMNS).row(product_row(5, "Teh"));
        let (repo, _) = repo(Script::new().with_query(SELECT_PRODUCT_BY_ID, query));

        let product = repo.get_product_by_id(5).await.unwrap().unwrap();
        assert_eq!(product.category.id, 2);
        assert_eq!(product.category.name, "Minuman");
    }

    #[tokio::test]
    async fn get_by_id_missing_is_none() {
        let (repo, _) = repo(Script::new().with_query(SELECT_PRODUCT_BY_ID, ScriptedQuery::new(&COLUMNS)));
        assert_eq!(repo.get_product_by_id(5).await.unwrap(), None);
    }

    #[tokio::test]
    async fn get_by_id_passes_query_error() {
        let query = ScriptedQuery::new(&COLUMNS).query_err("query");
        let (repo, _) = repo(Script::new().with_query(SELECT_PRODUCT_BY_ID, query));
        assert_eq!(repo.get_product_by_id(5).await.unwrap_err().to_string(), "query");
    }

    #[tokio::test]
    async fn get_by_id_treats_zero_id_as_missing() {
        let query = ScriptedQuery::new(&COLUMNS).row(product_row(0, "Ghost"));
        let (repo, _) = repo(Script::new().with_query(SELECT_PRODUCT_BY_ID, query));
        assert_eq!(repo.get_product_by_id(0).await.unwrap(), None);
    }

    #[tokio::test]
    async fn get_all_maps_every_row() {
        let query = ScriptedQuery::new(&COLUMNS)
            .row(product_row(1, "Teh"))
            .row(product_row(2, "Kopi"));
        let (repo, _) = repo(Script::new().with_query(SELECT_PRODUCTS, query));
        let products = repo.get_all_products().await.unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[1].name, "Kopi");
    }

    #[tokio::test]
    async fn get_all_reports_missing_columns() {
        let query = ScriptedQuery::new(&["id"]).row(vec![Value::Int(1)]);
        let (repo, _) = repo(Script::new().with_query(SELECT_PRODUCTS, query));
        let err = repo.get_all_products().await.unwrap_err();
        assert_eq!(err.to_string(), "Could not find column 'name'.");
    }

    #[tokio::test]
    async fn category_lookup() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let query = ScriptedQuery::new(&["id", "name", "description", "created_at", "updated_at"]).row(vec![
            Value::Int(2),
            Value::from("Minuman"),
            Value::from(""),
            Value::Timestamp(ts),
            Value::Timestamp(ts),
        ]);
        let (repo, _) = repo(Script::new().with_query(SELECT_CATEGORY_BY_ID, query));

        assert_eq!(repo.get_category_by_id(2).await.unwrap().unwrap().name, "Minuman");
    }

    #[tokio::test]
    async fn category_lookup_treats_zero_id_as_missing() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let query = ScriptedQuery::new(&["id", "name", "description", "created_at", "updated_at"]).row(vec![
            Value::Int(0),
            Value::from("Ghost"),
            Value::from(""),
            Value::Timestamp(ts),
            Value::Timestamp(ts),
        ]);
        let (repo, _) = repo(Script::new().with_query(SELECT_CATEGORY_BY_ID, query));

        assert_eq!(repo.get_category_by_id(0).await.unwrap(), None);
    }
}
