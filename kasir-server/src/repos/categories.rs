//! Category repository

use async_trait::async_trait;
use kasir_db::{Db, DbError, Value};

use crate::models::{Category, CategoryRequest};

pub(crate) const INSERT_CATEGORY: &str =
    "INSERT INTO categories (name, description, created_at, updated_at) VALUES ($1, $2, now(), now())";
pub(crate) const UPDATE_CATEGORY: &str =
    "UPDATE categories SET name = $1, description = $2, updated_at = now() WHERE id = $3";
pub(crate) const DELETE_CATEGORY: &str = "DELETE FROM categories WHERE id = $1";
pub(crate) const SELECT_CATEGORIES: &str =
    "SELECT id, name, description, created_at, updated_at FROM categories";
pub(crate) const SELECT_CATEGORY_BY_ID: &str =
    "SELECT id, name, description, created_at, updated_at FROM categories WHERE id = $1";

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create_category(&self, category: &CategoryRequest) -> Result<(), DbError>;

    async fn update_category(&self, id: i64, category: &CategoryRequest) -> Result<(), DbError>;

    async fn delete_category(&self, id: i64) -> Result<(), DbError>;

    /// `None` when no category has this id
    async fn get_category_by_id(&self, id: i64) -> Result<Option<Category>, DbError>;

    async fn get_all_categories(&self) -> Result<Vec<Category>, DbError>;
}

pub struct DbCategoryRepository {
    db: Db,
}

impl DbCategoryRepository {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    async fn write(&self, query: &'static str, args: Vec<Value>) -> Result<(), DbError> {
        self.db
            .with_tx(move |tx| {
                Box::pin(async move {
                    tx.with_stmt(query, move |stmt| {
                        Box::pin(async move { stmt.exec(&args).await.map(|_| ()) })
                    })
                    .await
                })
            })
            .await
    }
}

#[async_trait]
impl CategoryRepository for DbCategoryRepository {
    async fn create_category(&self, category: &CategoryRequest) -> Result<(), DbError> {
        let args = vec![
            Value::from(category.name.as_str()),
            Value::from(category.description.as_str()),
        ];
        self.write(INSERT_CATEGORY, args).await
    }

    async fn update_category(&self, id: i64, category: &CategoryRequest) -> Result<(), DbError> {
        let args = vec![
            Value::from(category.name.as_str()),
            Value::from(category.description.as_str()),
            Value::from(id),
        ];
        self.write(UPDATE_CATEGORY, args).await
    }

    async fn delete_category(&self, id: i64) -> Result<(), DbError> {
        self.write(DELETE_CATEGORY, vec![Value::from(id)]).await
    }

    async fn get_category_by_id(&self, id: i64) -> Result<Option<Category>, DbError> {
        let args = vec![Value::from(id)];
        let category = self
            .db
            .with_stmt::<_, _, DbError>(SELECT_CATEGORY_BY_ID, move |stmt| {
                Box::pin(async move {
                    let mut category = Category::default();
                    stmt.query::<_, DbError>(&args, |rows| rows.scan(&mut category))
                        .await?;
                    Ok(category)
                })
            })
            .await?;

        // An empty result leaves the id at zero, so a stored id of 0 also
        // reads as missing.
        Ok((category.id != 0).then_some(category))
    }

    async fn get_all_categories(&self) -> Result<Vec<Category>, DbError> {
        self.db.query_all(SELECT_CATEGORIES, Vec::new()).await
    }
}
