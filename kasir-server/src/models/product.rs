//! Product models
//!
//! Products are always read joined with their category, so the row type
//! nests a [`CategoryRef`] whose columns come from the join.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use kasir_db::{ColumnMap, FromColumns, Lazy};
use serde::{Deserialize, Serialize};

use super::time::to_local;

/// Category columns of a joined product row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryRef {
    pub id: i64,
    pub name: String,
}

impl FromColumns for CategoryRef {
    fn column_map() -> &'static ColumnMap<Self> {
        static MAP: Lazy<ColumnMap<CategoryRef>> = Lazy::new(|| {
            ColumnMap::new()
                .column("category_id", |c: &mut CategoryRef| &mut c.id)
                .column("category_name", |c: &mut CategoryRef| &mut c.name)
        });
        &MAP
    }
}

/// Row of `products JOIN categories`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductWithCategory {
    pub id: i64,
    pub name: String,
    pub price: i64,
    pub stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub category: CategoryRef,
}

impl FromColumns for ProductWithCategory {
    fn column_map() -> &'static ColumnMap<Self> {
        static MAP: Lazy<ColumnMap<ProductWithCategory>> = Lazy::new(|| {
            ColumnMap::new()
                .column("id", |p: &mut ProductWithCategory| &mut p.id)
                .column("name", |p: &mut ProductWithCategory| &mut p.name)
                .column("price", |p: &mut ProductWithCategory| &mut p.price)
                .column("stock", |p: &mut ProductWithCategory| &mut p.stock)
                .column("created_at", |p: &mut ProductWithCategory| &mut p.created_at)
                .column("updated_at", |p: &mut ProductWithCategory| &mut p.updated_at)
                .nest(
                    |p: &mut ProductWithCategory| &mut p.category,
                    CategoryRef::column_map(),
                )
        });
        &MAP
    }
}

/// Body of `POST /products` and `PUT /products/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProductRequest {
    pub name: String,
    pub price: i64,
    pub stock: i64,
    pub category_id: i64,
}

/// Product as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductResponse {
    pub id: i64,
    pub name: String,
    pub price: i64,
    pub stock: i64,
    pub category_id: i64,
    pub category_name: String,
    pub created_at: DateTime<Tz>,
    pub updated_at: DateTime<Tz>,
}

impl From<ProductWithCategory> for ProductResponse {
    fn from(p: ProductWithCategory) -> Self {
        Self {
            id: p.id,
            name: p.name,
            price: p.price,
            stock: p.stock,
            category_id: p.category.id,
            category_name: p.category.name,
            created_at: to_local(p.created_at),
            updated_at: to_local(p.updated_at),
        }
    }
}
