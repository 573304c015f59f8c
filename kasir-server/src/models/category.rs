//! Category models

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use kasir_db::{ColumnMap, FromColumns, Lazy};
use serde::{Deserialize, Serialize};

use super::time::to_local;

/// Row of the `categories` table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FromColumns for Category {
    fn column_map() -> &'static ColumnMap<Self> {
        static MAP: Lazy<ColumnMap<Category>> = Lazy::new(|| {
            ColumnMap::new()
                .column("id", |c: &mut Category| &mut c.id)
                .column("name", |c: &mut Category| &mut c.name)
                .column("description", |c: &mut Category| &mut c.description)
                .column("created_at", |c: &mut Category| &mut c.created_at)
                .column("updated_at", |c: &mut Category| &mut c.updated_at)
        });
        &MAP
    }
}

/// Body of `POST /categories` and `PUT /categories/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CategoryRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Category as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Tz>,
    pub updated_at: DateTime<Tz>,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            description: c.description,
            created_at: to_local(c.created_at),
            updated_at: to_local(c.updated_at),
        }
    }
}
