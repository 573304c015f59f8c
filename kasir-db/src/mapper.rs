//! Column mapper
//!
//! A [`ColumnMap<T>`] is an explicit list of `(tag, setter)` pairs. Tags are
//! matched against the live result's column names, not against Rust field
//! names. A type registers its map once through [`FromColumns`]:
//!
//! ```ignore
//! impl FromColumns for Category {
//!     fn column_map() -> &'static ColumnMap<Self> {
//!         static MAP: Lazy<ColumnMap<Category>> = Lazy::new(|| {
//!             ColumnMap::new()
//!                 .column("id", |c: &mut Category| &mut c.id)
//!                 .column("name", |c: &mut Category| &mut c.name)
//!         });
//!         &MAP
//!     }
//! }
//! ```
//!
//! Joined projections flatten a nested type's map into the parent with
//! [`ColumnMap::nest`]. Positional decoding into tuples goes through
//! [`FromValues`].

use std::fmt;
use std::sync::Arc;

use crate::error::{DbError, Result};
use crate::value::{DecodeError, FromValue, Value};

type Setter<T> = Arc<dyn Fn(&mut T, &Value) -> std::result::Result<(), DecodeError> + Send + Sync>;

struct Field<T> {
    tag: &'static str,
    set: Setter<T>,
}

/// Tagged field setters for one destination type
pub struct ColumnMap<T> {
    fields: Vec<Field<T>>,
}

impl<T> Default for ColumnMap<T> {
    fn default() -> Self {
        Self { fields: Vec::new() }
    }
}

impl<T> fmt::Debug for ColumnMap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnMap")
            .field("tags", &self.tags().collect::<Vec<_>>())
            .finish()
    }
}

impl<T: 'static> ColumnMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map column `tag` onto the field returned by `access`.
    pub fn column<V, F>(mut self, tag: &'static str, access: F) -> Self
    where
        V: FromValue + 'static,
        F: Fn(&mut T) -> &mut V + Send + Sync + 'static,
    {
        let set: Setter<T> = Arc::new(move |dest: &mut T, value: &Value| {
            *access(dest) = V::from_value(value)?;
            Ok(())
        });
        self.fields.push(Field { tag, set });
        self
    }

    /// Flatten every field of `inner` into this map, reached through `project`.
    ///
    /// Only the nested map's own fields are carried over, so nesting is one
    /// level deep per call.
    pub fn nest<U, F>(mut self, project: F, inner: &ColumnMap<U>) -> Self
    where
        U: 'static,
        F: Fn(&mut T) -> &mut U + Send + Sync + 'static,
    {
        let project = Arc::new(project);
        for field in &inner.fields {
            let set = Arc::clone(&field.set);
            let project = Arc::clone(&project);
            self.fields.push(Field {
                tag: field.tag,
                set: Arc::new(move |dest: &mut T, value: &Value| set(project(dest), value)),
            });
        }
        self
    }
}

impl<T> ColumnMap<T> {
    /// Tags in declaration order
    pub fn tags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.tag)
    }

    /// Resolve fields against `columns` in one left-to-right pass.
    ///
    /// The returned plan is aligned with `columns`: slot `i` holds the
    /// index of the field that receives column `i`, or `None` when no field
    /// claims it. When two fields share a tag the first declared keeps the
    /// column.
    pub fn plan(&self, columns: &[String]) -> Result<Vec<Option<usize>>> {
        let mut plan = vec![None; columns.len()];
        for (idx, field) in self.fields.iter().enumerate() {
            let col = find(columns, field.tag)
                .ok_or_else(|| DbError::ColumnNotFound(field.tag.to_owned()))?;
            if plan[col].is_none() {
                plan[col] = Some(idx);
            }
        }
        Ok(plan)
    }

    /// Map one row of `values` onto `dest`.
    ///
    /// A row shorter than `columns` reads as NULL for the missing tail.
    pub fn apply(&self, dest: &mut T, columns: &[String], values: &[Value]) -> Result<()> {
        let plan = self.plan(columns)?;
        for (col, slot) in plan.into_iter().enumerate() {
            let Some(idx) = slot else { continue };
            let value = values.get(col).unwrap_or(&Value::Null);
            (self.fields[idx].set)(dest, value).map_err(|source| DbError::Decode {
                column: columns[col].clone(),
                source,
            })?;
        }
        Ok(())
    }
}

/// Position of `name` in `columns`
pub fn find(columns: &[String], name: &str) -> Option<usize> {
    columns.iter().position(|c| c == name)
}

/// Types with a registered column map
pub trait FromColumns: Default + Sized + 'static {
    fn column_map() -> &'static ColumnMap<Self>;
}

/// Positional decoding of a whole row
pub trait FromValues: Sized {
    fn from_values(columns: &[String], values: &[Value]) -> Result<Self>;
}

fn decode_at<V: FromValue>(columns: &[String], values: &[Value], idx: usize) -> Result<V> {
    V::from_value(&values[idx]).map_err(|source| DbError::Decode {
        column: columns.get(idx).cloned().unwrap_or_else(|| idx.to_string()),
        source,
    })
}

macro_rules! impl_from_values {
    ($len:expr; $($idx:tt => $ty:ident),+) => {
        impl<$($ty: FromValue),+> FromValues for ($($ty,)+) {
            fn from_values(columns: &[String], values: &[Value]) -> Result<Self> {
                if values.len() != $len {
                    return Err(DbError::ColumnCount { expected: values.len(), got: $len });
                }
                Ok(($(decode_at::<$ty>(columns, values, $idx)?,)+))
            }
        }
    };
}

impl_from_values!(1; 0 => A);
impl_from_values!(2; 0 => A, 1 => B);
impl_from_values!(3; 0 => A, 1 => B, 2 => C);
impl_from_values!(4; 0 => A, 1 => B, 2 => C, 3 => D);
impl_from_values!(5; 0 => A, 1 => B, 2 => C, 3 => D, 4 => E);
impl_from_values!(6; 0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F);
impl_from_values!(7; 0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F, 6 => G);
impl_from_values!(8; 0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F, 6 => G, 7 => H);
