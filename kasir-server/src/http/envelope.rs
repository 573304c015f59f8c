//! Response envelope and the messages it carries
//!
//! Every response body, success or failure, is
//! `{"code": "1000"|"2000", "message": "...", "data": ...}` with `data`
//! omitted when there is nothing to return.

use serde::Serialize;

pub const SUCCESS_CODE: &str = "1000";
pub const ERROR_CODE: &str = "2000";

/// JSON body of every API response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse<T> {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            code: SUCCESS_CODE.to_string(),
            message: message.into(),
            data: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            code: ERROR_CODE.to_string(),
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: T) -> Self {
        self.data = Some(data);
        self
    }
}

/// Resource a handler works on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Category,
    Product,
}

impl Resource {
    /// Lowercase name used in validation messages
    pub fn noun(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Product => "product",
        }
    }

    fn singular(self) -> &'static str {
        match self {
            Self::Category => "Category",
            Self::Product => "Product",
        }
    }

    fn plural(self) -> &'static str {
        match self {
            Self::Category => "Categories",
            Self::Product => "Products",
        }
    }
}

/// Operation a handler performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Update,
    Delete,
    Get,
    List,
}

impl Action {
    pub fn succeeded(self, resource: Resource) -> String {
        match self {
            Self::Create => format!("{} created successfully", resource.singular()),
            Self::Update => format!("{} updated successfully", resource.singular()),
            Self::Delete => format!("{} deleted successfully", resource.singular()),
            Self::Get => format!("{} retrieved successfully", resource.singular()),
            Self::List => format!("{} retrieved successfully", resource.plural()),
        }
    }

    pub fn failed(self, resource: Resource) -> String {
        match self {
            Self::Create => format!("{} created failed", resource.singular()),
            Self::Update => format!("{} updated failed", resource.singular()),
            Self::Delete => format!("{} delete failed", resource.singular()),
            Self::Get => format!("{} retrieved failed", resource.singular()),
            Self::List => format!("{} retrieved failed", resource.plural()),
        }
    }
}
