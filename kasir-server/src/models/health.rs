//! Health check result

/// Outcome of a health probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthCheck {
    pub name: &'static str,
    pub is_healthy: bool,
}

impl HealthCheck {
    pub fn healthy(name: &'static str) -> Self {
        Self {
            name,
            is_healthy: true,
        }
    }
}
