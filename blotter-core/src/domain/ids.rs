use serde::{Deserialize, Serialize};
use std::fmt;

/// Order ID — random integer in [1000, 5000], unique within one app's store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(pub u32);

impl OrderId {
    /// Inclusive range order ids are drawn from.
    pub const MIN: u32 = 1000;
    pub const MAX: u32 = 5000;
}

impl From<u32> for OrderId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Security ID — second random integer stamped at submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecurityId(pub u32);

impl From<u32> for SecurityId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for SecurityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Application identity — tags an order's origin and routing destination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppName(pub String);

impl AppName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The designated aggregator application.
    pub fn combined() -> Self {
        Self("combined".to_string())
    }
}

impl From<&str> for AppName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl fmt::Display for AppName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
