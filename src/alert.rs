// src/alert.rs
use std::fmt;

/// Which checker produced an alert. Only used for metric labels; the digest
/// treats every alert as plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertCategory {
    Insider,
    Filing,
    News,
    PriceMove,
}

impl AlertCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertCategory::Insider => "insider",
            AlertCategory::Filing => "filing",
            AlertCategory::News => "news",
            AlertCategory::PriceMove => "price_move",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub category: AlertCategory,
    pub message: String,
}

impl Alert {
    pub fn new(category: AlertCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
