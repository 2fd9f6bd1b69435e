//! Portal models for request and response payloads

pub mod document;
pub mod fee;
pub mod user;

use serde::{Deserialize, Deserializer};

// Re-export for convenience
pub use document::{Document, DocumentCategory, DocumentType};
pub use fee::Fee;
pub use user::{
    AuthResponse, AuthTokens, LoginRequest, ProfileUpdate, RegistrationRequest, Role, UserProfile,
};

/// List endpoints answer either with a bare array or a paginated envelope
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Listing<T> {
    Paginated { results: Vec<T> },
    Plain(Vec<T>),
}

impl<T> Listing<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Paginated { results } => results,
            Listing::Plain(items) => items,
        }
    }
}

/// Money amounts arrive as JSON numbers or as decimal strings ("150.00")
#[derive(Deserialize)]
#[serde(untagged)]
enum Amount {
    Number(f64),
    Text(String),
}

pub(crate) fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Amount::deserialize(deserializer)? {
        Amount::Number(value) => Ok(value),
        Amount::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

pub(crate) fn deserialize_optional_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Amount>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Amount::Number(value)) => Ok(Some(value)),
        Some(Amount::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Amount::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
