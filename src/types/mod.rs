use thiserror::Error;

mod domain_types;
mod ids;

pub use domain_types::*;
pub use ids::*;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid {kind} id: {reason}")]
    InvalidId { kind: &'static str, reason: String },

    #[error("Invalid URL: {url} - {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Empty required field: {0}")]
    EmptyField(&'static str),

    #[error("Value out of bounds: {field} = {value}, expected at least {min}")]
    BelowMinimum {
        field: &'static str,
        value: usize,
        min: usize,
    },

    #[error("Invalid API key format: {reason}")]
    InvalidApiKey { reason: String },
}
