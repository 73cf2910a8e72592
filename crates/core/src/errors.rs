use thiserror::Error;

use crate::config::ConfigError;
use crate::domain::order::OrderStatus;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid order transition from `{from}` to `{to}`")]
    InvalidOrderTransition { from: OrderStatus, to: OrderStatus },
    #[error("invalid order notes: {0}")]
    InvalidNotes(String),
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    #[error("could not read input `{source_name}`: {message}")]
    InputRead { source_name: String, message: String },
    #[error("could not parse input `{source_name}`: {message}")]
    InputParse { source_name: String, message: String },
}

impl ApplicationError {
    /// Stable machine-readable class for command outcomes.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Domain(_) => "domain_validation",
            Self::Configuration(_) => "config_validation",
            Self::InputRead { .. } => "input_read",
            Self::InputParse { .. } => "input_parse",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Configuration(_) => 2,
            Self::InputRead { .. } => 3,
            Self::InputParse { .. } | Self::Domain(_) => 4,
        }
    }
}
