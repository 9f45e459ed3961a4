//! Dispatch error type.

use std::time::Duration;

use shopcrm_core::error::{AppError, ErrorKind};
use shopcrm_entity::notification::Channel;

/// Why a message could not be handed to a provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// The customer has no address for the channel.
    #[error("customer has no {0} destination")]
    MissingDestination(Channel),

    /// No provider is configured for the channel.
    #[error("no {0} provider configured")]
    Unsupported(Channel),

    /// The provider answered with a non-success status.
    #[error("{provider} rejected the message (HTTP {status}): {body}")]
    Rejected {
        /// Provider name.
        provider: &'static str,
        /// HTTP status code.
        status: u16,
        /// Response body excerpt.
        body: String,
    },

    /// The request never completed (connection, TLS, decoding).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The call exceeded its time budget.
    #[error("provider call timed out after {0:?}")]
    Timeout(Duration),
}

impl DispatchError {
    /// Whether a later attempt might succeed without a data change.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout(_) => true,
            Self::Rejected { status, .. } => *status == 429 || *status >= 500,
            Self::MissingDestination(_) | Self::Unsupported(_) => false,
        }
    }
}

impl From<reqwest::Error> for DispatchError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<DispatchError> for AppError {
    fn from(err: DispatchError) -> Self {
        let message = format!("Dispatch failed: {err}");
        AppError::with_source(ErrorKind::ExternalService, message, err)
    }
}
