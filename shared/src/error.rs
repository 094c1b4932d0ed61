use std::fmt;

use crux_http::{HttpError, Response};
use thiserror::Error;

use crate::capabilities::HttpResult;
use crate::thresholds::ValidationError;

/// Everything that can go wrong on the client side. None of it is fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Non-2xx reply or a network failure reported by the shell.
    #[error("{message}")]
    Transport { endpoint: String, message: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A snapshot section that could not be decoded. Logged, never shown.
    #[error("section '{section}' degraded: {reason}")]
    PartialData {
        section: &'static str,
        reason: String,
    },
}

/// How a non-2xx reply is worded in the banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// `"<LABEL> <status>"`; polling and refresh endpoints.
    Status(&'static str),
    /// The reply body, or `"HTTP <status>"` when the bridge sent none.
    Body,
}

impl Rejection {
    fn describe(self, status: u16, body: &str) -> String {
        let body = body.trim();
        match self {
            Self::Status(label) => format!("{label} {status}"),
            Self::Body if body.is_empty() => format!("HTTP {status}"),
            Self::Body => body.to_string(),
        }
    }
}

impl ClientError {
    pub fn transport(endpoint: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Transport {
            endpoint: endpoint.into(),
            message: message.to_string(),
        }
    }

    pub fn rejected(
        endpoint: impl Into<String>,
        status: u16,
        body: &str,
        rejection: Rejection,
    ) -> Self {
        Self::transport(endpoint, rejection.describe(status, body))
    }

    /// crux_http reports a non-2xx status as `HttpError::Http`; that case is
    /// worded like any other rejection, everything else is a network failure.
    pub fn from_http(endpoint: impl Into<String>, error: &HttpError, rejection: Rejection) -> Self {
        match error {
            HttpError::Http { code, body, .. } => {
                let body = body.as_deref().map(String::from_utf8_lossy).unwrap_or_default();
                Self::rejected(endpoint, u16::from(*code), &body, rejection)
            }
            other => Self::transport(endpoint, other),
        }
    }
}

/// The reply when it carries a 2xx status, otherwise the error to show.
pub fn accepted(
    endpoint: &str,
    result: HttpResult,
    rejection: Rejection,
) -> Result<Response<String>, ClientError> {
    match result {
        Ok(response) if response.status().is_success() => Ok(response),
        Ok(response) => {
            let body = response.body().map_or("", String::as_str);
            Err(ClientError::rejected(endpoint, u16::from(response.status()), body, rejection))
        }
        Err(e) => Err(ClientError::from_http(endpoint, &e, rejection)),
    }
}
