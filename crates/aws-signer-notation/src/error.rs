//! Error taxonomy for the plugin contract.
//!
//! Every failure that leaves the plugin is a [`PluginError`] carrying one of
//! the closed [`ErrorKind`]s. Trust-Authority failures are classified here and
//! nowhere else.

use serde::{Deserialize, Serialize};

use crate::authority::AuthorityError;

/// Error codes that are classified as caller mistakes.
const VALIDATION_API_CODES: [&str; 4] = [
    "NotFoundException",
    "ResourceNotFoundException",
    "ValidationException",
    "BadRequestException",
];

/// Closed set of error kinds understood by the calling framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input. Never retried.
    Validation,

    /// Operation, media type or scheme not implemented by this plugin.
    Unsupported,

    /// Contract version mismatch.
    UnsupportedContractVersion,

    /// Caller is not allowed to use the requested resource.
    AccessDenied,

    /// Trust Authority rejected the call due to rate limits.
    Throttled,

    /// Opaque backend failure.
    Generic,
}

impl ErrorKind {
    /// Error code written on the wire.
    ///
    /// `Unsupported` has no code of its own in the contract and travels as a
    /// validation error.
    pub fn wire_code(self) -> &'static str {
        match self {
            Self::Validation | Self::Unsupported => "VALIDATION_ERROR",
            Self::UnsupportedContractVersion => "UNSUPPORTED_CONTRACT_VERSION",
            Self::AccessDenied => "ACCESS_DENIED",
            Self::Throttled => "THROTTLED",
            Self::Generic => "ERROR",
        }
    }
}

/// A terminal failure of a single plugin request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct PluginError {
    kind: ErrorKind,
    message: String,
}

impl PluginError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// `what` names the unsupported thing, e.g. `envelope type "x"`.
    pub fn unsupported(what: impl std::fmt::Display) -> Self {
        Self::new(ErrorKind::Unsupported, format!("{} is not supported", what))
    }

    pub fn unsupported_contract_version(version: &str) -> Self {
        Self::new(
            ErrorKind::UnsupportedContractVersion,
            format!(
                "{:?} is not a supported notary plugin contract version",
                version
            ),
        )
    }

    pub fn generic(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Generic, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Wire representation written to stderr by the plugin executable.
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error_code: self.kind.wire_code().to_string(),
            error_message: self.message.clone(),
        }
    }
}

impl From<AuthorityError> for PluginError {
    fn from(err: AuthorityError) -> Self {
        map_authority_error(&err)
    }
}

/// Classify a Trust-Authority failure.
///
/// Total and deterministic: API errors are classified by their code and get
/// the request id appended when one is known; anything else is `Generic` with
/// the raw error text.
pub fn map_authority_error(err: &AuthorityError) -> PluginError {
    match err {
        AuthorityError::Api {
            code,
            message,
            request_id,
        } => {
            let suffix = request_id
                .as_deref()
                .map(|id| format!(" RequestID: {}.", id))
                .unwrap_or_default();
            let message = format!("Failed to call AWSSigner. Error: {}.{}", message, suffix);

            let kind = match code.as_str() {
                c if VALIDATION_API_CODES.contains(&c) => ErrorKind::Validation,
                "ThrottlingException" => ErrorKind::Throttled,
                "AccessDeniedException" => ErrorKind::AccessDenied,
                _ => ErrorKind::Generic,
            };
            PluginError::new(kind, message)
        }
        AuthorityError::Transport { .. } => PluginError::generic(err.to_string()),
    }
}

/// Error object of the plugin contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error_code: String,
    pub error_message: String,
}

/// Result type for plugin operations.
pub type PluginResult<T> = Result<T, PluginError>;
