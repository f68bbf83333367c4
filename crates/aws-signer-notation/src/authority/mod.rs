//! Trust Authority (AWS Signer) client boundary.
//!
//! The plugin only talks to AWS Signer through [`TrustAuthority`]. The
//! production implementation is [`HttpTrustAuthority`]; tests substitute an
//! in-memory double.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

mod helpers;
mod http;

#[cfg(test)]
pub(crate) mod mock;

pub use http::{HttpTrustAuthority, USER_AGENT_VALUE};

/// Input of the SignPayload operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignPayloadInput {
    pub profile_name: String,

    /// Account that owns the signing profile.
    pub profile_owner: String,

    pub payload: Vec<u8>,

    pub payload_format: String,
}

/// Output of the SignPayload operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignPayloadOutput {
    /// Signature envelope bytes.
    pub signature: Vec<u8>,

    pub job_id: Option<String>,

    pub job_owner: Option<String>,

    pub metadata: BTreeMap<String, String>,
}

/// Input of the GetRevocationStatus operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevocationStatusInput {
    /// Hash-chained certificate digests, leaf first.
    pub certificate_hashes: Vec<String>,

    pub job_arn: String,

    pub platform_id: String,

    pub profile_version_arn: String,

    pub signature_timestamp: DateTime<Utc>,
}

/// Output of the GetRevocationStatus operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevocationStatusOutput {
    /// Revoked resource ARNs and certificate digests.
    pub revoked_entities: Vec<String>,
}

/// Failure reported by the Trust Authority or the transport in front of it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthorityError {
    /// The service answered with a recognizable API error.
    #[error("api error {code}: {message}")]
    Api {
        code: String,
        message: String,
        request_id: Option<String>,
    },

    /// No API error code available (connection failure, unexpected response).
    #[error("{message}")]
    Transport {
        message: String,
        request_id: Option<String>,
    },
}

impl AuthorityError {
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Self::Api { request_id, .. } | Self::Transport { request_id, .. } => {
                request_id.as_deref()
            }
        }
    }
}

/// Result type for Trust Authority calls.
pub type AuthorityResult<T> = Result<T, AuthorityError>;

/// Remote operations the plugin needs from AWS Signer.
///
/// Calls are made at most once per request and never retried here.
/// Cancellation is by dropping the returned future.
#[async_trait]
pub trait TrustAuthority: Send + Sync + std::fmt::Debug {
    async fn sign_payload(&self, input: SignPayloadInput) -> AuthorityResult<SignPayloadOutput>;

    async fn get_revocation_status(
        &self,
        input: RevocationStatusInput,
    ) -> AuthorityResult<RevocationStatusOutput>;
}
