//! AWS Signer plugin for the Notation signing contract.
//!
//! This crate implements the plugin's decision logic:
//!
//! - Request validation for signing and verification
//! - Trusted-identity matching on signing profile ARNs
//! - Revocation checks with SHA-384 hash-chained certificate digests
//! - Envelope generation through AWS Signer's SignPayload
//! - Mapping of AWS Signer failures onto the contract's error codes
//!
//! # Quick Start
//!
//! ```no_run
//! use aws_signer_notation::{SignerPlugin, VerificationRequest};
//!
//! # async fn example(request: VerificationRequest) -> Result<(), aws_signer_notation::PluginError> {
//! let plugin = SignerPlugin::for_cli();
//! let response = plugin.verify_signature(&request).await?;
//! for (capability, result) in &response.verification_results {
//!     println!("{}: {} ({})", capability, result.success, result.reason);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! | `pluginConfig` key | Environment fallback | Description |
//! |--------------------|----------------------|-------------|
//! | `aws-region` | `AWS_REGION`, `AWS_DEFAULT_REGION` | Region of the default endpoint |
//! | `aws-signer-endpoint-url` | | Endpoint override |
//! | `aws-profile` | `AWS_PROFILE` | Credential profile name |
//! | | `AWS_SIGNER_NOTATION_PLUGIN_TIMEOUT` | Request timeout in seconds (default: 30) |

pub mod arn;
pub mod authority;
pub mod config;
pub mod envelope;
pub mod error;
pub mod identity;
pub mod plugin;
pub mod revocation;
pub mod types;
pub mod validate;
pub mod version;

#[cfg(test)]
mod test_support;

// Re-export main types
pub use arn::{Arn, ArnError};
pub use authority::{
    AuthorityError, AuthorityResult, HttpTrustAuthority, RevocationStatusInput,
    RevocationStatusOutput, SignPayloadInput, SignPayloadOutput, TrustAuthority,
    USER_AGENT_VALUE,
};
pub use config::PluginConfig;
pub use error::{map_authority_error, ErrorKind, ErrorResponse, PluginError, PluginResult};
pub use plugin::SignerPlugin;
pub use revocation::{certificate_digest, hash_chain, RevocationQuery, PLATFORM_NOTATION};
pub use types::{
    Capability, CriticalAttributes, ExtendedAttributes, MetadataResponse, Signature,
    SigningRequest, SigningResponse, TrustPolicy, VerificationRequest, VerificationResponse,
    VerificationResult, CONTRACT_VERSION,
};
pub use version::VERSION;
