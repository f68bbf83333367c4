//! Plugin façade: the contract operations.
//!
//! Each operation validates first and only then touches the Trust
//! Authority. The client handle is the only state shared between calls.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::debug;

use crate::authority::{HttpTrustAuthority, TrustAuthority};
use crate::config::PluginConfig;
use crate::envelope;
use crate::error::{PluginError, PluginResult};
use crate::identity::match_trusted_identity;
use crate::revocation::RevocationQuery;
use crate::types::{
    Capability, MetadataResponse, SigningRequest, SigningResponse, VerificationRequest,
    VerificationResponse, VerificationResult, ATTR_SIGNING_JOB, ATTR_SIGNING_PROFILE_VERSION,
    CONTRACT_VERSION,
};
use crate::validate::{validate_signing_request, validate_verification_request};
use crate::version::VERSION;

pub const PLUGIN_NAME: &str = "com.amazonaws.signer.notation.plugin";
pub const PLUGIN_DESCRIPTION: &str = "AWS Signer plugin for Notation";
pub const PLUGIN_URL: &str = "https://docs.aws.amazon.com/signer";

/// Builds the Trust Authority client from resolved configuration.
pub(crate) type AuthorityBuilder = fn(&PluginConfig) -> PluginResult<Arc<dyn TrustAuthority>>;

fn http_authority(config: &PluginConfig) -> PluginResult<Arc<dyn TrustAuthority>> {
    Ok(Arc::new(HttpTrustAuthority::new(config)?))
}

/// AWS Signer plugin.
///
/// Cheap to share behind a reference; concurrent first use of the client
/// handle builds it once.
#[derive(Debug)]
pub struct SignerPlugin {
    authority: OnceCell<Arc<dyn TrustAuthority>>,
    build_authority: AuthorityBuilder,
}

impl Default for SignerPlugin {
    fn default() -> Self {
        Self::with_builder(http_authority)
    }
}

impl SignerPlugin {
    /// Plugin backed by an existing client.
    pub fn new(authority: Arc<dyn TrustAuthority>) -> Self {
        Self {
            authority: OnceCell::new_with(Some(authority)),
            build_authority: http_authority,
        }
    }

    /// Plugin that builds its HTTP client from the first request needing one.
    pub fn for_cli() -> Self {
        Self::default()
    }

    pub(crate) fn with_builder(build_authority: AuthorityBuilder) -> Self {
        Self {
            authority: OnceCell::new(),
            build_authority,
        }
    }

    /// Whether the client handle has been built.
    pub fn is_initialized(&self) -> bool {
        self.authority.initialized()
    }

    async fn authority(
        &self,
        plugin_config: &BTreeMap<String, String>,
    ) -> PluginResult<&Arc<dyn TrustAuthority>> {
        self.authority
            .get_or_try_init(|| async {
                debug!("initializing AWS Signer client");
                let config = PluginConfig::from_plugin_config(plugin_config);
                (self.build_authority)(&config)
            })
            .await
    }

    pub fn metadata(&self) -> MetadataResponse {
        MetadataResponse {
            name: PLUGIN_NAME.to_string(),
            description: PLUGIN_DESCRIPTION.to_string(),
            version: VERSION.to_string(),
            url: PLUGIN_URL.to_string(),
            supported_contract_versions: vec![CONTRACT_VERSION.to_string()],
            capabilities: vec![
                Capability::EnvelopeGenerator,
                Capability::TrustedIdentityVerifier,
                Capability::RevocationCheckVerifier,
            ],
        }
    }

    pub async fn generate_envelope(
        &self,
        request: &SigningRequest,
    ) -> PluginResult<SigningResponse> {
        debug!("validating signing request");
        validate_signing_request(request)
            .inspect_err(|e| debug!(error = %e, "invalid signing request"))?;

        let authority = self.authority(&request.plugin_config).await?;
        envelope::generate_envelope(authority.as_ref(), request).await
    }

    pub async fn verify_signature(
        &self,
        request: &VerificationRequest,
    ) -> PluginResult<VerificationResponse> {
        debug!("validating verification request");
        validate_verification_request(request)
            .inspect_err(|e| debug!(error = %e, "invalid verification request"))?;

        let requested = &request.trust_policy.signature_verification;
        let mut response = VerificationResponse::default();

        if requested.contains(&Capability::TrustedIdentityVerifier) {
            debug!("checking trusted identity");
            let result = match_trusted_identity(
                &request.signature.critical_attributes.extended_attributes,
                &request.trust_policy.trusted_identities,
            )?;
            response
                .verification_results
                .insert(Capability::TrustedIdentityVerifier, result);
        }

        if requested.contains(&Capability::RevocationCheckVerifier) {
            debug!("checking revocation status");
            let query = RevocationQuery::from_signature(&request.signature)?;
            let result = match self.authority(&request.plugin_config).await {
                Ok(authority) => query.check(authority.as_ref()).await,
                Err(e) => {
                    debug!(error = %e, "AWS Signer client unavailable");
                    VerificationResult::failure(format!(
                        "GetRevocationStatus call failed with error: {}",
                        e
                    ))
                }
            };
            response
                .verification_results
                .insert(Capability::RevocationCheckVerifier, result);
        }

        // Reported even when revocation was not requested.
        response.mark_processed(ATTR_SIGNING_PROFILE_VERSION);
        response.mark_processed(ATTR_SIGNING_JOB);

        debug!(results = ?response.verification_results, "verification finished");
        Ok(response)
    }

    /// Raw signature generation is not offered.
    pub fn generate_signature(&self) -> PluginResult<Infallible> {
        Err(PluginError::unsupported("GenerateSignature operation"))
    }

    /// Key description is not offered.
    pub fn describe_key(&self) -> PluginResult<Infallible> {
        Err(PluginError::unsupported("DescribeKey operation"))
    }
}
