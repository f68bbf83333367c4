//! Request validation.
//!
//! Runs before any Trust-Authority call. The order of checks is part of the
//! contract: the first failing rule decides the error.

use tracing::debug;

use crate::error::{PluginError, PluginResult};
use crate::types::{Capability, SigningRequest, VerificationRequest, CONTRACT_VERSION};

/// The only envelope media type this plugin produces.
pub const MEDIA_TYPE_JWS_ENVELOPE: &str = "application/jose+json";

/// The only signing scheme this plugin verifies.
pub const SIGNING_SCHEME_AUTHORITY: &str = "notary.x509.signingAuthority";

/// Trusted-identity pattern that would match any publisher.
pub const WILDCARD_IDENTITY: &str = "*";

const ERR_EXPIRY_PASSED: &str = "AWSSigner plugin doesn't support -e (--expiry) argument. Please use signing profile to set signature expiry.";
const ERR_WILDCARD_IDENTITY: &str =
    "The AWSSigner plugin does not support wildcard identity in the trust policy.";
const ERR_MISSING_SIGNING_TIME: &str = "missing authenticSigningTime";

/// Check a signing request.
///
/// Expiry is rejected first, independent of every other field.
pub fn validate_signing_request(request: &SigningRequest) -> PluginResult<()> {
    if request.expiry_duration_in_seconds != 0 {
        return Err(PluginError::validation(ERR_EXPIRY_PASSED));
    }

    if request.contract_version != CONTRACT_VERSION {
        return Err(PluginError::unsupported_contract_version(
            &request.contract_version,
        ));
    }

    if request.signature_envelope_type != MEDIA_TYPE_JWS_ENVELOPE {
        return Err(PluginError::unsupported(format!(
            "envelope type {:?}",
            request.signature_envelope_type
        )));
    }

    debug!(key_id = %request.key_id, "signing request is valid");
    Ok(())
}

/// Check a verification request.
pub fn validate_verification_request(request: &VerificationRequest) -> PluginResult<()> {
    if request.contract_version != CONTRACT_VERSION {
        return Err(PluginError::unsupported_contract_version(
            &request.contract_version,
        ));
    }

    let policy = &request.trust_policy;
    if policy.trusted_identities.iter().any(|i| i == WILDCARD_IDENTITY) {
        return Err(PluginError::validation(ERR_WILDCARD_IDENTITY));
    }

    if let Some(capability) = policy
        .signature_verification
        .iter()
        .find(|c| !is_verification_capability(c))
    {
        return Err(PluginError::validation(format!(
            "'{}' is not a supported plugin capability",
            capability
        )));
    }

    let attributes = &request.signature.critical_attributes;
    if attributes.signing_time_is_zero() {
        return Err(PluginError::validation(ERR_MISSING_SIGNING_TIME));
    }

    // Scheme names are ASCII, so ASCII folding is exact.
    if !attributes
        .signing_scheme
        .eq_ignore_ascii_case(SIGNING_SCHEME_AUTHORITY)
    {
        return Err(PluginError::unsupported(format!(
            "'{}' signing scheme",
            attributes.signing_scheme
        )));
    }

    debug!(
        capabilities = policy.signature_verification.len(),
        trusted_identities = policy.trusted_identities.len(),
        "verification request is valid"
    );
    Ok(())
}

fn is_verification_capability(capability: &Capability) -> bool {
    matches!(
        capability,
        Capability::TrustedIdentityVerifier | Capability::RevocationCheckVerifier
    )
}
