//! Trusted-identity matching.
//!
//! A signature's identity is the signing profile version that produced it.
//! Trust policy entries name either a signing profile (3 resource segments)
//! or a specific profile version (4 segments). Anything else is skipped.

use tracing::debug;

use crate::arn::parse_signing_profile_arn;
use crate::error::{PluginError, PluginResult};
use crate::types::{
    AttributeError, ExtendedAttributes, VerificationResult, ATTR_SIGNING_PROFILE_VERSION,
};

const REASON_NO_MATCH: &str = "Signature publisher doesn't match any trusted identities.";

const PROFILE_SEGMENTS: usize = 3;
const PROFILE_VERSION_SEGMENTS: usize = 4;

/// Match the signature's profile version against `trusted_identities`.
///
/// The first matching pattern wins. Fails only when the profile-version
/// attribute is missing or not a string.
pub fn match_trusted_identity(
    attributes: &ExtendedAttributes,
    trusted_identities: &[String],
) -> PluginResult<VerificationResult> {
    let signature_identity = attributes
        .get_str(ATTR_SIGNING_PROFILE_VERSION)
        .map_err(|e| attribute_error(&e))?;

    let matched = trusted_identities
        .iter()
        .find(|pattern| identity_matches(signature_identity, pattern));

    Ok(match matched {
        Some(pattern) => {
            debug!(pattern = %pattern, "trusted identity matched");
            VerificationResult::success(format!(
                "Signature publisher matched {:?} trusted identity.",
                pattern
            ))
        }
        None => {
            debug!(identity = %signature_identity, "no trusted identity matched");
            VerificationResult::failure(REASON_NO_MATCH)
        }
    })
}

fn identity_matches(signature_identity: &str, pattern: &str) -> bool {
    let Some(arn) = parse_signing_profile_arn(pattern) else {
        return false;
    };

    // ASCII case folding; AWS Signer ARNs are ASCII.
    match arn.resource_segment_count() {
        PROFILE_SEGMENTS => signature_identity
            .rsplit_once('/')
            .is_some_and(|(profile, _)| profile.eq_ignore_ascii_case(pattern)),
        PROFILE_VERSION_SEGMENTS => signature_identity.eq_ignore_ascii_case(pattern),
        _ => false,
    }
}

/// Validation error for an unreadable extended attribute.
pub(crate) fn attribute_error(err: &AttributeError) -> PluginError {
    PluginError::validation(format!("unable to parse attribute {:?}.", err.key()))
}
