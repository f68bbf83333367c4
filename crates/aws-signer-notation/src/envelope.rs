//! Envelope generation through AWS Signer's SignPayload.

use tracing::debug;

use crate::arn::Arn;
use crate::authority::{SignPayloadInput, TrustAuthority};
use crate::error::{PluginError, PluginResult};
use crate::types::{SigningRequest, SigningResponse};

const PROFILE_SEGMENTS: usize = 3;

fn malformed_profile(key_id: &str) -> PluginError {
    PluginError::validation(format!(
        "{} is not a valid AWS Signer signing profile or signing profile version ARN.",
        key_id
    ))
}

/// Signing profile name and owning account from a key id.
///
/// The resource must be `/signing-profiles/<name>`.
pub fn signing_profile(key_id: &str) -> PluginResult<(String, String)> {
    let arn = Arn::parse(key_id).map_err(|_| malformed_profile(key_id))?;

    let segments: Vec<&str> = arn.resource.split('/').collect();
    if segments.len() != PROFILE_SEGMENTS {
        return Err(malformed_profile(key_id));
    }

    Ok((segments[2].to_string(), arn.account_id))
}

/// Sign `request.payload` with the profile named by `request.key_id`.
///
/// Expects a request that already passed validation.
pub async fn generate_envelope(
    authority: &dyn TrustAuthority,
    request: &SigningRequest,
) -> PluginResult<SigningResponse> {
    let (profile_name, profile_owner) = signing_profile(&request.key_id)?;
    debug!(profile_name = %profile_name, profile_owner = %profile_owner, "calling SignPayload");

    let output = authority
        .sign_payload(SignPayloadInput {
            profile_name,
            profile_owner,
            payload: request.payload.clone(),
            payload_format: request.payload_type.clone(),
        })
        .await
        .map_err(|e| {
            debug!(error = %e, "SignPayload failed");
            PluginError::from(e)
        })?;

    debug!(job_id = ?output.job_id, "SignPayload succeeded");
    Ok(SigningResponse {
        signature_envelope: output.signature,
        signature_envelope_type: request.signature_envelope_type.clone(),
        annotations: output.metadata,
    })
}
