//! Revocation checking against AWS Signer.
//!
//! Building the query is pure: read the signer attributes, hash every
//! certificate's TBS body with SHA-384 and chain the digests. Running it is
//! the only step that talks to the Trust Authority, and its failure is a
//! reported result rather than an error.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha384};
use tracing::debug;
use x509_parser::prelude::{FromDer, X509Certificate};

use crate::authority::{RevocationStatusInput, TrustAuthority};
use crate::error::{PluginError, PluginResult};
use crate::identity::attribute_error;
use crate::types::{
    Signature, VerificationResult, ATTR_SIGNING_JOB, ATTR_SIGNING_PROFILE_VERSION,
};

/// Platform identifier of the Notation signing scheme in AWS Signer.
pub const PLATFORM_NOTATION: &str = "Notation-OCI-SHA384-ECDSA";

const REASON_NOT_REVOKED: &str = "Signature is not revoked.";
const REASON_CERTIFICATE_REVOKED: &str = "Certificate(s) have been revoked.";
const ERR_CERTIFICATE_PARSE: &str = "unable to parse certificates in certificate chain.";

/// Lowercase hex SHA-384 of the certificate's to-be-signed body.
///
/// Rejects anything that is not exactly one DER certificate.
pub fn certificate_digest(der: &[u8]) -> PluginResult<String> {
    let (rest, cert) = X509Certificate::from_der(der).map_err(|e| {
        debug!(error = %e, "certificate parse failed");
        PluginError::validation(ERR_CERTIFICATE_PARSE)
    })?;
    if !rest.is_empty() {
        debug!(trailing = rest.len(), "trailing data after certificate");
        return Err(PluginError::validation(ERR_CERTIFICATE_PARSE));
    }

    Ok(hex::encode(Sha384::digest(cert.tbs_certificate.as_ref())))
}

/// Chain digests leaf first: each entry is followed by its issuer's digest,
/// the last one by itself.
pub fn hash_chain(digests: &[String]) -> Vec<String> {
    digests
        .iter()
        .enumerate()
        .map(|(i, digest)| {
            let next = digests.get(i + 1).unwrap_or(digest);
            format!("{}{}", digest, next)
        })
        .collect()
}

/// Human reason for a non-empty revoked-entity list.
///
/// Entries starting with `arn` are resources; everything else counts as a
/// certificate digest and adds a single fixed sentence.
pub fn revocation_reason(revoked_entities: &[String]) -> String {
    let (resources, certificates): (Vec<&String>, Vec<&String>) = revoked_entities
        .iter()
        .partition(|entity| entity.starts_with("arn"));

    let mut reason = String::new();
    if !resources.is_empty() {
        let joined = resources
            .iter()
            .map(|r| r.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        reason.push_str(&format!("Resource(s) {} have been revoked.", joined));
    }
    if !certificates.is_empty() {
        reason.push_str(REASON_CERTIFICATE_REVOKED);
    }
    reason
}

/// A fully built GetRevocationStatus query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevocationQuery {
    pub profile_version_arn: String,
    pub job_arn: String,
    pub certificate_hashes: Vec<String>,
    pub signature_timestamp: DateTime<Utc>,
}

impl RevocationQuery {
    /// Build the query for `signature`.
    ///
    /// Reads the profile version, then the job, then parses the chain; the
    /// first failure is returned as a validation error.
    pub fn from_signature(signature: &Signature) -> PluginResult<Self> {
        let attributes = &signature.critical_attributes.extended_attributes;
        let profile_version_arn = attributes
            .get_str(ATTR_SIGNING_PROFILE_VERSION)
            .map_err(|e| attribute_error(&e))?
            .to_string();
        let job_arn = attributes
            .get_str(ATTR_SIGNING_JOB)
            .map_err(|e| attribute_error(&e))?
            .to_string();

        let digests = signature
            .certificate_chain
            .iter()
            .map(|der| certificate_digest(der))
            .collect::<PluginResult<Vec<_>>>()?;

        let signature_timestamp = signature
            .critical_attributes
            .authentic_signing_time
            .unwrap_or_default();

        Ok(Self {
            profile_version_arn,
            job_arn,
            certificate_hashes: hash_chain(&digests),
            signature_timestamp,
        })
    }

    /// Ask the Trust Authority and turn the answer into a result.
    pub async fn check(self, authority: &dyn TrustAuthority) -> VerificationResult {
        let input = RevocationStatusInput {
            certificate_hashes: self.certificate_hashes,
            job_arn: self.job_arn,
            platform_id: PLATFORM_NOTATION.to_string(),
            profile_version_arn: self.profile_version_arn,
            signature_timestamp: self.signature_timestamp,
        };

        match authority.get_revocation_status(input).await {
            Ok(output) if output.revoked_entities.is_empty() => {
                VerificationResult::success(REASON_NOT_REVOKED)
            }
            Ok(output) => {
                debug!(revoked = ?output.revoked_entities, "signature is revoked");
                VerificationResult::failure(revocation_reason(&output.revoked_entities))
            }
            Err(e) => {
                debug!(error = %e, "GetRevocationStatus failed");
                VerificationResult::failure(format!(
                    "GetRevocationStatus call failed with error: {}",
                    e
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authority::mock::MockAuthority;
    use crate::authority::AuthorityError;
    use crate::error::ErrorKind;
    use crate::test_support::*;
    use crate::types::ExtendedAttributes;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_certificate_digest_of_fixtures() {
        let chain = certificate_chain();
        assert_eq!(certificate_digest(&chain[0]).unwrap(), CERT1_HASH);
        assert_eq!(certificate_digest(&chain[1]).unwrap(), CERT2_HASH);
    }

    #[test]
    fn test_certificate_digest_rejects_garbage() {
        let err = certificate_digest(b"not a certificate").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.message(), ERR_CERTIFICATE_PARSE);

        let mut trailing = certificate_chain().remove(0);
        trailing.push(0);
        assert!(certificate_digest(&trailing).is_err());
    }

    #[test]
    fn test_hash_chain_wraps_last_to_itself() {
        assert_eq!(
            hash_chain(&strings(&["a", "b", "c"])),
            strings(&["ab", "bc", "cc"])
        );
        assert_eq!(hash_chain(&strings(&["a"])), strings(&["aa"]));
        assert!(hash_chain(&[]).is_empty());
    }

    #[test]
    fn test_query_from_signature() {
        let query = RevocationQuery::from_signature(&signature()).unwrap();
        assert_eq!(query.profile_version_arn, PROFILE_VERSION_ARN);
        assert_eq!(query.job_arn, JOB_ARN);
        assert_eq!(
            query.certificate_hashes,
            vec![
                format!("{}{}", CERT1_HASH, CERT2_HASH),
                format!("{}{}", CERT2_HASH, CERT2_HASH),
            ]
        );
        assert_eq!(query.signature_timestamp, SIGNING_TIME.parse::<DateTime<Utc>>().unwrap());
    }

    #[test]
    fn test_query_missing_job() {
        let mut sig = signature();
        sig.critical_attributes.extended_attributes =
            [(ATTR_SIGNING_PROFILE_VERSION, PROFILE_VERSION_ARN)]
                .into_iter()
                .collect();

        let err = RevocationQuery::from_signature(&sig).unwrap_err();
        assert_eq!(
            err.message(),
            "unable to parse attribute \"com.amazonaws.signer.signingJob\"."
        );
    }

    #[test]
    fn test_query_reports_profile_version_first() {
        let mut sig = signature();
        sig.critical_attributes.extended_attributes = ExtendedAttributes::new();

        let err = RevocationQuery::from_signature(&sig).unwrap_err();
        assert_eq!(
            err.message(),
            "unable to parse attribute \"com.amazonaws.signer.signingProfileVersion\"."
        );
    }

    #[test]
    fn test_query_bad_certificate() {
        let mut sig = signature();
        sig.certificate_chain.push(b"bad cert".to_vec());

        let err = RevocationQuery::from_signature(&sig).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.message(), ERR_CERTIFICATE_PARSE);
    }

    #[test]
    fn test_revocation_reasons() {
        let cases: [(&[&str], String); 5] = [
            (&[JOB_ARN], format!("Resource(s) {} have been revoked.", JOB_ARN)),
            (
                &[JOB_ARN, PROFILE_VERSION_ARN],
                format!(
                    "Resource(s) {}, {} have been revoked.",
                    JOB_ARN, PROFILE_VERSION_ARN
                ),
            ),
            (&[CERT1_HASH], REASON_CERTIFICATE_REVOKED.to_string()),
            (&[CERT1_HASH, CERT2_HASH], REASON_CERTIFICATE_REVOKED.to_string()),
            (
                &[JOB_ARN, CERT1_HASH],
                format!(
                    "Resource(s) {} have been revoked.Certificate(s) have been revoked.",
                    JOB_ARN
                ),
            ),
        ];

        for (entities, expected) in cases {
            assert_eq!(revocation_reason(&strings(entities)), expected);
        }
    }

    #[tokio::test]
    async fn test_check_not_revoked() {
        let authority = MockAuthority::new().with_revoked(&[]);
        let query = RevocationQuery::from_signature(&signature()).unwrap();

        let result = query.clone().check(&authority).await;
        assert_eq!(result, VerificationResult::success(REASON_NOT_REVOKED));

        let calls = authority.revocation_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].platform_id, PLATFORM_NOTATION);
        assert_eq!(calls[0].certificate_hashes, query.certificate_hashes);
        assert_eq!(calls[0].job_arn, JOB_ARN);
        assert_eq!(calls[0].profile_version_arn, PROFILE_VERSION_ARN);
    }

    #[tokio::test]
    async fn test_check_revoked() {
        let authority = MockAuthority::new().with_revoked(&[JOB_ARN, CERT1_HASH]);
        let result = RevocationQuery::from_signature(&signature())
            .unwrap()
            .check(&authority)
            .await;

        assert!(!result.success);
        assert_eq!(
            result.reason,
            format!(
                "Resource(s) {} have been revoked.Certificate(s) have been revoked.",
                JOB_ARN
            )
        );
    }

    #[tokio::test]
    async fn test_check_backend_failure_is_reported() {
        let authority = MockAuthority::new().with_revocation_reply(Err(AuthorityError::Api {
            code: "ERROR".to_string(),
            message: "AWSSigner unreachable. 5xx".to_string(),
            request_id: None,
        }));
        let result = RevocationQuery::from_signature(&signature())
            .unwrap()
            .check(&authority)
            .await;

        assert!(!result.success);
        assert_eq!(
            result.reason,
            "GetRevocationStatus call failed with error: api error ERROR: AWSSigner unreachable. 5xx"
        );
    }
}
