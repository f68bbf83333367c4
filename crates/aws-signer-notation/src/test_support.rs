//! Shared fixtures for unit tests.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::types::{
    Capability, CriticalAttributes, ExtendedAttributes, Signature, TrustPolicy,
    VerificationRequest, ATTR_SIGNING_JOB, ATTR_SIGNING_PROFILE_VERSION, CONTRACT_VERSION,
};
use crate::validate::SIGNING_SCHEME_AUTHORITY;

pub(crate) const PROFILE_ARN: &str =
    "arn:aws:signer:us-west-2:000000000000:/signing-profiles/NotaryPluginIntegProfile";
pub(crate) const PROFILE_VERSION_ARN: &str =
    "arn:aws:signer:us-west-2:000000000000:/signing-profiles/NotaryPluginIntegProfile/OF8IVUsPJq";
pub(crate) const JOB_ARN: &str =
    "arn:aws:signer:us-west-2:000000000000:/signing-jobs/97af3947-e7b2-4533-8d9d-6741156f0b79";
pub(crate) const SIGNING_TIME: &str = "2022-07-06T19:10:28Z";

pub(crate) const CERT1_HASH: &str = "13a01b7e1de3aee0367615c59f6d001238913e594626d0e3c8784489b15a18fada1c31f39d3ba9318cb673ffd8cd679b";
pub(crate) const CERT2_HASH: &str = "ff41924f0940448d7e46b8c327e129813b1442fb17c9b2a86d49edcb00b707c9662f561c8a3e11a592b25061d488f2a3";

const CERT1_PEM: &str = include_str!("../tests/fixtures/cert1.pem");
const CERT2_PEM: &str = include_str!("../tests/fixtures/cert2.pem");

pub(crate) fn pem_to_der(pem: &str) -> Vec<u8> {
    let body: String = pem
        .lines()
        .filter(|line| !line.starts_with("-----"))
        .collect();
    BASE64.decode(body).unwrap()
}

/// Leaf then issuer.
pub(crate) fn certificate_chain() -> Vec<Vec<u8>> {
    vec![pem_to_der(CERT1_PEM), pem_to_der(CERT2_PEM)]
}

pub(crate) fn signer_attributes() -> ExtendedAttributes {
    [
        (ATTR_SIGNING_PROFILE_VERSION, PROFILE_VERSION_ARN),
        (ATTR_SIGNING_JOB, JOB_ARN),
    ]
    .into_iter()
    .collect()
}

pub(crate) fn signature() -> Signature {
    Signature {
        critical_attributes: CriticalAttributes {
            content_type: "application/vnd.cncf.notary.payload.v1+json".to_string(),
            signing_scheme: SIGNING_SCHEME_AUTHORITY.to_string(),
            expiry: None,
            authentic_signing_time: Some(SIGNING_TIME.parse().unwrap()),
            extended_attributes: signer_attributes(),
        },
        unprocessed_attributes: vec![
            ATTR_SIGNING_PROFILE_VERSION.to_string(),
            ATTR_SIGNING_JOB.to_string(),
        ],
        certificate_chain: certificate_chain(),
    }
}

pub(crate) fn verification_request(capabilities: &[Capability]) -> VerificationRequest {
    VerificationRequest {
        contract_version: CONTRACT_VERSION.to_string(),
        signature: signature(),
        trust_policy: TrustPolicy {
            trusted_identities: vec![PROFILE_ARN.to_string()],
            signature_verification: capabilities.to_vec(),
        },
        plugin_config: Default::default(),
    }
}
