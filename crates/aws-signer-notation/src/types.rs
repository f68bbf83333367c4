//! Request and response types of the Notation plugin contract.
//!
//! Field names follow the contract's camelCase JSON. Byte fields travel as
//! standard base64.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// The single contract version spoken by this plugin.
pub const CONTRACT_VERSION: &str = "1.0";

/// Extended attribute naming the signing profile version that produced a signature.
pub const ATTR_SIGNING_PROFILE_VERSION: &str = "com.amazonaws.signer.signingProfileVersion";

/// Extended attribute naming the signing job that produced a signature.
pub const ATTR_SIGNING_JOB: &str = "com.amazonaws.signer.signingJob";

/// Unix timestamp of the contract's zero instant (`0001-01-01T00:00:00Z`).
const ZERO_INSTANT_UNIX: i64 = -62_135_596_800;

/// A plugin capability.
///
/// Unknown values are kept verbatim so that validation can name them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Capability {
    SignatureGenerator,
    EnvelopeGenerator,
    TrustedIdentityVerifier,
    RevocationCheckVerifier,
    Other(String),
}

impl Capability {
    pub fn as_str(&self) -> &str {
        match self {
            Self::SignatureGenerator => "SIGNATURE_GENERATOR.RAW",
            Self::EnvelopeGenerator => "SIGNATURE_GENERATOR.ENVELOPE",
            Self::TrustedIdentityVerifier => "SIGNATURE_VERIFIER.TRUSTED_IDENTITY",
            Self::RevocationCheckVerifier => "SIGNATURE_VERIFIER.REVOCATION_CHECK",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for Capability {
    fn from(s: String) -> Self {
        match s.as_str() {
            "SIGNATURE_GENERATOR.RAW" => Self::SignatureGenerator,
            "SIGNATURE_GENERATOR.ENVELOPE" => Self::EnvelopeGenerator,
            "SIGNATURE_VERIFIER.TRUSTED_IDENTITY" => Self::TrustedIdentityVerifier,
            "SIGNATURE_VERIFIER.REVOCATION_CHECK" => Self::RevocationCheckVerifier,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for Capability {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<Capability> for String {
    fn from(c: Capability) -> Self {
        match c {
            Capability::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request to produce a signature envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningRequest {
    pub contract_version: String,

    /// Signing profile or signing profile version ARN.
    pub key_id: String,

    pub payload_type: String,

    pub signature_envelope_type: String,

    #[serde(default, with = "base64_bytes")]
    pub payload: Vec<u8>,

    /// Must be zero; expiry is configured on the signing profile.
    #[serde(default)]
    pub expiry_duration_in_seconds: i64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub plugin_config: BTreeMap<String, String>,
}

/// Signed envelope returned to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningResponse {
    #[serde(with = "base64_bytes")]
    pub signature_envelope: Vec<u8>,

    pub signature_envelope_type: String,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub annotations: BTreeMap<String, String>,
}

/// Request to evaluate a signature against a trust policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRequest {
    pub contract_version: String,

    pub signature: Signature,

    pub trust_policy: TrustPolicy,

    #[serde(default, deserialize_with = "null_as_default")]
    pub plugin_config: BTreeMap<String, String>,
}

/// Signature as seen by the plugin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signature {
    pub critical_attributes: CriticalAttributes,

    #[serde(default, deserialize_with = "null_as_default")]
    pub unprocessed_attributes: Vec<String>,

    /// DER certificates, leaf first.
    #[serde(default, with = "base64_chain")]
    pub certificate_chain: Vec<Vec<u8>>,
}

/// Signed attributes the plugin must understand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalAttributes {
    #[serde(default)]
    pub content_type: String,

    #[serde(default)]
    pub signing_scheme: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentic_signing_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub extended_attributes: ExtendedAttributes,
}

impl CriticalAttributes {
    /// Whether the authentic signing time is absent or the zero instant.
    pub fn signing_time_is_zero(&self) -> bool {
        self.authentic_signing_time
            .map_or(true, |t| t.timestamp() == ZERO_INSTANT_UNIX && t.timestamp_subsec_nanos() == 0)
    }
}

/// Loosely typed extended attributes with checked accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ExtendedAttributes(BTreeMap<String, serde_json::Value>);

/// Why an extended attribute could not be read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttributeError {
    #[error("attribute {0:?} is missing")]
    Missing(String),

    #[error("attribute {0:?} is not a string")]
    NotAString(String),
}

impl AttributeError {
    pub fn key(&self) -> &str {
        match self {
            Self::Missing(k) | Self::NotAString(k) => k,
        }
    }
}

impl ExtendedAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `key` as a string.
    pub fn get_str(&self, key: &str) -> Result<&str, AttributeError> {
        match self.0.get(key) {
            None => Err(AttributeError::Missing(key.to_string())),
            Some(serde_json::Value::String(s)) => Ok(s),
            Some(_) => Err(AttributeError::NotAString(key.to_string())),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for ExtendedAttributes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        null_as_default(deserializer).map(Self)
    }
}

impl<K, V> FromIterator<(K, V)> for ExtendedAttributes
where
    K: Into<String>,
    V: Into<serde_json::Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Caller-supplied trust policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustPolicy {
    #[serde(default, deserialize_with = "null_as_default")]
    pub trusted_identities: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub signature_verification: Vec<Capability>,
}

/// Outcome of one verification capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub success: bool,
    pub reason: String,
}

impl VerificationResult {
    pub fn success(reason: impl Into<String>) -> Self {
        Self {
            success: true,
            reason: reason.into(),
        }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            reason: reason.into(),
        }
    }
}

/// Accumulated verification outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResponse {
    pub verification_results: BTreeMap<Capability, VerificationResult>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub processed_attributes: Vec<String>,
}

impl VerificationResponse {
    /// Record `attribute` as processed, keeping insertion order and no duplicates.
    pub fn mark_processed(&mut self, attribute: &str) {
        if !self.processed_attributes.iter().any(|a| a == attribute) {
            self.processed_attributes.push(attribute.to_string());
        }
    }
}

/// Static plugin descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataResponse {
    pub name: String,
    pub description: String,
    pub version: String,
    pub url: String,
    pub supported_contract_versions: Vec<String>,
    pub capabilities: Vec<Capability>,
}

/// Treat JSON `null` like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(bytes))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        BASE64.decode(encoded).map_err(serde::de::Error::custom)
    }
}

mod base64_chain {
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(
        chain: &[Vec<u8>],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(chain.len()))?;
        for cert in chain {
            seq.serialize_element(&BASE64.encode(cert))?;
        }
        seq.end()
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Vec<u8>>, D::Error> {
        Option::<Vec<String>>::deserialize(deserializer)?
            .unwrap_or_default()
            .into_iter()
            .map(|encoded| BASE64.decode(encoded).map_err(serde::de::Error::custom))
            .collect()
    }
}
