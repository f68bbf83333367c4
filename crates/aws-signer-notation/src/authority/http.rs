//! HTTP backend for AWS Signer: request building and status mapping.
//!
//! This is the ONLY place that interprets HTTP status codes and error
//! headers. Callers see [`AuthorityError`] values.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::SecondsFormat;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::PluginConfig;
use crate::error::{PluginError, PluginResult};

use super::helpers::{parse_error_code, parse_error_message};
use super::{
    AuthorityError, AuthorityResult, RevocationStatusInput, RevocationStatusOutput,
    SignPayloadInput, SignPayloadOutput, TrustAuthority,
};

/// User agent sent with every AWS Signer call.
pub const USER_AGENT_VALUE: &str =
    concat!("aws-signer-caller/NotationPlugin/", env!("CARGO_PKG_VERSION"));

const HEADER_REQUEST_ID: &str = "x-amzn-RequestId";
const HEADER_ERROR_TYPE: &str = "x-amzn-ErrorType";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignPayloadBody<'a> {
    profile_name: &'a str,
    profile_owner: &'a str,
    payload: String,
    payload_format: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignPayloadReply {
    #[serde(default)]
    job_id: Option<String>,
    #[serde(default)]
    job_owner: Option<String>,
    #[serde(default)]
    metadata: Option<BTreeMap<String, String>>,
    #[serde(default)]
    signature: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RevocationStatusReply {
    #[serde(default)]
    revoked_entities: Option<Vec<String>>,
}

/// AWS Signer client speaking the REST surface over `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTrustAuthority {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTrustAuthority {
    pub fn new(config: &PluginConfig) -> PluginResult<Self> {
        let endpoint = config.endpoint()?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(default_headers)
            .build()
            .map_err(|e| PluginError::generic(format!("failed to create HTTP client: {}", e)))?;

        let base_url = endpoint.as_str().trim_end_matches('/').to_string();
        debug!(
            endpoint = %base_url,
            region = ?config.region,
            profile = ?config.profile,
            timeout_secs = config.timeout_secs,
            "initialized AWS Signer client"
        );

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> AuthorityResult<reqwest::Response> {
        let response = request.send().await.map_err(|e| {
            warn!(error = %e, timeout = e.is_timeout(), "AWS Signer request failed");
            AuthorityError::Transport {
                message: format!("failed to call AWS Signer: {}", e),
                request_id: None,
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let request_id = header_str(response.headers(), HEADER_REQUEST_ID);
        let error_type = header_str(response.headers(), HEADER_ERROR_TYPE);
        let body: Option<serde_json::Value> = response
            .text()
            .await
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok());

        debug!(
            status = status.as_u16(),
            request_id = ?request_id,
            error_type = ?error_type,
            "AWS Signer returned an error"
        );

        match parse_error_code(error_type.as_deref(), body.as_ref()) {
            Some(code) => Err(AuthorityError::Api {
                code,
                message: parse_error_message(body.as_ref()),
                request_id,
            }),
            None => Err(AuthorityError::Transport {
                message: format!(
                    "http response error StatusCode: {}, RequestID: {}",
                    status.as_u16(),
                    request_id.as_deref().unwrap_or_default()
                ),
                request_id,
            }),
        }
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        operation: &str,
    ) -> AuthorityResult<T> {
        let request_id = header_str(response.headers(), HEADER_REQUEST_ID);
        response
            .json::<T>()
            .await
            .map_err(|e| AuthorityError::Transport {
                message: format!("failed to decode {} response: {}", operation, e),
                request_id,
            })
    }
}

#[async_trait]
impl TrustAuthority for HttpTrustAuthority {
    async fn sign_payload(&self, input: SignPayloadInput) -> AuthorityResult<SignPayloadOutput> {
        let url = format!("{}/signing-jobs/with-payload", self.base_url);
        debug!(url = %url, profile_name = %input.profile_name, "calling SignPayload");

        let body = SignPayloadBody {
            profile_name: &input.profile_name,
            profile_owner: &input.profile_owner,
            payload: BASE64.encode(&input.payload),
            payload_format: &input.payload_format,
        };

        let response = self.send(self.client.post(&url).json(&body)).await?;
        let request_id = header_str(response.headers(), HEADER_REQUEST_ID);
        let reply: SignPayloadReply = Self::decode(response, "SignPayload").await?;

        let signature = BASE64
            .decode(reply.signature.unwrap_or_default())
            .map_err(|e| AuthorityError::Transport {
                message: format!("failed to decode SignPayload signature: {}", e),
                request_id,
            })?;

        debug!(job_id = ?reply.job_id, "SignPayload succeeded");
        Ok(SignPayloadOutput {
            signature,
            job_id: reply.job_id,
            job_owner: reply.job_owner,
            metadata: reply.metadata.unwrap_or_default(),
        })
    }

    async fn get_revocation_status(
        &self,
        input: RevocationStatusInput,
    ) -> AuthorityResult<RevocationStatusOutput> {
        let url = format!("{}/revocations", self.base_url);
        debug!(url = %url, job_arn = %input.job_arn, "calling GetRevocationStatus");

        let mut query: Vec<(&str, String)> = vec![
            (
                "signatureTimestamp",
                input
                    .signature_timestamp
                    .to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
            ("platformId", input.platform_id),
            ("profileVersionArn", input.profile_version_arn),
            ("jobArn", input.job_arn),
        ];
        query.extend(
            input
                .certificate_hashes
                .into_iter()
                .map(|hash| ("certificateHashes", hash)),
        );

        let response = self.send(self.client.get(&url).query(&query)).await?;
        let reply: RevocationStatusReply = Self::decode(response, "GetRevocationStatus").await?;

        let revoked_entities = reply.revoked_entities.unwrap_or_default();
        debug!(revoked = revoked_entities.len(), "GetRevocationStatus succeeded");
        Ok(RevocationStatusOutput { revoked_entities })
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}
