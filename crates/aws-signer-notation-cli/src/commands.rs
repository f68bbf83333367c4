//! Command dispatch onto the plugin.
//!
//! Contract failures come back as [`PluginError`]; the caller decides how to
//! render them.

use aws_signer_notation::{
    PluginError, PluginResult, SignerPlugin, SigningRequest, VerificationRequest,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

use crate::args::Command;

/// What a successful command prints on stdout.
#[derive(Debug, PartialEq)]
pub enum Output {
    Json(Value),
    Text(String),
}

pub async fn dispatch<R>(plugin: &SignerPlugin, cmd: Command, stdin: R) -> PluginResult<Output>
where
    R: AsyncRead + Unpin,
{
    debug!(command = ?cmd, "dispatching");

    match cmd {
        Command::GetPluginMetadata => to_json(&plugin.metadata()),
        Command::Version => Ok(Output::Text(format!(
            "notation-aws-signer - {}\nVersion: {}",
            aws_signer_notation::plugin::PLUGIN_DESCRIPTION,
            aws_signer_notation::VERSION
        ))),
        Command::DescribeKey => match plugin.describe_key() {
            Ok(never) => match never {},
            Err(e) => Err(e),
        },
        Command::GenerateSignature => match plugin.generate_signature() {
            Ok(never) => match never {},
            Err(e) => Err(e),
        },
        Command::GenerateEnvelope => {
            let request: SigningRequest = read_request(stdin).await?;
            to_json(&plugin.generate_envelope(&request).await?)
        }
        Command::VerifySignature => {
            let request: VerificationRequest = read_request(stdin).await?;
            to_json(&plugin.verify_signature(&request).await?)
        }
    }
}

async fn read_request<T, R>(mut stdin: R) -> PluginResult<T>
where
    T: DeserializeOwned,
    R: AsyncRead + Unpin,
{
    let mut input = String::new();
    stdin
        .read_to_string(&mut input)
        .await
        .map_err(|e| PluginError::generic(format!("failed to read request: {}", e)))?;

    serde_json::from_str(&input)
        .map_err(|e| PluginError::validation(format!("failed to parse request: {}", e)))
}

fn to_json<T: serde::Serialize>(value: &T) -> PluginResult<Output> {
    serde_json::to_value(value)
        .map(Output::Json)
        .map_err(|e| PluginError::generic(format!("failed to encode response: {}", e)))
}
