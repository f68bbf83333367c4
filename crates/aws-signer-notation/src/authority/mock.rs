//! In-memory [`TrustAuthority`] that records calls and replays canned replies.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{
    AuthorityError, AuthorityResult, RevocationStatusInput, RevocationStatusOutput,
    SignPayloadInput, SignPayloadOutput, TrustAuthority,
};

#[derive(Debug, Default)]
pub(crate) struct MockAuthority {
    sign_reply: Mutex<Option<AuthorityResult<SignPayloadOutput>>>,
    revocation_reply: Mutex<Option<AuthorityResult<RevocationStatusOutput>>>,
    sign_calls: Mutex<Vec<SignPayloadInput>>,
    revocation_calls: Mutex<Vec<RevocationStatusInput>>,
}

impl MockAuthority {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_signature(self, signature: &[u8]) -> Self {
        self.with_sign_reply(Ok(SignPayloadOutput {
            signature: signature.to_vec(),
            ..SignPayloadOutput::default()
        }))
    }

    pub(crate) fn with_sign_reply(self, reply: AuthorityResult<SignPayloadOutput>) -> Self {
        *self.sign_reply.lock().unwrap() = Some(reply);
        self
    }

    pub(crate) fn with_revoked(self, entities: &[&str]) -> Self {
        self.with_revocation_reply(Ok(RevocationStatusOutput {
            revoked_entities: entities.iter().map(|e| e.to_string()).collect(),
        }))
    }

    pub(crate) fn with_revocation_reply(
        self,
        reply: AuthorityResult<RevocationStatusOutput>,
    ) -> Self {
        *self.revocation_reply.lock().unwrap() = Some(reply);
        self
    }

    pub(crate) fn sign_calls(&self) -> Vec<SignPayloadInput> {
        self.sign_calls.lock().unwrap().clone()
    }

    pub(crate) fn revocation_calls(&self) -> Vec<RevocationStatusInput> {
        self.revocation_calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.sign_calls.lock().unwrap().len() + self.revocation_calls.lock().unwrap().len()
    }
}

fn unconfigured(operation: &str) -> AuthorityError {
    AuthorityError::Transport {
        message: format!("mock: no reply configured for {}", operation),
        request_id: None,
    }
}

#[async_trait]
impl TrustAuthority for MockAuthority {
    async fn sign_payload(&self, input: SignPayloadInput) -> AuthorityResult<SignPayloadOutput> {
        self.sign_calls.lock().unwrap().push(input);
        self.sign_reply
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Err(unconfigured("SignPayload")))
    }

    async fn get_revocation_status(
        &self,
        input: RevocationStatusInput,
    ) -> AuthorityResult<RevocationStatusOutput> {
        self.revocation_calls.lock().unwrap().push(input);
        self.revocation_reply
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Err(unconfigured("GetRevocationStatus")))
    }
}
