//! Identity-verification gate
//!
//! The game only opens after a proof-of-personhood check succeeds. The proof
//! itself is checked by a backend endpoint; this module owns the wire types,
//! the request validation the endpoint performs, and the mapping from its
//! response to a typed result. Failures become user-facing messages and never
//! reach the simulation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Path the host posts verification payloads to
pub const VERIFY_ENDPOINT: &str = "/api/verify";

/// Required prefix of every application id
const APP_ID_PREFIX: &str = "app_";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    #[error("verification is not configured (missing app id)")]
    NotConfigured,
    #[error("invalid app id `{0}`")]
    InvalidAppId(String),
    #[error("app id mismatch: expected `{expected}`, received `{received}`")]
    AppIdMismatch { expected: String, received: String },
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("proof verification failed: {0}")]
    Rejected(String),
    #[error("verification request failed: {0}")]
    Transport(String),
}

/// How strongly the person was verified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationLevel {
    Orb,
    Device,
}

/// Payload posted to the verification endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyRequest {
    pub proof: String,
    pub merkle_root: String,
    pub nullifier_hash: String,
    pub verification_level: VerificationLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<String>,
    pub action: String,
    pub app_id: String,
}

impl VerifyRequest {
    /// Check the request the way the endpoint does before forwarding the proof
    pub fn validate(&self, expected_app_id: Option<&str>) -> Result<(), VerifyError> {
        let expected = expected_app_id
            .filter(|id| !id.is_empty())
            .ok_or(VerifyError::NotConfigured)?;

        if !self.app_id.starts_with(APP_ID_PREFIX) {
            return Err(VerifyError::InvalidAppId(self.app_id.clone()));
        }
        if self.app_id != expected {
            return Err(VerifyError::AppIdMismatch {
                expected: expected.to_string(),
                received: self.app_id.clone(),
            });
        }

        for (field, value) in [
            ("proof", &self.proof),
            ("merkle_root", &self.merkle_root),
            ("nullifier_hash", &self.nullifier_hash),
            ("action", &self.action),
        ] {
            if value.trim().is_empty() {
                return Err(VerifyError::MissingField(field));
            }
        }

        Ok(())
    }

    pub fn to_json(&self) -> Result<String, VerifyError> {
        serde_json::to_string(self).map_err(|e| VerifyError::Transport(e.to_string()))
    }
}

/// Endpoint reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullifier_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerifyResponse {
    /// Parse a response body
    pub fn from_json(body: &str) -> Result<Self, VerifyError> {
        serde_json::from_str(body).map_err(|e| VerifyError::Transport(e.to_string()))
    }

    /// `success: true` yields the nullifier hash (if echoed back); anything
    /// else is a rejection carrying the endpoint's message.
    pub fn into_result(self) -> Result<Option<String>, VerifyError> {
        if self.success {
            Ok(self.nullifier_hash)
        } else {
            Err(VerifyError::Rejected(
                self.error.unwrap_or_else(|| "Unknown reason".to_string()),
            ))
        }
    }
}

/// Something that can check a proof and answer like the endpoint does
pub trait Verifier {
    fn verify(&mut self, request: &VerifyRequest) -> Result<VerifyResponse, VerifyError>;
}

/// Runs the request checks locally and accepts anything that passes them.
/// Used by the headless build, where there is no backend to call.
#[derive(Debug, Clone)]
pub struct LocalVerifier {
    expected_app_id: Option<String>,
}

impl LocalVerifier {
    pub fn new(expected_app_id: Option<String>) -> Self {
        Self { expected_app_id }
    }
}

impl Verifier for LocalVerifier {
    fn verify(&mut self, request: &VerifyRequest) -> Result<VerifyResponse, VerifyError> {
        match request.validate(self.expected_app_id.as_deref()) {
            Ok(()) => Ok(VerifyResponse {
                success: true,
                nullifier_hash: Some(request.nullifier_hash.clone()),
                error: None,
            }),
            // Configuration problems are the server's fault, not the proof's
            Err(VerifyError::NotConfigured) => Err(VerifyError::NotConfigured),
            Err(e) => Ok(VerifyResponse {
                success: false,
                nullifier_hash: None,
                error: Some(e.to_string()),
            }),
        }
    }
}
