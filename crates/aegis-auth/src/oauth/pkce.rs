//! Proof Key for Code Exchange (RFC 7636).
//!
//! Server-side PKCE validation for the S256 method. The authorize endpoint
//! parses the incoming challenge with [`CodeChallenge::parse`] and rejects
//! every `code_challenge_method` except `"S256"` via [`require_s256`]; the
//! token endpoint parses the presented verifier and checks it with
//! [`CodeChallenge::matches`]. The "plain" method is never accepted.
//!
//! [`CodeVerifier::random`] produces fresh client-side verifiers, used by
//! tests and demo clients.
//!
//! Validation failures surface as [`AuthError::InvalidRequest`]; callers
//! at the token endpoint remap them to grant errors, and a hash mismatch
//! is reported by the caller as `PkceVerificationFailed`.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::AuthResult;
use crate::error::AuthError;

/// The only supported `code_challenge_method`.
pub const CHALLENGE_METHOD_S256: &str = "S256";

/// Length of a base64url-encoded SHA-256 digest.
const S256_CHALLENGE_LEN: usize = 43;

/// Computes `BASE64URL(SHA256(ASCII(input)))` (RFC 7636 §4.2).
fn s256(input: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(input.as_bytes()))
}

/// RFC 3986 unreserved characters, the verifier alphabet (RFC 7636 §4.1).
fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~')
}

/// Accepts only the S256 challenge method.
///
/// # Errors
///
/// Returns `InvalidRequest` for any other value. "plain" gets a dedicated
/// message since clients downgrading to it is the interception attack PKCE
/// exists to stop.
pub fn require_s256(method: &str) -> AuthResult<()> {
    match method {
        CHALLENGE_METHOD_S256 => Ok(()),
        "plain" => Err(AuthError::invalid_request(
            "code_challenge_method must equal \"S256\"; the plain method is not accepted",
        )),
        other => Err(AuthError::invalid_request(format!(
            "Unsupported code_challenge_method '{other}'; only S256 is accepted"
        ))),
    }
}

/// A validated S256 code challenge.
///
/// The authorize endpoint stores this alongside the minted authorization
/// code; the token endpoint later checks the presented verifier against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeChallenge(String);

impl CodeChallenge {
    /// Parses a `code_challenge` request parameter.
    ///
    /// An S256 challenge is always the 43-character base64url encoding of
    /// a SHA-256 digest; anything else cannot have come from a conforming
    /// client.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` when the shape is wrong.
    pub fn parse(challenge: &str) -> AuthResult<Self> {
        if challenge.len() != S256_CHALLENGE_LEN
            || !challenge
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(AuthError::invalid_request(
                "code_challenge must be the base64url-encoded SHA-256 digest of the verifier",
            ));
        }
        Ok(Self(challenge.to_string()))
    }

    /// Returns `true` when `verifier` hashes to this challenge.
    pub fn matches(&self, verifier: &CodeVerifier) -> bool {
        s256(verifier.as_str()) == self.0
    }

    /// The challenge as sent on the wire.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A validated code verifier.
///
/// Per RFC 7636 §4.1: 43-128 characters drawn from the RFC 3986
/// unreserved set.
#[derive(Debug, Clone)]
pub struct CodeVerifier(String);

impl CodeVerifier {
    /// Parses a `code_verifier` request parameter.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` when the length or alphabet is wrong.
    pub fn parse(verifier: &str) -> AuthResult<Self> {
        let len = verifier.len();
        if !(43..=128).contains(&len) {
            return Err(AuthError::invalid_request(format!(
                "code_verifier must be 43-128 characters, got {len}"
            )));
        }
        if !verifier.bytes().all(is_unreserved) {
            return Err(AuthError::invalid_request(
                "code_verifier contains characters outside the RFC 3986 unreserved set",
            ));
        }
        Ok(Self(verifier.to_string()))
    }

    /// Generates a fresh random verifier.
    ///
    /// 64 random bytes encode to 86 characters, comfortably inside the
    /// 43-128 window.
    #[must_use]
    pub fn random() -> Self {
        let mut bytes = [0u8; 64];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Derives the S256 challenge this verifier answers.
    #[must_use]
    pub fn challenge(&self) -> CodeChallenge {
        CodeChallenge(s256(&self.0))
    }

    /// The verifier as sent on the wire.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
