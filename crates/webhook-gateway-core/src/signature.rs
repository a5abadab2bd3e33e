//! Webhook authentication: HMAC signature verification for GitHub and
//! shared-secret token comparison for GitLab.
//!
//! Both verifiers compare in constant time so that a client cannot recover
//! bytes of the secret by timing how quickly a mismatch is rejected.

use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::ValidationError;

type HmacSha256 = Hmac<Sha256>;
type HmacSha1 = Hmac<Sha1>;

/// Something that can authenticate a webhook body against a configured secret.
pub trait SignatureVerifier {
    /// Verify `body` against whatever header(s) the provider sends, using
    /// `secret` as the shared key. `header` returns `None` when the header
    /// this verifier needs was not present on the request.
    fn verify(
        &self,
        body: &[u8],
        header: impl Fn(&str) -> Option<String>,
        secret: &str,
    ) -> Result<(), ValidationError>;
}

/// Verifies GitHub's `X-Hub-Signature-256` (preferred) or legacy
/// `X-Hub-Signature` (SHA1) headers.
///
/// GitHub sends both headers on every delivery for backwards compatibility;
/// this verifier always prefers the SHA256 header when present and only
/// falls back to SHA1 if it is missing.
#[derive(Debug, Default, Clone, Copy)]
pub struct GithubSignatureVerifier;

impl SignatureVerifier for GithubSignatureVerifier {
    fn verify(
        &self,
        body: &[u8],
        header: impl Fn(&str) -> Option<String>,
        secret: &str,
    ) -> Result<(), ValidationError> {
        if let Some(raw) = header("x-hub-signature-256") {
            let hex_part = raw.strip_prefix("sha256=").ok_or_else(|| {
                ValidationError::UnsupportedScheme {
                    header: "x-hub-signature-256".to_string(),
                }
            })?;
            return verify_hmac_sha256(body, hex_part, secret);
        }

        if let Some(raw) = header("x-hub-signature") {
            let hex_part = raw.strip_prefix("sha1=").ok_or_else(|| {
                ValidationError::UnsupportedScheme {
                    header: "x-hub-signature".to_string(),
                }
            })?;
            return verify_hmac_sha1(body, hex_part, secret);
        }

        Err(ValidationError::MissingSignatureHeader {
            header: "x-hub-signature-256".to_string(),
        })
    }
}

fn verify_hmac_sha256(body: &[u8], hex_digest: &str, secret: &str) -> Result<(), ValidationError> {
    let expected = hex::decode(hex_digest).map_err(|e| ValidationError::InvalidHexEncoding {
        message: e.to_string(),
    })?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts a key of any length");
    mac.update(body);
    mac.verify_slice(&expected)
        .map_err(|_| ValidationError::SignatureMismatch)
}

fn verify_hmac_sha1(body: &[u8], hex_digest: &str, secret: &str) -> Result<(), ValidationError> {
    let expected = hex::decode(hex_digest).map_err(|e| ValidationError::InvalidHexEncoding {
        message: e.to_string(),
    })?;

    let mut mac =
        HmacSha1::new_from_slice(secret.as_bytes()).expect("HMAC accepts a key of any length");
    mac.update(body);
    mac.verify_slice(&expected)
        .map_err(|_| ValidationError::SignatureMismatch)
}

/// Verifies GitLab's `X-Gitlab-Token` header, a plain shared secret rather
/// than an HMAC of the body.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitlabTokenVerifier;

impl SignatureVerifier for GitlabTokenVerifier {
    fn verify(
        &self,
        _body: &[u8],
        header: impl Fn(&str) -> Option<String>,
        secret: &str,
    ) -> Result<(), ValidationError> {
        let token = header("x-gitlab-token").ok_or_else(|| ValidationError::MissingSignatureHeader {
            header: "x-gitlab-token".to_string(),
        })?;

        if token.as_bytes().ct_eq(secret.as_bytes()).into() {
            Ok(())
        } else {
            Err(ValidationError::SignatureMismatch)
        }
    }
}

#[cfg(test)]
#[path = "signature_tests.rs"]
mod tests;
