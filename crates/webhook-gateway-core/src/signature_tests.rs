use super::*;
use hmac::{Hmac, Mac};
use sha1::Sha1 as Sha1Digest;
use sha2::Sha256 as Sha256Digest;

fn sha256_header(body: &[u8], secret: &str) -> String {
    let mut mac = Hmac::<Sha256Digest>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(body);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

fn sha1_header(body: &[u8], secret: &str) -> String {
    let mut mac = Hmac::<Sha1Digest>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(body);
    format!("sha1={}", hex::encode(mac.finalize().into_bytes()))
}

#[test]
fn github_accepts_valid_sha256_signature() {
    let body = br#"{"action":"opened"}"#;
    let secret = "topsecret";
    let header_value = sha256_header(body, secret);

    let result = GithubSignatureVerifier.verify(
        body,
        |name| {
            if name == "x-hub-signature-256" {
                Some(header_value.clone())
            } else {
                None
            }
        },
        secret,
    );

    assert!(result.is_ok());
}

#[test]
fn github_falls_back_to_sha1_when_sha256_absent() {
    let body = br#"{"action":"opened"}"#;
    let secret = "topsecret";
    let header_value = sha1_header(body, secret);

    let result = GithubSignatureVerifier.verify(
        body,
        |name| {
            if name == "x-hub-signature" {
                Some(header_value.clone())
            } else {
                None
            }
        },
        secret,
    );

    assert!(result.is_ok());
}

#[test]
fn github_prefers_sha256_over_sha1_when_both_present() {
    let body = br#"{"action":"opened"}"#;
    let secret = "topsecret";
    let good_256 = sha256_header(body, secret);
    // Deliberately wrong SHA1 value; verification must still succeed because
    // the SHA256 header takes priority.
    let bad_1 = "sha1=0000000000000000000000000000000000000000".to_string();

    let result = GithubSignatureVerifier.verify(
        body,
        |name| match name {
            "x-hub-signature-256" => Some(good_256.clone()),
            "x-hub-signature" => Some(bad_1.clone()),
            _ => None,
        },
        secret,
    );

    assert!(result.is_ok());
}

#[test]
fn github_rejects_tampered_body() {
    let secret = "topsecret";
    let header_value = sha256_header(b"original", secret);

    let result = GithubSignatureVerifier.verify(
        b"tampered",
        |name| {
            if name == "x-hub-signature-256" {
                Some(header_value.clone())
            } else {
                None
            }
        },
        secret,
    );

    assert_eq!(result, Err(ValidationError::SignatureMismatch));
}

#[test]
fn github_rejects_missing_headers() {
    let result = GithubSignatureVerifier.verify(b"body", |_| None, "secret");
    assert_eq!(
        result,
        Err(ValidationError::MissingSignatureHeader {
            header: "x-hub-signature-256".to_string()
        })
    );
}

#[test]
fn github_rejects_non_hex_signature() {
    let result = GithubSignatureVerifier.verify(
        b"body",
        |name| {
            if name == "x-hub-signature-256" {
                Some("sha256=not-hex".to_string())
            } else {
                None
            }
        },
        "secret",
    );
    assert!(matches!(
        result,
        Err(ValidationError::InvalidHexEncoding { .. })
    ));
}

#[test]
fn gitlab_accepts_matching_token() {
    let result = GitlabTokenVerifier.verify(
        b"unused",
        |name| {
            if name == "x-gitlab-token" {
                Some("shared-secret".to_string())
            } else {
                None
            }
        },
        "shared-secret",
    );
    assert!(result.is_ok());
}

#[test]
fn gitlab_rejects_mismatched_token() {
    let result = GitlabTokenVerifier.verify(
        b"unused",
        |name| {
            if name == "x-gitlab-token" {
                Some("wrong".to_string())
            } else {
                None
            }
        },
        "shared-secret",
    );
    assert_eq!(result, Err(ValidationError::SignatureMismatch));
}

#[test]
fn gitlab_rejects_missing_token_header() {
    let result = GitlabTokenVerifier.verify(b"unused", |_| None, "shared-secret");
    assert_eq!(
        result,
        Err(ValidationError::MissingSignatureHeader {
            header: "x-gitlab-token".to_string()
        })
    );
}
