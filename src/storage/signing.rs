//! HMAC-signed download links.

use std::time::Duration;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::Disposition;
use crate::error::{PayrollError, PayrollResult};

type HmacSha256 = Hmac<Sha256>;

/// Issues and verifies time-limited links to stored objects.
///
/// A link is `{public_base_url}/files/{key}?disposition=..&expires=..&signature=..`,
/// where the signature is the hex HMAC-SHA256 of the key, disposition and
/// expiry timestamp. Each key segment is percent-encoded in the link; the
/// signature covers the decoded key.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use payroll_engine::storage::{Disposition, UrlSigner};
///
/// let signer = UrlSigner::new("secret", "http://localhost:3000");
/// let now = chrono::Utc::now();
/// let url = signer
///     .signed_url("emp_001/emp_001-01~2026.pdf", Disposition::Inline, Duration::from_secs(60), now)
///     .unwrap();
/// assert!(url.starts_with("http://localhost:3000/files/emp_001/emp_001-01~2026.pdf?disposition=inline"));
/// ```
#[derive(Clone)]
pub struct UrlSigner {
    secret: Vec<u8>,
    public_base_url: String,
}

impl std::fmt::Debug for UrlSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlSigner")
            .field("public_base_url", &self.public_base_url)
            .finish_non_exhaustive()
    }
}

impl UrlSigner {
    /// Creates a signer. A trailing slash on the base url is dropped.
    pub fn new(secret: impl AsRef<[u8]>, public_base_url: impl Into<String>) -> Self {
        let public_base_url: String = public_base_url.into();
        Self {
            secret: secret.as_ref().to_vec(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn mac(&self, key: &str, disposition: Disposition, expires: i64) -> PayrollResult<HmacSha256> {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).map_err(|_| PayrollError::InvalidSignature)?;
        mac.update(format!("{}\n{}\n{}", key, disposition.as_str(), expires).as_bytes());
        Ok(mac)
    }

    /// Returns the hex signature for a key, disposition and expiry.
    pub fn signature(
        &self,
        key: &str,
        disposition: Disposition,
        expires: i64,
    ) -> PayrollResult<String> {
        let mac = self.mac(key, disposition, expires)?;
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Builds a link to `key` valid for `ttl` from `now`.
    pub fn signed_url(
        &self,
        key: &str,
        disposition: Disposition,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> PayrollResult<String> {
        let ttl_seconds = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let expires = now.timestamp().saturating_add(ttl_seconds);
        let signature = self.signature(key, disposition, expires)?;
        let encoded_key = key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        Ok(format!(
            "{}/files/{}?disposition={}&expires={}&signature={}",
            self.public_base_url,
            encoded_key,
            disposition.as_str(),
            expires,
            signature
        ))
    }

    /// Checks a link's signature and expiry.
    ///
    /// Fails with `InvalidSignature` if the signature does not match or
    /// `now` is past `expires`.
    pub fn verify(
        &self,
        key: &str,
        disposition: Disposition,
        expires: i64,
        signature: &str,
        now: DateTime<Utc>,
    ) -> PayrollResult<()> {
        let provided = hex::decode(signature).map_err(|_| PayrollError::InvalidSignature)?;
        self.mac(key, disposition, expires)?
            .verify_slice(&provided)
            .map_err(|_| PayrollError::InvalidSignature)?;

        if now.timestamp() > expires {
            return Err(PayrollError::InvalidSignature);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "emp_001/emp_001-01~2026.pdf";

    fn now() -> DateTime<Utc> {
        "2026-02-01T09:00:00Z".parse().unwrap()
    }

    fn query_param<'a>(url: &'a str, name: &str) -> &'a str {
        let query = url.split_once('?').unwrap().1;
        query
            .split('&')
            .find_map(|pair| pair.strip_prefix(&format!("{}=", name)))
            .unwrap()
    }

    #[test]
    fn test_signed_url_verifies() {
        let signer = UrlSigner::new("s3cret", "http://localhost:3000/");
        let url = signer
            .signed_url(KEY, Disposition::Attachment, Duration::from_secs(300), now())
            .unwrap();

        assert!(url.starts_with("http://localhost:3000/files/emp_001/"));
        let expires: i64 = query_param(&url, "expires").parse().unwrap();
        assert_eq!(expires, now().timestamp() + 300);
        let signature = query_param(&url, "signature");
        assert!(signer
            .verify(KEY, Disposition::Attachment, expires, signature, now())
            .is_ok());
    }

    #[test]
    fn test_key_segments_are_percent_encoded() {
        let signer = UrlSigner::new("s3cret", "http://localhost:3000");
        let key = "emp 7#a?/emp 7#a?-01~2026.pdf";
        let url = signer
            .signed_url(key, Disposition::Inline, Duration::from_secs(60), now())
            .unwrap();

        assert!(url.starts_with(
            "http://localhost:3000/files/emp%207%23a%3F/emp%207%23a%3F-01~2026.pdf?disposition=inline&"
        ));
        let expires: i64 = query_param(&url, "expires").parse().unwrap();
        let signature = query_param(&url, "signature");
        assert!(signer
            .verify(key, Disposition::Inline, expires, signature, now())
            .is_ok());
    }

    #[test]
    fn test_tampered_link_is_rejected() {
        let signer = UrlSigner::new("s3cret", "http://localhost:3000");
        let expires = now().timestamp() + 300;
        let signature = signer.signature(KEY, Disposition::Inline, expires).unwrap();

        let other_key = signer.verify(
            "emp_002/emp_002-01~2026.pdf",
            Disposition::Inline,
            expires,
            &signature,
            now(),
        );
        assert!(matches!(other_key, Err(PayrollError::InvalidSignature)));

        let other_disposition =
            signer.verify(KEY, Disposition::Attachment, expires, &signature, now());
        assert!(matches!(other_disposition, Err(PayrollError::InvalidSignature)));

        let extended = signer.verify(KEY, Disposition::Inline, expires + 3600, &signature, now());
        assert!(matches!(extended, Err(PayrollError::InvalidSignature)));

        let garbage = signer.verify(KEY, Disposition::Inline, expires, "not-hex", now());
        assert!(matches!(garbage, Err(PayrollError::InvalidSignature)));
    }

    #[test]
    fn test_expired_link_is_rejected() {
        let signer = UrlSigner::new("s3cret", "http://localhost:3000");
        let expires = now().timestamp() - 1;
        let signature = signer.signature(KEY, Disposition::Inline, expires).unwrap();
        let result = signer.verify(KEY, Disposition::Inline, expires, &signature, now());
        assert!(matches!(result, Err(PayrollError::InvalidSignature)));
    }

    #[test]
    fn test_different_secret_is_rejected() {
        let issuer = UrlSigner::new("one", "http://localhost:3000");
        let verifier = UrlSigner::new("two", "http://localhost:3000");
        let expires = now().timestamp() + 60;
        let signature = issuer.signature(KEY, Disposition::Inline, expires).unwrap();
        assert!(verifier
            .verify(KEY, Disposition::Inline, expires, &signature, now())
            .is_err());
    }
}
