//! Alist download-link signing.
//!
//! Alist serves files at `/d/<path>?sign=<sig>` where
//! `sig = base64url(HMAC-SHA256(token, "<path>:<expire>")) + ":" + expire`.
//! An expire of 0 never expires.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};
use url::Url;

use crate::config::AlistConfig;
use crate::strm::hooks::HookContext;

type HmacSha256 = Hmac<Sha256>;

/// Turns Alist paths into signed download URLs.
#[derive(Debug, Clone)]
pub struct AlistSigner {
    base: Url,
    token: String,
    expire_secs: u64,
}

impl AlistSigner {
    pub fn new(base: Url, token: impl Into<String>, expire_secs: u64) -> Self {
        Self {
            base,
            token: token.into(),
            expire_secs,
        }
    }

    pub fn from_config(config: &AlistConfig) -> Result<Self, url::ParseError> {
        let base = Url::parse(&config.url)?;
        Ok(Self::new(base, config.token.clone(), config.sign_expire_secs))
    }

    /// Signature for `path` valid until `expire` (unix seconds, 0 = forever).
    pub fn sign(&self, path: &str, expire: u64) -> String {
        // HMAC accepts keys of any length
        let mut mac = match HmacSha256::new_from_slice(self.token.as_bytes()) {
            Ok(mac) => mac,
            Err(_) => return String::new(),
        };
        mac.update(format!("{}:{}", path, expire).as_bytes());
        let digest = mac.finalize().into_bytes();
        format!("{}:{}", URL_SAFE.encode(digest), expire)
    }

    fn expire_at(&self, now: u64) -> u64 {
        if self.expire_secs == 0 {
            0
        } else {
            now.saturating_add(self.expire_secs)
        }
    }

    /// Signed download URL for an Alist path, as of `now`.
    ///
    /// Absolute http(s) targets are returned unchanged.
    pub fn signed_url(&self, target: &str, now: u64) -> String {
        if target.starts_with("http://") || target.starts_with("https://") {
            return target.to_string();
        }

        let path = if target.starts_with('/') {
            target.to_string()
        } else {
            format!("/{}", target)
        };

        let mut url = self.base.clone();
        match url.path_segments_mut() {
            Ok(mut segments) => {
                segments
                    .pop_if_empty()
                    .push("d")
                    .extend(path.split('/').filter(|s| !s.is_empty()));
            }
            Err(()) => {
                tracing::warn!(base = %self.base, "Alist base URL cannot carry a path");
                return target.to_string();
            }
        }

        let sign = self.sign(&path, self.expire_at(now));
        url.query_pairs_mut().append_pair("sign", &sign);
        url.to_string()
    }

    /// Hook form, stamped with the current time.
    pub fn transform(&self, content: &str, _ctx: &HookContext) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        self.signed_url(content, now)
    }
}
