//! Rewrites media URLs so the browser fetches images through the backend
//! instead of hitting the S3 bucket directly. Pure string work; nothing here
//! performs I/O.

use serde_json::Value;

use crate::models::{Agent, Property};

/// Backend route that streams an object by key.
const PROXY_ROUTE: &str = "/api/s3-proxy/direct-key";

/// Converts stored media URLs into proxied ones.
#[derive(Debug, Clone)]
pub struct MediaProxy {
    api_base: String,
    /// When set, only URLs pointing at this bucket are rewritten.
    bucket: Option<String>,
}

impl MediaProxy {
    pub fn new(api_base: impl Into<String>, bucket: Option<String>) -> Self {
        let mut api_base = api_base.into();
        while api_base.ends_with('/') {
            api_base.pop();
        }
        Self { api_base, bucket }
    }

    /// Rewrite one URL, or hand it back untouched when it is not ours to
    /// rewrite. Empty strings, data URIs and already-proxied URLs always
    /// pass through.
    pub fn proxy_url(&self, url: &str) -> String {
        if url.is_empty() || url.starts_with("data:") || url.contains(PROXY_ROUTE) {
            return url.to_string();
        }
        match self.object_key(url) {
            Some(key) => format!(
                "{}{}?key={}",
                self.api_base,
                PROXY_ROUTE,
                urlencoding::encode(&key)
            ),
            None => url.to_string(),
        }
    }

    /// Extract the S3 object key from a URL we recognize: virtual-hosted
    /// bucket URLs, path-style S3 URLs, and uploads served from the backend's
    /// own origin. Anything else (foreign hosts, relative paths) returns
    /// `None`.
    fn object_key(&self, url: &str) -> Option<String> {
        let (host, path) = split_host_path(url)?;
        // Presigned query strings and fragments are not part of the key.
        let path = path.split(['?', '#']).next().unwrap_or(path);
        let key = path.trim_start_matches('/');
        if key.is_empty() {
            return None;
        }

        if let Some(bucket) = bucket_of_virtual_host(&host) {
            if !self.bucket_allowed(bucket) {
                return None;
            }
            return Some(key.to_string());
        }

        if is_s3_service_host(&host) {
            let (bucket, key) = key.split_once('/')?;
            if key.is_empty() || !self.bucket_allowed(bucket) {
                return None;
            }
            return Some(key.to_string());
        }

        // Files uploaded through the backend live on its origin but outside
        // the API route space.
        if let Some((api_host, _)) = split_host_path(&self.api_base) {
            if host == api_host && !path.starts_with("/api/") {
                return Some(key.to_string());
            }
        }

        None
    }

    fn bucket_allowed(&self, bucket: &str) -> bool {
        match &self.bucket {
            Some(configured) => configured.eq_ignore_ascii_case(bucket),
            None => true,
        }
    }

    /// Walk a JSON document and rewrite every string in place. Used on raw
    /// API payloads before they are shown or cached.
    pub fn rewrite_value(&self, value: &mut Value) {
        match value {
            Value::String(s) => {
                let rewritten = self.proxy_url(s);
                if rewritten != *s {
                    *s = rewritten;
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.rewrite_value(item);
                }
            }
            Value::Object(map) => {
                for (_, item) in map.iter_mut() {
                    self.rewrite_value(item);
                }
            }
            _ => {}
        }
    }

    pub fn rewrite_property(&self, property: &mut Property) {
        for url in &mut property.media {
            *url = self.proxy_url(url);
        }
        if let Some(url) = &mut property.featured_image {
            *url = self.proxy_url(url);
        }
    }

    pub fn rewrite_agent(&self, agent: &mut Agent) {
        if let Some(url) = &mut agent.image {
            *url = self.proxy_url(url);
        }
        if let Some(url) = &mut agent.vcard {
            *url = self.proxy_url(url);
        }
    }
}

/// Split an absolute http(s) URL into lowercased host and path. Relative
/// strings and other schemes return `None` so plain text survives
/// `rewrite_value` unchanged.
fn split_host_path(url: &str) -> Option<(String, &str)> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))?;
    match rest.find('/') {
        Some(idx) => Some((rest[..idx].to_lowercase(), &rest[idx..])),
        None => Some((rest.to_lowercase(), "")),
    }
}

/// `mybucket.s3.eu-west-1.amazonaws.com` style hosts. Returns the bucket
/// name when the host is a virtual-hosted S3 endpoint.
fn bucket_of_virtual_host(host: &str) -> Option<&str> {
    let remainder = host.strip_suffix(".amazonaws.com")?;
    let idx = remainder.rfind(".s3")?;
    let after = &remainder[idx + 3..];
    if !(after.is_empty() || after.starts_with('.') || after.starts_with('-')) {
        return None;
    }
    let bucket = &remainder[..idx];
    if bucket.is_empty() {
        return None;
    }
    Some(bucket)
}

/// `s3.amazonaws.com`, `s3.eu-west-1.amazonaws.com`, `s3-accelerate...`:
/// hosts whose first path segment is the bucket.
fn is_s3_service_host(host: &str) -> bool {
    let Some(rest) = host.strip_suffix(".amazonaws.com") else {
        return false;
    };
    rest == "s3" || rest.starts_with("s3.") || rest.starts_with("s3-")
}
