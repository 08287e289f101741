//! The collaborator that retrieves documents from their origin.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use gadget_core::AuthType;
use url::Url;

use crate::GadgetError;

/// What to retrieve and how downstream caches should treat it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: Url,
    /// Bypass any cache the fetcher keeps.
    pub ignore_cache: bool,
    /// Cache lifetime to enforce on the response, in whole seconds.
    pub cache_ttl: Option<u64>,
    pub auth: AuthType,
}

impl FetchRequest {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            ignore_cache: false,
            cache_ttl: None,
            auth: AuthType::None,
        }
    }

    pub fn ignore_cache(mut self, ignore: bool) -> Self {
        self.ignore_cache = ignore;
        self
    }

    pub fn cache_ttl(mut self, seconds: u64) -> Self {
        self.cache_ttl = Some(seconds);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Bytes,
    pub headers: Vec<(String, String)>,
}

impl FetchResponse {
    /// A `200 OK` response carrying `body`.
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::with_status(200, body)
    }

    pub fn with_status(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
            headers: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header named `name`, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Body as UTF-8 text.
    pub fn text(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.body)
    }
}

/// Retrieves remote documents.
///
/// Implementations own connection handling and timeouts. An unreachable
/// origin or an expired timeout is reported as [`GadgetError::Transport`];
/// any response that arrived, whatever its status, is returned as `Ok`.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, GadgetError>;
}

#[async_trait]
impl<F: Fetcher + ?Sized> Fetcher for Arc<F> {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, GadgetError> {
        (**self).fetch(request).await
    }
}
