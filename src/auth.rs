use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap, HeaderName},
};
use std::convert::Infallible;

use crate::config::IdentityHeaders;
use crate::state::AppState;

/// The caller as resolved by the upstream identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub email: Option<String>,
    pub image_url: Option<String>,
}

impl Identity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: None,
            image_url: None,
        }
    }
}

pub trait IdentityGateway: Send + Sync {
    /// Returns `None` when the request carries no usable identity.
    fn resolve(&self, headers: &HeaderMap) -> Option<Identity>;
}

/// Trusts identity headers injected by the authenticating proxy in front of
/// the service.
#[derive(Debug, Clone)]
pub struct HeaderIdentityGateway {
    user_header: HeaderName,
    email_header: HeaderName,
    image_header: HeaderName,
}

impl HeaderIdentityGateway {
    pub fn new(headers: &IdentityHeaders) -> Self {
        Self {
            user_header: headers.user.clone(),
            email_header: headers.email.clone(),
            image_header: headers.image.clone(),
        }
    }
}

impl IdentityGateway for HeaderIdentityGateway {
    fn resolve(&self, headers: &HeaderMap) -> Option<Identity> {
        let mut identity = Identity::new(header_value(headers, &self.user_header)?);
        identity.email = header_value(headers, &self.email_header);
        identity.image_url = header_value(headers, &self.image_header);
        Some(identity)
    }
}

fn header_value(headers: &HeaderMap, name: &HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Extractor resolving the caller through the configured gateway. It never
/// rejects; operations decide what an anonymous caller may do.
#[derive(Debug, Clone)]
pub struct Caller(pub Option<Identity>);

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let identity = state.identity.resolve(&parts.headers);
        if identity.is_none() {
            tracing::debug!(path = %parts.uri.path(), "request without identity");
        }
        Ok(Caller(identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn gateway() -> HeaderIdentityGateway {
        HeaderIdentityGateway::new(&IdentityHeaders::default())
    }

    #[test]
    fn resolves_identity_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", HeaderValue::from_static("user_42"));
        headers.insert("x-user-email", HeaderValue::from_static("ada@example.com"));

        let identity = gateway().resolve(&headers).unwrap();

        assert_eq!(identity.user_id, "user_42");
        assert_eq!(identity.email.as_deref(), Some("ada@example.com"));
        assert_eq!(identity.image_url, None);
    }

    #[test]
    fn missing_or_blank_user_header_is_unauthenticated() {
        let mut headers = HeaderMap::new();
        assert!(gateway().resolve(&headers).is_none());

        headers.insert("x-user-id", HeaderValue::from_static("   "));
        assert!(gateway().resolve(&headers).is_none());
    }
}
