//! Caller identity from the upstream auth layer
//!
//! Authentication happens in front of this server. The auth layer forwards
//! the signed-in email in [`AUTHENTICATED_EMAIL_HEADER`]; requests without it
//! are anonymous.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;
use theme_state::CallerIdentity;

/// Header carrying the authenticated email
pub const AUTHENTICATED_EMAIL_HEADER: &str = "x-authenticated-email";

/// Extractor for the request's caller
#[derive(Debug, Clone)]
pub struct Caller(pub CallerIdentity);

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = parts
            .headers
            .get(AUTHENTICATED_EMAIL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(CallerIdentity::authenticated)
            .unwrap_or_else(CallerIdentity::anonymous);

        Ok(Caller(identity))
    }
}
