//! Extraction of the host boundary input from the request query string.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use coursegate_core::BoundaryInput;

/// The request's query string as host boundary input.
///
/// Pairs are form-urlencoded decoded once; a `course` value that the host
/// encoded twice is left for the core decoder's percent-decoding fallback.
/// A missing query string yields an empty input.
#[derive(Debug, Clone)]
pub struct Boundary(pub BoundaryInput);

impl Boundary {
    pub fn from_query(query: Option<&str>) -> Self {
        let input = query
            .map(|q| BoundaryInput::from_pairs(url::form_urlencoded::parse(q.as_bytes())))
            .unwrap_or_default();
        Self(input)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Boundary {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_query(parts.uri.query()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_pairs_once() {
        let Boundary(input) = Boundary::from_query(Some("cn=Cultura+de+IA&m1e=1&course=%257B"));
        assert_eq!(input.get("cn"), Some("Cultura de IA"));
        assert_eq!(input.get("m1e"), Some("1"));
        assert_eq!(input.get("course"), Some("%7B"));
    }

    #[test]
    fn missing_query_is_empty() {
        let Boundary(input) = Boundary::from_query(None);
        assert!(input.is_empty());
    }
}
