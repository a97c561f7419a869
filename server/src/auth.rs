use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use larder_core::UserId;

use crate::api::ErrorResponse;

/// Header set by the authenticating proxy in front of the service.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Extractor providing the signed-in user's identifier.
///
/// Authentication happens upstream; this only reads the identifier the proxy
/// forwards and rejects requests that lack a usable one.
pub struct AuthUser(pub UserId);

#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    MissingHeader,
    InvalidHeader,
    TooLong,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::MissingHeader => "Missing X-User-Id header",
            AuthError::InvalidHeader => "Invalid X-User-Id header",
            AuthError::TooLong => "X-User-Id header is too long",
        };

        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: message.to_string(),
            }),
        )
            .into_response()
    }
}

fn user_from_headers(headers: &HeaderMap) -> Result<UserId, AuthError> {
    let value = headers
        .get(USER_ID_HEADER)
        .ok_or(AuthError::MissingHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidHeader)?
        .trim();

    if value.is_empty() {
        return Err(AuthError::MissingHeader);
    }
    if value.chars().count() > UserId::MAX_LEN {
        return Err(AuthError::TooLong);
    }
    Ok(UserId::new(value))
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        user_from_headers(&parts.headers).map(AuthUser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn reads_trimmed_user_id() {
        assert_eq!(
            user_from_headers(&headers(" alice ")),
            Ok(UserId::new("alice"))
        );
    }

    #[test]
    fn rejects_missing_blank_and_oversized_ids() {
        assert_eq!(
            user_from_headers(&HeaderMap::new()),
            Err(AuthError::MissingHeader)
        );
        assert_eq!(
            user_from_headers(&headers("   ")),
            Err(AuthError::MissingHeader)
        );
        assert_eq!(
            user_from_headers(&headers(&"u".repeat(33))),
            Err(AuthError::TooLong)
        );
    }
}
