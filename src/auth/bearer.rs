/// Bearer token extraction from the `Authorization` header
///
/// Shared by access-token authentication and the refresh/revoke flows,
/// which present their refresh token the same way.

use actix_web::http::header::{HeaderMap, AUTHORIZATION};

use crate::error::AuthError;

const BEARER_SCHEME: &str = "Bearer";

/// Pull the token out of `Authorization: Bearer <token>`
///
/// The scheme keyword is matched case-insensitively and must be followed
/// by exactly one space and a non-empty value without whitespace.
///
/// # Errors
/// - `MissingHeader` if there is no `Authorization` header
/// - `MalformedHeader` if the header is not in the `Bearer <value>` shape
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers.get(AUTHORIZATION).ok_or(AuthError::MissingHeader)?;
    let value = value.to_str().map_err(|_| AuthError::MalformedHeader)?;

    let (scheme, token) = value.split_once(' ').ok_or(AuthError::MalformedHeader)?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err(AuthError::MalformedHeader);
    }
    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(AuthError::MalformedHeader);
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_missing_header() {
        let headers = HeaderMap::new();
        assert_eq!(extract_bearer(&headers), Err(AuthError::MissingHeader));
    }

    #[test]
    fn test_basic_scheme_rejected() {
        let headers = headers_with("Basic xyz");
        assert_eq!(extract_bearer(&headers), Err(AuthError::MalformedHeader));
    }

    #[test]
    fn test_bearer_token_returned() {
        let headers = headers_with("Bearer abc");
        assert_eq!(extract_bearer(&headers), Ok("abc"));
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        assert_eq!(extract_bearer(&headers_with("bearer abc")), Ok("abc"));
        assert_eq!(extract_bearer(&headers_with("BEARER abc")), Ok("abc"));
    }

    #[test]
    fn test_malformed_shapes() {
        let cases = vec![
            ("Bearer", "missing token"),
            ("Bearer ", "empty token"),
            ("BearerToken", "missing space"),
            ("Bearer  abc", "double space"),
            ("Bearer abc def", "embedded space"),
            ("", "empty header"),
        ];

        for (value, reason) in cases {
            assert_eq!(
                extract_bearer(&headers_with(value)),
                Err(AuthError::MalformedHeader),
                "Should reject header: {}",
                reason
            );
        }
    }

    #[test]
    fn test_non_utf8_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_bytes(b"Bearer \xfftoken").unwrap(),
        );
        assert_eq!(extract_bearer(&headers), Err(AuthError::MalformedHeader));
    }
}
