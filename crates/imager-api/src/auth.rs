//! Resolves the request's [`Viewer`] from HTTP Basic credentials.

use actix_web::http::header::{self, HeaderValue};
use actix_web::HttpRequest;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use imager_core::{AppError, ImagerService, Viewer};
use secrecy::SecretString;

use crate::error::ApiError;

/// No `Authorization` header means an anonymous viewer. A header that is
/// malformed or carries wrong credentials is rejected outright.
pub async fn resolve_viewer(req: &HttpRequest, service: &ImagerService) -> Result<Viewer, ApiError> {
    let Some(value) = req.headers().get(header::AUTHORIZATION) else {
        return Ok(Viewer::Anonymous);
    };
    let (username, password) = parse_basic(value).ok_or(ApiError::BadCredentials)?;

    match service.authenticate(&username, &password).await {
        Ok(profile) => Ok(Viewer::from(&profile)),
        Err(AppError::Unauthenticated(_)) => Err(ApiError::BadCredentials),
        Err(err) => Err(err.into()),
    }
}

fn parse_basic(value: &HeaderValue) -> Option<(String, SecretString)> {
    let encoded = value.to_str().ok()?.strip_prefix("Basic ")?;
    let decoded = String::from_utf8(STANDARD.decode(encoded.trim()).ok()?).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), SecretString::from(password.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn parses_basic_credentials() {
        let value = HeaderValue::from_static("Basic YmlsbDpzZWNyZXQ6cGFydA==");
        let (user, pass) = parse_basic(&value).unwrap();
        assert_eq!(user, "bill");
        // Only the first colon separates the pair.
        assert_eq!(pass.expose_secret(), "secret:part");
    }

    #[test]
    fn rejects_other_schemes_and_garbage() {
        assert!(parse_basic(&HeaderValue::from_static("Bearer abc")).is_none());
        assert!(parse_basic(&HeaderValue::from_static("Basic !!!")).is_none());
        // "bill" with no colon
        assert!(parse_basic(&HeaderValue::from_static("Basic YmlsbA==")).is_none());
    }
}
