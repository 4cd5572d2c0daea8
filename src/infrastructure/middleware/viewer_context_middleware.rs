// ViewerContext Middleware - resolves the bearer token once per request
// and injects the resulting ViewerContext into request extensions

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::infrastructure::{security::TokenService, viewer::ViewerContext};

/// Authentication information extracted from request headers
#[derive(Debug, Clone, PartialEq)]
pub enum AuthInfo {
    Anonymous,
    Bearer(String),
}

/// ViewerContext middleware that creates request-scoped viewer context
pub async fn viewer_context_middleware(
    State(tokens): State<Arc<TokenService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_info = extract_auth_from_request(request.headers())?;
    let viewer_context = create_viewer_context(auth_info, &tokens);

    request.extensions_mut().insert(viewer_context);

    Ok(next.run(request).await)
}

/// Extract authentication information from request headers
fn extract_auth_from_request(headers: &HeaderMap) -> Result<AuthInfo, StatusCode> {
    let Some(auth_header) = headers.get(AUTHORIZATION) else {
        return Ok(AuthInfo::Anonymous);
    };

    let auth_str = auth_header.to_str().map_err(|_| StatusCode::BAD_REQUEST)?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(AuthInfo::Bearer(token.trim().to_string())),
        // Other schemes are not ours to interpret
        _ => Ok(AuthInfo::Anonymous),
    }
}

/// Create the ViewerContext for the request. A token that fails validation
/// yields an anonymous viewer that remembers why.
fn create_viewer_context(auth_info: AuthInfo, tokens: &TokenService) -> Arc<ViewerContext> {
    let request_id = format!("req-{}", Uuid::new_v4());

    let viewer_context = match auth_info {
        AuthInfo::Anonymous => ViewerContext::anonymous(request_id),
        AuthInfo::Bearer(token) => match tokens
            .validate_access_token(&token)
            .and_then(|claims| Ok((claims.user_id()?, claims.username)))
        {
            Ok((user_id, username)) => {
                ViewerContext::authenticated_user(user_id, username, request_id)
            }
            Err(err) => {
                debug!("Rejected bearer token for {}: {}", request_id, err);
                ViewerContext::rejected(request_id, err.message())
            }
        },
    };

    Arc::new(viewer_context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::Duration;

    fn tokens() -> TokenService {
        TokenService::new("middleware-secret", Duration::days(7), Duration::days(30))
    }

    #[test]
    fn test_extract_auth_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer token123"));

        let auth_info = extract_auth_from_request(&headers).unwrap();
        assert_eq!(auth_info, AuthInfo::Bearer("token123".to_string()));
    }

    #[test]
    fn test_extract_auth_other_scheme_is_anonymous() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));

        let auth_info = extract_auth_from_request(&headers).unwrap();
        assert_eq!(auth_info, AuthInfo::Anonymous);
    }

    #[test]
    fn test_extract_auth_non_utf8_header() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_bytes(b"Bearer \xff").unwrap());

        assert_eq!(
            extract_auth_from_request(&headers).unwrap_err(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_extract_auth_anonymous() {
        let headers = HeaderMap::new();

        let auth_info = extract_auth_from_request(&headers).unwrap();
        assert_eq!(auth_info, AuthInfo::Anonymous);
    }

    #[test]
    fn test_valid_token_authenticates_viewer() {
        let tokens = tokens();
        let token = tokens.issue_access_token(5, "carol").unwrap();

        let vc = create_viewer_context(AuthInfo::Bearer(token), &tokens);
        assert_eq!(vc.user_id(), Some(5));
        assert!(vc.request_id.starts_with("req-"));
    }

    #[test]
    fn test_garbage_token_yields_rejected_viewer() {
        let vc = create_viewer_context(AuthInfo::Bearer("not-a-jwt".to_string()), &tokens());
        assert!(!vc.is_authenticated());
        assert_eq!(vc.rejection.as_deref(), Some("Invalid token"));
    }
}
