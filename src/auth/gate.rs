use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use super::{extractors::AuthUser, services::AuthError, token::parse_basic};
use crate::state::AppState;

/// Routes reachable without credentials, any method.
const PUBLIC_PATHS: &[&str] = &["/users/login", "/users/register"];

pub fn is_public(method: &Method, path: &str) -> bool {
    *method == Method::OPTIONS || PUBLIC_PATHS.contains(&path)
}

/// Demands HTTP Basic credentials on every non-public request and re-verifies
/// them against the user store each time. No session is kept.
pub async fn require_basic_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if is_public(request.method(), request.uri().path()) {
        return next.run(request).await;
    }

    let credentials = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(parse_basic);
    let Some((identifier, password)) = credentials else {
        warn!(path = %request.uri().path(), "missing or malformed Basic credentials");
        return challenge(&state.config.realm);
    };

    match state.auth.verify_credentials(&identifier, &password).await {
        Ok(user) => {
            debug!(user_id = user.id, "request authenticated");
            request.extensions_mut().insert(AuthUser {
                id: user.id,
                identifier: user.identifier,
            });
            next.run(request).await
        }
        Err(AuthError::Unauthorized) => {
            warn!(%identifier, path = %request.uri().path(), "credentials rejected");
            challenge(&state.config.realm)
        }
        Err(e) => e.into_response(),
    }
}

fn challenge(realm: &str) -> Response {
    let mut res = (StatusCode::UNAUTHORIZED, AuthError::Unauthorized.to_string()).into_response();
    if let Ok(value) = HeaderValue::from_str(&format!("Basic realm=\"{realm}\"")) {
        res.headers_mut().insert(header::WWW_AUTHENTICATE, value);
    }
    res
}
