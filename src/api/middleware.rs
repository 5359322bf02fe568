//! Basic authentication middleware

use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use super::{error::ApiError, AppState};
use crate::auth::{BasicCredentials, REALM};

/// Reject requests without valid credentials when a gate is configured
pub async fn basic_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(auth) = state.auth.as_deref() else {
        return next.run(request).await;
    };

    let credentials = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(BasicCredentials::parse);

    let authorized = match credentials {
        Some(credentials) => auth.verify(credentials).await,
        None => false,
    };

    if authorized {
        next.run(request).await
    } else {
        warn!(uri = %request.uri(), "Unauthorized request");
        unauthorized()
    }
}

fn unauthorized() -> Response {
    let mut response = ApiError::new(StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    if let Ok(challenge) = HeaderValue::from_str(&format!("Basic realm=\"{}\"", REALM)) {
        response.headers_mut().insert(header::WWW_AUTHENTICATE, challenge);
    }
    response
}
