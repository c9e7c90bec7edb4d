//! Authentication middleware.
//!
//! Validates `Authorization: Bearer <jwt>` headers and installs an
//! [`AuthExtension`] on the request. Token issuance is not this
//! service's concern; only validation happens here.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::services::auth_service::{AuthService, Claims};
use crate::services::Actor;

/// Extension that holds authenticated user information
#[derive(Debug, Clone)]
pub struct AuthExtension {
    pub user_id: Uuid,
    pub username: String,
    pub is_admin: bool,
}

impl From<Claims> for AuthExtension {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
            is_admin: claims.is_admin,
        }
    }
}

impl AuthExtension {
    pub fn actor(&self) -> Actor {
        Actor {
            user_id: self.user_id,
            username: self.username.clone(),
            is_admin: self.is_admin,
        }
    }
}

/// Token extraction result
enum ExtractedToken<'a> {
    Bearer(&'a str),
    None,
    Invalid,
}

fn extract_token(request: &Request) -> ExtractedToken<'_> {
    match request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        Some(header) => match header.strip_prefix("Bearer ") {
            Some(token) => ExtractedToken::Bearer(token),
            None => ExtractedToken::Invalid,
        },
        None => ExtractedToken::None,
    }
}

/// Authentication middleware function - requires a valid bearer token
pub async fn auth_middleware(
    State(auth_service): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> Response {
    match extract_token(&request) {
        ExtractedToken::Bearer(token) => match auth_service.validate_token(token) {
            Ok(claims) => {
                request.extensions_mut().insert(AuthExtension::from(claims));
                next.run(request).await
            }
            Err(_) => (StatusCode::UNAUTHORIZED, "Invalid or expired token").into_response(),
        },
        ExtractedToken::None => {
            (StatusCode::UNAUTHORIZED, "Missing authorization header").into_response()
        }
        ExtractedToken::Invalid => {
            (StatusCode::UNAUTHORIZED, "Invalid authorization header format").into_response()
        }
    }
}

/// Admin middleware - requires a valid bearer token for an admin user
pub async fn admin_middleware(
    State(auth_service): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> Response {
    let claims = match extract_token(&request) {
        ExtractedToken::Bearer(token) => match auth_service.validate_token(token) {
            Ok(claims) => claims,
            Err(_) => {
                return (StatusCode::UNAUTHORIZED, "Invalid or expired token").into_response()
            }
        },
        ExtractedToken::None => {
            return (StatusCode::UNAUTHORIZED, "Missing authorization header").into_response()
        }
        ExtractedToken::Invalid => {
            return (StatusCode::UNAUTHORIZED, "Invalid authorization header format")
                .into_response()
        }
    };

    if !claims.is_admin {
        return (StatusCode::FORBIDDEN, "Administrator capability required").into_response();
    }

    request.extensions_mut().insert(AuthExtension::from(claims));
    next.run(request).await
}
