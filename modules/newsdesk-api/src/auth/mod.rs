mod jwt;

pub use jwt::{Claims, JwtService};

use std::sync::Arc;

use axum::extract::{FromRequestParts, Query};
use axum::http::{header, request::Parts};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::error::ApiError;
use crate::AppState;

/// Authenticated caller. Extract this in handlers that require auth.
///
/// The token comes from `Authorization: Bearer <jwt>`, or from the
/// `access_token` query parameter for websocket upgrades, where browsers
/// cannot set headers.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
struct TokenQuery {
    access_token: Option<String>,
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let header_token = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string());

    header_token.filter(|t| !t.is_empty()).or_else(|| {
        Query::<TokenQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(q)| q.access_token)
            .filter(|t| !t.is_empty())
    })
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(ApiError::Unauthorized)?;

        let claims = state.jwt.verify_token(&token).map_err(|e| {
            debug!(error = %e, "Rejected bearer token");
            ApiError::Unauthorized
        })?;

        let user_id = claims.user_id().map_err(|_| ApiError::Unauthorized)?;
        Ok(AuthUser { user_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(req: Request<()>) -> Parts {
        req.into_parts().0
    }

    #[test]
    fn reads_authorization_header() {
        let p = parts(
            Request::builder()
                .uri("/sessions")
                .header("authorization", "Bearer abc.def")
                .body(())
                .unwrap(),
        );
        assert_eq!(bearer_token(&p).as_deref(), Some("abc.def"));
    }

    #[test]
    fn falls_back_to_query_parameter() {
        let p = parts(
            Request::builder()
                .uri("/chat/x/stream?access_token=tok")
                .body(())
                .unwrap(),
        );
        assert_eq!(bearer_token(&p).as_deref(), Some("tok"));
    }

    #[test]
    fn ignores_other_schemes() {
        let p = parts(
            Request::builder()
                .uri("/sessions")
                .header("authorization", "Basic dXNlcjpwYXNz")
                .body(())
                .unwrap(),
        );
        assert_eq!(bearer_token(&p), None);
    }
}
