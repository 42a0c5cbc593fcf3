use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::env;
use uuid::Uuid;

use crate::error::AppError;

/// Role carried in the JWT, controlling which workflow transitions the
/// caller may invoke.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Employee,
    Director,
    Finance,
}

/// Container for the authenticated user stored in request extensions.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub role: Role,
}

impl CurrentUser {
    /// Checks that the caller holds the given role.
    pub fn require_role(&self, role: Role) -> Result<(), AppError> {
        if self.role == role {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "operation requires the {:?} role",
                role
            )))
        }
    }
}

/// Claims expected inside the JWT for authenticated users.
#[derive(Debug, Deserialize)]
pub struct Claims {
    /// Subject - should be the user's UUID as a string.
    pub sub: String,
    pub role: Role,
    pub exp: usize,
}

/// Middleware to validate a Bearer JWT in the `Authorization` header.
///
/// On success the request is forwarded with a `CurrentUser` attached to
/// its extensions; on failure a `401` is returned.
pub async fn jwt_middleware(mut req: Request, next: Next) -> Result<Response, StatusCode> {
    // Extract token from Authorization header
    let auth_header = req.headers().get("authorization");
    let token = match auth_header.and_then(|v| v.to_str().ok()) {
        Some(s) if s.starts_with("Bearer ") => &s[7..],
        _ => return Err(StatusCode::UNAUTHORIZED),
    };

    let secret = env::var("JWT_SECRET").unwrap_or_else(|_| "secret".to_string());
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());

    let decoded = match decode::<Claims>(token, &decoding_key, &Validation::new(Algorithm::HS256)) {
        Ok(c) => c.claims,
        Err(_) => return Err(StatusCode::UNAUTHORIZED),
    };

    // Parse subject as UUID and attach to request extensions for downstream handlers.
    let user_id = match Uuid::parse_str(&decoded.sub) {
        Ok(id) => id,
        Err(_) => return Err(StatusCode::UNAUTHORIZED),
    };

    req.extensions_mut().insert(CurrentUser {
        id: user_id,
        role: decoded.role,
    });

    Ok(next.run(req).await)
}
