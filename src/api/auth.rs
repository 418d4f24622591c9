//! Authentication API endpoints
//!
//! Handles HTTP requests for the session lifecycle:
//! - POST /api/auth/signup - Account creation
//! - POST /api/auth/signin - Sign in, sets the token cookie
//! - POST /api/auth/signout - Clears the token cookie
//! - GET /api/auth/me - Current user

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::services::user::RegisterInput;

/// Request body for account creation
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request body for sign-in
#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

/// Response for user info
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub profile_picture: String,
    pub is_admin: bool,
    pub created_at: String,
}

impl From<crate::models::User> for UserResponse {
    fn from(user: crate::models::User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            profile_picture: user.profile_picture,
            is_admin: user.is_admin,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Build public auth routes (no auth required)
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
}

/// Build protected auth routes (requires auth middleware)
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/signout", post(signout))
        .route("/me", get(me))
}

/// POST /api/auth/signup - Account creation
///
/// The first account created becomes the administrator.
async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = RegisterInput {
        username: body.username,
        email: body.email,
        password: body.password,
    };

    let user = state.user_service.register(input).await?;

    let token = state
        .token_service
        .issue(user.id, user.is_admin)
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&state.token_service.cookie(&token))
            .map_err(|e| ApiError::internal_error(e.to_string()))?,
    );

    Ok((StatusCode::CREATED, headers, Json(UserResponse::from(user))))
}

/// POST /api/auth/signin - Sign in
///
/// Rate limited per source IP and per email to slow down brute force
/// attempts; failed and repeated attempts get the same error body.
async fn signin(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<SigninRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let ip_address = extract_ip_address(&headers);

    // IP rate limit (10 requests per minute)
    if let Some(ip) = ip_address.as_ref().and_then(|s| s.parse().ok()) {
        if state.rate_limiter.is_ip_limited(ip).await {
            return Err(ApiError::with_details(
                "RATE_LIMIT",
                "Too many requests, please try again later",
                serde_json::json!({"retry_after": 60}),
            ));
        }
        state.rate_limiter.record_ip_request(ip).await;
    }

    // Email rate limit (5 failed attempts per 15 minutes)
    if state.rate_limiter.is_email_limited(&body.email).await {
        return Err(ApiError::with_details(
            "RATE_LIMIT",
            "Too many failed sign-in attempts, please try again later",
            serde_json::json!({"retry_after": 900}),
        ));
    }

    let user = match state
        .user_service
        .authenticate(&body.email, &body.password)
        .await
    {
        Ok(user) => user,
        Err(e) => {
            state.rate_limiter.record_failed_attempt(&body.email).await;
            return Err(e.into());
        }
    };

    state.rate_limiter.clear_email_attempts(&body.email).await;

    let token = state
        .token_service
        .issue(user.id, user.is_admin)
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&state.token_service.cookie(&token))
            .map_err(|e| ApiError::internal_error(e.to_string()))?,
    );

    Ok((response_headers, Json(UserResponse::from(user))))
}

/// POST /api/auth/signout - Sign out
///
/// Requires authentication. The token is stateless, so signing out just
/// clears the cookie.
async fn signout(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&state.token_service.clear_cookie())
            .map_err(|e| ApiError::internal_error(e.to_string()))?,
    );

    Ok((StatusCode::NO_CONTENT, response_headers))
}

/// GET /api/auth/me - Get current user
///
/// Requires authentication.
async fn me(user: AuthenticatedUser) -> Json<UserResponse> {
    Json(user.0.into())
}

/// Extract IP address from request headers.
///
/// Checks X-Forwarded-For and X-Real-IP (proxy/load balancer headers).
fn extract_ip_address(headers: &HeaderMap) -> Option<String> {
    if let Some(forwarded) = headers.get("x-forwarded-for") {
        if let Ok(forwarded_str) = forwarded.to_str() {
            // Take the first IP in the list
            if let Some(ip) = forwarded_str.split(',').next() {
                return Some(ip.trim().to_string());
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(ip_str) = real_ip.to_str() {
            return Some(ip_str.to_string());
        }
    }

    None
}
