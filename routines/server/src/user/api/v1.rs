use crate::auth::AuthError;
use crate::user::{NewUser, UserService, UserServiceError, UserState};
use crate::web::api::v1::{ApiError, ApiForm, ApiJson, ErrorResponse};
use axum::{Router, extract::State, http::StatusCode, response::Json, routing::post};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// Registration payload.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    email: String,
    password: String,
    username: String,
    gender: String,
    /// Ordered list of personal goals
    goal: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckEmailRequest {
    email: String,
}

/// Answer of the email check. The flag is sent as a string (`"true"` / `"false"`).
#[derive(Debug, Serialize, ToSchema)]
pub struct CheckEmailResponse {
    registered: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyRequest {
    email: String,
    pwd: String,
}

/// Answer of the credential check. Only `result` is present on failure.
#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyResponse {
    /// `success` or `fail`
    result: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    goal: Option<Vec<String>>,
}

/// Form fields accepted by the token endpoint.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TokenRequest {
    username: String,
    password: String,
}

/// JSON response for successful token issuance.
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    token: String,
}

impl From<UserServiceError> for ApiError {
    fn from(err: UserServiceError) -> Self {
        match err {
            UserServiceError::Conflict => ApiError::Conflict(err.to_string()),
            UserServiceError::InvalidCredentials
            | UserServiceError::Auth(AuthError::InvalidCredentials) => ApiError::Unauthorized,
            UserServiceError::Goal(_)
            | UserServiceError::Auth(_)
            | UserServiceError::Database(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

/// Handler for POST /auth/register - Creates a new account.
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered"),
        (status = 409, description = "Email or username already taken", body = ErrorResponse),
        (status = 422, description = "Malformed request body", body = ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn register_handler(
    State(state): State<Arc<UserState>>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<StatusCode, ApiError> {
    let service = UserService::new(&state.db);
    service
        .register(NewUser {
            email: payload.email,
            password: payload.password,
            username: payload.username,
            gender: payload.gender,
            goal: payload.goal,
        })
        .await?;
    Ok(StatusCode::OK)
}

/// Handler for POST /auth/check - Reports whether an email is registered.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/auth/check",
    request_body = CheckEmailRequest,
    responses(
        (status = 200, description = "Registration status", body = CheckEmailResponse),
        (status = 422, description = "Malformed request body", body = ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn check_email_handler(
    State(state): State<Arc<UserState>>,
    ApiJson(payload): ApiJson<CheckEmailRequest>,
) -> Result<Json<CheckEmailResponse>, ApiError> {
    let service = UserService::new(&state.db);
    let registered = service.is_email_registered(&payload.email).await?;
    Ok(Json(CheckEmailResponse {
        registered: registered.to_string(),
    }))
}

/// Handler for POST /auth/verify - Checks an email/password pair.
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    post,
    path = "/auth/verify",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Verification outcome", body = VerifyResponse),
        (status = 422, description = "Malformed request body", body = ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn verify_handler(
    State(state): State<Arc<UserState>>,
    ApiJson(payload): ApiJson<VerifyRequest>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let service = UserService::new(&state.db);
    let response = match service
        .verify_credentials(&payload.email, &payload.pwd)
        .await?
    {
        Some(user) => VerifyResponse {
            result: "success".to_string(),
            username: Some(user.username().to_string()),
            gender: Some(user.gender().to_string()),
            goal: Some(user.goal().to_vec()),
        },
        None => VerifyResponse {
            result: "fail".to_string(),
            username: None,
            gender: None,
            goal: None,
        },
    };
    Ok(Json(response))
}

/// Handler for POST /auth/token - Exchanges form credentials for a JWT.
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    post,
    path = "/auth/token",
    request_body(content = TokenRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn token_handler(
    State(state): State<Arc<UserState>>,
    ApiForm(payload): ApiForm<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let service = UserService::new(&state.db);
    let token = service
        .login(&payload.username, &payload.password, &state.auth.jwt_secret)
        .await?;
    Ok(Json(TokenResponse { token }))
}

/// Creates and returns the `/auth` API router.
pub fn create_api_router(state: Arc<UserState>) -> Router {
    Router::new()
        .route("/auth/register", post(register_handler))
        .route("/auth/check", post(check_email_handler))
        .route("/auth/verify", post(verify_handler))
        .route("/auth/token", post(token_handler))
        .with_state(state)
}
