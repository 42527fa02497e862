//! Account routes

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use shoplist_core::{CoreError, NewAccount};
use tracing::debug;

use crate::error::ApiError;
use crate::extract::{ApiForm, ApiJson, RequireAuth};
use crate::state::AppState;

use super::types::{MessageResponse, ProfileResponse, SignInForm, SignupRequest, TokenResponse};

/// POST /users/signup
async fn signup(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SignupRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    state
        .accounts
        .signup(NewAccount {
            username: request.username,
            email: request.email,
            password: request.password,
        })
        .await?;

    metrics::counter!("shoplist_signups_total").increment(1);

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User created successfully".to_string(),
        }),
    ))
}

/// POST /users/sign-in
async fn sign_in(
    State(state): State<AppState>,
    ApiForm(form): ApiForm<SignInForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    let result = state.accounts.sign_in(&form.username, &form.password).await;

    let outcome = match &result {
        Ok(_) => "success",
        Err(CoreError::AuthenticationFailed) => "rejected",
        Err(_) => "error",
    };
    metrics::counter!("shoplist_sign_in_total", "outcome" => outcome).increment(1);

    let token = result?;
    Ok(Json(TokenResponse {
        access_token: token.access_token,
        token_type: token.token_type.to_string(),
        expires_in: token.expires_in,
    }))
}

/// GET /users/me
async fn me(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<ProfileResponse>, ApiError> {
    debug!("Profile lookup for {}", user.username);
    let profile = state.accounts.profile(&user).await?;
    Ok(Json(profile.into()))
}

/// Create account routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/signup", post(signup))
        .route("/users/sign-in", post(sign_in))
        .route("/users/me", get(me))
}
