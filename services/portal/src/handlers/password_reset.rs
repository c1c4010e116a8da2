use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::error::PortalError;
use crate::state::AppState;
use crate::usecase::password_reset::{
    CheckResetTokenUseCase, ConfirmPasswordResetUseCase, ConfirmResetInput,
    RequestPasswordResetUseCase,
};

// ── POST /auth/password-reset ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RequestResetRequest {
    pub email: String,
}

#[derive(Serialize)]
pub struct RequestResetResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_link: Option<String>,
}

pub async fn request_reset(
    State(state): State<AppState>,
    Json(body): Json<RequestResetRequest>,
) -> Result<(StatusCode, Json<RequestResetResponse>), PortalError> {
    let usecase = RequestPasswordResetUseCase {
        users: state.user_repo(),
        tokens: state.password_reset_repo(),
        reset_url: state.password_reset_url.clone(),
    };
    let out = usecase.execute(&body.email).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(RequestResetResponse {
            dev_link: state.expose_verification_codes.then_some(out.link),
        }),
    ))
}

// ── GET /auth/password-reset/{token} ─────────────────────────────────────────

pub async fn check_reset_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<StatusCode, PortalError> {
    CheckResetTokenUseCase {
        tokens: state.password_reset_repo(),
    }
    .execute(&token)
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /auth/password-reset/{token} ────────────────────────────────────────

#[derive(Deserialize)]
pub struct ConfirmResetRequest {
    pub password1: String,
    pub password2: String,
}

pub async fn confirm_reset(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(body): Json<ConfirmResetRequest>,
) -> Result<StatusCode, PortalError> {
    ConfirmPasswordResetUseCase {
        tokens: state.password_reset_repo(),
    }
    .execute(ConfirmResetInput {
        token,
        password1: body.password1,
        password2: body.password2,
    })
    .await?;
    Ok(StatusCode::NO_CONTENT)
}
