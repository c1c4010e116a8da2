use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use sacm_auth_types::cookie::{SACM_ACTIVATION, clear_activation_cookie, set_activation_cookie};

use crate::domain::types::ActivationStep;
use crate::error::PortalError;
use crate::state::AppState;
use crate::usecase::activation::{
    ActivationStatusUseCase, IdentityInput, SetPasswordInput, SetPasswordUseCase,
    SubmitEmailUseCase, SubmitIdentityUseCase, VerifyCodeUseCase,
};

fn session_id(jar: &CookieJar) -> Option<&str> {
    jar.get(SACM_ACTIVATION).map(|c| c.value())
}

#[derive(Serialize)]
pub struct StepResponse {
    pub step: ActivationStep,
}

// ── GET /auth/activation ─────────────────────────────────────────────────────

pub async fn get_status(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<StepResponse>, PortalError> {
    let usecase = ActivationStatusUseCase {
        sessions: state.activation_store(),
    };
    let step = usecase.execute(session_id(&jar)).await?;
    Ok(Json(StepResponse { step }))
}

// ── POST /auth/activation/identity ───────────────────────────────────────────

#[derive(Deserialize)]
pub struct IdentityRequest {
    pub academic_id: String,
    pub id_card_number: String,
}

pub async fn submit_identity(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<IdentityRequest>,
) -> Result<impl IntoResponse, PortalError> {
    let usecase = SubmitIdentityUseCase {
        users: state.user_repo(),
        sessions: state.activation_store(),
    };
    let out = usecase
        .execute(IdentityInput {
            academic_id: body.academic_id,
            id_card_number: body.id_card_number,
        })
        .await?;

    let jar = set_activation_cookie(jar, out.session_id, state.cookie_domain.clone());
    Ok((
        StatusCode::CREATED,
        jar,
        Json(StepResponse {
            step: out.session.step(),
        }),
    ))
}

// ── POST /auth/activation/email ──────────────────────────────────────────────

#[derive(Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Serialize)]
pub struct EmailResponse {
    pub step: ActivationStep,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_code: Option<String>,
}

pub async fn submit_email(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<EmailRequest>,
) -> Result<Json<EmailResponse>, PortalError> {
    let usecase = SubmitEmailUseCase {
        users: state.user_repo(),
        sessions: state.activation_store(),
        codes: state.verification_code_repo(),
    };
    let out = usecase.execute(session_id(&jar), &body.email).await?;

    Ok(Json(EmailResponse {
        step: out.session.step(),
        dev_code: state.expose_verification_codes.then_some(out.code),
    }))
}

// ── POST /auth/activation/code ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CodeRequest {
    pub code: String,
}

pub async fn submit_code(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<CodeRequest>,
) -> Result<Json<StepResponse>, PortalError> {
    let usecase = VerifyCodeUseCase {
        sessions: state.activation_store(),
        codes: state.verification_code_repo(),
    };
    let session = usecase.execute(session_id(&jar), &body.code).await?;
    Ok(Json(StepResponse {
        step: session.step(),
    }))
}

// ── POST /auth/activation/password ───────────────────────────────────────────

#[derive(Deserialize)]
pub struct PasswordRequest {
    pub password1: String,
    pub password2: String,
}

pub async fn submit_password(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<PasswordRequest>,
) -> Result<impl IntoResponse, PortalError> {
    let usecase = SetPasswordUseCase {
        users: state.user_repo(),
        sessions: state.activation_store(),
        audit: state.audit_repo(),
    };
    usecase
        .execute(
            session_id(&jar),
            SetPasswordInput {
                password1: body.password1,
                password2: body.password2,
            },
        )
        .await?;

    let jar = clear_activation_cookie(jar, state.cookie_domain.clone());
    Ok((StatusCode::NO_CONTENT, jar))
}
