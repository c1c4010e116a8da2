use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::IntoResponse,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use sacm_auth_types::{
    cookie::{
        SACM_ACCESS_TOKEN, SACM_REFRESH_TOKEN, clear_cookies, set_access_token_cookie,
        set_refresh_token_cookie,
    },
    identity::IdentityHeaders,
};
use sacm_domain::user::UserRole;

use crate::error::PortalError;
use crate::state::AppState;
use crate::usecase::token::{
    CheckTokenUseCase, LoginInput, LoginUseCase, LogoutUseCase, RefreshTokenUseCase,
};

const X_SACM_ACCESS_TOKEN_EXPIRES: &str = "x-sacm-access-token-expires";

fn token_expires_headers(exp: u64) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static(X_SACM_ACCESS_TOKEN_EXPIRES),
        HeaderValue::from(exp),
    );
    headers
}

// ── GET /auth/token ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CheckTokenQuery {
    pub role: Option<u8>,
}

#[derive(Serialize)]
pub struct CheckTokenResponse {
    pub user_id: uuid::Uuid,
    pub user_role: u8,
    pub access_token_exp: u64,
}

pub async fn check_token(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<CheckTokenQuery>,
) -> Result<impl IntoResponse, PortalError> {
    let min_role = match query.role {
        Some(raw) => Some(
            UserRole::from_u8(raw)
                .ok_or_else(|| PortalError::Validation(format!("unknown role {raw}")))?,
        ),
        None => None,
    };

    let usecase = CheckTokenUseCase {
        users: state.user_repo(),
        jwt_secret: state.jwt_secret.clone(),
    };
    let out = usecase
        .execute(jar.get(SACM_ACCESS_TOKEN).map(|c| c.value()), min_role)
        .await?;

    let body = CheckTokenResponse {
        user_id: out.user_id,
        user_role: out.user_role.as_u8(),
        access_token_exp: out.access_token_exp,
    };
    Ok((
        StatusCode::OK,
        token_expires_headers(out.access_token_exp),
        Json(body),
    ))
}

// ── POST /auth/token ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub academic_id: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub user_id: uuid::Uuid,
    pub role: UserRole,
    pub dashboard: &'static str,
}

pub async fn create_token(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, PortalError> {
    let usecase = LoginUseCase {
        users: state.user_repo(),
        audit: state.audit_repo(),
        jwt_secret: state.jwt_secret.clone(),
    };

    let out = usecase
        .execute(LoginInput {
            academic_id: body.academic_id,
            password: body.password,
        })
        .await?;

    let jar = set_access_token_cookie(jar, out.access_token, state.cookie_domain.clone());
    let jar = set_refresh_token_cookie(jar, out.refresh_token, state.cookie_domain.clone());

    let body = LoginResponse {
        user_id: out.user.id,
        role: out.user.role,
        dashboard: out.user.role.dashboard_path(),
    };
    Ok((
        StatusCode::CREATED,
        jar,
        token_expires_headers(out.access_token_exp),
        Json(body),
    ))
}

// ── PATCH /auth/token ─────────────────────────────────────────────────────────

pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, PortalError> {
    let refresh_value = jar
        .get(SACM_REFRESH_TOKEN)
        .map(|c| c.value().to_owned())
        .ok_or(PortalError::InvalidRefreshToken)?;

    let usecase = RefreshTokenUseCase {
        users: state.user_repo(),
        jwt_secret: state.jwt_secret.clone(),
    };
    let out = usecase.execute(&refresh_value).await?;

    let jar = set_access_token_cookie(jar, out.access_token, state.cookie_domain.clone());
    let jar = set_refresh_token_cookie(jar, out.refresh_token, state.cookie_domain.clone());

    Ok((
        StatusCode::CREATED,
        jar,
        token_expires_headers(out.access_token_exp),
    ))
}

// ── DELETE /auth/token ────────────────────────────────────────────────────────

pub async fn revoke_token(
    State(state): State<AppState>,
    identity: IdentityHeaders,
    jar: CookieJar,
) -> Result<impl IntoResponse, PortalError> {
    LogoutUseCase {
        audit: state.audit_repo(),
    }
    .execute(identity.user_id)
    .await?;

    let jar = clear_cookies(jar, state.cookie_domain.clone());
    Ok((StatusCode::NO_CONTENT, jar))
}
