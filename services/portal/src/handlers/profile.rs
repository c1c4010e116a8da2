use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use sacm_auth_types::identity::IdentityHeaders;

use crate::domain::types::UserProfile;
use crate::error::PortalError;
use crate::handlers::{ActivityResponse, PageQuery, PageResponse, UserResponse};
use crate::state::AppState;
use crate::usecase::profile::{
    ChangePasswordInput, ChangePasswordUseCase, GetProfileUseCase, ListActivitiesUseCase,
    UpdateProfileInput, UpdateProfileUseCase,
};

#[derive(Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub major_name: Option<String>,
    pub level_name: Option<String>,
}

impl From<UserProfile> for ProfileResponse {
    fn from(profile: UserProfile) -> Self {
        Self {
            user: profile.user.into(),
            major_name: profile.major_name,
            level_name: profile.level_name,
        }
    }
}

// ── GET /users/@me ───────────────────────────────────────────────────────────

pub async fn get_me(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<ProfileResponse>, PortalError> {
    let usecase = GetProfileUseCase {
        users: state.user_repo(),
    };
    let profile = usecase.execute(identity.user_id).await?;
    Ok(Json(profile.into()))
}

// ── PATCH /users/@me ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateMeRequest {
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

pub async fn update_me(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<UpdateMeRequest>,
) -> Result<Json<ProfileResponse>, PortalError> {
    let usecase = UpdateProfileUseCase {
        users: state.user_repo(),
        audit: state.audit_repo(),
    };
    let profile = usecase
        .execute(
            identity.user_id,
            UpdateProfileInput {
                email: body.email,
                phone_number: body.phone_number,
            },
        )
        .await?;
    Ok(Json(profile.into()))
}

// ── PUT /users/@me/password ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub password1: String,
    pub password2: String,
}

pub async fn change_password(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<StatusCode, PortalError> {
    let usecase = ChangePasswordUseCase {
        users: state.user_repo(),
        audit: state.audit_repo(),
    };
    usecase
        .execute(
            identity.user_id,
            ChangePasswordInput {
                current_password: body.current_password,
                password1: body.password1,
                password2: body.password2,
            },
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /users/@me/activities ────────────────────────────────────────────────

pub async fn list_activities(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageResponse<ActivityResponse>>, PortalError> {
    let usecase = ListActivitiesUseCase {
        audit: state.audit_repo(),
    };
    let page = usecase
        .execute(identity.user_id, query.page_request())
        .await?;
    Ok(Json(PageResponse::from_page(page, ActivityResponse::from)))
}
