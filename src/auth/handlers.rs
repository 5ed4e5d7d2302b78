use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::accounts::{
    AccountStore, LoginError, LoginRequest, ProfileUpdate, RegistrationError, RegistrationRequest,
};
use crate::db::models::{Account, AccountId, AccountView, OwnerProfile};
use crate::error::{AppError, AppResult};
use crate::extractors::{ApiJson, ApiPath, CurrentAccount};
use crate::state::AppState;

// -- Response types --

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: AccountView,
    pub token: String,
}

// -- Error conversion --

impl From<RegistrationError> for AppError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::Validation(e) => AppError::Validation(e.0),
            RegistrationError::Conflict(msg) => AppError::Conflict(msg),
            RegistrationError::Store(e) => AppError::Store(e),
            RegistrationError::Hash(e) => AppError::Internal(format!("bcrypt: {}", e)),
        }
    }
}

impl From<LoginError> for AppError {
    fn from(err: LoginError) -> Self {
        match err {
            LoginError::Validation(e) => AppError::Validation(e.0),
            LoginError::Store(e) => AppError::Store(e),
        }
    }
}

// -- Cookie helpers --

fn session_cookie(name: &str, token: &str, max_age_hours: u64) -> String {
    let max_age_secs = max_age_hours.saturating_mul(3600);
    format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
        name, token, max_age_secs
    )
}

fn clear_session_cookie(name: &str) -> String {
    format!("{}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0", name)
}

/// Issue a session for `account` and answer with the account plus token.
fn authenticated_response(
    state: &AppState,
    status: StatusCode,
    account: &Account,
) -> AppResult<Response> {
    let token = state.gate().issue(account)?;
    let cookie = session_cookie(
        &state.config.auth.cookie_name,
        &token,
        state.config.auth.session_hours,
    );
    let body = AuthResponse {
        user: AccountView::from(account),
        token,
    };

    Ok((status, [(header::SET_COOKIE, cookie)], Json(body)).into_response())
}

// -- Handlers --

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegistrationRequest>,
) -> AppResult<Response> {
    let account = state.registrar().register(req).await?;
    authenticated_response(&state, StatusCode::CREATED, &account)
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> AppResult<Response> {
    let validated = state.credentials().validate(req).await?;
    tracing::info!(account_id = %validated.account.id, "Login succeeded");
    authenticated_response(&state, StatusCode::OK, &validated.account)
}

/// POST /api/auth/logout
pub async fn logout(State(state): State<AppState>, caller: CurrentAccount) -> AppResult<Response> {
    state.gate().revoke(&caller.token)?;
    let cookie = clear_session_cookie(&state.config.auth.cookie_name);
    Ok((StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)]).into_response())
}

/// GET /api/auth/profile
pub async fn profile(caller: CurrentAccount) -> Json<AccountView> {
    Json(AccountView::from(caller.account.account()))
}

/// PUT /api/auth/profile
pub async fn update_profile(
    State(state): State<AppState>,
    caller: CurrentAccount,
    ApiJson(update): ApiJson<ProfileUpdate>,
) -> AppResult<Json<AccountView>> {
    let update = update
        .validate()
        .map_err(|e| AppError::Validation(e.0))?;
    let account = state
        .accounts()
        .update_profile(caller.account.id(), &update)
        .await?;
    tracing::info!(account_id = %account.id, "Updated profile");
    Ok(Json(AccountView::from(&account)))
}

/// GET /api/auth/users/{id}
pub async fn get_account(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<OwnerProfile>> {
    let account = state
        .accounts()
        .find_by_id(AccountId(id))
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(OwnerProfile::from(&account)))
}
