use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum_extra::extract::cookie::CookieJar;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use everato_core::AppError;
use everato_models::admins::{
    AdminLoginRequest, AdminLoginResponse, AdminSearchParams, CreateAdminDto, PermissionInfo,
    RoleInfo, UpdateAdminDto, UpdateAdminResponse, permission_catalog, role_catalog,
};
use everato_models::{AdminResponse, MessageResponse};

use crate::middleware::auth::AdminUser;
use crate::middleware::guard::ADMIN_COOKIE;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::utils::cookies::session_cookie;
use crate::validator::ValidatedJson;

use super::service::AdminService;

/// Login as an administrator
#[utoipa::path(
    post,
    path = "/api/v1/admin/login",
    request_body = AdminLoginRequest,
    responses(
        (status = 200, description = "Login successful, `admin_jwt` cookie set", body = AdminLoginResponse),
        (status = 401, description = "Invalid credentials or not an administrator", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Admin"
)]
#[instrument(skip_all)]
pub async fn login_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(dto): ValidatedJson<AdminLoginRequest>,
) -> Result<(CookieJar, Json<AdminLoginResponse>), AppError> {
    let response = AdminService::login_admin(state.accounts.as_ref(), &state.signer, dto).await?;

    let cookie = session_cookie(
        ADMIN_COOKIE,
        response.token.clone(),
        state.signer.lifetime_secs(),
        &state.server_config,
    );

    Ok((jar.add(cookie), Json(response)))
}

/// List every administrative account
#[utoipa::path(
    get,
    path = "/api/v1/admin/all",
    responses(
        (status = 200, description = "All administrative accounts", body = Vec<AdminResponse>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - MANAGE_USERS required", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
#[instrument(skip(state))]
pub async fn list_admins(
    State(state): State<AppState>,
    admin: AdminUser,
) -> Result<Json<Vec<AdminResponse>>, AppError> {
    let admins = AdminService::list_admins(&state.db, admin.id).await?;
    Ok(Json(admins))
}

/// Find administrators by exact email or username
#[utoipa::path(
    get,
    path = "/api/v1/admin/search",
    params(AdminSearchParams),
    responses(
        (status = 200, description = "Matching accounts", body = Vec<AdminResponse>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - MANAGE_USERS required", body = ErrorResponse),
        (status = 422, description = "Empty query", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
#[instrument(skip(state))]
pub async fn search_admins(
    State(state): State<AppState>,
    admin: AdminUser,
    Query(params): Query<AdminSearchParams>,
) -> Result<Json<Vec<AdminResponse>>, AppError> {
    params.validate().map_err(AppError::unprocessable)?;

    let admins = AdminService::search_admins(&state.db, admin.id, &params.q).await?;
    Ok(Json(admins))
}

/// Permission catalog
#[utoipa::path(
    get,
    path = "/api/v1/admin/permissions",
    responses(
        (status = 200, description = "Every permission with its description", body = Vec<PermissionInfo>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_permissions(_admin: AdminUser) -> Json<Vec<PermissionInfo>> {
    Json(permission_catalog())
}

/// Role catalog
#[utoipa::path(
    get,
    path = "/api/v1/admin/roles",
    responses(
        (status = 200, description = "Every administrative role with its description", body = Vec<RoleInfo>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_roles(_admin: AdminUser) -> Json<Vec<RoleInfo>> {
    Json(role_catalog())
}

/// Create an administrative account
#[utoipa::path(
    post,
    path = "/api/v1/admin/create",
    request_body = CreateAdminDto,
    responses(
        (status = 201, description = "Account created", body = AdminResponse),
        (status = 400, description = "Unknown role or permission", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 409, description = "Email or username already exists", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Transaction failure", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
#[instrument(skip(state, dto))]
pub async fn create_admin(
    State(state): State<AppState>,
    admin: AdminUser,
    ValidatedJson(dto): ValidatedJson<CreateAdminDto>,
) -> Result<(StatusCode, Json<AdminResponse>), AppError> {
    let created = AdminService::create_admin(&state.db, admin.id, dto).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Get an administrative account by username
#[utoipa::path(
    get,
    path = "/api/v1/admin/u/{username}",
    params(("username" = String, Path, description = "Username")),
    responses(
        (status = 200, description = "Account found", body = AdminResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
#[instrument(skip(state))]
pub async fn get_admin_by_username(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(username): Path<String>,
) -> Result<Json<AdminResponse>, AppError> {
    let found = AdminService::get_admin_by_username(&state.db, admin.id, &username).await?;
    Ok(Json(found))
}

/// Get an administrative account by ID
#[utoipa::path(
    get,
    path = "/api/v1/admin/{id}",
    params(("id" = Uuid, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Account found", body = AdminResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
#[instrument(skip(state))]
pub async fn get_admin(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<AdminResponse>, AppError> {
    let found = AdminService::get_admin(&state.db, admin.id, id).await?;
    Ok(Json(found))
}

/// Update an administrative account
#[utoipa::path(
    put,
    path = "/api/v1/admin/{id}",
    params(("id" = Uuid, Path, description = "Account ID")),
    request_body = UpdateAdminDto,
    responses(
        (status = 200, description = "Account updated", body = UpdateAdminResponse),
        (status = 400, description = "Empty update, unknown role or permission", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse),
        (status = 409, description = "Email or username already exists", body = ErrorResponse),
        (status = 500, description = "Transaction failure", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
#[instrument(skip(state, dto))]
pub async fn update_admin(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateAdminDto>,
) -> Result<Json<UpdateAdminResponse>, AppError> {
    let updated = AdminService::update_admin(&state.db, admin.id, id, dto).await?;
    Ok(Json(updated))
}

/// Delete an administrative account
#[utoipa::path(
    delete,
    path = "/api/v1/admin/{id}",
    params(("id" = Uuid, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Account deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden, including deleting your own super admin account", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse),
        (status = 500, description = "Transaction failure", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
#[instrument(skip(state))]
pub async fn delete_admin(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    let message = AdminService::delete_admin(&state.db, admin.id, id).await?;
    Ok(Json(message))
}
