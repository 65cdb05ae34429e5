use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use everato_auth::Claims;
use everato_core::{AdminRole, Permission};
use everato_models::admins::{
    AdminLoginRequest, AdminLoginResponse, AdminResponse, CreateAdminDto, PermissionInfo,
    RoleInfo, UpdateAdminDto, UpdateAdminResponse,
};
use everato_models::users::{
    LoginRequest, LoginResponse, MeResponse, MessageResponse, RefreshResponse, RegisterRequest,
    UserResponse,
};

use crate::modules::auth::controller::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::register_user,
        crate::modules::auth::controller::login_user,
        crate::modules::auth::controller::logout_user,
        crate::modules::auth::controller::refresh_token,
        crate::modules::auth::controller::get_me,
        crate::modules::admin::controller::login_admin,
        crate::modules::admin::controller::list_admins,
        crate::modules::admin::controller::search_admins,
        crate::modules::admin::controller::get_permissions,
        crate::modules::admin::controller::get_roles,
        crate::modules::admin::controller::create_admin,
        crate::modules::admin::controller::get_admin_by_username,
        crate::modules::admin::controller::get_admin,
        crate::modules::admin::controller::update_admin,
        crate::modules::admin::controller::delete_admin,
    ),
    components(
        schemas(
            Claims,
            AdminRole,
            Permission,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            RefreshResponse,
            MeResponse,
            UserResponse,
            MessageResponse,
            AdminLoginRequest,
            AdminLoginResponse,
            AdminResponse,
            CreateAdminDto,
            UpdateAdminDto,
            UpdateAdminResponse,
            PermissionInfo,
            RoleInfo,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "User session endpoints"),
        (name = "Admin", description = "Administrative accounts and catalogs")
    ),
    info(
        title = "Everato API",
        version = "0.1.0",
        description = "Authentication and administration API for the Everato event platform.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("jwt"))),
            );
        }
    }
}
