use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use everato_auth::Principal;
use everato_core::{AdminRole, AppError, Permission};

/// An administrative account as stored.
#[derive(Debug, Clone)]
pub struct Admin {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: AdminRole,
    pub permissions: Vec<Permission>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Admin {
    pub fn principal(&self) -> Principal {
        Principal::new(self.id.to_string(), self.role, self.permissions.iter().copied())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: AdminRole,
    pub permissions: Vec<Permission>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Admin> for AdminResponse {
    fn from(admin: Admin) -> Self {
        Self {
            id: admin.id,
            username: admin.username,
            email: admin.email,
            role: admin.role,
            permissions: admin.permissions,
            created_at: admin.created_at,
            updated_at: admin.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AdminLoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdminLoginResponse {
    pub message: String,
    pub token: String,
    pub user: AdminResponse,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAdminDto {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub role: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl CreateAdminDto {
    pub fn parsed_role(&self) -> Result<AdminRole, AppError> {
        parse_role(&self.role)
    }

    pub fn parsed_permissions(&self) -> Result<Vec<Permission>, AppError> {
        parse_permissions(&self.permissions)
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAdminDto {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: Option<String>,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,
    pub role: Option<String>,
    pub permissions: Option<Vec<String>>,
}

impl UpdateAdminDto {
    pub fn parsed_role(&self) -> Result<Option<AdminRole>, AppError> {
        self.role.as_deref().map(parse_role).transpose()
    }

    pub fn parsed_permissions(&self) -> Result<Option<Vec<Permission>>, AppError> {
        self.permissions
            .as_deref()
            .map(parse_permissions)
            .transpose()
    }

    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.username.is_none()
            && self.password.is_none()
            && self.role.is_none()
            && self.permissions.is_none()
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateAdminResponse {
    pub message: String,
    pub admin: AdminResponse,
    pub updated_fields: Vec<String>,
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdminSearchParams {
    /// Exact email or username
    #[validate(length(min = 1, message = "Search query is required"))]
    pub q: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PermissionInfo {
    pub name: Permission,
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RoleInfo {
    pub name: AdminRole,
    pub description: String,
}

pub fn permission_catalog() -> Vec<PermissionInfo> {
    Permission::ALL
        .into_iter()
        .map(|name| PermissionInfo {
            name,
            description: name.description().to_string(),
        })
        .collect()
}

/// Roles an administrative account may hold.
pub fn role_catalog() -> Vec<RoleInfo> {
    AdminRole::ALL
        .into_iter()
        .filter(AdminRole::is_admin)
        .map(|name| RoleInfo {
            name,
            description: name.description().to_string(),
        })
        .collect()
}

fn parse_role(raw: &str) -> Result<AdminRole, AppError> {
    raw.parse::<AdminRole>().map_err(AppError::bad_request)
}

fn parse_permissions(raw: &[String]) -> Result<Vec<Permission>, AppError> {
    let mut permissions = raw
        .iter()
        .map(|p| p.parse::<Permission>().map_err(AppError::bad_request))
        .collect::<Result<Vec<_>, _>>()?;
    permissions.sort();
    permissions.dedup();
    Ok(permissions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_dto(role: &str, permissions: &[&str]) -> CreateAdminDto {
        CreateAdminDto {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "password123".to_string(),
            role: role.to_string(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_unknown_role_is_bad_request() {
        let err = create_dto("OVERLORD", &[]).parsed_role().unwrap_err();
        assert_eq!(err.status.as_u16(), 400);
        assert_eq!(err.error.to_string(), "Invalid role: OVERLORD");
    }

    #[test]
    fn test_unknown_permission_is_bad_request() {
        let err = create_dto("ADMIN", &["MANAGE_USERS", "FLY"])
            .parsed_permissions()
            .unwrap_err();
        assert_eq!(err.status.as_u16(), 400);
    }

    #[test]
    fn test_permissions_are_deduplicated() {
        let permissions = create_dto("ADMIN", &["VIEW_REPORTS", "MANAGE_USERS", "VIEW_REPORTS"])
            .parsed_permissions()
            .unwrap();
        assert_eq!(
            permissions,
            vec![Permission::ManageUsers, Permission::ViewReports]
        );
    }

    #[test]
    fn test_update_dto_optional_fields() {
        let dto = UpdateAdminDto::default();
        assert!(dto.is_empty());
        assert_eq!(dto.parsed_role().unwrap(), None);
        assert!(dto.parsed_permissions().unwrap().is_none());

        let dto = UpdateAdminDto {
            role: Some("EDITOR".to_string()),
            ..Default::default()
        };
        assert_eq!(dto.parsed_role().unwrap(), Some(AdminRole::Editor));
    }

    #[test]
    fn test_update_dto_validation() {
        let dto = UpdateAdminDto {
            password: Some("short".to_string()),
            ..Default::default()
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_role_catalog_excludes_plain_users() {
        let roles: Vec<AdminRole> = role_catalog().into_iter().map(|r| r.name).collect();
        assert_eq!(
            roles,
            vec![AdminRole::SuperAdmin, AdminRole::Admin, AdminRole::Editor]
        );
    }

    #[test]
    fn test_permission_catalog_is_complete() {
        let catalog = permission_catalog();
        assert_eq!(catalog.len(), Permission::ALL.len());

        let json = serde_json::to_value(&catalog[0]).unwrap();
        assert_eq!(json["name"], "MANAGE_EVENTS");
        assert_eq!(json["description"], "Full control over all events");
    }

    #[test]
    fn test_admin_response_omits_password() {
        let now = Utc::now();
        let admin = Admin {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "$2b$04$hash".to_string(),
            role: AdminRole::Admin,
            permissions: vec![Permission::ManageUsers],
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(AdminResponse::from(admin)).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["role"], "ADMIN");
        assert_eq!(json["permissions"][0], "MANAGE_USERS");
    }
}
