use anyhow::anyhow;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use everato_auth::{AdminAction, Principal, TokenSigner, authorize};
use everato_core::{AdminRole, AppError, AuthError, hash_password, verify_password};
use everato_db::admins::{self, AdminChanges, NewAdmin};
use everato_db::{AccountStore, StoreError};
use everato_models::admins::{
    AdminLoginRequest, AdminLoginResponse, CreateAdminDto, UpdateAdminDto, UpdateAdminResponse,
};
use everato_models::{Admin, AdminResponse, MessageResponse};

use crate::metrics;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub struct AdminService;

impl AdminService {
    /// Accounts holding the plain USER role are refused.
    #[instrument(skip(accounts, signer, dto), fields(email = %dto.email))]
    pub async fn login_admin(
        accounts: &dyn AccountStore,
        signer: &TokenSigner,
        dto: AdminLoginRequest,
    ) -> Result<AdminLoginResponse, AppError> {
        let admin = match accounts.admin_by_email(&dto.email).await {
            Ok(admin) => admin,
            Err(StoreError::NotFound) => {
                metrics::track_login_failure("admin", "unknown_account");
                return Err(AppError::unauthorized(INVALID_CREDENTIALS.to_string()));
            }
            Err(StoreError::Unavailable(reason)) => {
                error!(%reason, "admin lookup failed during login");
                return Err(AppError::internal_error("Internal server error".to_string()));
            }
        };

        if !verify_password(&dto.password, &admin.password)? {
            metrics::track_login_failure("admin", "wrong_password");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        if !admin.role.is_admin() {
            metrics::track_login_failure("admin", "not_admin");
            return Err(AuthError::PrincipalNotFound.into());
        }

        let (token, _) = signer.issue(&admin.id.to_string(), &admin.username)?;

        metrics::track_login_success("admin");
        info!(admin_id = %admin.id, role = %admin.role, "admin logged in");

        Ok(AdminLoginResponse {
            message: "Login successful".to_string(),
            token,
            user: admin.into(),
        })
    }

    #[instrument(skip(db))]
    pub async fn list_admins(db: &PgPool, actor_id: Uuid) -> Result<Vec<AdminResponse>, AppError> {
        let actor = actor_principal(admins::find_by_id(db, actor_id).await?)?;
        check(&actor, AdminAction::Search)?;

        let admins = admins::list_all(db).await?;
        Ok(admins.into_iter().map(AdminResponse::from).collect())
    }

    #[instrument(skip(db))]
    pub async fn search_admins(
        db: &PgPool,
        actor_id: Uuid,
        query: &str,
    ) -> Result<Vec<AdminResponse>, AppError> {
        let actor = actor_principal(admins::find_by_id(db, actor_id).await?)?;
        check(&actor, AdminAction::Search)?;

        let admins = admins::search(db, query.trim()).await?;
        Ok(admins.into_iter().map(AdminResponse::from).collect())
    }

    #[instrument(skip(db))]
    pub async fn get_admin(db: &PgPool, actor_id: Uuid, id: Uuid) -> Result<AdminResponse, AppError> {
        let actor = actor_principal(admins::find_by_id(db, actor_id).await?)?;
        let target = admins::find_by_id(db, id).await?;
        view(&actor, target)
    }

    #[instrument(skip(db))]
    pub async fn get_admin_by_username(
        db: &PgPool,
        actor_id: Uuid,
        username: &str,
    ) -> Result<AdminResponse, AppError> {
        let actor = actor_principal(admins::find_by_id(db, actor_id).await?)?;
        let target = admins::find_by_username(db, username).await?;
        view(&actor, target)
    }

    #[instrument(skip(db, dto), fields(username = %dto.username, role = %dto.role))]
    pub async fn create_admin(
        db: &PgPool,
        actor_id: Uuid,
        dto: CreateAdminDto,
    ) -> Result<AdminResponse, AppError> {
        let role = assignable_role(dto.parsed_role()?)?;
        let permissions = dto.parsed_permissions()?;
        let password = hash_password(&dto.password)?;

        let mut tx = db.begin().await?;

        let actor = match actor_principal(admins::find_for_share(&mut *tx, actor_id).await?) {
            Ok(actor) => actor,
            Err(err) => return Err(abort(tx, err).await),
        };

        if let Err(err) = check(&actor, AdminAction::Create { role }) {
            return Err(abort(tx, err).await);
        }

        if admins::exists(&mut *tx, &dto.email, &dto.username).await? {
            let err = AppError::conflict(anyhow!("Email or username already exists"));
            return Err(abort(tx, err).await);
        }

        let admin = admins::insert(
            &mut *tx,
            NewAdmin {
                username: &dto.username,
                email: &dto.email,
                password: &password,
                role,
                permissions: &permissions,
            },
        )
        .await
        .map_err(conflict_or_internal)?;

        commit(tx).await?;

        info!(actor = %actor_id, admin_id = %admin.id, role = %admin.role, "admin created");
        Ok(admin.into())
    }

    #[instrument(skip(db, dto))]
    pub async fn update_admin(
        db: &PgPool,
        actor_id: Uuid,
        id: Uuid,
        dto: UpdateAdminDto,
    ) -> Result<UpdateAdminResponse, AppError> {
        if dto.is_empty() {
            return Err(AppError::bad_request(anyhow!("No fields to update")));
        }

        let role = dto.parsed_role()?.map(assignable_role).transpose()?;
        let permissions = dto.parsed_permissions()?;
        let password = dto.password.as_deref().map(hash_password).transpose()?;

        let mut tx = db.begin().await?;

        let (actor, target) = admins::lock_pair(&mut *tx, actor_id, id).await?;

        let actor = match actor_principal(actor) {
            Ok(actor) => actor,
            Err(err) => return Err(abort(tx, err).await),
        };

        let Some(target) = target else {
            let err = missing_target(&actor);
            return Err(abort(tx, err).await);
        };

        let target_principal = target.principal();
        let action = AdminAction::Update {
            target: &target_principal,
            new_role: role,
            changes_permissions: permissions.is_some(),
        };
        if let Err(err) = check(&actor, action) {
            return Err(abort(tx, err).await);
        }

        if let Some(email) = dto.email.as_deref() {
            if taken_by_other(admins::find_by_email(&mut *tx, email).await?, target.id) {
                let err = AppError::conflict(anyhow!("Email already exists"));
                return Err(abort(tx, err).await);
            }
        }
        if let Some(username) = dto.username.as_deref() {
            if taken_by_other(admins::find_by_username(&mut *tx, username).await?, target.id) {
                let err = AppError::conflict(anyhow!("Username already exists"));
                return Err(abort(tx, err).await);
            }
        }

        let changes = AdminChanges {
            email: dto.email,
            username: dto.username,
            password,
            role,
            permissions,
        };

        let admin = admins::update(&mut *tx, target.id, &changes)
            .await
            .map_err(conflict_or_internal)?;

        commit(tx).await?;

        let updated_fields = changes.field_names();
        info!(actor = %actor_id, admin_id = %admin.id, fields = ?updated_fields, "admin updated");

        Ok(UpdateAdminResponse {
            message: "Admin updated successfully".to_string(),
            admin: admin.into(),
            updated_fields,
        })
    }

    #[instrument(skip(db))]
    pub async fn delete_admin(
        db: &PgPool,
        actor_id: Uuid,
        id: Uuid,
    ) -> Result<MessageResponse, AppError> {
        let mut tx = db.begin().await?;

        let (actor, target) = admins::lock_pair(&mut *tx, actor_id, id).await?;

        let actor = match actor_principal(actor) {
            Ok(actor) => actor,
            Err(err) => return Err(abort(tx, err).await),
        };

        let Some(target) = target else {
            let err = missing_target(&actor);
            return Err(abort(tx, err).await);
        };

        if let Err(err) = check(&actor, AdminAction::Delete { target: &target.principal() }) {
            return Err(abort(tx, err).await);
        }

        admins::delete(&mut *tx, target.id).await?;
        commit(tx).await?;

        info!(actor = %actor_id, admin_id = %target.id, "admin deleted");
        Ok(MessageResponse::new("Admin deleted successfully"))
    }
}

/// The acting account as currently stored. A deleted or demoted actor no
/// longer counts as an administrator.
fn actor_principal(actor: Option<Admin>) -> Result<Principal, AppError> {
    match actor {
        Some(admin) if admin.role.is_admin() => Ok(admin.principal()),
        _ => Err(AuthError::PrincipalNotFound.into()),
    }
}

fn check(actor: &Principal, action: AdminAction<'_>) -> Result<(), AppError> {
    authorize(actor, &action).into_result().map_err(|reason| {
        warn!(
            actor = %actor.id,
            action = action.name(),
            reason = reason.reason(),
            "administrative action denied"
        );
        metrics::track_authorization_denied(action.name(), reason.reason());
        AppError::from(reason)
    })
}

fn view(actor: &Principal, target: Option<Admin>) -> Result<AdminResponse, AppError> {
    let Some(target) = target else {
        return Err(missing_target(actor));
    };
    check(actor, AdminAction::View { target: &target.principal() })?;
    Ok(target.into())
}

/// Only actors who could see any account learn that one does not exist.
fn missing_target(actor: &Principal) -> AppError {
    if actor.manages_users() {
        AppError::not_found(anyhow!("Admin not found"))
    } else {
        AuthError::InsufficientPermission.into()
    }
}

fn assignable_role(role: AdminRole) -> Result<AdminRole, AppError> {
    if role.is_admin() {
        Ok(role)
    } else {
        Err(AppError::bad_request(anyhow!(
            "Role {} cannot be assigned to an administrative account",
            role
        )))
    }
}

fn taken_by_other(existing: Option<Admin>, id: Uuid) -> bool {
    existing.is_some_and(|admin| admin.id != id)
}

fn conflict_or_internal(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return AppError::conflict(anyhow!("Email or username already exists"));
        }
    }
    err.into()
}

async fn abort(tx: Transaction<'_, Postgres>, err: AppError) -> AppError {
    if let Err(rollback_err) = tx.rollback().await {
        warn!(error = %rollback_err, "rollback failed");
    }
    err
}

async fn commit(tx: Transaction<'_, Postgres>) -> Result<(), AppError> {
    tx.commit().await.map_err(|err| {
        error!(error = %err, "failed to commit administrative change");
        AuthError::TransactionFailure.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use everato_core::Permission;

    fn admin(role: AdminRole, permissions: Vec<Permission>) -> Admin {
        let now = Utc::now();
        Admin {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "hash".to_string(),
            role,
            permissions,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_actor_must_still_be_admin() {
        assert!(actor_principal(Some(admin(AdminRole::Editor, vec![]))).is_ok());

        let err = actor_principal(Some(admin(AdminRole::User, vec![]))).unwrap_err();
        assert_eq!(err.reason, Some("principal_not_found"));

        let err = actor_principal(None).unwrap_err();
        assert_eq!(err.status.as_u16(), 401);
    }

    #[test]
    fn test_missing_target_hides_existence_from_narrow_actors() {
        let manager = admin(AdminRole::Admin, vec![Permission::ManageUsers]).principal();
        assert_eq!(missing_target(&manager).status.as_u16(), 404);

        let editor = admin(AdminRole::Editor, vec![Permission::EditEvent]).principal();
        let err = missing_target(&editor);
        assert_eq!(err.status.as_u16(), 403);
        assert_eq!(err.reason, Some("insufficient_permission"));
    }

    #[test]
    fn test_view_self_and_others() {
        let editor = admin(AdminRole::Editor, vec![]);
        let actor = editor.principal();

        assert!(view(&actor, Some(editor.clone())).is_ok());

        let other = admin(AdminRole::Editor, vec![]);
        let err = view(&actor, Some(other)).unwrap_err();
        assert_eq!(err.status.as_u16(), 403);
    }

    #[test]
    fn test_user_role_is_not_assignable() {
        assert_eq!(assignable_role(AdminRole::Editor).unwrap(), AdminRole::Editor);
        assert_eq!(assignable_role(AdminRole::User).unwrap_err().status.as_u16(), 400);
    }

    #[test]
    fn test_taken_by_other() {
        let existing = admin(AdminRole::Admin, vec![]);
        let id = existing.id;

        assert!(!taken_by_other(Some(existing.clone()), id));
        assert!(taken_by_other(Some(existing), Uuid::new_v4()));
        assert!(!taken_by_other(None, id));
    }
}
