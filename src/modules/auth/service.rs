use anyhow::anyhow;
use sqlx::PgPool;
use tracing::{error, info, instrument};

use everato_auth::TokenSigner;
use everato_core::{AppError, hash_password, verify_password};
use everato_db::users::{self, NewUser};
use everato_db::{AccountStore, StoreError};
use everato_models::UserResponse;
use everato_models::users::{
    LoginRequest, LoginResponse, MeResponse, RefreshResponse, RegisterRequest,
};

use crate::metrics;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub struct AuthService;

impl AuthService {
    /// New accounts start unverified.
    #[instrument(skip(db, dto), fields(email = %dto.email))]
    pub async fn register_user(db: &PgPool, dto: RegisterRequest) -> Result<UserResponse, AppError> {
        let email = dto.email.trim();

        if users::find_by_email(db, email).await?.is_some() {
            return Err(AppError::conflict(anyhow!("Email already exists")));
        }

        let password = hash_password(&dto.password)?;

        let user = users::insert(
            db,
            NewUser {
                first_name: dto.first_name.trim(),
                last_name: dto.last_name.trim(),
                email,
                password: &password,
            },
        )
        .await
        .map_err(email_conflict_or_internal)?;

        metrics::track_registration();
        info!(user_id = %user.id, "user registered");

        Ok(user.into())
    }

    /// Unknown email and wrong password fail identically.
    #[instrument(skip(accounts, signer, dto), fields(email = %dto.email))]
    pub async fn login_user(
        accounts: &dyn AccountStore,
        signer: &TokenSigner,
        dto: LoginRequest,
    ) -> Result<LoginResponse, AppError> {
        let user = match accounts.user_by_email(&dto.email).await {
            Ok(user) => user,
            Err(StoreError::NotFound) => {
                metrics::track_login_failure("user", "unknown_account");
                return Err(AppError::unauthorized(INVALID_CREDENTIALS.to_string()));
            }
            Err(StoreError::Unavailable(reason)) => {
                error!(%reason, "user lookup failed during login");
                return Err(AppError::internal_error("Internal server error".to_string()));
            }
        };

        if !verify_password(&dto.password, &user.password)? {
            metrics::track_login_failure("user", "wrong_password");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let (token, _) = signer.issue(&user.id.to_string(), &user.email)?;

        metrics::track_login_success("user");
        info!(user_id = %user.id, "user logged in");

        Ok(LoginResponse {
            message: "Login successful".to_string(),
            token,
            user: user.into(),
        })
    }

    #[instrument(skip(accounts, signer))]
    pub async fn refresh_token(
        accounts: &dyn AccountStore,
        signer: &TokenSigner,
        uid: &str,
    ) -> Result<RefreshResponse, AppError> {
        let user = accounts.user_by_id(uid).await.map_err(|err| match err {
            StoreError::NotFound => AppError::unauthorized("Account no longer exists".to_string())
                .with_reason("principal_not_found"),
            StoreError::Unavailable(reason) => {
                error!(%reason, "user lookup failed during refresh");
                AppError::internal_error("Internal server error".to_string())
            }
        })?;

        let (token, claims) = signer.issue(&user.id.to_string(), &user.email)?;

        Ok(RefreshResponse {
            token,
            exp: claims.exp,
        })
    }

    #[instrument(skip(accounts))]
    pub async fn current_user(accounts: &dyn AccountStore, uid: &str) -> Result<MeResponse, AppError> {
        let user = match accounts.user_by_id(uid).await {
            Ok(user) => Some(user.into()),
            Err(StoreError::NotFound) => None,
            Err(StoreError::Unavailable(reason)) => {
                error!(%reason, "user lookup failed");
                return Err(AppError::internal_error("Internal server error".to_string()));
            }
        };

        Ok(MeResponse {
            uid: uid.to_string(),
            user,
        })
    }
}

/// A concurrent registration can still win the race past the lookup.
fn email_conflict_or_internal(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return AppError::conflict(anyhow!("Email already exists"));
        }
    }
    err.into()
}
