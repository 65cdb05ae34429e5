//! Queries over the `users` table.

use sqlx::PgExecutor;
use uuid::Uuid;

use everato_models::User;

/// Fields for a new regular account. `password` is already hashed.
#[derive(Debug)]
pub struct NewUser<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

const COLUMNS: &str = "id, first_name, last_name, email, password, verified, created_at";

pub async fn find_by_email<'e, E>(executor: E, email: &str) -> Result<Option<User>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
    sqlx::query_as::<_, User>(&sql)
        .bind(email)
        .fetch_optional(executor)
        .await
}

pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<User>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
    sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Inserts an unverified account. A taken email surfaces as a unique violation.
pub async fn insert<'e, E>(executor: E, user: NewUser<'_>) -> Result<User, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        "INSERT INTO users (first_name, last_name, email, password) \
         VALUES ($1, $2, $3, $4) RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, User>(&sql)
        .bind(user.first_name)
        .bind(user.last_name)
        .bind(user.email)
        .bind(user.password)
        .fetch_one(executor)
        .await
}
