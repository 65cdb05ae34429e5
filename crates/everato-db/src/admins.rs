//! Queries over the `super_users` table.
//!
//! Roles and permissions are stored as text (`TEXT` and `TEXT[]`) and parsed
//! into [`AdminRole`]/[`Permission`] on the way out; a row holding a tag outside
//! the vocabulary surfaces as a decode error rather than being silently dropped.

use chrono::{DateTime, Utc};
use sqlx::{Encode, FromRow, PgExecutor, Postgres, Type};
use uuid::Uuid;

use everato_core::{AdminRole, Permission};
use everato_models::Admin;

const COLUMNS: &str = "id, username, email, password, role, permissions, created_at, updated_at";

#[derive(Debug, FromRow)]
struct AdminRow {
    id: Uuid,
    username: String,
    email: String,
    password: String,
    role: String,
    permissions: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AdminRow> for Admin {
    type Error = sqlx::Error;

    fn try_from(row: AdminRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse::<AdminRole>()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        let permissions = row
            .permissions
            .iter()
            .map(|p| p.parse::<Permission>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

        Ok(Admin {
            id: row.id,
            username: row.username,
            email: row.email,
            password: row.password,
            role,
            permissions,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Fields for a new administrative account. `password` is already hashed.
#[derive(Debug)]
pub struct NewAdmin<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub role: AdminRole,
    pub permissions: &'a [Permission],
}

/// Partial update; `None` leaves the column untouched. `password` is already hashed.
#[derive(Debug, Default)]
pub struct AdminChanges {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<AdminRole>,
    pub permissions: Option<Vec<Permission>>,
}

impl AdminChanges {
    /// Names of the fields this change touches, in a stable order.
    pub fn field_names(&self) -> Vec<String> {
        [
            ("email", self.email.is_some()),
            ("username", self.username.is_some()),
            ("password", self.password.is_some()),
            ("role", self.role.is_some()),
            ("permissions", self.permissions.is_some()),
        ]
        .into_iter()
        .filter(|(_, changed)| *changed)
        .map(|(name, _)| name.to_string())
        .collect()
    }
}

fn tags<T: ToString>(values: &[T]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

async fn fetch_optional<'e, 'q, E, B>(
    executor: E,
    sql: &'q str,
    bind: B,
) -> Result<Option<Admin>, sqlx::Error>
where
    E: PgExecutor<'e>,
    B: 'q + Send + Encode<'q, Postgres> + Type<Postgres>,
{
    sqlx::query_as::<_, AdminRow>(sql)
        .bind(bind)
        .fetch_optional(executor)
        .await?
        .map(Admin::try_from)
        .transpose()
}

pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Admin>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!("SELECT {COLUMNS} FROM super_users WHERE id = $1");
    fetch_optional(executor, &sql, id).await
}

/// Reads the acting account inside a transaction, holding a share lock so a
/// concurrent demotion waits for this transaction to finish.
pub async fn find_for_share<'e, E>(executor: E, id: Uuid) -> Result<Option<Admin>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!("SELECT {COLUMNS} FROM super_users WHERE id = $1 FOR SHARE");
    fetch_optional(executor, &sql, id).await
}

/// The acting and target accounts of a mutation, as `(actor, target)`.
///
/// Both rows are locked in a single statement, in id order, so two
/// transactions touching the same pair always lock them in the same order.
/// When `actor_id == target_id` the one row fills both slots.
pub async fn lock_pair<'e, E>(
    executor: E,
    actor_id: Uuid,
    target_id: Uuid,
) -> Result<(Option<Admin>, Option<Admin>), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        "SELECT {COLUMNS} FROM super_users WHERE id = ANY($1) ORDER BY id FOR UPDATE"
    );
    let rows = sqlx::query_as::<_, AdminRow>(&sql)
        .bind(vec![actor_id, target_id])
        .fetch_all(executor)
        .await?;

    let mut actor = None;
    let mut target = None;
    for row in rows {
        let admin = Admin::try_from(row)?;
        if admin.id == actor_id {
            actor = Some(admin.clone());
        }
        if admin.id == target_id {
            target = Some(admin);
        }
    }

    Ok((actor, target))
}

pub async fn find_by_email<'e, E>(executor: E, email: &str) -> Result<Option<Admin>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!("SELECT {COLUMNS} FROM super_users WHERE email = $1");
    fetch_optional(executor, &sql, email).await
}

pub async fn find_by_username<'e, E>(
    executor: E,
    username: &str,
) -> Result<Option<Admin>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!("SELECT {COLUMNS} FROM super_users WHERE username = $1");
    fetch_optional(executor, &sql, username).await
}

/// Exact match on email or username. A row matching both is returned once.
pub async fn search<'e, E>(executor: E, query: &str) -> Result<Vec<Admin>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        "SELECT {COLUMNS} FROM super_users WHERE email = $1 OR username = $1 ORDER BY created_at"
    );
    sqlx::query_as::<_, AdminRow>(&sql)
        .bind(query)
        .fetch_all(executor)
        .await?
        .into_iter()
        .map(Admin::try_from)
        .collect()
}

pub async fn list_all<'e, E>(executor: E) -> Result<Vec<Admin>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!("SELECT {COLUMNS} FROM super_users ORDER BY created_at");
    sqlx::query_as::<_, AdminRow>(&sql)
        .fetch_all(executor)
        .await?
        .into_iter()
        .map(Admin::try_from)
        .collect()
}

/// True if any account already uses `email` or `username`.
pub async fn exists<'e, E>(executor: E, email: &str, username: &str) -> Result<bool, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM super_users WHERE email = $1 OR username = $2)",
    )
    .bind(email)
    .bind(username)
    .fetch_one(executor)
    .await
}

pub async fn insert<'e, E>(executor: E, admin: NewAdmin<'_>) -> Result<Admin, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        "INSERT INTO super_users (username, email, password, role, permissions) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, AdminRow>(&sql)
        .bind(admin.username)
        .bind(admin.email)
        .bind(admin.password)
        .bind(admin.role.as_str())
        .bind(tags(admin.permissions))
        .fetch_one(executor)
        .await?
        .try_into()
}

/// Inserts unless the email or username is taken; returns `None` in that case.
pub async fn insert_if_not_exists<'e, E>(
    executor: E,
    admin: NewAdmin<'_>,
) -> Result<Option<Admin>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        "INSERT INTO super_users (username, email, password, role, permissions) \
         VALUES ($1, $2, $3, $4, $5) ON CONFLICT DO NOTHING RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, AdminRow>(&sql)
        .bind(admin.username)
        .bind(admin.email)
        .bind(admin.password)
        .bind(admin.role.as_str())
        .bind(tags(admin.permissions))
        .fetch_optional(executor)
        .await?
        .map(Admin::try_from)
        .transpose()
}

pub async fn update<'e, E>(executor: E, id: Uuid, changes: &AdminChanges) -> Result<Admin, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        "UPDATE super_users SET \
            email = COALESCE($2, email), \
            username = COALESCE($3, username), \
            password = COALESCE($4, password), \
            role = COALESCE($5, role), \
            permissions = COALESCE($6, permissions), \
            updated_at = NOW() \
         WHERE id = $1 RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, AdminRow>(&sql)
        .bind(id)
        .bind(changes.email.as_deref())
        .bind(changes.username.as_deref())
        .bind(changes.password.as_deref())
        .bind(changes.role.map(|r| r.as_str()))
        .bind(changes.permissions.as_deref().map(tags))
        .fetch_one(executor)
        .await?
        .try_into()
}

/// Returns the number of rows removed.
pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM super_users WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
