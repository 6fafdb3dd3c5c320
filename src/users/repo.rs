use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::{
    users::{
        model::{NewUser, User, UserCredentials},
        repo_types::{CredentialsRow, UserRow},
    },
    values::{Email, Id, Pagination, Sorts},
};

/// Parameters of a user listing.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub pagination: Pagination,
    pub sorts: Sorts,
    /// List soft-deleted users instead of live ones.
    pub deleted: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateUserError {
    /// Another row, live or soft-deleted, already holds the email.
    #[error("email already registered")]
    EmailTaken,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Storage contract for users. Soft-deleted users are invisible to
/// `get_by_email` and `get_by_id`.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_by_email(&self, email: &Email) -> anyhow::Result<Option<UserCredentials>>;
    async fn create(&self, user: NewUser) -> Result<User, CreateUserError>;
    async fn get_by_id(&self, id: &Id) -> anyhow::Result<Option<User>>;
    async fn count_all(&self, deleted: bool) -> anyhow::Result<i64>;
    async fn get_all(&self, query: &ListQuery) -> anyhow::Result<Vec<User>>;
    /// Returns `false` when no live user has this id.
    async fn delete(&self, id: &Id) -> anyhow::Result<bool>;
    /// Returns `false` when no deleted user has this id.
    async fn restore(&self, id: &Id) -> anyhow::Result<bool>;
}

/// Columns a listing may be ordered by.
pub(crate) fn sort_column(field: &str) -> Option<&'static str> {
    match field {
        "id" => Some("id"),
        "email" => Some("email"),
        "lastname" => Some("lastname"),
        "firstname" => Some("firstname"),
        "created_at" => Some("created_at"),
        "updated_at" => Some("updated_at"),
        _ => None,
    }
}

fn deleted_filter(deleted: bool) -> &'static str {
    if deleted {
        "users.deleted_at IS NOT NULL"
    } else {
        "users.deleted_at IS NULL"
    }
}

/// ORDER BY body for a listing; falls back to newest first.
pub(crate) fn order_by(sorts: &Sorts) -> String {
    let fragments = sorts.map_fields(sort_column).fragments(Some("users"));
    if fragments.is_empty() {
        "users.created_at DESC".to_string()
    } else {
        fragments.join(", ")
    }
}

#[derive(Clone)]
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn get_by_email(&self, email: &Email) -> anyhow::Result<Option<UserCredentials>> {
        let row = sqlx::query_as::<_, CredentialsRow>(
            r#"
            SELECT id, password
            FROM users
            WHERE email = $1
              AND deleted_at IS NULL
            LIMIT 1
            "#,
        )
        .bind(email.value())
        .fetch_optional(&self.db)
        .await
        .context("get user by email")?;
        Ok(row.map(UserCredentials::from))
    }

    async fn create(&self, user: NewUser) -> Result<User, CreateUserError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, email, password, lastname, firstname, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, email, lastname, firstname, created_at, updated_at, deleted_at
            "#,
        )
        .bind(user.id.value())
        .bind(user.email.value())
        .bind(user.password.value())
        .bind(&user.lastname)
        .bind(&user.firstname)
        .bind(user.created_at.to_utc())
        .bind(user.updated_at.to_utc())
        .fetch_one(&self.db)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => CreateUserError::EmailTaken,
            other => CreateUserError::Other(anyhow::Error::new(other).context("insert user")),
        })?;
        debug!(user_id = %user.id, "user inserted");
        User::try_from(row).map_err(|e| CreateUserError::Other(e.into()))
    }

    async fn get_by_id(&self, id: &Id) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, lastname, firstname, created_at, updated_at, deleted_at
            FROM users
            WHERE id = $1
              AND deleted_at IS NULL
            LIMIT 1
            "#,
        )
        .bind(id.value())
        .fetch_optional(&self.db)
        .await
        .context("get user by id")?;
        Ok(row.map(User::try_from).transpose()?)
    }

    async fn count_all(&self, deleted: bool) -> anyhow::Result<i64> {
        let q = format!(
            "SELECT COUNT(users.id) FROM users WHERE {}",
            deleted_filter(deleted)
        );
        let total = sqlx::query_scalar::<_, i64>(&q)
            .fetch_one(&self.db)
            .await
            .context("count users")?;
        Ok(total)
    }

    async fn get_all(&self, query: &ListQuery) -> anyhow::Result<Vec<User>> {
        // Only allow-listed column names reach the query text.
        let q = format!(
            r#"
            SELECT users.id, users.email, users.lastname, users.firstname,
                   users.created_at, users.updated_at, users.deleted_at
            FROM users
            WHERE {}
            ORDER BY {}
            LIMIT $1 OFFSET $2
            "#,
            deleted_filter(query.deleted),
            order_by(&query.sorts)
        );
        let rows = sqlx::query_as::<_, UserRow>(&q)
            .bind(query.pagination.limit())
            .bind(query.pagination.offset())
            .fetch_all(&self.db)
            .await
            .context("list users")?;
        rows.into_iter()
            .map(|r| User::try_from(r).map_err(anyhow::Error::from))
            .collect()
    }

    async fn delete(&self, id: &Id) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET deleted_at = NOW()
            WHERE id = $1
              AND deleted_at IS NULL
            "#,
        )
        .bind(id.value())
        .execute(&self.db)
        .await
        .context("soft delete user")?;
        Ok(result.rows_affected() > 0)
    }

    async fn restore(&self, id: &Id) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET deleted_at = NULL
            WHERE id = $1
              AND deleted_at IS NOT NULL
            "#,
        )
        .bind(id.value())
        .execute(&self.db)
        .await
        .context("restore user")?;
        Ok(result.rows_affected() > 0)
    }
}

/// In-memory repository used by service and router tests.
#[cfg(test)]
pub(crate) mod memory {
    use std::cmp::Ordering;
    use std::sync::Mutex;

    use super::*;
    use crate::values::{Password, SortDirection, Timestamp};

    #[derive(Default)]
    pub(crate) struct MemoryUserRepository {
        users: Mutex<Vec<(User, Password)>>,
    }

    fn compare(a: &User, b: &User, column: &str) -> Ordering {
        match column {
            "id" => a.id.to_string().cmp(&b.id.to_string()),
            "email" => a.email.value().cmp(b.email.value()),
            "lastname" => a.lastname.cmp(&b.lastname),
            "firstname" => a.firstname.cmp(&b.firstname),
            "updated_at" => a.updated_at.cmp(&b.updated_at),
            _ => a.created_at.cmp(&b.created_at),
        }
    }

    #[async_trait]
    impl UserRepository for MemoryUserRepository {
        async fn get_by_email(&self, email: &Email) -> anyhow::Result<Option<UserCredentials>> {
            let users = self.users.lock().expect("lock");
            Ok(users
                .iter()
                .find(|(u, _)| &u.email == email && !u.is_deleted())
                .map(|(u, p)| UserCredentials {
                    id: u.id,
                    password: p.clone(),
                }))
        }

        async fn create(&self, user: NewUser) -> Result<User, CreateUserError> {
            let mut users = self.users.lock().expect("lock");
            // Same scope as the unique index: deleted rows keep their email.
            if users.iter().any(|(u, _)| u.email == user.email) {
                return Err(CreateUserError::EmailTaken);
            }
            let password = user.password.clone();
            let created = User::from(user);
            users.push((created.clone(), password));
            Ok(created)
        }

        async fn get_by_id(&self, id: &Id) -> anyhow::Result<Option<User>> {
            let users = self.users.lock().expect("lock");
            Ok(users
                .iter()
                .find(|(u, _)| &u.id == id && !u.is_deleted())
                .map(|(u, _)| u.clone()))
        }

        async fn count_all(&self, deleted: bool) -> anyhow::Result<i64> {
            let users = self.users.lock().expect("lock");
            Ok(users.iter().filter(|(u, _)| u.is_deleted() == deleted).count() as i64)
        }

        async fn get_all(&self, query: &ListQuery) -> anyhow::Result<Vec<User>> {
            let users = self.users.lock().expect("lock");
            let mut selected: Vec<User> = users
                .iter()
                .filter(|(u, _)| u.is_deleted() == query.deleted)
                .map(|(u, _)| u.clone())
                .collect();
            let sorts = query.sorts.map_fields(sort_column);
            selected.sort_by(|a, b| {
                sorts
                    .iter()
                    .map(|s| {
                        let ord = compare(a, b, s.field());
                        match s.direction() {
                            SortDirection::Asc => ord,
                            SortDirection::Desc => ord.reverse(),
                        }
                    })
                    .find(|o| o.is_ne())
                    .unwrap_or(Ordering::Equal)
            });
            Ok(selected
                .into_iter()
                .skip(query.pagination.offset() as usize)
                .take(query.pagination.limit() as usize)
                .collect())
        }

        async fn delete(&self, id: &Id) -> anyhow::Result<bool> {
            let mut users = self.users.lock().expect("lock");
            match users.iter_mut().find(|(u, _)| &u.id == id && !u.is_deleted()) {
                Some((u, _)) => {
                    u.deleted_at = Some(Timestamp::now());
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn restore(&self, id: &Id) -> anyhow::Result<bool> {
            let mut users = self.users.lock().expect("lock");
            match users.iter_mut().find(|(u, _)| &u.id == id && u.is_deleted()) {
                Some((u, _)) => {
                    u.deleted_at = None;
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_by_keeps_only_known_columns() {
        let sorts = Sorts::parse("+lastname,-password,+created_at;DROP TABLE users");
        assert_eq!(order_by(&sorts), "users.lastname ASC");

        let sorts = Sorts::parse("-updated_at,+id");
        assert_eq!(order_by(&sorts), "users.updated_at DESC, users.id ASC");
    }

    #[test]
    fn order_by_defaults_to_newest_first() {
        assert_eq!(order_by(&Sorts::default()), "users.created_at DESC");
        assert_eq!(order_by(&Sorts::parse("+secret")), "users.created_at DESC");
    }
}
