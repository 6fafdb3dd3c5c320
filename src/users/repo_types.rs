use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    users::model::{User, UserCredentials},
    values::{Email, Id, Password, Timestamp, ValidationErrors},
};

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub lastname: String,
    pub firstname: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<UserRow> for User {
    type Error = ValidationErrors;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: Id::from(row.id),
            email: Email::new(row.email)?,
            lastname: row.lastname,
            firstname: row.firstname,
            created_at: Timestamp::from(row.created_at),
            updated_at: Timestamp::from(row.updated_at),
            deleted_at: row.deleted_at.map(Timestamp::from),
        })
    }
}

/// Login lookup result.
#[derive(Debug, Clone, FromRow)]
pub struct CredentialsRow {
    pub id: Uuid,
    pub password: String,
}

impl From<CredentialsRow> for UserCredentials {
    fn from(row: CredentialsRow) -> Self {
        Self {
            id: Id::from(row.id),
            password: Password::from_hash(row.password),
        }
    }
}
