use crate::values::{Email, Id, Password, Timestamp};

/// A registered account. The password hash never travels with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Id,
    pub email: Email,
    pub lastname: String,
    pub firstname: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

impl User {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// What the token use case needs to check a login.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub id: Id,
    pub password: Password,
}

/// A user ready to be stored: id assigned, password already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Id,
    pub email: Email,
    pub password: Password,
    pub lastname: String,
    pub firstname: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<NewUser> for User {
    fn from(new: NewUser) -> Self {
        Self {
            id: new.id,
            email: new.email,
            lastname: new.lastname,
            firstname: new.firstname,
            created_at: new.created_at,
            updated_at: new.updated_at,
            deleted_at: None,
        }
    }
}
