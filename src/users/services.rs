use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        jwt::{AccessToken, TokenError, TokenGenerator},
        password::PasswordError,
    },
    users::{
        model::{NewUser, User},
        repo::{CreateUserError, ListQuery, UserRepository},
    },
    values::{Email, Id, Password, Timestamp, ValidationErrors},
};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("user not found")]
    NotFound,
    #[error("email already registered")]
    EmailTaken,
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Repository(#[from] anyhow::Error),
}

/// Input of the registration use case.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: Email,
    pub password: Password,
    pub lastname: String,
    pub firstname: String,
}

/// One page of users plus the size of the whole listing.
#[derive(Debug, Clone)]
pub struct UserPage {
    pub users: Vec<User>,
    pub total: i64,
}

/// Runs a CPU-bound password operation off the async workers.
async fn blocking<T, F>(f: F) -> Result<T, ServiceError>
where
    F: FnOnce() -> Result<T, PasswordError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| {
            error!(error = %e, "password task failed");
            ServiceError::Password(PasswordError::Hash)
        })?
        .map_err(ServiceError::from)
}

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    tokens: Arc<TokenGenerator>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>, tokens: Arc<TokenGenerator>) -> Self {
        Self { repo, tokens }
    }

    /// Exchanges credentials for an access token. An unknown email and a
    /// wrong password fail the same way.
    #[instrument(skip(self, email, password), fields(email = %email))]
    pub async fn access_token(
        &self,
        email: &Email,
        password: &Password,
    ) -> Result<AccessToken, ServiceError> {
        let Some(credentials) = self.repo.get_by_email(email).await? else {
            warn!("login unknown email");
            return Err(ServiceError::Unauthorized);
        };

        let stored = credentials.password;
        let candidate = password.value().to_string();
        match blocking(move || stored.verify(&candidate)).await {
            Ok(()) => {}
            Err(ServiceError::Password(PasswordError::Mismatch)) => {
                warn!(user_id = %credentials.id, "login invalid password");
                return Err(ServiceError::Unauthorized);
            }
            Err(e) => return Err(e),
        }

        let token = self.tokens.generate(&credentials.id)?;
        info!(user_id = %credentials.id, "access token issued");
        Ok(token)
    }

    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn create(&self, req: CreateUser) -> Result<User, ServiceError> {
        if self.repo.get_by_email(&req.email).await?.is_some() {
            warn!("email already registered");
            return Err(ServiceError::EmailTaken);
        }

        let plain = req.password;
        let hash = blocking(move || plain.hash()).await?;

        let now = Timestamp::now();
        let user = self
            .repo
            .create(NewUser {
                id: Id::generate(),
                email: req.email,
                password: Password::from_hash(hash),
                lastname: req.lastname,
                firstname: req.firstname,
                created_at: now,
                updated_at: now,
            })
            .await
            .map_err(|e| match e {
                CreateUserError::EmailTaken => {
                    warn!("email already registered");
                    ServiceError::EmailTaken
                }
                CreateUserError::Other(e) => ServiceError::Repository(e),
            })?;
        info!(user_id = %user.id, "user created");
        Ok(user)
    }

    pub async fn get_by_id(&self, id: &Id) -> Result<User, ServiceError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound)
    }

    /// Counts first and only fetches rows when the listing is not empty.
    pub async fn get_all(&self, query: &ListQuery) -> Result<UserPage, ServiceError> {
        let total = self.repo.count_all(query.deleted).await?;
        let users = if total > 0 {
            self.repo.get_all(query).await?
        } else {
            Vec::new()
        };
        Ok(UserPage { users, total })
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &Id) -> Result<(), ServiceError> {
        if !self.repo.delete(id).await? {
            return Err(ServiceError::NotFound);
        }
        info!(user_id = %id, "user deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn restore(&self, id: &Id) -> Result<(), ServiceError> {
        if !self.repo.restore(id).await? {
            return Err(ServiceError::NotFound);
        }
        info!(user_id = %id, "user restored");
        Ok(())
    }
}
