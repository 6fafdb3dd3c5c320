use std::sync::Arc;

use anyhow::Context;
use axum::extract::FromRef;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    auth::jwt::{TokenGenerator, TokenVerifier},
    config::AppConfig,
    users::{
        repo::{PgUserRepository, UserRepository},
        services::UserService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub verifier: Arc<TokenVerifier>,
}

impl AppState {
    /// Builds the signer and verifier first so a bad JWT setup fails before
    /// any connection is opened.
    pub async fn init(config: &AppConfig) -> anyhow::Result<(Self, PgPool)> {
        let generator = TokenGenerator::new(&config.jwt).context("build access token generator")?;
        let verifier = TokenVerifier::new(&config.jwt).context("build access token verifier")?;

        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        let repo = Arc::new(PgUserRepository::new(db.clone()));
        Ok((
            Self::from_parts(repo, Arc::new(generator), Arc::new(verifier)),
            db,
        ))
    }

    pub fn from_parts(
        repo: Arc<dyn UserRepository>,
        generator: Arc<TokenGenerator>,
        verifier: Arc<TokenVerifier>,
    ) -> Self {
        Self {
            users: UserService::new(repo, generator),
            verifier,
        }
    }
}

impl FromRef<AppState> for Arc<TokenVerifier> {
    fn from_ref(state: &AppState) -> Self {
        state.verifier.clone()
    }
}
