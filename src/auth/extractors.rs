use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use super::jwt::TokenVerifier;
use crate::{error::ApiError, values::Id};

/// Extracts and validates the bearer token, returning the user ID.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Id);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    Arc<TokenVerifier>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| {
                warn!("missing Authorization header");
                ApiError::Unauthorized
            })?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or_else(|| {
                warn!("invalid auth scheme");
                ApiError::Unauthorized
            })?;

        let verifier = Arc::<TokenVerifier>::from_ref(state);
        let claims = verifier.verify(token.trim()).map_err(|e| {
            warn!(error = %e, "rejected access token");
            ApiError::Unauthorized
        })?;

        let user_id = Id::parse(&claims.sub).map_err(|e| {
            warn!(error = %e, "access token subject is not a user id");
            ApiError::Unauthorized
        })?;
        Ok(AuthUser(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::TokenGenerator;
    use crate::config::JwtConfig;
    use axum::http::Request;
    use std::time::Duration;

    #[derive(Clone)]
    struct TestState {
        verifier: Arc<TokenVerifier>,
    }

    impl FromRef<TestState> for Arc<TokenVerifier> {
        fn from_ref(state: &TestState) -> Self {
            state.verifier.clone()
        }
    }

    fn config() -> JwtConfig {
        JwtConfig {
            algorithm: "HS512".into(),
            lifetime: Duration::from_secs(3600),
            secret: "extractor-secret".into(),
            private_key_path: None,
            public_key_path: None,
        }
    }

    async fn extract(header: Option<&str>) -> Result<AuthUser, ApiError> {
        let state = TestState {
            verifier: Arc::new(TokenVerifier::new(&config()).expect("verifier")),
        };
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        let (mut parts, _) = builder.body(()).expect("request").into_parts();
        AuthUser::from_request_parts(&mut parts, &state).await
    }

    #[tokio::test]
    async fn accepts_valid_bearer_token() {
        let generator = TokenGenerator::new(&config()).expect("generator");
        let user_id = Id::generate();
        let token = generator.generate(&user_id).expect("sign");

        let AuthUser(extracted) = extract(Some(&format!("Bearer {}", token.token)))
            .await
            .expect("authorized");
        assert_eq!(extracted, user_id);
    }

    #[tokio::test]
    async fn rejects_missing_or_malformed_header() {
        assert!(matches!(extract(None).await, Err(ApiError::Unauthorized)));
        assert!(matches!(
            extract(Some("Basic dXNlcjpwYXNz")).await,
            Err(ApiError::Unauthorized)
        ));
        assert!(matches!(
            extract(Some("Bearer not-a-jwt")).await,
            Err(ApiError::Unauthorized)
        ));
    }
}
