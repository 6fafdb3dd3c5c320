use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::extractors::AuthUser,
    error::ApiError,
    state::AppState,
    users::{
        dto::{
            CreateUserRequest, ListParams, TokenRequest, TokenResponse, UserListResponse,
            UserResponse,
        },
        services::CreateUser,
    },
    values::Id,
};

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/token", post(token))
}

pub fn private_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create).get(list))
        .route("/users/deleted", get(list_deleted))
        .route("/users/:id", get(get_by_id).delete(delete))
        .route("/users/:id/restore", patch(restore))
}

#[instrument(skip(state, payload))]
pub async fn token(
    State(state): State<AppState>,
    Json(payload): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let (email, password) = payload.into_credentials()?;
    let token = state.users.access_token(&email, &password).await?;
    Ok(Json(TokenResponse::from(token)))
}

#[instrument(skip(state, payload))]
pub async fn create(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let req = CreateUser::try_from(payload)?;
    let user = state.users.create(req).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

#[instrument(skip(state))]
pub async fn get_by_id(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let id = Id::parse(&id)?;
    let user = state.users.get_by_id(&id).await?;
    Ok(Json(UserResponse::from(&user)))
}

async fn list_users(
    state: &AppState,
    params: ListParams,
    deleted: bool,
) -> Result<Json<UserListResponse>, ApiError> {
    let query = params.into_query(deleted);
    let page = state.users.get_all(&query).await?;
    Ok(Json(UserListResponse {
        data: page.users.iter().map(UserResponse::from).collect(),
        total: page.total,
        page: query.pagination.page(),
        size: query.pagination.size(),
    }))
}

#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Query(params): Query<ListParams>,
) -> Result<Json<UserListResponse>, ApiError> {
    list_users(&state, params, false).await
}

#[instrument(skip(state))]
pub async fn list_deleted(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Query(params): Query<ListParams>,
) -> Result<Json<UserListResponse>, ApiError> {
    list_users(&state, params, true).await
}

#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = Id::parse(&id)?;
    state.users.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn restore(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = Id::parse(&id)?;
    state.users.restore(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
