use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{LoginRequest, LoginResult, PublicUser, RegisterRequest, UpdateRequest},
        extractors::{AuthUser, JsonBody},
        services::AuthError,
    },
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/register", post(register))
        .route("/users/login", post(login))
        .route("/users/update", put(update))
        .route("/users/all", get(list_users))
        .route("/users/:id", get(get_user))
        .route("/users/name/:name", get(search_users))
}

#[instrument(skip(state, payload), fields(identifier = %payload.identifier))]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<PublicUser>), AuthError> {
    payload.validate()?;
    let user = state.auth.register(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state, payload), fields(identifier = %payload.identifier))]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Json<LoginResult>, AuthError> {
    payload.validate()?;
    let result = state
        .auth
        .authenticate(&payload.identifier, &payload.password)
        .await?;
    Ok(Json(result))
}

#[instrument(
    skip(state, caller, payload),
    fields(caller = %caller.identifier, user_id = payload.id)
)]
pub async fn update(
    State(state): State<AppState>,
    caller: AuthUser,
    JsonBody(payload): JsonBody<UpdateRequest>,
) -> Result<Json<PublicUser>, AuthError> {
    payload.validate()?;
    let user = state.auth.update(payload.into()).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser { id: caller, .. }: AuthUser,
) -> Result<Json<Vec<PublicUser>>, AuthError> {
    let users = state.auth.list_users().await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser { id: caller, .. }: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<PublicUser>, AuthError> {
    let user = state.auth.find_user(id).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state))]
pub async fn search_users(
    State(state): State<AppState>,
    AuthUser { id: caller, .. }: AuthUser,
    Path(name): Path<String>,
) -> Result<Json<Vec<PublicUser>>, AuthError> {
    let users = state.auth.search_users(&name).await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}
