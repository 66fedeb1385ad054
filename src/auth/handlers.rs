use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{LoginRequest, MessageResponse, PublicUser, RegisterRequest},
        services,
    },
    error::AppResult,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/users", get(list_users))
        .route("/auth/edit/:id", put(edit_user))
        .route("/auth/delete/:id", delete(delete_user))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Json(payload) = payload?;
    services::register_user(state.users.as_ref(), payload).await?;
    Ok(Json(MessageResponse::new("Usuário cadastrado com sucesso!")))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Json(payload) = payload?;
    let user = services::authenticate_user(state.users.as_ref(), payload).await?;
    Ok(Json(MessageResponse::new(format!(
        "Bem-vindo {}!",
        user.full_name
    ))))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<PublicUser>>> {
    let users = services::list_users(state.users.as_ref()).await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

#[instrument(skip(state, payload))]
pub async fn edit_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Json(payload) = payload?;
    services::edit_user(state.users.as_ref(), id, payload).await?;
    Ok(Json(MessageResponse::new("Usuário atualizado!")))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<MessageResponse>> {
    services::delete_user(state.users.as_ref(), id).await?;
    Ok(Json(MessageResponse::new("Usuário deletado.")))
}
