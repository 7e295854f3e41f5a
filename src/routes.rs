use std::sync::Arc;

use axum::{
    Json,
    extract::{FromRequest, Request, State},
};
use serde::de::DeserializeOwned;

use crate::{
    error::AppError,
    gateway::{Ack, Eixo1Payload},
    state,
};

/// `Json` with the crate's error surface: a body that cannot be parsed is
/// answered like any other unexpected failure, a generic JSON `{error}`
/// instead of axum's plain-text rejection.
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;

        Ok(Self(value))
    }
}

pub async fn eixo1_handler(
    State(state): State<Arc<state::State>>,
    AppJson(payload): AppJson<Eixo1Payload>,
) -> Result<Json<Ack>, AppError> {
    let ack = state.gateway.submit(&payload).await?;

    Ok(Json(ack))
}
