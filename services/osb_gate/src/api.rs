use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::outcome::{self, Outcome};
use crate::AppState;

pub async fn catalog(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.broker.catalog()))
}

pub async fn provision(
    State(state): State<AppState>,
    Path(instance_id): Path<String>,
) -> Outcome {
    let result = state.broker.provision(&instance_id);
    state.emit(outcome::provision(&instance_id, result))
}

pub async fn deprovision(
    State(state): State<AppState>,
    Path(instance_id): Path<String>,
) -> Outcome {
    let result = state.broker.deprovision(&instance_id);
    state.emit(outcome::deprovision(&instance_id, result))
}

pub async fn bind(
    State(state): State<AppState>,
    Path((instance_id, binding_id)): Path<(String, String)>,
) -> Outcome {
    let result = state.broker.bind(&instance_id, &binding_id);
    state.emit(outcome::bind(&instance_id, result))
}

pub async fn unbind(
    State(state): State<AppState>,
    Path((instance_id, binding_id)): Path<(String, String)>,
) -> Outcome {
    let result = state.broker.unbind(&instance_id, &binding_id);
    state.emit(outcome::unbind(&instance_id, &binding_id, result))
}
