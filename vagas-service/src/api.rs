use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, put},
    Router,
};
use shared::*;
use std::sync::Arc;
use tracing::{error, info, warn};
use crate::store::UnitStore;
use crate::ui;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UnitStore>,
}

#[derive(Debug)]
pub struct ApiError(SlotError);

impl From<SlotError> for ApiError {
    fn from(err: SlotError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // store failures stay server-side
        if self.0.is_internal() {
            let body = InternalErrorResponse {
                error: "internal server error".to_string(),
            };
            return (status, Json(body)).into_response();
        }

        let body = ErrorResponse {
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

fn log_failure(action: &str, id: Option<i32>, err: &SlotError) {
    if err.is_internal() {
        error!("Failed to {} (unit {:?}): {:#}", action, id, err);
    } else {
        warn!("Rejected {} (unit {:?}): {}", action, id, err);
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/unidades", get(list_units))
        .route("/api/unidades/:id/reservar", put(reserve))
        .route("/api/unidades/:id/confirmar", put(confirm))
        .route("/health", get(health_check))
        .merge(ui::routes())
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
}

pub async fn list_units(State(state): State<AppState>) -> Result<Json<Vec<Unit>>, ApiError> {
    match state.store.list_units().await {
        Ok(units) => Ok(Json(units)),
        Err(e) => {
            log_failure("list units", None, &e);
            Err(e.into())
        }
    }
}

pub async fn reserve(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    body: Result<Json<ReserveRequest>, JsonRejection>,
) -> Result<Json<MutationReply>, ApiError> {
    let id = path.ok().map(|Path(id)| id);
    let request = body.map(|Json(r)| r).unwrap_or_default();

    match apply_reserve(&state, id, &request).await {
        Ok(unidade) => {
            info!("Reservation accepted for unit {}", unidade.id);
            Ok(Json(MutationReply {
                message: "reservation completed successfully".to_string(),
                unidade,
            }))
        }
        Err(e) => {
            log_failure("reserve slots", id, &e);
            Err(e.into())
        }
    }
}

pub async fn confirm(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    body: Result<Json<ConfirmRequest>, JsonRejection>,
) -> Result<Json<MutationReply>, ApiError> {
    let id = path.ok().map(|Path(id)| id);
    let request = body.map(|Json(r)| r).unwrap_or_default();

    match apply_confirm(&state, id, &request).await {
        Ok(unidade) => {
            info!("Confirmation accepted for unit {}", unidade.id);
            Ok(Json(MutationReply {
                message: "reservation confirmed successfully".to_string(),
                unidade,
            }))
        }
        Err(e) => {
            log_failure("confirm slots", id, &e);
            Err(e.into())
        }
    }
}

// The quantity is validated before the unit is looked up. A path id that
// does not parse cannot name any unit, so it is reported as not found.
async fn apply_reserve(state: &AppState, id: Option<i32>, request: &ReserveRequest) -> Result<Unit, SlotError> {
    let qty = request.quantity()?;
    let id = id.ok_or(SlotError::NotFound)?;
    state.store.reserve(id, qty).await
}

async fn apply_confirm(state: &AppState, id: Option<i32>, request: &ConfirmRequest) -> Result<Unit, SlotError> {
    let qty = request.quantity()?;
    let id = id.ok_or(SlotError::NotFound)?;
    state.store.confirm(id, qty).await
}

pub async fn health_check() -> &'static str {
    "OK"
}
