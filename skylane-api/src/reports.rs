use axum::{extract::State, middleware, routing::get, Json, Router};
use chrono::Utc;
use serde_json::json;
use skylane_core::gateway::{CabinRevenue, MonthlyCancellationRate};
use skylane_core::ReportStore;
use skylane_scheduling::reconcile;

use crate::error::AppError;
use crate::middleware::auth::manager_auth_middleware;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/cancellations", get(cancellations))
        .route("/occupancy", get(occupancy))
        .route("/revenue", get(revenue))
        .route_layer(middleware::from_fn_with_state(
            state,
            manager_auth_middleware,
        ))
}

async fn cancellations(
    State(state): State<AppState>,
) -> Result<Json<Vec<MonthlyCancellationRate>>, AppError> {
    reconcile(state.store.as_ref(), Utc::now()).await?;
    Ok(Json(state.store.monthly_cancellation_rates().await?))
}

async fn occupancy(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    reconcile(state.store.as_ref(), Utc::now()).await?;
    let average = state.store.average_occupancy_pct().await?;
    Ok(Json(json!({ "average_occupancy_pct": average })))
}

async fn revenue(State(state): State<AppState>) -> Result<Json<Vec<CabinRevenue>>, AppError> {
    reconcile(state.store.as_ref(), Utc::now()).await?;
    Ok(Json(state.store.revenue_by_cabin().await?))
}
