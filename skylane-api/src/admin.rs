//! Manager-only reference-data administration: routes, fleet and crew.

use axum::{
    extract::{Query, State},
    middleware,
    routing::post,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use skylane_catalog::{validate_route, SeatLayoutSpec};
use skylane_core::{CrewStore, FleetStore, RouteStore};
use skylane_shared::{Aircraft, AircraftSize, CrewMember, CrewRole, Route};

use crate::error::AppError;
use crate::middleware::auth::manager_auth_middleware;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct CreateRouteRequest {
    origin: String,
    destination: String,
    duration_minutes: i32,
}

#[derive(Debug, Deserialize)]
struct RegisterAircraftRequest {
    tail_number: String,
    size: AircraftSize,
    manufacturer: String,
    purchased_on: NaiveDate,
    layout: SeatLayoutSpec,
}

#[derive(Debug, Deserialize)]
struct RegisterCrewRequest {
    employee_id: String,
    role: CrewRole,
    first_name: String,
    last_name: String,
    #[serde(default)]
    long_haul_qualified: bool,
    hired_on: NaiveDate,
}

#[derive(Debug, Deserialize)]
struct CrewQuery {
    role: CrewRole,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/routes", post(create_route).get(list_routes))
        .route("/fleet", post(register_aircraft).get(list_fleet))
        .route("/crew", post(register_crew).get(list_crew))
        .route_layer(middleware::from_fn_with_state(
            state,
            manager_auth_middleware,
        ))
}

async fn create_route(
    State(state): State<AppState>,
    Json(body): Json<CreateRouteRequest>,
) -> Result<Json<Route>, AppError> {
    validate_route(&body.origin, &body.destination, body.duration_minutes)?;
    let id = state
        .store
        .insert_route(&body.origin, &body.destination, body.duration_minutes)
        .await?;
    Ok(Json(Route {
        id,
        origin: body.origin,
        destination: body.destination,
        duration_minutes: body.duration_minutes,
    }))
}

async fn list_routes(State(state): State<AppState>) -> Result<Json<Vec<Route>>, AppError> {
    Ok(Json(state.store.list_routes().await?))
}

async fn register_aircraft(
    State(state): State<AppState>,
    Json(body): Json<RegisterAircraftRequest>,
) -> Result<Json<Aircraft>, AppError> {
    if body.tail_number.is_empty() {
        return Err(AppError::ValidationError(
            "tail number is required".to_string(),
        ));
    }
    let seats = body.layout.build(body.size)?;
    let aircraft = Aircraft {
        tail_number: body.tail_number,
        size: body.size,
        manufacturer: body.manufacturer,
        purchased_on: body.purchased_on,
    };
    state.store.insert_aircraft(&aircraft, &seats).await?;
    tracing::info!(tail_number = %aircraft.tail_number, seats = seats.len(), "aircraft registered");
    Ok(Json(aircraft))
}

async fn list_fleet(State(state): State<AppState>) -> Result<Json<Vec<Aircraft>>, AppError> {
    Ok(Json(state.store.list_aircraft().await?))
}

async fn register_crew(
    State(state): State<AppState>,
    Json(body): Json<RegisterCrewRequest>,
) -> Result<Json<CrewMember>, AppError> {
    if body.employee_id.is_empty() || body.first_name.is_empty() || body.last_name.is_empty() {
        return Err(AppError::ValidationError(
            "employee id and full name are required".to_string(),
        ));
    }
    let member = CrewMember {
        employee_id: body.employee_id,
        role: body.role,
        first_name: body.first_name,
        last_name: body.last_name,
        long_haul_qualified: body.long_haul_qualified,
        hired_on: body.hired_on,
    };
    state.store.insert_crew_member(&member).await?;
    Ok(Json(member))
}

async fn list_crew(
    State(state): State<AppState>,
    Query(query): Query<CrewQuery>,
) -> Result<Json<Vec<CrewMember>>, AppError> {
    Ok(Json(state.store.list_crew(query.role, false).await?))
}
