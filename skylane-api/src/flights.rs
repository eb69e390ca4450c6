use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use skylane_core::{BookingStore, FleetStore, FlightFilter, FlightStore, FlightSummary, RouteStore};
use skylane_scheduling::{reconcile, CrewCandidates, EligibilityResolver, FlightPlan, FlightPlanner};
use skylane_shared::{Aircraft, CrewMember, FlightStatus, Seat, SeatRef};

use crate::error::AppError;
use crate::middleware::auth::{bearer_claims, manager_auth_middleware, ROLE_MANAGER};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct FlightQuery {
    origin: Option<String>,
    destination: Option<String>,
    date: Option<NaiveDate>,
    /// Honored only for managers; customers always get the bookable view.
    status: Option<FlightStatus>,
}

#[derive(Debug, Deserialize)]
struct EligibilityRequest {
    route_id: i64,
    departure: DateTime<Utc>,
    /// When set, crew candidates for that aircraft are resolved as well.
    tail_number: Option<String>,
}

#[derive(Debug, Serialize)]
struct EligibilityResponse {
    aircraft: Vec<Aircraft>,
    crew: Option<CrewView>,
    warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
struct CrewView {
    pilots: Vec<CrewMember>,
    attendants: Vec<CrewMember>,
    required_pilots: usize,
    required_attendants: usize,
}

#[derive(Debug, Serialize)]
struct SeatView {
    row: i32,
    column: String,
    class: skylane_shared::SeatClass,
    reserved: bool,
}

#[derive(Debug, Serialize)]
struct FlightView {
    id: i64,
    origin: String,
    destination: String,
    duration_minutes: i32,
    tail_number: String,
    manufacturer: String,
    departure: DateTime<Utc>,
    effective_arrival: DateTime<Utc>,
    status: FlightStatus,
    economy_price_cents: i32,
    business_price_cents: i32,
    seats: Vec<SeatView>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    let manager_only = Router::new()
        .route("/", post(create_flight))
        .route("/eligibility", post(eligibility))
        .route("/{id}", delete(cancel_flight))
        .route_layer(middleware::from_fn_with_state(
            state,
            manager_auth_middleware,
        ));

    Router::new()
        .route("/", get(search))
        .route("/{id}", get(flight_detail))
        .merge(manager_only)
}

async fn search(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<FlightQuery>,
) -> Result<Json<Vec<FlightSummary>>, AppError> {
    let now = Utc::now();
    reconcile(state.store.as_ref(), now).await?;

    let is_manager = bearer_claims(&state, &headers)
        .map(|c| c.role == ROLE_MANAGER)
        .unwrap_or(false);

    let mut filter = if is_manager {
        FlightFilter::default()
    } else {
        FlightFilter::bookable()
    };
    filter.origin = query.origin;
    filter.destination = query.destination;
    filter.departs_on = query.date;
    if is_manager {
        filter.status = query.status;
    }

    let flights = state.store.search_flights(&filter, now).await?;
    Ok(Json(flights))
}

async fn flight_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<FlightView>, AppError> {
    let now = Utc::now();
    reconcile(state.store.as_ref(), now).await?;

    let details = state
        .store
        .flight_details(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("flight {id}")))?;

    let seat_map: Vec<Seat> = state.store.seat_map(&details.aircraft.tail_number).await?;
    let reserved: Vec<SeatRef> = state.store.reserved_seats_for_flight(id).await?;

    let seats = seat_map
        .into_iter()
        .map(|seat| {
            let reserved = reserved
                .iter()
                .any(|r| r.row == seat.row && r.column == seat.column);
            SeatView {
                row: seat.row,
                column: seat.column,
                class: seat.class,
                reserved,
            }
        })
        .collect();

    Ok(Json(FlightView {
        id: details.flight.id,
        origin: details.route.origin.clone(),
        destination: details.route.destination.clone(),
        duration_minutes: details.route.duration_minutes,
        tail_number: details.aircraft.tail_number.clone(),
        manufacturer: details.aircraft.manufacturer.clone(),
        departure: details.flight.departure,
        effective_arrival: details.effective_arrival(),
        status: details.flight.status,
        economy_price_cents: details.flight.economy_price_cents,
        business_price_cents: details.flight.business_price_cents,
        seats,
    }))
}

/// Candidate preview for the flight-creation flow. These lists are advisory;
/// creation re-validates everything server-side regardless.
async fn eligibility(
    State(state): State<AppState>,
    Json(body): Json<EligibilityRequest>,
) -> Result<Json<EligibilityResponse>, AppError> {
    let now = Utc::now();
    reconcile(state.store.as_ref(), now).await?;

    let route = state
        .store
        .route(body.route_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("route {}", body.route_id)))?;

    let resolver = EligibilityResolver::new(state.store.as_ref());
    let aircraft = resolver.assignable_aircraft(&route, body.departure).await?;

    let mut warnings = Vec::new();
    if aircraft.is_empty() {
        warnings.push("no aircraft is available for the selected departure".to_string());
    }

    let crew = match &body.tail_number {
        Some(tail_number) => {
            let chosen = state
                .store
                .aircraft(tail_number)
                .await?
                .ok_or_else(|| AppError::NotFoundError(format!("aircraft {tail_number}")))?;
            let candidates: CrewCandidates = resolver
                .assignable_crew(&route, body.departure, &chosen)
                .await?;
            if candidates.has_shortfall() {
                warnings.push("not enough crew is available for the selected flight".to_string());
            }
            Some(CrewView {
                required_pilots: candidates.required.pilots,
                required_attendants: candidates.required.attendants,
                pilots: candidates.pilots,
                attendants: candidates.attendants,
            })
        }
        None => None,
    };

    Ok(Json(EligibilityResponse {
        aircraft,
        crew,
        warnings,
    }))
}

async fn create_flight(
    State(state): State<AppState>,
    Json(plan): Json<FlightPlan>,
) -> Result<Json<serde_json::Value>, AppError> {
    let now = Utc::now();
    reconcile(state.store.as_ref(), now).await?;

    let planner = FlightPlanner::new(state.store.as_ref());
    let flight_id = planner.create_flight(&plan, now).await?;
    Ok(Json(serde_json::json!({ "flight_id": flight_id })))
}

async fn cancel_flight(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let now = Utc::now();
    reconcile(state.store.as_ref(), now).await?;

    skylane_booking::cancel_flight(state.store.as_ref(), id, now).await?;
    Ok(Json(serde_json::json!({ "flight_id": id, "status": "CANCELLED" })))
}
