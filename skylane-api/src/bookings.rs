use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use skylane_booking::{cancel_booking, Checkout, CheckoutRequest, ContactDetails};
use skylane_core::BookingStore;
use skylane_scheduling::reconcile;
use skylane_shared::{Booking, BookingStatus, SeatRef};

use crate::error::AppError;
use crate::middleware::auth::{bearer_claims, Claims, ROLE_CUSTOMER};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct CreateBookingRequest {
    flight_id: i64,
    seats: Vec<SeatRef>,
    /// Required for guests; ignored when a customer token is presented.
    email: Option<String>,
    contact: Option<ContactDetails>,
}

#[derive(Debug, Deserialize)]
struct LookupRequest {
    reference: String,
    email: String,
}

#[derive(Debug, Deserialize)]
struct BookingQuery {
    status: Option<BookingStatus>,
}

#[derive(Debug, Deserialize)]
struct CancelQuery {
    /// Guest identification; token holders are matched by their claims.
    email: Option<String>,
}

#[derive(Debug, Serialize)]
struct BookingView {
    reference: String,
    customer_email: String,
    flight_id: i64,
    total_price_cents: i32,
    status: BookingStatus,
    seats: Vec<SeatRef>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_booking))
        .route("/", get(my_bookings))
        .route("/lookup", post(lookup))
        .route("/{reference}", delete(cancel))
}

async fn create_booking(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateBookingRequest>,
) -> Result<Json<BookingView>, AppError> {
    let now = Utc::now();
    reconcile(state.store.as_ref(), now).await?;

    let claims = bearer_claims(&state, &headers);
    let customer_email = match claims {
        Some(ref c) if c.role == ROLE_CUSTOMER => c.sub.clone(),
        _ => body.email.clone().ok_or_else(|| {
            AppError::ValidationError("email is required for guest bookings".to_string())
        })?,
    };

    let request = CheckoutRequest {
        flight_id: body.flight_id,
        customer_email,
        contact: body.contact,
        seats: body.seats,
    };
    let checkout = Checkout::new(state.store.as_ref());
    let booking = checkout.confirm(&request, now).await?;

    view(&state, booking).await
}

async fn my_bookings(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<BookingQuery>,
) -> Result<Json<Vec<BookingView>>, AppError> {
    let now = Utc::now();
    reconcile(state.store.as_ref(), now).await?;

    let claims = require_customer(&state, &headers)?;
    let bookings = state
        .store
        .bookings_for_customer(&claims.sub, query.status)
        .await?;

    let mut views = Vec::with_capacity(bookings.len());
    for booking in bookings {
        let seats = state.store.seats_for_booking(&booking.reference).await?;
        views.push(BookingView {
            reference: booking.reference,
            customer_email: booking.customer_email,
            flight_id: booking.flight_id,
            total_price_cents: booking.total_price_cents,
            status: booking.status,
            seats,
        });
    }
    Ok(Json(views))
}

/// Guest access to an active booking by reference + email, mirroring the
/// identified customer's booking list.
async fn lookup(
    State(state): State<AppState>,
    Json(body): Json<LookupRequest>,
) -> Result<Json<BookingView>, AppError> {
    let now = Utc::now();
    reconcile(state.store.as_ref(), now).await?;

    let booking = state
        .store
        .booking(&body.reference)
        .await?
        .filter(|b| b.customer_email == body.email && b.status == BookingStatus::Active)
        .ok_or_else(|| AppError::NotFoundError("no matching active booking".to_string()))?;

    view(&state, booking).await
}

async fn cancel(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(reference): Path<String>,
    Query(query): Query<CancelQuery>,
) -> Result<Json<BookingView>, AppError> {
    let now = Utc::now();
    reconcile(state.store.as_ref(), now).await?;

    let booking = state
        .store
        .booking(&reference)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("booking {reference}")))?;

    // Owners only: a customer token whose subject matches, or a guest who
    // supplied the booking's email.
    let claims = bearer_claims(&state, &headers);
    let owner = match claims {
        Some(ref c) if c.role == ROLE_CUSTOMER => c.sub == booking.customer_email,
        _ => query
            .email
            .as_deref()
            .map(|email| email == booking.customer_email)
            .unwrap_or(false),
    };
    if !owner {
        return Err(AppError::AuthorizationError(
            "only the booking owner may cancel".to_string(),
        ));
    }

    let cancelled = cancel_booking(state.store.as_ref(), &reference, now).await?;
    view(&state, cancelled).await
}

fn require_customer(state: &AppState, headers: &HeaderMap) -> Result<Claims, AppError> {
    bearer_claims(state, headers)
        .filter(|c| c.role == ROLE_CUSTOMER)
        .ok_or_else(|| AppError::AuthenticationError("customer login required".to_string()))
}

async fn view(state: &AppState, booking: Booking) -> Result<Json<BookingView>, AppError> {
    let seats = state.store.seats_for_booking(&booking.reference).await?;
    Ok(Json(BookingView {
        reference: booking.reference,
        customer_email: booking.customer_email,
        flight_id: booking.flight_id,
        total_price_cents: booking.total_price_cents,
        status: booking.status,
        seats,
    }))
}
