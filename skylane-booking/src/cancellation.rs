use chrono::{DateTime, Duration, Utc};
use skylane_core::{BookingStore, Datastore, Error, FlightStore};
use skylane_shared::{Booking, BookingStatus, FlightStatus};
use tracing::info;

use crate::{CANCELLATION_FEE_PCT, CUSTOMER_CANCEL_WINDOW_HOURS, FLIGHT_CANCEL_WINDOW_HOURS};

/// Customer-initiated cancellation. Allowed only while departure is at
/// least 36 hours away; frees every reserved seat and replaces the charge
/// with the 5% fee.
pub async fn cancel_booking(
    store: &dyn Datastore,
    reference: &str,
    now: DateTime<Utc>,
) -> Result<Booking, Error> {
    let booking = store
        .booking(reference)
        .await?
        .ok_or_else(|| Error::not_found(format!("booking {reference}")))?;
    if booking.status != BookingStatus::Active {
        return Err(Error::validation("only active bookings can be cancelled"));
    }

    let details = store
        .flight_details(booking.flight_id)
        .await?
        .ok_or_else(|| Error::not_found(format!("flight {}", booking.flight_id)))?;
    if details.flight.departure - now < Duration::hours(CUSTOMER_CANCEL_WINDOW_HOURS) {
        return Err(Error::PolicyWindow {
            action: "booking cancellation",
            window_hours: CUSTOMER_CANCEL_WINDOW_HOURS,
        });
    }

    // The fee becomes the new charge, not an additional one.
    let fee_cents = booking.total_price_cents * CANCELLATION_FEE_PCT / 100;
    let next = booking.status.transition_to(BookingStatus::CancelledByCustomer)?;

    store.release_seats(reference).await?;
    store.update_booking(reference, next, fee_cents).await?;

    info!(reference = %reference, fee_cents, "booking cancelled by customer");

    store
        .booking(reference)
        .await?
        .ok_or_else(|| Error::not_found(format!("booking {reference}")))
}

/// Manager-initiated flight cancellation. Allowed only while departure is
/// at least 72 hours away; cancels the flight, moves every active booking
/// to CancelledBySystem at zero charge and frees their seats.
pub async fn cancel_flight(
    store: &dyn Datastore,
    flight_id: i64,
    now: DateTime<Utc>,
) -> Result<(), Error> {
    let details = store
        .flight_details(flight_id)
        .await?
        .ok_or_else(|| Error::not_found(format!("flight {flight_id}")))?;

    if details.flight.status.is_terminal() {
        return Err(Error::validation("flight is already performed or cancelled"));
    }
    if details.flight.departure - now < Duration::hours(FLIGHT_CANCEL_WINDOW_HOURS) {
        return Err(Error::PolicyWindow {
            action: "flight cancellation",
            window_hours: FLIGHT_CANCEL_WINDOW_HOURS,
        });
    }

    let next = details.flight.status.transition_to(FlightStatus::Cancelled)?;
    store.set_flight_status(flight_id, next).await?;

    let bookings = store
        .bookings_for_flight(flight_id, Some(BookingStatus::Active))
        .await?;
    let affected = bookings.len();
    for booking in bookings {
        let next = booking.status.transition_to(BookingStatus::CancelledBySystem)?;
        store.update_booking(&booking.reference, next, 0).await?;
        store.release_seats(&booking.reference).await?;
    }

    info!(flight_id, affected, "flight cancelled");
    Ok(())
}
