use chrono::{DateTime, Utc};
use skylane_core::{BookingStore, Datastore, Error, FleetStore, FlightStore};
use skylane_shared::{BookingStatus, FlightStatus};
use tracing::debug;

/// Maintenance pass deriving flight and booking statuses from wall-clock
/// time and seat occupancy. Idempotent: a second run over unchanged state
/// writes nothing. Invoked as a precondition of scheduling and booking
/// operations, and periodically by the API worker.
///
/// The three steps run in strict order; each commits before the next one
/// reads.
pub async fn reconcile(store: &dyn Datastore, now: DateTime<Utc>) -> Result<(), Error> {
    // 1. Departed flights are performed.
    for flight in store
        .flights_with_status(&[FlightStatus::Active, FlightStatus::Full])
        .await?
    {
        if flight.departure <= now {
            let next = flight.status.transition_to(FlightStatus::Performed)?;
            store.set_flight_status(flight.id, next).await?;
            debug!(flight_id = flight.id, "flight performed");
        }
    }

    // 2. Bookings follow their performed flight.
    for reference in store.active_bookings_on_performed_flights().await? {
        if let Some(booking) = store.booking(&reference).await? {
            let next = booking.status.transition_to(BookingStatus::Performed)?;
            store
                .update_booking(&reference, next, booking.total_price_cents)
                .await?;
            debug!(reference = %reference, "booking performed");
        }
    }

    // 3. Occupancy decides Active vs Full for the remaining flights.
    // A zero-seat aircraft is vacuously full (occupied >= total with
    // total = 0); defined behavior, not an error.
    for flight in store
        .flights_with_status(&[FlightStatus::Active, FlightStatus::Full])
        .await?
    {
        let total = store.seat_count(&flight.tail_number).await?;
        let occupied = store.occupied_seat_count(flight.id).await?;
        let derived = if occupied >= total {
            FlightStatus::Full
        } else {
            FlightStatus::Active
        };
        if derived != flight.status {
            let next = flight.status.transition_to(derived)?;
            store.set_flight_status(flight.id, next).await?;
            debug!(flight_id = flight.id, status = derived.as_str(), "occupancy status updated");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::*;
    use skylane_core::NewBooking;
    use skylane_shared::SeatRef;
    use skylane_store::MemoryStore;

    async fn book_seats(store: &MemoryStore, reference: &str, flight_id: i64, rows: &[i32]) {
        let seats: Vec<SeatRef> = rows
            .iter()
            .map(|row| SeatRef {
                row: *row,
                column: "A".to_string(),
            })
            .collect();
        let booking = NewBooking {
            reference: reference.to_string(),
            customer_email: "dana@example.com".to_string(),
            flight_id,
            total_price_cents: 50_000 * rows.len() as i32,
        };
        store.insert_booking(&booking, &seats).await.unwrap();
    }

    #[tokio::test]
    async fn test_departed_flights_and_their_bookings_become_performed() {
        let store = MemoryStore::new();
        let route = seed_route(&store, "TLV", "ATH", 110).await;
        seed_small_aircraft(&store, "4X-SML").await;
        let flight_id = seed_flight(&store, route.id, "4X-SML", dt(2025, 6, 1, 8, 0)).await;
        book_seats(&store, "AB12CD34", flight_id, &[1]).await;

        reconcile(&store, dt(2025, 6, 1, 8, 0)).await.unwrap();

        let flight = store.flight(flight_id).await.unwrap().unwrap();
        assert_eq!(flight.status, FlightStatus::Performed);

        let booking = store.booking("AB12CD34").await.unwrap().unwrap();
        assert_eq!(booking.status, BookingStatus::Performed);
        // The charge survives the transition.
        assert_eq!(booking.total_price_cents, 50_000);
    }

    #[tokio::test]
    async fn test_future_flights_are_untouched() {
        let store = MemoryStore::new();
        let route = seed_route(&store, "TLV", "ATH", 110).await;
        seed_small_aircraft(&store, "4X-SML").await;
        let flight_id = seed_flight(&store, route.id, "4X-SML", dt(2025, 6, 1, 8, 0)).await;

        reconcile(&store, dt(2025, 6, 1, 7, 59)).await.unwrap();

        let flight = store.flight(flight_id).await.unwrap().unwrap();
        assert_eq!(flight.status, FlightStatus::Active);
    }

    #[tokio::test]
    async fn test_occupancy_flips_full_and_back() {
        let store = MemoryStore::new();
        let route = seed_route(&store, "TLV", "ATH", 110).await;
        // 4 economy seats.
        seed_small_aircraft(&store, "4X-SML").await;
        let flight_id = seed_flight(&store, route.id, "4X-SML", dt(2025, 7, 1, 8, 0)).await;
        book_seats(&store, "AAAA1111", flight_id, &[1, 2, 3, 4]).await;

        let now = dt(2025, 6, 1, 12, 0);
        reconcile(&store, now).await.unwrap();
        let flight = store.flight(flight_id).await.unwrap().unwrap();
        assert_eq!(flight.status, FlightStatus::Full);

        // Cancelling the booking frees the seats; the next pass reopens
        // the flight.
        store
            .update_booking("AAAA1111", BookingStatus::CancelledByCustomer, 10_000)
            .await
            .unwrap();
        store.release_seats("AAAA1111").await.unwrap();

        reconcile(&store, now).await.unwrap();
        let flight = store.flight(flight_id).await.unwrap().unwrap();
        assert_eq!(flight.status, FlightStatus::Active);
    }

    #[tokio::test]
    async fn test_reconcile_is_idempotent() {
        let store = MemoryStore::new();
        let route = seed_route(&store, "TLV", "ATH", 110).await;
        seed_small_aircraft(&store, "4X-SML").await;
        let past = seed_flight(&store, route.id, "4X-SML", dt(2025, 6, 1, 8, 0)).await;
        let future = seed_flight(&store, route.id, "4X-SML", dt(2025, 8, 1, 8, 0)).await;
        book_seats(&store, "BB22CC33", past, &[1]).await;

        let now = dt(2025, 6, 2, 0, 0);
        reconcile(&store, now).await.unwrap();

        let snapshot = (
            store.flight(past).await.unwrap().unwrap().status,
            store.flight(future).await.unwrap().unwrap().status,
            store.booking("BB22CC33").await.unwrap().unwrap().status,
        );

        reconcile(&store, now).await.unwrap();

        assert_eq!(snapshot.0, store.flight(past).await.unwrap().unwrap().status);
        assert_eq!(snapshot.1, store.flight(future).await.unwrap().unwrap().status);
        assert_eq!(
            snapshot.2,
            store.booking("BB22CC33").await.unwrap().unwrap().status
        );
    }

    #[tokio::test]
    async fn test_terminal_flights_are_never_touched() {
        let store = MemoryStore::new();
        let route = seed_route(&store, "TLV", "ATH", 110).await;
        seed_small_aircraft(&store, "4X-SML").await;
        let flight_id = seed_flight(&store, route.id, "4X-SML", dt(2025, 6, 1, 8, 0)).await;
        cancel_flight_row(&store, flight_id).await;

        reconcile(&store, dt(2025, 6, 2, 0, 0)).await.unwrap();

        let flight = store.flight(flight_id).await.unwrap().unwrap();
        assert_eq!(flight.status, FlightStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_zero_seat_aircraft_is_vacuously_full() {
        let store = MemoryStore::new();
        let route = seed_route(&store, "TLV", "ATH", 110).await;
        seed_aircraft(&store, "4X-NIL", skylane_shared::AircraftSize::Small, 0).await;
        let flight_id = seed_flight(&store, route.id, "4X-NIL", dt(2025, 7, 1, 8, 0)).await;

        reconcile(&store, dt(2025, 6, 1, 0, 0)).await.unwrap();

        let flight = store.flight(flight_id).await.unwrap().unwrap();
        assert_eq!(flight.status, FlightStatus::Full);
    }
}
