use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use skylane_core::{
    BookingStore, CustomerStore, Datastore, Error, FleetStore, FlightStore, NewBooking, StoreError,
};
use skylane_shared::{Booking, Seat, SeatRef};
use tracing::{info, warn};

use crate::pricing::price_seats;
use crate::reference::new_booking_reference;

/// How many fresh references to try when one collides before giving up.
const REFERENCE_ATTEMPTS: u32 = 3;

/// Name details for a customer the system has not seen before. Registered
/// customers already have a base record and omit this.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactDetails {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub flight_id: i64,
    pub customer_email: String,
    pub contact: Option<ContactDetails>,
    pub seats: Vec<SeatRef>,
}

/// Seat reservation at checkout: price the selection, claim the seats and
/// create the booking as one unit of work.
pub struct Checkout<'a> {
    store: &'a dyn Datastore,
}

impl<'a> Checkout<'a> {
    pub fn new(store: &'a dyn Datastore) -> Self {
        Self { store }
    }

    pub async fn confirm(
        &self,
        request: &CheckoutRequest,
        now: DateTime<Utc>,
    ) -> Result<Booking, Error> {
        if request.seats.is_empty() {
            return Err(Error::validation("select at least one seat"));
        }
        if request.customer_email.is_empty() {
            return Err(Error::validation("email is required"));
        }

        let details = self
            .store
            .flight_details(request.flight_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("flight {}", request.flight_id)))?;
        if !details.flight.is_bookable(now) {
            return Err(Error::validation("flight is not open for booking"));
        }

        let seat_map = self.store.seat_map(&details.aircraft.tail_number).await?;
        let selected = resolve_selection(&seat_map, &request.seats)?;

        // Advisory check for a friendly error; the datastore's uniqueness
        // guarantee is what actually closes the race.
        let taken: HashSet<SeatRef> = self
            .store
            .reserved_seats_for_flight(request.flight_id)
            .await?
            .into_iter()
            .collect();
        if let Some(seat) = request.seats.iter().find(|s| taken.contains(s)) {
            return Err(Error::Conflict(format!(
                "seat {} is already reserved",
                seat.label()
            )));
        }

        let total_price_cents = price_seats(&details.flight, &selected);

        match &request.contact {
            Some(contact) => {
                if contact.first_name.is_empty() || contact.last_name.is_empty() {
                    return Err(Error::validation("first and last name are required"));
                }
                self.store
                    .upsert_customer(
                        &request.customer_email,
                        &contact.first_name,
                        &contact.last_name,
                    )
                    .await?;
            }
            None => {
                if self.store.customer(&request.customer_email).await?.is_none() {
                    return Err(Error::validation(
                        "contact details are required for new customers",
                    ));
                }
            }
        }

        // References are drawn from a 36^8 space, so a collision is almost
        // certainly a lost race with ourselves; retry a couple of times
        // before reporting the conflict.
        let mut attempt = 0;
        let reference = loop {
            attempt += 1;
            let reference = new_booking_reference();
            let booking = NewBooking {
                reference: reference.clone(),
                customer_email: request.customer_email.clone(),
                flight_id: request.flight_id,
                total_price_cents,
            };
            match self.store.insert_booking(&booking, &request.seats).await {
                Ok(()) => break reference,
                Err(StoreError::Conflict(msg)) if attempt < REFERENCE_ATTEMPTS => {
                    // Could be a reference collision or a seat race; a new
                    // reference settles the former, the advisory check
                    // above already vouched for the latter.
                    warn!(attempt, %msg, "booking insert conflict, retrying");
                }
                Err(StoreError::Conflict(msg)) => {
                    return Err(Error::Conflict(msg));
                }
                Err(err) => return Err(err.into()),
            }
        };

        info!(
            reference = %reference,
            flight_id = request.flight_id,
            seats = request.seats.len(),
            total_price_cents,
            "booking confirmed"
        );
        self.store
            .booking(&reference)
            .await?
            .ok_or_else(|| Error::not_found(format!("booking {reference}")))
    }
}

/// Maps each selected position onto the aircraft's seat map, rejecting
/// positions the aircraft does not have and duplicate selections.
fn resolve_selection<'s>(
    seat_map: &'s [Seat],
    selection: &[SeatRef],
) -> Result<Vec<&'s Seat>, Error> {
    let mut seen = HashSet::new();
    let mut resolved = Vec::with_capacity(selection.len());
    for seat_ref in selection {
        if !seen.insert((seat_ref.row, seat_ref.column.as_str())) {
            return Err(Error::Validation(format!(
                "seat {} selected twice",
                seat_ref.label()
            )));
        }
        let seat = seat_map
            .iter()
            .find(|s| s.row == seat_ref.row && s.column == seat_ref.column)
            .ok_or_else(|| {
                Error::Validation(format!("no such seat {}", seat_ref.label()))
            })?;
        resolved.push(seat);
    }
    Ok(resolved)
}
