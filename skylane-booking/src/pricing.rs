use skylane_shared::{Flight, Seat, SeatClass};

/// Business seats charge the flight's business fare; everything else the
/// economy fare. Total is the plain sum over the selection.
pub fn price_seats(flight: &Flight, seats: &[&Seat]) -> i32 {
    seats
        .iter()
        .map(|seat| match seat.class {
            SeatClass::Business => flight.business_price_cents,
            SeatClass::Economy => flight.economy_price_cents,
        })
        .sum()
}
