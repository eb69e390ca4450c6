pub mod booking;
pub mod crew;
pub mod customer;
pub mod fleet;
pub mod flight;
pub mod route;

pub use booking::{Booking, BookingStatus};
pub use crew::{CrewMember, CrewRole};
pub use customer::{Customer, Manager, RegisteredCustomer};
pub use fleet::{Aircraft, AircraftSize, Seat, SeatClass, SeatRef};
pub use flight::{Flight, FlightStatus};
pub use route::Route;

/// Default location for any aircraft or crew member with no assignment
/// history.
pub const HOME_BASE: &str = "TLV";

/// Raised when a status state machine is asked to make a move it does not
/// allow (terminal states admit no moves at all).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid status transition from {from} to {to}")]
pub struct InvalidTransition {
    pub from: String,
    pub to: String,
}
