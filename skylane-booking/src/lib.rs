pub mod cancellation;
pub mod checkout;
pub mod pricing;
pub mod reference;

pub use cancellation::{cancel_booking, cancel_flight};
pub use checkout::{Checkout, CheckoutRequest, ContactDetails};
pub use pricing::price_seats;
pub use reference::new_booking_reference;

/// Customers may cancel up to this many hours before departure.
pub const CUSTOMER_CANCEL_WINDOW_HOURS: i64 = 36;

/// Managers may cancel a whole flight up to this many hours before
/// departure.
pub const FLIGHT_CANCEL_WINDOW_HOURS: i64 = 72;

/// Percentage of the original price kept as the customer cancellation fee.
/// The fee replaces the charge, it is not added on top.
pub const CANCELLATION_FEE_PCT: i32 = 5;
