use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use skylane_shared::FlightStatus;

/// Typed search predicates for the flight catalog. The store translates
/// every set predicate into a bound query parameter; values never reach the
/// query text itself.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlightFilter {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub departs_on: Option<NaiveDate>,
    pub status: Option<FlightStatus>,
    /// Restrict to flights a customer may book: Active, future departure,
    /// at least one free seat.
    #[serde(default)]
    pub only_bookable: bool,
}

impl FlightFilter {
    /// The customer-facing view: bookable flights only, regardless of what
    /// other predicates the caller set.
    pub fn bookable() -> Self {
        FlightFilter {
            only_bookable: true,
            ..FlightFilter::default()
        }
    }
}

/// One row of a flight search: the flight joined to its route, with derived
/// availability.
#[derive(Debug, Clone, Serialize)]
pub struct FlightSummary {
    pub id: i64,
    pub origin: String,
    pub destination: String,
    pub duration_minutes: i32,
    pub tail_number: String,
    pub departure: DateTime<Utc>,
    pub effective_arrival: DateTime<Utc>,
    pub status: FlightStatus,
    pub economy_price_cents: i32,
    pub business_price_cents: i32,
    pub available_seats: i64,
}
