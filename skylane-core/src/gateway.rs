use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use skylane_shared::{
    Aircraft, Booking, BookingStatus, CrewMember, CrewRole, Customer, Flight, FlightStatus,
    Manager, RegisteredCustomer, Route, Seat, SeatClass, SeatRef,
};

use crate::error::StoreError;
use crate::filter::{FlightFilter, FlightSummary};

/// A schedulable resource: the aircraft flying a route, or one crew member
/// assigned to it. The closed set of variants is what makes the continuity
/// check fail closed — there is no "unknown kind" to mishandle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceRef {
    Aircraft(String),
    Crew(CrewRole, String),
}

/// Where a resource's schedule chain currently ends: the destination and
/// effective arrival of its latest non-cancelled flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainTail {
    pub destination: String,
    pub effective_arrival: DateTime<Utc>,
}

/// Half-open interval [start, end). Two windows that merely touch do not
/// overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        TimeWindow { start, end }
    }

    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && self.end > other.start
    }
}

/// Flight to be created, before the datastore assigns its id. Status starts
/// Active; arrival stays unrecorded and derives from the route.
#[derive(Debug, Clone)]
pub struct NewFlight {
    pub route_id: i64,
    pub tail_number: String,
    pub departure: DateTime<Utc>,
    pub economy_price_cents: i32,
    pub business_price_cents: i32,
}

#[derive(Debug, Clone)]
pub struct NewBooking {
    pub reference: String,
    pub customer_email: String,
    pub flight_id: i64,
    pub total_price_cents: i32,
}

/// Flight joined to the reference data it hangs off.
#[derive(Debug, Clone, Serialize)]
pub struct FlightDetails {
    pub flight: Flight,
    pub route: Route,
    pub aircraft: Aircraft,
}

impl FlightDetails {
    pub fn effective_arrival(&self) -> DateTime<Utc> {
        self.flight.effective_arrival(self.route.duration_minutes)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyCancellationRate {
    pub month: String,
    pub total_bookings: i64,
    pub cancelled: i64,
    pub rate_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CabinRevenue {
    pub class: SeatClass,
    pub revenue_cents: i64,
}

#[async_trait]
pub trait RouteStore: Send + Sync {
    async fn insert_route(
        &self,
        origin: &str,
        destination: &str,
        duration_minutes: i32,
    ) -> Result<i64, StoreError>;

    async fn route(&self, id: i64) -> Result<Option<Route>, StoreError>;

    async fn list_routes(&self) -> Result<Vec<Route>, StoreError>;
}

#[async_trait]
pub trait FleetStore: Send + Sync {
    /// Registers the aircraft together with its full seat map, as one unit
    /// of work.
    async fn insert_aircraft(&self, aircraft: &Aircraft, seats: &[Seat]) -> Result<(), StoreError>;

    async fn aircraft(&self, tail_number: &str) -> Result<Option<Aircraft>, StoreError>;

    async fn list_aircraft(&self) -> Result<Vec<Aircraft>, StoreError>;

    async fn seat_map(&self, tail_number: &str) -> Result<Vec<Seat>, StoreError>;

    async fn seat_count(&self, tail_number: &str) -> Result<i64, StoreError>;
}

#[async_trait]
pub trait CrewStore: Send + Sync {
    async fn insert_crew_member(&self, member: &CrewMember) -> Result<(), StoreError>;

    async fn crew_member(&self, employee_id: &str) -> Result<Option<CrewMember>, StoreError>;

    async fn list_crew(
        &self,
        role: CrewRole,
        qualified_only: bool,
    ) -> Result<Vec<CrewMember>, StoreError>;
}

#[async_trait]
pub trait FlightStore: Send + Sync {
    /// Creates the flight and every crew assignment row in one unit of
    /// work. Assignment rows are never mutated afterwards; this is the only
    /// code path that extends a resource's schedule chain.
    ///
    /// The time-overlap check is repeated inside the transaction for the
    /// aircraft and every crew member, so two planners racing for the same
    /// resource cannot both commit; the loser gets `Conflict`.
    async fn insert_flight(
        &self,
        flight: &NewFlight,
        pilots: &[String],
        attendants: &[String],
    ) -> Result<i64, StoreError>;

    async fn flight(&self, id: i64) -> Result<Option<Flight>, StoreError>;

    async fn flight_details(&self, id: i64) -> Result<Option<FlightDetails>, StoreError>;

    async fn search_flights(
        &self,
        filter: &FlightFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<FlightSummary>, StoreError>;

    async fn flights_with_status(
        &self,
        statuses: &[FlightStatus],
    ) -> Result<Vec<Flight>, StoreError>;

    async fn set_flight_status(&self, id: i64, status: FlightStatus) -> Result<(), StoreError>;

    /// Seats held by Active bookings on this flight.
    async fn occupied_seat_count(&self, id: i64) -> Result<i64, StoreError>;

    /// Latest non-cancelled assignment of the resource, by effective
    /// arrival. None when the resource has never flown.
    async fn chain_tail(&self, resource: &ResourceRef) -> Result<Option<ChainTail>, StoreError>;

    /// Whether any non-cancelled flight of the resource occupies a window
    /// overlapping the given one (half-open semantics).
    async fn has_overlapping_assignment(
        &self,
        resource: &ResourceRef,
        window: &TimeWindow,
    ) -> Result<bool, StoreError>;

    async fn crew_on_flight(&self, id: i64, role: CrewRole) -> Result<Vec<String>, StoreError>;
}

#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Creates the booking and all its seat reservations in one unit of
    /// work; fails with `Conflict` when a seat is already held for the
    /// flight or the reference collides.
    async fn insert_booking(
        &self,
        booking: &NewBooking,
        seats: &[SeatRef],
    ) -> Result<(), StoreError>;

    async fn booking(&self, reference: &str) -> Result<Option<Booking>, StoreError>;

    async fn bookings_for_customer(
        &self,
        email: &str,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, StoreError>;

    async fn bookings_for_flight(
        &self,
        flight_id: i64,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, StoreError>;

    /// Active bookings whose flight has already been performed; the
    /// reconciler moves these forward.
    async fn active_bookings_on_performed_flights(&self) -> Result<Vec<String>, StoreError>;

    async fn update_booking(
        &self,
        reference: &str,
        status: BookingStatus,
        total_price_cents: i32,
    ) -> Result<(), StoreError>;

    /// Deletes every reserved seat of the booking, freeing them for other
    /// customers.
    async fn release_seats(&self, reference: &str) -> Result<(), StoreError>;

    /// Seats held by Active bookings on the flight.
    async fn reserved_seats_for_flight(&self, flight_id: i64) -> Result<Vec<SeatRef>, StoreError>;

    async fn seats_for_booking(&self, reference: &str) -> Result<Vec<SeatRef>, StoreError>;
}

#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn customer(&self, email: &str) -> Result<Option<Customer>, StoreError>;

    /// Creates the base customer record if the email is new; existing rows
    /// are left untouched.
    async fn upsert_customer(
        &self,
        email: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<(), StoreError>;

    /// Fails with `Conflict` when the email is already registered.
    async fn register_customer(
        &self,
        customer: &RegisteredCustomer,
    ) -> Result<(), StoreError>;

    async fn find_registered_customer(
        &self,
        email: &str,
    ) -> Result<Option<RegisteredCustomer>, StoreError>;

    async fn insert_manager(&self, manager: &Manager) -> Result<(), StoreError>;

    async fn find_manager(&self, employee_id: &str) -> Result<Option<Manager>, StoreError>;
}

#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn monthly_cancellation_rates(&self)
        -> Result<Vec<MonthlyCancellationRate>, StoreError>;

    /// Mean occupancy percentage across performed flights, None when no
    /// flight has been performed yet.
    async fn average_occupancy_pct(&self) -> Result<Option<f64>, StoreError>;

    async fn revenue_by_cabin(&self) -> Result<Vec<CabinRevenue>, StoreError>;
}

/// The full datastore handle components receive by injection; one
/// implementation per backend.
pub trait Datastore:
    RouteStore + FleetStore + CrewStore + FlightStore + BookingStore + CustomerStore + ReportStore
{
}

impl<T> Datastore for T where
    T: RouteStore
        + FleetStore
        + CrewStore
        + FlightStore
        + BookingStore
        + CustomerStore
        + ReportStore
{
}
