//! In-memory datastore. Backs the unit and integration tests and local
//! development; semantics mirror the Postgres backend, including the
//! seat-uniqueness guarantee at booking insert.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use skylane_core::gateway::{CabinRevenue, MonthlyCancellationRate};
use skylane_core::{
    BookingStore, ChainTail, CrewStore, CustomerStore, FleetStore, FlightFilter, FlightDetails,
    FlightStore, FlightSummary, NewBooking, NewFlight, ResourceRef, ReportStore, RouteStore,
    StoreError, TimeWindow,
};
use skylane_shared::{
    Aircraft, Booking, BookingStatus, CrewMember, CrewRole, Customer, Flight, FlightStatus,
    Manager, RegisteredCustomer, Route, Seat, SeatRef,
};

#[derive(Debug, Clone)]
struct CrewAssignment {
    flight_id: i64,
    employee_id: String,
    role: CrewRole,
}

#[derive(Debug, Clone)]
struct ReservedSeatRow {
    booking_ref: String,
    flight_id: i64,
    row: i32,
    column: String,
}

#[derive(Default)]
struct Inner {
    routes: BTreeMap<i64, Route>,
    next_route_id: i64,
    aircraft: BTreeMap<String, Aircraft>,
    seats: HashMap<String, Vec<Seat>>,
    crew: BTreeMap<String, CrewMember>,
    flights: BTreeMap<i64, Flight>,
    next_flight_id: i64,
    assignments: Vec<CrewAssignment>,
    bookings: BTreeMap<String, Booking>,
    reserved_seats: Vec<ReservedSeatRow>,
    customers: BTreeMap<String, Customer>,
    registered: BTreeMap<String, RegisteredCustomer>,
    managers: BTreeMap<String, Manager>,
}

pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().expect("memory store lock poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().expect("memory store lock poisoned")
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Inner {
    fn route_duration(&self, route_id: i64) -> Result<i32, StoreError> {
        self.routes
            .get(&route_id)
            .map(|r| r.duration_minutes)
            .ok_or_else(|| StoreError::Backend(format!("missing route {route_id}")))
    }

    fn effective_arrival(&self, flight: &Flight) -> Result<DateTime<Utc>, StoreError> {
        Ok(flight.effective_arrival(self.route_duration(flight.route_id)?))
    }

    /// Non-cancelled flights the resource is assigned to.
    fn resource_flights(&self, resource: &ResourceRef) -> Vec<&Flight> {
        match resource {
            ResourceRef::Aircraft(tail) => self
                .flights
                .values()
                .filter(|f| &f.tail_number == tail && f.status != FlightStatus::Cancelled)
                .collect(),
            ResourceRef::Crew(role, employee_id) => self
                .assignments
                .iter()
                .filter(|a| &a.employee_id == employee_id && a.role == *role)
                .filter_map(|a| self.flights.get(&a.flight_id))
                .filter(|f| f.status != FlightStatus::Cancelled)
                .collect(),
        }
    }

    fn seat_total(&self, tail_number: &str) -> i64 {
        self.seats
            .get(tail_number)
            .map(|s| s.len() as i64)
            .unwrap_or(0)
    }

    fn occupied(&self, flight_id: i64) -> i64 {
        self.reserved_seats
            .iter()
            .filter(|rs| {
                rs.flight_id == flight_id
                    && self
                        .bookings
                        .get(&rs.booking_ref)
                        .map(|b| b.status == BookingStatus::Active)
                        .unwrap_or(false)
            })
            .count() as i64
    }
}

#[async_trait]
impl RouteStore for MemoryStore {
    async fn insert_route(
        &self,
        origin: &str,
        destination: &str,
        duration_minutes: i32,
    ) -> Result<i64, StoreError> {
        let mut inner = self.write();
        inner.next_route_id += 1;
        let id = inner.next_route_id;
        inner.routes.insert(
            id,
            Route {
                id,
                origin: origin.to_string(),
                destination: destination.to_string(),
                duration_minutes,
            },
        );
        Ok(id)
    }

    async fn route(&self, id: i64) -> Result<Option<Route>, StoreError> {
        Ok(self.read().routes.get(&id).cloned())
    }

    async fn list_routes(&self) -> Result<Vec<Route>, StoreError> {
        Ok(self.read().routes.values().cloned().collect())
    }
}

#[async_trait]
impl FleetStore for MemoryStore {
    async fn insert_aircraft(&self, aircraft: &Aircraft, seats: &[Seat]) -> Result<(), StoreError> {
        let mut inner = self.write();
        if inner.aircraft.contains_key(&aircraft.tail_number) {
            return Err(StoreError::Conflict(format!(
                "aircraft {} already registered",
                aircraft.tail_number
            )));
        }
        inner
            .aircraft
            .insert(aircraft.tail_number.clone(), aircraft.clone());
        inner
            .seats
            .insert(aircraft.tail_number.clone(), seats.to_vec());
        Ok(())
    }

    async fn aircraft(&self, tail_number: &str) -> Result<Option<Aircraft>, StoreError> {
        Ok(self.read().aircraft.get(tail_number).cloned())
    }

    async fn list_aircraft(&self) -> Result<Vec<Aircraft>, StoreError> {
        Ok(self.read().aircraft.values().cloned().collect())
    }

    async fn seat_map(&self, tail_number: &str) -> Result<Vec<Seat>, StoreError> {
        Ok(self.read().seats.get(tail_number).cloned().unwrap_or_default())
    }

    async fn seat_count(&self, tail_number: &str) -> Result<i64, StoreError> {
        Ok(self.read().seat_total(tail_number))
    }
}

#[async_trait]
impl CrewStore for MemoryStore {
    async fn insert_crew_member(&self, member: &CrewMember) -> Result<(), StoreError> {
        let mut inner = self.write();
        if inner.crew.contains_key(&member.employee_id) {
            return Err(StoreError::Conflict(format!(
                "crew member {} already registered",
                member.employee_id
            )));
        }
        inner.crew.insert(member.employee_id.clone(), member.clone());
        Ok(())
    }

    async fn crew_member(&self, employee_id: &str) -> Result<Option<CrewMember>, StoreError> {
        Ok(self.read().crew.get(employee_id).cloned())
    }

    async fn list_crew(
        &self,
        role: CrewRole,
        qualified_only: bool,
    ) -> Result<Vec<CrewMember>, StoreError> {
        Ok(self
            .read()
            .crew
            .values()
            .filter(|m| m.role == role && (!qualified_only || m.long_haul_qualified))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl FlightStore for MemoryStore {
    async fn insert_flight(
        &self,
        flight: &NewFlight,
        pilots: &[String],
        attendants: &[String],
    ) -> Result<i64, StoreError> {
        let mut inner = self.write();
        if !inner.routes.contains_key(&flight.route_id) {
            return Err(StoreError::Backend(format!(
                "missing route {}",
                flight.route_id
            )));
        }
        if !inner.aircraft.contains_key(&flight.tail_number) {
            return Err(StoreError::Backend(format!(
                "missing aircraft {}",
                flight.tail_number
            )));
        }

        // Final overlap guard under the write lock, matching the Postgres
        // in-transaction recheck: a racing planner cannot slip a second
        // assignment into the same window.
        let duration = inner.route_duration(flight.route_id)?;
        let window = TimeWindow::new(
            flight.departure,
            flight.departure + chrono::Duration::minutes(duration as i64),
        );
        let mut resources = vec![ResourceRef::Aircraft(flight.tail_number.clone())];
        resources.extend(
            pilots
                .iter()
                .map(|id| ResourceRef::Crew(CrewRole::Pilot, id.clone())),
        );
        resources.extend(
            attendants
                .iter()
                .map(|id| ResourceRef::Crew(CrewRole::Attendant, id.clone())),
        );
        for resource in &resources {
            for existing in inner.resource_flights(resource) {
                let occupied =
                    TimeWindow::new(existing.departure, inner.effective_arrival(existing)?);
                if occupied.overlaps(&window) {
                    return Err(StoreError::Conflict(format!(
                        "conflicting assignment on flight {}",
                        existing.id
                    )));
                }
            }
        }

        inner.next_flight_id += 1;
        let id = inner.next_flight_id;
        inner.flights.insert(
            id,
            Flight {
                id,
                route_id: flight.route_id,
                tail_number: flight.tail_number.clone(),
                departure: flight.departure,
                arrival: None,
                status: FlightStatus::Active,
                economy_price_cents: flight.economy_price_cents,
                business_price_cents: flight.business_price_cents,
            },
        );
        for employee_id in pilots {
            inner.assignments.push(CrewAssignment {
                flight_id: id,
                employee_id: employee_id.clone(),
                role: CrewRole::Pilot,
            });
        }
        for employee_id in attendants {
            inner.assignments.push(CrewAssignment {
                flight_id: id,
                employee_id: employee_id.clone(),
                role: CrewRole::Attendant,
            });
        }
        Ok(id)
    }

    async fn flight(&self, id: i64) -> Result<Option<Flight>, StoreError> {
        Ok(self.read().flights.get(&id).cloned())
    }

    async fn flight_details(&self, id: i64) -> Result<Option<FlightDetails>, StoreError> {
        let inner = self.read();
        let Some(flight) = inner.flights.get(&id) else {
            return Ok(None);
        };
        let route = inner
            .routes
            .get(&flight.route_id)
            .ok_or_else(|| StoreError::Backend(format!("missing route {}", flight.route_id)))?;
        let aircraft = inner.aircraft.get(&flight.tail_number).ok_or_else(|| {
            StoreError::Backend(format!("missing aircraft {}", flight.tail_number))
        })?;
        Ok(Some(FlightDetails {
            flight: flight.clone(),
            route: route.clone(),
            aircraft: aircraft.clone(),
        }))
    }

    async fn search_flights(
        &self,
        filter: &FlightFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<FlightSummary>, StoreError> {
        let inner = self.read();
        let mut rows = Vec::new();
        for flight in inner.flights.values() {
            let route = inner
                .routes
                .get(&flight.route_id)
                .ok_or_else(|| StoreError::Backend(format!("missing route {}", flight.route_id)))?;

            if let Some(origin) = &filter.origin {
                if &route.origin != origin {
                    continue;
                }
            }
            if let Some(destination) = &filter.destination {
                if &route.destination != destination {
                    continue;
                }
            }
            if let Some(date) = filter.departs_on {
                if flight.departure.date_naive() != date {
                    continue;
                }
            }
            if let Some(status) = filter.status {
                if flight.status != status {
                    continue;
                }
            }

            let available_seats = inner.seat_total(&flight.tail_number) - inner.occupied(flight.id);
            if filter.only_bookable
                && !(flight.is_bookable(now) && available_seats > 0)
            {
                continue;
            }

            rows.push(FlightSummary {
                id: flight.id,
                origin: route.origin.clone(),
                destination: route.destination.clone(),
                duration_minutes: route.duration_minutes,
                tail_number: flight.tail_number.clone(),
                departure: flight.departure,
                effective_arrival: inner.effective_arrival(flight)?,
                status: flight.status,
                economy_price_cents: flight.economy_price_cents,
                business_price_cents: flight.business_price_cents,
                available_seats,
            });
        }
        rows.sort_by_key(|r| r.departure);
        Ok(rows)
    }

    async fn flights_with_status(
        &self,
        statuses: &[FlightStatus],
    ) -> Result<Vec<Flight>, StoreError> {
        Ok(self
            .read()
            .flights
            .values()
            .filter(|f| statuses.contains(&f.status))
            .cloned()
            .collect())
    }

    async fn set_flight_status(&self, id: i64, status: FlightStatus) -> Result<(), StoreError> {
        let mut inner = self.write();
        let flight = inner
            .flights
            .get_mut(&id)
            .ok_or(StoreError::NotFound)?;
        flight.status = status;
        Ok(())
    }

    async fn occupied_seat_count(&self, id: i64) -> Result<i64, StoreError> {
        Ok(self.read().occupied(id))
    }

    async fn chain_tail(&self, resource: &ResourceRef) -> Result<Option<ChainTail>, StoreError> {
        let inner = self.read();
        let mut tail: Option<ChainTail> = None;
        for flight in inner.resource_flights(resource) {
            let arrival = inner.effective_arrival(flight)?;
            let destination = inner
                .routes
                .get(&flight.route_id)
                .map(|r| r.destination.clone())
                .ok_or_else(|| StoreError::Backend(format!("missing route {}", flight.route_id)))?;
            if tail
                .as_ref()
                .map(|t| arrival > t.effective_arrival)
                .unwrap_or(true)
            {
                tail = Some(ChainTail {
                    destination,
                    effective_arrival: arrival,
                });
            }
        }
        Ok(tail)
    }

    async fn has_overlapping_assignment(
        &self,
        resource: &ResourceRef,
        window: &TimeWindow,
    ) -> Result<bool, StoreError> {
        let inner = self.read();
        for flight in inner.resource_flights(resource) {
            let existing = TimeWindow::new(flight.departure, inner.effective_arrival(flight)?);
            if existing.overlaps(window) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn crew_on_flight(&self, id: i64, role: CrewRole) -> Result<Vec<String>, StoreError> {
        let mut out: Vec<String> = self
            .read()
            .assignments
            .iter()
            .filter(|a| a.flight_id == id && a.role == role)
            .map(|a| a.employee_id.clone())
            .collect();
        out.sort();
        Ok(out)
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn insert_booking(
        &self,
        booking: &NewBooking,
        seats: &[SeatRef],
    ) -> Result<(), StoreError> {
        let mut inner = self.write();
        if inner.bookings.contains_key(&booking.reference) {
            return Err(StoreError::Conflict(format!(
                "booking reference {} already exists",
                booking.reference
            )));
        }
        // Mirrors the UNIQUE (flight_id, row_num, col) index: cancelled
        // bookings have had their rows deleted, so any remaining row blocks
        // the seat.
        for seat in seats {
            let taken = inner.reserved_seats.iter().any(|rs| {
                rs.flight_id == booking.flight_id
                    && rs.row == seat.row
                    && rs.column == seat.column
            });
            if taken {
                return Err(StoreError::Conflict(format!(
                    "seat {}{} already reserved",
                    seat.row, seat.column
                )));
            }
        }
        inner.bookings.insert(
            booking.reference.clone(),
            Booking {
                reference: booking.reference.clone(),
                customer_email: booking.customer_email.clone(),
                flight_id: booking.flight_id,
                total_price_cents: booking.total_price_cents,
                status: BookingStatus::Active,
                created_at: Utc::now(),
            },
        );
        for seat in seats {
            inner.reserved_seats.push(ReservedSeatRow {
                booking_ref: booking.reference.clone(),
                flight_id: booking.flight_id,
                row: seat.row,
                column: seat.column.clone(),
            });
        }
        Ok(())
    }

    async fn booking(&self, reference: &str) -> Result<Option<Booking>, StoreError> {
        Ok(self.read().bookings.get(reference).cloned())
    }

    async fn bookings_for_customer(
        &self,
        email: &str,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, StoreError> {
        let mut out: Vec<Booking> = self
            .read()
            .bookings
            .values()
            .filter(|b| b.customer_email == email)
            .filter(|b| status.map(|s| b.status == s).unwrap_or(true))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn bookings_for_flight(
        &self,
        flight_id: i64,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, StoreError> {
        Ok(self
            .read()
            .bookings
            .values()
            .filter(|b| b.flight_id == flight_id)
            .filter(|b| status.map(|s| b.status == s).unwrap_or(true))
            .cloned()
            .collect())
    }

    async fn active_bookings_on_performed_flights(&self) -> Result<Vec<String>, StoreError> {
        let inner = self.read();
        Ok(inner
            .bookings
            .values()
            .filter(|b| b.status == BookingStatus::Active)
            .filter(|b| {
                inner
                    .flights
                    .get(&b.flight_id)
                    .map(|f| f.status == FlightStatus::Performed)
                    .unwrap_or(false)
            })
            .map(|b| b.reference.clone())
            .collect())
    }

    async fn update_booking(
        &self,
        reference: &str,
        status: BookingStatus,
        total_price_cents: i32,
    ) -> Result<(), StoreError> {
        let mut inner = self.write();
        let booking = inner
            .bookings
            .get_mut(reference)
            .ok_or(StoreError::NotFound)?;
        booking.status = status;
        booking.total_price_cents = total_price_cents;
        Ok(())
    }

    async fn release_seats(&self, reference: &str) -> Result<(), StoreError> {
        self.write()
            .reserved_seats
            .retain(|rs| rs.booking_ref != reference);
        Ok(())
    }

    async fn reserved_seats_for_flight(&self, flight_id: i64) -> Result<Vec<SeatRef>, StoreError> {
        let inner = self.read();
        Ok(inner
            .reserved_seats
            .iter()
            .filter(|rs| {
                rs.flight_id == flight_id
                    && inner
                        .bookings
                        .get(&rs.booking_ref)
                        .map(|b| b.status == BookingStatus::Active)
                        .unwrap_or(false)
            })
            .map(|rs| SeatRef {
                row: rs.row,
                column: rs.column.clone(),
            })
            .collect())
    }

    async fn seats_for_booking(&self, reference: &str) -> Result<Vec<SeatRef>, StoreError> {
        let mut out: Vec<SeatRef> = self
            .read()
            .reserved_seats
            .iter()
            .filter(|rs| rs.booking_ref == reference)
            .map(|rs| SeatRef {
                row: rs.row,
                column: rs.column.clone(),
            })
            .collect();
        out.sort_by(|a, b| (a.row, &a.column).cmp(&(b.row, &b.column)));
        Ok(out)
    }
}

#[async_trait]
impl CustomerStore for MemoryStore {
    async fn customer(&self, email: &str) -> Result<Option<Customer>, StoreError> {
        Ok(self.read().customers.get(email).cloned())
    }

    async fn upsert_customer(
        &self,
        email: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<(), StoreError> {
        self.write()
            .customers
            .entry(email.to_string())
            .or_insert_with(|| Customer {
                email: email.to_string(),
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
            });
        Ok(())
    }

    async fn register_customer(&self, customer: &RegisteredCustomer) -> Result<(), StoreError> {
        let mut inner = self.write();
        if inner.registered.contains_key(&customer.email) {
            return Err(StoreError::Conflict(format!(
                "{} is already registered",
                customer.email
            )));
        }
        inner
            .registered
            .insert(customer.email.clone(), customer.clone());
        Ok(())
    }

    async fn find_registered_customer(
        &self,
        email: &str,
    ) -> Result<Option<RegisteredCustomer>, StoreError> {
        Ok(self.read().registered.get(email).cloned())
    }

    async fn insert_manager(&self, manager: &Manager) -> Result<(), StoreError> {
        let mut inner = self.write();
        if inner.managers.contains_key(&manager.employee_id) {
            return Err(StoreError::Conflict(format!(
                "manager {} already exists",
                manager.employee_id
            )));
        }
        inner
            .managers
            .insert(manager.employee_id.clone(), manager.clone());
        Ok(())
    }

    async fn find_manager(&self, employee_id: &str) -> Result<Option<Manager>, StoreError> {
        Ok(self.read().managers.get(employee_id).cloned())
    }
}

#[async_trait]
impl ReportStore for MemoryStore {
    async fn monthly_cancellation_rates(
        &self,
    ) -> Result<Vec<MonthlyCancellationRate>, StoreError> {
        let inner = self.read();
        let mut by_month: BTreeMap<String, (i64, i64)> = BTreeMap::new();
        for booking in inner.bookings.values() {
            let month = booking.created_at.format("%Y-%m").to_string();
            let entry = by_month.entry(month).or_insert((0, 0));
            entry.0 += 1;
            if matches!(
                booking.status,
                BookingStatus::CancelledByCustomer | BookingStatus::CancelledBySystem
            ) {
                entry.1 += 1;
            }
        }
        Ok(by_month
            .into_iter()
            .rev()
            .map(|(month, (total, cancelled))| MonthlyCancellationRate {
                month,
                total_bookings: total,
                cancelled,
                rate_pct: cancelled as f64 * 100.0 / total as f64,
            })
            .collect())
    }

    async fn average_occupancy_pct(&self) -> Result<Option<f64>, StoreError> {
        let inner = self.read();
        let mut rates = Vec::new();
        for flight in inner
            .flights
            .values()
            .filter(|f| f.status == FlightStatus::Performed)
        {
            let total = inner.seat_total(&flight.tail_number);
            if total == 0 {
                continue;
            }
            let occupied = inner
                .reserved_seats
                .iter()
                .filter(|rs| {
                    rs.flight_id == flight.id
                        && inner
                            .bookings
                            .get(&rs.booking_ref)
                            .map(|b| b.status == BookingStatus::Performed)
                            .unwrap_or(false)
                })
                .count() as i64;
            rates.push(occupied as f64 * 100.0 / total as f64);
        }
        if rates.is_empty() {
            Ok(None)
        } else {
            Ok(Some(rates.iter().sum::<f64>() / rates.len() as f64))
        }
    }

    async fn revenue_by_cabin(&self) -> Result<Vec<CabinRevenue>, StoreError> {
        use skylane_shared::SeatClass;

        let inner = self.read();
        let mut totals: HashMap<SeatClass, i64> = HashMap::new();
        for rs in &inner.reserved_seats {
            let Some(booking) = inner.bookings.get(&rs.booking_ref) else {
                continue;
            };
            if !matches!(
                booking.status,
                BookingStatus::Active | BookingStatus::Performed
            ) {
                continue;
            }
            let Some(flight) = inner.flights.get(&rs.flight_id) else {
                continue;
            };
            let class = inner
                .seats
                .get(&flight.tail_number)
                .and_then(|seats| {
                    seats
                        .iter()
                        .find(|s| s.row == rs.row && s.column == rs.column)
                })
                .map(|s| s.class)
                .unwrap_or(SeatClass::Economy);
            let price = match class {
                SeatClass::Business => flight.business_price_cents,
                SeatClass::Economy => flight.economy_price_cents,
            };
            *totals.entry(class).or_insert(0) += price as i64;
        }
        let mut out: Vec<CabinRevenue> = totals
            .into_iter()
            .map(|(class, revenue_cents)| CabinRevenue {
                class,
                revenue_cents,
            })
            .collect();
        out.sort_by(|a, b| b.revenue_cents.cmp(&a.revenue_cents));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use skylane_shared::SeatClass;

    fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    async fn seed(store: &MemoryStore) -> i64 {
        let route_id = store.insert_route("TLV", "ATH", 110).await.unwrap();
        let aircraft = Aircraft {
            tail_number: "4X-SML".to_string(),
            size: skylane_shared::AircraftSize::Small,
            manufacturer: "Airbus".to_string(),
            purchased_on: chrono::NaiveDate::from_ymd_opt(2019, 5, 1).unwrap(),
        };
        let seats = vec![
            Seat { row: 1, column: "A".to_string(), class: SeatClass::Economy },
            Seat { row: 1, column: "B".to_string(), class: SeatClass::Economy },
        ];
        store.insert_aircraft(&aircraft, &seats).await.unwrap();
        store
            .insert_flight(
                &NewFlight {
                    route_id,
                    tail_number: "4X-SML".to_string(),
                    departure: dt(2025, 7, 1, 8, 0),
                    economy_price_cents: 20_000,
                    business_price_cents: 0,
                },
                &[],
                &[],
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_duplicate_reference_conflicts() {
        let store = MemoryStore::new();
        let flight_id = seed(&store).await;
        let booking = NewBooking {
            reference: "SAMEREF1".to_string(),
            customer_email: "a@example.com".to_string(),
            flight_id,
            total_price_cents: 20_000,
        };
        let seat = SeatRef { row: 1, column: "A".to_string() };
        store.insert_booking(&booking, &[seat]).await.unwrap();

        let other_seat = SeatRef { row: 1, column: "B".to_string() };
        let err = store.insert_booking(&booking, &[other_seat]).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_seat_uniqueness_is_enforced_per_flight() {
        let store = MemoryStore::new();
        let flight_id = seed(&store).await;
        let seat = SeatRef { row: 1, column: "A".to_string() };

        let first = NewBooking {
            reference: "REF1AAAA".to_string(),
            customer_email: "a@example.com".to_string(),
            flight_id,
            total_price_cents: 20_000,
        };
        store.insert_booking(&first, &[seat.clone()]).await.unwrap();

        let second = NewBooking {
            reference: "REF2BBBB".to_string(),
            customer_email: "b@example.com".to_string(),
            flight_id,
            total_price_cents: 20_000,
        };
        let err = store.insert_booking(&second, &[seat]).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_released_seats_can_be_rebooked() {
        let store = MemoryStore::new();
        let flight_id = seed(&store).await;
        let seat = SeatRef { row: 1, column: "A".to_string() };

        let first = NewBooking {
            reference: "REF1AAAA".to_string(),
            customer_email: "a@example.com".to_string(),
            flight_id,
            total_price_cents: 20_000,
        };
        store.insert_booking(&first, &[seat.clone()]).await.unwrap();
        store
            .update_booking("REF1AAAA", BookingStatus::CancelledByCustomer, 1_000)
            .await
            .unwrap();
        store.release_seats("REF1AAAA").await.unwrap();

        let second = NewBooking {
            reference: "REF2BBBB".to_string(),
            customer_email: "b@example.com".to_string(),
            flight_id,
            total_price_cents: 20_000,
        };
        store.insert_booking(&second, &[seat]).await.unwrap();
    }

    #[tokio::test]
    async fn test_insert_flight_guards_against_overlapping_assignment() {
        let store = MemoryStore::new();
        seed(&store).await;

        // Same aircraft, 30 minutes into the first flight's window.
        let err = store
            .insert_flight(
                &NewFlight {
                    route_id: 1,
                    tail_number: "4X-SML".to_string(),
                    departure: dt(2025, 7, 1, 8, 30),
                    economy_price_cents: 20_000,
                    business_price_cents: 0,
                },
                &[],
                &[],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_bookable_search_hides_full_and_departed_flights() {
        let store = MemoryStore::new();
        let flight_id = seed(&store).await;

        let bookable = store
            .search_flights(&FlightFilter::bookable(), dt(2025, 6, 1, 0, 0))
            .await
            .unwrap();
        assert_eq!(bookable.len(), 1);
        assert_eq!(bookable[0].available_seats, 2);

        // Fill the flight.
        for (reference, seat) in [("R1AAAAAA", "A"), ("R2BBBBBB", "B")] {
            let booking = NewBooking {
                reference: reference.to_string(),
                customer_email: "a@example.com".to_string(),
                flight_id,
                total_price_cents: 20_000,
            };
            store
                .insert_booking(&booking, &[SeatRef { row: 1, column: seat.to_string() }])
                .await
                .unwrap();
        }

        let bookable = store
            .search_flights(&FlightFilter::bookable(), dt(2025, 6, 1, 0, 0))
            .await
            .unwrap();
        assert!(bookable.is_empty());

        // An unfiltered search still sees it.
        let all = store
            .search_flights(&FlightFilter::default(), dt(2025, 6, 1, 0, 0))
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].available_seats, 0);
    }
}
