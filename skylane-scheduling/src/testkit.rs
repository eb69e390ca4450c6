//! Shared scenario builders for the scheduling tests. Everything goes
//! through the public gateway traits so the tests exercise the same
//! surface the engine does.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use skylane_core::{CrewStore, Datastore, FleetStore, FlightStore, NewFlight, RouteStore};
use skylane_shared::{Aircraft, AircraftSize, CrewMember, CrewRole, FlightStatus, Route, Seat, SeatClass};

pub fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

pub async fn seed_route(store: &dyn Datastore, origin: &str, destination: &str, minutes: i32) -> Route {
    let id = store.insert_route(origin, destination, minutes).await.unwrap();
    store.route(id).await.unwrap().unwrap()
}

pub async fn seed_big_aircraft(store: &dyn Datastore, tail: &str) {
    seed_aircraft(store, tail, AircraftSize::Big, 4).await;
}

pub async fn seed_small_aircraft(store: &dyn Datastore, tail: &str) {
    seed_aircraft(store, tail, AircraftSize::Small, 4).await;
}

pub async fn seed_aircraft(store: &dyn Datastore, tail: &str, size: AircraftSize, economy_seats: i32) {
    let aircraft = Aircraft {
        tail_number: tail.to_string(),
        size,
        manufacturer: "Boeing".to_string(),
        purchased_on: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
    };
    let mut seats: Vec<Seat> = (1..=economy_seats)
        .map(|row| Seat {
            row,
            column: "A".to_string(),
            class: SeatClass::Economy,
        })
        .collect();
    if size == AircraftSize::Big {
        seats.push(Seat {
            row: economy_seats + 1,
            column: "A".to_string(),
            class: SeatClass::Business,
        });
    }
    store.insert_aircraft(&aircraft, &seats).await.unwrap();
}

pub async fn seed_pilot(store: &dyn Datastore, employee_id: &str, qualified: bool) {
    seed_crew(store, employee_id, CrewRole::Pilot, qualified).await;
}

pub async fn seed_attendant(store: &dyn Datastore, employee_id: &str, qualified: bool) {
    seed_crew(store, employee_id, CrewRole::Attendant, qualified).await;
}

pub async fn seed_crew(store: &dyn Datastore, employee_id: &str, role: CrewRole, qualified: bool) {
    let member = CrewMember {
        employee_id: employee_id.to_string(),
        role,
        first_name: "Dana".to_string(),
        last_name: "Levi".to_string(),
        long_haul_qualified: qualified,
        hired_on: NaiveDate::from_ymd_opt(2021, 3, 15).unwrap(),
    };
    store.insert_crew_member(&member).await.unwrap();
}

pub async fn seed_flight(
    store: &dyn Datastore,
    route_id: i64,
    tail: &str,
    departure: DateTime<Utc>,
) -> i64 {
    seed_flight_with_crew(store, route_id, tail, departure, &[], &[]).await
}

pub async fn seed_flight_with_crew(
    store: &dyn Datastore,
    route_id: i64,
    tail: &str,
    departure: DateTime<Utc>,
    pilots: &[String],
    attendants: &[String],
) -> i64 {
    let flight = NewFlight {
        route_id,
        tail_number: tail.to_string(),
        departure,
        economy_price_cents: 50_000,
        business_price_cents: 120_000,
    };
    store.insert_flight(&flight, pilots, attendants).await.unwrap()
}

pub async fn cancel_flight_row(store: &dyn Datastore, flight_id: i64) {
    store
        .set_flight_status(flight_id, FlightStatus::Cancelled)
        .await
        .unwrap();
}
