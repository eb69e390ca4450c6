//! Postgres implementation of the gateway traits. Runtime sqlx API with
//! bound parameters throughout; every multi-statement operation runs in
//! one transaction that commits on success and rolls back on error.

mod booking_repo;
mod crew_repo;
mod customer_repo;
mod fleet_repo;
mod flight_repo;
mod report_repo;
mod route_repo;

use skylane_core::StoreError;
use skylane_shared::{AircraftSize, BookingStatus, CrewRole, FlightStatus, SeatClass};
use sqlx::PgPool;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub(crate) fn pool(&self) -> &PgPool {
        &self.pool
    }
}

pub(crate) fn map_sqlx(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        sqlx::Error::Database(db)
            if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) =>
        {
            StoreError::Conflict(db.message().to_string())
        }
        _ => StoreError::Backend(err.to_string()),
    }
}

pub(crate) fn parse_flight_status(s: &str) -> Result<FlightStatus, StoreError> {
    FlightStatus::parse(s)
        .ok_or_else(|| StoreError::Backend(format!("unknown flight status {s:?}")))
}

pub(crate) fn parse_booking_status(s: &str) -> Result<BookingStatus, StoreError> {
    BookingStatus::parse(s)
        .ok_or_else(|| StoreError::Backend(format!("unknown booking status {s:?}")))
}

pub(crate) fn parse_size(s: &str) -> Result<AircraftSize, StoreError> {
    AircraftSize::parse(s)
        .ok_or_else(|| StoreError::Backend(format!("unknown aircraft size {s:?}")))
}

pub(crate) fn parse_class(s: &str) -> Result<SeatClass, StoreError> {
    SeatClass::parse(s).ok_or_else(|| StoreError::Backend(format!("unknown seat class {s:?}")))
}

pub(crate) fn parse_role(s: &str) -> Result<CrewRole, StoreError> {
    CrewRole::parse(s).ok_or_else(|| StoreError::Backend(format!("unknown crew role {s:?}")))
}
