use async_trait::async_trait;
use chrono::{DateTime, Utc};
use skylane_core::{
    ChainTail, FlightDetails, FlightFilter, FlightStore, FlightSummary, NewFlight, ResourceRef,
    StoreError, TimeWindow,
};
use skylane_shared::{Aircraft, CrewRole, Flight, FlightStatus, Route};
use sqlx::{Postgres, QueryBuilder};

use super::{map_sqlx, parse_flight_status, parse_size, PgStore};

#[derive(sqlx::FromRow)]
struct FlightRow {
    id: i64,
    route_id: i64,
    tail_number: String,
    departure: DateTime<Utc>,
    arrival: Option<DateTime<Utc>>,
    status: String,
    economy_price_cents: i32,
    business_price_cents: i32,
}

impl FlightRow {
    fn into_flight(self) -> Result<Flight, StoreError> {
        Ok(Flight {
            id: self.id,
            route_id: self.route_id,
            tail_number: self.tail_number,
            departure: self.departure,
            arrival: self.arrival,
            status: parse_flight_status(&self.status)?,
            economy_price_cents: self.economy_price_cents,
            business_price_cents: self.business_price_cents,
        })
    }
}

#[derive(sqlx::FromRow)]
struct FlightDetailsRow {
    id: i64,
    route_id: i64,
    tail_number: String,
    departure: DateTime<Utc>,
    arrival: Option<DateTime<Utc>>,
    status: String,
    economy_price_cents: i32,
    business_price_cents: i32,
    origin: String,
    destination: String,
    duration_minutes: i32,
    size: String,
    manufacturer: String,
    purchased_on: chrono::NaiveDate,
}

#[derive(sqlx::FromRow)]
struct FlightSummaryRow {
    id: i64,
    origin: String,
    destination: String,
    duration_minutes: i32,
    tail_number: String,
    departure: DateTime<Utc>,
    effective_arrival: DateTime<Utc>,
    status: String,
    economy_price_cents: i32,
    business_price_cents: i32,
    available_seats: i64,
}

#[derive(sqlx::FromRow)]
struct ChainTailRow {
    destination: String,
    effective_arrival: DateTime<Utc>,
}

/// Joined flight/route selection used by the summary subquery.
const SUMMARY_SELECT: &str = "\
    SELECT f.id, r.origin, r.destination, r.duration_minutes, f.tail_number, f.departure, \
           COALESCE(f.arrival, f.departure + make_interval(mins => r.duration_minutes)) AS effective_arrival, \
           f.status, f.economy_price_cents, f.business_price_cents, \
           (SELECT COUNT(*) FROM seats s WHERE s.tail_number = f.tail_number) \
           - (SELECT COUNT(*) FROM reserved_seats rs JOIN bookings b ON b.reference = rs.booking_ref \
              WHERE rs.flight_id = f.id AND b.status = 'ACTIVE') AS available_seats \
    FROM flights f JOIN routes r ON r.id = f.route_id";

#[async_trait]
impl FlightStore for PgStore {
    async fn insert_flight(
        &self,
        flight: &NewFlight,
        pilots: &[String],
        attendants: &[String],
    ) -> Result<i64, StoreError> {
        let mut tx = self.pool().begin().await.map_err(map_sqlx)?;

        // Repeat the overlap check inside the transaction for every
        // resource the flight claims; a racing creation loses here instead
        // of committing a double assignment.
        let aircraft_busy: bool = sqlx::query_scalar(
            "SELECT EXISTS ( \
                 SELECT 1 FROM flights f \
                 JOIN routes r ON r.id = f.route_id \
                 CROSS JOIN routes nr \
                 WHERE nr.id = $1 AND f.tail_number = $2 AND f.status <> 'CANCELLED' \
                   AND f.departure < $3 + make_interval(mins => nr.duration_minutes) \
                   AND COALESCE(f.arrival, f.departure + make_interval(mins => r.duration_minutes)) > $3)",
        )
        .bind(flight.route_id)
        .bind(&flight.tail_number)
        .bind(flight.departure)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx)?;
        if aircraft_busy {
            return Err(StoreError::Conflict(format!(
                "aircraft {} has a conflicting assignment",
                flight.tail_number
            )));
        }

        for (employee_ids, role) in [(pilots, CrewRole::Pilot), (attendants, CrewRole::Attendant)] {
            for employee_id in employee_ids {
                let busy: bool = sqlx::query_scalar(
                    "SELECT EXISTS ( \
                         SELECT 1 FROM flight_crew fc \
                         JOIN flights f ON f.id = fc.flight_id \
                         JOIN routes r ON r.id = f.route_id \
                         CROSS JOIN routes nr \
                         WHERE nr.id = $1 AND fc.employee_id = $2 AND fc.role = $3 \
                           AND f.status <> 'CANCELLED' \
                           AND f.departure < $4 + make_interval(mins => nr.duration_minutes) \
                           AND COALESCE(f.arrival, f.departure + make_interval(mins => r.duration_minutes)) > $4)",
                )
                .bind(flight.route_id)
                .bind(employee_id)
                .bind(role.as_str())
                .bind(flight.departure)
                .fetch_one(&mut *tx)
                .await
                .map_err(map_sqlx)?;
                if busy {
                    return Err(StoreError::Conflict(format!(
                        "crew member {employee_id} has a conflicting assignment"
                    )));
                }
            }
        }

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO flights (route_id, tail_number, departure, status, economy_price_cents, business_price_cents) \
             VALUES ($1, $2, $3, 'ACTIVE', $4, $5) RETURNING id",
        )
        .bind(flight.route_id)
        .bind(&flight.tail_number)
        .bind(flight.departure)
        .bind(flight.economy_price_cents)
        .bind(flight.business_price_cents)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx)?;

        for (employee_ids, role) in [(pilots, CrewRole::Pilot), (attendants, CrewRole::Attendant)] {
            for employee_id in employee_ids {
                sqlx::query(
                    "INSERT INTO flight_crew (flight_id, employee_id, role) VALUES ($1, $2, $3)",
                )
                .bind(id)
                .bind(employee_id)
                .bind(role.as_str())
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx)?;
            }
        }

        tx.commit().await.map_err(map_sqlx)?;
        Ok(id)
    }

    async fn flight(&self, id: i64) -> Result<Option<Flight>, StoreError> {
        let row: Option<FlightRow> = sqlx::query_as(
            "SELECT id, route_id, tail_number, departure, arrival, status, economy_price_cents, business_price_cents \
             FROM flights WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx)?;
        row.map(FlightRow::into_flight).transpose()
    }

    async fn flight_details(&self, id: i64) -> Result<Option<FlightDetails>, StoreError> {
        let row: Option<FlightDetailsRow> = sqlx::query_as(
            "SELECT f.id, f.route_id, f.tail_number, f.departure, f.arrival, f.status, \
                    f.economy_price_cents, f.business_price_cents, \
                    r.origin, r.destination, r.duration_minutes, \
                    a.size, a.manufacturer, a.purchased_on \
             FROM flights f \
             JOIN routes r ON r.id = f.route_id \
             JOIN aircraft a ON a.tail_number = f.tail_number \
             WHERE f.id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx)?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(FlightDetails {
            flight: Flight {
                id: row.id,
                route_id: row.route_id,
                tail_number: row.tail_number.clone(),
                departure: row.departure,
                arrival: row.arrival,
                status: parse_flight_status(&row.status)?,
                economy_price_cents: row.economy_price_cents,
                business_price_cents: row.business_price_cents,
            },
            route: Route {
                id: row.route_id,
                origin: row.origin,
                destination: row.destination,
                duration_minutes: row.duration_minutes,
            },
            aircraft: Aircraft {
                tail_number: row.tail_number,
                size: parse_size(&row.size)?,
                manufacturer: row.manufacturer,
                purchased_on: row.purchased_on,
            },
        }))
    }

    async fn search_flights(
        &self,
        filter: &FlightFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<FlightSummary>, StoreError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM (");
        qb.push(SUMMARY_SELECT);
        qb.push(") q WHERE 1=1");

        if let Some(origin) = &filter.origin {
            qb.push(" AND q.origin = ");
            qb.push_bind(origin);
        }
        if let Some(destination) = &filter.destination {
            qb.push(" AND q.destination = ");
            qb.push_bind(destination);
        }
        if let Some(date) = filter.departs_on {
            qb.push(" AND (q.departure AT TIME ZONE 'UTC')::date = ");
            qb.push_bind(date);
        }
        if let Some(status) = filter.status {
            qb.push(" AND q.status = ");
            qb.push_bind(status.as_str());
        }
        if filter.only_bookable {
            qb.push(" AND q.status = 'ACTIVE' AND q.available_seats > 0 AND q.departure > ");
            qb.push_bind(now);
        }
        qb.push(" ORDER BY q.departure");

        let rows: Vec<FlightSummaryRow> = qb
            .build_query_as()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx)?;

        rows.into_iter()
            .map(|row| {
                Ok(FlightSummary {
                    id: row.id,
                    origin: row.origin,
                    destination: row.destination,
                    duration_minutes: row.duration_minutes,
                    tail_number: row.tail_number,
                    departure: row.departure,
                    effective_arrival: row.effective_arrival,
                    status: parse_flight_status(&row.status)?,
                    economy_price_cents: row.economy_price_cents,
                    business_price_cents: row.business_price_cents,
                    available_seats: row.available_seats,
                })
            })
            .collect()
    }

    async fn flights_with_status(
        &self,
        statuses: &[FlightStatus],
    ) -> Result<Vec<Flight>, StoreError> {
        let wanted: Vec<String> = statuses.iter().map(|s| s.as_str().to_string()).collect();
        let rows: Vec<FlightRow> = sqlx::query_as(
            "SELECT id, route_id, tail_number, departure, arrival, status, economy_price_cents, business_price_cents \
             FROM flights WHERE status = ANY($1) ORDER BY id",
        )
        .bind(&wanted)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx)?;
        rows.into_iter().map(FlightRow::into_flight).collect()
    }

    async fn set_flight_status(&self, id: i64, status: FlightStatus) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE flights SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn occupied_seat_count(&self, id: i64) -> Result<i64, StoreError> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM reserved_seats rs \
             JOIN bookings b ON b.reference = rs.booking_ref \
             WHERE rs.flight_id = $1 AND b.status = 'ACTIVE'",
        )
        .bind(id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx)
    }

    async fn chain_tail(&self, resource: &ResourceRef) -> Result<Option<ChainTail>, StoreError> {
        let row: Option<ChainTailRow> = match resource {
            ResourceRef::Aircraft(tail_number) => {
                sqlx::query_as(
                    "SELECT r.destination, \
                            COALESCE(f.arrival, f.departure + make_interval(mins => r.duration_minutes)) AS effective_arrival \
                     FROM flights f JOIN routes r ON r.id = f.route_id \
                     WHERE f.tail_number = $1 AND f.status <> 'CANCELLED' \
                     ORDER BY effective_arrival DESC LIMIT 1",
                )
                .bind(tail_number)
                .fetch_optional(self.pool())
                .await
            }
            ResourceRef::Crew(role, employee_id) => {
                sqlx::query_as(
                    "SELECT r.destination, \
                            COALESCE(f.arrival, f.departure + make_interval(mins => r.duration_minutes)) AS effective_arrival \
                     FROM flight_crew fc \
                     JOIN flights f ON f.id = fc.flight_id \
                     JOIN routes r ON r.id = f.route_id \
                     WHERE fc.employee_id = $1 AND fc.role = $2 AND f.status <> 'CANCELLED' \
                     ORDER BY effective_arrival DESC LIMIT 1",
                )
                .bind(employee_id)
                .bind(role.as_str())
                .fetch_optional(self.pool())
                .await
            }
        }
        .map_err(map_sqlx)?;

        Ok(row.map(|r| ChainTail {
            destination: r.destination,
            effective_arrival: r.effective_arrival,
        }))
    }

    async fn has_overlapping_assignment(
        &self,
        resource: &ResourceRef,
        window: &TimeWindow,
    ) -> Result<bool, StoreError> {
        // Half-open intervals: departure < window.end AND arrival > start.
        match resource {
            ResourceRef::Aircraft(tail_number) => sqlx::query_scalar(
                "SELECT EXISTS ( \
                     SELECT 1 FROM flights f JOIN routes r ON r.id = f.route_id \
                     WHERE f.tail_number = $1 AND f.status <> 'CANCELLED' \
                       AND f.departure < $3 \
                       AND COALESCE(f.arrival, f.departure + make_interval(mins => r.duration_minutes)) > $2)",
            )
            .bind(tail_number)
            .bind(window.start)
            .bind(window.end)
            .fetch_one(self.pool())
            .await,
            ResourceRef::Crew(role, employee_id) => sqlx::query_scalar(
                "SELECT EXISTS ( \
                     SELECT 1 FROM flight_crew fc \
                     JOIN flights f ON f.id = fc.flight_id \
                     JOIN routes r ON r.id = f.route_id \
                     WHERE fc.employee_id = $1 AND fc.role = $2 AND f.status <> 'CANCELLED' \
                       AND f.departure < $4 \
                       AND COALESCE(f.arrival, f.departure + make_interval(mins => r.duration_minutes)) > $3)",
            )
            .bind(employee_id)
            .bind(role.as_str())
            .bind(window.start)
            .bind(window.end)
            .fetch_one(self.pool())
            .await,
        }
        .map_err(map_sqlx)
    }

    async fn crew_on_flight(&self, id: i64, role: CrewRole) -> Result<Vec<String>, StoreError> {
        sqlx::query_scalar(
            "SELECT employee_id FROM flight_crew WHERE flight_id = $1 AND role = $2 ORDER BY employee_id",
        )
        .bind(id)
        .bind(role.as_str())
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx)
    }
}
