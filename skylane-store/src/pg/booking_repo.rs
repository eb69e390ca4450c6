use async_trait::async_trait;
use chrono::{DateTime, Utc};
use skylane_core::{BookingStore, NewBooking, StoreError};
use skylane_shared::{Booking, BookingStatus, SeatRef};

use super::{map_sqlx, parse_booking_status, PgStore};

#[derive(sqlx::FromRow)]
struct BookingRow {
    reference: String,
    customer_email: String,
    flight_id: i64,
    total_price_cents: i32,
    status: String,
    created_at: DateTime<Utc>,
}

impl BookingRow {
    fn into_booking(self) -> Result<Booking, StoreError> {
        Ok(Booking {
            reference: self.reference,
            customer_email: self.customer_email,
            flight_id: self.flight_id,
            total_price_cents: self.total_price_cents,
            status: parse_booking_status(&self.status)?,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SeatRefRow {
    row_num: i32,
    col: String,
}

impl From<SeatRefRow> for SeatRef {
    fn from(row: SeatRefRow) -> Self {
        SeatRef {
            row: row.row_num,
            column: row.col,
        }
    }
}

const BOOKING_SELECT: &str =
    "SELECT reference, customer_email, flight_id, total_price_cents, status, created_at FROM bookings";

#[async_trait]
impl BookingStore for PgStore {
    async fn insert_booking(
        &self,
        booking: &NewBooking,
        seats: &[SeatRef],
    ) -> Result<(), StoreError> {
        let mut tx = self.pool().begin().await.map_err(map_sqlx)?;

        sqlx::query(
            "INSERT INTO bookings (reference, customer_email, flight_id, total_price_cents, status) \
             VALUES ($1, $2, $3, $4, 'ACTIVE')",
        )
        .bind(&booking.reference)
        .bind(&booking.customer_email)
        .bind(booking.flight_id)
        .bind(booking.total_price_cents)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx)?;

        let tail_number: String =
            sqlx::query_scalar("SELECT tail_number FROM flights WHERE id = $1")
                .bind(booking.flight_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(map_sqlx)?;

        // The UNIQUE (flight_id, row_num, col) index turns a lost seat race
        // into a Conflict that rolls back the whole booking.
        for seat in seats {
            sqlx::query(
                "INSERT INTO reserved_seats (booking_ref, flight_id, tail_number, row_num, col) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(&booking.reference)
            .bind(booking.flight_id)
            .bind(&tail_number)
            .bind(seat.row)
            .bind(&seat.column)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx)?;
        }

        tx.commit().await.map_err(map_sqlx)?;
        Ok(())
    }

    async fn booking(&self, reference: &str) -> Result<Option<Booking>, StoreError> {
        let row: Option<BookingRow> =
            sqlx::query_as(&format!("{BOOKING_SELECT} WHERE reference = $1"))
                .bind(reference)
                .fetch_optional(self.pool())
                .await
                .map_err(map_sqlx)?;
        row.map(BookingRow::into_booking).transpose()
    }

    async fn bookings_for_customer(
        &self,
        email: &str,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, StoreError> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            "{BOOKING_SELECT} WHERE customer_email = $1 AND ($2::text IS NULL OR status = $2) \
             ORDER BY created_at DESC"
        ))
        .bind(email)
        .bind(status.map(|s| s.as_str()))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx)?;
        rows.into_iter().map(BookingRow::into_booking).collect()
    }

    async fn bookings_for_flight(
        &self,
        flight_id: i64,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, StoreError> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            "{BOOKING_SELECT} WHERE flight_id = $1 AND ($2::text IS NULL OR status = $2) \
             ORDER BY created_at"
        ))
        .bind(flight_id)
        .bind(status.map(|s| s.as_str()))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx)?;
        rows.into_iter().map(BookingRow::into_booking).collect()
    }

    async fn active_bookings_on_performed_flights(&self) -> Result<Vec<String>, StoreError> {
        sqlx::query_scalar(
            "SELECT b.reference FROM bookings b \
             JOIN flights f ON f.id = b.flight_id \
             WHERE b.status = 'ACTIVE' AND f.status = 'PERFORMED'",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx)
    }

    async fn update_booking(
        &self,
        reference: &str,
        status: BookingStatus,
        total_price_cents: i32,
    ) -> Result<(), StoreError> {
        let result =
            sqlx::query("UPDATE bookings SET status = $1, total_price_cents = $2 WHERE reference = $3")
                .bind(status.as_str())
                .bind(total_price_cents)
                .bind(reference)
                .execute(self.pool())
                .await
                .map_err(map_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn release_seats(&self, reference: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM reserved_seats WHERE booking_ref = $1")
            .bind(reference)
            .execute(self.pool())
            .await
            .map_err(map_sqlx)?;
        Ok(())
    }

    async fn reserved_seats_for_flight(&self, flight_id: i64) -> Result<Vec<SeatRef>, StoreError> {
        let rows: Vec<SeatRefRow> = sqlx::query_as(
            "SELECT rs.row_num, rs.col FROM reserved_seats rs \
             JOIN bookings b ON b.reference = rs.booking_ref \
             WHERE rs.flight_id = $1 AND b.status = 'ACTIVE' \
             ORDER BY rs.row_num, rs.col",
        )
        .bind(flight_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx)?;
        Ok(rows.into_iter().map(SeatRef::from).collect())
    }

    async fn seats_for_booking(&self, reference: &str) -> Result<Vec<SeatRef>, StoreError> {
        let rows: Vec<SeatRefRow> = sqlx::query_as(
            "SELECT row_num, col FROM reserved_seats WHERE booking_ref = $1 ORDER BY row_num, col",
        )
        .bind(reference)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx)?;
        Ok(rows.into_iter().map(SeatRef::from).collect())
    }
}
