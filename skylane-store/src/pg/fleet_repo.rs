use async_trait::async_trait;
use chrono::NaiveDate;
use skylane_core::{FleetStore, StoreError};
use skylane_shared::{Aircraft, Seat};

use super::{map_sqlx, parse_class, parse_size, PgStore};

#[derive(sqlx::FromRow)]
struct AircraftRow {
    tail_number: String,
    size: String,
    manufacturer: String,
    purchased_on: NaiveDate,
}

impl AircraftRow {
    fn into_aircraft(self) -> Result<Aircraft, StoreError> {
        Ok(Aircraft {
            tail_number: self.tail_number,
            size: parse_size(&self.size)?,
            manufacturer: self.manufacturer,
            purchased_on: self.purchased_on,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SeatRow {
    row_num: i32,
    col: String,
    class: String,
}

#[async_trait]
impl FleetStore for PgStore {
    async fn insert_aircraft(&self, aircraft: &Aircraft, seats: &[Seat]) -> Result<(), StoreError> {
        let mut tx = self.pool().begin().await.map_err(map_sqlx)?;

        sqlx::query(
            "INSERT INTO aircraft (tail_number, size, manufacturer, purchased_on) VALUES ($1, $2, $3, $4)",
        )
        .bind(&aircraft.tail_number)
        .bind(aircraft.size.as_str())
        .bind(&aircraft.manufacturer)
        .bind(aircraft.purchased_on)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx)?;

        for seat in seats {
            sqlx::query(
                "INSERT INTO seats (tail_number, row_num, col, class) VALUES ($1, $2, $3, $4)",
            )
            .bind(&aircraft.tail_number)
            .bind(seat.row)
            .bind(&seat.column)
            .bind(seat.class.as_str())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx)?;
        }

        tx.commit().await.map_err(map_sqlx)?;
        Ok(())
    }

    async fn aircraft(&self, tail_number: &str) -> Result<Option<Aircraft>, StoreError> {
        let row: Option<AircraftRow> = sqlx::query_as(
            "SELECT tail_number, size, manufacturer, purchased_on FROM aircraft WHERE tail_number = $1",
        )
        .bind(tail_number)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx)?;
        row.map(AircraftRow::into_aircraft).transpose()
    }

    async fn list_aircraft(&self) -> Result<Vec<Aircraft>, StoreError> {
        let rows: Vec<AircraftRow> = sqlx::query_as(
            "SELECT tail_number, size, manufacturer, purchased_on FROM aircraft ORDER BY tail_number",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx)?;
        rows.into_iter().map(AircraftRow::into_aircraft).collect()
    }

    async fn seat_map(&self, tail_number: &str) -> Result<Vec<Seat>, StoreError> {
        let rows: Vec<SeatRow> = sqlx::query_as(
            "SELECT row_num, col, class FROM seats WHERE tail_number = $1 ORDER BY row_num, col",
        )
        .bind(tail_number)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx)?;
        rows.into_iter()
            .map(|row| {
                Ok(Seat {
                    row: row.row_num,
                    column: row.col,
                    class: parse_class(&row.class)?,
                })
            })
            .collect()
    }

    async fn seat_count(&self, tail_number: &str) -> Result<i64, StoreError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM seats WHERE tail_number = $1")
            .bind(tail_number)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx)
    }
}
