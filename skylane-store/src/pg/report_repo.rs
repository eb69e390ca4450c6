use async_trait::async_trait;
use skylane_core::gateway::{CabinRevenue, MonthlyCancellationRate};
use skylane_core::{ReportStore, StoreError};

use super::{map_sqlx, parse_class, PgStore};

#[derive(sqlx::FromRow)]
struct CancellationRow {
    month: String,
    total_bookings: i64,
    cancelled: i64,
}

#[derive(sqlx::FromRow)]
struct RevenueRow {
    class: String,
    revenue_cents: i64,
}

#[async_trait]
impl ReportStore for PgStore {
    async fn monthly_cancellation_rates(
        &self,
    ) -> Result<Vec<MonthlyCancellationRate>, StoreError> {
        let rows: Vec<CancellationRow> = sqlx::query_as(
            "SELECT to_char(created_at, 'YYYY-MM') AS month, \
                    COUNT(*) AS total_bookings, \
                    COUNT(*) FILTER (WHERE status IN ('CANCELLED_BY_CUSTOMER', 'CANCELLED_BY_SYSTEM')) AS cancelled \
             FROM bookings GROUP BY 1 ORDER BY 1 DESC",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx)?;

        Ok(rows
            .into_iter()
            .map(|r| MonthlyCancellationRate {
                rate_pct: r.cancelled as f64 * 100.0 / r.total_bookings as f64,
                month: r.month,
                total_bookings: r.total_bookings,
                cancelled: r.cancelled,
            })
            .collect())
    }

    async fn average_occupancy_pct(&self) -> Result<Option<f64>, StoreError> {
        sqlx::query_scalar(
            "SELECT AVG(occ.occupied * 100.0 / occ.total)::float8 \
             FROM ( \
                 SELECT f.id, \
                        (SELECT COUNT(*) FROM seats s WHERE s.tail_number = f.tail_number) AS total, \
                        (SELECT COUNT(*) FROM reserved_seats rs \
                         JOIN bookings b ON b.reference = rs.booking_ref \
                         WHERE rs.flight_id = f.id AND b.status = 'PERFORMED') AS occupied \
                 FROM flights f WHERE f.status = 'PERFORMED' \
             ) occ WHERE occ.total > 0",
        )
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx)
    }

    async fn revenue_by_cabin(&self) -> Result<Vec<CabinRevenue>, StoreError> {
        let rows: Vec<RevenueRow> = sqlx::query_as(
            "SELECT s.class, \
                    COALESCE(SUM(CASE WHEN s.class = 'BUSINESS' THEN f.business_price_cents \
                                      ELSE f.economy_price_cents END), 0)::int8 AS revenue_cents \
             FROM reserved_seats rs \
             JOIN bookings b ON b.reference = rs.booking_ref AND b.status IN ('ACTIVE', 'PERFORMED') \
             JOIN flights f ON f.id = rs.flight_id \
             JOIN seats s ON s.tail_number = rs.tail_number AND s.row_num = rs.row_num AND s.col = rs.col \
             GROUP BY s.class ORDER BY revenue_cents DESC",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx)?;

        rows.into_iter()
            .map(|r| {
                Ok(CabinRevenue {
                    class: parse_class(&r.class)?,
                    revenue_cents: r.revenue_cents,
                })
            })
            .collect()
    }
}
