use async_trait::async_trait;
use skylane_core::{RouteStore, StoreError};
use skylane_shared::Route;

use super::{map_sqlx, PgStore};

#[derive(sqlx::FromRow)]
struct RouteRow {
    id: i64,
    origin: String,
    destination: String,
    duration_minutes: i32,
}

impl From<RouteRow> for Route {
    fn from(row: RouteRow) -> Self {
        Route {
            id: row.id,
            origin: row.origin,
            destination: row.destination,
            duration_minutes: row.duration_minutes,
        }
    }
}

#[async_trait]
impl RouteStore for PgStore {
    async fn insert_route(
        &self,
        origin: &str,
        destination: &str,
        duration_minutes: i32,
    ) -> Result<i64, StoreError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO routes (origin, destination, duration_minutes) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(origin)
        .bind(destination)
        .bind(duration_minutes)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx)?;
        Ok(id)
    }

    async fn route(&self, id: i64) -> Result<Option<Route>, StoreError> {
        let row: Option<RouteRow> = sqlx::query_as(
            "SELECT id, origin, destination, duration_minutes FROM routes WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx)?;
        Ok(row.map(Route::from))
    }

    async fn list_routes(&self) -> Result<Vec<Route>, StoreError> {
        let rows: Vec<RouteRow> = sqlx::query_as(
            "SELECT id, origin, destination, duration_minutes FROM routes ORDER BY id",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx)?;
        Ok(rows.into_iter().map(Route::from).collect())
    }
}
