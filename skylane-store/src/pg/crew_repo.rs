use async_trait::async_trait;
use chrono::NaiveDate;
use skylane_core::{CrewStore, StoreError};
use skylane_shared::{CrewMember, CrewRole};

use super::{map_sqlx, parse_role, PgStore};

#[derive(sqlx::FromRow)]
struct CrewRow {
    employee_id: String,
    role: String,
    first_name: String,
    last_name: String,
    long_haul_qualified: bool,
    hired_on: NaiveDate,
}

impl CrewRow {
    fn into_member(self) -> Result<CrewMember, StoreError> {
        Ok(CrewMember {
            employee_id: self.employee_id,
            role: parse_role(&self.role)?,
            first_name: self.first_name,
            last_name: self.last_name,
            long_haul_qualified: self.long_haul_qualified,
            hired_on: self.hired_on,
        })
    }
}

#[async_trait]
impl CrewStore for PgStore {
    async fn insert_crew_member(&self, member: &CrewMember) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO crew_members (employee_id, role, first_name, last_name, long_haul_qualified, hired_on) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&member.employee_id)
        .bind(member.role.as_str())
        .bind(&member.first_name)
        .bind(&member.last_name)
        .bind(member.long_haul_qualified)
        .bind(member.hired_on)
        .execute(self.pool())
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn crew_member(&self, employee_id: &str) -> Result<Option<CrewMember>, StoreError> {
        let row: Option<CrewRow> = sqlx::query_as(
            "SELECT employee_id, role, first_name, last_name, long_haul_qualified, hired_on \
             FROM crew_members WHERE employee_id = $1",
        )
        .bind(employee_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx)?;
        row.map(CrewRow::into_member).transpose()
    }

    async fn list_crew(
        &self,
        role: CrewRole,
        qualified_only: bool,
    ) -> Result<Vec<CrewMember>, StoreError> {
        let rows: Vec<CrewRow> = sqlx::query_as(
            "SELECT employee_id, role, first_name, last_name, long_haul_qualified, hired_on \
             FROM crew_members WHERE role = $1 AND (long_haul_qualified OR NOT $2) \
             ORDER BY employee_id",
        )
        .bind(role.as_str())
        .bind(qualified_only)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx)?;
        rows.into_iter().map(CrewRow::into_member).collect()
    }
}
