use async_trait::async_trait;
use chrono::NaiveDate;
use skylane_core::{CustomerStore, StoreError};
use skylane_shared::{Customer, Manager, RegisteredCustomer};

use super::{map_sqlx, PgStore};

#[derive(sqlx::FromRow)]
struct CustomerRow {
    email: String,
    first_name: String,
    last_name: String,
}

#[derive(sqlx::FromRow)]
struct RegisteredRow {
    email: String,
    password_hash: String,
    registered_on: NaiveDate,
}

#[derive(sqlx::FromRow)]
struct ManagerRow {
    employee_id: String,
    first_name: String,
    last_name: String,
    password_hash: String,
}

#[async_trait]
impl CustomerStore for PgStore {
    async fn customer(&self, email: &str) -> Result<Option<Customer>, StoreError> {
        let row: Option<CustomerRow> =
            sqlx::query_as("SELECT email, first_name, last_name FROM customers WHERE email = $1")
                .bind(email)
                .fetch_optional(self.pool())
                .await
                .map_err(map_sqlx)?;
        Ok(row.map(|r| Customer {
            email: r.email,
            first_name: r.first_name,
            last_name: r.last_name,
        }))
    }

    async fn upsert_customer(
        &self,
        email: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO customers (email, first_name, last_name) VALUES ($1, $2, $3) \
             ON CONFLICT (email) DO NOTHING",
        )
        .bind(email)
        .bind(first_name)
        .bind(last_name)
        .execute(self.pool())
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn register_customer(&self, customer: &RegisteredCustomer) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO registered_customers (email, password_hash, registered_on) VALUES ($1, $2, $3)",
        )
        .bind(&customer.email)
        .bind(&customer.password_hash)
        .bind(customer.registered_on)
        .execute(self.pool())
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn find_registered_customer(
        &self,
        email: &str,
    ) -> Result<Option<RegisteredCustomer>, StoreError> {
        let row: Option<RegisteredRow> = sqlx::query_as(
            "SELECT email, password_hash, registered_on FROM registered_customers WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx)?;
        Ok(row.map(|r| RegisteredCustomer {
            email: r.email,
            password_hash: r.password_hash,
            registered_on: r.registered_on,
        }))
    }

    async fn insert_manager(&self, manager: &Manager) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO managers (employee_id, first_name, last_name, password_hash) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(&manager.employee_id)
        .bind(&manager.first_name)
        .bind(&manager.last_name)
        .bind(&manager.password_hash)
        .execute(self.pool())
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn find_manager(&self, employee_id: &str) -> Result<Option<Manager>, StoreError> {
        let row: Option<ManagerRow> = sqlx::query_as(
            "SELECT employee_id, first_name, last_name, password_hash FROM managers WHERE employee_id = $1",
        )
        .bind(employee_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx)?;
        Ok(row.map(|r| Manager {
            employee_id: r.employee_id,
            first_name: r.first_name,
            last_name: r.last_name,
            password_hash: r.password_hash,
        }))
    }
}
