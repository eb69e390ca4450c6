use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Base customer record. Guests get one of these at checkout; registered
/// customers additionally carry credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredCustomer {
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub registered_on: NaiveDate,
}

/// Back-office user, identified by employee id rather than email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manager {
    pub employee_id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}
