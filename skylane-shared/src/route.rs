use serde::{Deserialize, Serialize};

/// A route is "long haul" once it exceeds this duration. Long routes demand
/// Big aircraft and long-haul-qualified crew.
pub const LONG_HAUL_MINUTES: i32 = 360;

/// Immutable reference data: an origin/destination pair with a scheduled
/// block time in minutes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub id: i64,
    pub origin: String,
    pub destination: String,
    pub duration_minutes: i32,
}

impl Route {
    pub fn is_long_haul(&self) -> bool {
        self.duration_minutes > LONG_HAUL_MINUTES
    }
}
