use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CrewRole {
    Pilot,
    Attendant,
}

impl CrewRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrewRole::Pilot => "PILOT",
            CrewRole::Attendant => "ATTENDANT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PILOT" => Some(CrewRole::Pilot),
            "ATTENDANT" => Some(CrewRole::Attendant),
            _ => None,
        }
    }
}

/// A pilot or flight attendant. The qualification flag gates long-haul
/// assignments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewMember {
    pub employee_id: String,
    pub role: CrewRole,
    pub first_name: String,
    pub last_name: String,
    pub long_haul_qualified: bool,
    pub hired_on: NaiveDate,
}
