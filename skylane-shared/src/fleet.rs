use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AircraftSize {
    Small,
    Big,
}

impl AircraftSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            AircraftSize::Small => "SMALL",
            AircraftSize::Big => "BIG",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SMALL" => Some(AircraftSize::Small),
            "BIG" => Some(AircraftSize::Big),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatClass {
    Economy,
    Business,
}

impl SeatClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeatClass::Economy => "ECONOMY",
            SeatClass::Business => "BUSINESS",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ECONOMY" => Some(SeatClass::Economy),
            "BUSINESS" => Some(SeatClass::Business),
            _ => None,
        }
    }
}

/// An aircraft in the fleet. The seat map is created once at registration
/// and never changes afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Aircraft {
    pub tail_number: String,
    pub size: AircraftSize,
    pub manufacturer: String,
    pub purchased_on: NaiveDate,
}

/// One physical seat in an aircraft's fixed layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub row: i32,
    pub column: String,
    pub class: SeatClass,
}

/// Position of a seat, without its class. Used when selecting or reserving.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeatRef {
    pub row: i32,
    pub column: String,
}

impl SeatRef {
    pub fn label(&self) -> String {
        format!("{}{}", self.row, self.column)
    }
}
