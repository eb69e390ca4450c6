use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::InvalidTransition;

/// Flight lifecycle status.
///
/// Active ⇄ Full moves are driven by seat occupancy; Performed is reached by
/// time passing and Cancelled by manager action. Both are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlightStatus {
    Active,
    Full,
    Performed,
    Cancelled,
}

impl FlightStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, FlightStatus::Performed | FlightStatus::Cancelled)
    }

    pub fn can_transition_to(&self, next: FlightStatus) -> bool {
        use FlightStatus::*;
        matches!(
            (self, next),
            (Active, Full)
                | (Full, Active)
                | (Active, Performed)
                | (Full, Performed)
                | (Active, Cancelled)
                | (Full, Cancelled)
        )
    }

    /// Validated move; terminal states reject every request, including
    /// self-moves.
    pub fn transition_to(&self, next: FlightStatus) -> Result<FlightStatus, InvalidTransition> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(InvalidTransition {
                from: self.as_str().to_string(),
                to: next.as_str().to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FlightStatus::Active => "ACTIVE",
            FlightStatus::Full => "FULL",
            FlightStatus::Performed => "PERFORMED",
            FlightStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(FlightStatus::Active),
            "FULL" => Some(FlightStatus::Full),
            "PERFORMED" => Some(FlightStatus::Performed),
            "CANCELLED" => Some(FlightStatus::Cancelled),
            _ => None,
        }
    }
}

/// A scheduled flight over a route, flown by one aircraft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flight {
    pub id: i64,
    pub route_id: i64,
    pub tail_number: String,
    pub departure: DateTime<Utc>,
    /// Recorded arrival, when known. Most flights carry none and derive it
    /// from the route's block time.
    pub arrival: Option<DateTime<Utc>>,
    pub status: FlightStatus,
    pub economy_price_cents: i32,
    pub business_price_cents: i32,
}

impl Flight {
    /// Explicit arrival if recorded, else departure plus the route's block
    /// time.
    pub fn effective_arrival(&self, route_duration_minutes: i32) -> DateTime<Utc> {
        self.arrival
            .unwrap_or(self.departure + Duration::minutes(route_duration_minutes as i64))
    }

    /// A customer may only book an Active flight that has not departed.
    pub fn is_bookable(&self, now: DateTime<Utc>) -> bool {
        self.status == FlightStatus::Active && self.departure > now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn flight(arrival: Option<DateTime<Utc>>) -> Flight {
        Flight {
            id: 1,
            route_id: 1,
            tail_number: "4X-EKA".to_string(),
            departure: Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap(),
            arrival,
            status: FlightStatus::Active,
            economy_price_cents: 50_000,
            business_price_cents: 120_000,
        }
    }

    #[test]
    fn test_effective_arrival_derived_from_route() {
        let f = flight(None);
        assert_eq!(
            f.effective_arrival(400),
            Utc.with_ymd_and_hms(2025, 6, 1, 14, 40, 0).unwrap()
        );
    }

    #[test]
    fn test_effective_arrival_prefers_recorded_value() {
        let recorded = Utc.with_ymd_and_hms(2025, 6, 1, 15, 5, 0).unwrap();
        let f = flight(Some(recorded));
        assert_eq!(f.effective_arrival(400), recorded);
    }

    #[test]
    fn test_occupancy_transitions_are_reversible() {
        assert_eq!(
            FlightStatus::Active.transition_to(FlightStatus::Full),
            Ok(FlightStatus::Full)
        );
        assert_eq!(
            FlightStatus::Full.transition_to(FlightStatus::Active),
            Ok(FlightStatus::Active)
        );
    }

    #[test]
    fn test_terminal_states_reject_all_moves() {
        for terminal in [FlightStatus::Performed, FlightStatus::Cancelled] {
            for next in [
                FlightStatus::Active,
                FlightStatus::Full,
                FlightStatus::Performed,
                FlightStatus::Cancelled,
            ] {
                assert!(terminal.transition_to(next).is_err());
            }
        }
    }
}
