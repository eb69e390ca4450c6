use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::InvalidTransition;

/// Booking lifecycle status. Transitions only move forward out of Active;
/// every other state is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Active,
    Performed,
    CancelledByCustomer,
    CancelledBySystem,
}

impl BookingStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, BookingStatus::Active)
    }

    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(self, BookingStatus::Active) && !matches!(next, BookingStatus::Active)
    }

    pub fn transition_to(&self, next: BookingStatus) -> Result<BookingStatus, InvalidTransition> {
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
            BookingStatus::Active => "ACTIVE",
            BookingStatus::Performed => "PERFORMED",
            BookingStatus::CancelledByCustomer => "CANCELLED_BY_CUSTOMER",
            BookingStatus::CancelledBySystem => "CANCELLED_BY_SYSTEM",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(BookingStatus::Active),
            "PERFORMED" => Some(BookingStatus::Performed),
            "CANCELLED_BY_CUSTOMER" => Some(BookingStatus::CancelledByCustomer),
            "CANCELLED_BY_SYSTEM" => Some(BookingStatus::CancelledBySystem),
            _ => None,
        }
    }
}

/// A customer's claim on seats for one flight, identified by an 8-character
/// reference handed to the customer at checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub reference: String,
    pub customer_email: String,
    pub flight_id: i64,
    pub total_price_cents: i32,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_moves_forward_only() {
        assert!(BookingStatus::Active
            .transition_to(BookingStatus::Performed)
            .is_ok());
        assert!(BookingStatus::Active
            .transition_to(BookingStatus::CancelledByCustomer)
            .is_ok());
        assert!(BookingStatus::Active
            .transition_to(BookingStatus::CancelledBySystem)
            .is_ok());
    }

    #[test]
    fn test_no_transition_out_of_terminal_states() {
        for terminal in [
            BookingStatus::Performed,
            BookingStatus::CancelledByCustomer,
            BookingStatus::CancelledBySystem,
        ] {
            assert!(terminal.transition_to(BookingStatus::Active).is_err());
            assert!(terminal.transition_to(BookingStatus::Performed).is_err());
        }
    }
}
