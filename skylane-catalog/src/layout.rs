use serde::Deserialize;
use skylane_shared::{AircraftSize, Seat, SeatClass};

use crate::CatalogError;

/// Seat grid requested at aircraft registration. Big aircraft lay Business
/// rows out first, Economy rows continue below; Small aircraft are
/// Economy-only.
#[derive(Debug, Clone, Deserialize)]
pub struct SeatLayoutSpec {
    #[serde(default)]
    pub business_rows: i32,
    #[serde(default)]
    pub business_columns: i32,
    pub economy_rows: i32,
    pub economy_columns: i32,
}

impl SeatLayoutSpec {
    /// Expands the grid into the aircraft's fixed seat map. The map is
    /// created once here and immutable thereafter.
    pub fn build(&self, size: AircraftSize) -> Result<Vec<Seat>, CatalogError> {
        if self.economy_rows <= 0 || self.economy_columns <= 0 {
            return Err(CatalogError::BadLayout(
                "economy section must have at least one row and one column".to_string(),
            ));
        }
        if self.economy_columns > 26 || self.business_columns > 26 {
            return Err(CatalogError::BadLayout(
                "at most 26 columns per section".to_string(),
            ));
        }
        match size {
            AircraftSize::Small => {
                if self.business_rows != 0 || self.business_columns != 0 {
                    return Err(CatalogError::BadLayout(
                        "small aircraft carry no business section".to_string(),
                    ));
                }
            }
            AircraftSize::Big => {
                if self.business_rows <= 0 || self.business_columns <= 0 {
                    return Err(CatalogError::BadLayout(
                        "big aircraft require a business section".to_string(),
                    ));
                }
            }
        }

        let mut seats = Vec::new();
        let mut next_row = 1;

        if size == AircraftSize::Big {
            for row in next_row..next_row + self.business_rows {
                for col in 0..self.business_columns {
                    seats.push(Seat {
                        row,
                        column: column_letter(col),
                        class: SeatClass::Business,
                    });
                }
            }
            next_row += self.business_rows;
        }

        for row in next_row..next_row + self.economy_rows {
            for col in 0..self.economy_columns {
                seats.push(Seat {
                    row,
                    column: column_letter(col),
                    class: SeatClass::Economy,
                });
            }
        }

        Ok(seats)
    }
}

fn column_letter(index: i32) -> String {
    char::from(b'A' + index as u8).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_big_aircraft_business_rows_come_first() {
        let spec = SeatLayoutSpec {
            business_rows: 2,
            business_columns: 2,
            economy_rows: 3,
            economy_columns: 4,
        };
        let seats = spec.build(AircraftSize::Big).unwrap();
        assert_eq!(seats.len(), 2 * 2 + 3 * 4);

        assert_eq!(seats[0].row, 1);
        assert_eq!(seats[0].column, "A");
        assert_eq!(seats[0].class, SeatClass::Business);

        // Economy starts on the row after the business section.
        let first_economy = seats.iter().find(|s| s.class == SeatClass::Economy).unwrap();
        assert_eq!(first_economy.row, 3);
    }

    #[test]
    fn test_small_aircraft_is_economy_only() {
        let spec = SeatLayoutSpec {
            business_rows: 0,
            business_columns: 0,
            economy_rows: 5,
            economy_columns: 3,
        };
        let seats = spec.build(AircraftSize::Small).unwrap();
        assert_eq!(seats.len(), 15);
        assert!(seats.iter().all(|s| s.class == SeatClass::Economy));
    }

    #[test]
    fn test_small_aircraft_rejects_business_section() {
        let spec = SeatLayoutSpec {
            business_rows: 1,
            business_columns: 2,
            economy_rows: 5,
            economy_columns: 3,
        };
        assert!(spec.build(AircraftSize::Small).is_err());
    }

    #[test]
    fn test_big_aircraft_requires_business_section() {
        let spec = SeatLayoutSpec {
            business_rows: 0,
            business_columns: 0,
            economy_rows: 5,
            economy_columns: 3,
        };
        assert!(spec.build(AircraftSize::Big).is_err());
    }
}
