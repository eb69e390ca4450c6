use crate::CatalogError;

/// IATA-style location codes: exactly three uppercase ASCII letters.
pub fn validate_airport_code(code: &str) -> Result<(), CatalogError> {
    let ok = code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase());
    if ok {
        Ok(())
    } else {
        Err(CatalogError::BadAirportCode(code.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_three_uppercase_letters() {
        assert!(validate_airport_code("TLV").is_ok());
        assert!(validate_airport_code("JFK").is_ok());
    }

    #[test]
    fn test_rejects_malformed_codes() {
        for bad in ["", "TL", "TLVX", "tlv", "T1V", "T-V"] {
            assert!(validate_airport_code(bad).is_err(), "{bad:?} passed");
        }
    }
}
