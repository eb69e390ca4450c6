use crate::airports::validate_airport_code;
use crate::CatalogError;

/// Checks a new route before it enters the catalog. Routes are immutable
/// once created, so this is the only validation point they ever pass.
pub fn validate_route(
    origin: &str,
    destination: &str,
    duration_minutes: i32,
) -> Result<(), CatalogError> {
    validate_airport_code(origin)?;
    validate_airport_code(destination)?;
    if origin == destination {
        return Err(CatalogError::SelfLoopRoute);
    }
    if duration_minutes <= 0 {
        return Err(CatalogError::BadDuration(duration_minutes));
    }
    Ok(())
}
