pub mod airports;
pub mod layout;
pub mod routes;

pub use airports::validate_airport_code;
pub use layout::SeatLayoutSpec;
pub use routes::validate_route;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("invalid airport code {0:?}: expected 3 uppercase ASCII letters")]
    BadAirportCode(String),

    #[error("route origin and destination must differ")]
    SelfLoopRoute,

    #[error("route duration must be positive, got {0}")]
    BadDuration(i32),

    #[error("invalid seat layout: {0}")]
    BadLayout(String),
}
