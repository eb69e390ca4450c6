pub mod error;
pub mod filter;
pub mod gateway;

pub use error::{Error, StoreError};
pub use filter::{FlightFilter, FlightSummary};
pub use gateway::{
    BookingStore, ChainTail, CrewStore, CustomerStore, Datastore, FleetStore, FlightDetails,
    FlightStore, NewBooking, NewFlight, ResourceRef, ReportStore, RouteStore, TimeWindow,
};
