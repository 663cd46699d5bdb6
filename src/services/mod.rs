// Provider-facing services. Each is built once at startup and shared through
// the router state; none keeps global state.

pub mod currency_service;
pub mod flight_service;
pub mod hotel_service;
pub mod location_service;
pub mod places_service;
pub mod transfer_service;

pub use currency_service::CurrencyService;
pub use flight_service::{FlightSearchParams, FlightService};
pub use hotel_service::{HotelSearchParams, HotelSearchResult, HotelService, StayParams};
pub use location_service::LocationService;
pub use places_service::{PlacePhoto, PlacesService};
pub use transfer_service::TransferService;
