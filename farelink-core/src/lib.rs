pub mod flight;
pub mod gateway;
pub mod itinerary;
pub mod status;

pub use flight::{
    BaggageInfo, BookingRule, CombinedSearchResult, FareBasisKey, FarePrice, Flight,
    FlightGroup, FlightSearchRequest, FlightSearchResponse, FlightSegment, PaxType,
    PriceTermResponse, SearchLegRequest, SelfInfo,
};
pub use gateway::{FlightSearchPort, GatewayError, ReservationGateway};
pub use itinerary::{CabinClass, ItineraryQuery};
pub use status::{AirlineSearchStatus, AirlineStatus, ProgressiveSearchResults, RunStatus};
