//! Domain entities of the police data API.
//!
//! `Force` and `Neighbourhood` are lazy resources addressed by identity.
//! Everything else is built fully hydrated from a JSON object the API has
//! already returned.

mod category;
mod crime;
mod force;
mod location;
mod neighbourhood;
mod polygon;
mod stop;

pub(crate) use crime::outcomes_from_raw;
pub(crate) use force::ForceLink;

pub use category::{ALL_CRIME, CrimeCategory, OutcomeCategory};
pub use crime::{Crime, NoLocationCrime, Outcome};
pub use force::{EngagementMethod, Force, SeniorOfficer};
pub use location::{Location, Street};
pub use neighbourhood::{
    Coordinates, Event, Link, Neighbourhood, NeighbourhoodLocation, Officer, Priority,
    RESERVED_NEIGHBOURHOOD_ID,
};
pub use polygon::encode_polygon;
pub use stop::Stop;
