pub mod auth;
pub mod places;
pub mod revocation;
pub mod sms;

pub use auth::{AuthService, AuthSettings, AuthenticatedUser};
pub use places::{FoursquareClient, Place, PlaceSearchQuery, PlacesClient};
pub use revocation::{InMemoryRevocationStore, RevocationStore};
pub use sms::{OrangeSmsClient, SmsGateway};
