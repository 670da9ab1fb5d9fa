//! Portal adapters
//!
//! [`TransportClient`] owns signing and envelope decoding; the two gateways
//! implement the core ports on top of it.

pub mod passport;
pub mod takumi;
pub mod transport;

pub use passport::HttpPassportGateway;
pub use takumi::HttpClaimGateway;
pub use transport::{Envelope, HeaderFamily, Host, TransportClient};
