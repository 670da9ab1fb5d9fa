//! Daily claim protocol

pub mod ports;
pub mod service;

pub use ports::ClaimGateway;
pub use service::ClaimProtocol;
