//! Infrastructure error mapping

pub mod conversions;

pub use conversions::InfraError;
pub(crate) use conversions::domain;
