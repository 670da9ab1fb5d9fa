//! Macro for implementing Display and FromStr for keyword enums
//!
//! Game identifiers and QR states travel as short lowercase keywords (on the
//! command line, in stored accounts, in portal responses). This macro keeps
//! the keyword table in one place.
//!
//! # Example
//!
//! ```rust
//! use hoyosign_domain::impl_domain_keyword_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Region {
//!     Cn,
//!     Global,
//! }
//!
//! impl_domain_keyword_conversions!(Region {
//!     Cn => "cn",
//!     Global => "global",
//! });
//!
//! assert_eq!("CN".parse::<Region>().unwrap(), Region::Cn);
//! ```

/// Implements Display and FromStr for keyword enums
///
/// - Display writes the keyword
/// - FromStr matches case-insensitively and trims surrounding whitespace;
///   unknown keywords become [`HoyoSignError::Validation`](crate::HoyoSignError)
#[macro_export]
macro_rules! impl_domain_keyword_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Keyword used on the wire and on the command line.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = $crate::errors::HoyoSignError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err($crate::errors::HoyoSignError::Validation(format!(
                        "invalid {}: {}",
                        stringify!($enum_name),
                        s
                    ))),
                }
            }
        }
    };
}
