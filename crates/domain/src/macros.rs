//! Display/FromStr for the lowercase string enums the Admin API uses
//!
//! Ghost sends states such as post status or member status as lowercase
//! strings. Parsing is case-insensitive so values typed by a user (CLI
//! arguments, config files) are accepted too.
//!
//! # Example
//!
//! ```rust
//! use ghostkit_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum MemberStatus {
//!     Free,
//!     Paid,
//!     Comped,
//! }
//!
//! impl_domain_status_conversions!(MemberStatus {
//!     Free => "free",
//!     Paid => "paid",
//!     Comped => "comped",
//! });
//!
//! assert_eq!(MemberStatus::Paid.to_string(), "paid");
//! assert_eq!("COMPED".parse::<MemberStatus>(), Ok(MemberStatus::Comped));
//! ```

/// Implements `Display` (wire string) and `FromStr` (case-insensitive) for
/// a fieldless enum. Unknown strings produce an error naming the enum.
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
