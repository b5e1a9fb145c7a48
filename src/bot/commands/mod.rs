//! Discord command implementations organized by dashboard section.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Login, logout and identity commands
pub mod auth;

/// Complaint review commands
pub mod complaint;

/// Delivery areas, vehicle types and delivery periods
pub mod delivery;

/// Read-only directory commands (support, customers, employees, referrals)
pub mod directory;

/// Product discount commands
pub mod discount;

/// General utility commands
pub mod general;

/// Stock correction commands
pub mod stock;

/// Dashboard user administration
pub mod users;

// Export commands
pub use auth::*;
pub use complaint::*;
pub use delivery::*;
pub use directory::*;
pub use discount::*;
pub use general::*;
pub use stock::*;
pub use users::*;
