//! Framework-agnostic business logic.
//!
//! Nothing here knows about Discord; the bot layer calls these functions and
//! renders their results.

pub mod access;
pub mod complaint;
pub mod delivery;
pub mod discount;
pub mod load;
pub mod pagination;
pub mod reconcile;
pub mod schema;
pub mod session;
pub mod stock;
