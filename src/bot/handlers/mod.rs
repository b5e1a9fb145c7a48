//! Discord interaction handlers
//!
//! This module provides handlers for non-command interactions such as autocomplete.

/// Autocomplete handlers for areas, products and vehicle types
pub mod autocomplete;
