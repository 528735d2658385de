//! Output of retrieved record sets.
//!
//! # Submodules
//!
//! - [`json`]: Serializes records as a JSON array, to a file or a string
//! - [`table`]: Renders records as an aligned plain-text table for the terminal
//!
//! Both emit the declared columns of the record kind, in order.

pub mod json;
pub mod table;
