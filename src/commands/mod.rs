//! Command implementations

pub mod charge;
pub mod key;
pub mod list;
