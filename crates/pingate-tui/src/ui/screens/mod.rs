//! Screen modules for different views

pub mod dashboard;
pub mod pin_entry;
pub mod reset;
