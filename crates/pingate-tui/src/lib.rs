//! Pingate TUI - terminal wallet host for the PIN lock screen
//!
//! The binary arms the session lock on start, shows a dashboard beneath
//! the lock overlay, and offers a standalone "confirm PIN" request and the
//! wallet-reset escape.

pub mod app;
pub mod cli;
pub mod ui;
