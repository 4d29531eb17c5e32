//! Test doubles for the refresh engine.

mod session;

pub use session::*;
