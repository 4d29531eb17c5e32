mod base;
mod connection;
mod refresh;

pub use base::*;
pub use connection::*;
pub use refresh::*;
