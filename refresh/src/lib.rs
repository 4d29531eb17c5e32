pub mod engine;
pub mod error;
pub mod gate;
pub mod lifecycle;
pub mod schema;
pub mod session;
pub mod statements;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
