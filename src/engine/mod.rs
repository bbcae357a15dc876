pub mod api;
pub mod engine;
pub mod error;
pub mod identity;
pub mod protocol;
pub mod session;
pub mod transport;
