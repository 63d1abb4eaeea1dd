pub mod backend;
pub mod config;
pub mod discussion;
pub mod error;
pub mod mention;
pub mod participant;
pub mod phase;
pub mod phrase;
pub mod repository;
pub mod resolver;
pub mod role;
pub mod roundtable;
pub mod session;

// Re-export common error type
pub use error::RoundtableError;
pub use roundtable::Roundtable;
