//! Multiplexer configuration.

pub mod schema;

pub use schema::BatchOptions;
