//! Connection state messaging.
//!
//! The channel manager owns the `watch` sender for [`ConnectionState`]; anything
//! else (runner, tests) observes transitions through a [`ConnectionStateObserver`].

pub mod connection;

pub use connection::{set_connection_state, ConnectionStateObserver};
