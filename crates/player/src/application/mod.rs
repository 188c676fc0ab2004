//! Application layer - use cases driven by the UI

pub mod services;
