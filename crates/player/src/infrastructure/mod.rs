pub mod message_translator;
pub mod messaging;
pub mod websocket;

pub use message_translator::{parse, parse_with, ProtocolContext};
pub use messaging::ConnectionStateObserver;
pub use websocket::{ChannelManager, ConnectionGuard, ReconnectPolicy};
