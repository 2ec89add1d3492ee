//! High-level components of the Kepler node: request/result messages,
//! the request dispatcher, and the CAN transport.
pub mod messages;
pub mod server;
pub mod transport;
