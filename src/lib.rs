//! `korri-kepler` library: a SAE J1939 request/response node that answers
//! eccentric-anomaly queries on a CAN bus in a `no_std` environment. The crate
//! exposes the infrastructure modules (payload bit access, fixed-point
//! transcoding), the Kepler solver, and the protocol logic (29-bit identifier
//! codec, transport traits, messages, request dispatcher).
#![no_std]
//==================================================================================
// Must stay first: the logging macros are textually scoped.
#[macro_use]
mod logging;
//==================================================================================
/// Domain and low-level errors (payload extraction, serialization,
/// deserialization, dispatcher failures).
pub mod error;
/// Payload bit access and the fixed-point transcoder.
pub mod infra;
/// Newton–Raphson solver for Kepler's equation.
pub mod kepler;
/// J1939 protocol implementation: CAN transport, identifier codec,
/// request/result messages, and the request dispatcher.
pub mod protocol;
//==================================================================================
