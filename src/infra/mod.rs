//! Infrastructure shared by the protocol layer: payload bit access, payload
//! traits, and the fixed-point transcoder.
pub mod codec;
