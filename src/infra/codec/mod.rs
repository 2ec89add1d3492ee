//! Payload codec: bit-level reader/writer, the `ToPayload` / `FromPayload`
//! contracts, and the fixed-point scaling ("SLOT") of the Kepler fields.
pub mod bits;
pub mod slot;
pub mod traits;
