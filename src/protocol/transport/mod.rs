//! J1939 transport layer: CAN frame representation, 29-bit identifier
//! codec, and bus abstraction traits.

pub mod can_frame;
pub mod can_id;
pub mod traits;

/// Back-off applied when a polling driver reports an empty read (ms).
///
/// Keeps a non-blocking receive loop from spinning on an idle bus while
/// staying well under the period of any request a client would issue.
pub const IDLE_POLL_DELAY_MS: u64 = 10;
