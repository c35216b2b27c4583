//! Platform abstraction layer
//!
//! Host-independent pieces both the browser and the headless host use:
//! - Input mapping (keys / pointer to start or jump)
//! - Frame timing (measured frame time to fixed steps)

pub mod input;
pub mod time;

pub use input::{Action, InputLatch, is_action_key};
pub use time::FrameClock;
