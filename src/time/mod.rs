//! Monotonic timing for frames and hold detection
//!
//! Timestamps are microseconds since a process-wide epoch captured on first
//! use, so they are cheap to copy, totally ordered, and easy to fabricate in
//! tests.

pub mod clock;

pub use clock::{Clock, Timestamp};
