//! Audio Engine Module
//!
//! Buffer and channel-layout types shared by the processor and its host.

pub mod buffer;

pub use buffer::{AudioBuffer, ChannelLayout};
