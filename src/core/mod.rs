//! Core module: Priority-Aware Ring Buffer
//!
//! Prinsip desain:
//! - Fixed-Capacity: Storage dialokasi sekali, tidak pernah tumbuh
//! - Priority-Aware: Item high-priority menang saat ruang diperebutkan
//! - Mutual Exclusion: Satu lock melindungi seluruh state transition

mod priority;
mod ring_buffer;
mod stats;

pub use priority::{Prioritized, Priority};
pub use ring_buffer::PriorityRingBuffer;
pub use stats::{BufferStats, StatsSnapshot};
