//! Moira - Priority-Aware Fixed-Capacity Ring Buffer
//!
//! Shared queue antara producer dan consumer dengan kapasitas tetap.
//! Saat buffer penuh, item high-priority dipertahankan dan item
//! low-priority dikorbankan; item low-priority tidak pernah menggeser
//! item high-priority.
//!
//! Arsitektur:
//! - Fixed-Capacity: Kapasitas compile-time, tidak ada alokasi di hot path
//! - Priority-Aware: Eviction policy berbasis flag prioritas item
//! - Mutual Exclusion: Satu Mutex, operasi linearizable dan bounded O(N)
//!
//! ```
//! use moira::core::{Prioritized, PriorityRingBuffer};
//!
//! let rb: PriorityRingBuffer<Prioritized<&str>, 8> = PriorityRingBuffer::new();
//! rb.insert(Prioritized::low("telemetry"));
//! rb.insert(Prioritized::high("alarm"));
//! assert_eq!(rb.remove().map(|item| item.value), Some("alarm"));
//! ```

pub mod core;
