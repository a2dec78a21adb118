//! Priority-Aware Ring Buffer dengan kapasitas tetap
//!
//! Circular buffer klasik (read index + write index + full flag) dengan
//! kebijakan eviction berbasis prioritas saat ruang diperebutkan:
//! - Item high-priority masuk: semua item low-priority yang resident
//!   dibuang dulu, item high-priority lama dipertahankan dalam urutannya.
//! - Buffer penuh berisi high-priority semua + item baru high-priority:
//!   item tertua diganti.
//! - Buffer penuh berisi high-priority semua + item baru low-priority:
//!   item baru ditolak.
//!
//! Seluruh state dilindungi satu Mutex. API publik mengambil lock untuk
//! durasi penuh operasi; helper eviction internal bekerja di [`RingState`]
//! yang hanya bisa diakses lewat guard yang sudah dipegang, jadi tidak ada
//! jalur re-entrant ke lock yang sama.

use parking_lot::Mutex;

use super::priority::Priority;
use super::stats::BufferStats;

/// Fixed-Capacity Priority Ring Buffer
///
/// Shared queue antara producer dan consumer. Kapasitas `N` ditentukan saat
/// compile time dan tidak pernah berubah; saat penuh, item low-priority
/// dikorbankan untuk item high-priority.
///
/// `insert` dan `remove` memindahkan ownership: buffer memegang satu-satunya
/// salinan item selama resident.
pub struct PriorityRingBuffer<T, const N: usize> {
    state: Mutex<RingState<T, N>>,
    stats: BufferStats,
}

/// State internal di balik lock.
///
/// Semua method di sini mengasumsikan lock buffer sudah dipegang pemanggil;
/// satu-satunya jalan masuk adalah guard milik [`PriorityRingBuffer`].
struct RingState<T, const N: usize> {
    // Slot kosong = None. Slot "stale" setelah clear() juga dianggap tidak
    // valid secara logis walau nilainya belum ditimpa.
    slots: Box<[Option<T>]>,
    read: usize,
    write: usize,
    full: bool,
}

impl<T: Priority, const N: usize> RingState<T, N> {
    fn new() -> Self {
        let mut slots = Vec::with_capacity(N);
        for _ in 0..N {
            slots.push(None);
        }

        Self {
            slots: slots.into_boxed_slice(),
            read: 0,
            write: 0,
            full: false,
        }
    }

    /// Index berikutnya dalam urutan circular.
    #[inline(always)]
    fn advance(idx: usize) -> usize {
        let next = idx + 1;
        if next == N {
            0
        } else {
            next
        }
    }

    #[inline(always)]
    fn is_empty(&self) -> bool {
        !self.full && self.read == self.write
    }

    #[inline(always)]
    fn len(&self) -> usize {
        if self.full {
            N
        } else if self.write >= self.read {
            self.write - self.read
        } else {
            N - self.read + self.write
        }
    }

    /// Tulis item di posisi write. Precondition: buffer tidak penuh.
    fn push_back(&mut self, item: T) {
        self.slots[self.write] = Some(item);
        self.write = Self::advance(self.write);
        self.full = self.write == self.read;
    }

    /// Ambil item tertua. Ini jalur remove non-locking yang juga dipakai
    /// helper eviction saat lock sudah dipegang.
    fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        let item = self.slots[self.read].take();
        self.read = Self::advance(self.read);
        self.full = false;
        item
    }

    /// Buang semua item low-priority yang resident, pertahankan urutan
    /// relatif item high-priority. Returns jumlah item yang dibuang.
    fn purge_low_priority(&mut self) -> u64 {
        let resident = self.len();
        let mut purged = 0u64;

        // Pop tepat `resident` kali; setiap push menulis slot yang sudah
        // dibebaskan pop sebelumnya, jadi write tidak pernah menyusul read.
        for _ in 0..resident {
            if let Some(item) = self.pop_front() {
                if item.is_high_priority() {
                    self.push_back(item);
                } else {
                    purged += 1;
                }
            }
        }

        purged
    }

    /// Cari item low-priority pertama dalam urutan insertion, mulai dari
    /// item tertua di posisi read.
    fn first_low_index(&self) -> Option<usize> {
        let resident = self.len();
        let mut idx = self.read;

        for _ in 0..resident {
            if let Some(item) = &self.slots[idx] {
                if !item.is_high_priority() {
                    return Some(idx);
                }
            }
            idx = Self::advance(idx);
        }

        None
    }

    /// Timpa satu slot saat buffer penuh.
    ///
    /// Saat penuh read == write. Jika slot yang ditimpa adalah posisi
    /// bersama itu (item tertua), item baru menjadi yang termuda: kedua
    /// posisi maju bersama dan buffer tetap penuh. Slot lain ditimpa di
    /// tempat tanpa menggeser posisi.
    fn replace_slot(&mut self, idx: usize, item: T) {
        self.slots[idx] = Some(item);
        if idx == self.write {
            self.write = Self::advance(self.write);
            self.read = Self::advance(self.read);
        }
    }
}

impl<T: Priority, const N: usize> Default for PriorityRingBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Priority, const N: usize> PriorityRingBuffer<T, N> {
    /// Membuat buffer kosong dengan kapasitas `N`.
    ///
    /// Alokasi hanya terjadi sekali di sini; insert/remove tidak pernah
    /// mengalokasi.
    ///
    /// # Panics
    /// Panic jika `N == 0`.
    pub fn new() -> Self {
        assert!(N > 0, "capacity must be non-zero");

        Self {
            state: Mutex::new(RingState::new()),
            stats: BufferStats::new(),
        }
    }

    /// Masukkan item ke buffer (producer side).
    ///
    /// Returns `true` jika item diterima. Satu-satunya kegagalan: item
    /// low-priority saat buffer penuh berisi item high-priority semua -
    /// buffer dibiarkan persis seperti sebelumnya.
    ///
    /// Item high-priority selalu diterima: item low-priority yang resident
    /// dibuang lebih dulu, dan kalau masih penuh (semua high-priority),
    /// item tertua yang dikorbankan.
    pub fn insert(&self, item: T) -> bool {
        let mut state = self.state.lock();

        if item.is_high_priority() {
            let purged = state.purge_low_priority();
            self.stats.record_evicted_low(purged);
        }

        if !state.full {
            state.push_back(item);
            self.stats.record_insert();
            return true;
        }

        // Buffer penuh: scan korban mulai dari item tertua, jadi item
        // low-priority yang paling lama resident dibuang lebih dulu.
        if let Some(idx) = state.first_low_index() {
            state.replace_slot(idx, item);
            self.stats.record_evicted_low(1);
            self.stats.record_insert();
            return true;
        }

        if item.is_high_priority() {
            // Seisi buffer high-priority: FIFO antar prioritas setara,
            // item tertua diganti dan buffer tetap penuh.
            let oldest = state.read;
            state.replace_slot(oldest, item);
            self.stats.record_evicted_high();
            self.stats.record_insert();
            return true;
        }

        self.stats.record_rejected();
        false
    }

    /// Ambil item tertua dari buffer (consumer side).
    ///
    /// Returns `None` jika buffer kosong.
    pub fn remove(&self) -> Option<T> {
        let mut state = self.state.lock();

        let item = state.pop_front();
        if item.is_some() {
            self.stats.record_remove();
        }
        item
    }

    /// Cek apakah buffer kosong.
    pub fn is_empty(&self) -> bool {
        self.state.lock().is_empty()
    }

    /// Cek apakah buffer penuh.
    pub fn is_full(&self) -> bool {
        self.state.lock().full
    }

    /// Jumlah item yang resident saat ini.
    pub fn len(&self) -> usize {
        self.state.lock().len()
    }

    /// Kapasitas buffer.
    #[inline(always)]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Kosongkan buffer.
    ///
    /// Posisi read/write direset dan full flag dibersihkan. Nilai yang
    /// tersimpan tidak di-drop di sini; slot stale ditimpa oleh insert
    /// berikutnya.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.read = 0;
        state.write = 0;
        state.full = false;
    }

    /// Counter operasi buffer.
    pub fn stats(&self) -> &BufferStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Prioritized;

    fn low(n: u32) -> Prioritized<u32> {
        Prioritized::low(n)
    }

    fn high(n: u32) -> Prioritized<u32> {
        Prioritized::high(n)
    }

    fn drain<const N: usize>(rb: &PriorityRingBuffer<Prioritized<u32>, N>) -> Vec<u32> {
        let mut out = Vec::new();
        while let Some(item) = rb.remove() {
            out.push(item.value);
        }
        out
    }

    #[test]
    fn test_basic_insert_remove() {
        let rb: PriorityRingBuffer<Prioritized<u32>, 16> = PriorityRingBuffer::new();

        assert!(rb.is_empty());
        assert!(!rb.is_full());

        assert!(rb.insert(low(42)));
        assert!(!rb.is_empty());
        assert_eq!(rb.len(), 1);

        assert_eq!(rb.remove(), Some(low(42)));
        assert!(rb.is_empty());
    }

    #[test]
    fn test_full_exactly_at_capacity() {
        let rb: PriorityRingBuffer<Prioritized<u32>, 4> = PriorityRingBuffer::new();

        for i in 0..3 {
            assert!(rb.insert(low(i)));
            assert!(!rb.is_full());
        }
        assert!(rb.insert(low(3)));
        assert!(rb.is_full());
        assert_eq!(rb.len(), 4);

        // Full flag bertahan sampai ada remove
        assert!(rb.is_full());
        rb.remove();
        assert!(!rb.is_full());
        assert_eq!(rb.len(), 3);
    }

    #[test]
    fn test_fifo_round_trip() {
        let rb: PriorityRingBuffer<Prioritized<u32>, 8> = PriorityRingBuffer::new();

        for i in 0..8 {
            assert!(rb.insert(low(i)));
        }
        assert_eq!(drain(&rb), vec![0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_remove_empty_then_insert() {
        let rb: PriorityRingBuffer<Prioritized<u32>, 4> = PriorityRingBuffer::new();

        assert_eq!(rb.remove(), None);
        assert!(rb.is_empty());

        // Insert pertama setelah kegagalan remove tetap FIFO normal
        assert!(rb.insert(low(7)));
        assert_eq!(rb.remove(), Some(low(7)));
        assert_eq!(rb.remove(), None);
    }

    #[test]
    fn test_wraparound() {
        let rb: PriorityRingBuffer<Prioritized<u32>, 4> = PriorityRingBuffer::new();

        // Fill dan drain berulang untuk melewati batas index
        for round in 0..10 {
            for i in 0..4 {
                assert!(rb.insert(low(round * 4 + i)));
            }
            for i in 0..4 {
                assert_eq!(rb.remove(), Some(low(round * 4 + i)));
            }
        }
    }

    #[test]
    fn test_high_insert_purges_resident_lows() {
        let rb: PriorityRingBuffer<Prioritized<u32>, 4> = PriorityRingBuffer::new();

        assert!(rb.insert(low(0)));
        assert!(rb.insert(low(1)));
        assert!(rb.insert(high(2)));

        // Kedua item low dibuang walau buffer belum penuh
        assert_eq!(rb.len(), 1);
        assert_eq!(drain(&rb), vec![2]);
        assert_eq!(rb.stats().snapshot().evicted_low, 2);
    }

    #[test]
    fn test_high_insert_keeps_resident_highs_in_order() {
        let rb: PriorityRingBuffer<Prioritized<u32>, 4> = PriorityRingBuffer::new();

        assert!(rb.insert(high(0)));
        assert!(rb.insert(low(1)));
        assert!(rb.insert(high(2)));

        // Low di tengah dibuang, urutan relatif item high dipertahankan
        assert_eq!(drain(&rb), vec![0, 2]);
    }

    #[test]
    fn test_full_all_high_new_high_evicts_oldest() {
        let rb: PriorityRingBuffer<Prioritized<u32>, 3> = PriorityRingBuffer::new();

        for i in 0..3 {
            assert!(rb.insert(high(i)));
        }
        assert!(rb.is_full());

        assert!(rb.insert(high(3)));
        assert!(rb.is_full());
        assert_eq!(drain(&rb), vec![1, 2, 3]);
        assert_eq!(rb.stats().snapshot().evicted_high, 1);
    }

    #[test]
    fn test_full_all_high_new_low_rejected() {
        let rb: PriorityRingBuffer<Prioritized<u32>, 3> = PriorityRingBuffer::new();

        for i in 0..3 {
            assert!(rb.insert(high(i)));
        }

        assert!(!rb.insert(low(99)));

        // Buffer tidak berubah sama sekali
        assert!(rb.is_full());
        assert_eq!(rb.len(), 3);
        assert_eq!(drain(&rb), vec![0, 1, 2]);
        assert_eq!(rb.stats().snapshot().rejected, 1);
    }

    #[test]
    fn test_full_all_low_new_low_replaces_oldest() {
        let rb: PriorityRingBuffer<Prioritized<u32>, 3> = PriorityRingBuffer::new();

        for i in 0..3 {
            assert!(rb.insert(low(i)));
        }
        assert!(rb.is_full());

        // Item low paling lama resident yang dikorbankan
        assert!(rb.insert(low(3)));
        assert!(rb.is_full());
        assert_eq!(drain(&rb), vec![1, 2, 3]);
    }

    #[test]
    fn test_full_mixed_new_low_replaces_first_low_in_place() {
        let rb: PriorityRingBuffer<Prioritized<u32>, 3> = PriorityRingBuffer::new();

        assert!(rb.insert(high(0)));
        assert!(rb.insert(low(1)));
        assert!(rb.insert(low(2)));
        assert!(rb.is_full());

        // Scan dari posisi read: item 0 high dilewati, item 1 adalah low
        // pertama dan ditimpa di tempat; posisi item lain tidak bergeser.
        assert!(rb.insert(low(3)));
        assert_eq!(drain(&rb), vec![0, 3, 2]);
    }

    #[test]
    fn test_clear_resets_state() {
        let rb: PriorityRingBuffer<Prioritized<u32>, 4> = PriorityRingBuffer::new();

        for i in 0..4 {
            rb.insert(low(i));
        }
        assert!(rb.is_full());

        rb.clear();
        assert!(rb.is_empty());
        assert!(!rb.is_full());
        assert_eq!(rb.len(), 0);
        assert_eq!(rb.remove(), None);

        // Kapasitas penuh tersedia lagi setelah clear
        for i in 10..14 {
            assert!(rb.insert(low(i)));
        }
        assert!(rb.is_full());
        assert_eq!(drain(&rb), vec![10, 11, 12, 13]);
    }

    #[test]
    fn test_capacity_one() {
        let rb: PriorityRingBuffer<Prioritized<u32>, 1> = PriorityRingBuffer::new();

        assert!(rb.insert(low(0)));
        assert!(rb.is_full());

        // Low menggantikan low saat penuh
        assert!(rb.insert(low(1)));
        assert_eq!(rb.len(), 1);

        // High membuang low
        assert!(rb.insert(high(2)));
        assert!(rb.is_full());

        // Low ditolak oleh buffer penuh high
        assert!(!rb.insert(low(3)));

        // High menggantikan high tertua
        assert!(rb.insert(high(4)));
        assert_eq!(drain(&rb), vec![4]);
    }

    #[test]
    fn test_eviction_after_wraparound() {
        let rb: PriorityRingBuffer<Prioritized<u32>, 4> = PriorityRingBuffer::new();

        // Geser posisi read/write melewati batas sebelum skenario eviction
        for i in 0..3 {
            rb.insert(low(i));
            rb.remove();
        }

        assert!(rb.insert(high(10)));
        assert!(rb.insert(low(11)));
        assert!(rb.insert(low(12)));
        assert!(rb.insert(high(13)));

        // High ke-13 membuang low 11 dan 12, sisanya [10, 13]
        assert_eq!(rb.len(), 2);
        assert_eq!(drain(&rb), vec![10, 13]);
    }

    #[test]
    fn test_stats_conservation() {
        let rb: PriorityRingBuffer<Prioritized<u32>, 4> = PriorityRingBuffer::new();

        for i in 0..4 {
            rb.insert(low(i));
        }
        rb.insert(low(4)); // evict low tertua
        rb.insert(high(5)); // purge 4 low yang resident
        rb.insert(high(6));
        rb.insert(low(7)); // masih ada slot kosong
        rb.remove();
        rb.remove();

        let snap = rb.stats().snapshot();
        let resident = rb.len() as u64;

        assert_eq!(snap.rejected, 0);
        assert_eq!(snap.inserted, 8);
        assert_eq!(snap.evicted_low, 5);
        assert_eq!(snap.inserted, snap.removed + snap.evicted() + resident);
    }
}
