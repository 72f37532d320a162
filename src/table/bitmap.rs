//! Bit-packed presence bitmap (1 bit per element)
//!
//! Nullable numeric columns carry one of these next to their values:
//! - None = every slot present (fast path, zero overhead)
//! - Some(Bitmap) = bit-packed mask (1 = present, 0 = absent)
//!
//! No value of the element type is reserved, so `i32::MIN` or NaN stay
//! ordinary data.

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Bitmap {
    /// Each u64 holds 64 presence bits (LSB = bit 0)
    bits: Vec<u64>,
    /// Total number of elements (not bits)
    len: usize,
}

impl Bitmap {
    /// Empty bitmap with room for `capacity` elements
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bits: Vec::with_capacity(capacity.div_ceil(64)),
            len: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get presence bit at index i (true = present, false = absent)
    #[inline]
    pub fn get(&self, i: usize) -> bool {
        debug_assert!(i < self.len);
        let w = i >> 6; // word index (i / 64)
        let b = i & 63; // bit index (i % 64)
        (self.bits[w] >> b) & 1 == 1
    }

    /// Set presence bit at index i
    #[inline]
    pub fn set(&mut self, i: usize, v: bool) {
        debug_assert!(i < self.len);
        let w = i >> 6;
        let b = i & 63;
        let mask = 1u64 << b;
        if v {
            self.bits[w] |= mask;
        } else {
            self.bits[w] &= !mask;
        }
    }

    /// Append one presence bit
    #[inline]
    pub fn push(&mut self, v: bool) {
        if self.len & 63 == 0 {
            self.bits.push(0);
        }
        self.len += 1;
        self.set(self.len - 1, v);
    }

    /// Number of absent slots
    pub fn null_count(&self) -> usize {
        let present: usize = self.bits.iter().map(|w| w.count_ones() as usize).sum();
        self.len - present
    }
}
