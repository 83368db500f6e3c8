use crate::assets::bundle::ItemId;

/// Seed used when the caller passes 0 (xorshift has an all-zero fixed point).
pub const DEFAULT_SEED: u32 = 123_456_789;

/// Marsaglia xorshift32 with shifts `(13, 17, 5)` and 32-bit wrapping arithmetic.
///
/// Output is bit-for-bit identical on every platform for a given seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    /// Seed the generator; `0` maps to [`DEFAULT_SEED`].
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { DEFAULT_SEED } else { seed },
        }
    }

    /// Next raw 32-bit state.
    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Next value in `[0, 1]` (inclusive: the state `u32::MAX` maps to exactly 1).
    pub fn next_unit(&mut self) -> f64 {
        f64::from(self.next_u32()) / f64::from(u32::MAX)
    }

    /// Uniform draw in `[0, upper_inclusive]`.
    pub fn next_index(&mut self, upper_inclusive: usize) -> usize {
        let j = (self.next_unit() * (upper_inclusive as f64 + 1.0)).floor() as usize;
        j.min(upper_inclusive)
    }
}

/// In-place Fisher-Yates: for `i` from `len-1` down to 1, swap `i` with `j` drawn in `[0, i]`.
pub fn shuffle_in_place<T>(items: &mut [T], rng: &mut XorShift32) {
    for i in (1..items.len()).rev() {
        let j = rng.next_index(i);
        items.swap(i, j);
    }
}

/// Seeded permutation of `items`; the input is left untouched.
pub fn shuffled<T: Clone>(items: &[T], seed: u32) -> Vec<T> {
    let mut out = items.to_vec();
    shuffle_in_place(&mut out, &mut XorShift32::new(seed));
    out
}

/// Display order of bundle items for `seed`.
pub fn display_order(ids: &[ItemId], seed: u32) -> Vec<ItemId> {
    shuffled(ids, seed)
}

#[cfg(test)]
#[path = "../../tests/unit/order/shuffle.rs"]
mod tests;
