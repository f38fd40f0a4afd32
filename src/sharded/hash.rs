//! Knuth's multiplicative hashing, as a [`Hasher`].
//!
//! Every word written to the hasher is folded into a 32-bit state and
//! multiplied by [`KNUTH_MULTIPLIER`] modulo 2^32.  A single 32-bit write
//! from the initial state therefore hashes `k` to `k * 2654435761 mod 2^32`,
//! so an `i32` or `u32` key lands in shard
//! `(k as u32).wrapping_mul(2654435761) % shard_count`.

use std::hash::{BuildHasher, Hasher};

/// Knuth's multiplier, a prime close to `2^32 / phi`.
pub const KNUTH_MULTIPLIER: u32 = 2_654_435_761;

/// Multiplicative hasher used to pick a shard for a key.
///
/// # Examples
/// ```
/// use std::hash::BuildHasher;
/// use hybrid_collections::sharded::hash::{BuildKnuthHasher, KNUTH_MULTIPLIER};
///
/// let h = BuildKnuthHasher.hash_one(7i32);
/// assert_eq!(h, 7u32.wrapping_mul(KNUTH_MULTIPLIER) as u64);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct KnuthHasher {
    state: u32,
}

impl KnuthHasher {
    fn mix(&mut self, word: u32) {
        self.state = (self.state.rotate_left(5) ^ word).wrapping_mul(KNUTH_MULTIPLIER);
    }
}

impl Hasher for KnuthHasher {
    fn finish(&self) -> u64 {
        self.state as u64
    }

    fn write(&mut self, bytes: &[u8]) {
        let mut words = bytes.chunks_exact(4);
        for w in &mut words {
            self.mix(u32::from_le_bytes([w[0], w[1], w[2], w[3]]));
        }

        let rest = words.remainder();
        if !rest.is_empty() {
            let mut buf = [0u8; 4];
            buf[..rest.len()].copy_from_slice(rest);
            self.mix(u32::from_le_bytes(buf));
        }
    }

    fn write_u8(&mut self, i: u8) {
        self.mix(i as u32);
    }

    fn write_u16(&mut self, i: u16) {
        self.mix(i as u32);
    }

    fn write_u32(&mut self, i: u32) {
        self.mix(i);
    }

    fn write_u64(&mut self, i: u64) {
        self.mix(i as u32);
        self.mix((i >> 32) as u32);
    }

    fn write_u128(&mut self, i: u128) {
        self.write_u64(i as u64);
        self.write_u64((i >> 64) as u64);
    }

    fn write_usize(&mut self, i: usize) {
        self.write_u64(i as u64);
    }

    fn write_i8(&mut self, i: i8) {
        self.mix(i as u8 as u32);
    }

    fn write_i16(&mut self, i: i16) {
        self.mix(i as u16 as u32);
    }

    fn write_i32(&mut self, i: i32) {
        self.mix(i as u32);
    }

    fn write_i64(&mut self, i: i64) {
        self.write_u64(i as u64);
    }

    fn write_i128(&mut self, i: i128) {
        self.write_u128(i as u128);
    }

    fn write_isize(&mut self, i: isize) {
        self.write_u64(i as u64);
    }
}

/// Builds fresh [`KnuthHasher`]s; the default hasher of the sharded maps.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuildKnuthHasher;

impl BuildHasher for BuildKnuthHasher {
    type Hasher = KnuthHasher;

    fn build_hasher(&self) -> KnuthHasher {
        KnuthHasher::default()
    }
}
