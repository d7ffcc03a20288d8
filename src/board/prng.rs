/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use rand::{RngCore, SeedableRng};

/// A pseudo-random number generator producing the RC4 keystream.
///
/// Seeded with an all-zero key (see [`Rc4::new`]) it yields the same sequence on every run,
/// which is what the Zobrist tables are drawn from. Seeded from the OS it doubles as the
/// source of search jitter and opening book sampling.
#[derive(Clone)]
pub struct Rc4 {
    state: [u8; 256],
    x: u8,
    y: u8,
}

impl Rc4 {
    /// Construct a new generator keyed with all zeroes.
    #[inline(always)]
    pub fn new() -> Self {
        Self::with_key(&[0])
    }

    /// Construct a new generator from an arbitrary, non-empty key.
    pub fn with_key(key: &[u8]) -> Self {
        let mut state = [0u8; 256];
        for (i, s) in state.iter_mut().enumerate() {
            *s = i as u8;
        }

        // Key schedule
        let mut j = 0u8;
        for i in 0..256 {
            let k = key.get(i % key.len().max(1)).copied().unwrap_or_default();
            j = j.wrapping_add(state[i]).wrapping_add(k);
            state.swap(i, j as usize);
        }

        Self { state, x: 0, y: 0 }
    }

    /// Produces the next byte of the keystream.
    #[inline(always)]
    pub fn next_byte(&mut self) -> u8 {
        self.x = self.x.wrapping_add(1);
        self.y = self.y.wrapping_add(self.state[self.x as usize]);
        self.state.swap(self.x as usize, self.y as usize);

        let t = self.state[self.x as usize].wrapping_add(self.state[self.y as usize]);
        self.state[t as usize]
    }
}

impl Default for Rc4 {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl RngCore for Rc4 {
    /// Four keystream bytes, least significant first.
    #[inline(always)]
    fn next_u32(&mut self) -> u32 {
        u32::from_le_bytes([
            self.next_byte(),
            self.next_byte(),
            self.next_byte(),
            self.next_byte(),
        ])
    }

    #[inline(always)]
    fn next_u64(&mut self) -> u64 {
        let lo = self.next_u32() as u64;
        let hi = self.next_u32() as u64;
        lo | (hi << 32)
    }

    #[inline(always)]
    fn fill_bytes(&mut self, dst: &mut [u8]) {
        dst.iter_mut().for_each(|byte| *byte = self.next_byte());
    }
}

impl SeedableRng for Rc4 {
    type Seed = [u8; 32];

    #[inline(always)]
    fn from_seed(seed: Self::Seed) -> Self {
        Self::with_key(&seed)
    }
}

impl std::fmt::Debug for Rc4 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Dumping the permutation is not useful
        f.debug_struct("Rc4")
            .field("x", &self.x)
            .field("y", &self.y)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_key_is_deterministic() {
        let mut a = Rc4::new();
        let mut b = Rc4::from_seed([0; 32]);

        for _ in 0..1_000 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn test_words_are_little_endian() {
        let mut bytes = Rc4::new();
        let mut words = Rc4::new();

        let expected = bytes.next_byte() as u32
            | (bytes.next_byte() as u32) << 8
            | (bytes.next_byte() as u32) << 16
            | (bytes.next_byte() as u32) << 24;

        assert_eq!(words.next_u32(), expected);
    }

    #[test]
    fn test_known_keystream() {
        // RC4 with the key "Key" is a common published test vector
        let mut rc4 = Rc4::with_key(b"Key");
        let stream: Vec<u8> = (0..5).map(|_| rc4.next_byte()).collect();
        assert_eq!(stream, [0xeb, 0x9f, 0x77, 0x81, 0xb7]);
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = Rc4::seed_from_u64(1);
        let mut b = Rc4::seed_from_u64(2);
        let a: Vec<u32> = (0..8).map(|_| a.next_u32()).collect();
        let b: Vec<u32> = (0..8).map(|_| b.next_u32()).collect();
        assert_ne!(a, b);
    }
}
