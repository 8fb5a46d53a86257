//! String-keyed deterministic generator used for card layouts.
//!
//! The key is hashed with cyrb53 over UTF-16 code units, and the low 32 bits
//! of the hash seed a mulberry32 stream. Both steps use the exact constants of
//! the browser client so cards computed here match cards computed there.

pub const FLOAT_SCALE: f64 = 4_294_967_296.0;

/// 53-bit order-sensitive string hash.
pub fn cyrb53(key: &str, seed: u32) -> u64 {
    let mut h1: u32 = 0xdead_beef ^ seed;
    let mut h2: u32 = 0x41c6_ce57 ^ seed;
    for unit in key.encode_utf16() {
        let ch = u32::from(unit);
        h1 = (h1 ^ ch).wrapping_mul(2_654_435_761);
        h2 = (h2 ^ ch).wrapping_mul(1_597_334_677);
    }
    h1 = (h1 ^ (h1 >> 16)).wrapping_mul(2_246_822_507);
    h1 ^= (h2 ^ (h2 >> 13)).wrapping_mul(3_266_489_909);
    h2 = (h2 ^ (h2 >> 16)).wrapping_mul(2_246_822_507);
    h2 ^= (h1 ^ (h1 >> 13)).wrapping_mul(3_266_489_909);
    (u64::from(h2 & 0x1f_ffff) << 32) | u64::from(h1)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededRng {
    state: u32,
}

impl SeededRng {
    pub fn from_key(key: &str) -> Self {
        Self::from_hash(cyrb53(key, 0))
    }

    pub fn from_hash(hash: u64) -> Self {
        // mulberry32 only sees the hash modulo 2^32.
        Self { state: hash as u32 }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6d2b_79f5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / FLOAT_SCALE
    }

    /// `floor(next_f64() * bound)`, the index draw used by the card shuffle.
    pub fn below(&mut self, bound: usize) -> usize {
        (self.next_f64() * bound as f64).floor() as usize
    }
}

impl Iterator for SeededRng {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        Some(self.next_f64())
    }
}

pub fn make_generator(key: &str) -> impl FnMut() -> f64 {
    let mut rng = SeededRng::from_key(key);
    move || rng.next_f64()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_matches_browser_vectors() {
        assert_eq!(cyrb53("", 0), 3_338_908_027_751_811);
        assert_eq!(cyrb53("testkey", 0), 4_363_629_314_980_389);
        assert_eq!(cyrb53("ABCDEF:XY12", 0), 3_594_432_881_851_774);
        assert_eq!(cyrb53("caf\u{e9}\u{2615}", 0), 4_265_974_257_076_662);
    }

    #[test]
    fn stream_matches_browser_vectors() {
        let mut rng = SeededRng::from_key("testkey");
        assert_eq!(rng.next_u32(), 1_530_343_997);
        assert_eq!(rng.next_u32(), 3_478_622_840);
        assert_eq!(rng.next_u32(), 3_945_974_783);
    }

    #[test]
    fn same_key_same_sequence() {
        let a: Vec<f64> = SeededRng::from_key("testkey").take(1000).collect();
        let b: Vec<f64> = SeededRng::from_key("testkey").take(1000).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn closure_generator_matches_struct() {
        let mut next = make_generator("closure");
        let mut rng = SeededRng::from_key("closure");
        for _ in 0..64 {
            assert_eq!(next().to_bits(), rng.next_f64().to_bits());
        }
    }

    #[test]
    fn one_character_difference_diverges() {
        let pairs = [
            ("keyA", "keyB"),
            ("ABCDEF:XY12", "ABCDEF:XY13"),
            ("", " "),
            ("GAME01:SEED", "GAME02:SEED"),
        ];
        for (left, right) in pairs {
            let a: Vec<f64> = SeededRng::from_key(left).take(10).collect();
            let b: Vec<f64> = SeededRng::from_key(right).take(10).collect();
            assert_ne!(a, b, "{left} vs {right}");
        }
    }

    #[test]
    fn values_stay_in_unit_interval() {
        for key in ["range", "", "\u{65e5}\u{672c}", "a:b"] {
            for value in SeededRng::from_key(key).take(10_000) {
                assert!((0.0..1.0).contains(&value), "{key}: {value}");
            }
        }
    }

    #[test]
    fn index_draws_are_roughly_uniform() {
        let mut rng = SeededRng::from_key("uniformity");
        let mut buckets = [0u32; 10];
        for _ in 0..100_000 {
            buckets[rng.below(10)] += 1;
        }
        for count in buckets {
            assert!((9_500..=10_500).contains(&count), "{buckets:?}");
        }
    }
}
