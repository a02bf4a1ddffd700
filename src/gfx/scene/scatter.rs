//! Seeded pseudo-random scatter for decorative damage elements.
//!
//! Puddles, stains and drip marks need visual variety that looks the same on
//! every run. Placement is driven by a sine hash of an integer seed:
//!
//! ```text
//! hash(seed) = frac(sin(seed * 12.9898 + 78.233) * 43758.5453)
//! ```
//!
//! This is not a statistically sound generator and is not meant to be. The
//! only contract is that a given seed maps to the same value forever, which
//! keeps screenshots stable for visual regression checks.

/// Multiplier applied to the seed before taking the sine
pub const HASH_MULTIPLIER: f64 = 12.9898;
/// Phase offset added before taking the sine
pub const HASH_OFFSET: f64 = 78.233;
/// Amplitude that spreads the sine over many integer periods
pub const HASH_AMPLITUDE: f64 = 43758.5453;
/// Prime stride between the seeds of consecutive elements
pub const SEED_PRIME: u32 = 7919;

/// Maps an integer seed to a reproducible value in `[0, 1)`.
///
/// The hash is evaluated in `f64` and narrowed at the end so the result does
/// not depend on `f32` rounding of large intermediate products.
pub fn hash_to_unit_float(seed: u32) -> f32 {
    let v = (f64::from(seed) * HASH_MULTIPLIER + HASH_OFFSET).sin() * HASH_AMPLITUDE;
    let unit = (v - v.floor()) as f32;
    // Narrowing can round 0.99999999 up to exactly 1.0
    if unit >= 1.0 {
        0.0
    } else {
        unit
    }
}

/// Seed for the `element_index`-th element of a category identified by `salt`.
pub fn element_seed(element_index: u32, salt: u32) -> u32 {
    element_index.wrapping_mul(SEED_PRIME).wrapping_add(salt)
}

/// One element's worth of hash draws, read from consecutive seeds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterSample {
    /// Position along the X extent (seed + 0)
    pub u: f32,
    /// Position along the Z extent (seed + 1)
    pub v: f32,
    /// Size / radius parameter (seed + 2)
    pub size: f32,
    /// Aspect-ratio parameter (seed + 3)
    pub aspect: f32,
    /// Opacity parameter (seed + 4)
    pub opacity: f32,
}

impl ScatterSample {
    pub fn draw(seed: u32) -> Self {
        Self {
            u: hash_to_unit_float(seed),
            v: hash_to_unit_float(seed.wrapping_add(1)),
            size: hash_to_unit_float(seed.wrapping_add(2)),
            aspect: hash_to_unit_float(seed.wrapping_add(3)),
            opacity: hash_to_unit_float(seed.wrapping_add(4)),
        }
    }
}

/// Linear interpolation from `a` to `b`
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_hash_snapshot() {
        // Guards against accidental drift of the formula or its constants
        let expected = [
            0.182_916_35,
            0.740_084_8,
            0.564_395_1,
            0.454_749_26,
            0.272_400_74,
            0.823_448_7,
            0.752_842_25,
            0.503_755_87,
        ];

        for (seed, want) in expected.iter().enumerate() {
            assert_abs_diff_eq!(hash_to_unit_float(seed as u32), *want, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_hash_range() {
        for seed in (0..200_000u32).step_by(7) {
            let value = hash_to_unit_float(seed);
            assert!((0.0..1.0).contains(&value), "seed {} gave {}", seed, value);
        }
        assert!((0.0..1.0).contains(&hash_to_unit_float(u32::MAX)));
    }

    #[test]
    fn test_sample_reads_consecutive_seeds() {
        let sample = ScatterSample::draw(40);
        assert_eq!(sample.u, hash_to_unit_float(40));
        assert_eq!(sample.v, hash_to_unit_float(41));
        assert_eq!(sample.size, hash_to_unit_float(42));
        assert_eq!(sample.aspect, hash_to_unit_float(43));
        assert_eq!(sample.opacity, hash_to_unit_float(44));
        assert_eq!(ScatterSample::draw(40), sample);
    }

    #[test]
    fn test_element_seeds_do_not_overlap() {
        let a = element_seed(3, 11);
        let b = element_seed(4, 11);
        assert!(b - a > 4);
    }
}
