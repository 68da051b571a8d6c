//! RNG trait abstraction for region generation
//!
//! Every stochastic decision of one region goes through a single RNG seeded
//! from `(seed, ring, quadrant)`. Two runs with the same seed therefore draw
//! the same sequence regardless of thread or call order.

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

use crate::world::region::RegionId;

/// Random number generator trait for distribution code
pub trait WorldRng {
    /// Generate random f64 in [0.0, 1.0)
    fn gen_f64(&mut self) -> f64;

    /// Generate random f64 in [min, max). Returns `min` for an empty range.
    fn gen_range_f64(&mut self, min: f64, max: f64) -> f64 {
        if max <= min {
            return min;
        }
        min + self.gen_f64() * (max - min)
    }

    /// Generate random integer in [min, max] (inclusive)
    fn gen_range_u32(&mut self, min: u32, max: u32) -> u32 {
        if max <= min {
            return min;
        }
        let span = (max - min) as f64 + 1.0;
        min + ((self.gen_f64() * span) as u32).min(max - min)
    }

    /// Check if random value is less than probability threshold
    fn check_probability(&mut self, probability: f64) -> bool {
        self.gen_f64() < probability
    }
}

// Blanket implementation for any type implementing rand::Rng
impl<T: ?Sized + rand::Rng> WorldRng for T {
    fn gen_f64(&mut self) -> f64 {
        rand::Rng::r#gen(self)
    }
}

/// Hash mixing, independent streams from one seed
const fn mix(seed: u64, purpose: u64) -> u64 {
    let mut hash = seed;
    hash ^= purpose;
    hash = hash.wrapping_mul(0x517cc1b727220a95);
    hash ^= hash >> 32;
    hash
}

/// Seed of one region's RNG stream
pub fn region_seed(seed: u64, region: RegionId) -> u64 {
    let ring = mix(seed, 0x5249_4e47 ^ region.ring as u64);
    mix(ring, 0x5155_4144 ^ region.quadrant.index() as u64)
}

/// RNG for one region
pub fn region_rng(seed: u64, region: RegionId) -> Xoshiro256StarStar {
    Xoshiro256StarStar::seed_from_u64(region_seed(seed, region))
}
