/// Source of randomness for the `RND` instruction
///
/// This is implemented for every [`rand::RngCore`], so a seeded
/// [`rand::rngs::StdRng`] gives reproducible runs.
pub trait Random {
    /// Returns a uniformly distributed value in `0..n`
    ///
    /// `n` is never zero.
    fn below(&mut self, n: u32) -> u32;
}

impl<R: rand::RngCore> Random for R {
    fn below(&mut self, n: u32) -> u32 {
        rand::Rng::gen_range(self, 0..n)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn below() {
        let mut rng = StdRng::seed_from_u64(0x1337);
        for n in [1, 2, 3, 0x10000] {
            for _ in 0..100 {
                assert!(rng.below(n) < n);
            }
        }
    }

    #[test]
    fn seeded_is_deterministic() {
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        let xs: Vec<u32> = (0..16).map(|_| a.below(1000)).collect();
        let ys: Vec<u32> = (0..16).map(|_| b.below(1000)).collect();
        assert_eq!(xs, ys);
    }
}
