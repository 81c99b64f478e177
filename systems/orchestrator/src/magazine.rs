//! Two-slot queue of upcoming projectile colors.

use hexpop_core::BubbleColor;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Colors loaded into the launcher.
///
/// Slot 0 is fired next; slot 1 is shown as the following shot. Both slots are
/// filled from a seeded generator so a given seed always yields the same
/// sequence.
#[derive(Clone, Debug)]
pub struct Magazine {
    slots: [BubbleColor; 2],
    rng: ChaCha8Rng,
}

impl Magazine {
    /// Creates a magazine with both slots filled from `seed`.
    #[must_use]
    pub fn loaded(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let first = random_color(&mut rng);
        let second = random_color(&mut rng);
        Self {
            slots: [first, second],
            rng,
        }
    }

    /// Creates a magazine with explicit slot contents; refills are drawn from `seed`.
    #[must_use]
    pub fn with_slots(slots: [BubbleColor; 2], seed: u64) -> Self {
        Self {
            slots,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Color that the next shot will carry.
    #[must_use]
    pub const fn current(&self) -> BubbleColor {
        self.slots[0]
    }

    /// Color queued after the current one.
    #[must_use]
    pub const fn upcoming(&self) -> BubbleColor {
        self.slots[1]
    }

    /// Removes the current color, moves the queued one forward and refills the back slot.
    pub fn advance(&mut self) -> BubbleColor {
        let fired = self.slots[0];
        self.slots[0] = self.slots[1];
        self.slots[1] = random_color(&mut self.rng);
        fired
    }
}

fn random_color(rng: &mut ChaCha8Rng) -> BubbleColor {
    BubbleColor::ALL[rng.gen_range(0..BubbleColor::ALL.len())]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_shifts_the_queue() {
        let mut magazine = Magazine::loaded(7);
        let current = magazine.current();
        let upcoming = magazine.upcoming();

        assert_eq!(magazine.advance(), current);
        assert_eq!(magazine.current(), upcoming);
    }

    #[test]
    fn equal_seeds_produce_equal_sequences() {
        let mut a = Magazine::loaded(42);
        let mut b = Magazine::loaded(42);
        for _ in 0..32 {
            assert_eq!(a.advance(), b.advance());
        }
    }

    #[test]
    fn every_color_eventually_appears() {
        let mut magazine = Magazine::loaded(3);
        let mut seen = [false; 3];
        for _ in 0..200 {
            let color = magazine.advance();
            let index = BubbleColor::ALL
                .iter()
                .position(|candidate| *candidate == color)
                .expect("known color");
            seen[index] = true;
        }
        assert_eq!(seen, [true; 3]);
    }
}
