//! # Encoder tick counters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::sync::atomic::{AtomicU32, Ordering};

use super::Side;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Pair of wheel encoder tick counters.
///
/// This is the one place in the navigation software where concurrent mutation is expected: the
/// edge handlers of the encoders call [`EncoderState::increment`] from outside the control loop,
/// while the control loop only takes snapshots and resets. Relaxed ordering is enough since no
/// other memory is published through the counters.
///
/// Counts never decrease except through [`EncoderState::reset`].
#[derive(Debug, Default)]
pub struct EncoderState {
    left: AtomicU32,
    right: AtomicU32,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl EncoderState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one edge on the given wheel's encoder.
    pub fn increment(&self, side: Side) {
        self.counter(side).fetch_add(1, Ordering::Relaxed);
    }

    /// Momentary snapshot of the given wheel's tick count.
    pub fn ticks(&self, side: Side) -> u32 {
        self.counter(side).load(Ordering::Relaxed)
    }

    /// Reset both counters to zero.
    ///
    /// Must be called before a maneuver's motors are armed, so that no edge from the new maneuver
    /// is lost across the reset.
    pub fn reset(&self) {
        self.left.store(0, Ordering::Relaxed);
        self.right.store(0, Ordering::Relaxed);
    }

    fn counter(&self, side: Side) -> &AtomicU32 {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_encoder_state() {
        let enc = Arc::new(EncoderState::new());

        // Simulate two edge handlers running alongside the control loop
        let handles: Vec<_> = [Side::Left, Side::Right]
            .iter()
            .map(|&side| {
                let enc = enc.clone();
                thread::spawn(move || {
                    for _ in 0..1000 {
                        enc.increment(side);
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(enc.ticks(Side::Left), 1000);
        assert_eq!(enc.ticks(Side::Right), 1000);

        enc.reset();
        assert_eq!(enc.ticks(Side::Left), 0);
        assert_eq!(enc.ticks(Side::Right), 0);
    }
}
