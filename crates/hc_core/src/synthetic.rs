//! Deterministic synthetic hand poses.
//!
//! Used by tests and by the CLI demo mode when no real capture data is
//! around: each digit gets its own well-separated cluster of poses, so a
//! freshly fitted classifier recovers the digit exactly.

use crate::corpus::CorpusSample;
use crate::digit::Digit;
use crate::extract::{Frame, LandmarkExtractor};
use crate::landmarks::{FeatureVector, HandLandmarks, Landmark, LANDMARK_COUNT};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Canonical synthetic pose for a digit.
pub fn synthetic_hand(digit: Digit) -> HandLandmarks {
    let d = digit.get() as f32;
    let mut points = [Landmark { x: 0.0, y: 0.0, z: 0.0 }; LANDMARK_COUNT];
    for (i, lm) in points.iter_mut().enumerate() {
        let t = i as f32 / LANDMARK_COUNT as f32;
        lm.x = 0.1 * d + 0.01 * t;
        lm.y = 0.5 + 0.02 * t * d;
        lm.z = -0.05 * t;
    }
    HandLandmarks(points)
}

/// Canonical pose plus small seeded jitter, for building multi-sample
/// corpora. The jitter is far smaller than the inter-digit spacing, so
/// clusters stay separable.
pub fn synthetic_hand_jittered(digit: Digit, seed: u64) -> HandLandmarks {
    let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_mul(31).wrapping_add(digit.get() as u64));
    let mut hand = synthetic_hand(digit);
    for lm in hand.0.iter_mut() {
        lm.x += rng.gen_range(-0.005..0.005);
        lm.y += rng.gen_range(-0.005..0.005);
        lm.z += rng.gen_range(-0.005..0.005);
    }
    hand
}

/// A labeled sample set covering all ten digits.
pub fn synthetic_corpus(samples_per_digit: usize, seed: u64) -> Vec<CorpusSample> {
    let mut samples = Vec::with_capacity(samples_per_digit * Digit::ALL.len());
    for digit in Digit::ALL {
        for n in 0..samples_per_digit {
            let hand = synthetic_hand_jittered(digit, seed.wrapping_add(n as u64));
            samples.push(CorpusSample {
                features: FeatureVector::from_landmarks(&hand),
                label: digit,
            });
        }
    }
    samples
}

/// Extractor over synthetic frames: every byte of the frame that is a
/// valid digit contributes one hand for that digit. An empty frame (or
/// one with no digit bytes) is a detection miss, and a frame with several
/// digit bytes reports several hands.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyntheticExtractor;

impl SyntheticExtractor {
    /// The frame whose detection yields exactly one hand posing `digit`.
    pub fn frame_for(digit: Digit) -> Frame {
        Frame::new(vec![digit.get()])
    }
}

impl LandmarkExtractor for SyntheticExtractor {
    fn detect(&self, frame: &Frame) -> Vec<HandLandmarks> {
        frame
            .bytes
            .iter()
            .filter_map(|&b| Digit::new(b).ok().map(synthetic_hand))
            .collect()
    }
}
