//! Hand landmark geometry and the fixed-width feature encoding.

use serde::{Deserialize, Serialize};

/// Keypoints per detected hand (0 = wrist ... 20 = pinky tip, in the
/// extractor's canonical index order).
pub const LANDMARK_COUNT: usize = 21;

/// Width of the flattened feature vector: 21 landmarks x (x, y, z).
pub const FEATURE_DIM: usize = 63;

/// One keypoint in normalized image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// One detected hand: 21 ordered keypoints.
///
/// The index order is the extractor's canonical landmark order and is part
/// of the classification contract. Any permutation silently breaks the
/// classifier, so nothing in this crate ever reorders these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandLandmarks(pub [Landmark; LANDMARK_COUNT]);

/// Flattened hand pose: index `3*i..3*i+3` is landmark `i`'s (x, y, z).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(Vec<f32>);

impl FeatureVector {
    /// Flattens the landmarks in index order.
    ///
    /// This is a pure function: identical landmarks always produce the
    /// bit-identical vector. Retraining reproducibility depends on it.
    pub fn from_landmarks(hand: &HandLandmarks) -> Self {
        let mut raw = Vec::with_capacity(FEATURE_DIM);
        for lm in hand.0.iter() {
            raw.push(lm.x);
            raw.push(lm.y);
            raw.push(lm.z);
        }
        FeatureVector(raw)
    }

    /// Wraps an already-flattened vector, validating its width.
    pub fn from_raw(raw: Vec<f32>) -> Option<Self> {
        if raw.len() == FEATURE_DIM {
            Some(FeatureVector(raw))
        } else {
            None
        }
    }

    pub fn dim(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

/// Squared Euclidean distance between two feature vectors.
pub fn squared_distance(a: &FeatureVector, b: &FeatureVector) -> f32 {
    a.as_slice()
        .iter()
        .zip(b.as_slice())
        .map(|(x, y)| (x - y) * (x - y))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_hand() -> HandLandmarks {
        let mut pts = [Landmark { x: 0.0, y: 0.0, z: 0.0 }; LANDMARK_COUNT];
        for (i, lm) in pts.iter_mut().enumerate() {
            lm.x = i as f32 * 0.1;
            lm.y = i as f32 * 0.2;
            lm.z = i as f32 * -0.05;
        }
        HandLandmarks(pts)
    }

    #[test]
    fn encoding_preserves_landmark_order() {
        let hand = sample_hand();
        let v = FeatureVector::from_landmarks(&hand);
        assert_eq!(v.dim(), FEATURE_DIM);
        for i in 0..LANDMARK_COUNT {
            assert_eq!(v.as_slice()[3 * i], hand.0[i].x);
            assert_eq!(v.as_slice()[3 * i + 1], hand.0[i].y);
            assert_eq!(v.as_slice()[3 * i + 2], hand.0[i].z);
        }
    }

    #[test]
    fn encoding_is_bit_deterministic() {
        let hand = sample_hand();
        let a = FeatureVector::from_landmarks(&hand);
        let b = FeatureVector::from_landmarks(&hand);
        for (x, y) in a.as_slice().iter().zip(b.as_slice()) {
            assert_eq!(x.to_bits(), y.to_bits());
        }
    }

    #[test]
    fn from_raw_rejects_wrong_width() {
        assert!(FeatureVector::from_raw(vec![0.0; FEATURE_DIM]).is_some());
        assert!(FeatureVector::from_raw(vec![0.0; FEATURE_DIM - 1]).is_none());
        assert!(FeatureVector::from_raw(Vec::new()).is_none());
    }

    #[test]
    fn distance_is_zero_for_identical_vectors() {
        let v = FeatureVector::from_landmarks(&sample_hand());
        assert_eq!(squared_distance(&v, &v), 0.0);
    }
}
