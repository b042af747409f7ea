use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Smallest digit a hand pose can encode.
pub const DIGIT_MIN: u8 = 1;
/// Largest digit a hand pose can encode (both hands' worth of fingers).
pub const DIGIT_MAX: u8 = 10;

/// The numeric gesture value encoded by a hand pose, always in 1..=10.
///
/// Both the player's classified gesture and the opponent's random draw use
/// this single range. The sources this game descends from drew the
/// opponent's digit from several inconsistent ranges; [1, 10] is the one
/// canonical range here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Digit(u8);

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("digit out of range: {0} (valid range is 1..=10)")]
pub struct InvalidDigit(pub u8);

impl Digit {
    pub const ALL: [Digit; 10] = [
        Digit(1),
        Digit(2),
        Digit(3),
        Digit(4),
        Digit(5),
        Digit(6),
        Digit(7),
        Digit(8),
        Digit(9),
        Digit(10),
    ];

    pub fn new(value: u8) -> Result<Self, InvalidDigit> {
        if (DIGIT_MIN..=DIGIT_MAX).contains(&value) {
            Ok(Digit(value))
        } else {
            Err(InvalidDigit(value))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Uniform draw over the full [1, 10] range.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Digit(rng.gen_range(DIGIT_MIN..=DIGIT_MAX))
    }
}

impl TryFrom<u8> for Digit {
    type Error = InvalidDigit;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Digit::new(value)
    }
}

impl From<Digit> for u8 {
    fn from(digit: Digit) -> u8 {
        digit.0
    }
}

impl fmt::Display for Digit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
