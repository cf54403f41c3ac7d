//! Recall quality grade supplied by the learner after seeing the answer.
use crate::error::StudyError;

/// Grades at or above this count as a correct recall.
pub const CORRECT_THRESHOLD: u8 = 3;
pub const MAX_QUALITY: u8 = 5;

/// A grade in 0..=5. 0 = blackout, 3 = correct with difficulty, 5 = perfect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Quality(u8);

impl Quality {
    pub const AGAIN: Quality = Quality(0);
    pub const HARD: Quality = Quality(3);
    pub const GOOD: Quality = Quality(4);
    pub const EASY: Quality = Quality(5);

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_correct(self) -> bool {
        self.0 >= CORRECT_THRESHOLD
    }
}

impl TryFrom<u8> for Quality {
    type Error = StudyError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value > MAX_QUALITY {
            return Err(StudyError::InvalidGrade(value));
        }
        Ok(Quality(value))
    }
}
