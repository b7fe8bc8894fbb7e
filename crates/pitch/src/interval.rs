//! Diatonic intervals.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::PitchError;

/// An interval as a (letter steps, semitones) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "P1")]
    Unison,
    #[serde(rename = "M2")]
    MajorSecond,
    #[serde(rename = "m3")]
    MinorThird,
    #[serde(rename = "M3")]
    MajorThird,
    #[serde(rename = "P4")]
    PerfectFourth,
    #[serde(rename = "A4")]
    AugmentedFourth,
    #[serde(rename = "d5")]
    DiminishedFifth,
    #[serde(rename = "P5")]
    PerfectFifth,
    #[serde(rename = "m7")]
    MinorSeventh,
}

impl Interval {
    /// Letter steps spanned (a fifth spans 4 letters: C D E F G)
    pub fn steps(&self) -> u8 {
        match self {
            Interval::Unison => 0,
            Interval::MajorSecond => 1,
            Interval::MinorThird | Interval::MajorThird => 2,
            Interval::PerfectFourth | Interval::AugmentedFourth => 3,
            Interval::DiminishedFifth | Interval::PerfectFifth => 4,
            Interval::MinorSeventh => 6,
        }
    }

    pub fn semitones(&self) -> i8 {
        match self {
            Interval::Unison => 0,
            Interval::MajorSecond => 2,
            Interval::MinorThird => 3,
            Interval::MajorThird => 4,
            Interval::PerfectFourth => 5,
            Interval::AugmentedFourth | Interval::DiminishedFifth => 6,
            Interval::PerfectFifth => 7,
            Interval::MinorSeventh => 10,
        }
    }

    /// Short token: "P5", "d5", "M2", ...
    pub fn token(&self) -> &'static str {
        match self {
            Interval::Unison => "P1",
            Interval::MajorSecond => "M2",
            Interval::MinorThird => "m3",
            Interval::MajorThird => "M3",
            Interval::PerfectFourth => "P4",
            Interval::AugmentedFourth => "A4",
            Interval::DiminishedFifth => "d5",
            Interval::PerfectFifth => "P5",
            Interval::MinorSeventh => "m7",
        }
    }

    /// Parse a token. Case matters: "m3" and "M3" differ.
    pub fn parse(token: &str) -> Result<Interval, PitchError> {
        match token {
            "P1" => Ok(Interval::Unison),
            "M2" => Ok(Interval::MajorSecond),
            "m3" => Ok(Interval::MinorThird),
            "M3" => Ok(Interval::MajorThird),
            "P4" => Ok(Interval::PerfectFourth),
            "A4" => Ok(Interval::AugmentedFourth),
            "d5" => Ok(Interval::DiminishedFifth),
            "P5" => Ok(Interval::PerfectFifth),
            "m7" => Ok(Interval::MinorSeventh),
            other => Err(PitchError::UnknownInterval(other.to_string())),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Interval {
    type Err = PitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interval::parse(s)
    }
}
