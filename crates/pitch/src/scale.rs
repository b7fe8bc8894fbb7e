//! Major and minor scales and scale-degree lookup.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::note::Pitch;
use crate::PitchError;

const MAJOR_STEPS: [u8; 7] = [0, 2, 4, 5, 7, 9, 11];
const MINOR_STEPS: [u8; 7] = [0, 2, 3, 5, 7, 8, 10];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScaleQuality {
    #[default]
    Major,
    Minor,
}

impl ScaleQuality {
    /// Parse a scale name (case-insensitive, allows abbreviations)
    pub fn parse(s: &str) -> Result<ScaleQuality, PitchError> {
        match s.trim().to_lowercase().as_str() {
            "major" | "maj" | "ionian" => Ok(ScaleQuality::Major),
            "minor" | "min" | "m" | "aeolian" => Ok(ScaleQuality::Minor),
            _ => Err(PitchError::UnknownScale(s.to_string())),
        }
    }

    /// Semitones above the tonic for degrees 1-7
    pub fn steps(&self) -> &'static [u8; 7] {
        match self {
            ScaleQuality::Major => &MAJOR_STEPS,
            ScaleQuality::Minor => &MINOR_STEPS,
        }
    }
}

impl fmt::Display for ScaleQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleQuality::Major => write!(f, "major"),
            ScaleQuality::Minor => write!(f, "minor"),
        }
    }
}

impl FromStr for ScaleQuality {
    type Err = PitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScaleQuality::parse(s)
    }
}

/// A tonic and a scale quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scale {
    tonic: Pitch,
    quality: ScaleQuality,
}

impl Scale {
    pub fn new(tonic: Pitch, quality: ScaleQuality) -> Self {
        Scale { tonic, quality }
    }

    pub fn tonic(&self) -> Pitch {
        self.tonic
    }

    pub fn quality(&self) -> ScaleQuality {
        self.quality
    }

    /// Degree 1-7 of `pitch`, or 0 when it is not diatonic as spelled.
    ///
    /// The letter distance picks the candidate degree; the pitch only
    /// counts if its semitone distance from the tonic matches that degree.
    pub fn degree_of(&self, pitch: &Pitch) -> u8 {
        let letters = (pitch.letter().index() as i8 - self.tonic.letter().index() as i8).rem_euclid(7);
        let semitones =
            (pitch.pitch_class() as i8 - self.tonic.pitch_class() as i8).rem_euclid(12) as u8;

        if self.quality.steps()[letters as usize] == semitones {
            letters as u8 + 1
        } else {
            0
        }
    }

    /// The seven spelled pitches of the scale
    pub fn pitches(&self) -> Vec<Pitch> {
        self.quality
            .steps()
            .iter()
            .enumerate()
            .map(|(degree, &semitones)| {
                let letter = self.tonic.letter().step(degree as u8);
                let target = (self.tonic.pitch_class() + semitones) as i8 % 12;
                let mut accidental = (target - letter.to_semitone()).rem_euclid(12);
                if accidental > 6 {
                    accidental -= 12;
                }
                Pitch::new(letter, accidental)
            })
            .collect()
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tonic, self.quality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scale(tonic: &str, quality: ScaleQuality) -> Scale {
        Scale::new(Pitch::parse(tonic).unwrap(), quality)
    }

    fn degree(name: &str, scale: &Scale) -> u8 {
        Pitch::parse(name).unwrap().scale_degree(scale)
    }

    #[test]
    fn test_degrees_in_c_major() {
        let c = scale("C", ScaleQuality::Major);
        assert_eq!(degree("C", &c), 1);
        assert_eq!(degree("D", &c), 2);
        assert_eq!(degree("G", &c), 5);
        assert_eq!(degree("B", &c), 7);
    }

    #[test]
    fn test_chromatic_pitch_is_unresolved() {
        let c = scale("C", ScaleQuality::Major);
        assert_eq!(degree("Db", &c), 0);
        assert_eq!(degree("F#", &c), 0);
        assert_eq!(degree("Bb", &c), 0);
    }

    #[test]
    fn test_degrees_in_minor() {
        let a = scale("A", ScaleQuality::Minor);
        assert_eq!(degree("C", &a), 3);
        assert_eq!(degree("G", &a), 7);
        assert_eq!(degree("G#", &a), 0);

        let c = scale("C", ScaleQuality::Minor);
        assert_eq!(degree("Eb", &c), 3);
        assert_eq!(degree("Ab", &c), 6);
        assert_eq!(degree("D#", &c), 0);
    }

    #[test]
    fn test_pitches_spelled() {
        let names: Vec<String> = scale("F", ScaleQuality::Major)
            .pitches()
            .iter()
            .map(|p| p.to_string())
            .collect();
        assert_eq!(names, vec!["F", "G", "A", "Bb", "C", "D", "E"]);

        let names: Vec<String> = scale("E", ScaleQuality::Minor)
            .pitches()
            .iter()
            .map(|p| p.to_string())
            .collect();
        assert_eq!(names, vec!["E", "F#", "G", "A", "B", "C", "D"]);
    }

    #[test]
    fn test_parse_scale_quality() {
        assert_eq!(ScaleQuality::parse("Major"), Ok(ScaleQuality::Major));
        assert_eq!(ScaleQuality::parse("aeolian"), Ok(ScaleQuality::Minor));
        assert!(ScaleQuality::parse("dorian").is_err());
    }
}
