//! Note letters and spelled pitches.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::chord::Chord;
use crate::interval::Interval;
use crate::scale::Scale;
use crate::PitchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteName {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl NoteName {
    /// Convert to semitone offset from C (0-11)
    pub fn to_semitone(&self) -> i8 {
        match self {
            NoteName::C => 0,
            NoteName::D => 2,
            NoteName::E => 4,
            NoteName::F => 5,
            NoteName::G => 7,
            NoteName::A => 9,
            NoteName::B => 11,
        }
    }

    /// Position in the letter cycle, C = 0 through B = 6
    pub fn index(&self) -> u8 {
        match self {
            NoteName::C => 0,
            NoteName::D => 1,
            NoteName::E => 2,
            NoteName::F => 3,
            NoteName::G => 4,
            NoteName::A => 5,
            NoteName::B => 6,
        }
    }

    /// All note names in order
    pub fn all() -> [NoteName; 7] {
        [
            NoteName::C,
            NoteName::D,
            NoteName::E,
            NoteName::F,
            NoteName::G,
            NoteName::A,
            NoteName::B,
        ]
    }

    /// Letter `steps` positions above this one, wrapping at the octave
    pub fn step(&self, steps: u8) -> NoteName {
        Self::all()[((self.index() + steps) % 7) as usize]
    }

    /// Parse from a single letter (case-insensitive)
    pub fn from_char(c: char) -> Option<NoteName> {
        match c.to_ascii_uppercase() {
            'C' => Some(NoteName::C),
            'D' => Some(NoteName::D),
            'E' => Some(NoteName::E),
            'F' => Some(NoteName::F),
            'G' => Some(NoteName::G),
            'A' => Some(NoteName::A),
            'B' => Some(NoteName::B),
            _ => None,
        }
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            NoteName::C => "C",
            NoteName::D => "D",
            NoteName::E => "E",
            NoteName::F => "F",
            NoteName::G => "G",
            NoteName::A => "A",
            NoteName::B => "B",
        };
        f.write_str(letter)
    }
}

/// Largest alteration a spelled pitch carries: a double sharp or flat.
const MAX_ALTERATION: i8 = 2;

/// A pitch class with its spelling: a letter plus a signed accidental.
///
/// Spelling is kept because interval arithmetic is diatonic: Db and C#
/// are enharmonic but are different pitches here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pitch {
    letter: NoteName,
    /// Semitone alteration: -1 flat, +1 sharp, -2 double flat, ...
    accidental: i8,
}

impl Pitch {
    pub fn new(letter: NoteName, accidental: i8) -> Self {
        Pitch { letter, accidental }
    }

    /// Parse a pitch name such as "C", "bb", "F#", "Ebb" or "Fx".
    ///
    /// The letter is case-insensitive. The accidental is at most a double
    /// flat or double sharp: `b`, `bb`, `#`, `##` or `x`.
    pub fn parse(name: &str) -> Result<Pitch, PitchError> {
        let invalid = || PitchError::InvalidPitch(name.to_string());
        let trimmed = name.trim();
        let mut chars = trimmed.chars();

        let letter = chars
            .next()
            .and_then(NoteName::from_char)
            .ok_or_else(invalid)?;

        let accidental = match chars.as_str() {
            "" => 0,
            "#" => 1,
            "##" | "x" => 2,
            "b" => -1,
            "bb" => -2,
            _ => return Err(invalid()),
        };

        Ok(Pitch { letter, accidental })
    }

    pub fn letter(&self) -> NoteName {
        self.letter
    }

    /// Accidental as text: "", "b", "bb", "#", "##"
    pub fn accidental(&self) -> String {
        let symbol = if self.accidental < 0 { "b" } else { "#" };
        symbol.repeat(self.accidental.unsigned_abs() as usize)
    }

    pub fn alteration(&self) -> i8 {
        self.accidental
    }

    /// Pitch class 0-11 (C = 0)
    pub fn pitch_class(&self) -> u8 {
        (i16::from(self.letter.to_semitone()) + i16::from(self.accidental)).rem_euclid(12) as u8
    }

    /// Same sounding pitch class regardless of spelling
    pub fn is_enharmonic(&self, other: &Pitch) -> bool {
        self.pitch_class() == other.pitch_class()
    }

    /// The pitch `interval` above this one, spelled by letter steps.
    pub fn interval(&self, interval: Interval) -> Pitch {
        let letter = self.letter.step(interval.steps());
        let target = (self.pitch_class() as i8 + interval.semitones()).rem_euclid(12);
        let mut accidental = (target - letter.to_semitone()).rem_euclid(12);
        if accidental > 6 {
            accidental -= 12;
        }
        if accidental.abs() > MAX_ALTERATION {
            return Pitch::simplest(target as u8, accidental < 0);
        }
        Pitch { letter, accidental }
    }

    /// Plainest spelling of `pitch_class`, leaning to flats or sharps on a tie.
    fn simplest(pitch_class: u8, flats: bool) -> Pitch {
        NoteName::all()
            .into_iter()
            .map(|letter| {
                let mut accidental = (pitch_class as i8 - letter.to_semitone()).rem_euclid(12);
                if accidental > 6 {
                    accidental -= 12;
                }
                Pitch { letter, accidental }
            })
            .min_by_key(|p| {
                let against = if flats { p.accidental > 0 } else { p.accidental < 0 };
                (p.accidental.abs(), against)
            })
            .unwrap_or(Pitch {
                letter: NoteName::C,
                accidental: 0,
            })
    }

    /// Build a chord rooted here from a quality token ("maj7", "m7", "7", ...)
    pub fn chord(&self, token: &str) -> Result<Chord, PitchError> {
        Chord::new(*self, token)
    }

    /// Scale degree 1-7 of this pitch in `scale`, or 0 if it is not a
    /// diatonic member of the scale as spelled.
    pub fn scale_degree(&self, scale: &Scale) -> u8 {
        scale.degree_of(self)
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.letter, self.accidental())
    }
}

impl FromStr for Pitch {
    type Err = PitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pitch::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(name: &str) -> Pitch {
        Pitch::parse(name).unwrap()
    }

    #[test]
    fn test_parse_naturals_and_accidentals() {
        assert_eq!(p("C"), Pitch::new(NoteName::C, 0));
        assert_eq!(p("bb"), Pitch::new(NoteName::B, -1));
        assert_eq!(p("F#"), Pitch::new(NoteName::F, 1));
        assert_eq!(p("Ebb"), Pitch::new(NoteName::E, -2));
        assert_eq!(p("Fx"), Pitch::new(NoteName::F, 2));
        assert_eq!(p("G##"), Pitch::new(NoteName::G, 2));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "H", "C#b", "Cm", "7", "C###", "Bbbb", "xx"] {
            assert_eq!(
                Pitch::parse(bad),
                Err(PitchError::InvalidPitch(bad.to_string())),
                "{bad:?} should not parse"
            );
        }
    }

    #[test]
    fn test_parse_rejects_long_accidental_runs() {
        let sharps = format!("B{}", "#".repeat(120));
        let flats = format!("C{}", "b".repeat(200));
        assert_eq!(Pitch::parse(&sharps), Err(PitchError::InvalidPitch(sharps.clone())));
        assert_eq!(Pitch::parse(&flats), Err(PitchError::InvalidPitch(flats.clone())));
    }

    #[test]
    fn test_interval_respells_past_double_accidentals() {
        // Cbb up a diminished fifth would be Gbbb
        let up = p("Cbb").interval(Interval::DiminishedFifth);
        assert_eq!(up.to_string(), "E");
        // Bx up an augmented fourth would be E###
        let up = p("Bx").interval(Interval::AugmentedFourth);
        assert_eq!(up.to_string(), "G");
        assert_eq!(p(&up.to_string()), up);
    }

    #[test]
    fn test_display() {
        assert_eq!(p("db").to_string(), "Db");
        assert_eq!(p("F#").to_string(), "F#");
        assert_eq!(p("B").accidental(), "");
        assert_eq!(p("Abb").accidental(), "bb");
    }

    #[test]
    fn test_pitch_class_wraps() {
        assert_eq!(p("Cb").pitch_class(), 11);
        assert_eq!(p("B#").pitch_class(), 0);
        assert!(p("Db").is_enharmonic(&p("C#")));
        assert!(!p("D").is_enharmonic(&p("C#")));
    }

    #[test]
    fn test_interval_spelling() {
        assert_eq!(p("C").interval(Interval::PerfectFifth), p("G"));
        assert_eq!(p("G").interval(Interval::DiminishedFifth), p("Db"));
        assert_eq!(p("Db").interval(Interval::AugmentedFourth), p("G"));
        assert_eq!(p("G").interval(Interval::PerfectFourth), p("C"));
        assert_eq!(p("C").interval(Interval::MajorSecond), p("D"));
        assert_eq!(p("F#").interval(Interval::PerfectFifth), p("C#"));
        assert_eq!(p("Bb").interval(Interval::PerfectFifth), p("F"));
        assert_eq!(p("B").interval(Interval::PerfectFifth), p("F#"));
    }

    #[test]
    fn test_tritone_is_self_inverse_up_to_spelling() {
        for name in ["C", "G", "Bb", "F#", "Ab", "E"] {
            let start = p(name);
            let back = start
                .interval(Interval::DiminishedFifth)
                .interval(Interval::AugmentedFourth);
            assert_eq!(back, start, "round trip from {name}");
        }
    }
}
