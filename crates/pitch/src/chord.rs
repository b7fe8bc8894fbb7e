//! Chord templates and chord construction from a root and a quality token.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::note::Pitch;
use crate::PitchError;

/// Harmonic category of a chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Quality {
    Major,
    Minor,
    Dominant,
    Diminished,
    HalfDiminished,
    Augmented,
    Suspended,
    Power,
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Quality::Major => "major",
            Quality::Minor => "minor",
            Quality::Dominant => "dominant",
            Quality::Diminished => "diminished",
            Quality::HalfDiminished => "half-diminished",
            Quality::Augmented => "augmented",
            Quality::Suspended => "suspended",
            Quality::Power => "power",
        };
        f.write_str(name)
    }
}

/// A chord template: token + quality + interval set from root (as bitmask over 12 pitch classes).
pub struct ChordTemplate {
    pub token: &'static str,
    pub quality: Quality,
    pub intervals: u16, // bitmask: bit i set means interval i is in the template
}

impl ChordTemplate {
    const fn new(token: &'static str, quality: Quality, intervals: &[u8]) -> Self {
        let mut mask = 0u16;
        let mut i = 0;
        while i < intervals.len() {
            mask |= 1 << (intervals[i] % 12);
            i += 1;
        }
        Self {
            token,
            quality,
            intervals: mask,
        }
    }
}

/// Every chord token the provider can build.
pub static TEMPLATES: &[ChordTemplate] = &[
    // Sevenths and extensions
    ChordTemplate::new("7", Quality::Dominant, &[0, 4, 7, 10]),
    ChordTemplate::new("9", Quality::Dominant, &[0, 4, 7, 10, 14]),
    ChordTemplate::new("13", Quality::Dominant, &[0, 4, 7, 10, 14, 21]),
    ChordTemplate::new("maj7", Quality::Major, &[0, 4, 7, 11]),
    ChordTemplate::new("M7", Quality::Major, &[0, 4, 7, 11]),
    ChordTemplate::new("maj9", Quality::Major, &[0, 4, 7, 11, 14]),
    ChordTemplate::new("6", Quality::Major, &[0, 4, 7, 9]),
    ChordTemplate::new("m7", Quality::Minor, &[0, 3, 7, 10]),
    ChordTemplate::new("m9", Quality::Minor, &[0, 3, 7, 10, 14]),
    ChordTemplate::new("m6", Quality::Minor, &[0, 3, 7, 9]),
    ChordTemplate::new("mmaj7", Quality::Minor, &[0, 3, 7, 11]),
    ChordTemplate::new("dim7", Quality::Diminished, &[0, 3, 6, 9]),
    ChordTemplate::new("m7b5", Quality::HalfDiminished, &[0, 3, 6, 10]),
    ChordTemplate::new("7sus4", Quality::Suspended, &[0, 5, 7, 10]),
    // Triads
    ChordTemplate::new("", Quality::Major, &[0, 4, 7]),
    ChordTemplate::new("M", Quality::Major, &[0, 4, 7]),
    ChordTemplate::new("m", Quality::Minor, &[0, 3, 7]),
    ChordTemplate::new("dim", Quality::Diminished, &[0, 3, 6]),
    ChordTemplate::new("aug", Quality::Augmented, &[0, 4, 8]),
    ChordTemplate::new("sus4", Quality::Suspended, &[0, 5, 7]),
    ChordTemplate::new("sus2", Quality::Suspended, &[0, 2, 7]),
    // Dyad
    ChordTemplate::new("5", Quality::Power, &[0, 7]),
];

/// Look up a template by its exact token.
pub fn template(token: &str) -> Option<&'static ChordTemplate> {
    TEMPLATES.iter().find(|t| t.token == token)
}

/// A chord: a spelled root plus the template named by its token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chord {
    root: Pitch,
    token: String,
    quality: Quality,
    intervals: u16,
}

impl Chord {
    pub fn new(root: Pitch, token: &str) -> Result<Chord, PitchError> {
        let template = template(token).ok_or_else(|| PitchError::UnknownChord(token.to_string()))?;
        Ok(Chord {
            root,
            token: template.token.to_string(),
            quality: template.quality,
            intervals: template.intervals,
        })
    }

    pub fn root(&self) -> Pitch {
        self.root
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    /// Chord symbol: "Cmaj7", "Dbm7", "G7"
    pub fn name(&self) -> String {
        format!("{}{}", self.root, self.token)
    }

    /// Sounding pitch classes, ascending from C
    pub fn pitch_classes(&self) -> Vec<u8> {
        let root = self.root.pitch_class();
        let mut pcs: Vec<u8> = (0..12u8)
            .filter(|i| self.intervals & (1 << i) != 0)
            .map(|i| (root + i) % 12)
            .collect();
        pcs.sort_unstable();
        pcs
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.root, self.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chord(root: &str, token: &str) -> Chord {
        Pitch::parse(root).unwrap().chord(token).unwrap()
    }

    #[test]
    fn test_qualities() {
        assert_eq!(chord("C", "maj7").quality(), Quality::Major);
        assert_eq!(chord("D", "m7").quality(), Quality::Minor);
        assert_eq!(chord("G", "7").quality(), Quality::Dominant);
        assert_eq!(chord("B", "m7b5").quality(), Quality::HalfDiminished);
        assert_eq!(chord("B", "dim").quality(), Quality::Diminished);
        assert_eq!(chord("C", "aug").quality(), Quality::Augmented);
        assert_eq!(chord("F", "").quality(), Quality::Major);
    }

    #[test]
    fn test_name() {
        assert_eq!(chord("Db", "7").name(), "Db7");
        assert_eq!(chord("c", "maj7").name(), "Cmaj7");
    }

    #[test]
    fn test_unknown_token() {
        let root = Pitch::parse("C").unwrap();
        assert_eq!(
            root.chord("maj13#11"),
            Err(PitchError::UnknownChord("maj13#11".to_string()))
        );
    }

    #[test]
    fn test_g7_pitch_classes() {
        // G B D F
        assert_eq!(chord("G", "7").pitch_classes(), vec![2, 5, 7, 11]);
    }

    #[test]
    fn test_tritone_substitutes_share_guide_tones() {
        let g7 = chord("G", "7").pitch_classes();
        let db7 = chord("Db", "7").pitch_classes();
        let shared: Vec<u8> = g7.iter().filter(|pc| db7.contains(pc)).copied().collect();
        // B and F (Cb and F in Db7)
        assert_eq!(shared, vec![5, 11]);
    }

    #[test]
    fn test_tokens_unique() {
        for (i, a) in TEMPLATES.iter().enumerate() {
            for b in &TEMPLATES[i + 1..] {
                assert_ne!(a.token, b.token);
            }
        }
    }
}
