//! The music-theory seam.
//!
//! The engine asks a [`Theory`] for chord qualities, transpositions and scale
//! degrees and never reaches for a provider on its own. [`PitchTheory`] is
//! the implementation backed by the `pitch` crate.

use pitch::{Interval, Pitch, PitchError, Quality, Scale, ScaleQuality};
use serde::{Deserialize, Serialize};

use crate::node::ChordNode;

/// The chosen key: tonic name plus scale. Serialized as `{note, scale}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    #[serde(rename = "note")]
    pub tonic: String,
    pub scale: ScaleQuality,
}

impl Key {
    pub fn new(tonic: impl Into<String>, scale: ScaleQuality) -> Self {
        Key {
            tonic: tonic.into(),
            scale,
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.tonic, self.scale)
    }
}

pub trait Theory {
    /// Quality of the chord built from `root` and `token`
    fn quality(&self, root: &str, token: &str) -> Result<Quality, PitchError>;

    /// `root` raised by `interval`, as a pitch name
    fn transpose(&self, root: &str, interval: Interval) -> Result<String, PitchError>;

    /// Degree 1-7 of `root` in `key`, 0 when unresolvable
    fn scale_degree(&self, root: &str, key: &Key) -> Result<u8, PitchError>;

    /// Canonical spelling of a pitch name: "c" and " C" become "C", "db" becomes "Db"
    fn spell(&self, root: &str) -> Result<String, PitchError>;

    /// Accidental text of a pitch name: "", "b", "#", ...
    fn accidental(&self, root: &str) -> Result<String, PitchError>;

    /// Pitch class 0-11 of a pitch name
    fn pitch_class(&self, root: &str) -> Result<u8, PitchError>;

    /// Check that the key's tonic is a pitch this theory understands
    fn check_key(&self, key: &Key) -> Result<(), PitchError>;

    /// Same root pitch class and same quality; spelling and id may differ.
    fn equivalent(&self, a: &ChordNode, b: &ChordNode) -> Result<bool, PitchError> {
        Ok(self.pitch_class(&a.root)? == self.pitch_class(&b.root)?
            && self.quality(&a.root, &a.name)? == self.quality(&b.root, &b.name)?)
    }
}

/// [`Theory`] over the `pitch` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct PitchTheory;

impl PitchTheory {
    fn scale(key: &Key) -> Result<Scale, PitchError> {
        Ok(Scale::new(Pitch::parse(&key.tonic)?, key.scale))
    }
}

impl Theory for PitchTheory {
    fn quality(&self, root: &str, token: &str) -> Result<Quality, PitchError> {
        Ok(Pitch::parse(root)?.chord(token)?.quality())
    }

    fn transpose(&self, root: &str, interval: Interval) -> Result<String, PitchError> {
        Ok(Pitch::parse(root)?.interval(interval).to_string())
    }

    fn scale_degree(&self, root: &str, key: &Key) -> Result<u8, PitchError> {
        let scale = Self::scale(key)?;
        Ok(Pitch::parse(root)?.scale_degree(&scale))
    }

    fn spell(&self, root: &str) -> Result<String, PitchError> {
        Ok(Pitch::parse(root)?.to_string())
    }

    fn accidental(&self, root: &str) -> Result<String, PitchError> {
        Ok(Pitch::parse(root)?.accidental())
    }

    fn pitch_class(&self, root: &str) -> Result<u8, PitchError> {
        Ok(Pitch::parse(root)?.pitch_class())
    }

    fn check_key(&self, key: &Key) -> Result<(), PitchError> {
        Self::scale(key).map(|_| ())
    }
}
