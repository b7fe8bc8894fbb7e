//! Spelled pitches, intervals, chord templates and scale degrees.
//!
//! This crate is the music-theory provider behind the reharm engine. It
//! answers the handful of questions a chord-substitution tree needs:
//!
//! - what pitch lies a given interval above another, spelled correctly
//!   (G up a diminished fifth is Db, not C#)
//! - what quality a chord built from a root and a token has
//! - which scale degree a pitch occupies in a major or minor key
//!
//! # Example
//!
//! ```
//! use pitch::{Interval, Pitch, Quality, Scale, ScaleQuality};
//!
//! let g = Pitch::parse("G").unwrap();
//! assert_eq!(g.interval(Interval::DiminishedFifth).to_string(), "Db");
//!
//! let chord = g.chord("7").unwrap();
//! assert_eq!(chord.quality(), Quality::Dominant);
//! assert_eq!(chord.name(), "G7");
//!
//! let c_major = Scale::new(Pitch::parse("C").unwrap(), ScaleQuality::Major);
//! assert_eq!(g.scale_degree(&c_major), 5);
//! ```

pub mod chord;
pub mod interval;
pub mod note;
pub mod scale;

pub use chord::{Chord, ChordTemplate, Quality, TEMPLATES};
pub use interval::Interval;
pub use note::{NoteName, Pitch};
pub use scale::{Scale, ScaleQuality};

use thiserror::Error;

/// Errors from parsing pitch, chord, interval and scale names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PitchError {
    #[error("invalid pitch name '{0}'")]
    InvalidPitch(String),

    #[error("unknown chord token '{0}'")]
    UnknownChord(String),

    #[error("unknown interval '{0}'")]
    UnknownInterval(String),

    #[error("unknown scale '{0}'")]
    UnknownScale(String),
}

/// Parse a pitch name. Shorthand for [`Pitch::parse`].
pub fn parse_pitch(name: &str) -> Result<Pitch, PitchError> {
    Pitch::parse(name)
}

/// Build a scale from a tonic name and a scale name ("major", "minor").
pub fn build_scale(tonic: &str, scale: &str) -> Result<Scale, PitchError> {
    let tonic = Pitch::parse(tonic)?;
    let quality = ScaleQuality::parse(scale)?;
    Ok(Scale::new(tonic, quality))
}
