//! Persistent chord-substitution trees.
//!
//! A progression is a forest of chords and substitution groups. Applying a
//! substitution (V-I secondary dominant, ii-V, tritone) replaces one node
//! with a group that expands it; collapsing a group reduces it back to a
//! single chord. Every edit produces a new [`Progression`] that shares all
//! untouched subtrees with the old one.
//!
//! # Example
//!
//! ```
//! use reharm::{rules, PitchTheory, Session, SequentialIds};
//!
//! let mut session = Session::new(PitchTheory, SequentialIds::new("n"));
//! session.choose_key("C", "major").unwrap();
//!
//! let tonic = session.add_chord("C", "maj7").unwrap();
//! session.request_substitution(&tonic, rules::V_I).unwrap();
//!
//! let group = &session.progression().nodes()[0];
//! let dominant = group.children()[0].as_chord().unwrap();
//! assert_eq!(dominant.symbol(), "G7");
//! assert_eq!(session.numeral(dominant).unwrap(), "V");
//! ```

pub mod engine;
pub mod error;
pub mod ids;
pub mod label;
pub mod node;
pub mod rules;
pub mod session;
pub mod theory;

pub use engine::{collapse_at, depth_of, find, find_parent, root_chord_of, substitute_at};
pub use error::{EngineError, NodeError, SessionError};
pub use ids::{IdSource, SequentialIds, UuidIds};
pub use node::{ChordNode, GroupNode, Node, NodeId, Progression, CHORD_TYPE};
pub use rules::{Rule, RuleCx, RuleRegistry, Shape};
pub use session::{Outcome, Session, SessionSnapshot, SessionState};
pub use theory::{Key, PitchTheory, Theory};

pub use pitch;
