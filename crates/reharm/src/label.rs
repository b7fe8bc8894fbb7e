//! Roman numerals and role descriptions for display.

use pitch::{PitchError, Quality};

use crate::engine::root_chord_of;
use crate::node::{ChordNode, GroupNode, Node};
use crate::rules::RuleRegistry;
use crate::theory::{Key, Theory};

const NUMERALS: [&str; 8] = ["?", "I", "II", "III", "IV", "V", "VI", "VII"];

/// Roman numeral of `chord` in `key`: lowercase for minor-family chords,
/// prefixed with the root's accidental. "?" marks a root outside the scale.
pub fn numeral(theory: &dyn Theory, chord: &ChordNode, key: &Key) -> Result<String, PitchError> {
    let degree = theory.scale_degree(&chord.root, key)?;
    let numeral = NUMERALS[degree as usize];
    let numeral = match theory.quality(&chord.root, &chord.name)? {
        Quality::Minor | Quality::Diminished | Quality::HalfDiminished => numeral.to_lowercase(),
        _ => numeral.to_string(),
    };
    Ok(format!("{}{}", theory.accidental(&chord.root)?, numeral))
}

/// What `node` is doing where it sits. `parent` is `None` for top-level nodes.
pub fn describe(node: &Node, parent: Option<&GroupNode>, rules: &RuleRegistry) -> String {
    let symbol = root_chord_of(node).symbol();
    let Some(parent) = parent else {
        return format!("{symbol} is part of the main progression.");
    };

    rules
        .get(parent.kind())
        .and_then(|rule| rule.context(node, parent))
        .unwrap_or_else(|| format!("{symbol} is part of a {} substitution.", parent.kind()))
}
