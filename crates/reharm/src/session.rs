//! Session state: the current progression, the chosen key and the selection.
//!
//! A session moves from [`SessionState::NoKeySelected`] to
//! [`SessionState::KeySelected`] once a tonic and scale are chosen, and
//! never back. Every edit runs one engine call to completion and swaps in
//! the resulting progression; earlier snapshots stay valid.

use std::sync::Arc;

use pitch::{PitchError, ScaleQuality};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::engine;
use crate::error::SessionError;
use crate::ids::IdSource;
use crate::label;
use crate::node::{ChordNode, Node, NodeId, Progression};
use crate::rules::{RuleCx, RuleRegistry};
use crate::theory::{Key, Theory};

/// The bookmarkable form of a session:
/// `{ progression: Node[], scale?: {note, scale}, selected?: Node }`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub progression: Progression,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<Key>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<Arc<Node>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NoKeySelected,
    KeySelected,
}

/// Whether an operation replaced anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Changed,
    Unchanged,
}

pub struct Session {
    theory: Box<dyn Theory>,
    ids: Box<dyn IdSource>,
    rules: Arc<RuleRegistry>,
    progression: Progression,
    key: Option<Key>,
    selected: Option<Arc<Node>>,
}

impl Session {
    /// An empty session with the standard rules and no key.
    pub fn new(theory: impl Theory + 'static, ids: impl IdSource + 'static) -> Self {
        Session {
            theory: Box::new(theory),
            ids: Box::new(ids),
            rules: Arc::new(RuleRegistry::standard()),
            progression: Progression::empty(),
            key: None,
            selected: None,
        }
    }

    /// Restore a bookmarked session. The key, if present, must be one the
    /// theory understands, every chord (selection included) must be one it
    /// can build, and ids must be unique across the forest.
    pub fn from_snapshot(
        snapshot: SessionSnapshot,
        theory: impl Theory + 'static,
        ids: impl IdSource + 'static,
    ) -> Result<Self, SessionError> {
        engine::check_unique_ids(snapshot.progression.nodes())?;
        if let Some(key) = &snapshot.scale {
            theory.check_key(key)?;
        }
        check_chords(&theory, snapshot.progression.nodes())?;
        if let Some(selected) = &snapshot.selected {
            check_chords(&theory, std::slice::from_ref(selected))?;
        }

        let mut session = Session::new(theory, ids);
        session.progression = snapshot.progression;
        session.key = snapshot.scale;
        session.selected = snapshot.selected;
        Ok(session)
    }

    /// Use a different rule registry, e.g. one with custom substitutions.
    pub fn with_rules(mut self, rules: Arc<RuleRegistry>) -> Self {
        self.rules = rules;
        self
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            progression: self.progression.clone(),
            scale: self.key.clone(),
            selected: self.selected.clone(),
        }
    }

    pub fn state(&self) -> SessionState {
        match self.key {
            Some(_) => SessionState::KeySelected,
            None => SessionState::NoKeySelected,
        }
    }

    pub fn progression(&self) -> &Progression {
        &self.progression
    }

    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    /// The selected node as it was when selected; it may since have been
    /// rewritten away.
    pub fn selected(&self) -> Option<&Arc<Node>> {
        self.selected.as_ref()
    }

    pub fn rules(&self) -> &RuleRegistry {
        &self.rules
    }

    pub fn theory(&self) -> &dyn Theory {
        self.theory.as_ref()
    }

    fn cx(&self) -> RuleCx<'_> {
        RuleCx {
            theory: self.theory.as_ref(),
            ids: self.ids.as_ref(),
            rules: &self.rules,
        }
    }

    fn require_key(&self) -> Result<&Key, SessionError> {
        self.key.as_ref().ok_or(SessionError::NoKeySelected)
    }

    /// Choose the tonic and scale used for numerals.
    pub fn choose_key(&mut self, tonic: &str, scale: &str) -> Result<(), SessionError> {
        let key = Key::new(self.theory.spell(tonic)?, ScaleQuality::parse(scale)?);
        self.theory.check_key(&key)?;
        info!(%key, "key selected");
        self.key = Some(key);
        Ok(())
    }

    /// Append a chord with a fresh id to the end of the progression. The root
    /// is stored in its canonical spelling.
    pub fn add_chord(&mut self, root: &str, token: &str) -> Result<NodeId, SessionError> {
        self.require_key()?;
        let root = self.theory.spell(root)?;
        // the chord must be one the theory can build
        self.theory.quality(&root, token)?;

        let chord = ChordNode::new(self.ids.new_id(), root.as_str(), token);
        let id = chord.id.clone();
        self.progression = self.progression.appended(Arc::new(Node::Chord(chord)));
        info!(%id, root = %root, token, "chord added");
        Ok(id)
    }

    /// Select the node `id`. Unknown ids leave the selection alone.
    pub fn select(&mut self, id: &NodeId) -> Result<Outcome, SessionError> {
        self.require_key()?;
        match engine::find(self.progression.nodes(), id) {
            Some(node) => {
                self.selected = Some(node.clone());
                debug!(%id, "selected");
                Ok(Outcome::Changed)
            }
            None => {
                debug!(%id, "cannot select, node not in progression");
                Ok(Outcome::Unchanged)
            }
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Apply substitution `kind` to node `id`. Stale ids and substitutions
    /// the node does not qualify for are no-ops.
    pub fn request_substitution(&mut self, id: &NodeId, kind: &str) -> Result<Outcome, SessionError> {
        self.require_key()?;
        let next = engine::substitute_at(&self.progression, id, kind, &self.cx())?;
        Ok(self.replace(next, || info!(%id, kind, "substituted")))
    }

    /// Collapse node `id` back to a single chord.
    pub fn request_collapse(&mut self, id: &NodeId) -> Result<Outcome, SessionError> {
        self.require_key()?;
        let next = engine::collapse_at(&self.progression, id, &self.cx())?;
        Ok(self.replace(next, || info!(%id, "collapsed")))
    }

    fn replace(&mut self, next: Progression, on_change: impl FnOnce()) -> Outcome {
        if next.same_as(&self.progression) {
            return Outcome::Unchanged;
        }
        self.progression = next;
        on_change();
        Outcome::Changed
    }

    /// Roman numeral of `chord` in the session key.
    pub fn numeral(&self, chord: &ChordNode) -> Result<String, SessionError> {
        let key = self.require_key()?;
        Ok(label::numeral(self.theory.as_ref(), chord, key)?)
    }

    /// Substitutions that may be applied to node `id`; empty if it is gone.
    pub fn offered(&self, id: &NodeId) -> Result<Vec<&'static str>, SessionError> {
        let Some(node) = engine::find(self.progression.nodes(), id) else {
            return Ok(Vec::new());
        };
        let chord = engine::root_chord_of(node);
        Ok(self.rules.offered(chord, self.theory.as_ref())?)
    }

    /// The role of node `id` in its current position.
    pub fn describe(&self, id: &NodeId) -> Option<String> {
        let nodes = self.progression.nodes();
        let node = engine::find(nodes, id)?;
        let parent = engine::find_parent(nodes, id);
        Some(label::describe(node, parent, &self.rules))
    }
}

/// Every chord in `nodes` and below must be buildable by `theory`.
fn check_chords(theory: &dyn Theory, nodes: &[Arc<Node>]) -> Result<(), PitchError> {
    for node in nodes {
        match node.as_ref() {
            Node::Chord(chord) => {
                theory.quality(&chord.root, &chord.name)?;
            }
            Node::Group(group) => check_chords(theory, group.children())?,
        }
    }
    Ok(())
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("progression", &self.progression)
            .field("key", &self.key)
            .field("selected", &self.selected.as_ref().map(|n| n.id()))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::ids::SequentialIds;
    use crate::node::GroupNode;
    use crate::rules::{II_V, TRITONE, V_I};
    use crate::theory::PitchTheory;
    use pretty_assertions::assert_eq;

    fn session() -> Session {
        let mut session = Session::new(PitchTheory, SequentialIds::new("n"));
        session.choose_key("C", "major").unwrap();
        session
    }

    #[test]
    fn test_edits_require_a_key() {
        let mut session = Session::new(PitchTheory, SequentialIds::new("n"));
        assert_eq!(session.state(), SessionState::NoKeySelected);
        assert_eq!(session.add_chord("C", "maj7"), Err(SessionError::NoKeySelected));

        session.choose_key("C", "major").unwrap();
        assert_eq!(session.state(), SessionState::KeySelected);
        assert!(session.add_chord("C", "maj7").is_ok());
    }

    #[test]
    fn test_choose_key_rejects_unknown_scale() {
        let mut session = Session::new(PitchTheory, SequentialIds::new("n"));
        assert!(session.choose_key("C", "lydian dominant").is_err());
        assert_eq!(session.state(), SessionState::NoKeySelected);
    }

    #[test]
    fn test_add_chord_appends() {
        let mut session = session();
        let a = session.add_chord("D", "m7").unwrap();
        let b = session.add_chord("G", "7").unwrap();

        let ids: Vec<_> = session.progression().iter().map(|n| n.id().clone()).collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[test]
    fn test_add_chord_stores_canonical_root() {
        let mut session = session();
        session.add_chord(" c", "maj7").unwrap();
        session.add_chord("bb", "7").unwrap();

        let symbols: Vec<_> = session
            .progression()
            .iter()
            .map(|n| n.as_chord().unwrap().symbol())
            .collect();
        assert_eq!(symbols, vec!["Cmaj7", "Bb7"]);
    }

    #[test]
    fn test_add_chord_rejects_long_accidentals() {
        let mut session = session();
        let root = format!("B{}", "#".repeat(120));
        assert!(session.add_chord(&root, "7").is_err());
        assert!(session.progression().is_empty());
    }

    #[test]
    fn test_snapshot_rejects_unbuildable_chords() {
        let bad = Arc::new(Node::Chord(ChordNode::new("a".into(), "H", "zz")));
        let good = Arc::new(Node::Chord(ChordNode::new("b".into(), "C", "maj7")));
        let group = GroupNode::new("g".into(), V_I, vec![bad.clone()]).unwrap();

        let nested = SessionSnapshot {
            progression: Progression::new(vec![good.clone(), Arc::new(Node::Group(group))]),
            ..SessionSnapshot::default()
        };
        let err = Session::from_snapshot(nested, PitchTheory, SequentialIds::new("n")).unwrap_err();
        assert_eq!(err, SessionError::Theory(PitchError::InvalidPitch("H".to_string())));

        let stale_selection = SessionSnapshot {
            progression: Progression::new(vec![good]),
            selected: Some(bad),
            ..SessionSnapshot::default()
        };
        assert!(Session::from_snapshot(stale_selection, PitchTheory, SequentialIds::new("n")).is_err());
    }

    #[test]
    fn test_add_chord_rejects_unbuildable() {
        let mut session = session();
        assert!(session.add_chord("C", "not-a-chord").is_err());
        assert!(session.progression().is_empty());
    }

    #[test]
    fn test_substitute_and_collapse_round_trip() {
        let mut session = session();
        let g7 = session.add_chord("G", "7").unwrap();

        assert_eq!(session.request_substitution(&g7, II_V).unwrap(), Outcome::Changed);
        let group_id = session.progression().nodes()[0].id().clone();
        assert_eq!(session.request_collapse(&group_id).unwrap(), Outcome::Changed);

        let chord = session.progression().nodes()[0].as_chord().unwrap();
        assert_eq!(chord.symbol(), "G7");
    }

    #[test]
    fn test_stale_id_is_noop() {
        let mut session = session();
        let g7 = session.add_chord("G", "7").unwrap();
        session.request_substitution(&g7, TRITONE).unwrap();
        let group_id = session.progression().nodes()[0].id().clone();
        session.request_collapse(&group_id).unwrap();

        // the group and the original G7 are both gone now
        let before = session.progression().clone();
        assert_eq!(session.request_substitution(&g7, V_I).unwrap(), Outcome::Unchanged);
        assert_eq!(session.request_collapse(&group_id).unwrap(), Outcome::Unchanged);
        assert!(session.progression().same_as(&before));
    }

    #[test]
    fn test_unknown_kind_is_distinct_from_invalid() {
        let mut session = session();
        let cmaj7 = session.add_chord("C", "maj7").unwrap();

        assert_eq!(session.request_substitution(&cmaj7, TRITONE).unwrap(), Outcome::Unchanged);
        assert_eq!(
            session.request_substitution(&cmaj7, "coltrane"),
            Err(SessionError::Engine(EngineError::UnknownSubstitution("coltrane".to_string())))
        );
    }

    #[test]
    fn test_selection_survives_rewrite() {
        let mut session = session();
        let c = session.add_chord("C", "maj7").unwrap();
        assert_eq!(session.select(&c).unwrap(), Outcome::Changed);
        assert_eq!(session.select(&"missing".into()).unwrap(), Outcome::Unchanged);

        session.request_substitution(&c, V_I).unwrap();
        let selected = session.selected().unwrap();
        assert_eq!(selected.id(), &c);
        assert_eq!(selected.as_chord().unwrap().symbol(), "Cmaj7");
    }

    #[test]
    fn test_offered_and_describe() {
        let mut session = session();
        let c = session.add_chord("C", "maj7").unwrap();
        assert_eq!(session.offered(&c).unwrap(), vec![V_I]);

        session.request_substitution(&c, V_I).unwrap();
        let dominant = session.progression().nodes()[0].children()[0].id().clone();
        assert_eq!(session.offered(&dominant).unwrap(), vec![V_I, II_V, TRITONE]);
        assert_eq!(
            session.describe(&dominant).as_deref(),
            Some("G7 is acting as the dominant (V) of Cmaj7.")
        );
        assert!(session.offered(&"gone".into()).unwrap().is_empty());
    }

    #[test]
    fn test_snapshot_restores() {
        let mut session = session();
        let c = session.add_chord("C", "maj7").unwrap();
        session.request_substitution(&c, V_I).unwrap();
        session.select(&c).unwrap();

        let snapshot = session.snapshot();
        let restored = Session::from_snapshot(
            snapshot.clone(),
            PitchTheory,
            SequentialIds::resume("n", &snapshot.progression).unwrap(),
        )
        .unwrap();

        assert_eq!(restored.snapshot(), snapshot);
        assert_eq!(restored.state(), SessionState::KeySelected);
    }

    #[test]
    fn test_snapshot_without_key() {
        let restored = Session::from_snapshot(
            SessionSnapshot::default(),
            PitchTheory,
            SequentialIds::new("n"),
        )
        .unwrap();
        assert_eq!(restored.state(), SessionState::NoKeySelected);
    }
}
