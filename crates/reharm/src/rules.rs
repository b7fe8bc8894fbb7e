//! Substitution rules.
//!
//! A rule is a record of plain functions keyed by the rule's name. The
//! rewrite engine looks rules up by the `type` tag of a node and never
//! special-cases a substitution, so adding one means registering another
//! [`Rule`].
//!
//! | rule      | validate          | substitute                 | collapse                   |
//! |-----------|-------------------|----------------------------|----------------------------|
//! | `chord`   | never             | n/a                        | identity                   |
//! | `V-I`     | always            | `[V7 of target, target]`   | collapse the last child    |
//! | `ii-V`    | target dominant   | `[iim7 of target, target]` | collapse the last child    |
//! | `tritone` | target dominant   | `[bII7 of target]`         | child up an A4, as a `7`   |

use std::sync::Arc;

use pitch::{Interval, Quality};

use crate::engine::root_chord_of;
use crate::error::EngineError;
use crate::ids::IdSource;
use crate::node::{ChordNode, GroupNode, Node, CHORD_TYPE};
use crate::theory::Theory;

pub const V_I: &str = "V-I";
pub const II_V: &str = "ii-V";
pub const TRITONE: &str = "tritone";

/// Everything a rule may consult while rewriting.
#[derive(Clone, Copy)]
pub struct RuleCx<'a> {
    pub theory: &'a dyn Theory,
    pub ids: &'a dyn IdSource,
    pub rules: &'a RuleRegistry,
}

/// The child layout a rule's `substitute` produces, and that its `context`
/// relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// A plain chord; nothing is substituted.
    Leaf,
    /// Exactly two children: `[inserted, target]`. The inserted chord leads
    /// into the original, which stays last.
    Resolution,
    /// Exactly one child that stands in for the original.
    Replacement,
}

impl Shape {
    pub fn arity(&self) -> usize {
        match self {
            Shape::Leaf => 0,
            Shape::Resolution => 2,
            Shape::Replacement => 1,
        }
    }

    /// `(inserted, target)` of a resolution group
    pub fn resolution_parts(group: &GroupNode) -> Option<(&Arc<Node>, &Arc<Node>)> {
        match group.children() {
            [inserted, target] => Some((inserted, target)),
            _ => None,
        }
    }
}

pub type ValidateFn = fn(&ChordNode, &dyn Theory) -> Result<bool, EngineError>;
pub type SubstituteFn = fn(&Arc<Node>, &RuleCx<'_>) -> Result<GroupNode, EngineError>;
/// Always yields a chord node.
pub type CollapseFn = fn(&Arc<Node>, &RuleCx<'_>) -> Result<Arc<Node>, EngineError>;
pub type ContextFn = fn(&Node, &GroupNode) -> Option<String>;

pub struct Rule {
    pub name: &'static str,
    /// Short label for menus ("V-I", "tri")
    pub label: &'static str,
    pub description: &'static str,
    pub shape: Shape,
    pub validate: ValidateFn,
    pub substitute: Option<SubstituteFn>,
    pub collapse: CollapseFn,
    pub context: ContextFn,
}

impl Rule {
    /// Whether this substitution may be applied to a node resolving to `chord`.
    pub fn validate(&self, chord: &ChordNode, theory: &dyn Theory) -> Result<bool, EngineError> {
        (self.validate)(chord, theory)
    }

    /// Expand `node` into a new group, checked against [`Rule::shape`].
    ///
    /// Returns `None` for rules that cannot substitute (the chord pseudo-rule).
    pub fn substitute(
        &self,
        node: &Arc<Node>,
        cx: &RuleCx<'_>,
    ) -> Result<Option<GroupNode>, EngineError> {
        let Some(substitute) = self.substitute else {
            return Ok(None);
        };
        let group = substitute(node, cx)?;

        let got = group.children().len();
        if got != self.shape.arity() {
            return Err(EngineError::ShapeMismatch {
                rule: self.name.to_string(),
                expected: self.shape.arity(),
                got,
            });
        }
        Ok(Some(group))
    }

    pub fn collapse(&self, node: &Arc<Node>, cx: &RuleCx<'_>) -> Result<Arc<Node>, EngineError> {
        (self.collapse)(node, cx)
    }

    /// Harmonic role of `node` inside `parent`, if this rule can say.
    pub fn context(&self, node: &Node, parent: &GroupNode) -> Option<String> {
        (self.context)(node, parent)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("shape", &self.shape)
            .field("substitutes", &self.substitute.is_some())
            .finish()
    }
}

/// Rules keyed by name, in registration order.
#[derive(Debug)]
pub struct RuleRegistry {
    rules: Vec<Rule>,
}

impl RuleRegistry {
    /// Only the chord pseudo-rule
    pub fn empty() -> Self {
        RuleRegistry {
            rules: vec![chord_rule()],
        }
    }

    /// The chord pseudo-rule plus V-I, ii-V and tritone
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(v_i_rule());
        registry.register(ii_v_rule());
        registry.register(tritone_rule());
        registry
    }

    /// Add a rule, replacing any rule with the same name.
    pub fn register(&mut self, rule: Rule) {
        match self.rules.iter_mut().find(|r| r.name == rule.name) {
            Some(slot) => *slot = rule,
            None => self.rules.push(rule),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// Like [`RuleRegistry::get`], but an unknown name is an error.
    pub fn rule(&self, name: &str) -> Result<&Rule, EngineError> {
        self.get(name)
            .ok_or_else(|| EngineError::UnknownSubstitution(name.to_string()))
    }

    /// Rules that can expand a chord, in registration order
    pub fn substitutions(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|r| r.substitute.is_some())
    }

    /// Names of the substitutions whose `validate` accepts `chord`.
    pub fn offered(
        &self,
        chord: &ChordNode,
        theory: &dyn Theory,
    ) -> Result<Vec<&'static str>, EngineError> {
        let mut offered = Vec::new();
        for rule in self.substitutions() {
            if rule.validate(chord, theory)? {
                offered.push(rule.name);
            }
        }
        Ok(offered)
    }

    /// Collapse `node` with the rule named by its own `type`.
    pub fn collapse(&self, node: &Arc<Node>, cx: &RuleCx<'_>) -> Result<Arc<Node>, EngineError> {
        self.rule(node.kind())?.collapse(node, cx)
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

fn build_chord(cx: &RuleCx<'_>, root: String, token: &str) -> Arc<Node> {
    Arc::new(Node::Chord(ChordNode::new(cx.ids.new_id(), root, token)))
}

fn is_dominant(chord: &ChordNode, theory: &dyn Theory) -> Result<bool, EngineError> {
    Ok(theory.quality(&chord.root, &chord.name)? == Quality::Dominant)
}

fn always(_: &ChordNode, _: &dyn Theory) -> Result<bool, EngineError> {
    Ok(true)
}

fn never(_: &ChordNode, _: &dyn Theory) -> Result<bool, EngineError> {
    Ok(false)
}

fn keep(node: &Arc<Node>, _: &RuleCx<'_>) -> Result<Arc<Node>, EngineError> {
    Ok(node.clone())
}

fn no_context(_: &Node, _: &GroupNode) -> Option<String> {
    None
}

/// Collapse the resolved side: the last child, by its own rule.
fn collapse_last_child(node: &Arc<Node>, cx: &RuleCx<'_>) -> Result<Arc<Node>, EngineError> {
    match node.as_group() {
        Some(group) => cx.rules.collapse(group.last_child(), cx),
        None => Ok(node.clone()),
    }
}

/// Role text for the two slots of a resolution group.
fn resolution_context(
    node: &Node,
    parent: &GroupNode,
    describe: fn(&str, &str) -> (String, String),
) -> Option<String> {
    let (inserted, target) = Shape::resolution_parts(parent)?;
    let (as_inserted, as_target) = describe(
        &root_chord_of(inserted).symbol(),
        &root_chord_of(target).symbol(),
    );
    if node.id() == inserted.id() {
        Some(as_inserted)
    } else if node.id() == target.id() {
        Some(as_target)
    } else {
        None
    }
}

fn chord_rule() -> Rule {
    Rule {
        name: CHORD_TYPE,
        label: "chord",
        description: "A single chord. It has nothing to collapse and cannot be substituted away \
                      without first being wrapped by a substitution.",
        shape: Shape::Leaf,
        validate: never,
        substitute: None,
        collapse: keep,
        context: no_context,
    }
}

fn v_i_substitute(node: &Arc<Node>, cx: &RuleCx<'_>) -> Result<GroupNode, EngineError> {
    let tonic = root_chord_of(node);
    let dominant = cx.theory.transpose(&tonic.root, Interval::PerfectFifth)?;
    let group = GroupNode::new(
        cx.ids.new_id(),
        V_I,
        vec![build_chord(cx, dominant, "7"), node.clone()],
    )?;
    Ok(group)
}

fn v_i_context(node: &Node, parent: &GroupNode) -> Option<String> {
    resolution_context(node, parent, |dominant, tonic| {
        (
            format!("{dominant} is acting as the dominant (V) of {tonic}."),
            format!("{tonic} is the resolution (I) of {dominant}."),
        )
    })
}

fn v_i_rule() -> Rule {
    Rule {
        name: V_I,
        label: "V-I",
        description: "Secondary dominant. Any chord can be approached by the dominant seventh \
                      chord a perfect fifth above it, which pulls strongly toward it.",
        shape: Shape::Resolution,
        validate: always,
        substitute: Some(v_i_substitute),
        collapse: collapse_last_child,
        context: v_i_context,
    }
}

fn ii_v_substitute(node: &Arc<Node>, cx: &RuleCx<'_>) -> Result<GroupNode, EngineError> {
    let dominant = root_chord_of(node);
    let fourth = cx.theory.transpose(&dominant.root, Interval::PerfectFourth)?;
    let supertonic = cx.theory.transpose(&fourth, Interval::MajorSecond)?;
    let group = GroupNode::new(
        cx.ids.new_id(),
        II_V,
        vec![build_chord(cx, supertonic, "m7"), node.clone()],
    )?;
    Ok(group)
}

fn ii_v_context(node: &Node, parent: &GroupNode) -> Option<String> {
    resolution_context(node, parent, |supertonic, dominant| {
        (
            format!("{supertonic} is acting as the ii, preparing {dominant}."),
            format!("{dominant} is acting as the V, prepared by {supertonic}."),
        )
    })
}

fn ii_v_rule() -> Rule {
    Rule {
        name: II_V,
        label: "ii-V",
        description: "A dominant chord can be prepared by the minor seventh chord a fifth above \
                      it, turning a single V into the ii-V motion at the heart of jazz harmony.",
        shape: Shape::Resolution,
        validate: is_dominant,
        substitute: Some(ii_v_substitute),
        collapse: collapse_last_child,
        context: ii_v_context,
    }
}

fn tritone_substitute(node: &Arc<Node>, cx: &RuleCx<'_>) -> Result<GroupNode, EngineError> {
    let dominant = root_chord_of(node);
    let tritone = cx.theory.transpose(&dominant.root, Interval::DiminishedFifth)?;
    let group = GroupNode::new(cx.ids.new_id(), TRITONE, vec![build_chord(cx, tritone, "7")])?;
    Ok(group)
}

/// The original dominant is an augmented fourth above the substitute.
fn tritone_collapse(node: &Arc<Node>, cx: &RuleCx<'_>) -> Result<Arc<Node>, EngineError> {
    let Some(group) = node.as_group() else {
        return Ok(node.clone());
    };
    let substitute = root_chord_of(group.first_child());
    let original = cx.theory.transpose(&substitute.root, Interval::AugmentedFourth)?;
    Ok(build_chord(cx, original, "7"))
}

fn tritone_context(node: &Node, parent: &GroupNode) -> Option<String> {
    let child = parent.first_child();
    if node.id() != child.id() {
        return None;
    }
    Some(format!(
        "{} is a tritone substitute, standing in for the dominant a tritone away.",
        root_chord_of(child).symbol()
    ))
}

fn tritone_rule() -> Rule {
    Rule {
        name: TRITONE,
        label: "tri",
        description: "Two dominant seventh chords a tritone apart share their third and \
                      seventh, so either can stand in for the other.",
        shape: Shape::Replacement,
        validate: is_dominant,
        substitute: Some(tritone_substitute),
        collapse: tritone_collapse,
        context: tritone_context,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIds;
    use crate::theory::PitchTheory;
    use pretty_assertions::assert_eq;

    fn chord(id: &str, root: &str, name: &str) -> Arc<Node> {
        Arc::new(Node::Chord(ChordNode::new(id.into(), root, name)))
    }

    #[test]
    fn test_standard_registry_order() {
        let registry = RuleRegistry::standard();
        let names: Vec<_> = registry.substitutions().map(|r| r.name).collect();
        assert_eq!(names, vec![V_I, II_V, TRITONE]);
        assert!(registry.get(CHORD_TYPE).is_some());
    }

    #[test]
    fn test_unknown_rule_is_an_error() {
        let registry = RuleRegistry::standard();
        assert_eq!(
            registry.rule("backdoor").unwrap_err(),
            EngineError::UnknownSubstitution("backdoor".to_string())
        );
    }

    #[test]
    fn test_offered_for_dominant_and_major() {
        let registry = RuleRegistry::standard();
        let g7 = ChordNode::new("a".into(), "G", "7");
        let cmaj7 = ChordNode::new("b".into(), "C", "maj7");

        assert_eq!(registry.offered(&g7, &PitchTheory).unwrap(), vec![V_I, II_V, TRITONE]);
        assert_eq!(registry.offered(&cmaj7, &PitchTheory).unwrap(), vec![V_I]);
    }

    #[test]
    fn test_chord_pseudo_rule() {
        let registry = RuleRegistry::standard();
        let ids = SequentialIds::new("n");
        let cx = RuleCx {
            theory: &PitchTheory,
            ids: &ids,
            rules: &registry,
        };
        let rule = registry.rule(CHORD_TYPE).unwrap();
        let node = chord("a", "C", "maj7");

        assert!(!rule.validate(node.as_chord().unwrap(), &PitchTheory).unwrap());
        assert!(rule.substitute(&node, &cx).unwrap().is_none());
        assert!(Arc::ptr_eq(&rule.collapse(&node, &cx).unwrap(), &node));
    }

    fn broken_substitute(node: &Arc<Node>, cx: &RuleCx<'_>) -> Result<GroupNode, EngineError> {
        Ok(GroupNode::new(cx.ids.new_id(), "broken", vec![node.clone()])?)
    }

    #[test]
    fn test_shape_mismatch_is_reported() {
        let mut registry = RuleRegistry::standard();
        registry.register(Rule {
            name: "broken",
            label: "broken",
            description: "",
            shape: Shape::Resolution,
            validate: always,
            substitute: Some(broken_substitute),
            collapse: collapse_last_child,
            context: no_context,
        });
        let ids = SequentialIds::new("n");
        let cx = RuleCx {
            theory: &PitchTheory,
            ids: &ids,
            rules: &registry,
        };

        let err = registry
            .rule("broken")
            .unwrap()
            .substitute(&chord("a", "C", ""), &cx)
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::ShapeMismatch {
                rule: "broken".to_string(),
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn test_context_by_position() {
        let registry = RuleRegistry::standard();
        let ids = SequentialIds::new("n");
        let cx = RuleCx {
            theory: &PitchTheory,
            ids: &ids,
            rules: &registry,
        };
        let target = chord("a", "C", "maj7");
        let group = registry.rule(V_I).unwrap().substitute(&target, &cx).unwrap().unwrap();
        let rule = registry.rule(V_I).unwrap();

        assert_eq!(
            rule.context(&group.children()[0], &group).as_deref(),
            Some("G7 is acting as the dominant (V) of Cmaj7.")
        );
        assert_eq!(
            rule.context(&target, &group).as_deref(),
            Some("Cmaj7 is the resolution (I) of G7.")
        );
        assert_eq!(rule.context(&chord("zz", "D", "m7"), &group), None);
    }
}
