//! CLI command implementations.
//!
//! Each command returns the text to print so it can be checked in tests;
//! `main` does the printing.

use anyhow::{bail, Context, Result};
use reharm::{
    IdSource, NodeId, Outcome, PitchTheory, Progression, SequentialIds, Session, SessionSnapshot,
    UuidIds,
};
use reharmconf::{IdStrategy, ReharmConfig};

use crate::codec;
use crate::render::render;

/// The id source picked by `ids.strategy`.
pub enum Ids {
    Uuid(UuidIds),
    Sequential(SequentialIds),
}

impl Ids {
    /// Sequential ids continue after the highest one already in `forest`.
    pub fn for_forest(config: &ReharmConfig, forest: &Progression) -> Result<Self> {
        Ok(match config.ids.strategy {
            IdStrategy::Uuid => Ids::Uuid(UuidIds),
            IdStrategy::Sequential => Ids::Sequential(
                SequentialIds::resume(config.ids.prefix.as_str(), forest)
                    .context("Cannot continue sequential ids")?,
            ),
        })
    }
}

impl IdSource for Ids {
    fn new_id(&self) -> NodeId {
        match self {
            Ids::Uuid(ids) => ids.new_id(),
            Ids::Sequential(ids) => ids.new_id(),
        }
    }
}

/// Restore the session carried by `token`.
pub fn open(token: Option<&str>, config: &ReharmConfig) -> Result<Session> {
    let Some(token) = token else {
        bail!(
            "No session given.\n\n\
             Start one with `reharm new` and pass the printed token with\n  \
             --session <TOKEN>\n\
             or export it as REHARM_SESSION."
        );
    };

    from_snapshot(codec::decode(token)?, config)
}

/// Restore an already decoded snapshot.
pub fn from_snapshot(snapshot: SessionSnapshot, config: &ReharmConfig) -> Result<Session> {
    let ids = Ids::for_forest(config, &snapshot.progression)?;
    Session::from_snapshot(snapshot, PitchTheory, ids).context("Session token is not usable")
}

/// Rendered tree followed by the token for the session's new state.
fn report(session: &Session, outcome: Outcome) -> Result<String> {
    let mut out = render(session);
    if outcome == Outcome::Unchanged {
        out.push_str("(unchanged)\n");
    }
    out.push_str(&format!("session: {}\n", codec::encode(&session.snapshot())?));
    Ok(out)
}

/// Start a session in the given key, optionally seeded with one chord.
pub fn new(
    config: &ReharmConfig,
    key: Option<&str>,
    scale: Option<&str>,
    chord: Option<&str>,
    token: Option<&str>,
) -> Result<String> {
    let tonic = key.unwrap_or(&config.defaults.tonic);
    let scale = scale.unwrap_or(&config.defaults.scale);

    let ids = Ids::for_forest(config, &Progression::empty())?;
    let mut session = Session::new(PitchTheory, ids);
    session
        .choose_key(tonic, scale)
        .with_context(|| format!("Cannot use key {tonic} {scale}"))?;

    if let Some(root) = chord {
        let token = token.unwrap_or(&config.defaults.chord);
        session
            .add_chord(root, token)
            .with_context(|| format!("Cannot build chord {root}{token}"))?;
    }

    report(&session, Outcome::Changed)
}

pub fn add(session: &mut Session, config: &ReharmConfig, root: &str, token: Option<&str>) -> Result<String> {
    let token = token.unwrap_or(&config.defaults.chord);
    session
        .add_chord(root, token)
        .with_context(|| format!("Cannot build chord {root}{token}"))?;
    report(session, Outcome::Changed)
}

pub fn select(session: &mut Session, id: &str) -> Result<String> {
    let outcome = session.select(&NodeId::new(id))?;
    report(session, outcome)
}

pub fn substitute(session: &mut Session, id: &str, kind: &str) -> Result<String> {
    let outcome = session.request_substitution(&NodeId::new(id), kind)?;
    report(session, outcome)
}

pub fn collapse(session: &mut Session, id: &str) -> Result<String> {
    let outcome = session.request_collapse(&NodeId::new(id))?;
    report(session, outcome)
}

/// The tree, plus the role of the selected node if there is one.
pub fn show(session: &Session) -> String {
    let mut out = render(session);
    if let Some(selected) = session.selected() {
        let role = session
            .describe(selected.id())
            .unwrap_or_else(|| "no longer in the progression.".to_string());
        out.push_str(&format!("selected {}: {}\n", selected.id(), role));
    }
    out
}

/// What node `id` is doing and which substitutions apply to it.
pub fn offer(session: &Session, id: &str) -> Result<String> {
    let id = NodeId::new(id);
    let Some(role) = session.describe(&id) else {
        bail!("No node {id} in the progression");
    };

    let mut out = format!("{role}\n");
    let offered = session.offered(&id)?;
    if offered.is_empty() {
        out.push_str("No substitutions apply.\n");
    }
    for name in offered {
        let rule = session.rules().rule(name)?;
        out.push_str(&format!("  {:<8} {:<5} {}\n", rule.name, rule.label, rule.description));
    }
    Ok(out)
}

/// Every substitution the standard registry knows.
pub fn rules() -> String {
    let registry = reharm::RuleRegistry::standard();
    let mut out = String::new();
    for rule in registry.substitutions() {
        out.push_str(&format!(
            "{} ({}, {} child{})\n    {}\n",
            rule.name,
            rule.label,
            rule.shape.arity(),
            if rule.shape.arity() == 1 { "" } else { "ren" },
            rule.description
        ));
    }
    out
}

/// The effective configuration and where it came from.
pub fn config(config: &ReharmConfig, sources: &reharmconf::ConfigSources) -> Result<String> {
    let mut out = config.to_toml()?;
    out.push('\n');
    for file in &sources.files {
        out.push_str(&format!("# loaded {}\n", file.display()));
    }
    for var in &sources.env_overrides {
        out.push_str(&format!("# overridden by ${var}\n"));
    }
    Ok(out)
}
