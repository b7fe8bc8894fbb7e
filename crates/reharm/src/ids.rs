//! Node identifier generation.

use std::cell::Cell;

use uuid::Uuid;

use crate::engine;
use crate::error::NodeError;
use crate::node::{NodeId, Progression};

/// Issues ids that are unique among every id issued in a session.
pub trait IdSource {
    fn new_id(&self) -> NodeId;
}

/// Any `Fn() -> NodeId` is an id source.
impl<F> IdSource for F
where
    F: Fn() -> NodeId,
{
    fn new_id(&self) -> NodeId {
        self()
    }
}

/// Random v4 UUIDs in simple (hyphenless) form.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdSource for UuidIds {
    fn new_id(&self) -> NodeId {
        NodeId::new(Uuid::new_v4().simple().to_string())
    }
}

/// `prefix1`, `prefix2`, ... Deterministic, for tests and reproducible output.
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    next: Cell<u64>,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        SequentialIds {
            prefix: prefix.into(),
            next: Cell::new(1),
        }
    }

    /// Continue numbering after the highest `prefix<N>` id already in `forest`.
    ///
    /// Fails when that id is already the last number the counter can hold.
    pub fn resume(prefix: impl Into<String>, forest: &Progression) -> Result<Self, NodeError> {
        let prefix = prefix.into();
        let highest = engine::node_ids(forest.nodes())
            .into_iter()
            .filter_map(|id| {
                let n = id.as_str().strip_prefix(prefix.as_str())?.parse::<u64>().ok()?;
                Some((n, id))
            })
            .max_by_key(|(n, _)| *n);

        let next = match highest {
            None => 1,
            Some((n, id)) => n
                .checked_add(1)
                .ok_or_else(|| NodeError::IdsExhausted(id.clone()))?,
        };

        Ok(SequentialIds {
            prefix,
            next: Cell::new(next),
        })
    }
}

impl IdSource for SequentialIds {
    fn new_id(&self) -> NodeId {
        let n = self.next.get();
        self.next.set(n.saturating_add(1));
        NodeId::new(format!("{}{}", self.prefix, n))
    }
}
