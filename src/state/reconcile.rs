use crate::state::entity::{Snapshot, Turtle};
use serde::Serialize;
use std::collections::BTreeMap;

/// Local table of turtles keyed by turtle id
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TurtleTable {
    turtles: BTreeMap<String, Turtle>,
}

impl TurtleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Turtle> {
        self.turtles.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Turtle)> {
        self.turtles.iter()
    }

    pub fn len(&self) -> usize {
        self.turtles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turtles.is_empty()
    }

    /// Ids of the turtles currently enabled
    pub fn enabled_ids(&self) -> Vec<&str> {
        self.turtles
            .iter()
            .filter(|(_, turtle)| turtle.enabled())
            .map(|(id, _)| id.as_str())
            .collect()
    }
}

/// Fold a snapshot into the table
///
/// New ids are inserted disabled unless the snapshot says otherwise, known ids
/// are shallow-merged, ids the snapshot does not mention are kept as they are.
pub fn reconcile(table: &TurtleTable, snapshot: &Snapshot) -> TurtleTable {
    let mut next = table.clone();
    for (id, patch) in snapshot {
        next.turtles
            .entry(id.clone())
            .or_insert_with(Turtle::new)
            .merge_patch(patch);
    }
    next
}
