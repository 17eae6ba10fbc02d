//! CSV dependency manifest loader.
//!
//! # CSV format
//!
//! One row per dependency edge.  A row with an empty `depends_on` only
//! declares the component.
//!
//! ```csv
//! component_id,phase,depends_on
//! 0,init,
//! 1,init,
//! 2,init,0
//! 2,init,1
//! 2,advance,0
//! 2,advance,1
//! ```
//!
//! **`phase`** is `init`, `advance`, or `shutdown` (case-insensitive).
//!
//! The manifest only describes wiring.  Which concrete component sits behind
//! each id is decided by the application's factory.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use sim_core::{ComponentId, Phase};

use crate::{DependencyLists, ManifestError};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ManifestRecord {
    component_id: u32,
    phase:        String,
    depends_on:   Option<u32>,
}

// ── Manifest ──────────────────────────────────────────────────────────────────

/// Dependency lists keyed by component id, ascending.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Manifest {
    lists: BTreeMap<ComponentId, DependencyLists>,
}

impl Manifest {
    /// Every component mentioned in the `component_id` column, ascending.
    pub fn ids(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.lists.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Dependency lists of `id`; empty lists for an id the manifest never mentions.
    pub fn dependencies(&self, id: ComponentId) -> DependencyLists {
        self.lists.get(&id).cloned().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ComponentId, &DependencyLists)> + '_ {
        self.lists.iter().map(|(&id, lists)| (id, lists))
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a dependency manifest from a CSV file.
pub fn load_manifest_csv(path: &Path) -> Result<Manifest, ManifestError> {
    let file = std::fs::File::open(path).map_err(ManifestError::Io)?;
    load_manifest_reader(file)
}

/// Like [`load_manifest_csv`] but accepts any `Read` source.
pub fn load_manifest_reader<R: Read>(reader: R) -> Result<Manifest, ManifestError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut lists: BTreeMap<ComponentId, DependencyLists> = BTreeMap::new();

    for result in csv_reader.deserialize::<ManifestRecord>() {
        let row = result.map_err(|e| ManifestError::Parse(e.to_string()))?;
        let phase: Phase = row
            .phase
            .parse()
            .map_err(|e: sim_core::CoreError| ManifestError::Parse(e.to_string()))?;

        let entry = lists.entry(ComponentId(row.component_id)).or_default();
        if let Some(dep) = row.depends_on {
            entry.push(phase, ComponentId(dep));
        }
    }

    Ok(Manifest { lists })
}
