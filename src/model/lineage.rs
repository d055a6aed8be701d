use std::collections::HashMap;

use tracing::warn;

use crate::model::structures::{directory::LineageEntry, ConstructorId, LineageId};

/// Maps every historical constructor identity onto its persistent lineage.
/// Constructors without an entry are their own lineage.
#[derive(Debug, Clone, Default)]
pub struct LineageResolver {
    table: HashMap<ConstructorId, LineageId>
}

impl LineageResolver {
    /// Builds the lookup, following chained entries (A -> B -> C resolves A to C).
    /// When a constructor is listed twice the last entry wins.
    pub fn new(entries: &[LineageEntry]) -> LineageResolver {
        let mut raw: HashMap<ConstructorId, LineageId> = HashMap::with_capacity(entries.len());
        for entry in entries {
            if let Some(previous) = raw.insert(entry.constructor_id, entry.lineage_id) {
                if previous != entry.lineage_id {
                    warn!(
                        constructor_id = entry.constructor_id,
                        previous, replacement = entry.lineage_id, "Constructor mapped to two lineages"
                    );
                }
            }
        }

        let table = raw
            .iter()
            .map(|(&constructor, &target)| (constructor, Self::follow(&raw, constructor, target)))
            .collect();

        LineageResolver { table }
    }

    fn follow(raw: &HashMap<ConstructorId, LineageId>, constructor: ConstructorId, target: LineageId) -> LineageId {
        let mut current = target;
        for _ in 0..raw.len() {
            match raw.get(&current) {
                Some(&next) if next != current => current = next,
                _ => return current
            }
        }

        warn!(constructor_id = constructor, "Lineage table contains a cycle, using the direct mapping");
        target
    }

    pub fn resolve(&self, constructor_id: ConstructorId) -> LineageId {
        self.table.get(&constructor_id).copied().unwrap_or(constructor_id)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
