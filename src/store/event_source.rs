use std::{
    collections::{HashMap, HashSet},
    fs,
    path::Path
};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    error::ProcessorError,
    model::{
        lineage::LineageResolver,
        structures::{
            directory::{Constructor, Driver, LineageEntry},
            event::{sort_events, Event},
            DriverId, LineageId
        }
    }
};

/// A full replay input: the directory tables plus every event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayInput {
    #[serde(default)]
    pub drivers: Vec<Driver>,
    #[serde(default)]
    pub constructors: Vec<Constructor>,
    #[serde(default)]
    pub lineages: Vec<LineageEntry>,
    #[serde(default)]
    pub events: Vec<Event>
}

impl ReplayInput {
    /// Reads a JSON dump and puts its events into replay order.
    pub fn from_file(path: &Path) -> Result<ReplayInput, ProcessorError> {
        let contents = fs::read_to_string(path).map_err(|source| ProcessorError::Io {
            path: path.to_path_buf(),
            source
        })?;

        let input = Self::from_json(&contents)?;
        info!(
            path = %path.display(),
            events = input.events.len(),
            drivers = input.drivers.len(),
            constructors = input.constructors.len(),
            "Loaded replay input"
        );

        Ok(input)
    }

    pub fn from_json(contents: &str) -> Result<ReplayInput, ProcessorError> {
        let mut input: ReplayInput = serde_json::from_str(contents)?;
        sort_events(&mut input.events);
        input.warn_unknown_ids();
        Ok(input)
    }

    fn warn_unknown_ids(&self) {
        if self.drivers.is_empty() {
            return;
        }

        let known_drivers: HashSet<DriverId> = self.drivers.iter().map(|d| d.id).collect();
        let unknown = self
            .events
            .iter()
            .flat_map(|e| e.results.iter())
            .filter(|r| !known_drivers.contains(&r.driver_id))
            .count();

        if unknown > 0 {
            warn!(rows = unknown, "Results reference drivers missing from the directory");
        }
    }

    pub fn lineage_resolver(&self) -> LineageResolver {
        LineageResolver::new(&self.lineages)
    }

    pub fn driver_names(&self) -> HashMap<DriverId, String> {
        self.drivers.iter().map(|d| (d.id, d.name.clone())).collect()
    }

    /// Each lineage is named after the constructor that most recently raced
    /// under it. Lineages that never raced fall back to the constructor
    /// sharing their id.
    pub fn lineage_names(&self, resolver: &LineageResolver) -> HashMap<LineageId, String> {
        let constructor_names: HashMap<i32, &String> = self.constructors.iter().map(|c| (c.id, &c.name)).collect();

        let mut names: HashMap<LineageId, String> = self
            .constructors
            .iter()
            .map(|c| (resolver.resolve(c.id), c))
            .filter(|(lineage, c)| *lineage == c.id)
            .map(|(lineage, c)| (lineage, c.name.clone()))
            .collect();

        for row in self.events.iter().flat_map(|e| e.results.iter()) {
            if let Some(name) = constructor_names.get(&row.constructor_id) {
                names.insert(resolver.resolve(row.constructor_id), (*name).clone());
            }
        }

        names
    }
}
