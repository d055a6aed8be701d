use serde::{Deserialize, Serialize};

use super::{ConstructorId, DriverId, LineageId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    pub id: DriverId,
    pub name: String
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constructor {
    pub id: ConstructorId,
    pub name: String
}

/// One row of the lineage table: `constructor_id` competes under `lineage_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageEntry {
    pub constructor_id: ConstructorId,
    pub lineage_id: LineageId
}
