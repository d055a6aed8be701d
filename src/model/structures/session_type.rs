use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// The two independent rating pools every competitor carries.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SessionType {
    Qualifying,
    Race
}
