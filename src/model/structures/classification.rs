use serde_repr::{Deserialize_repr, Serialize_repr};
use std::convert::TryFrom;

/// Category assigned to a free-text result status.
#[derive(Deserialize_repr, Serialize_repr, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Classification {
    Finished = 0,
    MechanicalFailure = 1,
    DriverError = 2,
    Unclassified = 3
}

impl TryFrom<i32> for Classification {
    type Error = ();
    fn try_from(v: i32) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Classification::Finished),
            1 => Ok(Classification::MechanicalFailure),
            2 => Ok(Classification::DriverError),
            3 => Ok(Classification::Unclassified),
            _ => Err(())
        }
    }
}
