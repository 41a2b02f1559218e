//! Event classification for version records.
//!
//! Every persisted record carries exactly one of the three literals
//! `create`, `update`, `destroy`. A row without one is invalid and is
//! rejected when materialized, before it ever reaches reification.

use crate::TypeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of state transition a version record captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Event {
    /// The entity came into existence with this record's snapshot.
    Create,
    /// The entity's attributes changed.
    Update,
    /// The entity was removed. The snapshot still carries its final state
    /// so destroyed entities remain reconstructable.
    Destroy,
}

impl Event {
    /// Returns the persisted literal for this event.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Event::Create => "create",
            Event::Update => "update",
            Event::Destroy => "destroy",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Event {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Event::Create),
            "update" => Ok(Event::Update),
            "destroy" => Ok(Event::Destroy),
            other => Err(TypeError::MissingEvent(Some(other.to_string()))),
        }
    }
}
