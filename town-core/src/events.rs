//! Notifications emitted when the layer hierarchy changes.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geometry::Rect;

/// A change to the layer tree, queued by the compositor until the caller drains it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LayerEvent {
    Created { name: String, rect: Rect },
    Renamed { from: String, to: String },
    Deleted { name: String, cascade: bool },
    Selected { name: String, rect: Rect },
    Moved { name: String, parent: String },
}

impl fmt::Display for LayerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created { name, rect } => write!(f, "created layer '{name}' at {rect}"),
            Self::Renamed { from, to } => write!(f, "renamed layer '{from}' to '{to}'"),
            Self::Deleted { name, cascade } => {
                if *cascade {
                    write!(f, "deleted layer '{name}' and its children")
                } else {
                    write!(f, "deleted layer '{name}'")
                }
            }
            Self::Selected { name, rect } => write!(f, "selected layer '{name}' at {rect}"),
            Self::Moved { name, parent } => write!(f, "moved layer '{name}' under '{parent}'"),
        }
    }
}
