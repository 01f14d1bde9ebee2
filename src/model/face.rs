//! Face indicators and work planes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Physical face of a profile.
///
/// Legacy letters map the same way for every block kind:
/// `o` top flange, `u` bottom flange, `v` web front, `h` web rear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Face {
    /// Top flange (`o`).
    Top,
    /// Bottom flange (`u`).
    Bottom,
    /// Web, front side (`v`).
    Web,
    /// Web, rear side (`h`).
    Rear,
}

impl Face {
    /// All faces.
    pub const ALL: [Face; 4] = [Face::Top, Face::Bottom, Face::Web, Face::Rear];

    /// Parse a legacy face letter.
    pub fn from_letter(c: char) -> Option<Self> {
        match c {
            'o' | 'O' => Some(Face::Top),
            'u' | 'U' => Some(Face::Bottom),
            'v' | 'V' => Some(Face::Web),
            'h' | 'H' => Some(Face::Rear),
            _ => None,
        }
    }

    /// Legacy face letter.
    pub fn letter(&self) -> char {
        match self {
            Face::Top => 'o',
            Face::Bottom => 'u',
            Face::Web => 'v',
            Face::Rear => 'h',
        }
    }

    /// Whether this face lies on a flange.
    pub fn is_flange(&self) -> bool {
        matches!(self, Face::Top | Face::Bottom)
    }

    /// Work plane conventionally associated with the face.
    pub fn work_plane(&self) -> WorkPlane {
        match self {
            Face::Web => WorkPlane(0),
            Face::Top => WorkPlane(1),
            Face::Bottom => WorkPlane(2),
            Face::Rear => WorkPlane(3),
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Face::Top => "top",
            Face::Bottom => "bottom",
            Face::Web => "web",
            Face::Rear => "rear",
        };
        write!(f, "{}", name)
    }
}

/// Logical drawing plane `E0`..`E9`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WorkPlane(u8);

impl WorkPlane {
    /// Create a work plane from its index; `None` above 9.
    pub fn new(index: u8) -> Option<Self> {
        (index <= 9).then_some(WorkPlane(index))
    }

    /// Parse a token of the exact form `E[0-9]`.
    pub fn parse(token: &str) -> Option<Self> {
        let mut chars = token.trim().chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some('E') | Some('e'), Some(d), None) => d.to_digit(10).map(|d| WorkPlane(d as u8)),
            _ => None,
        }
    }

    pub fn index(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for WorkPlane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

impl TryFrom<String> for WorkPlane {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        WorkPlane::parse(&value).ok_or_else(|| format!("invalid work plane '{}'", value))
    }
}

impl From<WorkPlane> for String {
    fn from(plane: WorkPlane) -> Self {
        plane.to_string()
    }
}
