//! Block kinds and raw (tokenized) block records.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{DecodeError, DecodeResult};

/// Kind of an NC block, identified by its two-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BlockKind {
    /// Piece header (ST).
    #[serde(rename = "ST")]
    Header,
    /// Outer contour (AK).
    #[serde(rename = "AK")]
    OuterContour,
    /// Inner contour (IK).
    #[serde(rename = "IK")]
    InnerContour,
    /// Straight/rectangular cut (SC).
    #[serde(rename = "SC")]
    Cut,
    /// Arc contour (KA).
    #[serde(rename = "KA")]
    ArcContour,
    /// Free-form contour (UE, also written KO).
    #[serde(rename = "UE", alias = "KO")]
    FreeformContour,
    /// Hole (BO).
    #[serde(rename = "BO")]
    Hole,
    /// Punch mark (PU).
    #[serde(rename = "PU")]
    Punch,
    /// Text marking (SI).
    #[serde(rename = "SI")]
    Marking,
    /// End record (EN).
    #[serde(rename = "EN")]
    End,
}

impl BlockKind {
    /// All block kinds in canonical file order.
    pub const ALL: [BlockKind; 10] = [
        BlockKind::Header,
        BlockKind::OuterContour,
        BlockKind::InnerContour,
        BlockKind::Cut,
        BlockKind::ArcContour,
        BlockKind::FreeformContour,
        BlockKind::Hole,
        BlockKind::Punch,
        BlockKind::Marking,
        BlockKind::End,
    ];

    /// Two-letter block code.
    pub fn code(&self) -> &'static str {
        match self {
            BlockKind::Header => "ST",
            BlockKind::OuterContour => "AK",
            BlockKind::InnerContour => "IK",
            BlockKind::Cut => "SC",
            BlockKind::ArcContour => "KA",
            BlockKind::FreeformContour => "UE",
            BlockKind::Hole => "BO",
            BlockKind::Punch => "PU",
            BlockKind::Marking => "SI",
            BlockKind::End => "EN",
        }
    }

    /// Parse a block code (case-insensitive, surrounding whitespace ignored).
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "ST" => Some(BlockKind::Header),
            "AK" => Some(BlockKind::OuterContour),
            "IK" => Some(BlockKind::InnerContour),
            "SC" => Some(BlockKind::Cut),
            "KA" => Some(BlockKind::ArcContour),
            "UE" | "KO" => Some(BlockKind::FreeformContour),
            "BO" => Some(BlockKind::Hole),
            "PU" => Some(BlockKind::Punch),
            "SI" => Some(BlockKind::Marking),
            "EN" => Some(BlockKind::End),
            _ => None,
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// One block as handed over by the line/block splitter: a kind tag plus its
/// already tokenized fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBlock {
    pub kind: BlockKind,
    pub fields: Vec<String>,
}

impl RawBlock {
    /// Create a block from anything string-like.
    pub fn new<S: AsRef<str>>(kind: BlockKind, fields: &[S]) -> Self {
        Self {
            kind,
            fields: fields.iter().map(|s| s.as_ref().to_string()).collect(),
        }
    }

    /// Create a block from its two-letter code.
    pub fn from_code<S: AsRef<str>>(code: &str, fields: &[S]) -> DecodeResult<Self> {
        let kind = BlockKind::from_code(code).ok_or_else(|| DecodeError::UnknownBlock {
            code: code.trim().to_string(),
        })?;
        Ok(Self::new(kind, fields))
    }
}
