//! Matrix vs grouped contour layout detection.
//!
//! Contour blocks come in two layouts: a matrix of `[face] x y radius` rows,
//! or an optional leading face followed by `(x, y)` pairs. The decision is a
//! heuristic made by an ordered list of rules; the first rule with an
//! opinion wins and `Grouped` is the fallback.

use std::fmt;

use tracing::debug;

use super::fields::{is_face_coded, parse_work_plane, Fields};
use crate::config::float_cmp::approx_zero;
use crate::config::ContourLayoutRules;

/// Field layout of a contour block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContourLayout {
    /// Rows of `[face] x y radius`.
    Matrix,
    /// Optional face, then `(x, y)` pairs.
    Grouped,
}

/// Token statistics the layout rules look at.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldStats {
    /// Tokens other than work planes.
    pub total: usize,
    /// Tokens carrying a face code, alone or as prefix.
    pub face_coded: usize,
    /// Numeric values in order, face prefixes stripped.
    pub numbers: Vec<f64>,
}

impl FieldStats {
    pub fn collect(fields: &Fields<'_>) -> Self {
        let mut stats = FieldStats {
            numbers: fields.numbers(),
            ..Default::default()
        };
        for token in fields.iter().filter(|t| parse_work_plane(t).is_none()) {
            stats.total += 1;
            if is_face_coded(token) {
                stats.face_coded += 1;
            }
        }
        stats
    }

    pub fn face_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.face_coded as f64 / self.total as f64
        }
    }
}

/// One heuristic in the layout decision chain.
pub trait LayoutRule: Send + Sync {
    fn name(&self) -> &'static str;

    /// `None` when the rule has no opinion.
    fn classify(&self, stats: &FieldStats) -> Option<ContourLayout>;
}

/// Many face codes means one face per row.
#[derive(Debug, Clone)]
pub struct FaceDensityRule {
    pub min_ratio: f64,
}

impl LayoutRule for FaceDensityRule {
    fn name(&self) -> &'static str {
        "face_density"
    }

    fn classify(&self, stats: &FieldStats) -> Option<ContourLayout> {
        (stats.face_coded >= 2 && stats.face_ratio() >= self.min_ratio)
            .then_some(ContourLayout::Matrix)
    }
}

/// A third column of zero radii means `x y radius` rows.
#[derive(Debug, Clone)]
pub struct ZeroColumnRule {
    pub min_fields: usize,
}

impl LayoutRule for ZeroColumnRule {
    fn name(&self) -> &'static str {
        "zero_column"
    }

    fn classify(&self, stats: &FieldStats) -> Option<ContourLayout> {
        let n = stats.numbers.len();
        if n < self.min_fields || n % 3 != 0 {
            return None;
        }
        let radii_zero = stats.numbers.iter().skip(2).step_by(3).all(|v| approx_zero(*v));
        let coords_nonzero = stats
            .numbers
            .chunks(3)
            .any(|row| !approx_zero(row[0]) || !approx_zero(row[1]));
        (radii_zero && coords_nonzero).then_some(ContourLayout::Matrix)
    }
}

/// Ordered chain of layout rules.
pub struct LayoutClassifier {
    rules: Vec<Box<dyn LayoutRule>>,
}

impl LayoutClassifier {
    /// The built-in rules configured by `rules`.
    pub fn new(rules: &ContourLayoutRules) -> Self {
        Self {
            rules: vec![
                Box::new(FaceDensityRule {
                    min_ratio: rules.min_face_ratio,
                }),
                Box::new(ZeroColumnRule {
                    min_fields: rules.min_zero_column_fields,
                }),
            ],
        }
    }

    /// Append a rule after the existing ones.
    pub fn push(&mut self, rule: Box<dyn LayoutRule>) {
        self.rules.push(rule);
    }

    /// Insert a rule ahead of the existing ones.
    pub fn push_front(&mut self, rule: Box<dyn LayoutRule>) {
        self.rules.insert(0, rule);
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn classify(&self, fields: &Fields<'_>) -> ContourLayout {
        let stats = FieldStats::collect(fields);
        for rule in &self.rules {
            if let Some(layout) = rule.classify(&stats) {
                debug!(kind = %fields.kind(), rule = rule.name(), ?layout, "contour layout detected");
                return layout;
            }
        }
        debug!(kind = %fields.kind(), layout = ?ContourLayout::Grouped, "contour layout defaulted");
        ContourLayout::Grouped
    }
}

impl Default for LayoutClassifier {
    fn default() -> Self {
        Self::new(&ContourLayoutRules::default())
    }
}

impl fmt::Debug for LayoutClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutClassifier")
            .field("rules", &self.rule_names())
            .finish()
    }
}

/// Classify with the built-in rule chain.
pub fn classify_contour_layout(fields: &Fields<'_>, rules: &ContourLayoutRules) -> ContourLayout {
    LayoutClassifier::new(rules).classify(fields)
}
