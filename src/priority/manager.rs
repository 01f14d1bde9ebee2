//! Feature priority assignment and ordering.

use std::cmp::Reverse;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{Face, Feature};
use crate::validation::ValidationResult;

/// Priority classes, highest first. Contours must reach the solid-geometry
/// consumer before anything that cuts into them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityClass {
    Contour = 1000,
    CutWithNotches = 900,
    Bevel = 850,
    AngleCut = 800,
    StraightCut = 750,
    Hole = 500,
    Slot = 450,
    Marking = 100,
    Text = 50,
    Default = 0,
}

impl PriorityClass {
    pub const ALL: [PriorityClass; 10] = [
        PriorityClass::Contour,
        PriorityClass::CutWithNotches,
        PriorityClass::Bevel,
        PriorityClass::AngleCut,
        PriorityClass::StraightCut,
        PriorityClass::Hole,
        PriorityClass::Slot,
        PriorityClass::Marking,
        PriorityClass::Text,
        PriorityClass::Default,
    ];

    pub fn value(&self) -> i32 {
        *self as i32
    }

    /// Class with exactly this value, if any.
    pub fn from_value(value: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.value() == value)
    }

    pub fn label(&self) -> &'static str {
        match self {
            PriorityClass::Contour => "contour",
            PriorityClass::CutWithNotches => "cut_with_notches",
            PriorityClass::Bevel => "bevel",
            PriorityClass::AngleCut => "angle_cut",
            PriorityClass::StraightCut => "straight_cut",
            PriorityClass::Hole => "hole",
            PriorityClass::Slot => "slot",
            PriorityClass::Marking => "marking",
            PriorityClass::Text => "text",
            PriorityClass::Default => "default",
        }
    }
}

/// Type name to class table.
const PRIORITY_TABLE: &[(&str, PriorityClass)] = &[
    ("outer_contour", PriorityClass::Contour),
    ("inner_contour", PriorityClass::Contour),
    ("arc_contour", PriorityClass::Contour),
    ("freeform_contour", PriorityClass::Contour),
    ("notch_cut", PriorityClass::CutWithNotches),
    ("bevel_cut", PriorityClass::Bevel),
    ("angle_cut", PriorityClass::AngleCut),
    ("straight_cut", PriorityClass::StraightCut),
    ("hole", PriorityClass::Hole),
    ("slot", PriorityClass::Slot),
    ("marking", PriorityClass::Marking),
];

/// Pattern fallback for type names missing from the table.
fn class_from_pattern(type_name: &str) -> PriorityClass {
    if type_name.contains("contour") {
        PriorityClass::Contour
    } else if type_name.contains("cut") && type_name.contains("notch") {
        PriorityClass::CutWithNotches
    } else if type_name.contains("hole") || type_name.contains("drill") {
        PriorityClass::Hole
    } else if type_name.contains("mark") || type_name.contains("text") {
        PriorityClass::Marking
    } else {
        PriorityClass::Default
    }
}

/// Assigns priorities and orders feature lists.
///
/// Every operation returns a new list; inputs are never reordered in place.
#[derive(Debug, Clone, Default)]
pub struct PriorityManager {
    overrides: HashMap<String, i32>,
}

impl PriorityManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the priority of every feature with this type name.
    ///
    /// Returns the previous override, if any.
    pub fn set_override(&mut self, type_name: impl Into<String>, priority: i32) -> Option<i32> {
        self.overrides.insert(type_name.into(), priority)
    }

    pub fn clear_override(&mut self, type_name: &str) -> Option<i32> {
        self.overrides.remove(type_name)
    }

    /// Priority of a feature: override, then table, then name pattern.
    pub fn priority(&self, feature: &Feature) -> i32 {
        let type_name = feature.type_name();
        if let Some(&priority) = self.overrides.get(type_name) {
            return priority;
        }
        PRIORITY_TABLE
            .iter()
            .find(|(name, _)| *name == type_name)
            .map(|(_, class)| *class)
            .unwrap_or_else(|| class_from_pattern(type_name))
            .value()
    }

    /// Stable sort, highest priority first.
    pub fn sort_by_priority(&self, features: &[Feature]) -> Vec<Feature> {
        let mut sorted = features.to_vec();
        sorted.sort_by_key(|f| Reverse(self.priority(f)));
        sorted
    }

    /// Features grouped by priority, keys descending, input order kept inside
    /// each group.
    pub fn group_by_priority(&self, features: &[Feature]) -> Vec<(i32, Vec<Feature>)> {
        let mut groups: Vec<(i32, Vec<Feature>)> = Vec::new();
        for feature in self.sort_by_priority(features) {
            let priority = self.priority(&feature);
            match groups.last_mut() {
                Some((key, group)) if *key == priority => group.push(feature),
                _ => groups.push((priority, vec![feature])),
            }
        }
        groups
    }

    /// Priority-sorted list with the hole class clustered by face.
    ///
    /// Faces keep the order in which they first appear; other classes pass
    /// through unchanged.
    pub fn optimize_order(&self, features: &[Feature]) -> Vec<Feature> {
        let hole_priority = PriorityClass::Hole.value();
        let mut ordered = Vec::with_capacity(features.len());

        for (priority, group) in self.group_by_priority(features) {
            if priority != hole_priority {
                ordered.extend(group);
                continue;
            }

            let mut faces: Vec<Option<Face>> = Vec::new();
            for feature in &group {
                if !faces.contains(&feature.face()) {
                    faces.push(feature.face());
                }
            }
            debug!(holes = group.len(), faces = faces.len(), "clustering holes by face");

            for face in faces {
                ordered.extend(group.iter().filter(|f| f.face() == face).cloned());
            }
        }

        ordered
    }

    /// Check a sequence for priority inversions.
    ///
    /// Inversions between neighbours are warnings. A marking whose priority
    /// exceeds the hole class is an error.
    pub fn validate_order(&self, features: &[Feature]) -> ValidationResult {
        let mut result = ValidationResult::ok();
        let hole_priority = PriorityClass::Hole.value();

        for (i, pair) in features.windows(2).enumerate() {
            let (a, b) = (self.priority(&pair[0]), self.priority(&pair[1]));
            if a < b {
                result.add_warning(format!(
                    "Features {} and {}: {} ({}) precedes {} ({})",
                    i,
                    i + 1,
                    pair[0].type_name(),
                    a,
                    pair[1].type_name(),
                    b
                ));
            }
        }

        for (i, feature) in features.iter().enumerate() {
            if !matches!(feature, Feature::Marking(_)) {
                continue;
            }
            let priority = self.priority(feature);
            if priority > hole_priority {
                result.add_error(format!(
                    "Feature {}: marking has priority {}, above hole threshold {}",
                    i, priority, hole_priority
                ));
            }
        }

        result
    }

    /// Human-readable class counts plus order findings.
    pub fn report(&self, features: &[Feature]) -> String {
        let mut out = format!("Feature priority report: {} feature(s)\n", features.len());

        for (priority, group) in self.group_by_priority(features) {
            let label = PriorityClass::from_value(priority)
                .map(|c| c.label())
                .unwrap_or("custom");
            out.push_str(&format!("  {} {}: {}\n", priority, label, group.len()));
        }

        let check = self.validate_order(features);
        out.push_str(&format!(
            "Order: {}, {} error(s), {} warning(s)\n",
            if check.is_valid { "valid" } else { "invalid" },
            check.errors.len(),
            check.warnings.len()
        ));
        for error in &check.errors {
            out.push_str(&format!("  error: {}\n", error));
        }
        for warning in &check.warnings {
            out.push_str(&format!("  warning: {}\n", warning));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Cut, CutKind, Hole, HoleKind, InnerContour, Marking, OuterContour, Punch};
    use pretty_assertions::assert_eq;

    fn hole(x: f64, face: Face) -> Feature {
        Feature::Hole(Hole {
            x,
            diameter: 22.0,
            face: Some(face),
            ..Default::default()
        })
    }

    fn marking(text: &str) -> Feature {
        Feature::Marking(Marking {
            text: text.to_string(),
            ..Default::default()
        })
    }

    fn outer() -> Feature {
        Feature::OuterContour(OuterContour::default())
    }

    fn priorities(manager: &PriorityManager, features: &[Feature]) -> Vec<i32> {
        features.iter().map(|f| manager.priority(f)).collect()
    }

    // ==================== Priority tests ====================

    #[test]
    fn test_table_priorities() {
        let manager = PriorityManager::new();
        assert_eq!(manager.priority(&outer()), 1000);
        assert_eq!(manager.priority(&Feature::InnerContour(InnerContour::default())), 1000);
        assert_eq!(manager.priority(&hole(0.0, Face::Web)), 500);
        assert_eq!(manager.priority(&marking("A1")), 100);

        let slot = Feature::Hole(Hole {
            hole_kind: HoleKind::Slotted,
            ..Default::default()
        });
        assert_eq!(manager.priority(&slot), 450);

        let notch = Feature::Cut(Cut {
            cut_kind: CutKind::Notch,
            ..Default::default()
        });
        assert_eq!(manager.priority(&notch), 900);
        assert_eq!(manager.priority(&Feature::Cut(Cut::default())), 750);
    }

    #[test]
    fn test_pattern_fallback() {
        let manager = PriorityManager::new();
        // punch_mark is not in the table
        assert_eq!(manager.priority(&Feature::Punch(Punch::default())), 100);
        assert_eq!(class_from_pattern("corner_notch_cut"), PriorityClass::CutWithNotches);
        assert_eq!(class_from_pattern("drilling"), PriorityClass::Hole);
        assert_eq!(class_from_pattern("text_label"), PriorityClass::Marking);
        assert_eq!(class_from_pattern("profile_header"), PriorityClass::Default);
    }

    #[test]
    fn test_override_wins() {
        let mut manager = PriorityManager::new();
        assert_eq!(manager.set_override("marking", 50), None);
        assert_eq!(manager.priority(&marking("A1")), 50);
        assert_eq!(manager.clear_override("marking"), Some(50));
        assert_eq!(manager.priority(&marking("A1")), 100);
    }

    #[test]
    fn test_class_lookup() {
        assert_eq!(PriorityClass::from_value(850), Some(PriorityClass::Bevel));
        assert_eq!(PriorityClass::from_value(123), None);
        assert_eq!(PriorityClass::Text.value(), 50);
    }

    // ==================== Sorting tests ====================

    #[test]
    fn test_sort_marking_hole_contour() {
        let manager = PriorityManager::new();
        let sorted = manager.sort_by_priority(&[marking("A1"), hole(0.0, Face::Web), outer()]);
        let names: Vec<&str> = sorted.iter().map(Feature::type_name).collect();
        assert_eq!(names, vec!["outer_contour", "hole", "marking"]);
    }

    #[test]
    fn test_sort_is_stable() {
        let manager = PriorityManager::new();
        let input = vec![
            hole(1.0, Face::Web),
            marking("first"),
            hole(2.0, Face::Top),
            marking("second"),
            hole(3.0, Face::Web),
        ];
        let sorted = manager.sort_by_priority(&input);

        let xs: Vec<f64> = sorted.iter().filter_map(Feature::as_hole).map(|h| h.x).collect();
        assert_eq!(xs, vec![1.0, 2.0, 3.0]);

        let texts: Vec<&str> = sorted
            .iter()
            .filter_map(|f| match f {
                Feature::Marking(m) => Some(m.text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["first", "second"]);

        let p = priorities(&manager, &sorted);
        assert!(p.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_sort_keeps_every_feature() {
        let manager = PriorityManager::new();
        let input = vec![marking("A1"), hole(5.0, Face::Top), outer(), marking("B2")];
        let before = input.clone();
        let sorted = manager.sort_by_priority(&input);

        assert_eq!(input, before);
        assert_eq!(sorted.len(), input.len());
        for feature in &input {
            assert!(sorted.contains(feature), "{:?} lost", feature);
        }
        assert_eq!(sorted[0], outer());
        assert_eq!(sorted[3], marking("B2"));
    }

    #[test]
    fn test_group_by_priority() {
        let manager = PriorityManager::new();
        let groups = manager.group_by_priority(&[
            marking("A1"),
            hole(1.0, Face::Web),
            outer(),
            hole(2.0, Face::Top),
        ]);
        let keys: Vec<i32> = groups.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![1000, 500, 100]);
        assert_eq!(groups[1].1.len(), 2);
        assert!(manager.group_by_priority(&[]).is_empty());
    }

    // ==================== Optimization tests ====================

    #[test]
    fn test_optimize_clusters_holes_by_face() {
        let manager = PriorityManager::new();
        let input = vec![
            hole(1.0, Face::Web),
            hole(2.0, Face::Top),
            marking("A1"),
            hole(3.0, Face::Web),
            outer(),
            hole(4.0, Face::Top),
        ];
        let ordered = manager.optimize_order(&input);

        assert_eq!(ordered.len(), input.len());
        assert_eq!(ordered[0].type_name(), "outer_contour");
        let holes: Vec<(Option<Face>, f64)> = ordered
            .iter()
            .filter_map(Feature::as_hole)
            .map(|h| (h.face, h.x))
            .collect();
        assert_eq!(
            holes,
            vec![
                (Some(Face::Web), 1.0),
                (Some(Face::Web), 3.0),
                (Some(Face::Top), 2.0),
                (Some(Face::Top), 4.0),
            ]
        );
        assert_eq!(ordered[5].type_name(), "marking");
    }

    #[test]
    fn test_optimize_leaves_slots_alone() {
        let manager = PriorityManager::new();
        let slot = |x: f64, face: Face| {
            Feature::Hole(Hole {
                x,
                face: Some(face),
                hole_kind: HoleKind::Slotted,
                ..Default::default()
            })
        };
        let input = vec![slot(1.0, Face::Web), slot(2.0, Face::Top), slot(3.0, Face::Web)];
        assert_eq!(manager.optimize_order(&input), input);
    }

    // ==================== Order validation tests ====================

    #[test]
    fn test_validate_sorted_order() {
        let manager = PriorityManager::new();
        let sorted = manager.sort_by_priority(&[marking("A1"), hole(0.0, Face::Web), outer()]);
        let result = manager.validate_order(&sorted);
        assert!(result.is_valid);
        assert!(!result.has_warnings());
    }

    #[test]
    fn test_validate_inversion_warns() {
        let manager = PriorityManager::new();
        let result = manager.validate_order(&[hole(0.0, Face::Web), outer()]);
        assert!(result.is_valid);
        assert_eq!(
            result.warnings,
            vec!["Features 0 and 1: hole (500) precedes outer_contour (1000)".to_string()]
        );
    }

    #[test]
    fn test_validate_marking_above_holes() {
        let mut manager = PriorityManager::new();
        manager.set_override("marking", 600);
        let result = manager.validate_order(&[marking("A1")]);
        assert!(!result.is_valid);
        assert!(result.errors[0].contains("above hole threshold 500"));
    }

    // ==================== Report tests ====================

    #[test]
    fn test_report() {
        let manager = PriorityManager::new();
        let report = manager.report(&[
            marking("A1"),
            hole(1.0, Face::Web),
            hole(2.0, Face::Top),
            outer(),
        ]);
        insta::assert_snapshot!(report, @r"
        Feature priority report: 4 feature(s)
          1000 contour: 1
          500 hole: 2
          100 marking: 1
        Order: valid, 0 error(s), 2 warning(s)
          warning: Features 0 and 1: marking (100) precedes hole (500)
          warning: Features 2 and 3: hole (500) precedes outer_contour (1000)
        ");
    }
}
