//! Profile header, profile context and end record.

use serde::{Deserialize, Serialize};

use super::Face;

/// Profile dimensions used by decoders for default inference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileContext {
    pub length: f64,
    pub height: f64,
    pub width: f64,
    pub web_thickness: Option<f64>,
    pub flange_thickness: Option<f64>,
}

impl ProfileContext {
    pub fn new(length: f64, height: f64, width: f64) -> Self {
        Self {
            length,
            height,
            width,
            ..Default::default()
        }
    }

    /// Cross dimension of the reference rectangle for a face.
    ///
    /// Flanges span the profile width, the web spans its height. Without a
    /// face the larger of both is used.
    pub fn cross_dimension(&self, face: Option<Face>) -> f64 {
        match face {
            Some(face) if face.is_flange() => self.width,
            Some(_) => self.height,
            None => self.width.max(self.height),
        }
    }
}

/// Profile family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    IBeam,
    Channel,
    Angle,
    Tee,
    CSection,
    ZSection,
    Plate,
    RoundTube,
    RectTube,
    #[default]
    Special,
}

impl ProfileKind {
    /// Parse a profile kind code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "I" => Some(ProfileKind::IBeam),
            "U" => Some(ProfileKind::Channel),
            "L" => Some(ProfileKind::Angle),
            "T" => Some(ProfileKind::Tee),
            "C" => Some(ProfileKind::CSection),
            "Z" => Some(ProfileKind::ZSection),
            "B" => Some(ProfileKind::Plate),
            "RO" => Some(ProfileKind::RoundTube),
            "M" => Some(ProfileKind::RectTube),
            "SO" => Some(ProfileKind::Special),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ProfileKind::IBeam => "I",
            ProfileKind::Channel => "U",
            ProfileKind::Angle => "L",
            ProfileKind::Tee => "T",
            ProfileKind::CSection => "C",
            ProfileKind::ZSection => "Z",
            ProfileKind::Plate => "B",
            ProfileKind::RoundTube => "RO",
            ProfileKind::RectTube => "M",
            ProfileKind::Special => "SO",
        }
    }

    pub fn is_tube(&self) -> bool {
        matches!(self, ProfileKind::RoundTube | ProfileKind::RectTube)
    }
}

/// Piece header (ST).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileHeader {
    pub order_number: String,
    pub drawing_number: String,
    pub phase_number: String,
    pub piece_number: String,
    pub steel_grade: String,
    pub quantity: u32,
    pub profile_name: String,
    pub profile_kind: ProfileKind,
    pub length: f64,
    pub height: f64,
    pub width: f64,
    pub web_thickness: f64,
    pub flange_thickness: f64,
    pub radius: Option<f64>,
    /// Weight per metre.
    pub weight: f64,
    /// Painting surface per metre.
    pub painting_surface: f64,
}

impl ProfileHeader {
    /// Profile context for decoding the piece's other blocks.
    pub fn context(&self) -> ProfileContext {
        ProfileContext {
            length: self.length,
            height: self.height,
            width: self.width,
            web_thickness: (self.web_thickness > 0.0).then_some(self.web_thickness),
            flange_thickness: (self.flange_thickness > 0.0).then_some(self.flange_thickness),
        }
    }
}

/// End record (EN).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndMarker {
    /// Seconds.
    pub processing_time: Option<f64>,
    pub checksum: Option<String>,
    pub record_count: Option<u32>,
    pub error_count: Option<u32>,
    pub warning_count: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross_dimension_per_face() {
        let ctx = ProfileContext::new(6000.0, 300.0, 150.0);
        assert_eq!(ctx.cross_dimension(Some(Face::Top)), 150.0);
        assert_eq!(ctx.cross_dimension(Some(Face::Bottom)), 150.0);
        assert_eq!(ctx.cross_dimension(Some(Face::Web)), 300.0);
        assert_eq!(ctx.cross_dimension(Some(Face::Rear)), 300.0);
        assert_eq!(ctx.cross_dimension(None), 300.0);
    }

    #[test]
    fn test_profile_kind_codes() {
        assert_eq!(ProfileKind::from_code("ro"), Some(ProfileKind::RoundTube));
        assert_eq!(ProfileKind::from_code("B"), Some(ProfileKind::Plate));
        assert_eq!(ProfileKind::from_code("X"), None);
        assert_eq!(ProfileKind::Channel.code(), "U");
        assert!(ProfileKind::RectTube.is_tube());
    }

    #[test]
    fn test_header_context() {
        let header = ProfileHeader {
            length: 1200.0,
            height: 200.0,
            width: 100.0,
            web_thickness: 5.6,
            flange_thickness: 0.0,
            ..Default::default()
        };
        let ctx = header.context();
        assert_eq!(ctx.length, 1200.0);
        assert_eq!(ctx.web_thickness, Some(5.6));
        assert_eq!(ctx.flange_thickness, None);
    }
}
