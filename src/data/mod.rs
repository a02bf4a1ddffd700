//! # Room and Building Dataset
//!
//! Read-only input to the viewer: an ordered list of [`Room`] records plus the
//! global [`BuildingConstants`]. The dataset is loaded once, handed to the
//! scene builder, and never mutated afterwards.
//!
//! Room coordinates are on the XZ ground plane with Y up. `x`/`z` locate the
//! centre of the room footprint, `width` spans X and `depth` spans Z.
//!
//! ## Usage
//!
//! ```no_run
//! use floodview::data::Dataset;
//!
//! let dataset = Dataset::load("hospital.json").unwrap();
//! println!("{} rooms", dataset.rooms.len());
//! ```

pub mod sample;

use std::collections::BTreeSet;
use std::path::Path;

use cgmath::Vector3;
use serde::Deserialize;

use crate::error::{Result, ViewerError};

pub use sample::sample_hospital;

/// Functional category of a room, used for floor colouring and detail display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomCategory {
    Patient,
    Hallway,
    Mechanical,
    Utility,
    Storage,
    Common,
    Pharmacy,
    Bathroom,
}

impl RoomCategory {
    pub fn label(&self) -> &'static str {
        match self {
            RoomCategory::Patient => "Patient room",
            RoomCategory::Hallway => "Hallway",
            RoomCategory::Mechanical => "Mechanical",
            RoomCategory::Utility => "Utility",
            RoomCategory::Storage => "Storage",
            RoomCategory::Common => "Common area",
            RoomCategory::Pharmacy => "Pharmacy",
            RoomCategory::Bathroom => "Bathroom",
        }
    }

    /// Floor tint for the category
    pub fn floor_color(&self) -> [f32; 4] {
        match self {
            RoomCategory::Patient => [0.78, 0.84, 0.90, 1.0],
            RoomCategory::Hallway => [0.86, 0.86, 0.82, 1.0],
            RoomCategory::Mechanical => [0.62, 0.62, 0.66, 1.0],
            RoomCategory::Utility => [0.70, 0.72, 0.68, 1.0],
            RoomCategory::Storage => [0.76, 0.72, 0.64, 1.0],
            RoomCategory::Common => [0.84, 0.80, 0.70, 1.0],
            RoomCategory::Pharmacy => [0.76, 0.86, 0.78, 1.0],
            RoomCategory::Bathroom => [0.80, 0.88, 0.92, 1.0],
        }
    }
}

/// Fixture placed along a room's back wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixtureKind {
    Toilet,
    Sink,
    Cabinet,
    HvacUnit,
    Pump,
    Bed,
    Shelving,
    Panel,
}

impl FixtureKind {
    pub const ALL: [FixtureKind; 8] = [
        FixtureKind::Toilet,
        FixtureKind::Sink,
        FixtureKind::Cabinet,
        FixtureKind::HvacUnit,
        FixtureKind::Pump,
        FixtureKind::Bed,
        FixtureKind::Shelving,
        FixtureKind::Panel,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FixtureKind::Toilet => "toilet",
            FixtureKind::Sink => "sink",
            FixtureKind::Cabinet => "cabinet",
            FixtureKind::HvacUnit => "hvac unit",
            FixtureKind::Pump => "pump",
            FixtureKind::Bed => "bed",
            FixtureKind::Shelving => "shelving",
            FixtureKind::Panel => "panel",
        }
    }

    /// Box extents (width, height, depth) in metres
    pub fn size(&self) -> Vector3<f32> {
        match self {
            FixtureKind::Toilet => Vector3::new(0.45, 0.75, 0.65),
            FixtureKind::Sink => Vector3::new(0.6, 0.9, 0.5),
            FixtureKind::Cabinet => Vector3::new(0.9, 2.0, 0.6),
            FixtureKind::HvacUnit => Vector3::new(1.2, 1.6, 0.9),
            FixtureKind::Pump => Vector3::new(0.7, 0.8, 0.7),
            FixtureKind::Bed => Vector3::new(1.0, 0.6, 2.1),
            FixtureKind::Shelving => Vector3::new(1.2, 1.9, 0.45),
            FixtureKind::Panel => Vector3::new(0.8, 1.8, 0.25),
        }
    }

    pub fn color(&self) -> [f32; 4] {
        match self {
            FixtureKind::Toilet | FixtureKind::Sink => [0.95, 0.95, 0.97, 1.0],
            FixtureKind::Cabinet | FixtureKind::Shelving => [0.55, 0.42, 0.30, 1.0],
            FixtureKind::HvacUnit | FixtureKind::Pump => [0.45, 0.50, 0.55, 1.0],
            FixtureKind::Bed => [0.90, 0.92, 0.98, 1.0],
            FixtureKind::Panel => [0.30, 0.32, 0.36, 1.0],
        }
    }
}

/// Severity of water intrusion through the ceiling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CeilingSeverity {
    #[default]
    None,
    Moderate,
    Severe,
}

impl CeilingSeverity {
    pub fn label(&self) -> &'static str {
        match self {
            CeilingSeverity::None => "none",
            CeilingSeverity::Moderate => "moderate",
            CeilingSeverity::Severe => "severe",
        }
    }
}

/// Surfaces flagged as damaged during the assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    Floor,
    Walls,
    Ceiling,
    Fixtures,
}

impl Surface {
    pub fn label(&self) -> &'static str {
        match self {
            Surface::Floor => "floor",
            Surface::Walls => "walls",
            Surface::Ceiling => "ceiling",
            Surface::Fixtures => "fixtures",
        }
    }
}

/// Building services damaged above the ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfrastructureKind {
    Electrical,
    Plumbing,
    Hvac,
    MedicalGas,
}

impl InfrastructureKind {
    pub fn label(&self) -> &'static str {
        match self {
            InfrastructureKind::Electrical => "electrical",
            InfrastructureKind::Plumbing => "plumbing",
            InfrastructureKind::Hvac => "hvac",
            InfrastructureKind::MedicalGas => "medical gas",
        }
    }

    pub fn color(&self) -> [f32; 4] {
        match self {
            InfrastructureKind::Electrical => [0.95, 0.78, 0.15, 1.0],
            InfrastructureKind::Plumbing => [0.20, 0.55, 0.90, 1.0],
            InfrastructureKind::Hvac => [0.55, 0.80, 0.55, 1.0],
            InfrastructureKind::MedicalGas => [0.30, 0.85, 0.80, 1.0],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RoomMaterials {
    pub floor: String,
    pub walls: String,
    pub ceiling: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DamageAttributes {
    pub floor_affected: bool,
    pub wall_wicking: bool,
    pub ceiling_leak: CeilingSeverity,
    pub affected_surfaces: BTreeSet<Surface>,
    pub above_ceiling: BTreeSet<String>,
    pub demolition: Vec<String>,
    pub infrastructure: Vec<InfrastructureKind>,
}

impl DamageAttributes {
    pub fn is_undamaged(&self) -> bool {
        !self.floor_affected
            && !self.wall_wicking
            && self.ceiling_leak == CeilingSeverity::None
            && self.infrastructure.is_empty()
    }
}

/// A single room of the floor plan.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Room {
    pub id: String,
    pub name: String,
    pub category: RoomCategory,
    pub x: f32,
    pub z: f32,
    pub width: f32,
    pub depth: f32,
    #[serde(default)]
    pub fixtures: Vec<FixtureKind>,
    #[serde(default)]
    pub materials: RoomMaterials,
    #[serde(default)]
    pub damage: DamageAttributes,
}

impl Room {
    /// Geometry is finite and has positive extents
    pub fn has_valid_geometry(&self) -> bool {
        self.x.is_finite()
            && self.z.is_finite()
            && self.width.is_finite()
            && self.depth.is_finite()
            && self.width > 0.0
            && self.depth > 0.0
    }

    /// Footprint centre at the given height
    pub fn center(&self, y: f32) -> Vector3<f32> {
        Vector3::new(self.x, y, self.z)
    }

    pub fn contains_point(&self, x: f32, z: f32) -> bool {
        (x - self.x).abs() <= self.width * 0.5 && (z - self.z).abs() <= self.depth * 0.5
    }
}

/// Global building dimensions in metres.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct BuildingConstants {
    pub width: f32,
    pub length: f32,
    pub ceiling_height: f32,
    pub wall_thickness: f32,
    pub wicking_height: f32,
    pub plenum_height: f32,
    pub drip_band_height: f32,
}

impl Default for BuildingConstants {
    fn default() -> Self {
        Self {
            width: 96.0,
            length: 40.0,
            ceiling_height: 3.0,
            wall_thickness: 0.15,
            wicking_height: 0.6,
            plenum_height: 1.0,
            drip_band_height: 0.4,
        }
    }
}

impl BuildingConstants {
    /// Replaces every non-finite or non-positive value with its default.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let pick = |value: f32, fallback: f32| {
            if value.is_finite() && value > 0.0 {
                value
            } else {
                fallback
            }
        };

        Self {
            width: pick(self.width, defaults.width),
            length: pick(self.length, defaults.length),
            ceiling_height: pick(self.ceiling_height, defaults.ceiling_height),
            wall_thickness: pick(self.wall_thickness, defaults.wall_thickness),
            wicking_height: pick(self.wicking_height, defaults.wicking_height),
            plenum_height: pick(self.plenum_height, defaults.plenum_height),
            drip_band_height: pick(self.drip_band_height, defaults.drip_band_height),
        }
    }

    /// The building footprint is centred on the world origin
    pub fn center(&self) -> Vector3<f32> {
        Vector3::new(0.0, 0.0, 0.0)
    }
}

/// Complete viewer input: building constants and the room list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub building: BuildingConstants,
    pub rooms: Vec<Room>,
}

impl Dataset {
    pub fn new(building: BuildingConstants, rooms: Vec<Room>) -> Self {
        Self { building, rooms }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let dataset: Dataset = serde_json::from_str(json)?;
        Ok(dataset)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ViewerError::Dataset {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = Self::from_json_str(&json)?;
        log::info!(
            "Loaded dataset '{}' with {} rooms",
            path.display(),
            dataset.rooms.len()
        );
        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_room() {
        let json = r#"{
            "rooms": [
                { "id": "101", "name": "Patient 101", "category": "patient",
                  "x": 0.0, "z": 0.0, "width": 10.0, "depth": 8.0,
                  "fixtures": ["bed", "sink"],
                  "damage": { "floor_affected": true, "ceiling_leak": "severe",
                              "affected_surfaces": ["floor", "ceiling"] } }
            ]
        }"#;

        let dataset = Dataset::from_json_str(json).unwrap();
        assert_eq!(dataset.building, BuildingConstants::default());
        let room = &dataset.rooms[0];
        assert_eq!(room.fixtures, vec![FixtureKind::Bed, FixtureKind::Sink]);
        assert!(room.damage.floor_affected);
        assert_eq!(room.damage.ceiling_leak, CeilingSeverity::Severe);
        assert!(room.damage.affected_surfaces.contains(&Surface::Ceiling));
        assert!(!room.damage.wall_wicking);
    }

    #[test]
    fn test_invalid_geometry_detected() {
        let mut room = sample_hospital().rooms[0].clone();
        assert!(room.has_valid_geometry());

        room.width = 0.0;
        assert!(!room.has_valid_geometry());

        room.width = 4.0;
        room.x = f32::NAN;
        assert!(!room.has_valid_geometry());
    }

    #[test]
    fn test_sanitized_constants() {
        let constants = BuildingConstants {
            ceiling_height: -1.0,
            wall_thickness: f32::INFINITY,
            ..Default::default()
        }
        .sanitized();

        assert_eq!(constants.ceiling_height, 3.0);
        assert_eq!(constants.wall_thickness, 0.15);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Dataset::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ViewerError::Dataset { .. }));
    }

    #[test]
    fn test_contains_point() {
        let room = &sample_hospital().rooms[0];
        assert!(room.contains_point(room.x, room.z));
        assert!(!room.contains_point(room.x + room.width, room.z));
    }
}
