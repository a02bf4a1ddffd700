//! Built-in sample dataset: one storey of a small hospital wing.
//!
//! Two rows of eight rooms either side of a central hallway. Flooding came in
//! from the south side, so the southern row and the hallway carry floor damage
//! while roof leaks are scattered across both rows.

use std::collections::BTreeSet;

use super::{
    BuildingConstants, CeilingSeverity, DamageAttributes, Dataset, FixtureKind,
    InfrastructureKind, Room, RoomCategory, RoomMaterials, Surface,
};

const ROOM_WIDTH: f32 = 12.0;
const ROW_DEPTH: f32 = 17.0;
const HALLWAY_DEPTH: f32 = 6.0;

struct RoomTemplate {
    id: &'static str,
    name: &'static str,
    category: RoomCategory,
    fixtures: &'static [FixtureKind],
    floor: bool,
    ceiling: CeilingSeverity,
    infrastructure: &'static [InfrastructureKind],
}

const NORTH_ROW: [RoomTemplate; 8] = [
    RoomTemplate {
        id: "101",
        name: "Patient Room 101",
        category: RoomCategory::Patient,
        fixtures: &[FixtureKind::Bed, FixtureKind::Sink, FixtureKind::Cabinet],
        floor: false,
        ceiling: CeilingSeverity::Moderate,
        infrastructure: &[],
    },
    RoomTemplate {
        id: "102",
        name: "Patient Room 102",
        category: RoomCategory::Patient,
        fixtures: &[FixtureKind::Bed, FixtureKind::Sink, FixtureKind::Cabinet],
        floor: false,
        ceiling: CeilingSeverity::None,
        infrastructure: &[],
    },
    RoomTemplate {
        id: "103",
        name: "Patient Room 103",
        category: RoomCategory::Patient,
        fixtures: &[FixtureKind::Bed, FixtureKind::Sink],
        floor: false,
        ceiling: CeilingSeverity::Severe,
        infrastructure: &[InfrastructureKind::Electrical],
    },
    RoomTemplate {
        id: "104",
        name: "Patient Room 104",
        category: RoomCategory::Patient,
        fixtures: &[FixtureKind::Bed, FixtureKind::Sink, FixtureKind::Cabinet],
        floor: false,
        ceiling: CeilingSeverity::None,
        infrastructure: &[],
    },
    RoomTemplate {
        id: "110",
        name: "Staff Restroom",
        category: RoomCategory::Bathroom,
        fixtures: &[FixtureKind::Toilet, FixtureKind::Toilet, FixtureKind::Sink],
        floor: true,
        ceiling: CeilingSeverity::Moderate,
        infrastructure: &[InfrastructureKind::Plumbing],
    },
    RoomTemplate {
        id: "111",
        name: "Pharmacy",
        category: RoomCategory::Pharmacy,
        fixtures: &[FixtureKind::Shelving, FixtureKind::Shelving, FixtureKind::Cabinet],
        floor: false,
        ceiling: CeilingSeverity::Severe,
        infrastructure: &[InfrastructureKind::Hvac],
    },
    RoomTemplate {
        id: "112",
        name: "Central Supply",
        category: RoomCategory::Storage,
        fixtures: &[FixtureKind::Shelving, FixtureKind::Shelving, FixtureKind::Shelving],
        floor: false,
        ceiling: CeilingSeverity::None,
        infrastructure: &[],
    },
    RoomTemplate {
        id: "113",
        name: "Electrical Room",
        category: RoomCategory::Mechanical,
        fixtures: &[FixtureKind::Panel, FixtureKind::Panel, FixtureKind::Panel],
        floor: false,
        ceiling: CeilingSeverity::Moderate,
        infrastructure: &[InfrastructureKind::Electrical, InfrastructureKind::Electrical],
    },
];

const SOUTH_ROW: [RoomTemplate; 8] = [
    RoomTemplate {
        id: "105",
        name: "Patient Room 105",
        category: RoomCategory::Patient,
        fixtures: &[FixtureKind::Bed, FixtureKind::Sink, FixtureKind::Cabinet],
        floor: true,
        ceiling: CeilingSeverity::None,
        infrastructure: &[],
    },
    RoomTemplate {
        id: "106",
        name: "Patient Room 106",
        category: RoomCategory::Patient,
        fixtures: &[FixtureKind::Bed, FixtureKind::Sink],
        floor: true,
        ceiling: CeilingSeverity::Moderate,
        infrastructure: &[],
    },
    RoomTemplate {
        id: "107",
        name: "Patient Room 107",
        category: RoomCategory::Patient,
        fixtures: &[FixtureKind::Bed, FixtureKind::Sink, FixtureKind::Cabinet],
        floor: true,
        ceiling: CeilingSeverity::None,
        infrastructure: &[],
    },
    RoomTemplate {
        id: "120",
        name: "Family Lounge",
        category: RoomCategory::Common,
        fixtures: &[FixtureKind::Cabinet, FixtureKind::Sink],
        floor: true,
        ceiling: CeilingSeverity::Severe,
        infrastructure: &[InfrastructureKind::Hvac],
    },
    RoomTemplate {
        id: "121",
        name: "Soiled Utility",
        category: RoomCategory::Utility,
        fixtures: &[FixtureKind::Sink, FixtureKind::Cabinet],
        floor: true,
        ceiling: CeilingSeverity::None,
        infrastructure: &[InfrastructureKind::Plumbing],
    },
    RoomTemplate {
        id: "122",
        name: "Pump Room",
        category: RoomCategory::Mechanical,
        fixtures: &[FixtureKind::Pump, FixtureKind::Pump, FixtureKind::HvacUnit],
        floor: true,
        ceiling: CeilingSeverity::Moderate,
        infrastructure: &[
            InfrastructureKind::Plumbing,
            InfrastructureKind::Hvac,
            InfrastructureKind::MedicalGas,
        ],
    },
    RoomTemplate {
        id: "123",
        name: "Linen Storage",
        category: RoomCategory::Storage,
        fixtures: &[FixtureKind::Shelving, FixtureKind::Shelving],
        floor: true,
        ceiling: CeilingSeverity::None,
        infrastructure: &[],
    },
    RoomTemplate {
        id: "108",
        name: "Patient Room 108",
        category: RoomCategory::Patient,
        fixtures: &[FixtureKind::Bed, FixtureKind::Sink, FixtureKind::Cabinet],
        floor: true,
        ceiling: CeilingSeverity::Severe,
        infrastructure: &[],
    },
];

fn materials_for(category: RoomCategory) -> RoomMaterials {
    let floor = match category {
        RoomCategory::Mechanical | RoomCategory::Utility => "sealed concrete",
        RoomCategory::Bathroom => "ceramic tile",
        _ => "vinyl composition tile",
    };

    RoomMaterials {
        floor: floor.to_string(),
        walls: "painted gypsum board".to_string(),
        ceiling: "acoustic ceiling tile".to_string(),
    }
}

fn damage_for(template: &RoomTemplate, materials: &RoomMaterials) -> DamageAttributes {
    let mut affected_surfaces = BTreeSet::new();
    let mut demolition = Vec::new();

    if template.floor {
        affected_surfaces.insert(Surface::Floor);
        affected_surfaces.insert(Surface::Walls);
        affected_surfaces.insert(Surface::Fixtures);
        demolition.push(format!("Remove {} flooring", materials.floor));
        demolition.push("Cut drywall 2 ft above floor".to_string());
        demolition.push("Remove wet base cabinets".to_string());
    }

    let mut above_ceiling = BTreeSet::new();
    if template.ceiling != CeilingSeverity::None {
        affected_surfaces.insert(Surface::Ceiling);
        above_ceiling.insert("insulation".to_string());
        demolition.push(format!("Remove {}", materials.ceiling));
        if template.ceiling == CeilingSeverity::Severe {
            above_ceiling.insert("roof deck".to_string());
            demolition.push("Remove saturated batt insulation".to_string());
        }
    }

    for item in template.infrastructure {
        above_ceiling.insert(item.label().to_string());
    }

    DamageAttributes {
        floor_affected: template.floor,
        wall_wicking: template.floor,
        ceiling_leak: template.ceiling,
        affected_surfaces,
        above_ceiling,
        demolition,
        infrastructure: template.infrastructure.to_vec(),
    }
}

fn room_from_template(template: &RoomTemplate, x: f32, z: f32) -> Room {
    let materials = materials_for(template.category);
    let damage = damage_for(template, &materials);

    Room {
        id: template.id.to_string(),
        name: template.name.to_string(),
        category: template.category,
        x,
        z,
        width: ROOM_WIDTH,
        depth: ROW_DEPTH,
        fixtures: template.fixtures.to_vec(),
        materials,
        damage,
    }
}

/// Builds the sample hospital wing used when no dataset file is given.
pub fn sample_hospital() -> Dataset {
    let building = BuildingConstants::default();
    let row_offset = (HALLWAY_DEPTH + ROW_DEPTH) * 0.5;
    let first_x = -building.width * 0.5 + ROOM_WIDTH * 0.5;

    let mut rooms = Vec::with_capacity(NORTH_ROW.len() + SOUTH_ROW.len() + 1);

    for (i, template) in NORTH_ROW.iter().enumerate() {
        rooms.push(room_from_template(
            template,
            first_x + i as f32 * ROOM_WIDTH,
            -row_offset,
        ));
    }
    for (i, template) in SOUTH_ROW.iter().enumerate() {
        rooms.push(room_from_template(
            template,
            first_x + i as f32 * ROOM_WIDTH,
            row_offset,
        ));
    }

    let hallway_materials = materials_for(RoomCategory::Hallway);
    rooms.push(Room {
        id: "H1".to_string(),
        name: "Main Corridor".to_string(),
        category: RoomCategory::Hallway,
        x: 0.0,
        z: 0.0,
        width: building.width,
        depth: HALLWAY_DEPTH,
        fixtures: Vec::new(),
        damage: DamageAttributes {
            floor_affected: true,
            wall_wicking: true,
            ceiling_leak: CeilingSeverity::Moderate,
            affected_surfaces: [Surface::Floor, Surface::Walls, Surface::Ceiling]
                .into_iter()
                .collect(),
            above_ceiling: ["sprinkler main".to_string()].into_iter().collect(),
            demolition: vec![
                format!("Remove {}", hallway_materials.floor),
                "Cut drywall 2 ft above floor".to_string(),
            ],
            infrastructure: vec![InfrastructureKind::Electrical],
        },
        materials: hallway_materials,
    });

    Dataset::new(building, rooms)
}
