//! # Procedural Scene Builder
//!
//! Turns the room list into instance batches in two explicit passes:
//!
//! 1. [`SceneBuilder::count`] walks the rooms once and records how many
//!    instances every [`BatchKind`] needs.
//! 2. [`SceneBuilder::build`] allocates each batch at exactly that capacity
//!    (minimum 1) and fills it.
//!
//! Instance buffers on the GPU are created at their final size, so the count
//! must be known before anything is written.
//!
//! Rooms with non-finite or non-positive geometry, and rooms repeating an id
//! already seen, are skipped in both passes. Damage scatter is driven by
//! [`hash_to_unit_float`](super::scatter::hash_to_unit_float) so the same
//! dataset always produces the same scene.

use std::collections::{BTreeMap, HashSet};

use cgmath::Vector3;

use crate::data::{BuildingConstants, CeilingSeverity, FixtureKind, Room};
use crate::gfx::picking::{Aabb, RoomVolume};

use super::instance::{BatchKind, InstanceBatch, InstanceTransform};
use super::layers::LayerSet;
use super::scatter::{element_seed, lerp, ScatterSample};

/// Distance from the room's left wall to the first fixture
pub const FIXTURE_INSET: f32 = 0.8;
/// Spacing between consecutive fixtures along the back wall
pub const FIXTURE_SPACING: f32 = 1.4;
/// Distance from the room's left wall to the first plenum marker
pub const INFRASTRUCTURE_INSET: f32 = 1.0;
/// Spacing between consecutive plenum markers
pub const INFRASTRUCTURE_SPACING: f32 = 1.5;
/// Upper bound on scattered elements of one category in one room
pub const ELEMENTS_PER_ROOM: u32 = 16;
/// Height of the building-wide flood water plane
pub const FLOOD_WATER_LEVEL: f32 = 0.08;

const PUDDLE_SALT: u32 = 11;
const FLOOR_STAIN_SALT: u32 = 23;
const CEILING_STAIN_SALT: u32 = 37;
const DRIP_SALT: u32 = 53;

const WALL_COLOR: [f32; 4] = [0.92, 0.91, 0.88, 1.0];
const PERIMETER_COLOR: [f32; 4] = [0.70, 0.68, 0.64, 1.0];
const GROUND_COLOR: [f32; 4] = [0.32, 0.36, 0.30, 1.0];
const PUDDLE_COLOR: [f32; 3] = [0.16, 0.38, 0.62];
const FLOOR_STAIN_COLOR: [f32; 3] = [0.42, 0.33, 0.22];
const FLOOD_WATER_COLOR: [f32; 4] = [0.20, 0.45, 0.75, 1.0];
const CEILING_STAIN_COLOR: [f32; 3] = [0.55, 0.42, 0.25];
const DRIP_COLOR: [f32; 4] = [0.25, 0.50, 0.80, 1.0];
const DRIP_BAND_COLOR: [f32; 4] = [0.60, 0.45, 0.28, 1.0];
const WICKING_COLOR: [f32; 4] = [0.45, 0.36, 0.22, 1.0];
const HIGHLIGHT_COLOR: [f32; 4] = [1.0, 0.85, 0.2, 0.22];

/// Instance count per batch kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchCounts {
    counts: BTreeMap<BatchKind, usize>,
}

impl BatchCounts {
    pub fn get(&self, kind: BatchKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn add(&mut self, kind: BatchKind, n: usize) {
        if n > 0 {
            *self.counts.entry(kind).or_insert(0) += n;
        }
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BatchKind, usize)> + '_ {
        self.counts.iter().map(|(k, v)| (*k, *v))
    }
}

/// Summary of one build, logged at startup.
#[derive(Debug, Clone, Default)]
pub struct BuildStatistics {
    pub rooms_accepted: usize,
    pub rooms_skipped: Vec<String>,
    pub counts: BatchCounts,
}

/// Output of the builder: filled batches plus per-room picking volumes.
#[derive(Debug, Clone)]
pub struct BuiltScene {
    pub batches: Vec<InstanceBatch>,
    pub volumes: Vec<RoomVolume>,
    pub stats: BuildStatistics,
}

impl BuiltScene {
    pub fn batch(&self, kind: BatchKind) -> Option<&InstanceBatch> {
        self.batches.iter().find(|b| b.kind() == kind)
    }
}

/// One straight wall of a room.
#[derive(Debug, Clone, Copy, PartialEq)]
struct WallSegment {
    center_x: f32,
    center_z: f32,
    length: f32,
    along_x: bool,
}

impl WallSegment {
    /// Front, back, left, right
    fn of_room(room: &Room) -> [WallSegment; 4] {
        let half_w = room.width * 0.5;
        let half_d = room.depth * 0.5;
        [
            WallSegment {
                center_x: room.x,
                center_z: room.z - half_d,
                length: room.width,
                along_x: true,
            },
            WallSegment {
                center_x: room.x,
                center_z: room.z + half_d,
                length: room.width,
                along_x: true,
            },
            WallSegment {
                center_x: room.x - half_w,
                center_z: room.z,
                length: room.depth,
                along_x: false,
            },
            WallSegment {
                center_x: room.x + half_w,
                center_z: room.z,
                length: room.depth,
                along_x: false,
            },
        ]
    }

    /// Thin box along the wall between `bottom` and `bottom + height`
    fn band(&self, bottom: f32, height: f32, thickness: f32, color: [f32; 4]) -> InstanceTransform {
        let extents = if self.along_x {
            Vector3::new(self.length, height, thickness)
        } else {
            Vector3::new(thickness, height, self.length)
        };
        InstanceTransform::boxed(
            Vector3::new(self.center_x, bottom + height * 0.5, self.center_z),
            extents,
            color,
        )
    }
}

fn puddle_count(room: &Room) -> u32 {
    (2 + (room.width * room.depth / 30.0) as u32).min(ELEMENTS_PER_ROOM)
}

fn ceiling_stain_count(severity: CeilingSeverity) -> u32 {
    match severity {
        CeilingSeverity::None => 0,
        CeilingSeverity::Moderate => 2,
        CeilingSeverity::Severe => 4,
    }
}

fn drip_mark_count(severity: CeilingSeverity) -> u32 {
    match severity {
        CeilingSeverity::None => 0,
        CeilingSeverity::Moderate => 3,
        CeilingSeverity::Severe => 7,
    }
}

const FLOOR_STAINS_PER_ROOM: u32 = 2;

/// Translucent box outlining a selected room
pub fn highlight_instance(room: &Room, constants: &BuildingConstants) -> InstanceTransform {
    let pad = constants.wall_thickness * 2.0;
    InstanceTransform::boxed(
        room.center(constants.ceiling_height * 0.5),
        Vector3::new(
            room.width + pad,
            constants.ceiling_height + pad,
            room.depth + pad,
        ),
        HIGHLIGHT_COLOR,
    )
}

/// Builds instance batches from a room list.
pub struct SceneBuilder<'a> {
    constants: BuildingConstants,
    layers: &'a LayerSet,
}

impl<'a> SceneBuilder<'a> {
    pub fn new(constants: BuildingConstants, layers: &'a LayerSet) -> Self {
        Self {
            constants: constants.sanitized(),
            layers,
        }
    }

    pub fn constants(&self) -> &BuildingConstants {
        &self.constants
    }

    fn enabled(&self, kind: BatchKind) -> bool {
        self.layers.contains(kind.layer())
    }

    /// Indices of rooms that take part in the build, and ids of skipped rooms.
    pub fn accepted_rooms(&self, rooms: &[Room]) -> (Vec<usize>, Vec<String>) {
        let mut seen = HashSet::with_capacity(rooms.len());
        let mut accepted = Vec::with_capacity(rooms.len());
        let mut skipped = Vec::new();

        for (index, room) in rooms.iter().enumerate() {
            if !room.has_valid_geometry() {
                log::warn!(
                    "Skipping room '{}': invalid footprint ({}, {}) {}x{}",
                    room.id,
                    room.x,
                    room.z,
                    room.width,
                    room.depth
                );
                skipped.push(room.id.clone());
                continue;
            }
            if !seen.insert(room.id.as_str()) {
                log::warn!("Skipping room '{}': duplicate id", room.id);
                skipped.push(room.id.clone());
                continue;
            }
            accepted.push(index);
        }

        (accepted, skipped)
    }

    /// Counting pass: exact instance totals per batch kind.
    pub fn count(&self, rooms: &[Room]) -> BatchCounts {
        let (accepted, _) = self.accepted_rooms(rooms);
        self.count_accepted(rooms, &accepted)
    }

    fn count_accepted(&self, rooms: &[Room], accepted: &[usize]) -> BatchCounts {
        let mut counts = BatchCounts::default();

        counts.add(BatchKind::Ground, 1);
        counts.add(BatchKind::PerimeterWall, 4);

        let mut any_flooded = false;
        for room in accepted.iter().map(|&i| &rooms[i]) {
            counts.add(BatchKind::Floor, 1);
            counts.add(BatchKind::Wall, 4);
            for fixture in &room.fixtures {
                counts.add(BatchKind::Fixture(*fixture), 1);
            }

            let damage = &room.damage;
            if damage.floor_affected {
                any_flooded = true;
                counts.add(BatchKind::Puddle, puddle_count(room) as usize);
                counts.add(BatchKind::FloorStain, FLOOR_STAINS_PER_ROOM as usize);
            }
            if damage.ceiling_leak != CeilingSeverity::None {
                counts.add(
                    BatchKind::CeilingStain,
                    ceiling_stain_count(damage.ceiling_leak) as usize,
                );
                counts.add(
                    BatchKind::DripMark,
                    drip_mark_count(damage.ceiling_leak) as usize,
                );
                counts.add(BatchKind::DripBand, 4);
            }
            if damage.wall_wicking {
                counts.add(BatchKind::WickingBand, 4);
            }
            counts.add(BatchKind::InfrastructureMarker, damage.infrastructure.len());
        }

        if any_flooded {
            counts.add(BatchKind::FloodWater, 1);
        }

        // Layers that are not configured get no instances at all
        let mut gated = BatchCounts::default();
        for (kind, n) in counts.iter() {
            if self.enabled(kind) {
                gated.add(kind, n);
            }
        }
        gated
    }

    /// Allocate-then-fill pass.
    pub fn build(&self, rooms: &[Room]) -> BuiltScene {
        let (accepted, skipped) = self.accepted_rooms(rooms);
        let counts = self.count_accepted(rooms, &accepted);

        let mut batches: BTreeMap<BatchKind, InstanceBatch> = BatchKind::all()
            .into_iter()
            .map(|kind| (kind, InstanceBatch::with_capacity(kind, counts.get(kind))))
            .collect();

        let mut emit = |kind: BatchKind, instance: InstanceTransform| {
            if self.enabled(kind) {
                if let Some(batch) = batches.get_mut(&kind) {
                    batch.push(instance);
                }
            }
        };

        self.emit_building_shell(&mut emit);

        let mut any_flooded = false;
        let mut volumes = Vec::with_capacity(accepted.len());
        for &index in &accepted {
            let room = &rooms[index];
            any_flooded |= room.damage.floor_affected;

            self.emit_structure(room, &mut emit);
            self.emit_floor_damage(index as u32, room, &mut emit);
            self.emit_ceiling_damage(index as u32, room, &mut emit);
            self.emit_wall_damage(room, &mut emit);
            self.emit_infrastructure(room, &mut emit);

            volumes.push(self.room_volume(index, room));
        }

        if any_flooded {
            emit(
                BatchKind::FloodWater,
                InstanceTransform::flat(
                    Vector3::new(0.0, FLOOD_WATER_LEVEL, 0.0),
                    self.constants.width,
                    self.constants.length,
                    FLOOD_WATER_COLOR,
                ),
            );
        }

        let batches: Vec<InstanceBatch> = BatchKind::all()
            .into_iter()
            .filter_map(|kind| batches.remove(&kind))
            .collect();

        let mut populated = BatchCounts::default();
        for batch in &batches {
            populated.add(batch.kind(), batch.len());
        }

        log::info!(
            "Built scene: {} rooms ({} skipped), {} instances in {} batches",
            accepted.len(),
            skipped.len(),
            populated.total(),
            batches.len()
        );
        for (kind, n) in populated.iter() {
            log::debug!("  {:<28} {}", kind.label(), n);
        }

        BuiltScene {
            batches,
            volumes,
            stats: BuildStatistics {
                rooms_accepted: accepted.len(),
                rooms_skipped: skipped,
                counts: populated,
            },
        }
    }

    fn room_volume(&self, index: usize, room: &Room) -> RoomVolume {
        RoomVolume {
            room_index: index,
            aabb: Aabb::new(
                Vector3::new(room.x - room.width * 0.5, 0.0, room.z - room.depth * 0.5),
                Vector3::new(
                    room.x + room.width * 0.5,
                    self.constants.ceiling_height,
                    room.z + room.depth * 0.5,
                ),
            ),
        }
    }

    fn emit_building_shell(&self, emit: &mut impl FnMut(BatchKind, InstanceTransform)) {
        let c = &self.constants;
        let h = c.ceiling_height;
        let t = c.wall_thickness * 2.0;
        let half_w = c.width * 0.5;
        let half_l = c.length * 0.5;

        emit(
            BatchKind::Ground,
            InstanceTransform::flat(
                Vector3::new(0.0, -0.02, 0.0),
                c.width + 8.0,
                c.length + 8.0,
                GROUND_COLOR,
            ),
        );

        for sign in [-1.0f32, 1.0] {
            emit(
                BatchKind::PerimeterWall,
                InstanceTransform::boxed(
                    Vector3::new(0.0, h * 0.5, sign * (half_l + t * 0.5)),
                    Vector3::new(c.width + 2.0 * t, h, t),
                    PERIMETER_COLOR,
                ),
            );
            emit(
                BatchKind::PerimeterWall,
                InstanceTransform::boxed(
                    Vector3::new(sign * (half_w + t * 0.5), h * 0.5, 0.0),
                    Vector3::new(t, h, c.length),
                    PERIMETER_COLOR,
                ),
            );
        }
    }

    fn emit_structure(&self, room: &Room, emit: &mut impl FnMut(BatchKind, InstanceTransform)) {
        let c = &self.constants;

        emit(
            BatchKind::Floor,
            InstanceTransform::flat(
                room.center(0.0),
                room.width,
                room.depth,
                room.category.floor_color(),
            ),
        );

        for wall in WallSegment::of_room(room) {
            emit(
                BatchKind::Wall,
                wall.band(0.0, c.ceiling_height, c.wall_thickness, WALL_COLOR),
            );
        }

        let left = room.x - room.width * 0.5;
        let back = room.z - room.depth * 0.5 + c.wall_thickness;
        for (i, fixture) in room.fixtures.iter().enumerate() {
            emit(
                BatchKind::Fixture(*fixture),
                self.fixture_instance(*fixture, left, back, i),
            );
        }
    }

    fn fixture_instance(
        &self,
        fixture: FixtureKind,
        left: f32,
        back: f32,
        index: usize,
    ) -> InstanceTransform {
        let size = fixture.size();
        let offset = FIXTURE_INSET + index as f32 * FIXTURE_SPACING;
        InstanceTransform::boxed(
            Vector3::new(left + offset, size.y * 0.5, back + size.z * 0.5 + 0.05),
            size,
            fixture.color(),
        )
    }

    /// Keeps a scattered element of the given half-extent inside the room
    fn scatter_position(&self, room: &Room, sample: &ScatterSample, half_x: f32, half_z: f32) -> (f32, f32) {
        let t = self.constants.wall_thickness;
        let span_x = (room.width - 2.0 * (half_x + t)).max(0.0);
        let span_z = (room.depth - 2.0 * (half_z + t)).max(0.0);
        (
            room.x + (sample.u - 0.5) * span_x,
            room.z + (sample.v - 0.5) * span_z,
        )
    }

    fn emit_floor_damage(
        &self,
        room_index: u32,
        room: &Room,
        emit: &mut impl FnMut(BatchKind, InstanceTransform),
    ) {
        if !room.damage.floor_affected {
            return;
        }
        let max_radius = room.width.min(room.depth) * 0.25;

        for i in 0..puddle_count(room) {
            let seed = element_seed(room_index * ELEMENTS_PER_ROOM + i, PUDDLE_SALT);
            let sample = ScatterSample::draw(seed);

            let radius = lerp(0.35, 1.1, sample.size).min(max_radius);
            let aspect = lerp(0.6, 1.4, sample.aspect);
            let (x, z) = self.scatter_position(room, &sample, radius * aspect, radius);
            let [r, g, b] = PUDDLE_COLOR;

            emit(
                BatchKind::Puddle,
                InstanceTransform::flat(
                    // Stagger heights so overlapping puddles do not z-fight
                    Vector3::new(x, 0.012 + i as f32 * 0.0005, z),
                    2.0 * radius * aspect,
                    2.0 * radius,
                    [r, g, b, lerp(0.35, 0.75, sample.opacity)],
                ),
            );
        }

        for i in 0..FLOOR_STAINS_PER_ROOM {
            let seed = element_seed(room_index * ELEMENTS_PER_ROOM + i, FLOOR_STAIN_SALT);
            let sample = ScatterSample::draw(seed);

            let width = room.width * lerp(0.3, 0.6, sample.size);
            let depth = room.depth * lerp(0.3, 0.6, sample.aspect);
            let (x, z) = self.scatter_position(room, &sample, width * 0.5, depth * 0.5);
            let [r, g, b] = FLOOR_STAIN_COLOR;

            emit(
                BatchKind::FloorStain,
                InstanceTransform::flat(
                    Vector3::new(x, 0.006 + i as f32 * 0.0005, z),
                    width,
                    depth,
                    [r, g, b, lerp(0.25, 0.5, sample.opacity)],
                ),
            );
        }
    }

    fn emit_ceiling_damage(
        &self,
        room_index: u32,
        room: &Room,
        emit: &mut impl FnMut(BatchKind, InstanceTransform),
    ) {
        let severity = room.damage.ceiling_leak;
        if severity == CeilingSeverity::None {
            return;
        }
        let c = &self.constants;
        let h = c.ceiling_height;

        for i in 0..ceiling_stain_count(severity) {
            let seed = element_seed(room_index * ELEMENTS_PER_ROOM + i, CEILING_STAIN_SALT);
            let sample = ScatterSample::draw(seed);

            let width = room.width * lerp(0.15, 0.4, sample.size);
            let depth = room.depth * lerp(0.15, 0.4, sample.aspect);
            let (x, z) = self.scatter_position(room, &sample, width * 0.5, depth * 0.5);
            let [r, g, b] = CEILING_STAIN_COLOR;

            emit(
                BatchKind::CeilingStain,
                InstanceTransform::flat_facing_down(
                    Vector3::new(x, h - 0.01 - i as f32 * 0.0005, z),
                    width,
                    depth,
                    [r, g, b, lerp(0.45, 0.8, sample.opacity)],
                ),
            );
        }

        for i in 0..drip_mark_count(severity) {
            let seed = element_seed(room_index * ELEMENTS_PER_ROOM + i, DRIP_SALT);
            let sample = ScatterSample::draw(seed);

            let length = lerp(0.15, 0.7, sample.size);
            let thickness = 0.04 * lerp(0.8, 1.6, sample.aspect);
            let (x, z) = self.scatter_position(room, &sample, thickness, thickness);

            emit(
                BatchKind::DripMark,
                InstanceTransform::boxed(
                    Vector3::new(x, h - length * 0.5, z),
                    Vector3::new(thickness, length, thickness),
                    DRIP_COLOR,
                ),
            );
        }

        let band = c.drip_band_height.min(h);
        for wall in WallSegment::of_room(room) {
            emit(
                BatchKind::DripBand,
                wall.band(h - band, band, c.wall_thickness * 1.4, DRIP_BAND_COLOR),
            );
        }
    }

    fn emit_wall_damage(&self, room: &Room, emit: &mut impl FnMut(BatchKind, InstanceTransform)) {
        if !room.damage.wall_wicking {
            return;
        }
        let c = &self.constants;
        let height = c.wicking_height.min(c.ceiling_height);

        for wall in WallSegment::of_room(room) {
            emit(
                BatchKind::WickingBand,
                wall.band(0.0, height, c.wall_thickness * 1.4, WICKING_COLOR),
            );
        }
    }

    fn emit_infrastructure(
        &self,
        room: &Room,
        emit: &mut impl FnMut(BatchKind, InstanceTransform),
    ) {
        let c = &self.constants;
        let left = room.x - room.width * 0.5;
        let front = room.z + room.depth * 0.5 - INFRASTRUCTURE_INSET;
        let size = Vector3::new(0.6, c.plenum_height * 0.5, 0.6);

        for (i, item) in room.damage.infrastructure.iter().enumerate() {
            let offset = INFRASTRUCTURE_INSET + i as f32 * INFRASTRUCTURE_SPACING;
            emit(
                BatchKind::InfrastructureMarker,
                InstanceTransform::boxed(
                    Vector3::new(left + offset, c.ceiling_height + c.plenum_height * 0.5, front),
                    size,
                    item.color(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{sample_hospital, DamageAttributes, RoomCategory, RoomMaterials};
    use crate::gfx::scene::layers::{DamageLayer, LayerConfig};

    fn room(id: &str, x: f32, z: f32, fixtures: Vec<FixtureKind>) -> Room {
        Room {
            id: id.to_string(),
            name: format!("Room {}", id),
            category: RoomCategory::Patient,
            x,
            z,
            width: 10.0,
            depth: 10.0,
            fixtures,
            materials: RoomMaterials::default(),
            damage: DamageAttributes::default(),
        }
    }

    #[test]
    fn test_structural_counts() {
        let layers = LayerSet::new(&LayerConfig::default());
        let builder = SceneBuilder::new(BuildingConstants::default(), &layers);
        let rooms = vec![
            room("a", 0.0, 0.0, vec![FixtureKind::Sink, FixtureKind::Toilet]),
            room("b", 20.0, 0.0, vec![FixtureKind::Sink]),
            room("c", -20.0, 0.0, vec![]),
        ];

        let scene = builder.build(&rooms);

        assert_eq!(scene.batch(BatchKind::Wall).unwrap().len(), 12);
        assert_eq!(scene.batch(BatchKind::Floor).unwrap().len(), 3);
        assert_eq!(scene.batch(BatchKind::Fixture(FixtureKind::Sink)).unwrap().len(), 2);
        assert_eq!(scene.batch(BatchKind::Fixture(FixtureKind::Toilet)).unwrap().len(), 1);
        assert_eq!(scene.batch(BatchKind::Fixture(FixtureKind::Pump)).unwrap().len(), 0);
        assert_eq!(scene.volumes.len(), 3);
    }

    #[test]
    fn test_count_matches_fill() {
        let dataset = sample_hospital();
        let layers = LayerSet::new(&LayerConfig::default());
        let builder = SceneBuilder::new(dataset.building, &layers);

        let counts = builder.count(&dataset.rooms);
        let scene = builder.build(&dataset.rooms);

        for batch in &scene.batches {
            assert_eq!(batch.len(), counts.get(batch.kind()), "{}", batch.kind().label());
            assert_eq!(batch.capacity(), counts.get(batch.kind()).max(1));
        }
        assert_eq!(scene.stats.counts, counts);
    }

    #[test]
    fn test_fixture_counts_per_type() {
        let dataset = sample_hospital();
        let layers = LayerSet::new(&LayerConfig::default());
        let scene = SceneBuilder::new(dataset.building, &layers).build(&dataset.rooms);

        for kind in FixtureKind::ALL {
            let expected = dataset
                .rooms
                .iter()
                .flat_map(|r| r.fixtures.iter())
                .filter(|f| **f == kind)
                .count();
            assert_eq!(scene.batch(BatchKind::Fixture(kind)).unwrap().len(), expected);
        }
    }

    #[test]
    fn test_fixture_layout_follows_order() {
        let layers = LayerSet::new(&LayerConfig::default());
        let builder = SceneBuilder::new(BuildingConstants::default(), &layers);
        let rooms = vec![room("a", 0.0, 0.0, vec![FixtureKind::Sink, FixtureKind::Sink])];

        let scene = builder.build(&rooms);
        let sinks = scene.batch(BatchKind::Fixture(FixtureKind::Sink)).unwrap().instances();

        assert_eq!(sinks.len(), 2);
        let spacing = sinks[1].translation.x - sinks[0].translation.x;
        assert!((spacing - FIXTURE_SPACING).abs() < 1e-5);
        assert!((sinks[0].translation.x - (-5.0 + FIXTURE_INSET)).abs() < 1e-5);
    }

    #[test]
    fn test_deterministic_scatter() {
        let dataset = sample_hospital();
        let layers = LayerSet::new(&LayerConfig::default());
        let builder = SceneBuilder::new(dataset.building, &layers);

        let first = builder.build(&dataset.rooms);
        let second = builder.build(&dataset.rooms);

        for kind in [BatchKind::Puddle, BatchKind::FloorStain, BatchKind::CeilingStain, BatchKind::DripMark] {
            let a = first.batch(kind).unwrap().instances();
            let b = second.batch(kind).unwrap().instances();
            assert!(!a.is_empty());
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_scatter_stays_in_room() {
        let dataset = sample_hospital();
        let layers = LayerSet::new(&LayerConfig::default());
        let scene = SceneBuilder::new(dataset.building, &layers).build(&dataset.rooms);

        for puddle in scene.batch(BatchKind::Puddle).unwrap().instances() {
            let p = puddle.translation;
            assert!(
                dataset.rooms.iter().any(|r| r.contains_point(p.x, p.z)),
                "puddle at {:?} outside all rooms",
                p
            );
        }
    }

    #[test]
    fn test_malformed_rooms_skipped() {
        let layers = LayerSet::new(&LayerConfig::default());
        let builder = SceneBuilder::new(BuildingConstants::default(), &layers);

        let mut bad = room("bad", f32::NAN, 0.0, vec![FixtureKind::Sink]);
        bad.damage.floor_affected = true;
        let mut flat = room("flat", 0.0, 0.0, vec![]);
        flat.depth = -2.0;
        let duplicate = room("a", 40.0, 0.0, vec![]);
        let rooms = vec![room("a", 0.0, 0.0, vec![]), bad, flat, duplicate];

        let scene = builder.build(&rooms);

        assert_eq!(scene.stats.rooms_accepted, 1);
        assert_eq!(scene.stats.rooms_skipped, vec!["bad", "flat", "a"]);
        assert_eq!(scene.batch(BatchKind::Wall).unwrap().len(), 4);
        assert!(scene.batch(BatchKind::Puddle).unwrap().is_empty());
        for batch in &scene.batches {
            assert!(batch.instances().iter().all(InstanceTransform::is_finite));
        }
    }

    #[test]
    fn test_unconfigured_layer_gets_no_instances() {
        let dataset = sample_hospital();
        let layers = LayerSet::new(&LayerConfig::only(&[DamageLayer::Floor]));
        let scene = SceneBuilder::new(dataset.building, &layers).build(&dataset.rooms);

        assert!(!scene.batch(BatchKind::Puddle).unwrap().is_empty());
        let drips = scene.batch(BatchKind::DripMark).unwrap();
        assert!(drips.is_empty());
        assert_eq!(drips.capacity(), 1);
        assert!(scene.batch(BatchKind::WickingBand).unwrap().is_empty());
    }

    #[test]
    fn test_bands_anchor_heights() {
        let constants = BuildingConstants::default();
        let layers = LayerSet::new(&LayerConfig::default());
        let mut leaky = room("a", 0.0, 0.0, vec![]);
        leaky.damage.wall_wicking = true;
        leaky.damage.ceiling_leak = CeilingSeverity::Severe;

        let scene = SceneBuilder::new(constants, &layers).build(&[leaky]);

        for band in scene.batch(BatchKind::WickingBand).unwrap().instances() {
            let bottom = band.translation.y - band.scale.y * 0.5;
            assert!(bottom.abs() < 1e-5);
            assert!((band.scale.y - constants.wicking_height).abs() < 1e-5);
        }
        for band in scene.batch(BatchKind::DripBand).unwrap().instances() {
            let top = band.translation.y + band.scale.y * 0.5;
            assert!((top - constants.ceiling_height).abs() < 1e-5);
        }
        assert_eq!(scene.batch(BatchKind::DripMark).unwrap().len(), 7);
    }
}
