use std::collections::BTreeSet;

use cgmath::Vector3;

use crate::data::{BuildingConstants, Dataset, Room};
use crate::gfx::{
    camera::camera_utils::CameraManager,
    picking::{pick_room, PickResult, RoomVolume, Selection, SelectionChange},
};

use super::{
    builder::{highlight_instance, BuildStatistics, SceneBuilder},
    instance::{BatchKind, InstanceBatch},
    layers::{DamageLayer, LayerConfig, LayerId, LayerSet, LayerToggles},
};

/// The built floor plan: rooms, instance batches, layer groups and selection.
///
/// Batches are generated once at construction. Afterwards only group flags,
/// group offsets and the single highlight instance ever change.
pub struct Scene {
    pub camera_manager: CameraManager,
    rooms: Vec<Room>,
    constants: BuildingConstants,
    layers: LayerSet,
    batches: Vec<InstanceBatch>,
    volumes: Vec<RoomVolume>,
    stats: BuildStatistics,
    selection: Selection,
    dirty: BTreeSet<BatchKind>,
}

impl Scene {
    pub fn new(dataset: Dataset, layer_config: &LayerConfig, camera_manager: CameraManager) -> Self {
        let layers = LayerSet::new(layer_config);
        let builder = SceneBuilder::new(dataset.building, &layers);
        let constants = *builder.constants();
        let built = builder.build(&dataset.rooms);

        Self {
            camera_manager,
            rooms: dataset.rooms,
            constants,
            layers,
            batches: built.batches,
            volumes: built.volumes,
            stats: built.stats,
            selection: Selection::default(),
            dirty: BTreeSet::new(),
        }
    }

    /// Updates the scene (camera matrices, etc.)
    pub fn update(&mut self) {
        self.camera_manager.camera.update_view_proj();
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn room(&self, index: usize) -> Option<&Room> {
        self.rooms.get(index)
    }

    pub fn constants(&self) -> &BuildingConstants {
        &self.constants
    }

    pub fn layers(&self) -> &LayerSet {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut LayerSet {
        &mut self.layers
    }

    pub fn batches(&self) -> &[InstanceBatch] {
        &self.batches
    }

    pub fn batch(&self, kind: BatchKind) -> Option<&InstanceBatch> {
        self.batches.iter().find(|b| b.kind() == kind)
    }

    pub fn volumes(&self) -> &[RoomVolume] {
        &self.volumes
    }

    pub fn stats(&self) -> &BuildStatistics {
        &self.stats
    }

    /// Non-empty batches whose layer group is currently visible
    pub fn visible_batches(&self) -> impl Iterator<Item = &InstanceBatch> + '_ {
        self.batches
            .iter()
            .filter(|batch| !batch.is_empty() && self.layers.is_visible(batch.layer()))
    }

    pub fn set_layer_visible(&mut self, layer: DamageLayer, visible: bool) {
        self.layers.set_visible(layer, visible);
    }

    pub fn toggle_layer(&mut self, layer: DamageLayer) {
        if self.layers.contains(LayerId::Damage(layer)) {
            let visible = !self.layers.is_visible(LayerId::Damage(layer));
            self.layers.set_visible(layer, visible);
        }
    }

    pub fn apply_toggles(&mut self, toggles: &LayerToggles) {
        self.layers.apply_toggles(toggles);
    }

    pub fn selection(&self) -> Option<usize> {
        self.selection.current()
    }

    pub fn selected_room(&self) -> Option<&Room> {
        self.selection.current().and_then(|i| self.rooms.get(i))
    }

    /// Room footprint centre at mid ceiling height
    pub fn room_center(&self, index: usize) -> Option<Vector3<f32>> {
        self.rooms
            .get(index)
            .map(|room| room.center(self.constants.ceiling_height * 0.5))
    }

    pub fn building_center(&self) -> Vector3<f32> {
        self.constants.center()
    }

    /// Ray-casts the pointer against the room volumes
    pub fn pick(&self, screen_pos: (f32, f32), screen_size: (f32, f32)) -> Option<PickResult> {
        pick_room(
            screen_pos,
            screen_size,
            &self.camera_manager.camera,
            &self.volumes,
        )
    }

    /// Handles a completed click: pick, toggle the selection, refocus and
    /// rewrite the highlight.
    pub fn click(&mut self, screen_pos: (f32, f32), screen_size: (f32, f32)) -> SelectionChange {
        let hit = self.pick(screen_pos, screen_size).map(|hit| hit.room_index);
        let change = self.selection.apply_pick(hit);
        self.on_selection_changed(change);
        change
    }

    pub fn clear_selection(&mut self) -> SelectionChange {
        let change = self.selection.clear();
        self.on_selection_changed(change);
        change
    }

    fn on_selection_changed(&mut self, change: SelectionChange) {
        if !change.changed() {
            return;
        }

        match change.current.and_then(|i| self.room_center(i)) {
            Some(center) => self.camera_manager.focus_room(center),
            None => self.camera_manager.clear_focus(),
        }
        self.set_highlight(change.current);

        match self.selected_room() {
            Some(room) => log::info!("Selected room {} ({})", room.id, room.name),
            None => log::info!("Selection cleared"),
        }
    }

    fn set_highlight(&mut self, room_index: Option<usize>) {
        let instance = room_index
            .and_then(|i| self.rooms.get(i))
            .map(|room| highlight_instance(room, &self.constants));

        if let Some(batch) = self
            .batches
            .iter_mut()
            .find(|b| b.kind() == BatchKind::Highlight)
        {
            batch.clear();
            if let Some(instance) = instance {
                batch.push(instance);
            }
            self.dirty.insert(BatchKind::Highlight);
        }
    }

    /// Batches whose instances changed since the last call
    pub fn take_dirty_batches(&mut self) -> Vec<BatchKind> {
        std::mem::take(&mut self.dirty).into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sample_hospital;
    use crate::gfx::camera::{CameraController, ControllerConfig, HomeView, OrbitCamera, OrbitCameraBounds};

    fn scene() -> Scene {
        let camera = OrbitCamera::new(HomeView::default(), OrbitCameraBounds::default(), 1.0);
        let manager = CameraManager::new(camera, CameraController::new(ControllerConfig::default()));
        Scene::new(sample_hospital(), &LayerConfig::default(), manager)
    }

    #[test]
    fn test_hidden_layers_are_not_drawn() {
        let mut scene = scene();
        assert!(scene.visible_batches().any(|b| b.kind() == BatchKind::Puddle));

        scene.apply_toggles(&LayerToggles::all(false));

        assert!(scene
            .visible_batches()
            .all(|b| b.layer() == LayerId::Building));
        assert!(scene.visible_batches().any(|b| b.kind() == BatchKind::Wall));
    }

    #[test]
    fn test_toggle_layer() {
        let mut scene = scene();
        let id = LayerId::Damage(DamageLayer::Ceiling);
        scene.toggle_layer(DamageLayer::Ceiling);
        assert!(!scene.layers().is_visible(id));
        scene.toggle_layer(DamageLayer::Ceiling);
        assert!(scene.layers().is_visible(id));
    }

    #[test]
    fn test_highlight_follows_selection() {
        let mut scene = scene();
        assert!(scene.batch(BatchKind::Highlight).unwrap().is_empty());

        // Click the centre of the window: the camera looks at the corridor
        let change = scene.click((400.0, 400.0), (800.0, 800.0));
        assert!(change.current.is_some());
        assert_eq!(scene.batch(BatchKind::Highlight).unwrap().len(), 1);
        assert_eq!(scene.take_dirty_batches(), vec![BatchKind::Highlight]);
        assert!(scene.take_dirty_batches().is_empty());

        let cleared = scene.clear_selection();
        assert_eq!(cleared.current, None);
        assert!(scene.batch(BatchKind::Highlight).unwrap().is_empty());
        assert_eq!(scene.camera_manager.camera.target, scene.building_center());
    }

    #[test]
    fn test_selection_focuses_room() {
        let mut scene = scene();
        let polar = scene.camera_manager.camera.polar;
        let change = scene.click((400.0, 400.0), (800.0, 800.0));
        let index = change.current.unwrap();

        assert_eq!(
            Some(scene.camera_manager.camera.target),
            scene.room_center(index)
        );
        assert_eq!(scene.camera_manager.camera.polar, polar);
    }
}
