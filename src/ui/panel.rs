// src/ui/panel.rs
//! Layer and room detail panels
//!
//! Panels only read the scene. Whatever the user clicked is collected into
//! [`PanelActions`] and applied once the frame has been drawn.

use crate::data::Room;
use crate::gfx::{
    frame_loop::FrameLoop,
    scene::{
        layers::{DamageLayer, LayerId},
        scene::Scene,
    },
};

/// Requests collected from one UI frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelActions {
    pub layer_changes: Vec<(DamageLayer, bool)>,
    pub set_exploded: Option<bool>,
    pub reset_camera: bool,
    pub clear_selection: bool,
}

impl PanelActions {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applies the requests to the scene and frame loop, in panel order
    pub fn apply(self, scene: &mut Scene, frame_loop: &mut FrameLoop) {
        for (layer, visible) in self.layer_changes {
            scene.set_layer_visible(layer, visible);
        }
        if let Some(exploded) = self.set_exploded {
            frame_loop.set_exploded(exploded, scene);
        }
        if self.clear_selection {
            scene.clear_selection();
        }
        if self.reset_camera {
            scene.camera_manager.reset();
        }
    }
}

/// Damage layer checkboxes, exploded view toggle and camera reset
pub fn layer_panel(ui: &imgui::Ui, scene: &Scene, exploded: bool, actions: &mut PanelActions) {
    let display_size = ui.io().display_size;
    if display_size[0] <= 0.0 || display_size[1] <= 0.0 {
        return;
    }

    ui.window("Damage Layers")
        .size([320.0, 260.0], imgui::Condition::FirstUseEver)
        .position([20.0, 20.0], imgui::Condition::FirstUseEver)
        .resizable(true)
        .collapsible(true)
        .build(|| {
            for (i, group) in scene.layers().damage_layers().enumerate() {
                let mut visible = group.is_visible();
                let label = format!("{}. {}", i + 1, group.label);
                if ui.checkbox(&label, &mut visible) {
                    if let LayerId::Damage(layer) = group.id {
                        actions.layer_changes.push((layer, visible));
                    }
                }
            }

            ui.separator();

            let mut explode = exploded;
            if ui.checkbox("Exploded view (E)", &mut explode) {
                actions.set_exploded = Some(explode);
            }
            if ui.button("Reset camera (R)") {
                actions.reset_camera = true;
            }

            ui.separator();
            let stats = scene.stats();
            ui.text(format!(
                "{} rooms, {} instances",
                stats.rooms_accepted,
                stats.counts.total()
            ));
            if !stats.rooms_skipped.is_empty() {
                ui.text_colored([0.9, 0.4, 0.2, 1.0], skipped_rooms_line(&stats.rooms_skipped));
            }
        });
}

/// Details of the selected room; nothing is drawn without a selection
pub fn room_detail_panel(ui: &imgui::Ui, scene: &Scene, actions: &mut PanelActions) {
    let Some(room) = scene.selected_room() else {
        return;
    };
    let display_size = ui.io().display_size;
    if display_size[0] <= 0.0 || display_size[1] <= 0.0 {
        return;
    }
    let panel_width = (display_size[0] * 0.25).clamp(300.0, 420.0);

    ui.window("Room Details")
        .size([panel_width, 420.0], imgui::Condition::FirstUseEver)
        .position(
            [display_size[0] - panel_width - 20.0, 20.0],
            imgui::Condition::FirstUseEver,
        )
        .resizable(true)
        .build(|| {
            for line in room_summary(room) {
                ui.text_wrapped(line);
            }

            let demolition = &room.damage.demolition;
            if !demolition.is_empty() && ui.collapsing_header("Demolition", imgui::TreeNodeFlags::DEFAULT_OPEN) {
                for item in demolition {
                    ui.bullet_text(item);
                }
            }

            ui.spacing();
            if ui.button("Clear selection (Esc)") {
                actions.clear_selection = true;
            }
        });
}

/// Text lines shown in the detail panel
pub fn room_summary(room: &Room) -> Vec<String> {
    let damage = &room.damage;
    let mut lines = vec![
        format!("{} ({})", room.name, room.id),
        format!("Category: {}", room.category.label()),
        format!("Size: {:.1} m x {:.1} m", room.width, room.depth),
        format!(
            "Materials: floor {}, walls {}, ceiling {}",
            or_unknown(&room.materials.floor),
            or_unknown(&room.materials.walls),
            or_unknown(&room.materials.ceiling)
        ),
    ];

    if damage.is_undamaged() {
        lines.push("No recorded damage".to_string());
        return lines;
    }

    lines.push(format!(
        "Floor water: {}",
        if damage.floor_affected { "yes" } else { "no" }
    ));
    lines.push(format!("Ceiling leak: {}", damage.ceiling_leak.label()));
    lines.push(format!(
        "Wall wicking: {}",
        if damage.wall_wicking { "yes" } else { "no" }
    ));
    if !damage.affected_surfaces.is_empty() {
        let surfaces: Vec<&str> = damage.affected_surfaces.iter().map(|s| s.label()).collect();
        lines.push(format!("Affected surfaces: {}", surfaces.join(", ")));
    }
    if !damage.infrastructure.is_empty() {
        let kinds: Vec<&str> = damage.infrastructure.iter().map(|k| k.label()).collect();
        lines.push(format!("Infrastructure: {}", kinds.join(", ")));
    }
    if !damage.above_ceiling.is_empty() {
        let items: Vec<&str> = damage.above_ceiling.iter().map(String::as_str).collect();
        lines.push(format!("Above ceiling: {}", items.join(", ")));
    }
    lines
}

/// Warning line for rooms the builder left out, naming the first few ids
pub fn skipped_rooms_line(ids: &[String]) -> String {
    const SHOWN: usize = 3;
    let mut line = format!("{} rooms skipped: {}", ids.len(), ids[..ids.len().min(SHOWN)].join(", "));
    if ids.len() > SHOWN {
        line.push_str(", ...");
    }
    line
}

fn or_unknown(value: &str) -> &str {
    if value.is_empty() {
        "unknown"
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{sample_hospital, CeilingSeverity, Surface};
    use crate::gfx::camera::{
        CameraController, CameraManager, ControllerConfig, HomeView, OrbitCamera, OrbitCameraBounds,
    };
    use crate::gfx::frame_loop::AnimationConfig;
    use crate::gfx::scene::layers::LayerConfig;

    fn scene() -> Scene {
        let camera = OrbitCamera::new(HomeView::default(), OrbitCameraBounds::default(), 1.0);
        let manager = CameraManager::new(camera, CameraController::new(ControllerConfig::default()));
        Scene::new(sample_hospital(), &LayerConfig::default(), manager)
    }

    #[test]
    fn test_empty_actions_change_nothing() {
        let mut scene = scene();
        let mut frame_loop = FrameLoop::new(AnimationConfig::default());
        let before = scene.layers().toggles();

        let actions = PanelActions::default();
        assert!(actions.is_empty());
        actions.apply(&mut scene, &mut frame_loop);

        assert_eq!(scene.layers().toggles(), before);
        assert!(!frame_loop.is_exploded());
    }

    #[test]
    fn test_apply_layer_and_explode() {
        let mut scene = scene();
        let mut frame_loop = FrameLoop::new(AnimationConfig::default());

        PanelActions {
            layer_changes: vec![(DamageLayer::Walls, true), (DamageLayer::Floor, false)],
            set_exploded: Some(true),
            ..Default::default()
        }
        .apply(&mut scene, &mut frame_loop);

        assert!(scene.layers().is_visible(LayerId::Damage(DamageLayer::Walls)));
        assert!(!scene.layers().is_visible(LayerId::Damage(DamageLayer::Floor)));
        assert!(frame_loop.is_exploded());
    }

    #[test]
    fn test_room_summary_lists_damage() {
        let dataset = sample_hospital();
        let room = dataset
            .rooms
            .iter()
            .find(|r| r.damage.ceiling_leak == CeilingSeverity::Severe)
            .expect("sample has a severe leak");

        let lines = room_summary(room);
        assert!(lines[0].contains(&room.name));
        assert!(lines.iter().any(|l| l == "Ceiling leak: severe"));
    }

    #[test]
    fn test_room_summary_lists_surfaces() {
        let mut room = sample_hospital().rooms[0].clone();
        room.damage.floor_affected = true;
        room.damage.affected_surfaces = [Surface::Walls, Surface::Floor].into_iter().collect();

        let lines = room_summary(&room);
        assert!(lines.iter().any(|l| l == "Affected surfaces: floor, walls"));
    }

    #[test]
    fn test_skipped_rooms_line() {
        let one = vec!["B12".to_string()];
        assert_eq!(skipped_rooms_line(&one), "1 rooms skipped: B12");

        let many: Vec<String> = (1..=5).map(|i| format!("R{}", i)).collect();
        assert_eq!(skipped_rooms_line(&many), "5 rooms skipped: R1, R2, R3, ...");
    }

    #[test]
    fn test_room_summary_undamaged() {
        let mut room = sample_hospital().rooms[0].clone();
        room.damage = Default::default();
        room.materials.floor.clear();

        let lines = room_summary(&room);
        assert_eq!(lines.last().map(String::as_str), Some("No recorded damage"));
        assert!(lines.iter().any(|l| l.contains("floor unknown")));
    }
}
