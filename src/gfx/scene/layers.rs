//! # Layer Groups
//!
//! Every primitive in the scene belongs to exactly one layer group. The
//! structural `Building` group is always drawn; each configured damage layer
//! can be shown or hidden with a single flag write, so toggling never touches
//! per-instance data or reruns the scene builder.
//!
//! Layer groups also carry a vertical offset used by the exploded view. The
//! offset is a group transform applied at draw time.

use serde::Deserialize;

/// Damage categories that can be toggled independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageLayer {
    Floor,
    Ceiling,
    Walls,
    Infrastructure,
}

impl DamageLayer {
    pub const COUNT: usize = 4;
    pub const ALL: [DamageLayer; Self::COUNT] = [
        DamageLayer::Floor,
        DamageLayer::Ceiling,
        DamageLayer::Walls,
        DamageLayer::Infrastructure,
    ];

    pub fn index(&self) -> usize {
        match self {
            DamageLayer::Floor => 0,
            DamageLayer::Ceiling => 1,
            DamageLayer::Walls => 2,
            DamageLayer::Infrastructure => 3,
        }
    }

    pub fn default_label(&self) -> &'static str {
        match self {
            DamageLayer::Floor => "Floor / water damage",
            DamageLayer::Ceiling => "Ceiling / roof damage",
            DamageLayer::Walls => "Wall damage",
            DamageLayer::Infrastructure => "Infrastructure damage",
        }
    }

    /// How many explode steps this layer rises above the building
    pub fn explode_rank(&self) -> f32 {
        match self {
            DamageLayer::Floor | DamageLayer::Walls => 0.0,
            DamageLayer::Ceiling => 1.0,
            DamageLayer::Infrastructure => 2.0,
        }
    }
}

/// Identifies the group a batch is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayerId {
    Building,
    Damage(DamageLayer),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LayerSpec {
    pub layer: DamageLayer,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default = "default_visible")]
    pub default_visible: bool,
}

fn default_visible() -> bool {
    true
}

impl LayerSpec {
    pub fn new(layer: DamageLayer, default_visible: bool) -> Self {
        Self {
            layer,
            label: None,
            default_visible,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Which damage layers exist for a session, in display order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    pub layers: Vec<LayerSpec>,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            layers: vec![
                LayerSpec::new(DamageLayer::Floor, true),
                LayerSpec::new(DamageLayer::Ceiling, true),
                LayerSpec::new(DamageLayer::Walls, false),
                LayerSpec::new(DamageLayer::Infrastructure, false),
            ],
        }
    }
}

impl LayerConfig {
    pub fn only(layers: &[DamageLayer]) -> Self {
        Self {
            layers: layers.iter().map(|l| LayerSpec::new(*l, true)).collect(),
        }
    }
}

/// External toggle state: one boolean per damage layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayerToggles {
    flags: [bool; DamageLayer::COUNT],
}

impl LayerToggles {
    pub fn all(visible: bool) -> Self {
        Self {
            flags: [visible; DamageLayer::COUNT],
        }
    }

    pub fn get(&self, layer: DamageLayer) -> bool {
        self.flags[layer.index()]
    }

    pub fn set(&mut self, layer: DamageLayer, visible: bool) {
        self.flags[layer.index()] = visible;
    }

    pub fn with(mut self, layer: DamageLayer, visible: bool) -> Self {
        self.set(layer, visible);
        self
    }

    pub fn flip(&mut self, layer: DamageLayer) -> bool {
        let flag = &mut self.flags[layer.index()];
        *flag = !*flag;
        *flag
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerGroup {
    pub id: LayerId,
    pub label: String,
    visible: bool,
    offset: f32,
    target_offset: f32,
}

impl LayerGroup {
    fn new(id: LayerId, label: String, visible: bool) -> Self {
        Self {
            id,
            label,
            visible,
            offset: 0.0,
            target_offset: 0.0,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Current vertical group offset
    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn target_offset(&self) -> f32 {
        self.target_offset
    }
}

/// The fixed set of layer groups for a scene.
#[derive(Debug, Clone)]
pub struct LayerSet {
    building: LayerGroup,
    damage: [Option<LayerGroup>; DamageLayer::COUNT],
    order: Vec<DamageLayer>,
}

impl LayerSet {
    pub fn new(config: &LayerConfig) -> Self {
        let mut damage: [Option<LayerGroup>; DamageLayer::COUNT] = Default::default();
        let mut order = Vec::with_capacity(config.layers.len());

        for spec in &config.layers {
            let slot = &mut damage[spec.layer.index()];
            if slot.is_some() {
                log::warn!("Damage layer {:?} configured twice, keeping the first", spec.layer);
                continue;
            }
            let label = spec
                .label
                .clone()
                .unwrap_or_else(|| spec.layer.default_label().to_string());
            *slot = Some(LayerGroup::new(
                LayerId::Damage(spec.layer),
                label,
                spec.default_visible,
            ));
            order.push(spec.layer);
        }

        Self {
            building: LayerGroup::new(LayerId::Building, "Building".to_string(), true),
            damage,
            order,
        }
    }

    /// Whether batches for this layer are generated at all
    pub fn contains(&self, id: LayerId) -> bool {
        match id {
            LayerId::Building => true,
            LayerId::Damage(layer) => self.damage[layer.index()].is_some(),
        }
    }

    pub fn group(&self, id: LayerId) -> Option<&LayerGroup> {
        match id {
            LayerId::Building => Some(&self.building),
            LayerId::Damage(layer) => self.damage[layer.index()].as_ref(),
        }
    }

    /// Unconfigured layers are never visible; the building always is.
    pub fn is_visible(&self, id: LayerId) -> bool {
        self.group(id).is_some_and(LayerGroup::is_visible)
    }

    pub fn offset(&self, id: LayerId) -> f32 {
        self.group(id).map_or(0.0, LayerGroup::offset)
    }

    /// Configured damage layers in display order
    pub fn damage_layers(&self) -> impl Iterator<Item = &LayerGroup> + '_ {
        self.order
            .iter()
            .filter_map(|layer| self.damage[layer.index()].as_ref())
    }

    pub fn set_visible(&mut self, layer: DamageLayer, visible: bool) {
        if let Some(group) = self.damage[layer.index()].as_mut() {
            if group.visible != visible {
                log::debug!("Layer '{}' visible = {}", group.label, visible);
            }
            group.visible = visible;
        }
    }

    pub fn apply_toggles(&mut self, toggles: &LayerToggles) {
        for layer in DamageLayer::ALL {
            self.set_visible(layer, toggles.get(layer));
        }
    }

    /// Current visibility of every damage layer as external toggles
    pub fn toggles(&self) -> LayerToggles {
        let mut toggles = LayerToggles::default();
        for group in self.damage_layers() {
            if let LayerId::Damage(layer) = group.id {
                toggles.set(layer, group.visible);
            }
        }
        toggles
    }

    /// Sets the exploded-view targets; offsets move toward them in `step_offsets`.
    pub fn set_explode_targets(&mut self, exploded: bool, height: f32) {
        for (index, slot) in self.damage.iter_mut().enumerate() {
            if let Some(group) = slot.as_mut() {
                group.target_offset = if exploded {
                    DamageLayer::ALL[index].explode_rank() * height
                } else {
                    0.0
                };
            }
        }
    }

    /// Moves every offset a fixed fraction of the remaining distance to its target.
    ///
    /// Returns true while any offset is still moving.
    pub fn step_offsets(&mut self, fraction: f32) -> bool {
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            1.0
        };

        let mut moving = false;
        for group in self.damage.iter_mut().flatten() {
            let remaining = group.target_offset - group.offset;
            if remaining.abs() < 1e-3 {
                group.offset = group.target_offset;
            } else {
                group.offset += remaining * fraction;
                moving = true;
            }
        }
        moving
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_building_always_visible() {
        let mut layers = LayerSet::new(&LayerConfig::default());
        layers.apply_toggles(&LayerToggles::all(false));

        assert!(layers.is_visible(LayerId::Building));
        for layer in DamageLayer::ALL {
            assert!(!layers.is_visible(LayerId::Damage(layer)));
        }
    }

    #[test]
    fn test_toggle_isolation() {
        let mut layers = LayerSet::new(&LayerConfig::only(&[
            DamageLayer::Floor,
            DamageLayer::Ceiling,
        ]));
        assert!(layers.is_visible(LayerId::Damage(DamageLayer::Ceiling)));

        layers.set_visible(DamageLayer::Floor, false);

        assert!(!layers.is_visible(LayerId::Damage(DamageLayer::Floor)));
        assert!(layers.is_visible(LayerId::Damage(DamageLayer::Ceiling)));
        assert!(layers.is_visible(LayerId::Building));
    }

    #[test]
    fn test_unconfigured_layer_never_visible() {
        let mut layers = LayerSet::new(&LayerConfig::only(&[DamageLayer::Floor]));
        layers.set_visible(DamageLayer::Walls, true);

        assert!(!layers.contains(LayerId::Damage(DamageLayer::Walls)));
        assert!(!layers.is_visible(LayerId::Damage(DamageLayer::Walls)));
        assert_eq!(layers.damage_layers().count(), 1);
    }

    #[test]
    fn test_duplicate_spec_ignored() {
        let config = LayerConfig {
            layers: vec![
                LayerSpec::new(DamageLayer::Floor, true).with_label("Water"),
                LayerSpec::new(DamageLayer::Floor, false),
            ],
        };
        let layers = LayerSet::new(&config);
        let group = layers.group(LayerId::Damage(DamageLayer::Floor)).unwrap();

        assert_eq!(group.label, "Water");
        assert!(group.is_visible());
    }

    #[test]
    fn test_offsets_converge() {
        let mut layers = LayerSet::new(&LayerConfig::default());
        layers.set_explode_targets(true, 4.0);

        let id = LayerId::Damage(DamageLayer::Infrastructure);
        let mut previous = layers.offset(id);
        for _ in 0..200 {
            layers.step_offsets(0.1);
            let current = layers.offset(id);
            assert!(current >= previous);
            previous = current;
        }
        assert_eq!(layers.offset(id), 8.0);
        assert_eq!(layers.offset(LayerId::Damage(DamageLayer::Floor)), 0.0);
        assert!(!layers.step_offsets(0.1));
    }

    #[test]
    fn test_toggles_round_trip() {
        let layers = LayerSet::new(&LayerConfig::default());
        let toggles = layers.toggles();

        assert!(toggles.get(DamageLayer::Floor));
        assert!(!toggles.get(DamageLayer::Walls));
    }
}
