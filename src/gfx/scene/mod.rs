//! # Scene Module
//!
//! Procedural construction of the floor plan and its damage overlays.
//!
//! ## Key Components
//!
//! - [`Scene`] - Owns rooms, instance batches, layer groups and the selection
//! - [`SceneBuilder`] - Two-pass count/fill construction of [`InstanceBatch`]es
//! - [`LayerSet`] - Building group plus toggleable damage layer groups
//! - [`scatter`] - Seeded hash used to place puddles, stains and drips
//! - [`Vertex3D`] - Vertex layout of the shared base shapes
//!
//! ## Usage
//!
//! ```no_run
//! use floodview::data::sample_hospital;
//! use floodview::gfx::scene::{LayerConfig, LayerSet, SceneBuilder};
//!
//! let dataset = sample_hospital();
//! let layers = LayerSet::new(&LayerConfig::default());
//! let built = SceneBuilder::new(dataset.building, &layers).build(&dataset.rooms);
//! println!("{} batches", built.batches.len());
//! ```

pub mod builder;
pub mod instance;
pub mod layers;
pub mod scatter;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use builder::{BatchCounts, BuildStatistics, BuiltScene, SceneBuilder};
pub use instance::{BatchKind, InstanceBatch, InstanceRaw, InstanceTransform};
pub use layers::{DamageLayer, LayerConfig, LayerGroup, LayerId, LayerSet, LayerSpec, LayerToggles};
pub use scene::Scene;
pub use vertex::Vertex3D;
