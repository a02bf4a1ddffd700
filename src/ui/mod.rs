//! # User Interface Module
//!
//! Dear ImGui overlay for the viewer: the damage layer panel and the
//! selected-room detail panel.
//!
//! ## Key Components
//!
//! - [`UiManager`] - ImGui integration with winit and wgpu
//! - [`panel`] - Panels plus the [`PanelActions`] they produce
//!
//! ## Input Handling
//!
//! Events go to ImGui first. When ImGui wants the mouse or keyboard the
//! camera and picking never see the event.

pub mod manager;
pub mod panel;

// Re-export main types
pub use manager::UiManager;
pub use panel::{layer_panel, room_detail_panel, PanelActions};
