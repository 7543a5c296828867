//! Heatfield Render Engine
//!
//! Turns finished heatmaps into images:
//!
//! ```text
//! HeatmapStore ──┐
//!                ├── Renderer (color ramp per heatmap, rayon)
//! palette ───────┘         │
//!                          ├── {metric}_{subject}_{grouping}.png
//!                          │
//!                          └── manifest.json
//! ```

pub mod export;
pub mod palette;
pub mod renderer;

pub use export::*;
pub use palette::{shade, RampBounds, TRANSPARENT};
pub use renderer::Renderer;
