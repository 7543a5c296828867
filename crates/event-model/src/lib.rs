//! Heatfield Event Model
//!
//! Defines the data contracts the heatmap engine works with:
//! - **Geometry:** World points and the fixed map rectangle
//! - **Records:** Parsed gameplay records delivered as JSONL
//! - **Metrics:** The closed table of heatmap kinds and their extraction rules
//! - **Events:** Weighted world positions tagged with metric, subject and grouping
//! - **Settings:** Raster geometry, spread radius, palette and ratio pairs
//!
//! Positions stay in world units here; conversion to pixels belongs to
//! the processing core.

pub mod event;
pub mod geometry;
pub mod metric;
pub mod record;
pub mod settings;

pub use event::*;
pub use geometry::*;
pub use metric::*;
pub use record::*;
pub use settings::*;
