//! Heatfield Processing Core
//!
//! Turns spatial events into heatmaps:
//! - **Mapping:** world coordinates to raster pixels and back
//! - **Spreading:** distance-decayed contribution of each event to nearby pixels
//! - **Accumulation:** one dense grid per (metric, subject, grouping)
//! - **Ratios:** signed comparison of two metrics over the same subject
//!
//! This crate is pure computation. Reading records and writing images
//! happen elsewhere.

pub mod heatmap;
pub mod kernel;
pub mod mapper;
pub mod ratio;
pub mod session;
pub mod store;

pub use heatmap::{noise_floor, HeatmapAccumulator, HeatmapKey, TimeRange};
pub use kernel::DecayKernel;
pub use mapper::CoordinateMapper;
pub use ratio::{ratio_value, RatioCombiner};
pub use session::{ProcessingSession, SessionStats};
pub use store::HeatmapStore;
