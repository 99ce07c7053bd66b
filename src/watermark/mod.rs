//! Watermark pipeline for tiling a watermark image across a stored image.
//!
//! The pipeline fetches the base image and the watermark from the object
//! store concurrently, scales the watermark to a quarter of the base width,
//! tiles it from the origin with spacing of half its scaled height, blends
//! each repetition at 50% opacity, re-encodes in the base image's format,
//! and uploads the result to a deterministic sibling path.

pub mod compositor;
pub mod format;
pub mod processor;
pub mod tiling;

pub use compositor::overlay_tiles;
pub use format::OutputFormat;
pub use processor::{process_watermark, WatermarkRequest, WatermarkResponse};
pub use tiling::TilingPlan;
