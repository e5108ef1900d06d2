//! Domain services - Pure operations over the world model
//!
//! - Time codec: literals to signed years and back
//! - Branch registry: pivot catalog and overlay selection
//! - Composer: base plus overlays
//! - Projection: the renderable frame at one instant
//! - Timeline: events in chronological order

pub mod branch_registry;
pub mod composer;
pub mod projection;
pub mod time_codec;
pub mod timeline;

pub use branch_registry::{BranchError, BranchOverlay, BranchRegistry, PivotSelection};
pub use composer::compose;
pub use projection::{project, Frame, ZoomLevel};
pub use time_codec::TimeRange;
pub use timeline::{timeline, TimelineEntry};
