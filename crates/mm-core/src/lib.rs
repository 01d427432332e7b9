pub mod animation;
pub mod assets;
pub mod css;
pub mod error;
pub mod id;
pub mod model;
pub mod reveal;
pub mod share;
pub mod snapshot;
pub mod viewport;

pub use error::{Error, Result};
pub use id::ObjectId;
pub use model::*;
pub use reveal::{RevealFrame, RevealPhase, RevealTimeline};
pub use share::{ShareTarget, SharedDesign};
pub use snapshot::Snapshot;
pub use viewport::{Chrome, ChromeBar, Fit, Viewport, ViewportConfig};

// Re-export kurbo geometry so downstream crates share one version.
pub use kurbo::{Point, Size, Vec2};
