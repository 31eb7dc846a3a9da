//! Per-kind session-relative records.
//!
//! Every kind instantiates the same [`TrackableManager`](crate::TrackableManager);
//! kinds that support application placement add a few inherent methods on
//! their manager instantiation.

pub mod anchor;
pub mod bounding_box;
pub mod environment_probe;
pub mod image;
pub mod marker;
pub mod plane;
pub mod raycast;

pub use anchor::Anchor;
pub use bounding_box::{BoundingBox, BoundingBoxClassification};
pub use environment_probe::{EnvironmentProbe, ProbePlacement};
pub use image::TrackedImage;
pub use marker::{Marker, MarkerType};
pub use plane::{BoundedPlane, PlaneAlignment, PlaneClassification};
pub use raycast::TrackedRaycast;

#[cfg(test)]
#[path = "kinds_test.rs"]
mod kinds_test;
