//! ar_plugin - Engine independent AR trackable management
//!
//! Platform AR backends (providers) report what they track as per-frame
//! change-sets. This crate mirrors those change-sets into persistent
//! trackables with a stable lifecycle, and provides the geometry that sits on
//! top of them.
//!
//! # Features
//!
//! - **Reconciliation**: one generic [`TrackableManager`] per trackable kind
//!   applies added/updated/removed records, with eager (pending) creation and
//!   destruction deferred until every listener has seen the change
//! - **Plane meshes**: ear-clipping triangulation of plane boundaries
//! - **Raycasting**: native provider raycasts merged with software fallbacks
//!   for planes and bounding boxes
//! - **Metrics**: optional per-manager tick statistics (`metrics` feature)
//!
//! # Example
//!
//! ```ignore
//! use ar_plugin::{BoundedPlane, NullLifecycle, TrackableManager};
//!
//! let mut planes = TrackableManager::<BoundedPlane>::default();
//! planes.add_listener(|changes| {
//!     for plane in &changes.added {
//!         println!("new plane {}", plane.trackable_id());
//!     }
//! });
//!
//! // Once per frame:
//! planes.update(Some(&mut provider), &mut NullLifecycle);
//! ```

pub mod error;
pub mod types;

pub use error::{ArError, ArResult};
pub use types::{Pose, Ray, TrackableId, TrackableKind, TrackableType, TrackingState};

// Trackable model and provider contracts
pub mod provider;
pub mod trackable;
pub use provider::{
  AnchorProvider, EnvironmentProbeProvider, ManualPlacementProvider, RaycastProvider,
  RaycastTrackingProvider, TrackableChanges, TrackingProvider,
};
pub use trackable::{ParentSpace, Placement, SessionRelativeData, Trackable, TrackableCollection};

// Engine bridge callbacks
pub mod lifecycle;
pub use lifecycle::{NullLifecycle, TrackableLifecycle};

// Reconciliation engine
pub mod manager;
pub use manager::{
  ChangeListener, ChangeSummary, ListenerId, TrackableManager, TrackableManagerConfig,
  TrackablesChanged,
};

// Per-kind records
pub mod kinds;
pub use kinds::{
  Anchor, BoundedPlane, BoundingBox, BoundingBoxClassification, EnvironmentProbe, Marker,
  MarkerType, PlaneAlignment, PlaneClassification, ProbePlacement, TrackedImage, TrackedRaycast,
};

// Plane boundary triangulation
pub mod plane_mesh;
pub use plane_mesh::{PlaneMeshConfig, PlaneMeshData};

// Raycast dispatch and fallback raycasters
pub mod raycast;
pub use raycast::{
  ArRaycastHit, FallbackRaycaster, FallbackRaycasters, RaycastDispatcher, RaycastHit,
  ViewportCamera,
};

// Engine-agnostic metrics
pub mod metrics;
pub use metrics::ManagerMetrics;
