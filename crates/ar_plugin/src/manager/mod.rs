//! Trackable manager - the reconciliation engine.
//!
//! Once per tick the manager mirrors the provider's set of trackables into a
//! local collection:
//!
//! ```text
//! ┌────────────┐   ┌───────┐   ┌─────────┐   ┌─────────┐   ┌────────┐   ┌─────────┐
//! │ GetChanges ├──►│ Added ├──►│ Updated ├──►│ Removed ├──►│ Notify ├──►│ Destroy │
//! └────────────┘   └───────┘   └─────────┘   └─────────┘   └────────┘   └─────────┘
//!                      │                          │                          ▲
//!               existing id ⇒ update        deferred, not dropped ───────────┘
//! ```
//!
//! The order is load-bearing. Destruction runs in a drop guard so a panicking
//! listener cannot leak removed trackables.
//!
//! Applications may also create trackables eagerly
//! ([`TrackableManager::create_trackable_immediate`]). Those stay `pending`
//! until the provider reports their id, or until they are cancelled with
//! [`TrackableManager::destroy_pending_trackable`].

mod config;

pub use config::TrackableManagerConfig;

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use tracing::{debug, info_span, trace, warn};
use web_time::Instant;

use crate::error::{ArError, ArResult};
use crate::lifecycle::TrackableLifecycle;
use crate::metrics::ManagerMetrics;
use crate::provider::{ManualPlacementProvider, TrackableChanges, TrackingProvider};
use crate::trackable::{ParentSpace, SessionRelativeData, Trackable, TrackableCollection};
use crate::types::{Pose, TrackableId};

// =============================================================================
// Change notification
// =============================================================================

/// Aggregated change notification for one tick.
///
/// Removed trackables are still fully valid here; they are destroyed only
/// after every listener has run.
pub struct TrackablesChanged<'a, D: SessionRelativeData> {
  pub added: Vec<&'a Trackable<D>>,
  pub updated: Vec<&'a Trackable<D>>,
  pub removed: Vec<&'a Trackable<D>>,
}

/// Boxed change listener.
pub type ChangeListener<D> = Box<dyn FnMut(&TrackablesChanged<'_, D>) + Send + Sync>;

/// Handle returned by [`TrackableManager::add_listener`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Ids touched by one tick, in processing order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeSummary {
  pub added: Vec<TrackableId>,
  pub updated: Vec<TrackableId>,
  pub removed: Vec<TrackableId>,
}

impl ChangeSummary {
  pub fn is_empty(&self) -> bool {
    self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
  }
}

// =============================================================================
// DeferredDestroy - guaranteed cleanup after notification
// =============================================================================

/// Owns removed trackables until notification is over, then destroys or
/// releases them. Runs during unwinding too.
struct DeferredDestroy<'a, D: SessionRelativeData> {
  removed: Vec<Trackable<D>>,
  lifecycle: &'a mut dyn TrackableLifecycle<D>,
  metrics: &'a mut ManagerMetrics,
}

impl<D: SessionRelativeData> Drop for DeferredDestroy<'_, D> {
  fn drop(&mut self) {
    if std::thread::panicking() {
      warn!(
        kind = %D::KIND,
        removed = self.removed.len(),
        "change listener panicked, destroying removed trackables before unwinding"
      );
      self.metrics.record_listener_panic();
    }

    for trackable in self.removed.drain(..) {
      if trackable.destroy_on_removal {
        self.lifecycle.destroy(trackable);
      } else {
        self.lifecycle.release(trackable);
      }
    }
  }
}

// =============================================================================
// TrackableManager<D>
// =============================================================================

/// Keeps one [`Trackable`] per provider id, generic over the per-kind record.
pub struct TrackableManager<D: SessionRelativeData> {
  config: TrackableManagerConfig,

  /// Live trackables.
  trackables: HashMap<TrackableId, Trackable<D>>,

  /// Ids created by the application and not yet reported by the provider.
  pending: HashSet<TrackableId>,

  /// Reused provider change buffers (cleared at tick start).
  changes: TrackableChanges<D>,
  added_ids: Vec<TrackableId>,
  updated_ids: Vec<TrackableId>,

  listeners: Vec<(ListenerId, ChangeListener<D>)>,
  next_listener_id: u64,

  /// World pose of the trackables parent (the tracking origin).
  origin: Pose,

  /// Last known world pose of each trackable others are attached to.
  parent_poses: HashMap<TrackableId, Pose>,

  metrics: ManagerMetrics,
}

impl<D: SessionRelativeData> Default for TrackableManager<D> {
  fn default() -> Self {
    Self::new(TrackableManagerConfig::default())
  }
}

impl<D: SessionRelativeData> TrackableManager<D> {
  pub fn new(config: TrackableManagerConfig) -> Self {
    Self {
      config,
      trackables: HashMap::new(),
      pending: HashSet::new(),
      changes: TrackableChanges::new(),
      added_ids: Vec::new(),
      updated_ids: Vec::new(),
      listeners: Vec::new(),
      next_listener_id: 0,
      origin: Pose::IDENTITY,
      parent_poses: HashMap::new(),
      metrics: ManagerMetrics::new(),
    }
  }

  // ---------------------------------------------------------------------------
  // Accessors
  // ---------------------------------------------------------------------------

  pub fn config(&self) -> &TrackableManagerConfig {
    &self.config
  }

  pub fn is_enabled(&self) -> bool {
    self.config.enabled
  }

  /// Disabled managers skip ticks and reject add/remove requests.
  pub fn set_enabled(&mut self, enabled: bool) {
    self.config.enabled = enabled;
  }

  pub fn set_fallback_raycasting(&mut self, enabled: bool) {
    self.config.fallback_raycasting = enabled;
  }

  /// Read-only view of all live trackables.
  pub fn trackables(&self) -> TrackableCollection<'_, D> {
    TrackableCollection::new(&self.trackables)
  }

  pub fn get_trackable(&self, id: TrackableId) -> Option<&Trackable<D>> {
    self.trackables.get(&id)
  }

  /// Mutable access for per-instance settings such as `destroy_on_removal`.
  pub fn get_trackable_mut(&mut self, id: TrackableId) -> Option<&mut Trackable<D>> {
    self.trackables.get_mut(&id)
  }

  pub fn is_pending(&self, id: TrackableId) -> bool {
    self.pending.contains(&id)
  }

  pub fn pending_count(&self) -> usize {
    self.pending.len()
  }

  /// World pose of the trackables parent.
  pub fn origin_pose(&self) -> Pose {
    self.origin
  }

  pub fn metrics(&self) -> &ManagerMetrics {
    &self.metrics
  }

  // ---------------------------------------------------------------------------
  // Listeners
  // ---------------------------------------------------------------------------

  /// Register a listener for the aggregated per-tick notification.
  pub fn add_listener<F>(&mut self, listener: F) -> ListenerId
  where
    F: FnMut(&TrackablesChanged<'_, D>) + Send + Sync + 'static,
  {
    let id = ListenerId(self.next_listener_id);
    self.next_listener_id += 1;
    self.listeners.push((id, Box::new(listener)));
    id
  }

  /// Unregister a listener. Returns false if it was not registered.
  pub fn remove_listener(&mut self, id: ListenerId) -> bool {
    let before = self.listeners.len();
    self.listeners.retain(|(listener_id, _)| *listener_id != id);
    self.listeners.len() != before
  }

  // ---------------------------------------------------------------------------
  // Reconciliation
  // ---------------------------------------------------------------------------

  /// Run one reconciliation tick against `provider`.
  ///
  /// Skipped entirely (no callbacks, collection untouched) when the manager is
  /// disabled, there is no provider, or the provider is not running.
  pub fn update(
    &mut self,
    provider: Option<&mut dyn TrackingProvider<D>>,
    lifecycle: &mut dyn TrackableLifecycle<D>,
  ) -> ChangeSummary {
    let Some(provider) = provider.filter(|p| p.is_running()) else {
      trace!(kind = %D::KIND, "no running provider, skipping tick");
      self.metrics.record_skipped_tick();
      return ChangeSummary::default();
    };
    if !self.config.enabled {
      trace!(kind = %D::KIND, "manager disabled, skipping tick");
      self.metrics.record_skipped_tick();
      return ChangeSummary::default();
    }

    let _span = info_span!("trackables::update", kind = %D::KIND).entered();
    let start = Instant::now();

    self.changes.clear();
    self.added_ids.clear();
    self.updated_ids.clear();
    provider.get_changes(&mut self.changes);
    let mut changes = std::mem::take(&mut self.changes);

    // Added: an id we already hold (eager creation) is an update.
    for data in changes.added.drain(..) {
      let id = data.trackable_id();
      self.create_or_update(data, lifecycle);
      self.added_ids.push(id);
    }

    for data in changes.updated.drain(..) {
      let id = data.trackable_id();
      if !self.trackables.contains_key(&id) {
        warn!(kind = %D::KIND, %id, "provider updated an unknown trackable, creating it");
      }
      self.create_or_update(data, lifecycle);
      self.updated_ids.push(id);
    }

    let mut summary = ChangeSummary {
      added: self.added_ids.clone(),
      updated: self.updated_ids.clone(),
      removed: Vec::with_capacity(changes.removed.len()),
    };

    let mut deferred = DeferredDestroy {
      removed: Vec::with_capacity(changes.removed.len()),
      lifecycle,
      metrics: &mut self.metrics,
    };

    for id in changes.removed.drain(..) {
      match self.trackables.remove(&id) {
        Some(trackable) => {
          self.pending.remove(&id);
          summary.removed.push(id);
          deferred.removed.push(trackable);
        }
        None => debug!(kind = %D::KIND, %id, "removal of unknown trackable ignored"),
      }
    }

    self.changes = changes;

    if !summary.is_empty() {
      let event = TrackablesChanged {
        added: self.added_ids.iter().filter_map(|id| self.trackables.get(id)).collect(),
        updated: self.updated_ids.iter().filter_map(|id| self.trackables.get(id)).collect(),
        removed: deferred.removed.iter().collect(),
      };
      for (_, listener) in self.listeners.iter_mut() {
        listener(&event);
      }
    }

    drop(deferred);

    self.metrics.record_tick(
      summary.added.len(),
      summary.updated.len(),
      summary.removed.len(),
      self.trackables.len(),
      self.pending.len(),
      start.elapsed().as_micros() as u64,
    );

    if !summary.is_empty() {
      debug!(
        kind = %D::KIND,
        added = summary.added.len(),
        updated = summary.updated.len(),
        removed = summary.removed.len(),
        "trackables changed"
      );
    }

    summary
  }

  /// Insert a new trackable or refresh an existing one. Confirms pending ids.
  fn create_or_update(&mut self, data: D, lifecycle: &mut dyn TrackableLifecycle<D>) {
    let id = data.trackable_id();
    let origin = self.origin;
    match self.trackables.entry(id) {
      Entry::Occupied(mut entry) => {
        let trackable = entry.get_mut();
        trackable.set_session_relative_data(data);
        trackable.set_pending(false);
        let parent = resolve_parent_space(&self.parent_poses, trackable);
        trackable.reposition_under(parent, &origin);
        self.pending.remove(&id);
        lifecycle.on_updated(trackable);
      }
      Entry::Vacant(entry) => {
        let trackable = entry.insert(Trackable::new(data, self.config.destroy_on_removal));
        let parent = resolve_parent_space(&self.parent_poses, trackable);
        trackable.reposition_under(parent, &origin);
        lifecycle.on_created(trackable);
      }
    }
  }

  // ---------------------------------------------------------------------------
  // Eager lifecycle
  // ---------------------------------------------------------------------------

  /// Create a trackable from application-supplied data before the provider
  /// confirms it. The trackable is usable immediately and stays pending until
  /// the provider reports its id.
  ///
  /// If the id is already tracked its data is replaced; a confirmed trackable
  /// never becomes pending again.
  pub fn create_trackable_immediate(
    &mut self,
    data: D,
    lifecycle: &mut dyn TrackableLifecycle<D>,
  ) -> &Trackable<D> {
    let id = data.trackable_id();
    let origin = self.origin;
    match self.trackables.entry(id) {
      Entry::Occupied(entry) => {
        let trackable = entry.into_mut();
        trackable.set_session_relative_data(data);
        let parent = resolve_parent_space(&self.parent_poses, trackable);
        trackable.reposition_under(parent, &origin);
        lifecycle.on_updated(trackable);
        trackable
      }
      Entry::Vacant(entry) => {
        self.pending.insert(id);
        let trackable = entry.insert(Trackable::new(data, self.config.destroy_on_removal));
        trackable.set_pending(true);
        trackable.set_manually_placed();
        let parent = resolve_parent_space(&self.parent_poses, trackable);
        trackable.reposition_under(parent, &origin);
        lifecycle.on_created(trackable);
        trackable
      }
    }
  }

  /// Cancel a trackable that the provider never confirmed. Its backing
  /// object is destroyed immediately. Returns false if `id` is not pending.
  pub fn destroy_pending_trackable(
    &mut self,
    id: TrackableId,
    lifecycle: &mut dyn TrackableLifecycle<D>,
  ) -> bool {
    if !self.pending.remove(&id) {
      return false;
    }
    match self.trackables.remove(&id) {
      Some(trackable) => {
        debug!(kind = %D::KIND, %id, "destroyed pending trackable");
        lifecycle.destroy(trackable);
        true
      }
      None => false,
    }
  }

  /// Whether `data` may be handed to the provider as a new trackable.
  pub fn can_be_added_to_subsystem(&self, data: &D) -> bool {
    self.config.enabled && !self.trackables.contains_key(&data.trackable_id())
  }

  pub(crate) fn ensure_enabled(&self) -> ArResult<()> {
    if self.config.enabled {
      Ok(())
    } else {
      Err(ArError::ManagerDisabled { kind: D::KIND })
    }
  }

  /// Convert a world pose into session space.
  pub fn session_pose_from_world(&self, world: &Pose) -> Pose {
    self.origin.inverse_transform_pose(world)
  }

  /// Eagerly insert provider-accepted data as a manual placement.
  pub(crate) fn place(&mut self, data: D, lifecycle: &mut dyn TrackableLifecycle<D>) -> TrackableId {
    self.create_trackable_immediate(data, lifecycle).trackable_id()
  }

  // ---------------------------------------------------------------------------
  // Manual placement
  // ---------------------------------------------------------------------------

  /// Ask the provider for a new trackable at a world pose.
  ///
  /// Returns `Ok(None)` when the provider is not running or refuses.
  pub fn try_add<P>(
    &mut self,
    provider: &mut P,
    lifecycle: &mut dyn TrackableLifecycle<D>,
    pose: Pose,
  ) -> ArResult<Option<TrackableId>>
  where
    P: ManualPlacementProvider<D> + ?Sized,
  {
    self.ensure_enabled()?;
    if !provider.is_running() {
      return Ok(None);
    }
    let session_pose = self.session_pose_from_world(&pose);
    let Some(data) = provider.try_add(session_pose) else {
      return Ok(None);
    };
    Ok(Some(self.place(data, lifecycle)))
  }

  /// Ask the provider to remove a trackable.
  ///
  /// A trackable the provider never confirmed is destroyed immediately.
  /// Confirmed trackables disappear when the provider reports the removal.
  pub fn try_remove<P>(
    &mut self,
    provider: &mut P,
    lifecycle: &mut dyn TrackableLifecycle<D>,
    id: TrackableId,
  ) -> ArResult<bool>
  where
    P: ManualPlacementProvider<D> + ?Sized,
  {
    self.ensure_enabled()?;
    if !id.is_valid() {
      return Err(ArError::InvalidArgument(format!(
        "cannot remove a {} with an invalid id",
        D::KIND
      )));
    }
    let trackable = self
      .trackables
      .get(&id)
      .ok_or(ArError::UnknownTrackable { kind: D::KIND, id })?;
    if trackable.session_relative_data().is_automatically_placed()
      && !provider.supports_removal_of_automatic()
    {
      return Err(ArError::Unsupported(
        "the provider does not support removing automatically placed trackables",
      ));
    }
    if !provider.is_running() {
      return Ok(false);
    }

    let removed = provider.try_remove(id);
    if removed {
      self.destroy_pending_trackable(id, lifecycle);
    }
    Ok(removed)
  }

  // ---------------------------------------------------------------------------
  // Parent space
  // ---------------------------------------------------------------------------

  /// The trackables parent moved. Trackables parented under it follow
  /// automatically; every other trackable gets its local pose recomputed from
  /// its last session pose.
  ///
  /// Returns the recomputed local poses.
  pub fn set_origin_pose(&mut self, origin: Pose) -> Vec<(TrackableId, Pose)> {
    self.origin = origin;
    let mut moved = Vec::new();
    for (id, trackable) in self.trackables.iter_mut() {
      if matches!(trackable.placement().parent, ParentSpace::TrackablesParent) {
        continue;
      }
      trackable.reposition(&origin);
      moved.push((*id, trackable.placement().local_pose));
    }
    moved
  }

  /// Move a trackable under another parent, keeping its world pose.
  /// Returns the new local pose.
  pub fn reparent(&mut self, id: TrackableId, parent: ParentSpace) -> ArResult<Pose> {
    let origin = self.origin;
    let trackable = self
      .trackables
      .get_mut(&id)
      .ok_or(ArError::UnknownTrackable { kind: D::KIND, id })?;
    trackable.set_parent(parent, &origin);
    Ok(trackable.placement().local_pose)
  }

  // ---------------------------------------------------------------------------
  // Attachment to other trackables
  // ---------------------------------------------------------------------------

  /// Last world pose given for a parent trackable.
  pub fn parent_trackable_pose(&self, parent: TrackableId) -> Option<Pose> {
    self.parent_poses.get(&parent).copied()
  }

  /// A trackable others attach to (usually a plane of another manager) is at
  /// `world`. Attached trackables keep their local pose and move with it;
  /// trackables whose parent was unknown until now are attached in place.
  ///
  /// Returns the trackables whose placement changed, with their local poses.
  pub fn set_parent_trackable_pose(&mut self, parent: TrackableId, world: Pose) -> Vec<(TrackableId, Pose)> {
    let origin = self.origin;
    self.parent_poses.insert(parent, world);
    let space = ParentSpace::Trackable { id: parent, world };

    let mut moved = Vec::new();
    for (id, trackable) in self.trackables.iter_mut() {
      if trackable.session_relative_data().parent_id() != Some(parent) {
        continue;
      }
      match trackable.placement().parent {
        ParentSpace::Trackable { id: current, world: pose } if current == parent => {
          if pose == world {
            continue;
          }
          trackable.follow_parent(space);
        }
        _ => trackable.set_parent(space, &origin),
      }
      moved.push((*id, trackable.placement().local_pose));
    }
    if !moved.is_empty() {
      trace!(kind = %D::KIND, %parent, moved = moved.len(), "parent trackable moved");
    }
    moved
  }

  /// The parent trackable is gone. Its children go back under the trackables
  /// parent, keeping their world pose.
  pub fn clear_parent_trackable(&mut self, parent: TrackableId) -> Vec<(TrackableId, Pose)> {
    if self.parent_poses.remove(&parent).is_none() {
      return Vec::new();
    }
    let origin = self.origin;
    let mut moved = Vec::new();
    for (id, trackable) in self.trackables.iter_mut() {
      if matches!(trackable.placement().parent, ParentSpace::Trackable { id: current, .. } if current == parent) {
        trackable.set_parent(ParentSpace::TrackablesParent, &origin);
        moved.push((*id, trackable.placement().local_pose));
      }
    }
    debug!(kind = %D::KIND, %parent, detached = moved.len(), "parent trackable cleared");
    moved
  }
}

/// Parent space for a trackable's latest data: its parent trackable when that
/// pose is known, otherwise the trackables parent. Manual reparenting sticks
/// for trackables without a parent id.
fn resolve_parent_space<D: SessionRelativeData>(
  parent_poses: &HashMap<TrackableId, Pose>,
  trackable: &Trackable<D>,
) -> ParentSpace {
  let current = trackable.placement().parent;
  match trackable.session_relative_data().parent_id() {
    Some(parent) => match parent_poses.get(&parent) {
      Some(world) => ParentSpace::Trackable { id: parent, world: *world },
      None => ParentSpace::TrackablesParent,
    },
    None => match current {
      ParentSpace::Trackable { .. } => ParentSpace::TrackablesParent,
      other => other,
    },
  }
}
