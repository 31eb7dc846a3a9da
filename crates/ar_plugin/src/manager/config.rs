//! TrackableManagerConfig - per-manager settings.

/// Configuration for a [`TrackableManager`](super::TrackableManager).
#[derive(Clone, Debug, PartialEq)]
pub struct TrackableManagerConfig {
  /// Disabled managers skip ticks and reject add/remove requests.
  pub enabled: bool,

  /// Default `destroy_on_removal` for new trackables.
  pub destroy_on_removal: bool,

  /// Offer this manager's trackables to the fallback raycast registry.
  pub fallback_raycasting: bool,
}

impl Default for TrackableManagerConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      destroy_on_removal: true,
      fallback_raycasting: true,
    }
  }
}

impl TrackableManagerConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_enabled(mut self, enabled: bool) -> Self {
    self.enabled = enabled;
    self
  }

  pub fn with_destroy_on_removal(mut self, destroy: bool) -> Self {
    self.destroy_on_removal = destroy;
    self
  }

  pub fn with_fallback_raycasting(mut self, enabled: bool) -> Self {
    self.fallback_raycasting = enabled;
    self
  }
}
