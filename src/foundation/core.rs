use std::collections::{BTreeMap, HashMap};

use crate::foundation::error::{FollowPointError, FollowPointResult};

pub use kurbo::{Point, Vec2};

/// Stable identity of a target on the playfield.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct TargetId(pub u64);

impl std::fmt::Display for TargetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A timed target that follow points lead towards.
///
/// Targets are owned by the caller. Connections only hold [`TargetId`]s and look the data up
/// through a [`TargetSource`] when they need it.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Target {
    /// Identity, unique within one source.
    pub id: TargetId,
    /// Hit time in milliseconds.
    pub start_time: f64,
    /// Playfield position.
    pub position: Point,
    /// Visual scale of the target.
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Fade-in duration in milliseconds.
    #[serde(default = "default_fade_in")]
    pub fade_in: f64,
    /// Lead time before `start_time` at which the target starts appearing, in milliseconds.
    #[serde(default = "default_preempt")]
    pub preempt: f64,
}

fn default_scale() -> f64 {
    1.0
}

fn default_fade_in() -> f64 {
    400.0
}

fn default_preempt() -> f64 {
    1200.0
}

impl Target {
    /// Target with default scale and timing attributes.
    pub fn new(id: TargetId, start_time: f64, position: Point) -> Self {
        Self {
            id,
            start_time,
            position,
            scale: default_scale(),
            fade_in: default_fade_in(),
            preempt: default_preempt(),
        }
    }

    /// Check the invariants the timing model relies on.
    ///
    /// A non-positive `preempt` would turn the preempt scale negative and schedule fade-ins after
    /// fade-outs, so it is rejected here rather than clamped later.
    pub fn validate(&self) -> FollowPointResult<()> {
        if !self.start_time.is_finite() {
            return Err(FollowPointError::validation(format!(
                "target {} start_time must be finite",
                self.id
            )));
        }
        if !self.position.is_finite() {
            return Err(FollowPointError::validation(format!(
                "target {} position must be finite",
                self.id
            )));
        }
        if !self.scale.is_finite() || self.scale < 0.0 {
            return Err(FollowPointError::validation(format!(
                "target {} scale must be finite and >= 0",
                self.id
            )));
        }
        if !self.fade_in.is_finite() || self.fade_in < 0.0 {
            return Err(FollowPointError::validation(format!(
                "target {} fade_in must be finite and >= 0",
                self.id
            )));
        }
        if !self.preempt.is_finite() || self.preempt <= 0.0 {
            return Err(FollowPointError::validation(format!(
                "target {} preempt must be finite and > 0",
                self.id
            )));
        }
        Ok(())
    }
}

/// Read access to a caller-owned target collection.
pub trait TargetSource {
    /// Look up a target by id.
    fn target(&self, id: TargetId) -> Option<&Target>;
}

impl TargetSource for BTreeMap<TargetId, Target> {
    fn target(&self, id: TargetId) -> Option<&Target> {
        self.get(&id)
    }
}

impl<S: std::hash::BuildHasher> TargetSource for HashMap<TargetId, Target, S> {
    fn target(&self, id: TargetId) -> Option<&Target> {
        self.get(&id)
    }
}

impl TargetSource for [Target] {
    fn target(&self, id: TargetId) -> Option<&Target> {
        self.iter().find(|t| t.id == id)
    }
}

impl TargetSource for Vec<Target> {
    fn target(&self, id: TargetId) -> Option<&Target> {
        self.as_slice().target(id)
    }
}

/// Resolve a registered target. A registered id missing from its source is a broken contract.
pub(crate) fn registered<S: TargetSource + ?Sized>(targets: &S, id: TargetId) -> &Target {
    targets
        .target(id)
        .unwrap_or_else(|| panic!("target {id} is registered but missing from its source"))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
