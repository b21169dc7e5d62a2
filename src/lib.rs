//! Follow-point connections for rhythm-game playfields.
//!
//! Follow points are short-lived markers drawn between consecutive targets so a player can see
//! where the next one appears. The crate keeps a time-ordered chain of connections in sync with
//! a changing set of targets and generates each connection's markers on demand:
//!
//! - Keep targets in any [`TargetSource`] (or load a [`Playfield`])
//! - Register them with a [`FollowPointRenderer`]
//! - Call [`FollowPointRenderer::update`] once per frame and sample
//!   [`FollowPointRenderer::visible_points`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod connection;
pub(crate) mod playfield;
pub(crate) mod render;

pub use crate::foundation::core::{Point, Target, TargetId, TargetSource, Vec2};
pub use crate::foundation::error::{FollowPointError, FollowPointResult};

pub use crate::animation::ease::Ease;
pub use crate::animation::sequence::{Lerp, Pose, Sequence, Transforms, Tween};
pub use crate::connection::entry::{ConnectionEntry, Invalidation};
pub use crate::connection::index::OrderedConnectionIndex;
pub use crate::connection::point::{FollowPoint, PointPhase};
pub use crate::connection::renderer::{
    FollowPointConnection, MAX_SEGMENT_LENGTH, PointPlan, plan_points,
};
pub use crate::connection::timing::{
    BASE_PREEMPT, FadeTimes, PREEMPT_MIN, SPACING, TimingModel, fade_times,
};
pub use crate::playfield::Playfield;
pub use crate::render::lifetime::{LifetimeChanges, LifetimeContainer};
pub use crate::render::pool::{Pool, PoolHandle, PoolOpts, PoolStats};
pub use crate::render::renderer::{FollowPointRenderer, PointSnapshot, RendererOpts, RendererStats};
pub use crate::render::scheduler::RefreshScheduler;
