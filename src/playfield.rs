use std::{collections::HashSet, fs::File, io::BufReader, path::Path};

use crate::{
    foundation::{
        core::{Point, Target, TargetId, TargetSource},
        error::{FollowPointError, FollowPointResult},
    },
    render::renderer::{FollowPointRenderer, RendererOpts},
};

/// A JSON-loadable set of targets together with the options to render them with.
///
/// This is the caller side of the renderer: it owns the target data and hands it to
/// [`FollowPointRenderer`] through [`TargetSource`]. Setters change the data only; callers still
/// notify the renderer through [`FollowPointRenderer::start_time_changed`] and
/// [`FollowPointRenderer::position_changed`].
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Playfield {
    /// Targets in file order.
    pub targets: Vec<Target>,
    /// Renderer options.
    #[serde(default)]
    pub opts: RendererOpts,
}

impl Playfield {
    /// Parse a playfield from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> FollowPointResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| FollowPointError::serde(format!("parse playfield JSON: {e}")))
    }

    /// Parse a playfield from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> FollowPointResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            FollowPointError::validation(format!("open playfield JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check ids are unique, every target is well-formed and the options are usable.
    pub fn validate(&self) -> FollowPointResult<()> {
        let mut seen = HashSet::with_capacity(self.targets.len());
        for t in &self.targets {
            if !seen.insert(t.id) {
                return Err(FollowPointError::validation(format!(
                    "duplicate target id {}",
                    t.id
                )));
            }
            t.validate()?;
        }
        self.opts.validate()
    }

    /// Earliest target start time.
    pub fn earliest_time(&self) -> Option<f64> {
        self.targets.iter().map(|t| t.start_time).reduce(f64::min)
    }

    /// Change the start time of `id`.
    pub fn set_start_time(&mut self, id: TargetId, start_time: f64) -> FollowPointResult<()> {
        self.target_mut(id)?.start_time = start_time;
        Ok(())
    }

    /// Move `id` to `position`.
    pub fn set_position(&mut self, id: TargetId, position: Point) -> FollowPointResult<()> {
        self.target_mut(id)?.position = position;
        Ok(())
    }

    /// Validate and register every target with a fresh renderer.
    pub fn build_renderer(&self) -> FollowPointResult<FollowPointRenderer> {
        self.validate()?;
        let mut renderer = FollowPointRenderer::new(self.opts)?;
        for t in &self.targets {
            renderer.add_target(self, t.id)?;
        }
        Ok(renderer)
    }

    fn target_mut(&mut self, id: TargetId) -> FollowPointResult<&mut Target> {
        self.targets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| FollowPointError::validation(format!("target {id} not found")))
    }
}

impl TargetSource for Playfield {
    fn target(&self, id: TargetId) -> Option<&Target> {
        self.targets.target(id)
    }
}

#[cfg(test)]
#[path = "../tests/unit/playfield.rs"]
mod tests;
