//! Simulation observer trait for snapshots and animation export.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};

use super::render::AsciiRenderer;
use super::report::Report;
use super::types::Position;

/// Read-only copy of a field or warehouse
#[derive(Debug, Clone, PartialEq)]
pub struct DepotView {
    pub name: String,
    pub position: Position,
    pub resources: f64,
    /// Always `None` for fields
    pub capacity: Option<f64>,
}

/// Read-only copy of a transporter
#[derive(Debug, Clone, PartialEq)]
pub struct TransporterView {
    pub name: String,
    pub position: Position,
    pub loaded: f64,
    pub max_capacity: f64,
}

/// Full visible state of the world at the start of a turn
#[derive(Debug, Clone, PartialEq)]
pub struct WorldSnapshot {
    pub time: u64,
    pub fields: Vec<DepotView>,
    pub warehouses: Vec<DepotView>,
    pub transporters: Vec<TransporterView>,
}

/// Callbacks invoked by [`Simulation::run_observed`][crate::simulation::Simulation::run_observed].
///
/// All methods have default no-op implementations. Observers only receive
/// copies of the state, so nothing they do can change the run.
pub trait SimObserver {
    /// Whether [`on_turn_start`](Self::on_turn_start) needs a snapshot at all
    fn wants_snapshots(&self) -> bool {
        true
    }

    /// Called before every turn with the state the turn starts from
    fn on_turn_start(&mut self, _snapshot: &WorldSnapshot) {}

    /// Called once after the last turn
    fn on_run_end(&mut self, _report: &Report) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {
    fn wants_snapshots(&self) -> bool {
        false
    }
}

/// Renders one frame per turn and can export the sequence to disk
#[derive(Debug)]
pub struct FrameRecorder {
    renderer: AsciiRenderer,
    simulation_id: String,
    frames: Vec<(u64, String)>,
    /// Where to export when the run ends, if anywhere
    export_root: Option<PathBuf>,
    exported_to: Option<PathBuf>,
}

impl FrameRecorder {
    pub fn new(renderer: AsciiRenderer) -> Self {
        Self {
            renderer,
            simulation_id: format!("{:016x}", rand::random::<u64>()),
            frames: Vec::new(),
            export_root: None,
            exported_to: None,
        }
    }

    /// Export the animation under `root` as soon as the run ends
    pub fn exporting_to(mut self, root: impl Into<PathBuf>) -> Self {
        self.export_root = Some(root.into());
        self
    }

    pub fn simulation_id(&self) -> &str {
        &self.simulation_id
    }

    pub fn frames(&self) -> &[(u64, String)] {
        &self.frames
    }

    /// Directory of the last successful export
    pub fn exported_to(&self) -> Option<&Path> {
        self.exported_to.as_deref()
    }

    /// Write every frame to `<root>/<simulation id>/frames/frame_<t>.txt`
    /// and the whole sequence to `<root>/<simulation id>/animation.txt`.
    ///
    /// Returns the run directory.
    pub fn export(&self, root: &Path) -> Result<PathBuf> {
        let run_dir = root.join(&self.simulation_id);
        let frames_dir = run_dir.join("frames");
        fs::create_dir_all(&frames_dir)
            .with_context(|| format!("Failed to create {}", frames_dir.display()))?;

        let mut animation = String::new();
        for (time, frame) in &self.frames {
            let path = frames_dir.join(format!("frame_{time}.txt"));
            fs::write(&path, frame)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            animation.push_str(frame);
            animation.push('\n');
        }

        let animation_path = run_dir.join("animation.txt");
        fs::write(&animation_path, animation)
            .with_context(|| format!("Failed to write {}", animation_path.display()))?;
        Ok(run_dir)
    }
}

impl Default for FrameRecorder {
    fn default() -> Self {
        Self::new(AsciiRenderer::default())
    }
}

impl SimObserver for FrameRecorder {
    fn on_turn_start(&mut self, snapshot: &WorldSnapshot) {
        self.frames
            .push((snapshot.time, self.renderer.render(snapshot)));
    }

    fn on_run_end(&mut self, _report: &Report) {
        let Some(root) = self.export_root.clone() else {
            return;
        };
        if self.frames.is_empty() {
            warn!("No frames recorded, skipping animation export");
            return;
        }
        match self.export(&root) {
            Ok(run_dir) => {
                info!(
                    "Animation with {} frames created at {}",
                    self.frames.len(),
                    run_dir.join("animation.txt").display()
                );
                self.exported_to = Some(run_dir);
            }
            Err(err) => warn!("Animation export failed: {err:#}"),
        }
    }
}
