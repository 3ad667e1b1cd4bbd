//! Presentation hosts
//!
//! A host receives every finished frame. The shipped host writes SVG
//! snapshots; a windowed host would implement the same trait.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use helipanel_core::render::{write_svg_file, Frame};

/// Something that shows frames.
pub trait PresentationHost {
    /// Called once per rendered frame
    fn present(&mut self, frame: &Frame) -> Result<()>;

    /// The host wants the loop to stop (window closed, etc.)
    fn quit_requested(&self) -> bool {
        false
    }

    /// Called once after the loop ends with the last frame, if any
    fn finish(&mut self, _last: Option<&Frame>) -> Result<()> {
        Ok(())
    }
}

/// Writes every Nth frame to an SVG file, replacing it atomically.
pub struct SvgSnapshotHost {
    path: PathBuf,
    every: u32,
    frames: u64,
    written: u64,
}

impl SvgSnapshotHost {
    /// Prepare the output location. Fails if the directory cannot be created.
    pub fn new(path: &Path, every: u32) -> Result<Self> {
        if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating snapshot directory {}", dir.display()))?;
        }
        info!("Writing panel snapshots to {} every {} frames", path.display(), every.max(1));
        Ok(Self {
            path: path.to_path_buf(),
            every: every.max(1),
            frames: 0,
            written: 0,
        })
    }

    /// Snapshots written so far
    pub fn written(&self) -> u64 {
        self.written
    }

    fn write(&mut self, frame: &Frame) {
        match write_svg_file(frame, &self.path) {
            Ok(()) => {
                self.written += 1;
                debug!("Snapshot {} written", self.written);
            }
            // a missed snapshot is not worth stopping the panel for
            Err(e) => warn!("Failed to write snapshot {}: {}", self.path.display(), e),
        }
    }
}

impl PresentationHost for SvgSnapshotHost {
    fn present(&mut self, frame: &Frame) -> Result<()> {
        if self.frames % self.every as u64 == 0 {
            self.write(frame);
        }
        self.frames += 1;
        Ok(())
    }

    fn finish(&mut self, last: Option<&Frame>) -> Result<()> {
        if let Some(frame) = last {
            write_svg_file(frame, &self.path)
                .with_context(|| format!("writing final snapshot {}", self.path.display()))?;
            self.written += 1;
        }
        Ok(())
    }
}
