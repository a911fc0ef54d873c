//! ImageMagick rendering backend.
//!
//! Each render spawns one `convert` process and reads the PNG from its
//! standard output:
//!
//! ```text
//! # icon (http://www.imagemagick.org/Usage/masking/#shapes)
//! convert <mask> -background <color> -alpha shape png:-
//!
//! # texture (http://www.imagemagick.org/Usage/compose/#dissolve)
//! convert -size <w>x<h> xc:<color> <overlay> -compose dissolve \
//!     -define compose:args=<opacity>,100 -composite png:-
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use bytes::Bytes;
use tokio::process::Command;
use tracing::{debug, instrument};

use crate::cache::BoxFuture;

use super::{RenderBackend, RenderError, RenderInstruction};

/// Default ImageMagick binary.
pub const DEFAULT_CONVERT_PROGRAM: &str = "convert";

/// Renders by invoking ImageMagick's `convert`.
#[derive(Debug, Clone)]
pub struct MagickBackend {
    program: PathBuf,
}

impl MagickBackend {
    /// Creates a backend that runs the given `convert` binary.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Returns the binary this backend runs.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Builds the `convert` argument list for an instruction.
    pub fn args(instruction: &RenderInstruction) -> Vec<OsString> {
        match instruction {
            RenderInstruction::AlphaShape { mask, background } => vec![
                mask.clone().into_os_string(),
                "-background".into(),
                background.into(),
                "-alpha".into(),
                "shape".into(),
                "png:-".into(),
            ],
            RenderInstruction::Dissolve {
                width,
                height,
                background,
                overlay,
                opacity,
            } => vec![
                "-size".into(),
                format!("{}x{}", width, height).into(),
                format!("xc:{}", background).into(),
                overlay.clone().into_os_string(),
                "-compose".into(),
                "dissolve".into(),
                "-define".into(),
                format!("compose:args={},100", opacity).into(),
                "-composite".into(),
                "png:-".into(),
            ],
        }
    }

    #[instrument(skip(self, args), fields(program = %self.program.display()))]
    async fn run(&self, args: Vec<OsString>) -> Result<Bytes, RenderError> {
        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| RenderError::Spawn {
                program: self.program.display().to_string(),
                message: e.to_string(),
            })?;

        if !output.status.success() || output.stdout.is_empty() {
            return Err(RenderError::Backend {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        debug!(size_bytes = output.stdout.len(), "convert finished");
        Ok(Bytes::from(output.stdout))
    }
}

impl Default for MagickBackend {
    fn default() -> Self {
        Self::new(DEFAULT_CONVERT_PROGRAM)
    }
}

impl RenderBackend for MagickBackend {
    fn render(&self, instruction: RenderInstruction) -> BoxFuture<'_, Result<Bytes, RenderError>> {
        let args = Self::args(&instruction);
        Box::pin(self.run(args))
    }

    fn name(&self) -> &str {
        "imagemagick"
    }
}
