//! External graph renderer invocation.
//!
//! The renderer is run as
//! `<program> [leading args...] -T<format> <input> -o <output>`, which is
//! Graphviz `dot`'s command line. Leading arguments let a wrapper (for
//! example `sh -c '...'`) stand in for `dot`.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::RenderError;

/// Renderer program used when none is configured.
pub const DEFAULT_RENDERER: &str = "dot";

/// Image formats the renderer is asked to produce.
pub const SUPPORTED_FORMATS: &[&str] = &["png", "svg", "pdf", "jpg", "jpeg", "gif", "bmp"];

/// A configured renderer subprocess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Renderer {
    program: PathBuf,
    leading_args: Vec<String>,
}

impl Default for Renderer {
    fn default() -> Self {
        Renderer::new(DEFAULT_RENDERER)
    }
}

impl Renderer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Renderer {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    /// Arguments passed before the `-T<format>` flag.
    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn leading_args(&self) -> &[String] {
        &self.leading_args
    }

    pub fn is_supported_format(format: &str) -> bool {
        SUPPORTED_FORMATS.contains(&format)
    }

    pub fn check_format(format: &str) -> Result<(), RenderError> {
        if Self::is_supported_format(format) {
            Ok(())
        } else {
            Err(RenderError::UnsupportedFormat(format.to_string()))
        }
    }

    /// Renders the DOT file at `input` into `output`.
    ///
    /// Success means the renderer exited zero and left a non-empty file at
    /// `output`. A file already at `output` is removed first so a renderer
    /// that silently writes nothing cannot pass off a stale image.
    pub fn render(&self, input: &Path, output: &Path, format: &str) -> Result<(), RenderError> {
        Self::check_format(format)?;

        if let Err(err) = std::fs::remove_file(output) {
            if err.kind() != std::io::ErrorKind::NotFound {
                return Err(RenderError::ImageLoadFailure {
                    path: output.to_path_buf(),
                    reason: format!("could not clear previous output: {err}"),
                });
            }
        }

        tracing::debug!(
            program = %self.program.display(),
            input = %input.display(),
            output = %output.display(),
            format,
            "invoking graph renderer"
        );

        let result = Command::new(&self.program)
            .args(&self.leading_args)
            .arg(format!("-T{format}"))
            .arg(input)
            .arg("-o")
            .arg(output)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| {
                tracing::warn!(program = %self.program.display(), error = %source, "renderer not launchable");
                RenderError::RendererMissing {
                    program: self.program.clone(),
                    source,
                }
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
            tracing::warn!(code = ?result.status.code(), %stderr, "renderer failed");
            return Err(RenderError::RendererNonZeroExit {
                code: result.status.code(),
                stderr,
            });
        }

        match std::fs::metadata(output) {
            Ok(meta) if meta.len() > 0 => {
                tracing::info!(output = %output.display(), bytes = meta.len(), "rendered graph image");
                Ok(())
            }
            Ok(_) => Err(RenderError::ImageLoadFailure {
                path: output.to_path_buf(),
                reason: "renderer produced an empty file".to_string(),
            }),
            Err(err) => Err(RenderError::ImageLoadFailure {
                path: output.to_path_buf(),
                reason: err.to_string(),
            }),
        }
    }
}
