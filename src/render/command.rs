//! FOP Command Renderer
//!
//! Runs Apache FOP as a subprocess inside a throwaway working directory.
//!
//! ## Requirements
//!
//! - `fop` must be installed and available in PATH (or configured via
//!   [`FopCommandConfig::fop_path`])
//!
//! Each call writes `template.xsl` and `data.xml` into a fresh `fop-work-*`
//! directory, runs `fop -xml data.xml -xsl template.xsl -pdf output.pdf`,
//! and reads the PDF back. The directory is removed on every exit path and
//! the subprocess is killed if the call is abandoned.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::process::Command;

use super::provider::Renderer;
use super::types::{RenderContext, RenderError, RendererKind};

/// Upper bound for a single FOP run
pub const MAX_RUN_TIME: Duration = Duration::from_secs(60);

const STYLESHEET_FILE: &str = "template.xsl";
const DATA_FILE: &str = "data.xml";
const OUTPUT_FILE: &str = "output.pdf";
const LOG_FILE: &str = "fop.log";

/// Configuration for the FOP command renderer
#[derive(Debug, Clone)]
pub struct FopCommandConfig {
    /// Path to fop executable (default: "fop" - uses PATH)
    pub fop_path: String,
    /// Arguments placed before the input/output arguments (e.g. `-c fop.xconf`)
    pub base_args: Vec<String>,
    /// Parent directory for per-call working directories (default: system temp)
    pub work_root: Option<PathBuf>,
    /// Cap on the run time, applied on top of the caller's deadline
    pub max_run_time: Duration,
}

impl Default for FopCommandConfig {
    fn default() -> Self {
        Self {
            fop_path: "fop".to_string(),
            base_args: Vec::new(),
            work_root: None,
            max_run_time: MAX_RUN_TIME,
        }
    }
}

/// Renderer backed by a local `fop` process
pub struct FopCommandRenderer {
    config: FopCommandConfig,
}

impl FopCommandRenderer {
    pub fn new(config: FopCommandConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FopCommandConfig {
        &self.config
    }

    /// Check if fop can be started
    pub async fn is_available(&self) -> bool {
        let result = Command::new(&self.config.fop_path)
            .args(&self.config.base_args)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await;

        matches!(result, Ok(status) if status.success())
    }

    fn create_work_dir(&self) -> Result<TempDir, RenderError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("fop-work-");
        match &self.config.work_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(RenderError::WorkDir)
    }

    /// Run fop inside `dir` and return the produced PDF
    async fn run_in(&self, dir: &Path, xsl: &str, xml: &str) -> Result<Vec<u8>, RenderError> {
        let xsl_path = dir.join(STYLESHEET_FILE);
        let xml_path = dir.join(DATA_FILE);
        let pdf_path = dir.join(OUTPUT_FILE);
        let log_path = dir.join(LOG_FILE);

        tokio::fs::write(&xsl_path, xsl)
            .await
            .map_err(|source| RenderError::WriteInput { name: "xsl", source })?;
        tokio::fs::write(&xml_path, xml)
            .await
            .map_err(|source| RenderError::WriteInput { name: "xml", source })?;

        // stdout and stderr share one file so the log keeps fop's ordering
        let log = File::create(&log_path).map_err(|source| RenderError::WriteInput {
            name: "log",
            source,
        })?;
        let log_err = log.try_clone().map_err(|source| RenderError::WriteInput {
            name: "log",
            source,
        })?;

        let status = Command::new(&self.config.fop_path)
            .args(&self.config.base_args)
            .arg("-xml")
            .arg(&xml_path)
            .arg("-xsl")
            .arg(&xsl_path)
            .arg("-pdf")
            .arg(&pdf_path)
            .stdin(Stdio::null())
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(log_err))
            .kill_on_drop(true)
            .status()
            .await
            .map_err(RenderError::Spawn)?;

        if !status.success() {
            let output = tokio::fs::read(&log_path).await.unwrap_or_default();
            return Err(RenderError::CommandFailed {
                status,
                output: String::from_utf8_lossy(&output).trim_end().to_string(),
            });
        }

        tokio::fs::read(&pdf_path)
            .await
            .map_err(RenderError::ReadOutput)
    }
}

#[async_trait]
impl Renderer for FopCommandRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Command
    }

    async fn render(
        &self,
        ctx: &RenderContext,
        xsl: &str,
        xml: &str,
    ) -> Result<Vec<u8>, RenderError> {
        ctx.check()?;

        let budget = ctx
            .remaining()
            .map_or(self.config.max_run_time, |left| left.min(self.config.max_run_time));
        let ctx = ctx.child_with_timeout(budget);

        // Dropping the TempDir removes it, so an abandoned call still cleans up
        let work_dir = self.create_work_dir()?;
        tracing::debug!("Running fop in {}", work_dir.path().display());

        let result = ctx.run(self.run_in(work_dir.path(), xsl, xml)).await;

        let path = work_dir.path().to_path_buf();
        if let Err(e) = work_dir.close() {
            tracing::warn!("Failed to remove work dir {}: {}", path.display(), e);
        }

        result
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    /// Config that runs `script` through `sh` in place of fop
    fn fake_fop(scratch: &TempDir, script: &str) -> FopCommandConfig {
        let script_path = scratch.path().join("fake-fop.sh");
        std::fs::write(&script_path, script).unwrap();
        std::fs::set_permissions(&script_path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let work_root = scratch.path().join("work");
        std::fs::create_dir(&work_root).unwrap();

        FopCommandConfig {
            fop_path: "sh".to_string(),
            base_args: vec![script_path.display().to_string()],
            work_root: Some(work_root),
            max_run_time: MAX_RUN_TIME,
        }
    }

    fn work_dirs(config: &FopCommandConfig) -> usize {
        std::fs::read_dir(config.work_root.as_ref().unwrap())
            .unwrap()
            .count()
    }

    #[tokio::test]
    async fn test_successful_run_returns_output() {
        let scratch = TempDir::new().unwrap();
        // Arguments: -xml <xml> -xsl <xsl> -pdf <pdf>
        let config = fake_fop(&scratch, "cat \"$4\" \"$2\" > \"$6\"\n");
        let renderer = FopCommandRenderer::new(config.clone());

        let pdf = renderer
            .render(&RenderContext::new(), "<xsl/>", "<doc/>")
            .await
            .unwrap();

        assert_eq!(pdf, b"<xsl/><doc/>");
        assert_eq!(work_dirs(&config), 0);
    }

    #[tokio::test]
    async fn test_failure_includes_diagnostics_and_cleans_up() {
        let scratch = TempDir::new().unwrap();
        let config = fake_fop(
            &scratch,
            "echo 'SEVERE: invalid property'\necho 'stack trace' >&2\nexit 3\n",
        );
        let renderer = FopCommandRenderer::new(config.clone());

        let err = renderer
            .render(&RenderContext::new(), "<xsl/>", "<doc/>")
            .await
            .unwrap_err();

        match &err {
            RenderError::CommandFailed { status, output } => {
                assert_eq!(status.code(), Some(3));
                assert!(output.contains("SEVERE: invalid property"));
                assert!(output.contains("stack trace"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().starts_with("fop command failed:"));
        assert_eq!(work_dirs(&config), 0);
    }

    #[tokio::test]
    async fn test_missing_output_file() {
        let scratch = TempDir::new().unwrap();
        let config = fake_fop(&scratch, "exit 0\n");
        let renderer = FopCommandRenderer::new(config.clone());

        let err = renderer
            .render(&RenderContext::new(), "a", "b")
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::ReadOutput(_)));
        assert_eq!(work_dirs(&config), 0);
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let scratch = TempDir::new().unwrap();
        let mut config = fake_fop(&scratch, "");
        config.fop_path = scratch
            .path()
            .join("no-such-fop")
            .display()
            .to_string();
        let renderer = FopCommandRenderer::new(config.clone());

        let err = renderer
            .render(&RenderContext::new(), "a", "b")
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::Spawn(_)));
        assert!(!renderer.is_available().await);
        assert_eq!(work_dirs(&config), 0);
    }

    #[tokio::test]
    async fn test_cancellation_kills_process_and_cleans_up() {
        let scratch = TempDir::new().unwrap();
        let config = fake_fop(&scratch, "exec sleep 30\n");
        let renderer = FopCommandRenderer::new(config.clone());

        let ctx = RenderContext::new();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            canceller.cancel();
        });

        let started = std::time::Instant::now();
        let result = renderer.render(&ctx, "a", "b").await;

        assert!(matches!(result, Err(RenderError::Cancelled)));
        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(work_dirs(&config), 0);
    }

    #[tokio::test]
    async fn test_run_time_is_capped() {
        let scratch = TempDir::new().unwrap();
        let mut config = fake_fop(&scratch, "exec sleep 30\n");
        config.max_run_time = Duration::from_millis(100);
        let renderer = FopCommandRenderer::new(config.clone());

        let result = renderer
            .render(&RenderContext::with_timeout(Duration::from_secs(60)), "a", "b")
            .await;

        assert!(matches!(result, Err(RenderError::DeadlineExceeded)));
        assert_eq!(work_dirs(&config), 0);
    }

    #[tokio::test]
    async fn test_dropped_call_cleans_up() {
        let scratch = TempDir::new().unwrap();
        let config = fake_fop(&scratch, "exec sleep 30\n");
        let renderer = FopCommandRenderer::new(config.clone());

        let ctx = RenderContext::new();
        let abandoned = tokio::time::timeout(
            Duration::from_millis(100),
            renderer.render(&ctx, "a", "b"),
        )
        .await;

        assert!(abandoned.is_err());
        assert_eq!(work_dirs(&config), 0);
    }
}
