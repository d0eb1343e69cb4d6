use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;

use crate::assets::source::{ClipSource, SourceAsset};
use crate::backend::{Materialized, TileBackend, TileDescriptor, TileJob, collect_tiles};
use crate::effects::keying::KeyingSpec;
use crate::foundation::core::{AssetKind, Constraints, TileFormat};
use crate::foundation::error::{TilerError, TilerResult};
use crate::layout::grid::{TileCell, TileGrid};
use crate::layout::resolver::resolve_dimensions;
use crate::tools::ffmpeg::{MediaTools, probe_clip};
use crate::tools::runner::ToolCommand;

/// Encoder settings for animated tiles.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ClipEncodeOpts {
    /// `ffmpeg`/`ffprobe` locations.
    pub tools: MediaTools,
    /// Constant rate factor, `0..=63`.
    pub crf: u8,
    /// Tile video encoder.
    pub codec: String,
    /// Tile pixel format. Must carry alpha for transparent padding to survive.
    pub pix_fmt: String,
    /// Optional `title` metadata written into every tile.
    pub title: Option<String>,
    /// Optional cap on tile duration, in seconds.
    pub trim_secs: Option<f64>,
    /// Parent directory for the per-conversion working directory. System temp dir when unset.
    pub workdir_root: Option<PathBuf>,
}

impl Default for ClipEncodeOpts {
    fn default() -> Self {
        Self {
            tools: MediaTools::default(),
            crf: 40,
            codec: "libvpx-vp9".to_string(),
            pix_fmt: "yuva420p".to_string(),
            title: None,
            trim_secs: None,
            workdir_root: None,
        }
    }
}

impl ClipEncodeOpts {
    /// Validate encoder settings.
    pub fn validate(&self) -> TilerResult<()> {
        if self.crf > 63 {
            return Err(TilerError::validation(format!(
                "crf must be in 0..=63, got {}",
                self.crf
            )));
        }
        if self.codec.trim().is_empty() || self.pix_fmt.trim().is_empty() {
            return Err(TilerError::validation(
                "clip codec and pixel format must be non-empty",
            ));
        }
        if let Some(t) = self.trim_secs
            && (!t.is_finite() || t <= 0.0)
        {
            return Err(TilerError::validation(format!(
                "trim_secs must be finite and > 0, got {t}"
            )));
        }
        Ok(())
    }
}

/// Current intermediate in the working directory.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Stage {
    pub(crate) path: PathBuf,
    pub(crate) width: u32,
    pub(crate) height: u32,
    /// Decoder forced before `-i`, for codecs whose alpha plane the default decoder drops.
    pub(crate) decoder: Option<&'static str>,
}

/// `ffmpeg`-driven backend for animated sources.
///
/// Every conversion gets its own scoped working directory. The source is copied in, keyed and
/// resized through lossless RGBA intermediates, and each grid cell is cropped into its own
/// transparent-padded WebM. The directory is removed on every exit path.
#[derive(Clone, Debug, Default)]
pub struct ClipBackend {
    opts: ClipEncodeOpts,
}

impl ClipBackend {
    /// Backend with the given encoder settings.
    pub fn new(opts: ClipEncodeOpts) -> Self {
        Self { opts }
    }

    fn workdir(&self) -> TilerResult<tempfile::TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("tilemoji-");
        let dir = match &self.opts.workdir_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        };
        dir.map_err(|e| TilerError::conversion(format!("failed to create working directory: {e}")))
    }

    fn run_pipeline(
        &self,
        src: &ClipSource,
        job: &TileJob<'_>,
        workdir: &Path,
    ) -> TilerResult<Materialized> {
        let ext = src
            .path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("bin");
        let copied = workdir.join(format!("source.{ext}"));
        std::fs::copy(&src.path, &copied).map_err(|e| {
            TilerError::conversion(format!(
                "failed to copy '{}' into working directory: {e}",
                src.path.display()
            ))
        })?;

        let mut stage = Stage {
            path: copied,
            width: src.info.width,
            height: src.info.height,
            decoder: src.info.alpha_decoder(),
        };
        let mut pass = 0usize;

        if let Some(spec) = job.keying {
            let out = intermediate_path(workdir, &mut pass);
            keying_command(&self.opts.tools, &stage, spec, &out).run(job.deadline)?;
            stage = Stage {
                path: out,
                decoder: None,
                ..stage
            };
        }

        for step in &job.resolved.steps {
            stage = self.scale(&stage, step.width, step.height, workdir, &mut pass, job)?;
            if (stage.width, stage.height) != (step.width, step.height) {
                tracing::debug!(
                    requested_width = step.width,
                    requested_height = step.height,
                    width = stage.width,
                    height = stage.height,
                    reason = ?step.reason,
                    "scaler produced a different size"
                );
            }
        }

        if exceeds_tile_cap(job.constraints, &stage) {
            let corrected = resolve_dimensions(job.constraints, stage.width, stage.height, None)?;
            tracing::warn!(
                width = stage.width,
                height = stage.height,
                corrected_width = corrected.width,
                corrected_height = corrected.height,
                "achieved size breaks the tile cap, rescaling"
            );
            stage = self.scale(
                &stage,
                corrected.width,
                corrected.height,
                workdir,
                &mut pass,
                job,
            )?;
            if exceeds_tile_cap(job.constraints, &stage) {
                return Err(TilerError::conversion(format!(
                    "scaled clip is {}x{} and still needs {} tiles (max {})",
                    stage.width,
                    stage.height,
                    job.constraints.tile_count(stage.width, stage.height),
                    job.constraints.max_tiles
                )));
            }
        }

        let grid = TileGrid::with_side(stage.width, stage.height, job.constraints.tile_side);
        let cells: Vec<TileCell> = grid.cells().collect();
        let side = grid.side;
        let encoded = job.pool.install(|| {
            cells
                .par_iter()
                .map(|cell| self.encode_cell(&stage, cell, side, workdir, job.deadline))
                .collect::<Vec<_>>()
        });
        let tiles = collect_tiles(encoded)?;

        Ok(Materialized { grid, tiles })
    }

    fn scale(
        &self,
        stage: &Stage,
        width: u32,
        height: u32,
        workdir: &Path,
        pass: &mut usize,
        job: &TileJob<'_>,
    ) -> TilerResult<Stage> {
        let out = intermediate_path(workdir, pass);
        scale_command(&self.opts.tools, stage, width, height, &out).run(job.deadline)?;
        let info = probe_clip(&self.opts.tools, &out, job.deadline)?;
        Ok(Stage {
            path: out,
            width: info.width,
            height: info.height,
            decoder: None,
        })
    }

    fn encode_cell(
        &self,
        stage: &Stage,
        cell: &TileCell,
        side: u32,
        workdir: &Path,
        deadline: Option<Instant>,
    ) -> TilerResult<TileDescriptor> {
        let out = workdir.join(format!("{}.{}", cell.file_stem(), TileFormat::Webm.extension()));
        tile_command(&self.opts, stage, cell, side, &out).run(deadline)?;
        let bytes = std::fs::read(&out).map_err(|e| {
            TilerError::conversion(format!(
                "failed to read tile ({}, {}) from '{}': {e}",
                cell.row,
                cell.col,
                out.display()
            ))
        })?;
        Ok(TileDescriptor {
            row: cell.row,
            col: cell.col,
            format: TileFormat::Webm,
            bytes,
        })
    }
}

impl TileBackend for ClipBackend {
    fn kind(&self) -> AssetKind {
        AssetKind::Clip
    }

    fn format(&self) -> TileFormat {
        TileFormat::Webm
    }

    #[tracing::instrument(level = "debug", skip_all, fields(width = job.resolved.width, height = job.resolved.height))]
    fn materialize(&self, source: &SourceAsset, job: &TileJob<'_>) -> TilerResult<Materialized> {
        let SourceAsset::Clip(src) = source else {
            return Err(TilerError::validation("clip backend needs a clip source"));
        };
        self.opts.validate()?;

        let workdir = self.workdir()?;
        let result = self.run_pipeline(src, job, workdir.path());
        let dir = workdir.path().to_path_buf();
        if let Err(e) = workdir.close() {
            tracing::warn!(path = %dir.display(), error = %e, "failed to remove working directory");
        }
        result
    }
}

fn exceeds_tile_cap(constraints: &Constraints, stage: &Stage) -> bool {
    constraints.exceeds_tile_cap(stage.width, stage.height)
}

fn intermediate_path(workdir: &Path, pass: &mut usize) -> PathBuf {
    *pass += 1;
    workdir.join(format!("stage{pass}.mov"))
}

fn push_input(cmd: &mut ToolCommand, stage: &Stage) {
    if let Some(decoder) = stage.decoder {
        cmd.args(["-c:v", decoder]);
    }
    cmd.arg("-i").arg(&stage.path);
}

/// Lossless RGBA intermediate; alpha and frame timing survive every pass.
fn push_intermediate_output(cmd: &mut ToolCommand, out: &Path) {
    cmd.args(["-an", "-c:v", "png", "-pix_fmt", "rgba"]).arg(out);
}

pub(crate) fn keying_command(
    tools: &MediaTools,
    stage: &Stage,
    spec: &KeyingSpec,
    out: &Path,
) -> ToolCommand {
    let mut cmd = tools.ffmpeg_command();
    push_input(&mut cmd, stage);
    cmd.arg("-vf")
        .arg(format!("format=rgba,{}", spec.colorkey_filter()));
    push_intermediate_output(&mut cmd, out);
    cmd
}

pub(crate) fn scale_command(
    tools: &MediaTools,
    stage: &Stage,
    width: u32,
    height: u32,
    out: &Path,
) -> ToolCommand {
    let mut cmd = tools.ffmpeg_command();
    push_input(&mut cmd, stage);
    cmd.arg("-vf")
        .arg(format!("format=rgba,scale={width}:{height}:flags=lanczos"));
    push_intermediate_output(&mut cmd, out);
    cmd
}

pub(crate) fn tile_command(
    opts: &ClipEncodeOpts,
    stage: &Stage,
    cell: &TileCell,
    side: u32,
    out: &Path,
) -> ToolCommand {
    let mut cmd = opts.tools.ffmpeg_command();
    push_input(&mut cmd, stage);
    cmd.arg("-vf").arg(format!(
        "format=rgba,crop={}:{}:{}:{},pad={side}:{side}:0:0:color=black@0",
        cell.visible_width, cell.visible_height, cell.x, cell.y
    ));
    if let Some(t) = opts.trim_secs {
        cmd.arg("-t").arg(format!("{t:.3}"));
    }
    cmd.arg("-an")
        .args(["-c:v", opts.codec.as_str()])
        .args(["-crf", &opts.crf.to_string()])
        .args(["-b:v", "0"])
        .args(["-pix_fmt", opts.pix_fmt.as_str()]);
    if let Some(title) = &opts.title {
        cmd.arg("-metadata").arg(format!("title={title}"));
    }
    cmd.arg(out);
    cmd
}

#[cfg(test)]
#[path = "../../tests/unit/backend/clip.rs"]
mod tests;
