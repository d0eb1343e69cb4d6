use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::foundation::error::{TilerError, TilerResult};
use crate::tools::runner::ToolCommand;

/// Locations of the `ffmpeg` and `ffprobe` binaries.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MediaTools {
    /// `ffmpeg` executable (name looked up on `PATH`, or a full path).
    pub ffmpeg: PathBuf,
    /// `ffprobe` executable.
    pub ffprobe: PathBuf,
}

impl Default for MediaTools {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }
}

impl MediaTools {
    /// Tools looked up on `PATH`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an `ffmpeg` invocation with overwrite and quiet logging already set.
    pub(crate) fn ffmpeg_command(&self) -> ToolCommand {
        let mut cmd = ToolCommand::new(&self.ffmpeg);
        cmd.args(["-y", "-hide_banner", "-loglevel", "error"]);
        cmd
    }

    /// Return `true` when the configured `ffmpeg` can be invoked.
    pub fn ffmpeg_available(&self) -> bool {
        std::process::Command::new(&self.ffmpeg)
            .arg("-version")
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    MediaTools::default().ffmpeg_available()
}

/// Stream facts reported by `ffprobe` for a clip.
#[derive(Clone, Debug, PartialEq)]
pub struct ClipInfo {
    /// Coded width in pixels.
    pub width: u32,
    /// Coded height in pixels.
    pub height: u32,
    /// Container duration, when reported.
    pub duration_secs: Option<f64>,
    /// Video codec name (e.g. `vp9`, `h264`).
    pub codec_name: Option<String>,
}

impl ClipInfo {
    /// VP9 only keeps its alpha plane when decoded by `libvpx-vp9`.
    pub fn alpha_decoder(&self) -> Option<&'static str> {
        match self.codec_name.as_deref() {
            Some("vp9") => Some("libvpx-vp9"),
            Some("vp8") => Some("libvpx"),
            _ => None,
        }
    }
}

/// Probe `path` with `ffprobe`.
pub fn probe_clip(
    tools: &MediaTools,
    path: &Path,
    deadline: Option<Instant>,
) -> TilerResult<ClipInfo> {
    let mut cmd = ToolCommand::new(&tools.ffprobe);
    cmd.args([
        "-v",
        "error",
        "-select_streams",
        "v:0",
        "-print_format",
        "json",
        "-show_streams",
        "-show_format",
    ])
    .arg(path);
    let out = cmd.run(deadline)?;
    parse_probe_json(&out.stdout).map_err(|e| match e {
        TilerError::Conversion(msg) => {
            TilerError::conversion(format!("{msg} (probing '{}')", path.display()))
        }
        other => other,
    })
}

/// Parse `ffprobe -print_format json -show_streams -show_format` output.
pub fn parse_probe_json(bytes: &[u8]) -> TilerResult<ClipInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        codec_name: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        #[serde(default)]
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let parsed: ProbeOut = serde_json::from_slice(bytes)
        .map_err(|e| TilerError::conversion(format!("ffprobe json parse failed: {e}")))?;
    let stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref().is_none_or(|t| t == "video"))
        .ok_or_else(|| TilerError::conversion("no video stream found"))?;
    let (width, height) = match (stream.width, stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => {
            return Err(TilerError::conversion(
                "ffprobe reported no usable video dimensions",
            ));
        }
    };
    let duration_secs = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .or(stream.duration.as_deref())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0);

    Ok(ClipInfo {
        width,
        height,
        duration_secs,
        codec_name: stream.codec_name.clone(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/tools/ffmpeg.rs"]
mod tests;
