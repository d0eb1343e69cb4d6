//! External media tools (`ffmpeg`, `ffprobe`) and the process runner that drives them.

/// `ffmpeg`/`ffprobe` locations and clip probing.
pub mod ffmpeg;
/// Deadline-aware process execution with captured output.
pub mod runner;
