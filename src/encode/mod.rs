//! Encoding sinks.

/// `ffmpeg`-backed frame sink and MP4 muxing.
pub mod ffmpeg;

/// Frame sink trait and in-memory sink.
pub mod sink;
