//! Reelforge assembles narrated slideshow videos.
//!
//! Given a narration track, an ordered list of still images and time-stamped
//! caption chunks, it renders a single continuous vertical video with
//! animated zoom/pan motion on every still, timed crossfades between scenes,
//! and burned-in stroke-outlined captions, then encodes it through the
//! system `ffmpeg`.
//!
//! The public API is request-oriented:
//!
//! - Describe the inputs with an [`AssemblyRequest`]
//! - Pick constants via [`AssemblyConfig`] (the default is the standard
//!   1080×1920 @ 30fps vertical short)
//! - Run [`assemble`], or [`assemble_with_sink`] to consume frames yourself
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod foundation;

pub(crate) mod audio;
pub(crate) mod captions;
mod config;
pub(crate) mod effects;
/// Encoding sinks.
pub mod encode;
pub(crate) mod engine;
pub(crate) mod scene;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, FrameRGBA, FrameRange};
pub use crate::foundation::error::{ReelError, ReelResult};

pub use crate::assets::fonts::{
    BuiltinFont, BuiltinFontProvider, FontProvider, ResolvedFont, SystemFontProvider,
};
pub use crate::assets::media::{
    AudioPcm, MIX_SAMPLE_RATE, decode_audio_f32_stereo, is_ffmpeg_on_path, is_ffprobe_on_path,
    probe_audio_duration,
};
pub use crate::audio::music::{MusicSelector, SeededSelector, scan_music_dir};
pub use crate::captions::render::CaptionChunk;
pub use crate::config::{AssemblyConfig, CaptionStyle, MusicMix};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::sink::{AudioInputConfig, FrameSink, InMemorySink, SinkConfig};
pub use crate::engine::assemble::{
    AssemblyOpts, AssemblyReport, AssemblyRequest, assemble, assemble_with_sink,
};
pub use crate::scene::ken_burns::CameraPath;
pub use crate::scene::timeline::{
    CompositionTimeline, SceneSlot, allocate_durations, build_timeline,
};
