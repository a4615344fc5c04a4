use std::path::{Path, PathBuf};

use crate::foundation::error::ReelResult;
use crate::foundation::math::Fnv1a64;

/// Strategy for picking one background track from the available set.
///
/// The pick must be pluggable and seedable so tests (and reproducible
/// builds) can pin the chosen track; the engine calls it exactly once per
/// assembly.
pub trait MusicSelector: Send + Sync {
    /// Choose one track from `tracks`, or `None` to disable music.
    fn select<'a>(&self, tracks: &'a [PathBuf]) -> Option<&'a PathBuf>;
}

/// Deterministic selector: hashes the seed with each candidate's file name
/// and picks the highest-scoring track. Stable across runs and platforms
/// for a fixed directory content.
#[derive(Clone, Copy, Debug)]
pub struct SeededSelector {
    seed: u64,
}

impl SeededSelector {
    /// Selector with an explicit seed.
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl Default for SeededSelector {
    fn default() -> Self {
        Self::new(0)
    }
}

impl MusicSelector for SeededSelector {
    fn select<'a>(&self, tracks: &'a [PathBuf]) -> Option<&'a PathBuf> {
        tracks.iter().max_by_key(|path| {
            let mut h = Fnv1a64::new(self.seed);
            let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
            h.write_bytes(name.as_bytes());
            h.finish()
        })
    }
}

/// List candidate music tracks (`.mp3`/`.wav`) in `dir`, sorted by name so
/// selection sees a stable order.
///
/// A missing or unreadable directory yields an empty list; music is an
/// optional garnish and must never fail the assembly.
pub fn scan_music_dir(dir: &Path) -> ReelResult<Vec<PathBuf>> {
    let mut tracks = Vec::new();
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return Ok(tracks),
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase());
        if matches!(ext.as_deref(), Some("mp3") | Some("wav")) {
            tracks.push(path);
        }
    }
    tracks.sort();
    Ok(tracks)
}
