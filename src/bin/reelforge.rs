use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "reelforge", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assemble the final video from a prepared output directory
    /// (requires `ffmpeg` and `ffprobe` on PATH).
    Assemble(AssembleArgs),
}

#[derive(Parser, Debug)]
struct AssembleArgs {
    /// Directory holding narration.mp3, image_<i>.png, timestamps.json and
    /// optionally script.json.
    #[arg(long = "in", default_value = "output")]
    in_dir: PathBuf,

    /// Output MP4 path. Defaults to final_video.mp4 inside the input dir.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Directory of background music tracks (.mp3/.wav); omit to disable
    /// music mixing.
    #[arg(long)]
    music_dir: Option<PathBuf>,

    /// Render worker thread count (defaults to all cores).
    #[arg(long)]
    threads: Option<usize>,

    /// Seed for deterministic background music selection.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Assemble(args) => cmd_assemble(args),
    }
}

fn cmd_assemble(args: AssembleArgs) -> anyhow::Result<()> {
    let audio_path = args.in_dir.join("narration.mp3");
    anyhow::ensure!(
        audio_path.exists(),
        "missing narration audio '{}'",
        audio_path.display()
    );

    let image_paths = collect_scene_images(&args.in_dir)?;
    anyhow::ensure!(
        !image_paths.is_empty(),
        "no image_<i>.png files found in '{}'",
        args.in_dir.display()
    );

    let captions = read_caption_chunks(&args.in_dir.join("timestamps.json"))?;
    let scene_timing = read_scene_timing(&args.in_dir.join("script.json"))?;

    let request = reelforge::AssemblyRequest {
        audio_path,
        image_paths,
        captions,
        scene_timing,
        music_dir: args.music_dir,
        output_path: args
            .out
            .unwrap_or_else(|| args.in_dir.join("final_video.mp4")),
    };

    let opts = reelforge::AssemblyOpts {
        threads: args.threads,
        music: Box::new(reelforge::SeededSelector::new(args.seed)),
        ..Default::default()
    };

    let report = reelforge::assemble(&request, &reelforge::AssemblyConfig::default(), &opts)?;

    eprintln!(
        "wrote {} ({:.1}s, {} frames, {} scenes, {} captions{})",
        request.output_path.display(),
        report.total_secs,
        report.frames_total,
        report.scenes_total,
        report.captions_scheduled,
        report
            .music_track
            .as_ref()
            .map(|t| format!(", music: {}", t.display()))
            .unwrap_or_default(),
    );
    Ok(())
}

/// Collect `image_<i>.png` files in index order, stopping at the first gap.
fn collect_scene_images(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    loop {
        let candidate = dir.join(format!("image_{}.png", images.len()));
        if !candidate.exists() {
            break;
        }
        images.push(candidate);
    }
    Ok(images)
}

fn read_caption_chunks(path: &Path) -> anyhow::Result<Vec<reelforge::CaptionChunk>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let f = File::open(path).with_context(|| format!("open '{}'", path.display()))?;
    let chunks: Vec<reelforge::CaptionChunk> = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parse caption chunks '{}'", path.display()))?;
    Ok(chunks)
}

/// Pull the optional `scene_timing` array out of the collaborator-owned
/// script metadata; every other field in there belongs to other tools.
fn read_scene_timing(path: &Path) -> anyhow::Result<Option<Vec<f64>>> {
    if !path.exists() {
        return Ok(None);
    }

    #[derive(serde::Deserialize)]
    struct Script {
        scene_timing: Option<Vec<f64>>,
    }

    let f = File::open(path).with_context(|| format!("open '{}'", path.display()))?;
    let script: Script = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parse script metadata '{}'", path.display()))?;
    Ok(script.scene_timing)
}
