use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context as _;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tilemoji::{
    Constraints, ConvertOpts, KeyingSpec, SourceAsset, TILE_SIDE, UserOverride, parse_hex_color,
};

#[derive(Parser, Debug)]
#[command(name = "tilemoji", version)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Cut an image or clip into tiles and write them with a manifest.
    Convert(ConvertArgs),
    /// Print the size resolution for a source size as JSON, without converting anything.
    Plan(PlanArgs),
}

#[derive(clap::Args, Debug)]
struct OverrideArgs {
    /// Output width in pixels.
    #[arg(long, conflicts_with = "cols")]
    width: Option<u32>,

    /// Output height in pixels.
    #[arg(long, conflicts_with = "rows")]
    height: Option<u32>,

    /// Output width in tiles.
    #[arg(long)]
    cols: Option<u32>,

    /// Output height in tiles.
    #[arg(long)]
    rows: Option<u32>,
}

impl OverrideArgs {
    fn to_override(&self) -> Option<UserOverride> {
        let tiles = UserOverride::tiles(self.cols, self.rows, TILE_SIDE);
        let o = UserOverride::new(self.width.or(tiles.width), self.height.or(tiles.height));
        (!o.is_empty()).then_some(o)
    }
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// Input image or clip.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Directory receiving the tiles and `manifest.json`.
    #[arg(long)]
    out_dir: PathBuf,

    #[command(flatten)]
    size: OverrideArgs,

    /// Background color to make transparent (`RRGGBB`, `#RRGGBB` or `0xRRGGBB`).
    #[arg(long)]
    key_color: Option<String>,

    /// Keying similarity, 0-100.
    #[arg(long, requires = "key_color")]
    similarity: Option<f32>,

    /// Keying edge blend, 0-100.
    #[arg(long, requires = "key_color")]
    blend: Option<f32>,

    /// Abort the conversion after this many seconds.
    #[arg(long)]
    timeout_secs: Option<f64>,

    /// Worker threads for per-tile work.
    #[arg(long)]
    threads: Option<usize>,

    /// JSON file with conversion options; flags override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// `ffmpeg` executable.
    #[arg(long)]
    ffmpeg: Option<PathBuf>,

    /// `ffprobe` executable.
    #[arg(long)]
    ffprobe: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Source size as `WIDTHxHEIGHT`.
    #[arg(long, value_parser = parse_size)]
    source: (u32, u32),

    #[command(flatten)]
    size: OverrideArgs,
}

const DEFAULT_SIMILARITY: f32 = 10.0;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Convert(args) => cmd_convert(args),
        Command::Plan(args) => cmd_plan(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tilemoji={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let axis = |v: &str| {
        v.trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid size '{s}': {e}"))
    };
    Ok((axis(w)?, axis(h)?))
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ConvertOpts> {
    let Some(path) = path else {
        return Ok(ConvertOpts::default());
    };
    let bytes = std::fs::read(path).with_context(|| format!("read config '{}'", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parse config '{}'", path.display()))
}

fn cmd_convert(args: ConvertArgs) -> anyhow::Result<()> {
    let mut opts = load_config(args.config.as_deref())?;
    if let Some(o) = args.size.to_override() {
        opts.user_override = Some(o);
    }
    if let Some(color) = &args.key_color {
        opts.keying = Some(KeyingSpec::new(
            parse_hex_color(color)?,
            args.similarity.unwrap_or(DEFAULT_SIMILARITY),
            args.blend.unwrap_or(0.0),
        )?);
    }
    if args.timeout_secs.is_some() {
        opts.timeout_secs = args.timeout_secs;
    }
    if args.threads.is_some() {
        opts.threads = args.threads;
    }
    if let Some(ffmpeg) = args.ffmpeg {
        opts.clip.tools.ffmpeg = ffmpeg;
    }
    if let Some(ffprobe) = args.ffprobe {
        opts.clip.tools.ffprobe = ffprobe;
    }
    opts.validate()?;

    let deadline = opts.timeout().map(|t| Instant::now() + t);
    let source = SourceAsset::open_with_deadline(&args.in_path, &opts.clip.tools, deadline)?;
    let result = tilemoji::convert(&source, &opts)?;
    let manifest = tilemoji::write_tiles(&result, &args.out_dir)?;

    eprintln!(
        "wrote {} tiles ({}x{}, {} bytes) to {}",
        manifest.tiles.len(),
        manifest.cols,
        manifest.rows,
        result.total_bytes(),
        args.out_dir.display()
    );
    Ok(())
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let (width, height) = args.source;
    let opts = ConvertOpts {
        user_override: args.size.to_override(),
        ..ConvertOpts::default()
    };
    let plan = tilemoji::plan(&Constraints::PLATFORM, width, height, &opts)?;
    let json = serde_json::to_string_pretty(&plan).context("serialize plan")?;
    println!("{json}");
    Ok(())
}
