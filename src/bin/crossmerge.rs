use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "crossmerge", version, args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    cmd: Option<Command>,

    #[command(flatten)]
    batch: BatchArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Merge every complete set found in a directory (the default).
    Batch(BatchArgs),
    /// Print the cross layout of one set as JSON, reading headers only.
    Layout(LayoutArgs),
}

#[derive(Parser, Debug)]
struct BatchArgs {
    /// Directory holding the `{base}_{o,r,le,be,te,re}.{ext}` inputs.
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// Output directory (default: `<dir>/merged_images`).
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Input and output file extension.
    #[arg(long)]
    ext: Option<String>,

    /// Write uncompressed pages instead of deflate.
    #[arg(long, default_value_t = false)]
    no_compress: bool,

    /// Process sets in parallel.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// JSON file with batch options; flags given on the command line take precedence.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct LayoutArgs {
    /// Base name of the set.
    base: String,

    /// Directory holding the inputs.
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// Input file extension.
    #[arg(long, default_value = "tif")]
    ext: String,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Some(Command::Batch(args)) => cmd_batch(args),
        Some(Command::Layout(args)) => cmd_layout(args),
        None => cmd_batch(cli.batch),
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("error"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_opts(path: &Path) -> anyhow::Result<crossmerge::BatchOpts> {
    let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
    let opts = serde_json::from_reader(BufReader::new(f)).with_context(|| "parse config JSON")?;
    Ok(opts)
}

fn cmd_batch(args: BatchArgs) -> anyhow::Result<()> {
    let mut opts = match &args.config {
        Some(path) => read_opts(path)?,
        None => crossmerge::BatchOpts::default(),
    };
    if let Some(ext) = args.ext {
        opts.ext = ext;
    }
    if let Some(out_dir) = args.out_dir {
        opts.out_dir = Some(out_dir);
    }
    if args.no_compress {
        opts.compression = crossmerge::PageCompression::Uncompressed;
    }
    if args.parallel {
        opts.parallel = true;
    }
    if args.threads.is_some() {
        opts.threads = args.threads;
    }
    opts.validate()?;

    let sink = crossmerge::TiffSink::new(opts.resolve_out_dir(&args.dir), opts.ext.clone())
        .with_compression(opts.compression);
    let report = crossmerge::run_batch_with(&args.dir, &opts, &sink, &|_, outcome| {
        if let Some(line) = outcome.diagnostic() {
            println!("{line}");
        }
    })?;

    eprintln!(
        "merged {}, skipped {}, failed {}",
        report.merged(),
        report.skipped(),
        report.failed()
    );
    Ok(())
}

fn cmd_layout(args: LayoutArgs) -> anyhow::Result<()> {
    let paths = crossmerge::PartPaths::new(&args.dir, &args.base, &args.ext);
    crossmerge::validate_part_paths(&paths)?;

    let sizes = crossmerge::RoleMap::try_from_fn(|role| {
        crossmerge::probe_part_file(paths.path(role)).map(|h| h.size)
    })?;
    let layout = crossmerge::resolve_cross_layout(&sizes)?;

    let placement: serde_json::Map<String, serde_json::Value> = crossmerge::Role::LAYER_ORDER
        .into_iter()
        .map(|role| {
            let off = layout.offset_for(role);
            (
                role.suffix().to_string(),
                serde_json::json!({ "x": off.x, "y": off.y }),
            )
        })
        .collect();
    let doc = serde_json::json!({
        "base": args.base,
        "cell": layout.cell,
        "canvas": layout.canvas,
        "placement": placement,
    });
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}
