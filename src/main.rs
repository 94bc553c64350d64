use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use trisplit::archive::Packager;
use trisplit::config::{self, SplitConfig};
use trisplit::imaging::{ImageBackend, RustBackend, SourceImage, calculate_segments};
use trisplit::naming::report_filename;
use trisplit::report::SplitReport;
use trisplit::session::{Session, SessionSettings, SplitRun};
use trisplit::types::Mode;
use trisplit::{output, session};

/// Shared flags for commands that encode segments.
#[derive(clap::Args, Clone)]
struct EncodeArgs {
    /// Encode lossless PNG instead of high quality JPEG
    #[arg(long)]
    png: bool,

    /// Encode high quality JPEG even when output.png is set
    #[arg(long, conflicts_with = "png")]
    jpeg: bool,

    /// Write a JSON report next to the delivery
    #[arg(long)]
    report: bool,
}

impl EncodeArgs {
    /// The encoding asked for on the command line, if any.
    fn png_override(&self) -> Option<bool> {
        match (self.png, self.jpeg) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

#[derive(Parser)]
#[command(name = "trisplit")]
#[command(about = "Split an image into three panels for a tri-panel grid")]
#[command(long_about = "\
Split an image into three panels for a tri-panel grid

The image is cut into three equal-width columns (the last one takes the
remainder) and every column is re-framed the same way:

  free    the column as-is
  grid    1080x1440 (3:4), centred crop scaled to fit
  square  centred square, side = min(column width, height)

Segments are named 1, 2, 3 from left to right and bundled into
FarGonE_3split_<mode>.zip (FarGonE_3split_<mode>_PNG.zip with --png).
If the archive can't be written the three files are saved individually.

Run 'trisplit gen-config' to generate a documented trisplit.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./trisplit.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output directory (overrides output.directory)
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Split an image in one mode and package the segments
    Split {
        /// Source image
        image: PathBuf,
        /// Re-framing mode (default: output.default_mode)
        #[arg(long, value_enum)]
        mode: Option<Mode>,
        #[command(flatten)]
        encode: EncodeArgs,
    },
    /// Split an image in every mode, one archive per mode
    All {
        /// Source image
        image: PathBuf,
        #[command(flatten)]
        encode: EncodeArgs,
    },
    /// Print segment geometry without encoding
    Plan {
        /// Source image
        image: PathBuf,
        /// Re-framing mode (default: output.default_mode)
        #[arg(long, value_enum)]
        mode: Option<Mode>,
    },
    /// Print a stock trisplit.toml with all options documented
    GenConfig,
}

/// Config and collaborators shared by the image commands.
struct Context {
    config: SplitConfig,
    output_dir: PathBuf,
    backend: Arc<RustBackend>,
}

impl Context {
    fn load(cli: &Cli) -> Result<Self, config::ConfigError> {
        let config = config::load_config(cli.config.as_deref())?;
        let output_dir = cli
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.output.directory));
        Ok(Self {
            config,
            output_dir,
            backend: Arc::new(RustBackend::new()),
        })
    }

    fn settings(&self, mode: Option<Mode>, encode: &EncodeArgs) -> SessionSettings {
        let mut settings = self.config.session_settings();
        settings.mode = mode.unwrap_or(settings.mode);
        settings.png = encode.png_override().unwrap_or(settings.png);
        settings
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    match &cli.command {
        Command::Split {
            image,
            mode,
            encode,
        } => {
            let ctx = Context::load(cli)?;
            init_thread_pool(&ctx.config.processing);
            let source = ctx.backend.load(image)?;
            let run = run_split(&ctx.backend, ctx.settings(*mode, encode), source)?;
            deliver(&ctx, &run, encode.report)?;
        }
        Command::All { image, encode } => {
            let ctx = Context::load(cli)?;
            init_thread_pool(&ctx.config.processing);
            let source = ctx.backend.load(image)?;
            for mode in Mode::ALL {
                let settings = ctx.settings(Some(mode), encode);
                let run = run_split(&ctx.backend, settings, source.clone())?;
                deliver(&ctx, &run, encode.report)?;
            }
        }
        Command::Plan { image, mode } => {
            let ctx = Context::load(cli)?;
            let dims = ctx.backend.identify(image)?;
            let mode = mode.unwrap_or(ctx.config.output.default_mode);
            let specs = calculate_segments(dims, mode, ctx.config.grid.short_source)?;
            output::print_plan(mode, dims, &specs);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Run one split to completion, printing progress as segments finish.
fn run_split(
    backend: &Arc<RustBackend>,
    settings: SessionSettings,
    source: SourceImage,
) -> Result<SplitRun, Box<dyn std::error::Error>> {
    let (tx, rx) = std::sync::mpsc::channel::<session::SplitEvent>();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_split_event(&event) {
                println!("{}", line);
            }
        }
    });

    let mut session = Session::new(Arc::clone(backend), settings).with_events(tx);
    session.load(source)?;
    let run = session.wait()?.clone();
    // Dropping the session closes the event channel so the printer finishes.
    drop(session);
    printer.join().map_err(|_| "progress printer panicked")?;
    Ok(run)
}

/// Package a finalized run into the output directory, optionally with a report.
fn deliver(ctx: &Context, run: &SplitRun, with_report: bool) -> Result<(), Box<dyn std::error::Error>> {
    let dir = ctx.output_dir.as_path();
    let packager = Packager::zip(
        &ctx.config.output.archive_prefix,
        ctx.config.archive.compression,
    );
    let archive_name = packager.archive_name(run);
    let delivery = packager.package(run);
    let paths = delivery.write_to(dir)?;
    output::print_delivery(&delivery, &paths);

    if with_report {
        let archived = (!delivery.is_fallback()).then_some(archive_name.as_str());
        let path = dir.join(report_filename(&archive_name));
        SplitReport::new(run, archived).write(&path)?;
        println!("Report \u{2192} {}", path.display());
    }
    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
