use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use webp_optimizer::config;
use webp_optimizer::imaging::FitMode;
use webp_optimizer::output;
use webp_optimizer::server::{self, AppState};
use webp_optimizer::types::{OptionsPatch, ProcessingStatus};
use webp_optimizer::workflow::{
    HttpTransport, ImageProcessor, LocalTransport, MemoryPreviews, SelectedFile, Transport,
};

/// Resize and quality flags for `process`.
#[derive(clap::Args, Clone)]
struct ProcessArgs {
    /// Image to convert (jpeg, png, gif, webp, svg, bmp, tiff)
    input: PathBuf,

    /// Target width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Target height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Scale both sides to this percentage of the original (1-100)
    #[arg(long, conflicts_with_all = ["width", "height"])]
    percent: Option<u32>,

    /// How the image fits the box: contain, cover, fill, inside, outside
    #[arg(long)]
    fit: Option<FitMode>,

    /// WebP quality (1-100)
    #[arg(long)]
    quality: Option<u32>,

    /// Do not keep the aspect ratio when both sides are given (stretches to fill)
    #[arg(long)]
    no_aspect: bool,

    /// Directory the WebP is written to
    #[arg(long, default_value = ".")]
    output: PathBuf,

    /// Send the upload to a running server instead of processing in-process
    #[arg(long)]
    server: Option<String>,
}

#[derive(Parser)]
#[command(name = "webp-optimizer")]
#[command(about = "Convert images to metadata-free, resized WebP")]
#[command(long_about = "\
Convert images to metadata-free, resized WebP

Run as a service with 'serve', which exposes

  POST /process-image       multipart: file + width, height,
  POST /api/process-image   maintainAspectRatio, fit, quality

or convert a single file with 'process'. Accepted inputs: JPEG, PNG, GIF,
WebP, SVG, BMP, TIFF. EXIF, ICC, IPTC and XMP metadata are always removed.

Run 'webp-optimizer gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Config file (optional; stock defaults apply when missing)
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP endpoint until Ctrl-C
    Serve {
        /// Listen address, overrides server.bind
        #[arg(long)]
        bind: Option<String>,
    },
    /// Convert one image: select, apply options, process, download
    Process(ProcessArgs),
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { bind } => {
            let mut service_config = config::load_config(&cli.config)?;
            if let Some(bind) = bind {
                service_config.server.bind = bind;
                service_config.validate()?;
            }
            server::serve(service_config).await?;
        }
        Command::Process(args) => {
            let service_config = config::load_config(&cli.config)?;
            match args.server.clone() {
                Some(url) => {
                    let transport = HttpTransport::new(&url);
                    run_process(transport, args).await?;
                }
                None => {
                    let transport = LocalTransport::new(AppState::new(service_config));
                    run_process(transport, args).await?;
                }
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Drive the workflow once, end to end.
async fn run_process<T: Transport>(
    transport: T,
    args: ProcessArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut processor = ImageProcessor::new(transport, MemoryPreviews::new());
    let file = SelectedFile::from_path(&args.input).await?;
    let name = file.name.clone();

    processor.select_file(file);
    if processor.status() == ProcessingStatus::Error {
        let message = processor.error().unwrap_or_default().to_string();
        output::print_failure(&name, &message);
        return Err(message.into());
    }

    let lock = !args.no_aspect;
    processor.update_options(&OptionsPatch::default().maintain_aspect_ratio(lock))?;
    if let Some(percent) = args.percent {
        processor.set_percentage(percent)?;
    } else {
        let options = *processor.options();
        let controls = processor.controls();
        let size_patch = match (args.width, args.height) {
            (Some(w), Some(h)) => Some(OptionsPatch::default().dimensions(Some(w), Some(h))),
            (Some(w), None) => Some(controls.set_width(&options, Some(w))),
            (None, Some(h)) => Some(controls.set_height(&options, Some(h))),
            (None, None) => None,
        };
        if let Some(patch) = size_patch {
            processor.update_options(&patch)?;
        }
    }
    let mut patch = OptionsPatch::default();
    patch.fit = args.fit;
    patch.quality = args.quality;
    processor.update_options(&patch)?;

    if let Err(e) = processor.process().await {
        output::print_failure(&name, &e.message);
        return Err(e.into());
    }

    tokio::fs::create_dir_all(&args.output).await?;
    let written = processor.download_to(&args.output).await?;

    if let (Some(original), Some(processed), Some(stats)) = (
        processor.original_metadata(),
        processor.processed(),
        processor.compression_stats(),
    ) {
        output::print_process_output(
            &name,
            original,
            &processed.metadata,
            &stats,
            written.as_deref(),
        );
    }
    Ok(())
}
