//! adsnap: command-line client for the Bria image API.
//!
//! Each command runs one tracked operation and prints a dashboard of the
//! calls it made. Point `--journal` (or `ADSNAP_JOURNAL`) at a file to
//! keep records across runs; `adsnap dashboard` summarises that file.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use adsnap::{
    AddShadowRequest, AspectRatio, CallJournal, Config, DashboardReport, EnhancePromptRequest,
    EraseForegroundRequest, GenerateImageRequest, GenerativeFillRequest, GeneratedImages,
    ImageOutput, ImageUpload, LifestyleShotRequest, PackshotRequest, Placement, Session,
};

/// Tracked client for the Bria image-generation API
#[derive(Parser)]
#[command(name = "adsnap")]
#[command(version = adsnap::version::PKG_VERSION)]
#[command(about = "Generate and edit ad images with per-call metrics")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Append call records to this JSON-lines file.
    #[arg(long, global = true, env = "ADSNAP_JOURNAL")]
    journal: Option<PathBuf>,

    /// Print the dashboard as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Save result images into this directory instead of printing URLs.
    #[arg(short, long, global = true)]
    out: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(flatten)]
    Api(ApiCommand),

    /// Check an upload against the configured limits without calling the API
    Validate { image: PathBuf },

    /// Summarise the calls recorded in the journal
    Dashboard,
}

/// Commands that make tracked API calls.
#[derive(Subcommand)]
enum ApiCommand {
    /// Generate images from a text prompt
    Generate {
        prompt: String,
        #[arg(long, default_value_t = 512)]
        width: i32,
        #[arg(long, default_value_t = 512)]
        height: i32,
        #[arg(long, default_value_t = 20)]
        steps: i32,
        #[arg(long, default_value_t = 7.5)]
        guidance: f64,
        #[arg(short, long, default_value_t = 1)]
        num_results: i32,
        #[arg(long)]
        seed: Option<i64>,
        #[arg(long)]
        negative: Option<String>,
        /// 1:1, 16:9, 9:16, 4:3 or 3:4
        #[arg(long, default_value = "1:1")]
        aspect_ratio: AspectRatio,
    },

    /// Rewrite a prompt into a more detailed one
    Enhance { prompt: String },

    /// Place a product image into a described scene
    Lifestyle {
        image: PathBuf,
        scene: String,
        #[arg(long, default_value = "automatic")]
        placement: Placement,
        #[arg(short, long, default_value_t = 4)]
        num_results: i32,
    },

    /// Repaint the masked region of an image
    Fill {
        image: PathBuf,
        mask: PathBuf,
        prompt: String,
        #[arg(long)]
        negative: Option<String>,
        #[arg(short, long, default_value_t = 2)]
        num_results: i32,
        #[arg(long)]
        seed: Option<i64>,
    },

    /// Remove the foreground subject
    Erase { image: PathBuf },

    /// Add a drop shadow under a product
    Shadow {
        image: PathBuf,
        #[arg(long, default_value_t = 0.5)]
        intensity: f64,
        #[arg(long, default_value_t = 10)]
        blur: i32,
    },

    /// Cut out a product onto a plain background
    Packshot {
        image: PathBuf,
        #[arg(long, default_value = "#FFFFFF")]
        background: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    if args.journal.is_some() {
        config.journal = args.journal.clone();
    }

    let command = match args.command {
        Command::Api(command) => command,
        Command::Validate { image } => {
            let upload = ImageUpload::from_path(&image)?;
            adsnap::validate(Some(&upload), &config.constraints())?;
            println!(
                "{}: ok ({}, {} bytes)",
                image.display(),
                upload.media_type,
                upload.size()
            );
            return Ok(());
        }
        Command::Dashboard => {
            let path = config
                .journal
                .as_deref()
                .ok_or("dashboard: no journal configured (use --journal or ADSNAP_JOURNAL)")?;
            let records = CallJournal::read_all(path)?;
            print_dashboard(&DashboardReport::from_records(&records), args.json)?;
            return Ok(());
        }
    };

    if !config.has_api_key() {
        warn!("BRIA_API_KEY is not set; API calls will fail");
    }

    let session = Session::from_config(&config)?;
    info!(version = adsnap::version_string(), gateway = session.gateway_name(), "adsnap starting");

    let outcome = run(&session, command, args.out.as_deref()).await;

    print_dashboard(&session.dashboard(), args.json)?;
    outcome
}

async fn run(
    session: &Session,
    command: ApiCommand,
    out: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let images = match command {
        ApiCommand::Generate {
            prompt,
            width,
            height,
            steps,
            guidance,
            num_results,
            seed,
            negative,
            aspect_ratio,
        } => {
            let mut request = GenerateImageRequest::new(prompt)
                .width(width)
                .height(height)
                .steps(steps)
                .guidance_scale(guidance)
                .num_results(num_results)
                .aspect_ratio(aspect_ratio);
            if let Some(seed) = seed {
                request = request.seed(seed);
            }
            if let Some(negative) = negative {
                request = request.negative_prompt(negative);
            }
            session.generate_image(&request).await?
        }

        ApiCommand::Enhance { prompt } => {
            let enhanced = session
                .enhance_prompt(&EnhancePromptRequest::new(prompt))
                .await?;
            println!("{enhanced}");
            return Ok(());
        }

        ApiCommand::Lifestyle {
            image,
            scene,
            placement,
            num_results,
        } => {
            let request = LifestyleShotRequest::new(ImageUpload::from_path(image)?, scene)
                .placement(placement)
                .num_results(num_results);
            session.lifestyle_shot(&request).await?
        }

        ApiCommand::Fill {
            image,
            mask,
            prompt,
            negative,
            num_results,
            seed,
        } => {
            let mut request = GenerativeFillRequest::new(
                ImageUpload::from_path(image)?,
                ImageUpload::from_path(mask)?,
                prompt,
            )
            .num_results(num_results);
            if let Some(seed) = seed {
                request = request.seed(seed);
            }
            if let Some(negative) = negative {
                request = request.negative_prompt(negative);
            }
            session.generative_fill(&request).await?
        }

        ApiCommand::Erase { image } => {
            let request = EraseForegroundRequest::new(ImageUpload::from_path(image)?);
            session.erase_foreground(&request).await?
        }

        ApiCommand::Shadow {
            image,
            intensity,
            blur,
        } => {
            let request = AddShadowRequest::new(ImageUpload::from_path(image)?)
                .intensity(intensity)
                .blur(blur);
            session.add_shadow(&request).await?
        }

        ApiCommand::Packshot { image, background } => {
            let request =
                PackshotRequest::new(ImageUpload::from_path(image)?).background_color(background);
            session.create_packshot(&request).await?
        }
    };

    emit_images(session, &images, out).await
}

/// Print URLs, or write every image into `out`.
async fn emit_images(
    session: &Session,
    images: &GeneratedImages,
    out: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(dir) = out else {
        for (i, image) in images.images.iter().enumerate() {
            match image {
                ImageOutput::Url(url) => println!("{url}"),
                ImageOutput::Bytes(bytes) => {
                    println!("image {}: {} bytes inline (use --out to save)", i + 1, bytes.len())
                }
            }
        }
        return Ok(());
    };

    std::fs::create_dir_all(dir)?;
    for (i, image) in images.images.iter().enumerate() {
        let bytes = match image {
            ImageOutput::Url(url) => session.download(url).await?,
            ImageOutput::Bytes(bytes) => bytes.clone(),
        };
        let path = dir.join(format!("adsnap_{}.png", i + 1));
        std::fs::write(&path, bytes)?;
        println!("{}", path.display());
    }
    Ok(())
}

fn print_dashboard(report: &DashboardReport, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        eprintln!();
        eprint!("{report}");
    }
    Ok(())
}
