use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use stegolab::cli::{
    analyze_image, embed_into_image, export_bit_planes, extract_from_image, format_embed_metrics,
    show_capacity, AnalyzeOptions, ConfigOverrides, ExtractOptions,
};
use stegolab::config::{BitDepth, ChannelSet};
use stegolab::error::{Result, StegoError};
use stegolab::logger;

/// Version info from build.rs
const VERSION: &str = env!("STEGOLAB_VERSION");
const PROFILE: &str = env!("STEGOLAB_PROFILE");
const GIT_HASH: &str = env!("STEGOLAB_GIT_HASH");

fn get_version() -> &'static str {
    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();
    VERSION_STRING.get_or_init(|| format!("{} {} ({})", PROFILE, VERSION, GIT_HASH))
}

#[derive(Parser)]
#[command(name = "stegolab")]
#[command(author, about = "LSB image steganography and steganalysis", long_about = None)]
struct Cli {
    /// Print version
    #[arg(short = 'V', long)]
    version: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Options both sides of an embed/extract pair must agree on
#[derive(Args)]
struct ConfigArgs {
    /// JSON config file; flags given alongside override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Low bits used per sample (1 or 2)
    #[arg(long, value_parser = parse_bits)]
    bits: Option<BitDepth>,

    /// Channels to use: "auto", "all", or a list such as "red,blue"
    #[arg(long, value_parser = parse_channels)]
    channels: Option<ChannelSet>,

    /// Password seeding the slot permutation (and the key with --encrypt)
    #[arg(long)]
    password: Option<String>,

    /// Encrypt the payload; needs --password
    #[arg(long)]
    encrypt: bool,
}

impl From<ConfigArgs> for ConfigOverrides {
    fn from(args: ConfigArgs) -> Self {
        Self {
            config_file: args.config,
            bit_depth: args.bits,
            channels: args.channels,
            password: args.password,
            encrypt: args.encrypt,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Hide a payload in a PNG or BMP carrier
    #[command(alias = "e")]
    Embed {
        /// CARRIER [PAYLOAD] OUTPUT; PAYLOAD is omitted when --text is given
        #[arg(num_args = 2..=3, required = true, value_names = ["CARRIER", "PAYLOAD", "OUTPUT"])]
        paths: Vec<PathBuf>,

        /// Embed this text instead of a payload file
        #[arg(long)]
        text: Option<String>,

        /// Print metrics as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        settings: ConfigArgs,
    },

    /// Recover a payload from a stego image
    #[command(alias = "x")]
    Extract {
        /// Stego image
        input: PathBuf,

        /// Write the payload to this file instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        settings: ConfigArgs,
    },

    /// Estimate whether an image carries LSB-embedded data
    #[command(alias = "a")]
    Analyze {
        /// Image to analyze
        image: PathBuf,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show how many bytes an image can carry per configuration
    #[command(alias = "c")]
    Capacity {
        /// Carrier image
        image: PathBuf,
    },

    /// Export each channel's bit planes as greyscale PNGs
    #[command(alias = "p")]
    Planes {
        /// Source image
        image: PathBuf,

        /// Directory for the plane images
        out_dir: PathBuf,
    },
}

fn parse_bits(s: &str) -> std::result::Result<BitDepth, String> {
    s.parse().map_err(|e| format!("{}", e))
}

fn parse_channels(s: &str) -> std::result::Result<ChannelSet, String> {
    s.parse().map_err(|e| format!("{}", e))
}

fn run_embed(
    paths: Vec<PathBuf>,
    text: Option<String>,
    json: bool,
    settings: ConfigArgs,
) -> Result<()> {
    let config = ConfigOverrides::from(settings).resolve()?;
    let (carrier, payload, output) = match (text, paths.as_slice()) {
        (Some(text), [carrier, output]) => (carrier, text.into_bytes(), output),
        (None, [carrier, payload, output]) => (carrier, std::fs::read(payload)?, output),
        (Some(_), _) => {
            return Err(StegoError::InvalidConfig(
                "with --text, give only CARRIER and OUTPUT".into(),
            ))
        }
        (None, _) => {
            return Err(StegoError::InvalidConfig(
                "expected CARRIER PAYLOAD OUTPUT (or --text)".into(),
            ))
        }
    };

    let metrics = embed_into_image(carrier, &payload, output, &config)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&metrics)?);
    } else {
        print!("{}", format_embed_metrics(output, &metrics));
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.version {
        println!("stegolab {}", get_version());
        return ExitCode::SUCCESS;
    }

    let command = match cli.command {
        Some(cmd) => cmd,
        None => {
            use clap::CommandFactory;
            if let Err(e) = Cli::command().print_help() {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
            println!();
            return ExitCode::SUCCESS;
        }
    };

    logger::init();

    let result = match command {
        Commands::Embed {
            paths,
            text,
            json,
            settings,
        } => run_embed(paths, text, json, settings),

        Commands::Extract {
            input,
            output,
            settings,
        } => ConfigOverrides::from(settings)
            .resolve()
            .and_then(|config| extract_from_image(&input, &ExtractOptions { config, output }))
            .map(|message| print!("{}", message)),

        Commands::Analyze { image, json } => {
            analyze_image(&image, &AnalyzeOptions { json }).map(|report| print!("{}", report))
        }

        Commands::Capacity { image } => show_capacity(&image).map(|table| print!("{}", table)),

        Commands::Planes { image, out_dir } => export_bit_planes(&image, &out_dir).map(|written| {
            println!("Wrote {} planes to {}", written.len(), out_dir.display())
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
