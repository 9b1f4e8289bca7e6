use clap::{Parser, Subcommand};
use picturesque::asset::PathAssetStore;
use picturesque::config::{self, PictureConfig};
use picturesque::picture::{self, PictureOptions};
use picturesque::url::QueryUrlService;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "picturesque")]
#[command(about = "Compile responsive <picture> markup from size descriptors")]
#[command(long_about = "\
Compile responsive <picture> markup from size descriptors

A size descriptor packs everything one <source> needs into a compact
string: sizes, an optional aspect ratio, and an optional sizes
attribute, separated by pipes:

  300                   one 300px-wide size, DPR-based srcset
  300,600x200           two sizes, the second with an explicit height
  300|16:9              height derived from a 16:9 ratio
  300,600|16:9|100vw    explicit sizes attribute, width-based srcset

Descriptors are attached to breakpoints from the config as key=value
parameters:

  picturesque render photo.jpg -p md='720|16:9|100vw' -p size='300' \\
      -p alt='A sweeping valley' -p output=json

Run 'picturesque gen-config' to print a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile one asset into <picture> HTML or JSON
    Render {
        /// Asset path or URL (mime type inferred from the extension)
        src: String,

        /// Options as key=value pairs (size, breakpoint names, format,
        /// orientation, alt, class, wrapper_class, lazy, output)
        #[arg(short = 'p', long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,

        /// Prefix for relative asset URLs
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Print a documented default config.toml
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match config::load_config(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Command::Render {
            src,
            params,
            base_url,
        } => match run_render(&config, &src, &params, base_url) {
            Ok(output) => {
                println!("{output}");
                ExitCode::SUCCESS
            }
            Err(message) => {
                eprintln!("error: {message}");
                ExitCode::FAILURE
            }
        },
        Command::GenConfig => {
            print!("{}", config::documented_default());
            ExitCode::SUCCESS
        }
    }
}

fn run_render(
    config: &PictureConfig,
    src: &str,
    params: &[String],
    base_url: Option<String>,
) -> Result<String, String> {
    let mut pairs = vec![("src".to_string(), src.to_string())];
    for param in params {
        let (key, value) = param
            .split_once('=')
            .ok_or_else(|| format!("parameter {param:?} is not of the form key=value"))?;
        pairs.push((key.trim().to_string(), value.to_string()));
    }

    let (reference, options) =
        PictureOptions::from_params(config, &pairs).map_err(|e| e.to_string())?;

    let service = match base_url {
        Some(base) => QueryUrlService::with_base_url(base),
        None => QueryUrlService::new(),
    };

    picture::render(config, &PathAssetStore, &service, &reference, &options)
        .map_err(|e| e.to_string())
}
