pub mod types;
pub mod config;
pub mod mapping;
pub mod data;
pub mod pipeline;
pub mod check;
pub mod icon;
pub mod store;
pub mod server;

use clap::{Parser, Subcommand};
use mapping::{IconAliases, SlugMapping};
use std::path::PathBuf;
use store::{ShapeCache, ShapeSource};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile the raw NTA boundaries into the slug-keyed dataset
    Process {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
    /// Verify every known neighborhood has boundary data
    Check {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
    /// Render one neighborhood's shape icon
    Icon {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
        /// Neighborhood slug, e.g. "williamsburg"
        slug: String,
        /// Write a standalone SVG here instead of printing the path data
        #[arg(short, long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Serve the cleaned dataset and the shape-icon API
    Serve {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
}

fn load_mapping(config: &config::AppConfig) -> anyhow::Result<SlugMapping> {
    match &config.input.mapping_file {
        Some(path) => SlugMapping::from_json_file(path),
        None => Ok(SlugMapping::builtin()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Process { config } => {
            let app_config = config::AppConfig::load_from_file(config)?;
            let mapping = load_mapping(&app_config)?;
            println!("Using mapping table with {} entries", mapping.len());

            let summary = pipeline::run(&app_config, &mapping)?;
            println!(
                "{} tracts in, {} written, {} unmapped",
                summary.input, summary.written, summary.dropped
            );

            check::run(&app_config, &mapping)?;
        }
        Commands::Check { config } => {
            let app_config = config::AppConfig::load_from_file(config)?;
            let mapping = load_mapping(&app_config)?;

            check::run(&app_config, &mapping)?;
        }
        Commands::Icon { config, slug, out } => {
            let app_config = config::AppConfig::load_from_file(config)?;

            let source = match &app_config.icons.shapes_url {
                Some(url) => ShapeSource::Url(url.clone()),
                None => ShapeSource::File(app_config.output.cleaned.clone()),
            };
            let shapes = ShapeCache::new(source);
            let aliases = IconAliases::new(app_config.icons.aliases.clone());

            match shapes.icon(slug, &aliases).await {
                Some(shape) => match out {
                    Some(path) => {
                        std::fs::write(path, icon::svg_document(&shape))?;
                        println!("Wrote {:?}", path);
                    }
                    None => println!("{}", shape.path),
                },
                None => println!("No shape available for '{}'", slug),
            }
        }
        Commands::Serve { config } => {
            let app_config = config::AppConfig::load_from_file(config)?;
            server::start_server(app_config).await?;
        }
    }

    Ok(())
}
