use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use shuttle_dispatch::json::schema::generate_json_schema;
use tracing::info;

use crate::insert::InsertArgs;

mod insert;
mod parsers;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Finds the cheapest insertion of every request of a snapshot
    #[command(visible_alias = "i")]
    Insert {
        #[command(flatten)]
        args: InsertArgs,
    },
    /// Prints the JSON schema of dispatch snapshots
    Schema {
        /// Writes the schema to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<(), anyhow::Error> {
    dotenvy::from_filename("./.env.local").ok();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Insert { args } => insert::run(args)?,
        Commands::Schema { output } => {
            let schema = generate_json_schema()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, schema)?;
                    info!("Schema written to {}", path.display());
                }
                None => println!("{schema}"),
            }
        }
    }

    Ok(())
}
