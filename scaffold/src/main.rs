//! Scaffold
//!
//! Generates an annotated entity class for one database table.

mod config;

use std::{env, fs, path::PathBuf};

use clap::Parser;
use entity_scaffold::{normalize_name, scaffold_entity, Database, Drivers};

use crate::config::{ConfigStore, Configuration};

/// Generate an entity class from a table's catalog metadata
#[derive(Parser, Debug)]
#[command(name = "scaffold")]
#[command(version, about = "Generate an entity class from a table's catalog metadata")]
pub struct Args {
	/// Database URL (postgres://, mysql:// or sqlite:)
	#[arg(short = 'c', long)]
	pub connection_string: Option<String>,

	/// Table to scaffold
	#[arg(short = 't', long)]
	pub table: String,

	/// Schema containing the table
	#[arg(short = 's', long)]
	pub schema: Option<String>,

	/// Write <DIR>/<Entity>.cs instead of printing to stdout
	#[arg(short = 'o', long, value_name = "DIR")]
	pub output: Option<PathBuf>,

	/// Remember the connection string and schema for later runs
	#[arg(long)]
	pub save: bool,
}

#[tokio::main]
async fn main() {
	dotenvy::dotenv().ok();
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

	let args = Args::parse();

	if let Err(e) = run(args).await {
		eprintln!("Something went wrong: {}", e);
		std::process::exit(1);
	}
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
	let store = ConfigStore::default_location();
	let saved = match &store {
		Some(store) => {
			log::debug!("Reading configuration from {}", store.path().display());
			store.load()?
		}
		None => None,
	};

	let config = resolve(&args, saved, env::var("DATABASE_URL").ok())?;
	let driver = Drivers::from_url(&config.connection_string)?;
	let schema = config.schema.clone().or_else(|| driver.default_schema().map(str::to_string));

	if args.save {
		match &store {
			Some(store) => store.save(&config)?,
			None => log::warn!("No home directory; configuration not saved"),
		}
	}

	let db = Database::connect(&config.connection_string).await?;
	let code = scaffold_entity(&db, &args.table, schema.as_deref()).await?;

	match &args.output {
		Some(dir) => {
			let path = dir.join(format!("{}.cs", normalize_name(&args.table)));
			fs::write(&path, &code)?;
			log::info!("Wrote {}", path.display());
		}
		None => print!("{}", code),
	}

	Ok(())
}

/// Picks the connection string and schema from the command line, the saved
/// configuration and `DATABASE_URL`, in that order.
///
/// The returned schema is only what the user asked for; the driver default is
/// applied later.
fn resolve(args: &Args, saved: Option<Configuration>, env_url: Option<String>) -> Result<Configuration, String> {
	let (saved_url, saved_schema) = match saved {
		Some(config) => (Some(config.connection_string), config.schema),
		None => (None, None),
	};

	let connection_string = args
		.connection_string
		.clone()
		.or(saved_url)
		.or(env_url)
		.ok_or_else(|| "Connection string required".to_string())?;

	Ok(Configuration { connection_string, schema: args.schema.clone().or(saved_schema) })
}
