//! Shelf CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! shelf-cli migrate
//!
//! # Load a catalog from YAML
//! shelf-cli seed demos/catalog.yaml
//!
//! # Tag a product and list its tags
//! shelf-cli tag create sale
//! shelf-cli tag apply sale store.product#7
//! shelf-cli tag list store.product#7
//!
//! # Like a product
//! shelf-cli like add ada store.product#7
//!
//! # Print the record a reference points at
//! shelf-cli resolve store.product 7
//! ```
//!
//! # Environment Variables
//!
//! - `SHELF_DATABASE_URL` - `PostgreSQL` connection string
//! - `SHELF_LOG_JSON` - emit JSON logs when set
//! - `RUST_LOG` - log filter, defaults to `shelf_store=info,shelf_cli=info`

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shelf_core::{ContentType, ObjectRef};

mod commands;

#[derive(Parser)]
#[command(name = "shelf-cli")]
#[command(author, version, about = "Shelf CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Load users, collections, products, customers and tags from a YAML file
    Seed {
        /// Path to the seed file
        file: PathBuf,
    },
    /// Manage tags
    Tag {
        #[command(subcommand)]
        action: TagAction,
    },
    /// Manage likes
    Like {
        #[command(subcommand)]
        action: LikeAction,
    },
    /// Print the record a reference points at as JSON
    Resolve {
        /// Content type, e.g. `store.product`
        content_type: ContentType,
        /// Primary key of the record
        id: i32,
    },
}

#[derive(Subcommand)]
enum TagAction {
    /// Create a tag
    Create {
        /// Tag label
        label: String,
    },
    /// Apply a tag to a record, creating the tag if needed
    Apply {
        /// Tag label
        label: String,
        /// Target reference, e.g. `store.product#7`
        target: ObjectRef,
    },
    /// List the tags applied to a record
    List {
        /// Target reference, e.g. `store.product#7`
        target: ObjectRef,
    },
}

#[derive(Subcommand)]
enum LikeAction {
    /// Record that a user likes a record
    Add {
        /// Username of an existing user
        username: String,
        /// Target reference, e.g. `store.product#7`
        target: ObjectRef,
    },
}

fn init_tracing() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shelf_store=info,shelf_cli=info".into());

    let is_json = std::env::var("SHELF_LOG_JSON").is_ok();
    let json_layer = is_json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!is_json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file } => commands::seed::run(&file).await?,
        Commands::Tag { action } => match action {
            TagAction::Create { label } => commands::relations::create_tag(&label).await?,
            TagAction::Apply { label, target } => {
                commands::relations::apply_tag(&label, &target).await?;
            }
            TagAction::List { target } => commands::relations::list_tags(&target).await?,
        },
        Commands::Like { action } => match action {
            LikeAction::Add { username, target } => {
                commands::relations::add_like(&username, &target).await?;
            }
        },
        Commands::Resolve { content_type, id } => {
            commands::resolve::run(ObjectRef::new(content_type, id)).await?;
        }
    }
    Ok(())
}
