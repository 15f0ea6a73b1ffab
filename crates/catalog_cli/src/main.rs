//! `catalog` command-line caller.
//!
//! # Responsibility
//! - Parse arguments into service payloads and print results as JSON.
//! - Map `ProductServiceError` onto a status code + message envelope.
//!
//! # Invariants
//! - All storage access goes through `ProductService`.

use catalog_core::db::open_db;
use catalog_core::{
    default_log_level, init_logging, parse_product_id, CreateProductRequest, LoggingConfig,
    ProductListQuery, ProductService, ProductServiceConfig, ProductServiceError,
    SqliteProductRepository, UpdateProductRequest,
};
use clap::{Args, Parser, Subcommand};
use log::error;
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;

const STDERR_LOG_LEVEL: &str = "warn";

#[derive(Parser, Debug)]
#[command(name = "catalog", about = "Product catalog command-line client", version)]
struct Cli {
    #[arg(
        long,
        env = "CATALOG_DB",
        value_name = "FILE",
        default_value = "catalog.sqlite3",
        help = "SQLite database file"
    )]
    db: PathBuf,

    #[arg(
        long,
        env = "CATALOG_LOG_LEVEL",
        value_name = "LEVEL",
        help = "trace|debug|info|warn|error"
    )]
    log_level: Option<String>,

    #[arg(
        long,
        env = "CATALOG_LOG_DIR",
        value_name = "DIR",
        help = "Absolute directory for rolling log files (stderr when unset)"
    )]
    log_dir: Option<PathBuf>,

    #[arg(long, help = "Report lookup misses as 404 instead of 500")]
    strict_not_found: bool,

    #[arg(long, help = "Match slug and title case-insensitively")]
    case_insensitive_lookup: bool,

    #[arg(long, help = "Lowercase tags supplied on update")]
    lowercase_tags_on_update: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a product.
    Create(CreateArgs),
    /// List products page by page.
    List {
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Show one product by id, slug or title.
    Get { param: String },
    /// Change fields of an existing product.
    Update(UpdateArgs),
    /// Delete a product by id.
    Remove { id: String },
}

#[derive(Args, Debug)]
struct CreateArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    price: Option<f64>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    slug: Option<String>,
    #[arg(long)]
    stock: Option<u32>,
    #[arg(long = "size", value_delimiter = ',', required = true)]
    sizes: Vec<String>,
    #[arg(long)]
    gender: String,
    #[arg(long = "tag", value_delimiter = ',')]
    tags: Option<Vec<String>>,
}

#[derive(Args, Debug)]
struct UpdateArgs {
    id: String,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    price: Option<f64>,
    #[arg(long, conflicts_with = "clear_description")]
    description: Option<String>,
    #[arg(long)]
    clear_description: bool,
    #[arg(long)]
    slug: Option<String>,
    #[arg(long)]
    stock: Option<u32>,
    #[arg(long = "size", value_delimiter = ',')]
    sizes: Option<Vec<String>>,
    #[arg(long)]
    gender: Option<String>,
    #[arg(long = "tag", value_delimiter = ',')]
    tags: Option<Vec<String>>,
}

impl From<CreateArgs> for CreateProductRequest {
    fn from(args: CreateArgs) -> Self {
        Self {
            title: args.title,
            price: args.price,
            description: args.description,
            slug: args.slug,
            stock: args.stock,
            sizes: args.sizes,
            gender: args.gender,
            tags: args.tags,
        }
    }
}

impl From<UpdateArgs> for UpdateProductRequest {
    fn from(args: UpdateArgs) -> Self {
        let description = if args.clear_description {
            Some(None)
        } else {
            args.description.map(Some)
        };
        Self {
            title: args.title,
            price: args.price,
            description,
            slug: args.slug,
            stock: args.stock,
            sizes: args.sizes,
            gender: args.gender,
            tags: args.tags,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let logging = logging_config(cli.log_level.clone(), cli.log_dir.clone());
    if let Err(err) = init_logging(&logging) {
        return fail(500, &err);
    }

    let conn = match open_db(&cli.db) {
        Ok(conn) => conn,
        Err(err) => {
            error!("event=cli_open module=cli status=error error={err}");
            return fail(500, &format!("cannot open `{}`: {err}", cli.db.display()));
        }
    };

    let config = ProductServiceConfig {
        strict_not_found: cli.strict_not_found,
        case_insensitive_lookup: cli.case_insensitive_lookup,
        lowercase_tags_on_update: cli.lowercase_tags_on_update,
    };
    let service = ProductService::with_config(SqliteProductRepository::new(&conn), config);

    let output = match cli.command {
        Command::Create(args) => service.create(args.into()).map(|p| json!(p)),
        Command::List { limit, offset } => service
            .find_all(&ProductListQuery { limit, offset })
            .map(|items| json!(items)),
        Command::Get { param } => service.find_one(&param).map(|p| json!(p)),
        Command::Update(args) => {
            let Some(id) = parse_product_id(&args.id) else {
                return fail(400, "Validation failed (uuid is expected)");
            };
            service.update(id, args.into()).map(|p| json!(p))
        }
        Command::Remove { id } => service.remove(&id).map(|message| json!(message)),
    };

    match output {
        Ok(value) => {
            println!("{value:#}");
            ExitCode::SUCCESS
        }
        Err(err) => report(&err),
    }
}

// stderr also carries the error envelope; keep it free of routine events
// unless a level is asked for explicitly.
fn logging_config(level: Option<String>, log_dir: Option<PathBuf>) -> LoggingConfig {
    let level = level.unwrap_or_else(|| {
        if log_dir.is_some() {
            default_log_level().to_string()
        } else {
            STDERR_LOG_LEVEL.to_string()
        }
    });
    LoggingConfig { level, log_dir }
}

fn report(err: &ProductServiceError) -> ExitCode {
    fail(err.status_code(), &err.to_string())
}

fn fail(status_code: u16, message: &str) -> ExitCode {
    eprintln!(
        "{:#}",
        json!({ "statusCode": status_code, "message": message })
    );
    ExitCode::FAILURE
}
