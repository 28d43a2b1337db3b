use std::process::ExitCode;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};

use stockroom_core::{DomainError, ProductId};
use stockroom_inventory::{CategoryFilter, ProductDraft, SortField, SortOrder, SortSpec};
use stockroom_storage::{
    GatewayError, InventorySession, PersistenceGateway, SessionOptions, SqliteLocalStore,
    StoreConfig,
};

mod render;

#[derive(Parser)]
#[command(name = "stockroom")]
#[command(version, about = "Track stock levels and expiry dates", long_about = None)]
struct Cli {
    /// Expiring-soon look-ahead in days (overrides STOCKROOM_WARNING_DAYS)
    #[arg(long, global = true)]
    warning_days: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    List {
        /// Case-insensitive name substring
        #[arg(long, default_value = "")]
        search: String,
        /// Category name, or "All"
        #[arg(long, default_value = CategoryFilter::ALL)]
        category: String,
        /// name | quantity | expiryDate | price
        #[arg(long, default_value = "expiryDate")]
        sort: SortField,
        #[arg(long)]
        desc: bool,
    },
    /// Add a product
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        quantity: u32,
        #[arg(long)]
        price: f64,
        /// YYYY-MM-DD
        #[arg(long)]
        expiry: NaiveDate,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Change fields of an existing product
    Edit {
        id: ProductId,
        #[command(flatten)]
        changes: ProductChanges,
    },
    /// Delete a product
    Remove { id: ProductId },
    /// Dashboard totals
    Stats,
    /// Products that are low on stock, expiring soon or expired
    Alerts,
    /// Manage categories
    Categories {
        #[command(subcommand)]
        command: Option<CategoryCommand>,
    },
    /// Save remote credentials and push local data
    Connect { url: String, key: String },
    /// Forget remote credentials
    Disconnect,
    /// Show where data is being read from
    Status,
}

/// Fields to overwrite on `edit`; omitted flags keep the current value.
#[derive(Args, Debug, Default)]
struct ProductChanges {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    quantity: Option<u32>,
    #[arg(long)]
    price: Option<f64>,
    /// YYYY-MM-DD
    #[arg(long)]
    expiry: Option<NaiveDate>,
    /// Pass an empty string to clear
    #[arg(long)]
    notes: Option<String>,
}

impl ProductChanges {
    fn apply(self, current: ProductDraft) -> ProductDraft {
        ProductDraft {
            name: self.name.unwrap_or(current.name),
            category: self.category.unwrap_or(current.category),
            quantity: self.quantity.unwrap_or(current.quantity),
            price: self.price.unwrap_or(current.price),
            expiry_date: self.expiry.unwrap_or(current.expiry_date),
            // Some("") survives here and is dropped to None by `into_product`.
            notes: self.notes.or(current.notes),
        }
    }
}

#[derive(Subcommand)]
enum CategoryCommand {
    List,
    Add { name: String },
    Rename { old_name: String, new_name: String },
    Remove { name: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    stockroom_observability::init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<GatewayError>() {
                Some(GatewayError::Validation(e)) => eprintln!("{}", e.user_message()),
                _ => {
                    tracing::error!("command failed: {err:#}");
                    eprintln!("error: {err:#}");
                }
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = StoreConfig::from_env()?;
    if let Some(days) = cli.warning_days {
        config = config.with_warning_window_days(days);
    }
    tracing::debug!(db = %config.database_path().display(), "opening store");

    let local = Arc::new(SqliteLocalStore::open(config.database_path()));
    let gateway = PersistenceGateway::open(local).await?;
    let options = SessionOptions {
        warning_window_days: config.warning_window_days,
        ..SessionOptions::default()
    };

    let now = Utc::now();
    let mut session = InventorySession::load(gateway, options, now).await?;
    let window = session.warning_window_days();

    match cli.command {
        Commands::List {
            search,
            category,
            sort,
            desc,
        } => {
            let sort_spec = SortSpec {
                field: sort,
                order: if desc { SortOrder::Desc } else { SortOrder::Asc },
            };
            let rows = session.table(&search, &CategoryFilter::from(category.as_str()), sort_spec);
            print!("{}", render::products(&rows, now, window));
        }
        Commands::Add {
            name,
            category,
            quantity,
            price,
            expiry,
            notes,
        } => {
            let draft = ProductDraft {
                name,
                category,
                quantity,
                price,
                expiry_date: expiry,
                notes,
            };
            let product = session.add_product(draft).await?;
            println!("Added {} ({})", product.name, product.id);
        }
        Commands::Edit { id, changes } => {
            let Some(existing) = session.find(&id) else {
                return Err(GatewayError::from(DomainError::not_found(format!("no product with id {id}"))).into());
            };
            let draft = changes.apply(existing.to_draft());
            let product = session.update_product(&id, draft).await?;
            println!("Updated {} ({})", product.name, product.id);
        }
        Commands::Remove { id } => {
            let Some(name) = session.find(&id).map(|p| p.name.clone()) else {
                return Err(GatewayError::from(DomainError::not_found(format!("no product with id {id}"))).into());
            };
            session.delete_product(&id).await?;
            println!("Removed {name}");
        }
        Commands::Stats => {
            let stats = session.stats(now);
            print!("{}", render::stats(&stats, &session.category_breakdown()));
        }
        Commands::Alerts => {
            print!("{}", render::products(&session.alerts(now), now, window));
        }
        Commands::Categories { command } => match command.unwrap_or(CategoryCommand::List) {
            CategoryCommand::List => {
                print!(
                    "{}",
                    render::categories(session.categories(), &session.archived_categories())
                );
            }
            CategoryCommand::Add { name } => {
                let stored = session.add_category(&name).await?;
                println!("Added category {stored}");
            }
            CategoryCommand::Rename { old_name, new_name } => {
                session.rename_category(&old_name, &new_name).await?;
                println!("Renamed {old_name} to {}", new_name.trim());
            }
            CategoryCommand::Remove { name } => {
                session.delete_category(&name).await?;
                println!("Removed category {name}; existing products keep it as archived");
            }
        },
        Commands::Connect { url, key } => {
            let report = session.connect(&url, &key, now).await?;
            print!("{}", render::sync_report(&report));
        }
        Commands::Disconnect => {
            session.disconnect(now).await?;
            println!("Disconnected; using local storage only");
        }
        Commands::Status => {
            let gateway = session.gateway();
            println!("Storage:  {}", gateway.connectivity().label());
            if let Some(credentials) = gateway.credentials() {
                println!("Remote:   {}", credentials.url);
            }
            println!("Database: {}", config.database_path().display());
            println!("Products: {}", session.products().len());
            println!("Warning window: {window} days");
        }
    }
    Ok(())
}
