//! BlockFlow CLI - browse the catalog, manage the cart, check out.
//!
//! # Usage
//!
//! ```bash
//! # Log in (stores the bearer token in the data directory)
//! bf login -u asha -p hunter2
//!
//! # Find something to buy
//! bf products search --q brick --max-price 200
//!
//! # Fill the cart
//! bf cart add 12 -q 3
//! bf cart show
//!
//! # Place one order per cart line
//! bf checkout --full-name "Asha Rao" --email asha@example.com --phone 5550100 \
//!     --address "1 Main St" --city Pune --postal-code 411001
//!
//! # See what checkout created
//! bf orders list
//! ```
//!
//! # Commands
//!
//! - `login` / `logout` / `whoami` - Credential slot management
//! - `products` - Catalog search and categories
//! - `cart` - Show and edit the persisted cart
//! - `checkout` - Submit the cart as orders
//! - `orders` - List and edit placed orders

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::{self, Write};
use std::num::NonZeroU32;
use std::process::ExitCode;

use blockflow_core::{OrderId, OrderStatus, ProductId};
use blockflow_storefront::api::OrderChanges;
use blockflow_storefront::config::StorefrontConfig;
use blockflow_storefront::error::AppError;
use blockflow_storefront::services::checkout::PaymentMethod;
use blockflow_storefront::session::Session;
use blockflow_storefront::state::AppState;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use sentry::integrations::tracing as sentry_tracing;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "bf")]
#[command(author, version, about = "BlockFlow storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the issued token
    Login {
        /// Account username
        #[arg(short, long)]
        username: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Forget the stored token
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Browse the catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Show or edit the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place one order per cart line
    Checkout(CheckoutArgs),
    /// List or edit placed orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// Search products
    Search(SearchArgs),
    /// List product categories
    Categories,
}

#[derive(Args)]
struct SearchArgs {
    /// Free-text query
    #[arg(long, default_value = "")]
    q: String,

    /// Category filter
    #[arg(long, default_value = "")]
    category: String,

    /// Minimum unit price
    #[arg(long, default_value = "0")]
    min_price: Decimal,

    /// Maximum unit price
    #[arg(long, default_value = "1000")]
    max_price: Decimal,

    /// Sort field
    #[arg(long, default_value = "id")]
    sort_by: String,

    /// Zero-based page index
    #[arg(long, default_value_t = 0)]
    page: u32,

    /// Page size
    #[arg(long, default_value_t = 12)]
    limit: u32,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart contents and totals
    Show,
    /// Add a product by id
    Add {
        /// Product id
        id: ProductId,

        /// Quantity to add
        #[arg(short, long, default_value = "1")]
        quantity: NonZeroU32,
    },
    /// Remove a product
    Remove {
        /// Product id
        id: ProductId,
    },
    /// Set a product's quantity (zero or less removes it)
    Set {
        /// Product id
        id: ProductId,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List orders
    List,
    /// Change an order's status, quantity or customer name
    Update {
        /// Order id
        id: OrderId,

        /// `NEW`, `CONFIRMED` or `CANCELLED`
        #[arg(long)]
        status: Option<OrderStatus>,

        /// New quantity
        #[arg(short, long)]
        quantity: Option<NonZeroU32>,

        #[arg(long)]
        customer_name: Option<String>,
    },
}

#[derive(Args)]
struct CheckoutArgs {
    #[arg(long)]
    full_name: String,

    #[arg(long)]
    email: String,

    #[arg(long)]
    phone: String,

    #[arg(long)]
    address: String,

    #[arg(long)]
    city: String,

    #[arg(long)]
    postal_code: String,

    /// `card`, `upi` or `bank`
    #[arg(long, default_value = "card")]
    payment_method: PaymentMethod,
}

/// Errors that end a CLI invocation.
#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    App(#[from] AppError),

    #[error("Failed to write output: {0}")]
    Io(#[from] io::Error),

    /// The command ran but the storefront refused it.
    #[error("{0}")]
    Rejected(&'static str),
}

impl CliError {
    fn user_message(&self) -> String {
        match self {
            Self::App(e) => e.user_message(),
            Self::Io(_) => "Failed to write output".to_string(),
            Self::Rejected(message) => (*message).to_string(),
        }
    }

    fn report(&self) {
        match self {
            Self::App(e) => e.report(),
            Self::Io(e) => tracing::error!(error = %e, "Command failed"),
            Self::Rejected(message) => tracing::warn!(%message, "Command rejected"),
        }
    }
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            let _ = writeln!(io::stderr(), "{e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialize Sentry (must be done before tracing subscriber). The guard
    // flushes queued events when it drops at the end of `main`.
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "blockflow_storefront=info,bf=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    finish(run(cli, config).await)
}

/// Report a failed run and map it to the process exit status.
fn finish(result: Result<(), CliError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            e.report();
            let _ = writeln!(io::stderr(), "Error: {}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), CliError> {
    let state = AppState::new(config).map_err(AppError::from)?;
    let mut out = io::stdout().lock();

    match cli.command {
        Commands::Login { username, password } => {
            let session = Session::start(state);
            commands::auth::login(&session, &username, &password, &mut out).await?;
        }
        Commands::Logout => commands::auth::logout(Session::start(state), &mut out)?,
        Commands::Whoami => commands::auth::whoami(&Session::start(state), &mut out)?,
        Commands::Products { action } => match action {
            ProductsAction::Search(args) => {
                commands::products::search(&state, &args.into_query(), &mut out).await?;
            }
            ProductsAction::Categories => {
                commands::products::categories(&state, &mut out).await?;
            }
        },
        Commands::Cart { action } => {
            let mut session = Session::start(state);
            match action {
                CartAction::Show => commands::cart::show(&session, &mut out)?,
                CartAction::Add { id, quantity } => {
                    commands::cart::add(&mut session, id, quantity, &mut out).await?;
                }
                CartAction::Remove { id } => commands::cart::remove(&mut session, id, &mut out)?,
                CartAction::Set { id, quantity } => {
                    commands::cart::set(&mut session, id, quantity, &mut out)?;
                }
                CartAction::Clear => commands::cart::clear(&mut session, &mut out)?,
            }
        }
        Commands::Checkout(args) => {
            let mut session = Session::start(state);
            commands::checkout::submit(&mut session, &args.into_form(), &mut out).await?;
        }
        Commands::Orders { action } => {
            let session = Session::start(state);
            match action {
                OrdersAction::List => commands::orders::list(&session, &mut out).await?,
                OrdersAction::Update {
                    id,
                    status,
                    quantity,
                    customer_name,
                } => {
                    let changes = OrderChanges {
                        customer_name,
                        quantity,
                        status,
                    };
                    commands::orders::update(&session, id, changes, &mut out).await?;
                }
            }
        }
    }

    out.flush()?;
    Ok(())
}

impl SearchArgs {
    fn into_query(self) -> blockflow_storefront::api::ProductQuery {
        blockflow_storefront::api::ProductQuery {
            q: self.q,
            category: self.category,
            min_price: self.min_price,
            max_price: self.max_price,
            sort_by: self.sort_by,
            page: self.page,
            limit: self.limit,
        }
    }
}

impl CheckoutArgs {
    fn into_form(self) -> blockflow_storefront::services::checkout::CheckoutForm {
        blockflow_storefront::services::checkout::CheckoutForm {
            full_name: self.full_name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            city: self.city,
            postal_code: self.postal_code,
            payment_method: self.payment_method,
        }
    }
}
