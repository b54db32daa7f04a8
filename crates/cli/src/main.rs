//! Cartwheel CLI - snapshot inspection and engine demos.
//!
//! # Usage
//!
//! ```bash
//! # Show the local guest snapshots
//! cw-cli snapshot show
//!
//! # Clear the local guest snapshots
//! cw-cli snapshot clear
//!
//! # Guest-mode cart operations against the local snapshot
//! cw-cli cart add -p prod-1 -n "Aurora Mug" --price 14.50 -q 2
//! cw-cli cart update -p prod-1 -q 3
//! cw-cli cart remove -p prod-1
//! cw-cli cart show
//!
//! # Inspect the remote records through the REST adapter
//! cw-cli remote cart
//! cw-cli remote wishlist
//!
//! # Run a scripted guest -> sign-in merge against the in-memory backend
//! cw-cli demo
//! ```
//!
//! # Commands
//!
//! - `snapshot` - Inspect or clear local guest snapshots
//! - `cart` - Guest-mode cart operations
//! - `remote` - Remote record inspection (needs `CARTWHEEL_API_*` env vars)
//! - `demo` - Scripted merge-protocol walkthrough

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "cw-cli")]
#[command(author, version, about = "Cartwheel CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect or clear local guest snapshots
    Snapshot {
        #[command(subcommand)]
        action: SnapshotAction,
    },
    /// Guest-mode cart operations against the local snapshot
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Inspect the remote records through the REST adapter
    Remote {
        #[command(subcommand)]
        action: RemoteAction,
    },
    /// Run a scripted guest -> sign-in merge against the in-memory backend
    Demo,
}

#[derive(Subcommand)]
enum SnapshotAction {
    /// Print the stored cart and wishlist snapshots
    Show,
    /// Remove both snapshots
    Clear,
}

#[derive(Subcommand)]
enum CartAction {
    /// Add a product to the guest cart
    Add {
        /// Catalog product identifier
        #[arg(short, long)]
        product_id: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Unit price (e.g. 14.50)
        #[arg(long)]
        price: rust_decimal::Decimal,

        /// Quantity to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,

        /// Display image URL
        #[arg(long)]
        image: Option<String>,
    },
    /// Set the quantity of an existing line (0 removes it)
    Update {
        /// Catalog product identifier
        #[arg(short, long)]
        product_id: String,

        /// New quantity
        #[arg(short, long)]
        quantity: u32,
    },
    /// Remove a line
    Remove {
        /// Catalog product identifier
        #[arg(short, long)]
        product_id: String,
    },
    /// Empty the guest cart
    Clear,
    /// Print the guest cart and its totals
    Show,
}

#[derive(Subcommand)]
enum RemoteAction {
    /// Print the remote cart record
    Cart,
    /// Print the remote wishlist record
    Wishlist,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Snapshot { action } => match action {
            SnapshotAction::Show => commands::snapshot::show(),
            SnapshotAction::Clear => commands::snapshot::clear(),
        },
        Commands::Cart { action } => match action {
            CartAction::Add {
                product_id,
                name,
                price,
                quantity,
                image,
            } => commands::cart::add(&product_id, &name, price, quantity, image).await?,
            CartAction::Update {
                product_id,
                quantity,
            } => commands::cart::update(&product_id, quantity).await?,
            CartAction::Remove { product_id } => commands::cart::remove(&product_id).await?,
            CartAction::Clear => commands::cart::clear().await?,
            CartAction::Show => commands::cart::show(),
        },
        Commands::Remote { action } => match action {
            RemoteAction::Cart => commands::remote::show_cart().await?,
            RemoteAction::Wishlist => commands::remote::show_wishlist().await?,
        },
        Commands::Demo => commands::demo::run().await?,
    }
    Ok(())
}
