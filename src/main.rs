use std::fmt::Display;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use stringart_orders::application::order_service::OrderService;
use stringart_orders::catalog_loader::read_catalog_file;
use stringart_orders::config::AppConfig;
use stringart_orders::infrastructure::catalog_repo::DieselCatalog;
use stringart_orders::infrastructure::order_repo::DieselOrderLedger;
use stringart_orders::payment_link::PaymentLinkConfig;
use stringart_orders::tables::{render_orders, render_products};
use stringart_orders::{build_server, create_pool, run_migrations};

#[derive(Parser)]
#[command(name = "stringart", version, about = "String art order processing")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the API server
    Server {
        /// Port to listen on (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// List all products
    ListProducts,
    /// Load products from a YAML catalog file
    LoadProducts {
        file: PathBuf,
    },
    /// List all orders, newest first
    ListOrders,
    /// Confirm that payment for an order has been received
    ConfirmPayment {
        order_id: i32,
    },
}

fn fail(err: impl Display) -> ! {
    eprintln!("Error: {}", err);
    std::process::exit(1)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let cli = Cli::parse();
    let config = AppConfig::from_env().unwrap_or_else(|e| fail(e));

    let pool = create_pool(&config.database_url).unwrap_or_else(|e| fail(e));
    run_migrations(&pool).unwrap_or_else(|e| fail(e));

    let service = OrderService::new(
        Arc::new(DieselCatalog::new(pool.clone())),
        Arc::new(DieselOrderLedger::new(pool)),
    );

    match cli.command {
        Command::Server { port } => {
            let port = port.unwrap_or(config.port);
            let links = PaymentLinkConfig::new(config.upi_id, config.payee_name);
            log::info!("Starting server at http://{}:{}", config.host, port);
            build_server(service, links, &config.host, port)?.await
        }
        Command::ListProducts => {
            let products = service.list_products(false).unwrap_or_else(|e| fail(e));
            print!("{}", render_products(&products));
            Ok(())
        }
        Command::LoadProducts { file } => {
            println!("Loading products from {}...", file.display());
            let entries = read_catalog_file(&file).unwrap_or_else(|e| fail(e));
            let applied = service
                .load_catalog(&entries, Utc::now())
                .unwrap_or_else(|e| fail(e));
            println!("Loaded {} products", applied);
            Ok(())
        }
        Command::ListOrders => {
            let orders = service.list_orders().unwrap_or_else(|e| fail(e));
            print!("{}", render_orders(&orders));
            Ok(())
        }
        Command::ConfirmPayment { order_id } => {
            service
                .mark_payment_received(order_id, Utc::now())
                .unwrap_or_else(|e| fail(e));
            println!("Payment for order {} confirmed as received", order_id);
            Ok(())
        }
    }
}
