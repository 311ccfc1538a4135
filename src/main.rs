use caja::args::{
    Args, CategorySubcommand, Command, DeleteSubcommand, ProductSubcommand, UpdateSubcommand,
};
use caja::{commands, Config, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().caja_home().path();
    let json = args.common().json();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(home, init_args).await?.emit(json),

        Command::Sale(sale_args) => {
            let config = Config::load(home).await?;
            commands::insert_sale(config, sale_args.clone())
                .await?
                .emit(json)
        }

        Command::Expense(expense_args) => {
            let config = Config::load(home).await?;
            commands::insert_expense(config, expense_args.clone())
                .await?
                .emit(json)
        }

        Command::Update(update_args) => {
            let config = Config::load(home).await?;
            match update_args.entity() {
                UpdateSubcommand::Transaction(args) => {
                    commands::update_transaction(config, args.clone())
                        .await?
                        .emit(json)
                }
            }
        }

        Command::Delete(delete_args) => {
            let config = Config::load(home).await?;
            match delete_args.entity() {
                DeleteSubcommand::Transaction(args) => {
                    commands::delete_transaction(config, args.clone())
                        .await?
                        .emit(json)
                }
                DeleteSubcommand::Product(args) => commands::delete_product(config, args.clone())
                    .await?
                    .emit(json),
                DeleteSubcommand::Category(args) => {
                    commands::delete_category(config, args.clone())
                        .await?
                        .emit(json)
                }
            }
        }

        Command::Product(product_args) => {
            let config = Config::load(home).await?;
            match product_args.action() {
                ProductSubcommand::Add(args) => commands::insert_product(config, args.clone())
                    .await?
                    .emit(json),
                ProductSubcommand::Update(args) => commands::update_product(config, args.clone())
                    .await?
                    .emit(json),
                ProductSubcommand::List => commands::list_products(config).await?.emit(json),
            }
        }

        Command::Category(category_args) => {
            let config = Config::load(home).await?;
            match category_args.action() {
                CategorySubcommand::Add(args) => commands::insert_category(config, args.clone())
                    .await?
                    .emit(json),
                CategorySubcommand::Rename(args) => {
                    commands::rename_category(config, args.clone())
                        .await?
                        .emit(json)
                }
                CategorySubcommand::List => commands::list_categories(config).await?.emit(json),
            }
        }

        Command::Report(report_args) => {
            let config = Config::load(home).await?;
            commands::report(config, report_args.clone())
                .await?
                .emit(json)
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
