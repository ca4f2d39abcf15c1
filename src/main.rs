use cardgate::application::availability::AllowList;
use cardgate::application::gateway::{DEFAULT_RETURN_URL_BASE, PaymentGateway, SubmissionOutcome};
use cardgate::application::scripts::{CustomerProfile, PayPageRequest, client_scripts};
use cardgate::config::{GatewaySettings, settings_fields};
use cardgate::domain::checkout::CheckoutSession;
use cardgate::domain::ports::{OrderStoreBox, PaymentProcessorBox};
use cardgate::infrastructure::http::{DEFAULT_API_BASE, HttpProcessor, HttpProcessorConfig};
use cardgate::infrastructure::in_memory::InMemoryOrderStore;
#[cfg(feature = "storage-rocksdb")]
use cardgate::infrastructure::rocksdb::RocksDBOrderStore;
use cardgate::infrastructure::simulated::SimulatedProcessor;
use cardgate::interfaces::csv::order_reader::OrderReader;
use cardgate::interfaces::csv::outcome_writer::{OutcomeWriter, write_orders};
use cardgate::interfaces::csv::submission_reader::SubmissionReader;
use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Gateway settings: a JSON object of option values. Defaults apply when omitted.
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Path to persistent order database (optional). If provided, uses RocksDB.
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    /// Charge through the offline simulated processor instead of the remote API.
    #[arg(long, global = true)]
    simulate: bool,

    /// Remote API origin.
    #[arg(long, global = true, default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Base of the order confirmation URL.
    #[arg(long, global = true, default_value = DEFAULT_RETURN_URL_BASE)]
    return_url: String,

    /// Offer the gateway only to this user id. Repeatable; everyone when absent.
    #[arg(long = "allow-user", global = true)]
    allow_users: Vec<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Process a CSV of checkout submissions and print one outcome per row.
    Submit {
        /// Checkout submissions CSV file
        submissions: PathBuf,

        /// Orders CSV file to load into the store first
        #[arg(long)]
        orders: Option<PathBuf>,
    },
    /// Print the payment state of every stored order.
    Orders {
        /// Orders CSV file to load into the store first
        #[arg(long)]
        orders: Option<PathBuf>,
    },
    /// Print the client script assets and form script parameters.
    ScriptParams {
        /// Orders CSV file to load into the store first
        #[arg(long)]
        orders: Option<PathBuf>,

        /// Pay page order id
        #[arg(long, requires = "order_key")]
        order_id: Option<u64>,

        /// Pay page order key
        #[arg(long, requires = "order_id")]
        order_key: Option<String>,

        /// Saved card id of the signed-in customer. Repeatable.
        #[arg(long = "saved-card")]
        saved_cards: Vec<String>,

        /// Base URL the plugin assets are served from
        #[arg(long, default_value = "")]
        assets_base: String,
    },
    /// Print the admin settings field declarations as JSON.
    SettingsSchema,
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();
}

fn open_store(db_path: Option<PathBuf>) -> Result<OrderStoreBox> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            let store = RocksDBOrderStore::open(path).into_diagnostic()?;
            Ok(Box::new(store))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            tracing::warn!(
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
            Ok(Box::new(InMemoryOrderStore::new()))
        }
        None => Ok(Box::new(InMemoryOrderStore::new())),
    }
}

async fn load_orders(store: &OrderStoreBox, path: Option<PathBuf>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::open(path).into_diagnostic()?;
    for order in OrderReader::new(file).orders() {
        match order {
            Ok(order) => store.store(order).await.into_diagnostic()?,
            Err(e) => error!("Error reading order: {}", e),
        }
    }
    Ok(())
}

fn build_processor(cli: &Cli, settings: &GatewaySettings) -> Result<PaymentProcessorBox> {
    if cli.simulate {
        info!("using simulated processor");
        return Ok(Box::new(SimulatedProcessor::new()));
    }
    let config = HttpProcessorConfig::new(settings.credentials().secret_key.clone())
        .with_api_base(cli.api_base.clone());
    Ok(Box::new(HttpProcessor::new(config).into_diagnostic()?))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    if let Command::SettingsSchema = cli.command {
        let schema = serde_json::to_string_pretty(&settings_fields()).into_diagnostic()?;
        println!("{}", schema);
        return Ok(());
    }

    let settings = match &cli.settings {
        Some(path) => GatewaySettings::load(path).into_diagnostic()?,
        None => GatewaySettings::default(),
    };

    let store = open_store(cli.db_path.clone())?;
    let processor = build_processor(&cli, &settings)?;

    match cli.command {
        Command::Submit {
            submissions,
            orders,
        } => {
            load_orders(&store, orders).await?;
            let gateway = PaymentGateway::new(settings, store, processor)
                .with_availability(AllowList::new(cli.allow_users).into_policy())
                .with_return_url_base(cli.return_url);

            let file = File::open(submissions).into_diagnostic()?;
            let stdout = io::stdout();
            let mut writer = OutcomeWriter::new(stdout.lock());

            for submission in SubmissionReader::new(file).submissions() {
                let submission = match submission {
                    Ok(submission) => submission,
                    Err(e) => {
                        error!("Error reading submission: {}", e);
                        continue;
                    }
                };

                let mut session = CheckoutSession::new();
                let outcome = if gateway.is_available_for(&submission.actor) {
                    match gateway
                        .submit(submission.order_id, &submission.form, &mut session)
                        .await
                    {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            error!(
                                "Error processing submission for order {}: {}",
                                submission.order_id, e
                            );
                            continue;
                        }
                    }
                } else {
                    let message = "Card payments are not available for this checkout.".to_string();
                    session.add_error(message.clone());
                    SubmissionOutcome::Failure { message }
                };

                writer
                    .write_outcome(submission.order_id, &outcome, &session)
                    .into_diagnostic()?;
            }
            writer.flush().into_diagnostic()?;
        }
        Command::Orders { orders } => {
            load_orders(&store, orders).await?;
            let all = store.get_all().await.into_diagnostic()?;
            write_orders(io::stdout().lock(), &all).into_diagnostic()?;
        }
        Command::ScriptParams {
            orders,
            order_id,
            order_key,
            saved_cards,
            assets_base,
        } => {
            load_orders(&store, orders).await?;
            let gateway = PaymentGateway::new(settings, store, processor);

            let customer = (!saved_cards.is_empty()).then(|| CustomerProfile {
                customer_id: String::new(),
                cards: saved_cards,
            });
            let pay_page = order_id
                .zip(order_key)
                .map(|(order_id, order_key)| PayPageRequest {
                    order_id,
                    order_key,
                });

            let params = gateway
                .script_params(customer.as_ref(), pay_page.as_ref())
                .await
                .into_diagnostic()?;
            let output = serde_json::json!({
                "scripts": client_scripts(&assets_base),
                "params": params,
            });
            println!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
        }
        Command::SettingsSchema => {}
    }

    Ok(())
}
