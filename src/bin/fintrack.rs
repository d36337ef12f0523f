use std::{error::Error, path::PathBuf, process::exit, sync::Arc};

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use fintrack::{
    AlertType, CANONICAL_CURRENCY, Config, Currency, CurrencyConverter, Email, LogInController,
    Navigator, Notification, Notifier, Session, TransactionFormController,
    transaction::{JsonLinesClient, parse_amount, round_to_cents},
};

/// Record transactions and log in from the terminal.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to a JSON config file with exchange rates and users.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert an amount between two currencies.
    Convert {
        /// The amount to convert, e.g. 12.50.
        #[arg(long)]
        amount: String,

        /// The currency of the amount.
        #[arg(long)]
        from: Currency,

        /// The currency to convert into.
        #[arg(long, default_value_t = CANONICAL_CURRENCY)]
        to: Currency,
    },

    /// Fill in and submit a new transaction.
    Add {
        /// Either "income" or "expense".
        #[arg(long = "type", default_value = "income")]
        transaction_type: String,

        /// The amount in the chosen currency.
        #[arg(long)]
        amount: String,

        /// One of USD, EUR, BDT or INR.
        #[arg(long)]
        currency: String,

        /// One of salary, food, rent, entertainment or other.
        #[arg(long, default_value = "salary")]
        category: String,

        /// The email of the user the transaction belongs to.
        #[arg(long)]
        email: String,

        /// The file that submitted transactions are appended to as JSON lines.
        #[arg(long)]
        output: PathBuf,
    },

    /// Log in, prompting for the password.
    LogIn {
        /// The email address to log in with.
        #[arg(long)]
        email: String,

        /// The query string the log-in page was opened with, e.g. "?redirect=%2F".
        #[arg(long, default_value = "")]
        query: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    setup_logging();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    match args.command {
        Command::Convert { amount, from, to } => convert(&config, &amount, from, to).await,
        Command::Add {
            transaction_type,
            amount,
            currency,
            category,
            email,
            output,
        } => {
            let fields = [
                ("type", transaction_type),
                ("amount", amount),
                ("currency", currency),
                ("category", category),
            ];
            add_transaction(&config, &email, &fields, output).await
        }
        Command::LogIn { email, query } => log_in(&config, &email, &query).await,
    }
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_log = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(stderr_log.with_filter(filter))
        .init();
}

async fn convert(
    config: &Config,
    amount: &str,
    from: Currency,
    to: Currency,
) -> Result<(), Box<dyn Error>> {
    let amount = parse_amount(amount)?;
    let converter = CurrencyConverter::with_ttl(Arc::new(config.rate_source()), config.rate_ttl());

    match converter.convert(amount, from, to).await {
        Ok(converted) => {
            println!(
                "{} {from} = {} {to}",
                round_to_cents(amount),
                round_to_cents(converted)
            );
            Ok(())
        }
        Err(error) => {
            print_error(error);
            exit(1);
        }
    }
}

async fn add_transaction(
    config: &Config,
    email: &str,
    fields: &[(&str, String)],
    output: PathBuf,
) -> Result<(), Box<dyn Error>> {
    let session = Session::authenticated(Email::new(email)?);
    let converter = CurrencyConverter::with_ttl(Arc::new(config.rate_source()), config.rate_ttl());

    let controller = TransactionFormController::new(
        &session,
        Arc::new(converter),
        Arc::new(JsonLinesClient::new(output)),
        Arc::new(TerminalNotifier),
        Arc::new(TerminalNavigator),
    )
    .with_navigation_delay(config.navigation_delay());

    for (name, value) in fields {
        if let Err(error) = controller.update(name, value) {
            print_error(error.user_message());
            exit(1);
        }
    }

    println!("{}", controller.converted_amount_display().await);

    // The notifier has already told the user what went wrong.
    if controller.submit().await.is_err() {
        exit(1);
    }

    Ok(())
}

async fn log_in(config: &Config, email: &str, query: &str) -> Result<(), Box<dyn Error>> {
    let password = rpassword::prompt_password("Password: ")?;

    let controller = LogInController::new(
        Arc::new(config.auth_service()),
        Arc::new(TerminalNotifier),
        Arc::new(TerminalNavigator),
        query,
    );

    if let Some(redirect_url) = controller.requested_redirect() {
        tracing::debug!("Log-in page asked to return to {redirect_url}");
    }

    if let Err(error) = controller.submit(email, &password).await {
        print_error(controller.error().unwrap_or_else(|| error.user_message()));
        exit(1);
    }

    Ok(())
}

/// Prints notifications to the terminal in the colour of their alert type.
struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: Notification) {
        match notification.alert_type {
            AlertType::Success => println!("\x1b[32;1m{}\x1b[0m", notification.message),
            AlertType::Alert => eprintln!("\x1b[33;1m{}\x1b[0m", notification.message),
            AlertType::Error => print_error(notification.message),
        }
    }
}

/// Reports where the app would navigate to.
struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, route: &str) {
        println!("Navigating to {route}");
    }
}

fn print_error(error: impl ToString) {
    eprintln!(
        "\x1b[31;1m{}\x1b[0m",
        capitalise_first_char(&error.to_string())
    )
}

/// From https://crates.io/crates/capitalize
fn capitalise_first_char(string: &str) -> String {
    let mut chars = string.chars();
    let Some(first) = chars.next() else {
        return String::with_capacity(0);
    };
    first.to_uppercase().chain(chars).collect()
}
