//! Landscape CLI: authenticate against a Landscape server and query it.

mod logging;
mod output;

use clap::{Args, Parser, Subcommand, ValueEnum};
use landscape_lib::auth::Session;
use landscape_lib::helpers::mask;
use landscape_lib::options::{
    with_debug, with_generate_curl_command, with_insecure_skip_verify, with_login_auth,
    with_sso_auth, with_trace,
};
use landscape_lib::{parse_duration, ActivityQuery, Client, ClientOption, Error};
use serde_json::{json, Value};
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "landscape")]
#[command(about = "Landscape CLI - authenticate and query a Landscape server", long_about = None)]
struct Cli {
    /// Output format: plain (key: value lines), json (structured).
    #[arg(short, long, default_value = "plain", value_enum, global = true)]
    output: OutputFormatArg,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormatArg {
    Plain,
    Json,
}

/// Connection and credential settings shared by every authenticated command.
#[derive(Args)]
struct Connection {
    /// The email to use for authentication.
    #[arg(short, long, env = "LANDSCAPE_EMAIL")]
    email: Option<String>,

    /// The password to use for authentication.
    #[arg(short, long, env = "LANDSCAPE_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// The account to use for authentication (server default if omitted).
    #[arg(short, long, env = "LANDSCAPE_ACCOUNT")]
    account: Option<String>,

    /// The access key to use for authentication.
    #[arg(short = 'k', long = "access-key", env = "LANDSCAPE_KEY")]
    key: Option<String>,

    /// The secret key to use for authentication.
    #[arg(short = 's', long = "secret-key", env = "LANDSCAPE_SECRET", hide_env_values = true)]
    secret: Option<String>,

    /// How long a signing context is reused before it is re-established.
    #[arg(
        short = 't',
        long = "token-expiry",
        env = "LANDSCAPE_EXPIRY",
        default_value = "24h",
        value_parser = parse_duration
    )]
    expiry: Duration,

    /// The Landscape API endpoint, e.g. https://landscape.example.com.
    #[arg(short = 'x', long, env = "LANDSCAPE_ENDPOINT")]
    endpoint: String,

    /// Skip TLS certificate verification.
    #[arg(long)]
    insecure: bool,

    /// Log request and response bodies.
    #[arg(long)]
    debug: bool,

    /// Log request timings.
    #[arg(long)]
    trace: bool,

    /// Log the equivalent curl command of each request.
    #[arg(long)]
    curl: bool,
}

impl Connection {
    fn client(&self) -> Result<Client, Error> {
        let mut options: Vec<ClientOption> = vec![
            with_login_auth(
                self.email.clone().unwrap_or_default(),
                self.password.clone().unwrap_or_default(),
                self.account.clone(),
            ),
            with_sso_auth(
                self.key.clone().unwrap_or_default(),
                self.secret.clone().unwrap_or_default(),
                Some(self.expiry),
            ),
        ];
        if self.insecure {
            options.push(with_insecure_skip_verify());
        }
        if self.debug {
            options.push(with_debug());
        }
        if self.trace {
            options.push(with_trace());
        }
        if self.curl {
            options.push(with_generate_curl_command());
        }
        Client::new(self.endpoint.clone(), options)
    }

    /// Settings with secrets masked, for diagnostics.
    fn summary(&self) -> Value {
        let secret = |s: &Option<String>| s.as_ref().map(|_| "********");
        json!({
            "email": self.email,
            "password": secret(&self.password),
            "account": self.account,
            "access_key": self.key.as_deref().map(mask),
            "secret_key": secret(&self.secret),
            "token_expiry": format!("{:?}", self.expiry),
            "endpoint": self.endpoint,
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show version information.
    Version {
        /// Include build metadata.
        #[arg(short, long)]
        verbose: bool,
    },
    /// Show the command arguments and exit.
    #[command(visible_aliases = ["tst", "t"])]
    Test(Connection),
    /// Log in and print the resulting session.
    Login(Connection),
    /// List activities, or show one.
    Activities {
        #[command(flatten)]
        connection: Connection,
        /// Show only the activity with this ID.
        #[arg(long)]
        id: Option<u64>,
        /// Landscape search query, e.g. "status:failed".
        #[arg(short, long)]
        query: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        offset: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();
    let format = match cli.output {
        OutputFormatArg::Plain => output::OutputFormat::Plain,
        OutputFormatArg::Json => output::OutputFormat::Json,
    };

    match run(cli.command, format).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cmd: Commands, format: output::OutputFormat) -> Result<(), String> {
    let print_value = |v: &Value| -> Result<(), String> {
        let text = output::render(v, format).map_err(|e| e.to_string())?;
        println!("{}", text);
        Ok(())
    };

    match cmd {
        Commands::Version { verbose } => {
            if verbose {
                print_value(&json!({
                    "name": env!("CARGO_PKG_NAME"),
                    "description": env!("CARGO_PKG_DESCRIPTION"),
                    "version": env!("CARGO_PKG_VERSION"),
                    "library": landscape_lib::VERSION,
                    "repository": env!("CARGO_PKG_REPOSITORY"),
                    "authors": env!("CARGO_PKG_AUTHORS"),
                }))?;
            } else {
                println!("landscape {}", env!("CARGO_PKG_VERSION"));
            }
        }
        Commands::Test(connection) => {
            tracing::debug!("running test command");
            let summary = connection.summary();
            tracing::debug!(settings = %summary, "command arguments");
            print_value(&summary)?;
            tracing::debug!("command done");
        }
        Commands::Login(connection) => {
            let client = connection.client().map_err(|e| e.to_string())?;
            client.login().await.map_err(|e| e.to_string())?;
            print_value(&session_summary(client.session()))?;
        }
        Commands::Activities {
            connection,
            id,
            query,
            limit,
            offset,
        } => {
            let client = connection.client().map_err(|e| e.to_string())?;
            client.login().await.map_err(|e| e.to_string())?;
            let data = match id {
                Some(id) => client.activities().get(id).await,
                None => {
                    let filter = ActivityQuery {
                        query,
                        limit,
                        offset,
                    };
                    client.activities().list(&filter).await
                }
            }
            .map_err(|e| e.to_string())?;
            print_value(&data)?;
        }
    }
    Ok(())
}

fn session_summary(session: Option<Session>) -> Value {
    match session {
        Some(Session::Token(token)) => json!({
            "session": "token",
            "email": token.email,
            "name": token.name,
            "account": token.account,
            "self_hosted": token.self_hosted,
            "accounts": token.accounts,
        }),
        Some(Session::Signed(context)) => json!({
            "session": "signed",
            "access_key": mask(context.access_key()),
            "established_at": context.established_at().to_rfc3339(),
            "validity": context.validity().map(|v| format!("{:?}", v)),
        }),
        None => Value::Null,
    }
}
