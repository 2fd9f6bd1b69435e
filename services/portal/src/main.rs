use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use common::{FileStore, KeyValueStore, RedisConfig, RedisStore};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use portal::format::{format_date, format_file_size};
use portal::models::DocumentCategory;
use portal::models::fee::outstanding_total;
use portal::navigation::{Navigator, Notification, Notifier, Route};
use portal::{
    ApiClient, Dashboard, DownloadOutcome, FormMode, LoadOutcome, PortalConfig,
    SessionController, SubmitOutcome, TokenStore,
};

/// Alumni portal client
#[derive(Parser, Debug)]
#[command(name = "portal")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a configuration file (default: ./portal.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend base URL, overrides the configuration
    #[arg(long)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in and store the session
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long, env = "PORTAL_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an alumni account
    Register {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "PORTAL_PASSWORD", hide_env_values = true)]
        password: String,

        /// 6-digit student number
        #[arg(long)]
        student_id: Option<String>,

        #[arg(long)]
        graduation_year: Option<i32>,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,

        #[arg(long)]
        phone_number: Option<String>,
    },

    /// Show the signed-in user
    Profile {
        /// Fetch the profile from the backend and update the cached copy
        #[arg(long)]
        refresh: bool,
    },

    /// List documents by section
    #[command(alias = "ls")]
    Documents,

    /// Download a document
    Download {
        /// Document id
        id: i64,

        /// Target directory (default: configured download directory)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// List fees
    Fees,

    /// Check a student's clearance status
    Clearance { student_id: String },

    /// Request an official transcript
    RequestTranscript { student_id: String },

    /// End the session
    Logout,
}

/// Prints notifications to the terminal
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        if notification.is_error() {
            eprintln!("{}: {}", notification.title, notification.description);
        } else {
            println!("{}: {}", notification.title, notification.description);
        }
    }
}

/// There is only one view in a terminal; routes are logged
struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn navigate(&self, route: Route) {
        debug!("Navigating to {}", route);
    }
}

fn open_store(config: &PortalConfig) -> Result<Arc<dyn KeyValueStore>> {
    if let Some(url) = &config.redis_url {
        let redis_config = RedisConfig {
            url: url.clone(),
            ..RedisConfig::from_env()
        };
        return Ok(Arc::new(RedisStore::new(&redis_config)?));
    }

    let path = config.resolved_store_path()?;
    Ok(Arc::new(FileStore::open(path)?))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    let cli = Cli::parse();

    let mut config = PortalConfig::load(cli.config.as_deref())?;
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }
    info!("Using backend at {}", config.api_url);

    let tokens = TokenStore::new(open_store(&config)?);
    let api = ApiClient::new(&config, tokens.clone())?;
    let navigator: Arc<dyn Navigator> = Arc::new(ConsoleNavigator);
    let notifier: Arc<dyn Notifier> = Arc::new(ConsoleNotifier);

    let session = || {
        SessionController::new(
            api.clone(),
            navigator.clone(),
            notifier.clone(),
            config.redirect_delay(),
        )
    };
    let dashboard = |dir: PathBuf| Dashboard::new(api.clone(), navigator.clone(), notifier.clone(), dir);

    match cli.command {
        Commands::Login { username, password } => {
            let mut controller = session();
            if controller.mount() {
                if let Some(user) = controller.user() {
                    println!(
                        "Already signed in as {}; run `portal logout` first",
                        user.username
                    );
                }
                return Ok(());
            }
            let form = controller.login_form_mut();
            form.username = username;
            form.password = password;
            finish_submit(controller.submit().await)?;
        }
        Commands::Register {
            username,
            email,
            password,
            student_id,
            graduation_year,
            first_name,
            last_name,
            phone_number,
        } => {
            let mut controller = session();
            controller.set_mode(FormMode::Register);
            let form = controller.registration_form_mut();
            form.username = username;
            form.email = email;
            form.password_confirm = password.clone();
            form.password = password;
            form.student_id = student_id;
            form.graduation_year = graduation_year;
            form.first_name = first_name;
            form.last_name = last_name;
            form.phone_number = phone_number;
            finish_submit(controller.submit().await)?;
        }
        Commands::Profile { refresh } => {
            let user = if refresh {
                let profile = api.get_profile().await?;
                tokens.set_user(&profile)?;
                Some(profile)
            } else {
                tokens.get_user()?
            };
            let Some(user) = user else {
                bail!("Not signed in");
            };
            println!("Welcome back, {}!", user.display_name());
            println!("Email: {}", user.email.as_deref().unwrap_or("-"));
            if let Some(student_id) = &user.student_id {
                println!("Student ID: {}", student_id);
            }
            if let Some(year) = user.graduation_year {
                println!("Graduation Year: {}", year);
            }
            if let Some(debt) = user.outstanding_debt() {
                println!("Outstanding Debt: ${:.2}", debt);
            }
        }
        Commands::Documents => {
            let mut board = dashboard(config.download_dir.clone());
            match board.mount().await {
                LoadOutcome::Redirected => bail!("Not signed in"),
                LoadOutcome::Failed => bail!("Could not load documents"),
                LoadOutcome::Cancelled => return Ok(()),
                LoadOutcome::Loaded(_) => {}
            }
            if !board.can_download() {
                println!("Outstanding Fees Detected");
                println!("Please clear your outstanding fees to download documents.");
                println!();
            }
            let buckets = board.buckets();
            for category in DocumentCategory::ALL {
                let documents = buckets.get(category);
                if category == DocumentCategory::Other && documents.is_empty() {
                    continue;
                }
                println!("{}", category.title());
                if documents.is_empty() {
                    println!("  {}", category.empty_message());
                }
                for doc in documents {
                    println!(
                        "  [{}] {}{} | uploaded {} | {} | {}",
                        doc.id,
                        doc.title,
                        if doc.is_verified { " (verified)" } else { "" },
                        format_date(&doc.uploaded_at),
                        format_file_size(doc.file_size),
                        if board.is_download_disabled(doc.id) {
                            "download blocked"
                        } else {
                            doc.document_type.download_label()
                        },
                    );
                }
                println!();
            }
        }
        Commands::Download { id, dir } => {
            let mut board = dashboard(dir.unwrap_or_else(|| config.download_dir.clone()));
            match board.mount().await {
                LoadOutcome::Redirected => bail!("Not signed in"),
                LoadOutcome::Cancelled => return Ok(()),
                LoadOutcome::Failed | LoadOutcome::Loaded(_) => {}
            }
            match board.download(id).await {
                DownloadOutcome::Saved(_) | DownloadOutcome::Cancelled => {}
                DownloadOutcome::Disabled => {
                    bail!("Downloads are disabled until outstanding fees are cleared")
                }
                DownloadOutcome::Failed(_) => bail!("Download failed"),
            }
        }
        Commands::Fees => {
            let fees = api.list_fees().await?;
            if fees.is_empty() {
                println!("No fees recorded.");
            }
            for fee in &fees {
                println!(
                    "  [{}] {:>10.2} {} {}",
                    fee.id,
                    fee.amount,
                    if fee.is_paid { "paid  " } else { "unpaid" },
                    fee.description.as_deref().unwrap_or(""),
                );
            }
            println!("Outstanding: {:.2}", outstanding_total(&fees));
        }
        Commands::Clearance { student_id } => {
            let status = api.check_clearance(&student_id).await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Commands::RequestTranscript { student_id } => {
            let receipt = api.request_transcript(&student_id).await?;
            println!("{}", serde_json::to_string_pretty(&receipt)?);
        }
        Commands::Logout => {
            dashboard(config.download_dir.clone()).logout()?;
            println!("Signed out");
        }
    }

    Ok(())
}

fn finish_submit(outcome: SubmitOutcome) -> Result<()> {
    match outcome {
        SubmitOutcome::Authenticated(user) => {
            println!("Signed in as {}", user.display_name());
            Ok(())
        }
        SubmitOutcome::PendingApproval | SubmitOutcome::Cancelled => Ok(()),
        // The notifier already printed the reason
        SubmitOutcome::Failed(e) => bail!("Request not accepted ({:?})", e.kind()),
    }
}
