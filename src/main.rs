//! Face Gate CLI
//!
//! Command-line front end for the login client. `simulate` runs the whole
//! challenge flow offline against a scripted server and a mock camera; the
//! network commands talk to a real auth service.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use face_gate::{
    auth::ScriptedAuthService,
    capture::MockCamera,
    config::{ConfigError, FileConfig},
    metrics::{ChallengeMetrics, MetricsError},
    orchestrator::{ChallengeOrchestrator, LoginForm, StatusMessage, StatusSink},
    storage::{MemoryStorage, SharedStorage},
};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "face-gate", version, about = "Login client with a camera challenge")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the flow offline: refuse N logins, then accept
    Simulate {
        #[arg(long, default_value = "Demo User")]
        name: String,
        #[arg(long, default_value = "demo@example.com")]
        email: String,
        /// Refusals before the scripted server accepts
        #[arg(long, default_value_t = 4)]
        failures: u32,
    },
    /// Sign in against the configured auth service
    Login {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Check whether the stored session is still valid
    Status,
    /// End the stored session and clear attempt counters
    Logout,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Metrics(#[from] MetricsError),
    #[error("failed to start runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[cfg(feature = "network")]
    #[error(transparent)]
    Network(#[from] face_gate::auth::NetworkError),
    #[cfg(feature = "network")]
    #[error(transparent)]
    Storage(#[from] face_gate::storage::StorageError),
    #[cfg(not(feature = "network"))]
    #[error("built without the network feature")]
    NetworkDisabled,
}

/// Prints status updates to the terminal.
struct ConsoleStatus;

impl StatusSink for ConsoleStatus {
    fn show(&mut self, message: &StatusMessage) {
        println!("... {message}");
    }

    fn progress(&mut self, percent: u8) {
        debug!(percent, "Progress");
    }

    fn finish_loading(&mut self) {}
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, CliError> {
    let config = match &cli.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };
    info!("Face Gate v{}", face_gate::VERSION);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        match cli.command {
            Command::Simulate {
                name,
                email,
                failures,
            } => simulate(&config, &name, &email, failures).await,
            Command::Login {
                name,
                email,
                password,
            } => network::login(&config, LoginForm::new(name, email, password)).await,
            Command::Status => network::status(&config).await,
            Command::Logout => network::logout(&config).await,
        }
    })
}

async fn simulate(
    config: &FileConfig,
    name: &str,
    email: &str,
    failures: u32,
) -> Result<ExitCode, CliError> {
    info!("Simulating {} refused logins with a mock camera", failures);

    let auth = ScriptedAuthService::new().rejecting_then_accepting(failures, "demo-token");
    let metrics = ChallengeMetrics::new()?;
    let camera = MockCamera::new().with_frame_size(config.capture.width, config.capture.height);
    let mut flow = ChallengeOrchestrator::from_config(
        auth,
        camera,
        SharedStorage::new(MemoryStorage::new()),
        config,
    )
    .with_metrics(metrics.clone());

    let form = LoginForm::new(name, email, "demo-password");
    let mut status = ConsoleStatus;
    for attempt in 1..=failures + 1 {
        let outcome = flow.submit(&form, &mut status).await;
        let capture = if outcome.was_challenged() {
            " [capture sent]"
        } else {
            ""
        };
        println!("#{attempt} {}{capture}", outcome.message());
        if outcome.is_authenticated() {
            break;
        }
    }

    println!();
    print!("{}", metrics.encode()?);
    Ok(ExitCode::SUCCESS)
}

#[cfg(feature = "network")]
mod network {
    use std::process::ExitCode;

    use face_gate::{
        auth::HttpAuthService,
        config::FileConfig,
        context::IpifyLookup,
        orchestrator::{ChallengeOrchestrator, LoginForm},
        storage::{FileStorage, SharedStorage},
    };

    use super::{CliError, ConsoleStatus};

    #[cfg(feature = "camera")]
    type Device = face_gate::capture::NativeCamera;
    #[cfg(not(feature = "camera"))]
    type Device = face_gate::capture::MockCamera;

    #[cfg(feature = "camera")]
    fn device() -> Device {
        face_gate::capture::NativeCamera::new(0)
    }

    #[cfg(not(feature = "camera"))]
    fn device() -> Device {
        tracing::warn!("Built without the camera feature; challenges use a mock camera");
        face_gate::capture::MockCamera::new()
    }

    fn orchestrator(
        config: &FileConfig,
    ) -> Result<ChallengeOrchestrator<HttpAuthService, Device, FileStorage>, CliError> {
        let auth = HttpAuthService::new(&config.auth)?;
        let storage = SharedStorage::new(FileStorage::open(&config.storage.path)?);
        let flow = ChallengeOrchestrator::from_config(auth, device(), storage, config);
        Ok(if config.auth.lookup_ip {
            flow.with_context(IpifyLookup::new())
        } else {
            flow
        })
    }

    pub(super) async fn login(config: &FileConfig, form: LoginForm) -> Result<ExitCode, CliError> {
        let mut flow = orchestrator(config)?;
        let outcome = flow.submit(&form, &mut ConsoleStatus).await;
        println!("{}", outcome.message());
        Ok(if outcome.is_authenticated() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        })
    }

    pub(super) async fn status(config: &FileConfig) -> Result<ExitCode, CliError> {
        let flow = orchestrator(config)?;
        let account = flow.account();
        if flow.validate_session().await {
            println!(
                "Signed in as {} <{}>",
                account.user_name().unwrap_or_default(),
                account.user_email().unwrap_or_default()
            );
            Ok(ExitCode::SUCCESS)
        } else {
            println!("Not signed in");
            Ok(ExitCode::FAILURE)
        }
    }

    pub(super) async fn logout(config: &FileConfig) -> Result<ExitCode, CliError> {
        let mut flow = orchestrator(config)?;
        flow.logout().await;
        println!("Signed out");
        Ok(ExitCode::SUCCESS)
    }
}

#[cfg(not(feature = "network"))]
mod network {
    use std::process::ExitCode;

    use face_gate::{config::FileConfig, orchestrator::LoginForm};

    use super::CliError;

    pub(super) async fn login(
        _config: &FileConfig,
        _form: LoginForm,
    ) -> Result<ExitCode, CliError> {
        Err(CliError::NetworkDisabled)
    }

    pub(super) async fn status(_config: &FileConfig) -> Result<ExitCode, CliError> {
        Err(CliError::NetworkDisabled)
    }

    pub(super) async fn logout(_config: &FileConfig) -> Result<ExitCode, CliError> {
        Err(CliError::NetworkDisabled)
    }
}
