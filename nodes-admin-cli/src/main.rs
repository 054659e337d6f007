mod commands;
mod config;
mod error;
mod paths;
mod render;

use std::fs::File;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap::Subcommand;
use log::LevelFilter;
use nodes_admin_lib::api::REPORT_FILE_NAME;
use nodes_admin_lib::console::AdminConsole;
use simplelog::WriteLogger;

use crate::commands::AttestationArgs;
use crate::commands::RoleArg;
use crate::commands::TableArgs;
use crate::commands::UsersArgs;
use crate::config::Config;
use crate::config::ConnectionArgs;
use crate::error::CliError;

#[derive(Parser, Debug)]
#[command(name = "nodes-admin", version, about = "Admin console for the Nodes platform")]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Log at debug level
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the analytics dashboard
    Dashboard,
    /// List users
    Users(UsersArgs),
    /// List communities
    Communities(TableArgs),
    /// List attestations
    Attestations(AttestationArgs),
    /// Search user profiles by name
    Search {
        name: Option<String>,
    },
    /// Grant or revoke a user's admin role
    ToggleRole {
        user_id: i64,
    },
    /// Add a user to a community
    AddMember {
        community_id: i64,
        user_id: i64,
        #[arg(long, value_enum, default_value_t)]
        role: RoleArg,
    },
    /// Remove a member from a community
    RemoveMember {
        community_id: i64,
        member_id: i64,
    },
    /// Require an attestation to join a community
    AddEntryAttestation {
        community_id: i64,
        attestation_id: i64,
    },
    /// Drop an entry attestation from a community
    RemoveEntryAttestation {
        community_id: i64,
        attestation_id: i64,
    },
    /// Flip whether an entry attestation is required
    ToggleEntryAttestation {
        community_id: i64,
        entry_id: i64,
    },
    /// Download the analytics report as CSV
    Report {
        #[arg(long, short, default_value = REPORT_FILE_NAME)]
        output: PathBuf,
    },
    /// Serve the report download endpoint locally
    ServeReport {
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: SocketAddr,
    },
    /// Check that the API accepts the session
    CheckAuth,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    paths::rotate_logs();
    let Some(path) = paths::log_file() else {
        return;
    };
    if let Some(dir) = path.parent() {
        if std::fs::create_dir_all(dir).is_err() {
            return;
        }
    }
    let Ok(file) = File::create(&path) else {
        return;
    };
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let _ = WriteLogger::init(level, simplelog::Config::default(), file);
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = Config::resolve(&cli.connection)?;
    log::info!("using API at {}", config.api_url);
    let console = AdminConsole::new(config.client()?);

    match cli.command {
        Command::Dashboard => commands::dashboard(&console).await,
        Command::Users(args) => commands::users(&console, &args).await,
        Command::Communities(args) => commands::communities(&console, &args).await,
        Command::Attestations(args) => commands::attestations(&console, &args).await,
        Command::Search { name } => commands::search(&console, name.as_deref()).await,
        Command::ToggleRole { user_id } => commands::toggle_role(&console, user_id).await,
        Command::AddMember {
            community_id,
            user_id,
            role,
        } => commands::add_member(&console, community_id, user_id, role).await,
        Command::RemoveMember {
            community_id,
            member_id,
        } => commands::remove_member(&console, community_id, member_id).await,
        Command::AddEntryAttestation {
            community_id,
            attestation_id,
        } => commands::add_entry_attestation(&console, community_id, attestation_id).await,
        Command::RemoveEntryAttestation {
            community_id,
            attestation_id,
        } => commands::remove_entry_attestation(&console, community_id, attestation_id).await,
        Command::ToggleEntryAttestation {
            community_id,
            entry_id,
        } => commands::toggle_entry_attestation(&console, community_id, entry_id).await,
        Command::Report { output } => commands::report(&console, &output).await,
        Command::ServeReport { addr } => commands::serve_report(&console, addr).await,
        Command::CheckAuth => commands::check_auth(&console).await,
    }
}
