//! qftpd command line front end
//!
//! Logs in to the remote API as a user and runs one filesystem command
//! through the same session machinery a protocol engine would use.
//!
//! Run with: cargo run --bin qftpd -- --user admin ls /

use anyhow::Context;
use clap::{Parser, Subcommand};
use qftpd::{
    Config, Credentials, Filesystem, LogFormat, OpenMode, RemoteAuthorizer, RestConnector, Session,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{error, info};

const COPY_CHUNK: usize = 64 * 1024;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<String>,

    /// Remote API base URL (overrides the configuration file)
    #[arg(long)]
    base_url: Option<String>,

    /// User to log in as
    #[arg(short, long)]
    user: String,

    /// Password of the user
    #[arg(short, long, env = "QFTPD_PASSWORD", hide_env_values = true)]
    password: String,

    /// Verbose logging (debug level)
    #[arg(short, long)]
    verbose: bool,

    /// Log format (json or text)
    #[arg(long)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the login banner
    Banner,
    /// List directory contents
    Ls {
        /// Remote directory path
        #[arg(default_value = ".")]
        path: String,
        /// Long listing format
        #[arg(short, long)]
        long: bool,
    },
    /// Download a file
    Get {
        /// Remote file path
        remote: String,
        /// Local file path
        local: PathBuf,
    },
    /// Upload a file
    Put {
        /// Local file path
        local: PathBuf,
        /// Remote file path
        remote: String,
    },
    /// Create directory
    Mkdir {
        /// Remote directory path
        path: String,
    },
    /// Remove directory
    Rmdir {
        /// Remote directory path
        path: String,
    },
    /// Remove file
    Rm {
        /// Remote file path
        path: String,
    },
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            std::process::exit(1);
        }
    };

    let _log_guard = match qftpd::logging::init(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        event = "client_starting",
        version = env!("CARGO_PKG_VERSION"),
        base_url = %config.api.base_url,
        "Starting qftpd"
    );

    if let Err(e) = run(args, config).await {
        error!(event = "command_failed", error = %e, "Command failed");
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    if let Some(base_url) = &args.base_url {
        config.api.base_url.clone_from(base_url);
    }
    if let Some(format) = args.log_format {
        config.logging.format = format;
    }
    if args.verbose {
        config.logging.level = "debug".to_string();
    }

    config.validate()?;
    Ok(config)
}

async fn run(args: Args, config: Config) -> anyhow::Result<()> {
    let connector = RestConnector::new(&config.api)?;
    let admin = Credentials::new(
        config.api.admin_user.clone(),
        config.api.admin_password.clone(),
    );
    let authorizer = Arc::new(RemoteAuthorizer::new(Arc::new(connector), admin));

    let mut session =
        Session::login(authorizer, &args.user, &args.password, config.filesystem).await?;

    let outcome = execute(&mut session, args.command).await;
    if outcome.is_ok() {
        println!("{}", session.quit_message());
    }
    session.finish();
    outcome
}

async fn execute(session: &mut Session, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Banner => {
            println!("{}", session.login_message().await?);
        }
        Command::Ls { path, long } => {
            let fs = session.filesystem().await?;
            let lines = if long {
                fs.list_long(&path).await?
            } else {
                fs.list_directory(&path).await?
            };
            for line in lines {
                println!("{}", line);
            }
        }
        Command::Get { remote, local } => {
            let fs = session.filesystem().await?;
            let mut handle = fs.open(&remote, OpenMode::Read).await?;
            let mut file = tokio::fs::File::create(&local)
                .await
                .with_context(|| format!("creating {}", local.display()))?;

            let mut buf = vec![0u8; COPY_CHUNK];
            loop {
                let n = handle.read(&mut buf).await?;
                if n == 0 {
                    break;
                }
                file.write_all(&buf[..n]).await?;
            }
            file.flush().await?;
            handle.close().await?;
        }
        Command::Put { local, remote } => {
            let mut file = tokio::fs::File::open(&local)
                .await
                .with_context(|| format!("opening {}", local.display()))?;
            let fs = session.filesystem().await?;
            let mut handle = fs.open(&remote, OpenMode::Write).await?;

            let mut buf = vec![0u8; COPY_CHUNK];
            loop {
                let n = file.read(&mut buf).await?;
                if n == 0 {
                    break;
                }
                handle.write(&buf[..n]).await?;
            }
            handle.close().await?;
        }
        Command::Mkdir { path } => {
            session.filesystem().await?.make_directory(&path).await?;
        }
        Command::Rmdir { path } => {
            session.filesystem().await?.remove_directory(&path).await?;
        }
        Command::Rm { path } => {
            session.filesystem().await?.remove_file(&path).await?;
        }
    }
    Ok(())
}
