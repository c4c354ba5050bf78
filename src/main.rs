//! chatcount CLI - room discovery and post counting for Glip teams

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chatcount::auth::{self, FileTokenStore, SessionManager, TokenStore};
use chatcount::config::Config;
use chatcount::engine::{CountRequest, DiscoveryRequest, Engine};
use chatcount::error::RequestError;

#[derive(Parser)]
#[command(name = "chatcount")]
#[command(about = "Count per-user post activity across Glip team rooms", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a login: print the authorize URL and the session ID
    Login,

    /// Finish a login with the code from the OAuth redirect
    Complete {
        /// Authorization code from the redirect
        #[arg(long)]
        code: String,

        /// State parameter from the redirect (the session ID)
        #[arg(long)]
        state: String,
    },

    /// List stored sessions and their token expiry
    Status,

    /// Remove one session's stored credentials
    Logout {
        /// Session ID to forget
        session: String,
    },

    /// Discover which team rooms the given users posted in
    Discover {
        /// Range start (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        from: String,

        /// Range end (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        to: String,

        /// User IDs to look for (repeatable)
        #[arg(long = "user", required = true)]
        users: Vec<String>,

        /// Session ID from `login`
        #[arg(long)]
        session: String,
    },

    /// Count per-user posts in the given rooms
    Count {
        /// Range start (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        from: String,

        /// Range end (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        to: String,

        /// Room IDs to count in (repeatable)
        #[arg(long = "room", required = true)]
        rooms: Vec<String>,

        /// User IDs to count for (repeatable)
        #[arg(long = "user", required = true)]
        users: Vec<String>,

        /// Session ID from `login`
        #[arg(long)]
        session: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = Config::load()?;
    let store = FileTokenStore::load(config.token_store_path()?);
    let engine = Engine::new(SessionManager::new(config.clone(), store));

    match cli.command {
        Commands::Login => {
            let (url, session_id) = auth::authorize_url(&config)?;
            println!();
            println!("To sign in, visit: {}", url);
            println!("Session ID:        {}", session_id);
            println!();
            println!("Then run: chatcount complete --code <code> --state {}", session_id);
        }
        Commands::Complete { code, state } => {
            let mut store = engine.sessions().store().await;
            auth::complete_login(&config, &mut *store, &code, &state).await?;
            println!("Login successful for session {}.", state);
        }
        Commands::Status => {
            let store = engine.sessions().store().await;
            let sessions = store.sessions();
            if sessions.is_empty() {
                println!("No stored sessions. Run 'chatcount login' to authenticate.");
            }
            for session_id in sessions {
                match store.get(&session_id) {
                    Some(record) => {
                        let state = if record.needs_refresh() {
                            "needs refresh"
                        } else {
                            "valid"
                        };
                        match record.expires_at {
                            Some(exp) => {
                                println!("{}  {} (expires_at {})", session_id, state, exp)
                            }
                            None => println!("{}  {}", session_id, state),
                        }
                    }
                    None => println!("{}  missing", session_id),
                }
            }
        }
        Commands::Logout { session } => {
            engine.sessions().store().await.remove(&session)?;
            println!("Forgot session {}.", session);
        }
        Commands::Discover {
            from,
            to,
            users,
            session,
        } => {
            let req = DiscoveryRequest {
                start_date: from,
                end_date: to,
                user_ids: users,
                session_id: session,
            };
            match engine.discover(&req).await {
                Ok(resp) => {
                    println!("{}", serde_json::to_string_pretty(&resp)?);
                }
                Err(e) => report_failure(e),
            }
        }
        Commands::Count {
            from,
            to,
            rooms,
            users,
            session,
        } => {
            let req = CountRequest {
                start_date: from,
                end_date: to,
                meeting_rooms: rooms,
                user_ids: users,
                session_id: session,
            };
            match engine.count(&req).await {
                Ok(resp) => {
                    println!("{}", serde_json::to_string_pretty(&resp)?);
                }
                Err(e) => report_failure(e),
            }
        }
    }

    Ok(())
}

/// Print an engine failure with its log trail. Unauthenticated is the
/// recoverable case and gets the re-auth hint instead of an error dump.
fn report_failure(err: RequestError) {
    if err.is_unauthenticated() {
        eprintln!("Session is not authenticated. Run 'chatcount login' first.");
    } else {
        eprintln!("Request failed: {}", err);
    }
    for line in &err.logs {
        eprintln!("  log: {}", line);
    }
    std::process::exit(1);
}
