//! Rapport Router CLI
//!
//! Starts the friendship HTTP server, or issues a test token.

use rapport_domain::UserId;
use rapport_router::{config::RouterConfig, session::SessionManager, start_server, RouterError};
use std::env;
use std::process;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Value following `flag` on the command line
fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

async fn run() -> Result<(), RouterError> {
    let args: Vec<String> = env::args().skip(1).collect();

    if args.iter().any(|arg| arg == "--help") {
        print_help();
        return Ok(());
    }

    let config = match flag_value(&args, "--config") {
        Some(path) => RouterConfig::from_file(path)?,
        None => {
            eprintln!("Warning: No config file specified, using default test configuration");
            eprintln!("Usage: rapport-router --config <path-to-config.toml>");
            eprintln!();
            RouterConfig::default_test_config()
        }
    };

    if let Some(user) = flag_value(&args, "--issue-token") {
        let user = UserId::parse(user).map_err(RouterError::InvalidArgument)?;
        let manager = SessionManager::new(&config.jwt_secret, config.token_expiry_secs);
        println!("{}", manager.generate_token(user)?);
        return Ok(());
    }

    start_server(config).await
}

fn print_help() {
    println!("Rapport Router - Friendship Requests over HTTP");
    println!();
    println!("USAGE:");
    println!("    rapport-router --config <path-to-config.toml>");
    println!("    rapport-router --config <path-to-config.toml> --issue-token <user-id>");
    println!();
    println!("OPTIONS:");
    println!("    --config <file>          Load configuration from TOML file");
    println!("    --issue-token <user-id>  Print a bearer token for the given user and exit");
    println!("    --help                   Print this help message");
    println!();
    println!("CONFIGURATION:");
    println!("    The TOML config file should contain:");
    println!("    - bind_address: IP address to bind (e.g., '127.0.0.1')");
    println!("    - bind_port: Port number (e.g., 8080)");
    println!("    - jwt_secret: Secret shared with the identity layer");
    println!("    - token_expiry_secs: Expiry of issued tokens (default: 3600)");
    println!("    - database_path: SQLite file (default: 'rapport.db')");
    println!("    - login_path: Redirect for unauthenticated browsers (default: '/login')");
    println!();
    println!("LOGGING:");
    println!("    Set RUST_LOG (e.g., 'rapport_engine=debug') to adjust verbosity.");
    println!();
}
