//! Campus Auth token issuer
//!
//! Mints a long-lived access token for tooling and scripted clients,
//! creating the target account first when it does not exist.
//!
//! ## Usage
//!
//! ```text
//! issue-token <email> [--password ...] [--full-name ...] [--roles admin,teacher]
//! ```

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{error, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use campus_auth_core::services::{AuthService, ProvisionRequest};
use campus_auth_core::store::CredentialStore;
use campus_auth_core::{config, store};
use campus_auth_shared::Role;

/// Lifetime of tokens minted by this tool
const CLI_TOKEN_TTL_SECS: i64 = 86_400; // 24 hours

#[derive(Parser)]
#[command(name = "issue-token")]
#[command(about = "Mint a long-lived access token, creating the account when needed")]
#[command(version)]
struct Cli {
    /// Email of the account to issue the token for
    email: String,

    /// Password for the account, required when it does not exist yet
    #[arg(long)]
    password: Option<String>,

    /// Full name for the account, required when it does not exist yet
    #[arg(long)]
    full_name: Option<String>,

    /// Roles for a newly created account, comma-separated
    /// (admin, teacher, superUser, student)
    #[arg(long, value_delimiter = ',')]
    roles: Vec<Role>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing();

    let cli = Cli::parse();

    // Load configuration
    let config = config::AppConfig::load()?;

    // Validate production configuration
    if config::AppConfig::is_production() {
        validate_production_config(&config)?;
    }

    // Create database pool
    let pool = store::create_pool(&config.database.url, config.database.max_connections).await?;

    // Run migrations (skip in production if using separate migration job)
    if !config::AppConfig::is_production() {
        store::run_migrations(&pool).await?;
    }

    let credentials = store::PgCredentialStore::new(pool);
    let service = AuthService::from_config(Arc::new(credentials.clone()), &config.auth);

    // Creation inputs are only needed when the account does not exist;
    // anything not passed as a flag is prompted for, like the original
    // provisioning script.
    let existing = credentials.find_by_email(&cli.email).await?;
    let (password, full_name, roles) = if existing.is_some() {
        (String::new(), String::new(), Vec::new())
    } else {
        println!("User \"{}\" does not exist and will be created.", cli.email);

        let password = match cli.password {
            Some(password) => password,
            None => ask("Password: ")?,
        };
        let full_name = match cli.full_name {
            Some(name) => name,
            None => ask("Full name: ")?,
        };
        let roles = if cli.roles.is_empty() {
            let options = Role::ALL.map(|role| role.as_str()).join(", ");
            let input = ask(&format!(
                "Roles (comma-separated, options: {options}) [Enter for default: teacher]: "
            ))?;
            parse_roles(&input)?
        } else {
            cli.roles
        };

        (password, full_name, roles)
    };

    let response = service
        .provision_token(
            ProvisionRequest {
                email: cli.email,
                password,
                full_name,
                roles,
            },
            CLI_TOKEN_TTL_SECS,
        )
        .await?;

    println!("User: {} <{}>", response.user.full_name, response.user.email);
    println!("Id: {}", response.user.id);
    println!(
        "Roles: [{}]",
        response
            .user
            .roles
            .iter()
            .map(Role::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("\nToken:\n{}", response.token);

    Ok(())
}

/// Prompt on stdout and read one trimmed line from stdin
fn ask(prompt: &str) -> Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(answer.trim().to_string())
}

/// Parse a comma-separated role list; empty input means the default role
fn parse_roles(input: &str) -> Result<Vec<Role>> {
    if input.is_empty() {
        return Ok(Vec::new());
    }

    input
        .split(',')
        .map(|part| Role::parse(part).map_err(|e| anyhow::anyhow!(e)))
        .collect()
}

/// Initialize tracing/logging
///
/// Quiet by default so the token is the only stdout output; set
/// `RUST_LOG` to turn diagnostics back on.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "campus_auth_core=warn,sqlx=warn".into());

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config::AppConfig::is_production() {
        // JSON logging for production
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        // Pretty logging for development
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Validate configuration for production deployment
fn validate_production_config(config: &config::AppConfig) -> Result<()> {
    let mut errors = Vec::new();

    // Check JWT secret is not default
    if config.auth.secret.contains("development") || config.auth.secret.len() < 32 {
        errors.push("JWT secret must be at least 32 characters and not contain 'development'");
    }

    // Check database URL is not localhost in production
    if config.database.url.contains("localhost") || config.database.url.contains("127.0.0.1") {
        warn!("Database URL contains localhost - ensure this is intentional for production");
    }

    if !errors.is_empty() {
        for err in &errors {
            error!("Configuration error: {}", err);
        }
        anyhow::bail!("Invalid production configuration");
    }

    Ok(())
}
