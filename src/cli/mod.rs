// Operator CLI for tasks with no self-service path: bootstrapping the first
// ADMIN account and mass session revocation. Talks to the database directly,
// not through the HTTP API.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use crate::config;
use crate::database::Database;
use crate::services::user_service::{validate_password, UserService};

#[derive(Parser)]
#[command(name = "opsdesk")]
#[command(about = "opsdesk CLI - operator tasks for the help-desk portal backend")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Create the first ADMIN account")]
    InitAdmin {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    #[command(about = "Invalidate every outstanding session for a user")]
    RevokeSessions {
        #[arg(long)]
        email: String,
    },

    #[command(about = "Check database connectivity")]
    Health,
}

pub async fn run(cli: Cli) -> Result<()> {
    let db = Database::new(&config::config().database);

    match cli.command {
        Commands::InitAdmin { name, email, password } => {
            if let Err(reason) = validate_password(&password) {
                bail!(reason);
            }
            let pool = db.pool().await.context("database unavailable")?;
            let users = UserService::new(pool);
            let user = users
                .create_admin(&name, &email, &password)
                .await
                .context("failed to create admin account")?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({ "id": user.id, "email": user.email, "role": user.role })
                );
            } else {
                println!("Created ADMIN account {} ({})", user.email, user.id);
            }
        }

        Commands::RevokeSessions { email } => {
            let pool = db.pool().await.context("database unavailable")?;
            let users = UserService::new(pool);
            let user = users
                .find_by_email(&email)
                .await
                .context("user lookup failed")?
                .with_context(|| format!("no user with email {}", email))?;
            let version = users
                .revoke_sessions(user.id)
                .await
                .context("failed to revoke sessions")?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({ "email": email, "token_version": version })
                );
            } else {
                println!("Sessions revoked for {} (token_version now {})", email, version);
            }
        }

        Commands::Health => match db.health_check().await {
            Ok(()) => println!("database: ok"),
            Err(e) => {
                bail!("database: {}", e);
            }
        },
    }

    Ok(())
}
