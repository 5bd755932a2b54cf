// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use speakup_agent::app::{create_router, AppState, VERSION};
use speakup_agent::models::member::UpdateMemberRequest;
use speakup_agent::routes::AuthState;
use speakup_agent::services::auth::AuthConfig;
use speakup_agent::services::auth_db::AuthDbClient;
use speakup_agent::services::db::{CreateMemberParams, Db};
use speakup_agent::services::email::{EmailConfig, EmailService};
use speakup_agent::services::logging::anonymize_email;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "speakup-agent", version = VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },
    /// Create an officer account, or promote an existing member
    SeedOfficer {
        #[arg(long)]
        email: String,
        #[arg(long)]
        display_name: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let db = Db::connect(&database_url)
        .await
        .context("Failed to connect to PostgreSQL")?;

    db.migrate().await.context("Failed to run migrations")?;

    match cli.command.unwrap_or(Command::Serve { port: 3000 }) {
        Command::Serve { port } => serve(db, port).await,
        Command::SeedOfficer {
            email,
            display_name,
        } => seed_officer(db, &email, display_name.as_deref()).await,
    }
}

async fn serve(db: Db, port: u16) -> Result<()> {
    let email_config = EmailConfig::from_env().context("Invalid email configuration")?;
    let email = Arc::new(EmailService::new(email_config).context("Failed to set up SMTP")?);

    let auth_db = AuthDbClient::new(db.pool().clone());
    let auth_state = AuthState::new(auth_db, email.clone(), AuthConfig::from_env());

    let state = AppState {
        db,
        email,
        auth_state,
    };

    let app = create_router(state);

    // Bind to 0.0.0.0 to accept connections from any network interface (required for Docker)
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    println!("speakup-agent v{} listening on {}", VERSION, addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

/// Bootstrap an officer account so the club can be administered on a fresh
/// install.
async fn seed_officer(db: Db, email: &str, display_name: Option<&str>) -> Result<()> {
    let email = email.trim().to_lowercase();

    if let Some(existing) = db
        .get_member_by_email(&email)
        .await
        .context("Failed to look up member")?
    {
        if existing.is_officer {
            println!("Officer already exists: {}", anonymize_email(&email));
            return Ok(());
        }
        db.update_member(
            existing.member_id,
            &UpdateMemberRequest {
                is_officer: Some(true),
                is_guest: Some(false),
                ..Default::default()
            },
        )
        .await
        .context("Failed to promote member")?;
        println!("Promoted member to officer: {}", anonymize_email(&email));
        return Ok(());
    }

    let fallback = email.split('@').next().unwrap_or(&email).to_string();
    let display_name = display_name.unwrap_or(&fallback);

    db.create_member(&CreateMemberParams {
        email: &email,
        display_name,
        first_name: "",
        last_name: "",
        phone_number: "",
        is_guest: false,
        is_officer: true,
        join_date: None,
    })
    .await
    .context("Failed to create officer")?;

    println!("Created officer: {}", anonymize_email(&email));
    Ok(())
}
