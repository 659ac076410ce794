//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `projecthub_core` linkage, configuration and storage bootstrap.
//! - Issue password-reset links with the configured TTL and link base.
//! - Keep output deterministic for quick local sanity checks.

use clap::{Parser, Subcommand};
use log::error;
use projecthub_core::clock::now_epoch_ms;
use projecthub_core::db::migrations::latest_version;
use projecthub_core::db::{open_db, open_db_in_memory};
use projecthub_core::{
    init_logging, CoreConfig, PasswordReset, PasswordResetService, ProjectService,
    SqliteAccountRepository, SqliteProjectRepository, SqliteTagRepository, TagService,
};
use rusqlite::Connection;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "projecthub")]
#[command(about = "Smoke checks for the projecthub core")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print schema version, settings and active project tags (default)
    Status,
    /// Issue a password-reset token and print the reset link
    ResetPassword {
        /// E-mail address of the account
        email: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    println!("projecthub_core ping={}", projecthub_core::ping());
    println!("projecthub_core version={}", projecthub_core::core_version());

    match run(cli.command.unwrap_or(Commands::Status)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_run module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    let config = CoreConfig::from_env()?;
    if let Some(log_dir) = config.log_dir.as_deref() {
        init_logging(&config.log_level, log_dir)?;
    }

    let mut conn = match config.db_path.as_deref() {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };

    match command {
        Commands::Status => status(&mut conn, &config),
        Commands::ResetPassword { email } => reset_password(&mut conn, &config, &email),
    }
}

fn status(conn: &mut Connection, config: &CoreConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("projecthub_core schema_version={}", latest_version());
    println!(
        "projecthub_core max_tags_per_project={} reset_token_ttl_ms={}",
        config.max_tags_per_project, config.reset_token_ttl_ms
    );

    let active = {
        let projects = ProjectService::new(SqliteProjectRepository::try_new(conn)?);
        projects.list_projects(false)?
    };
    println!("projecthub_core active_projects={}", active.len());

    let tags = TagService::from_config(SqliteTagRepository::try_new(conn)?, config);
    for project in &active {
        let status = tags.status(project.id)?;
        println!(
            "projecthub_core project={} tags=\"{}\" remaining={}",
            project.id,
            tags.tag_list(project.id)?,
            status.remaining
        );
    }
    Ok(())
}

fn reset_password(
    conn: &mut Connection,
    config: &CoreConfig,
    email: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let repo = SqliteAccountRepository::try_new(conn)?;
    let mut service = PasswordResetService::from_config(repo, config);
    let reset =
        service.refresh_token_and_email_link(&PasswordReset::new(email), now_epoch_ms())?;
    println!(
        "projecthub_core reset_link={} expires_at={}",
        reset.link, reset.expires_at
    );
    Ok(())
}
