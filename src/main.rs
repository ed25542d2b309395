mod cli;
mod config;
mod db;
mod engine;
mod error;
mod models;
mod session;
mod tui;
mod utils;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use rusqlite::Connection;

use cli::args::{Cli, Commands};
use cli::handlers;
use config::AppConfig;
use db::migrations::run_migrations;
use db::repository::{MetaRepo, Namespace};
use session::Session;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Loading config")?;

    AppConfig::ensure_data_dir()?;
    let db_path = AppConfig::db_path()?;
    let conn = Connection::open(&db_path)
        .with_context(|| format!("Opening database at {:?}", db_path))?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    run_migrations(&conn)?;

    let email = Namespace::new(cli.user.as_deref().unwrap_or(&config.profile.email))
        .email()
        .to_string();
    MetaRepo::set(&conn, "last_user", &email)?;
    log::debug!("using namespace {}", email);

    let Some(cmd) = cli.command else {
        return tui::app::run(conn, config, email);
    };

    match cmd {
        Commands::Users => return handlers::handle_users(&conn, &email),
        Commands::Config { init } => return handlers::handle_config(&conn, &config, init),
        _ => {}
    }

    let mut session = Session::load(&conn, &email, Local::now().date_naive(), config.profile.seed_examples)?;

    match cmd {
        Commands::Add {
            title,
            category,
            difficulty,
            reminders,
            emoji,
        } => handlers::handle_add(&conn, &mut session, &title, &category, &difficulty, &reminders, emoji),
        Commands::List { all } => handlers::handle_list(&session, &config, all),
        Commands::Done { habit, date } => {
            handlers::handle_done(&conn, &mut session, &habit, date.as_deref())
        }
        Commands::Edit {
            habit,
            title,
            category,
            difficulty,
            reminders,
            clear_reminders,
            freezes,
            goal,
            emoji,
        } => handlers::handle_edit(
            &conn,
            &mut session,
            &habit,
            title,
            category,
            difficulty.as_deref(),
            &reminders,
            clear_reminders,
            freezes,
            goal,
            emoji,
        ),
        Commands::Note { habit, text, date } => {
            handlers::handle_note(&conn, &mut session, &habit, &text, date.as_deref())
        }
        Commands::Archive { habit, undo } => handlers::handle_archive(&conn, &mut session, &habit, undo),
        Commands::Delete { habit } => handlers::handle_delete(&conn, &mut session, &habit),
        Commands::Move { habit, position } => {
            handlers::handle_move(&conn, &mut session, &habit, position)
        }
        Commands::Reorder { habits } => handlers::handle_reorder(&conn, &mut session, &habits),
        Commands::Stats { week } => handlers::handle_stats(&session, &config, week),
        Commands::Heatmap => handlers::handle_heatmap(&session),
        Commands::Coach => handlers::handle_coach(&session),
        Commands::Level => handlers::handle_level(&session),
        Commands::Badges => handlers::handle_badges(&session),
        Commands::Notifications { action } => {
            handlers::handle_notifications(&conn, &mut session, action.as_ref())
        }
        Commands::Remind { watch } => handlers::handle_remind(&conn, &mut session, &config, watch),
        Commands::Export { json } => handlers::handle_export(&conn, &session, &config, json),
        Commands::ResetXp { yes } => handlers::handle_reset_xp(&conn, &mut session, yes),
        Commands::ClearData { yes } => handlers::handle_clear_data(&conn, &session, yes),
        Commands::Users | Commands::Config { .. } => Ok(()),
    }
}
