//! CLI entry point for the roster store.
//!
//! Opens (and upgrades) a database file, optionally seeds sample data, and
//! runs list or paged member searches, printing JSON to stdout.

mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use log::info;
use rosterdb_core::db::open_db_with_config;
use rosterdb_core::{init_logging_from_config, load_config, CoreConfig, SqliteMemberService};
use std::error::Error;
use std::process::ExitCode;

type CliResult<T> = Result<T, Box<dyn Error>>;

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let mut config = match cli.config.as_deref() {
        Some(path) => load_config(path)?,
        None => CoreConfig::default(),
    };
    config.db_path = Some(cli.db_path);
    init_logging_from_config(&config)?;

    let conn = open_db_with_config(&config)?;
    let service = SqliteMemberService::sqlite(&conn, &config)?;

    match cli.command {
        Commands::Seed => seed(&service),
        Commands::Search { filters } => {
            for row in service.search(&filters.into_condition())? {
                println!("{}", serde_json::to_string(&row)?);
            }
            Ok(())
        }
        Commands::Page {
            number,
            size,
            filters,
        } => {
            let page = service.search_page(&filters.into_condition(), number, size)?;
            println!("{}", serde_json::to_string_pretty(&page)?);
            Ok(())
        }
        Commands::PageFast {
            number,
            size,
            filters,
        } => {
            let page =
                service.search_page_optimized_count(&filters.into_condition(), number, size)?;
            println!("{}", serde_json::to_string_pretty(&page)?);
            Ok(())
        }
    }
}

fn seed(service: &SqliteMemberService<'_>) -> CliResult<()> {
    let team_a = service.register_team("teamA")?;
    let team_b = service.register_team("teamB")?;
    for (username, age, team) in [
        ("member1", 10, &team_a),
        ("member2", 20, &team_a),
        ("member3", 30, &team_b),
        ("member4", 40, &team_b),
    ] {
        let member = service.register_member(username, age, Some(team.id))?;
        println!("{}", serde_json::to_string(&member)?);
    }
    info!("event=cli_seed module=cli status=ok teams=2 members=4");
    Ok(())
}
