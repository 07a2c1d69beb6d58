//! Command-line smoke tool over `datajpa_core`.
//!
//! # Responsibility
//! - Open (and migrate) a member/team database file.
//! - Run single repository operations and print results as JSON lines.

use clap::{Parser, Subcommand};
use datajpa_core::db::open_db;
use datajpa_core::{
    init_logging, LogLevel, LoggingError, Member, MemberRepository, PageRequest,
    SqliteMemberRepository, SqliteTeamRepository, Team, TeamRepository,
};
use log::error;
use serde_json::json;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "datajpa")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// SQLite database file; created and migrated when missing
    #[arg(long, global = true, env = "DATAJPA_DB", default_value = "datajpa.db")]
    db: PathBuf,

    /// Log level (trace|debug|info|warn|error); defaults to debug in debug builds
    /// and info in release builds
    #[arg(
        long,
        global = true,
        env = "DATAJPA_LOG_LEVEL",
        default_value_t = LogLevel::build_default(),
        value_parser = parse_log_level
    )]
    log_level: LogLevel,

    /// Absolute directory for rotated log files; logging is off when unset
    #[arg(long, global = true, env = "DATAJPA_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Insert two teams and four members
    Seed,
    /// Print every member
    List,
    /// Count members, optionally only those of one age
    Count {
        #[arg(long)]
        age: Option<i32>,
    },
    /// Print one page of members of exactly `age`
    Page {
        #[arg(long)]
        age: i32,
        #[arg(long, default_value_t = 0)]
        offset: u64,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Print one numbered page with totals
    PageNumber {
        #[arg(long)]
        age: i32,
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        size: u32,
    },
    /// Add one to the age of every member at or above `threshold`
    BulkAgePlus {
        #[arg(long)]
        threshold: i32,
    },
}

fn parse_log_level(value: &str) -> Result<LogLevel, String> {
    value.parse().map_err(|err: LoggingError| err.to_string())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_ref() {
        if let Err(err) = init_logging(cli.log_level, log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_command module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut conn = open_db(&cli.db)?;

    match cli.command {
        Command::Seed => {
            let tx = conn.transaction()?;
            {
                let teams = SqliteTeamRepository::try_new(&tx)?;
                let members = SqliteMemberRepository::try_new(&tx)?;
                let team_a = teams.save(&Team::new("teamA"))?;
                let team_b = teams.save(&Team::new("teamB"))?;
                for (username, age, team) in [
                    ("member1", 10, &team_a),
                    ("member2", 20, &team_a),
                    ("member3", 30, &team_b),
                    ("member4", 40, &team_b),
                ] {
                    let saved = members.save(&Member::with_team(username, age, team)?)?;
                    println!("{}", serde_json::to_string(&saved)?);
                }
            }
            tx.commit()?;
        }
        Command::List => {
            let members = SqliteMemberRepository::try_new(&conn)?;
            for member in members.find_all()? {
                let team = members.team_of(&member)?;
                println!("{}", json!({ "member": member, "team": team }));
            }
        }
        Command::Count { age } => {
            let members = SqliteMemberRepository::try_new(&conn)?;
            let count = match age {
                Some(age) => members.total_count_by_age(age)?,
                None => members.total_count()?,
            };
            println!("{}", json!({ "age": age, "count": count }));
        }
        Command::Page { age, offset, limit } => {
            let members = SqliteMemberRepository::try_new(&conn)?;
            for member in members.find_by_page(age, offset, limit)? {
                println!("{}", serde_json::to_string(&member)?);
            }
        }
        Command::PageNumber { age, page, size } => {
            let members = SqliteMemberRepository::try_new(&conn)?;
            let page = members.find_page_by_age(age, PageRequest::of(page, size))?;
            println!("{}", serde_json::to_string(&page)?);
        }
        Command::BulkAgePlus { threshold } => {
            let members = SqliteMemberRepository::try_new(&conn)?;
            let affected = members.bulk_age_plus(threshold)?;
            println!("{}", json!({ "threshold": threshold, "affected": affected }));
        }
    }

    Ok(())
}
