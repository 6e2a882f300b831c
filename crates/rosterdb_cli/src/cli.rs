use clap::{Args, Parser, Subcommand};
use rosterdb_core::MemberSearchCondition;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Member/team roster search", long_about = None)]
pub struct Cli {
    /// JSON config file; its `db_path` is overridden by DB_PATH
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database file, created and upgraded on open
    pub db_path: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Insert teamA/teamB with member1..member4
    Seed,

    /// List every matching member, one JSON object per line
    Search {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// One page of matches with an explicit count query
    Page {
        #[arg(allow_negative_numbers = true)]
        number: i64,
        #[arg(allow_negative_numbers = true)]
        size: i64,
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// One page of matches; the count query is skipped when provable
    PageFast {
        #[arg(allow_negative_numbers = true)]
        number: i64,
        #[arg(allow_negative_numbers = true)]
        size: i64,
        #[command(flatten)]
        filters: FilterArgs,
    },
}

/// Search filters. Explicit flags override fields of `--where`.
#[derive(Args, Debug, Default, Clone)]
pub struct FilterArgs {
    /// Filter expression, e.g. `teamName="team A" ageGoe=20`
    #[arg(long = "where", value_name = "EXPR")]
    pub expression: Option<MemberSearchCondition>,

    #[arg(long)]
    pub username: Option<String>,

    #[arg(long)]
    pub team_name: Option<String>,

    /// Minimum age, inclusive
    #[arg(long)]
    pub age_goe: Option<i32>,

    /// Maximum age, inclusive
    #[arg(long)]
    pub age_loe: Option<i32>,
}

impl FilterArgs {
    pub fn into_condition(self) -> MemberSearchCondition {
        let mut condition = self.expression.unwrap_or_default();
        if let Some(username) = self.username {
            condition = condition.with_username(username);
        }
        if let Some(team_name) = self.team_name {
            condition = condition.with_team_name(team_name);
        }
        if let Some(age) = self.age_goe {
            condition = condition.with_age_goe(age);
        }
        if let Some(age) = self.age_loe {
            condition = condition.with_age_loe(age);
        }
        condition
    }
}
