// src/cli.rs
// =============================================================================
// Command-line interface, defined with clap's derive API.
//
//   linkcheck [-v] [--concurrency N] ... mysql [--host H] [--database D] ...
//   linkcheck [-v] ... file rows.json
//
// Database settings can also come from LINKCHECK_DB_* environment variables.
// Anything still missing is asked for interactively (see main.rs).
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "linkcheck",
    version,
    about = "Audit stored external links and report the broken ones",
    long_about = "linkcheck reads external URL resources (for example Moodle's mdl_url table), \
                  sends a HEAD request to each one and logs which are unreachable, \
                  with a link to the course that needs fixing."
)]
pub struct Cli {
    #[command(flatten)]
    pub check: CheckArgs,

    #[command(subcommand)]
    pub source: Source,
}

/// Options shared by every record source
#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Show more on the console (-v: every checked link, -vv: debug)
    ///
    /// The log file always gets everything.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Maximum number of links checked at the same time
    #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u16).range(1..), global = true)]
    pub concurrency: u16,

    /// Seconds to wait for each link before giving up
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u64).range(1..), global = true)]
    pub timeout_secs: u64,

    /// Redirects to follow before counting the link as failed
    #[arg(long, default_value_t = 10, global = true)]
    pub max_redirects: usize,

    /// Only count 200 OK as success (by default any 2xx is fine)
    #[arg(long, global = true)]
    pub strict_ok: bool,

    /// Directory for the daily log files
    #[arg(long, default_value = "logs", global = true)]
    pub log_dir: PathBuf,

    /// Also print every result as a JSON line on stdout
    #[arg(long, global = true)]
    pub json: bool,

    /// Link shown next to broken records; {owner} is replaced by the owner id
    #[arg(
        long,
        env = "LINKCHECK_COURSE_URL",
        default_value = "https://moodle.example.com/course/view.php?id={owner}",
        global = true
    )]
    pub course_url_template: String,
}

#[derive(Subcommand, Debug)]
pub enum Source {
    /// Read links from a Moodle MySQL database
    ///
    /// Example: linkcheck mysql --host db.internal --database moodle --user audit
    Mysql(MySqlArgs),

    /// Read links from a JSON file of {id, owner_id, name, url} rows
    ///
    /// Example: linkcheck file links.json
    File {
        /// Path to the JSON file
        path: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct MySqlArgs {
    /// Database server address (prompted if missing)
    #[arg(long, env = "LINKCHECK_DB_HOST")]
    pub host: Option<String>,

    /// Database server port
    #[arg(long, env = "LINKCHECK_DB_PORT", default_value_t = 3306)]
    pub port: u16,

    /// Database name (prompted if missing)
    #[arg(long, env = "LINKCHECK_DB_NAME")]
    pub database: Option<String>,

    /// Database username (prompted if missing)
    #[arg(long, env = "LINKCHECK_DB_USER")]
    pub user: Option<String>,

    /// Database password (prompted if missing)
    #[arg(long, env = "LINKCHECK_DB_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Table holding the URL resources
    #[arg(long, default_value = "mdl_url")]
    pub table: String,

    /// Seconds to wait for the database connection
    #[arg(long, default_value_t = 10)]
    pub connect_timeout_secs: u64,
}
