// src/main.rs
// =============================================================================
// Entry point of the linkcheck CLI.
//
// What happens here:
// 1. Parse command-line arguments and set up logging
// 2. Open the record source (MySQL or a JSON file), read all rows, close it
// 3. Check every link concurrently, logging each result as it completes
// 4. Print a summary and exit (0 = finished, 2 = fatal error, 130 = Ctrl+C)
//
// Broken links do not change the exit code: finding them is the job, and the
// logs are where they are reported.
// =============================================================================

mod checker;
mod cli;
mod logging;
mod provider;
mod record;
mod report;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use checker::{CheckRunner, HttpProber, ProberConfig, RunSummary, RunnerConfig, SuccessPolicy};
use cli::{CheckArgs, Cli, MySqlArgs, Source};
use provider::{FileProvider, MySqlProvider, MySqlSettings, RecordProvider};
use record::LinkRecord;
use report::{Fanout, JsonLinesSink, LogSink};

const EXIT_OK: i32 = 0;
const EXIT_FATAL: i32 = 2;
const EXIT_INTERRUPTED: i32 = 130;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Keep the guard until the very end so the log file gets flushed
    let guard = match logging::init(cli.check.verbose, &cli.check.log_dir) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(EXIT_FATAL);
        }
    };

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            EXIT_FATAL
        }
    };

    // process::exit skips destructors, so flush the log writer first
    drop(guard);
    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> Result<i32> {
    print_banner(&cli.check);

    // Nothing is checked (and no sink exists) unless the source loads
    let records = load_records(cli.source).await?;
    info!("Checking {} link(s)", records.len());

    let runner = build_runner(&cli.check)?;
    let mut sink = build_sink(&cli.check);

    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted: finishing links already in progress, skipping the rest");
                cancel.cancel();
            }
        })
    };

    let summary = runner.run(records, &mut sink, &cancel).await;
    ctrl_c.abort();

    print_summary(&summary);

    if summary.cancelled > 0 {
        warn!("Job cancelled - {} link(s) not checked", summary.cancelled);
        return Ok(EXIT_INTERRUPTED);
    }

    info!("Job finished");
    eprintln!("Job finished - Goodbye");
    Ok(EXIT_OK)
}

// Reads every row up front and releases the source before probing starts
async fn load_records(source: Source) -> Result<Vec<LinkRecord>> {
    let mut provider = open_provider(source).await?;

    let rows = provider.next_records().await;
    if let Err(e) = provider.close().await {
        warn!("Could not close record source cleanly: {}", e);
    }
    let rows = rows.context("could not read link records")?;

    Ok(record::ingest(rows))
}

// Opens whichever source the user picked.
// A failure here is fatal: nothing has been checked yet.
async fn open_provider(source: Source) -> Result<Box<dyn RecordProvider>> {
    match source {
        Source::Mysql(args) => {
            // dialoguer prompts block on stdin, keep them off the async workers
            let settings = tokio::task::spawn_blocking(move || mysql_settings(args))
                .await
                .context("prompt task failed")??;

            let provider = MySqlProvider::open(&settings)
                .await
                .context("could not open the Moodle database")?;
            Ok(Box::new(provider))
        }
        Source::File { path } => Ok(Box::new(FileProvider::new(path))),
    }
}

// Fills in missing connection parameters by asking on the terminal
fn mysql_settings(args: MySqlArgs) -> Result<MySqlSettings> {
    use dialoguer::{Input, Password};

    let host = match args.host {
        Some(host) => host,
        None => Input::<String>::new()
            .with_prompt("MySQL database address")
            .default("localhost".to_string())
            .interact_text()
            .context("no database address (use --host or LINKCHECK_DB_HOST)")?,
    };

    let database = match args.database {
        Some(database) => database,
        None => Input::<String>::new()
            .with_prompt("MySQL database name")
            .interact_text()
            .context("no database name (use --database or LINKCHECK_DB_NAME)")?,
    };

    let user = match args.user {
        Some(user) => user,
        None => Input::<String>::new()
            .with_prompt("MySQL database username")
            .interact_text()
            .context("no database username (use --user or LINKCHECK_DB_USER)")?,
    };

    let password = match args.password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("MySQL database password")
            .allow_empty_password(true)
            .interact()
            .context("no database password (use --password or LINKCHECK_DB_PASSWORD)")?,
    };

    Ok(MySqlSettings {
        host,
        port: args.port,
        database,
        user,
        password,
        table: args.table,
        connect_timeout: Duration::from_secs(args.connect_timeout_secs),
    })
}

fn build_runner(args: &CheckArgs) -> Result<CheckRunner> {
    let success_policy = if args.strict_ok {
        SuccessPolicy::ExactOk
    } else {
        SuccessPolicy::Any2xx
    };

    let prober = HttpProber::new(&ProberConfig {
        max_redirects: args.max_redirects,
        success_policy,
        ..ProberConfig::default()
    })
    .context("could not create HTTP client")?;

    Ok(CheckRunner::new(
        Arc::new(prober),
        RunnerConfig {
            max_concurrency: usize::from(args.concurrency),
            timeout: Duration::from_secs(args.timeout_secs),
        },
    ))
}

fn build_sink(args: &CheckArgs) -> Fanout {
    let sink = Fanout::new().with(LogSink::new(args.course_url_template.clone()));
    if args.json {
        sink.with(JsonLinesSink::new(std::io::stdout()))
    } else {
        sink
    }
}

// Banner goes to stderr so --json output on stdout stays clean
fn print_banner(args: &CheckArgs) {
    eprintln!();
    eprintln!("Link Health Check for Moodle");
    if args.verbose == 0 {
        eprintln!("Use -v for verbose mode, press Ctrl+C to cancel");
    }
    eprintln!();
}

fn print_summary(summary: &RunSummary) {
    info!(
        total = summary.total,
        ok = summary.ok,
        http_errors = summary.http_errors,
        malformed = summary.malformed,
        network_failures = summary.network_failures,
        cancelled = summary.cancelled,
        "Run summary"
    );

    eprintln!();
    eprintln!("📊 Summary:");
    eprintln!("   ✅ OK: {}", summary.ok);
    eprintln!("   💔 Broken: {}", summary.broken());
    eprintln!("   ❌ HTTP errors: {}", summary.http_errors);
    eprintln!("   ⚠️  Malformed URLs: {}", summary.malformed);
    eprintln!("   🌐 Network failures: {}", summary.network_failures);
    if summary.cancelled > 0 {
        eprintln!("   ⏹️  Not checked: {}", summary.cancelled);
    }
    eprintln!("   📋 Total: {}", summary.total);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_unreadable_source_is_fatal() {
        let source = Source::File {
            path: PathBuf::from("/definitely/not/here/links.json"),
        };

        let err = load_records(source).await.unwrap_err();
        assert!(format!("{:#}", err).contains("could not read link records"));
    }

    #[tokio::test]
    async fn test_unreachable_database_is_fatal() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        // Every setting is given, so no prompt is shown
        let source = Source::Mysql(MySqlArgs {
            host: Some("127.0.0.1".to_string()),
            port,
            database: Some("moodle".to_string()),
            user: Some("audit".to_string()),
            password: Some(String::new()),
            table: "mdl_url".to_string(),
            connect_timeout_secs: 2,
        });

        let err = load_records(source).await.unwrap_err();
        assert!(format!("{:#}", err).contains("could not open the Moodle database"));
    }

    #[tokio::test]
    async fn test_file_source_loads_records() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": 1, "owner_id": 4, "name": "Notes", "url": "https://example.com"}},
                {{"id": 2, "owner_id": 4, "name": "Gone", "url": null}}]"#
        )
        .unwrap();

        let records = load_records(Source::File {
            path: file.path().to_path_buf(),
        })
        .await
        .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id(), 1);
    }
}
