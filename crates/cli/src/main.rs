//! Command-line checks for a Ghost site.
//!
//! Run with: `ghostkit <task> [--config <path>]`
//!
//! Settings come from `GHOST_*` environment variables (a `.env` file is
//! loaded first) or from a `ghostkit.toml`/`ghostkit.json` file. This is a
//! CLI tool, so `println!` and `eprintln!` are used for user-facing output;
//! diagnostics go through `tracing` to stderr.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, bail, Context};
use ghostkit_domain::{ClientConfig, MemberCounts, PostCounts};
use ghostkit_infra::{config, GhostAdminApi, ReadOperation, ReadOutput};
use serde_json::Value;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(e) => tracing::debug!(error = %e, "no .env file loaded"),
    }

    let args: Vec<String> = env::args().skip(1).collect();
    let task = args.first().map(String::as_str);

    let result = match task {
        Some("check") => run_check(&args[1..]).await,
        Some("stats") => run_stats(&args[1..]).await,
        Some("help" | "--help" | "-h") | None => {
            print_help();
            Ok(())
        }
        Some(unknown) => {
            eprintln!("Unknown task: {unknown}");
            eprintln!();
            print_help();
            Err(anyhow!("Unknown task"))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Task failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ghostkit_infra=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_help() {
    println!("ghostkit - Ghost Admin API checks");
    println!();
    println!("USAGE:");
    println!("    ghostkit <TASK> [--config <PATH>]");
    println!();
    println!("TASKS:");
    println!("    check     Validate credentials and print a short site summary");
    println!("    stats     Fetch every site statistic and print it as JSON");
    println!("    help      Show this help message");
    println!();
    println!("ENVIRONMENT:");
    println!("    GHOST_API_URL, GHOST_ADMIN_API_KEY          required unless a config file is used");
    println!("    GHOST_TIMEOUT_SECONDS, GHOST_ACCEPT_VERSION, GHOST_BATCH_MAX_PARALLEL");
    println!("    RUST_LOG                                    log filter (default: warn)");
}

/// Validate credentials, then print site, post and member totals.
async fn run_check(args: &[String]) -> anyhow::Result<()> {
    let api = connect(args)?;

    if !api.validate_credentials().await.context("Could not reach the site")? {
        api.close();
        bail!("The site rejected the Admin API key");
    }
    println!("✓ Credentials accepted by {}", api.client().base_url());

    let report = api
        .read_batch(vec![ReadOperation::Site, ReadOperation::PostsCount, ReadOperation::MembersCount])
        .await;

    for (operation, output) in report.succeeded() {
        match output {
            ReadOutput::Site(site) => {
                let title = site.get("title").and_then(Value::as_str).unwrap_or("(untitled)");
                let version = site.get("version").and_then(Value::as_str).unwrap_or("unknown");
                println!("  Site:    {title} (Ghost {version})");
            }
            ReadOutput::PostsCount(PostCounts { published, drafts, scheduled }) => {
                println!("  Posts:   {published} published, {drafts} drafts, {scheduled} scheduled");
            }
            ReadOutput::MembersCount(MemberCounts { total, paid, free, comped }) => {
                println!("  Members: {total} total ({paid} paid, {free} free, {comped} comped)");
            }
            other => tracing::debug!(%operation, ?other, "unexpected read output"),
        }
    }

    let failures: Vec<String> =
        report.failed().map(|(operation, err)| format!("{operation}: {err}")).collect();
    api.close();

    if failures.is_empty() {
        Ok(())
    } else {
        for failure in &failures {
            eprintln!("  ✗ {failure}");
        }
        bail!("{} of 3 reads failed", failures.len())
    }
}

/// Fetch every statistic concurrently and print the report as JSON.
async fn run_stats(args: &[String]) -> anyhow::Result<()> {
    let api = connect(args)?;

    let report = api.read_batch(ReadOperation::SUMMARY.to_vec()).await;
    let summary = serde_json::to_string_pretty(&report.to_json())?;
    println!("{summary}");

    let failed = report.failure_count();
    let total = report.len();
    api.close();

    if failed > 0 {
        bail!("{failed} of {total} reads failed");
    }
    Ok(())
}

fn connect(args: &[String]) -> anyhow::Result<GhostAdminApi> {
    let config = load_config(args)?;
    GhostAdminApi::from_config(&config).context("Invalid client configuration")
}

fn load_config(args: &[String]) -> anyhow::Result<ClientConfig> {
    config_path(args)?
        .map_or_else(config::load, |path| config::load_from_file(Some(path)))
        .context("Could not load configuration")
}

fn config_path(args: &[String]) -> anyhow::Result<Option<PathBuf>> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = iter.next().ok_or_else(|| anyhow!("--config needs a path"))?;
                return Ok(Some(PathBuf::from(path)));
            }
            other => bail!("Unexpected argument: {other}"),
        }
    }
    Ok(None)
}
