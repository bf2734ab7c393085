use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

use kover_gate::annotate::{annotate, ConsoleSink, RecordingSink, ReviewSink};
use kover_gate::check::{check_report_file, ModuleCheck};
use kover_gate::config::Config;
use kover_gate::coverage::{CheckConfig, PolicyOutcome, DEFAULT_THRESHOLD};
use kover_gate::git::GitDiff;
use kover_gate::notifications::{send_review_comment, GithubConfig};
use kover_gate::report;

const CONFIG_FILE: &str = "kover.toml";

#[derive(Parser)]
#[command(name = "kover-gate")]
#[command(about = "Report Kover coverage of changed files and gate on thresholds")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a single module's report
    Report {
        /// Display name of the project or module
        module: String,

        /// Path to the Kover XML report
        report: PathBuf,

        /// Required total project coverage, in percent
        #[arg(long, default_value_t = DEFAULT_THRESHOLD, allow_negative_numbers = true)]
        total_threshold: i32,

        /// Required coverage of each changed file, in percent
        #[arg(long, default_value_t = DEFAULT_THRESHOLD, allow_negative_numbers = true)]
        file_threshold: i32,

        /// Only warn when under a threshold instead of failing
        #[arg(long)]
        warn_only: bool,

        #[command(flatten)]
        changes: ChangeArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Check every module listed in a config file
    Check {
        /// Path to config file (default: kover.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        changes: ChangeArgs,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args)]
struct ChangeArgs {
    /// Changed file path (repeatable); skips git
    #[arg(long = "changed-file")]
    changed_files: Vec<String>,

    /// File with one changed path per line; skips git
    #[arg(long)]
    changed_files_from: Option<PathBuf>,

    /// Base ref to diff against (merge base with HEAD)
    #[arg(long)]
    base: Option<String>,
}

#[derive(Args)]
struct OutputArgs {
    /// Write markdown here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the evaluated outcome as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Post the report as a comment on this pull request
    #[arg(long)]
    github_pr: Option<u64>,
}

#[derive(Serialize)]
struct JsonModule<'a> {
    module: &'a str,
    #[serde(flatten)]
    outcome: &'a PolicyOutcome,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(should_fail) => {
            if should_fail {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Returns whether the build should fail
fn run(cli: Cli) -> Result<bool> {
    match cli.command {
        Commands::Report {
            module,
            report,
            total_threshold,
            file_threshold,
            warn_only,
            changes,
            output,
        } => {
            let check = CheckConfig {
                total_threshold,
                file_threshold,
                fail_under_threshold: !warn_only,
            };
            let changed = collect_changed_files(&changes)?;
            let result = check_report_file(&module, &report, &changed, &check)?;
            emit(&[result], &output)
        }
        Commands::Check {
            config,
            changes,
            output,
        } => {
            let config_path = config.unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
            let config_path = fs::canonicalize(&config_path)
                .with_context(|| format!("Could not find config file: {}", config_path.display()))?;
            let base_dir = config_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));

            let config = Config::load(&config_path)?;
            let modules = config.resolve(&base_dir)?;
            let changed = collect_changed_files(&changes)?;

            let mut results = Vec::new();
            for module in &modules {
                let result =
                    check_report_file(&module.name, &module.report, &changed, &module.check)
                        .with_context(|| format!("Module '{}'", module.name))?;
                results.push(result);
            }
            emit(&results, &output)
        }
    }
}

fn collect_changed_files(args: &ChangeArgs) -> Result<Vec<String>> {
    let mut files = args.changed_files.clone();

    if let Some(ref path) = args.changed_files_from {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read changed files list: {}", path.display()))?;
        files.extend(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from),
        );
    }

    if files.is_empty() && args.changed_files_from.is_none() {
        let cwd = std::env::current_dir()?;
        files = GitDiff::new(&cwd)?.touched_files(args.base.as_deref())?;
    }

    Ok(files)
}

fn emit(results: &[ModuleCheck], output: &OutputArgs) -> Result<bool> {
    let markdown = report::render_all(results.iter().map(|r| (r.name.as_str(), &r.outcome)));

    let mut console = ConsoleSink;
    let mut recorder = RecordingSink::default();
    recorder.markdown(&markdown);

    match output.output {
        Some(ref path) => {
            report::write_report(&markdown, path)?;
            for result in results {
                result.outcome.print_summary(&result.name);
            }
            println!(
                "\n{} Report written: {}",
                "📊".cyan(),
                path.display().to_string().green()
            );
        }
        None => console.markdown(&markdown),
    }

    for result in results {
        annotate(&result.outcome, &mut console);
        annotate(&result.outcome, &mut recorder);
    }

    if let Some(ref path) = output.json {
        let modules: Vec<JsonModule> = results
            .iter()
            .map(|r| JsonModule {
                module: &r.name,
                outcome: &r.outcome,
            })
            .collect();
        let json = serde_json::to_string_pretty(&modules)?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write JSON outcome: {}", path.display()))?;
    }

    if let Some(pr_number) = output.github_pr {
        let github = GithubConfig::from_env();
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(send_review_comment(&github, pr_number, &recorder))?;
    }

    Ok(results.iter().any(|r| r.outcome.build_should_fail))
}
