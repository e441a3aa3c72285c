use anyhow::Result;
use autopost_common::RejectionPolicy;
use autopost_common::observability::{LogConfig, LogFormat, init_logging};
use autopost_config::{AutopostConfig, AutopostConfigLoader, Secrets};
use autopost_pipeline::RunOutcome;
use clap::{Parser, Subcommand};
use jobs::{JobKind, Overrides, build_pipeline};
use std::path::PathBuf;
use std::process::ExitCode;
mod jobs;

/// Used when `--config` is not given; skipped if absent.
const DEFAULT_CONFIG_FILE: &str = "autopost.yaml";

#[derive(Debug, Parser)]
#[command(name = "autopost", version, about = "Scheduled generate-and-post jobs for X")]
struct Cli {
    /// YAML configuration file (must exist when given).
    #[arg(long, short, env = "AUTOPOST_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Compose the post but only log it.
    #[arg(long, global = true)]
    dry_run: bool,

    /// What to do when generated text is rejected: abort or fallback.
    #[arg(long, global = true)]
    on_rejection: Option<RejectionPolicy>,

    /// Log encoding: text or json.
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    job: Job,
}

#[derive(Debug, Subcommand)]
enum Job {
    /// Reply to the most discussed original post on the home timeline.
    Reply,
    /// Post one generated comment on recent news articles.
    News,
    /// Post a random greeting from the configured list.
    Greet {
        /// Seed the random pick.
        #[arg(long)]
        seed: Option<u64>,
    },
}

impl Cli {
    fn kind(&self) -> JobKind {
        match self.job {
            Job::Reply => JobKind::Reply,
            Job::News => JobKind::News,
            Job::Greet { .. } => JobKind::Greet,
        }
    }

    fn overrides(&self) -> Overrides {
        Overrides {
            dry_run: self.dry_run,
            on_rejection: self.on_rejection,
            seed: match self.job {
                Job::Greet { seed } => seed,
                _ => None,
            },
        }
    }

    fn load_config(&self) -> Result<AutopostConfig> {
        let loader = AutopostConfigLoader::new();
        let loader = match &self.config {
            Some(path) => loader.with_file(path),
            None => loader.with_optional_file(DEFAULT_CONFIG_FILE),
        };
        Ok(loader.load()?)
    }

    /// Stdout-only logging for failures that happen before the config is known.
    fn bootstrap_log_config(&self) -> LogConfig {
        LogConfig {
            format: self.log_format.unwrap_or_default(),
            ..LogConfig::default()
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let job = cli.kind();

    // 1) Config (env wins over file)
    let cfg = match cli.load_config() {
        Ok(cfg) => cfg,
        Err(err) => {
            init_logging(cli.bootstrap_log_config())?;
            tracing::error!(job = job.name(), error = %format!("{err:#}"), "config.invalid");
            return Err(err);
        }
    };

    // 2) Logging
    let log_file = init_logging(LogConfig {
        app_name: "autopost",
        log_dir: cfg.logging.dir.clone(),
        format: cli.log_format.unwrap_or(cfg.logging.format),
        default_filter: cfg.logging.filter.clone(),
    })?;
    if let Some(path) = log_file {
        tracing::debug!(path = %path.display(), "logging.file");
    }

    // 3) Credentials, before any network call
    let secrets = Secrets::from_env(&job.required_secrets())
        .inspect_err(|err| tracing::error!(job = job.name(), error = %err, "config.secrets"))?;

    let pipeline = build_pipeline(job, &cfg, &secrets, &cli.overrides())?;
    tracing::info!(job = job.name(), dry_run = cli.dry_run, "run.start");

    let outcome = pipeline.run().await;
    Ok(report(job, &outcome))
}

fn report(job: JobKind, outcome: &RunOutcome) -> ExitCode {
    match outcome {
        RunOutcome::Published(result) => {
            tracing::info!(job = job.name(), post_id = ?result.post_id, "run.published");
        }
        RunOutcome::DryRun { text } => {
            tracing::info!(job = job.name(), text = %text, "run.dry_run");
        }
        RunOutcome::NoCandidates => {
            tracing::info!(job = job.name(), "run.nothing_to_do");
        }
        RunOutcome::Rejected(reason) => {
            tracing::info!(job = job.name(), reason = %reason, "run.skipped");
        }
        RunOutcome::PublishFailed(result) => {
            tracing::error!(
                job = job.name(),
                status = ?result.status,
                body = result.body.as_deref().unwrap_or(""),
                "run.publish_failed"
            );
        }
    }

    if outcome.is_failure() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autopost_pipeline::{PublishResult, Rejection};

    #[test]
    fn cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "autopost",
            "reply",
            "--dry-run",
            "--on-rejection",
            "fallback",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.kind(), JobKind::Reply);
        let o = cli.overrides();
        assert!(o.dry_run);
        assert_eq!(o.on_rejection, Some(RejectionPolicy::Fallback));
        assert_eq!(cli.log_format, Some(LogFormat::Json));
    }

    #[test]
    fn greet_seed_is_forwarded() {
        let cli = Cli::try_parse_from(["autopost", "greet", "--seed", "7"]).unwrap();
        assert_eq!(cli.kind(), JobKind::Greet);
        assert_eq!(cli.overrides().seed, Some(7));
        assert!(!cli.overrides().dry_run);
    }

    #[test]
    fn unknown_policy_is_rejected_by_the_parser() {
        assert!(Cli::try_parse_from(["autopost", "news", "--on-rejection", "retry"]).is_err());
    }

    #[test]
    fn unreadable_config_still_has_a_stdout_log_setup() {
        let cli = Cli::try_parse_from([
            "autopost",
            "--config",
            "/nonexistent/autopost.yaml",
            "--log-format",
            "json",
            "news",
        ])
        .unwrap();
        assert!(cli.load_config().is_err());

        let log = cli.bootstrap_log_config();
        assert_eq!(log.format, LogFormat::Json);
        assert_eq!(log.log_dir, None);
        assert_eq!(log.default_filter, "info");
    }

    #[test]
    fn only_publish_failures_exit_non_zero() {
        let ok = [
            RunOutcome::NoCandidates,
            RunOutcome::Rejected(Rejection::Empty),
            RunOutcome::DryRun { text: "x".into() },
            RunOutcome::Published(PublishResult::published(Some("1".into()), Some(201))),
        ];
        for outcome in &ok {
            assert!(!outcome.is_failure());
            let _ = report(JobKind::Reply, outcome);
        }
        let failed = RunOutcome::PublishFailed(PublishResult::failed(Some(403), "nope"));
        assert!(failed.is_failure());
    }
}
