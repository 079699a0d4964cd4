use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context as _;
use env_flags::env_flags;
use once_cell::sync::OnceCell;
use tracing_subscriber::{EnvFilter, Layer, prelude::*};

use labelsort::client::{HttpChallengeClient, SubmitBody};
use labelsort::config::{UserConfig, check_threshold, expand_home, load_user_config, parse_threshold};
use labelsort::cycle::run_cycle;
use labelsort::{CanonicalList, ChallengeError, MatchOptions, Resolver, SimilarityMetric};

const DEFAULT_CHALLENGE_URL: &str = "https://challenge.devseccon.com/api/challenge";

#[derive(Debug, Clone, Copy)]
enum LogStyle {
    Json,
    Compact,
    Pretty,
    Full,
}

fn fmt_layer<S, W>(style: LogStyle, writer: W, ansi: bool) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a> + 'static,
    W: for<'w> tracing_subscriber::fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    let base = tracing_subscriber::fmt::layer()
        .with_file(false)
        .with_line_number(false)
        .with_target(true)
        .with_ansi(ansi)
        .with_writer(writer);
    match style {
        LogStyle::Json => base.json().boxed(),
        LogStyle::Compact => base.compact().boxed(),
        LogStyle::Pretty => base.pretty().boxed(),
        LogStyle::Full => base.boxed(),
    }
}

fn labelsort_home() -> PathBuf {
    match std::env::var("LABELSORT_HOME") {
        Ok(h) if !h.is_empty() => PathBuf::from(h),
        _ => {
            if let Ok(home) = std::env::var("HOME") {
                PathBuf::from(home).join(".labelsort")
            } else {
                std::env::current_dir()
                    .unwrap_or_else(|_| PathBuf::from("."))
                    .join(".labelsort")
            }
        }
    }
}

fn env_set(k: &str) -> bool {
    std::env::var_os(k).is_some()
}

fn init_tracing(home: &Path, user_cfg: Option<&UserConfig>) {
    env_flags! {
        /// Tracing filter, e.g. "info", "debug", or targets format.
        RUST_LOG: &str = "info";
        /// Preferred filter env (alias). If set, overrides RUST_LOG.
        TRACING_FILTER: &str = "";
        /// Pretty formatting for logs (ignored if TRACING_JSON=true).
        TRACING_PRETTY: bool = false;
        /// Compact single-line formatting for logs (ignored if TRACING_JSON=true)
        TRACING_COMPACT: bool = true;
        /// JSON formatting for logs
        TRACING_JSON: bool = false;
        /// If true, also log to file under <LABELSORT_HOME>/logs or LOG_DIR
        LOG_TO_FILE: bool = false;
        /// Optional explicit log directory (absolute). Defaults to <LABELSORT_HOME>/logs
        LOG_DIR: &str = "";
    }

    let mut rust_log = if !(*TRACING_FILTER).is_empty() {
        (*TRACING_FILTER).to_string()
    } else {
        (*RUST_LOG).to_string()
    };
    let mut tracing_json = *TRACING_JSON;
    let mut tracing_compact = *TRACING_COMPACT;
    let mut tracing_pretty = *TRACING_PRETTY;
    let mut log_to_file = *LOG_TO_FILE;
    let mut log_dir: Option<PathBuf> = if !(*LOG_DIR).is_empty() {
        Some(PathBuf::from((*LOG_DIR).to_string()))
    } else {
        None
    };

    if let Some(cfg) = user_cfg.and_then(|c| c.logging.as_ref()) {
        if !(env_set("TRACING_FILTER") || env_set("RUST_LOG"))
            && let Some(level) = cfg.level.as_ref()
        {
            rust_log = level.clone();
        }
        if !env_set("TRACING_JSON")
            && let Some(v) = cfg.json
        {
            tracing_json = v;
        }
        if !env_set("TRACING_COMPACT")
            && let Some(v) = cfg.compact
        {
            tracing_compact = v;
        }
        if !env_set("TRACING_PRETTY")
            && let Some(v) = cfg.pretty
        {
            tracing_pretty = v;
        }
        if !env_set("LOG_TO_FILE")
            && let Some(v) = cfg.to_file
        {
            log_to_file = v;
        }
        if !env_set("LOG_DIR")
            && let Some(dir) = cfg.dir.as_ref()
        {
            log_dir = Some(expand_home(dir));
        }
    }

    let style = if tracing_json {
        LogStyle::Json
    } else if tracing_compact {
        LogStyle::Compact
    } else if tracing_pretty {
        LogStyle::Pretty
    } else {
        LogStyle::Full
    };

    let filter = EnvFilter::try_new(rust_log).unwrap_or_else(|_| EnvFilter::new("info"));

    // Optional file logging layer
    static FILE_GUARD: OnceCell<tracing_appender::non_blocking::WorkerGuard> = OnceCell::new();
    let mut dir_error: Option<(PathBuf, std::io::Error)> = None;
    let file_layer = if log_to_file {
        let dir = log_dir.unwrap_or_else(|| home.join("logs"));
        match std::fs::create_dir_all(&dir) {
            Ok(()) => {
                let appender = tracing_appender::rolling::daily(dir, "labelsort.log");
                let (nb, guard) = tracing_appender::non_blocking(appender);
                let _ = FILE_GUARD.set(guard);
                Some(fmt_layer(style, nb, false))
            }
            Err(e) => {
                dir_error = Some((dir, e));
                None
            }
        }
    } else {
        None
    };

    // Results go to stdout; logs always go to stderr.
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer(style, std::io::stderr, true))
        .with(file_layer);
    if let Err(e) = subscriber.try_init() {
        tracing::debug!("tracing already set: {:?}", e);
    }
    if let Some((dir, e)) = dir_error {
        tracing::warn!("failed to create log dir {}: {}", dir.display(), e);
    }
}

/// Effective run settings: env wins, then user config, then defaults.
#[derive(Debug)]
struct RunSettings {
    fetch_url: String,
    submit_url: String,
    timeout: Duration,
    dry_run: bool,
    options: MatchOptions,
    canonical_file: Option<PathBuf>,
}

fn run_settings(user_cfg: Option<&UserConfig>) -> anyhow::Result<RunSettings> {
    env_flags! {
        /// Endpoint returning `{ items, token }`
        LABELSORT_FETCH_URL: &str = DEFAULT_CHALLENGE_URL;
        /// Endpoint accepting `{ orderedList, token }`
        LABELSORT_SUBMIT_URL: &str = DEFAULT_CHALLENGE_URL;
        /// Per-request timeout in milliseconds
        LABELSORT_TIMEOUT_MS: u64 = 2000;
        /// Resolve but do not submit
        LABELSORT_DRY_RUN: bool = false;
        /// Approximate-tier threshold in [0, 1]; empty means config or 0.6
        LABELSORT_THRESHOLD: &str = "";
        /// Approximate-tier metric: gestalt | levenshtein | jaro-winkler | sorensen-dice
        LABELSORT_METRIC: &str = "";
        /// Optional TOML file with `labels = [..]`; defaults to the OWASP LLM Top 10
        LABELSORT_CANONICAL_FILE: &str = "";
    }

    let challenge = user_cfg.and_then(|c| c.challenge.as_ref());
    let matching = user_cfg.and_then(|c| c.matching.as_ref());

    let fetch_url = if env_set("LABELSORT_FETCH_URL") {
        (*LABELSORT_FETCH_URL).to_string()
    } else {
        challenge
            .and_then(|c| c.fetch_url.clone())
            .unwrap_or_else(|| (*LABELSORT_FETCH_URL).to_string())
    };
    let submit_url = if env_set("LABELSORT_SUBMIT_URL") {
        (*LABELSORT_SUBMIT_URL).to_string()
    } else {
        challenge
            .and_then(|c| c.submit_url.clone())
            .unwrap_or_else(|| (*LABELSORT_SUBMIT_URL).to_string())
    };
    let timeout_ms = if env_set("LABELSORT_TIMEOUT_MS") {
        *LABELSORT_TIMEOUT_MS
    } else {
        challenge
            .and_then(|c| c.timeout_ms)
            .unwrap_or(*LABELSORT_TIMEOUT_MS)
    };
    let dry_run = if env_set("LABELSORT_DRY_RUN") {
        *LABELSORT_DRY_RUN
    } else {
        challenge
            .and_then(|c| c.dry_run)
            .unwrap_or(*LABELSORT_DRY_RUN)
    };

    let mut options = MatchOptions::default();
    if !(*LABELSORT_THRESHOLD).is_empty() {
        options.threshold = parse_threshold(*LABELSORT_THRESHOLD)?;
    } else if let Some(t) = matching.and_then(|m| m.threshold) {
        options.threshold = check_threshold(t)?;
    }
    if !(*LABELSORT_METRIC).is_empty() {
        options.metric = (*LABELSORT_METRIC).parse::<SimilarityMetric>()?;
    } else if let Some(m) = matching.and_then(|m| m.metric.as_ref()) {
        options.metric = m.parse::<SimilarityMetric>()?;
    }

    let canonical_file = if !(*LABELSORT_CANONICAL_FILE).is_empty() {
        Some(expand_home(*LABELSORT_CANONICAL_FILE))
    } else {
        matching
            .and_then(|m| m.canonical_file.as_ref())
            .map(|s| expand_home(s))
    };

    Ok(RunSettings {
        fetch_url,
        submit_url,
        timeout: Duration::from_millis(timeout_ms),
        dry_run,
        options,
        canonical_file,
    })
}

async fn run(user_cfg: Option<&UserConfig>) -> anyhow::Result<()> {
    let settings = run_settings(user_cfg)?;
    tracing::debug!("settings: {:?}", settings);

    let canonical = match settings.canonical_file.as_ref() {
        Some(path) => labelsort::canonical::load_from_file(path)
            .with_context(|| format!("failed to load canonical labels {}", path.display()))?,
        None => CanonicalList::default(),
    };
    tracing::info!(
        "canonical list: {} label(s); threshold={} metric={}",
        canonical.len(),
        settings.options.threshold,
        settings.options.metric
    );

    let client = HttpChallengeClient::new(
        settings.fetch_url.clone(),
        settings.submit_url.clone(),
        settings.timeout,
    )?;
    let resolver = Resolver::new(settings.options);
    let report = run_cycle(&client, &resolver, &canonical, settings.dry_run).await?;

    println!("GET items (shuffled): {:?}", report.items);
    println!("Canonical target order: {:?}", canonical.labels());
    println!("Computed orderedList: {:?}", report.ordered);
    if let Some(outcome) = report.outcome.as_ref() {
        println!("POST status: {}", outcome.status);
        match &outcome.body {
            SubmitBody::Json(v) => println!("POST response: {}", v),
            SubmitBody::Text(t) => println!("POST response text: {}", t),
        }
    }
    println!(
        "Total elapsed: {} ms (fetch {} ms, resolve {} us, submit {} ms)",
        report.timings.total.as_millis(),
        report.timings.fetch.as_millis(),
        report.timings.resolve.as_micros(),
        report.timings.submit.as_millis()
    );
    Ok(())
}

fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<ChallengeError>() {
        Some(ChallengeError::MalformedResponse(_)) => ExitCode::from(1),
        _ => ExitCode::from(2),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let home = labelsort_home();
    let (user_cfg, cfg_error) = match load_user_config(&home) {
        Ok(c) => (c, None),
        Err(e) => (None, Some(e)),
    };
    init_tracing(&home, user_cfg.as_ref());
    if let Some(e) = cfg_error {
        tracing::warn!("ignoring unreadable config in {}: {}", home.display(), e);
    }
    tracing::info!(
        "starting labelsort {} (home={})",
        env!("CARGO_PKG_VERSION"),
        home.display()
    );

    match run(user_cfg.as_ref()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("run failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            exit_code_for(&e)
        }
    }
}
