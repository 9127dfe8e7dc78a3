pub mod check;
pub mod config;
pub mod metrics;
pub mod rules;

use crate::ast::AstNode;
use crate::config::ResolvedConfig;
use crate::errors::{Result, TallyError};
use crate::parse::factory::create_frontend;
use crate::rules::Priority;
use crate::walk::{self, Language};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Parser)]
#[command(
    name = "tally",
    version,
    about = "Rule and metrics engine for source trees"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run rulesets over a source tree and report violations
    Check(check::CheckArgs),
    /// Print per-type and per-operation metric values
    Metrics(metrics::MetricsArgs),
    /// List the rules a ruleset list resolves to
    Rules(rules::RulesArgs),
    /// Inspect configuration
    Config(config::ConfigArgs),
}

/// Dispatch to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Check(args) => check::run(&args),
        Commands::Metrics(args) => metrics::run(&args),
        Commands::Rules(args) => rules::run(&args),
        Commands::Config(args) => config::run(&args),
    }
}

pub(crate) fn parse_language(s: &str) -> std::result::Result<Language, String> {
    s.parse()
}

pub(crate) fn parse_priority(s: &str) -> std::result::Result<Priority, String> {
    s.parse::<u8>()
        .ok()
        .and_then(Priority::from_level)
        .ok_or_else(|| format!("priority must be 1..5, got '{s}'"))
}

/// Canonical analysis root, the language to analyse and the files to parse.
pub(crate) struct Sources {
    pub root: PathBuf,
    pub lang: Language,
    pub files: Vec<PathBuf>,
}

pub(crate) fn discover_sources(path: &Path, config: &ResolvedConfig) -> Result<Sources> {
    let root = path.canonicalize().map_err(|_| TallyError::NoFiles {
        path: path.to_path_buf(),
    })?;

    let lang = match config.lang {
        Some(l) => l,
        None => walk::detect_language(&root)
            .ok_or_else(|| TallyError::NoFiles { path: root.clone() })?,
    };

    let files = walk::discover_files(&root, lang, &config.include, &config.all_excludes(), false)?;
    if files.is_empty() {
        return Err(TallyError::NoFiles { path: root });
    }
    tracing::debug!("Discovered {} {lang} files under {}", files.len(), root.display());

    Ok(Sources { root, lang, files })
}

pub(crate) fn progress_bar(len: usize, quiet: bool) -> Option<indicatif::ProgressBar> {
    if quiet {
        return None;
    }
    let pb = indicatif::ProgressBar::new(len as u64);
    if let Ok(style) = indicatif::ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} files ({eta})")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    Some(pb)
}

/// A parsed file, with its path relative to the analysis root.
pub(crate) struct ParsedFile {
    pub relative: PathBuf,
    pub root: AstNode,
}

/// Parse every file in parallel and hand each tree to `visit` on the worker
/// that parsed it. Unreadable or unparseable files are counted and skipped.
///
/// Returns the per-file results and the number of skipped files.
pub(crate) fn parse_and_visit<T, F>(
    sources: &Sources,
    quiet: bool,
    visit: F,
) -> (Vec<T>, usize)
where
    T: Send,
    F: Fn(ParsedFile) -> T + Sync,
{
    let skipped = AtomicUsize::new(0);
    let progress = progress_bar(sources.files.len(), quiet);

    // Parser is not Send: every worker builds its own frontend.
    let results: Vec<T> = sources
        .files
        .par_iter()
        .filter_map(|file_path| {
            if let Some(ref pb) = progress {
                pb.inc(1);
            }

            let source = match std::fs::read(file_path) {
                Ok(s) => s,
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", file_path.display(), e);
                    skipped.fetch_add(1, Ordering::Relaxed);
                    return None;
                }
            };

            let relative = file_path
                .strip_prefix(&sources.root)
                .unwrap_or(file_path)
                .to_path_buf();

            let frontend = create_frontend(sources.lang);
            match frontend.parse(&source, &relative) {
                Ok(root) => Some(visit(ParsedFile { relative, root })),
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", file_path.display(), e);
                    skipped.fetch_add(1, Ordering::Relaxed);
                    None
                }
            }
        })
        .collect();

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    (results, skipped.load(Ordering::Relaxed))
}
