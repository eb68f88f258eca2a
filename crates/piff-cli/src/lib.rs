//! Piff CLI - file driver for the Piff compiler
//!
//! Expands paths into `.piff` sources, compiles each one next to itself as
//! `.php`, and offers the formatter and a tree dump over the same inputs.

use std::{
    fs,
    io::{Read, Write},
    path::{Path, PathBuf},
    time::SystemTime,
};

use anyhow::{Context, Result};
use piff_core::{parse, transpile_with, wrap_php, ParseError, PiffConfig, PiffError};
use tracing::{debug, info, warn};

/// Extension of Piff sources
pub const SOURCE_EXTENSION: &str = "piff";

/// What to do with each input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Compile to PHP
    Compile,
    /// Pretty-print Piff, in place when `write` is set
    Format { write: bool },
    /// Dump the parsed tree as JSON
    Ast,
}

#[derive(Debug, Clone)]
pub struct Options {
    pub paths: Vec<PathBuf>,
    pub mode: Mode,
    /// Recompile even when the output is newer than the source
    pub force: bool,
    pub config: PiffConfig,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            mode: Mode::Compile,
            force: false,
            config: PiffConfig::default(),
        }
    }
}

/// Per-run tally of processed files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub updated: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

impl Summary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.updated.len() + self.skipped.len() + self.failed.len()
    }
}

enum Outcome {
    Updated(PathBuf),
    Skipped(PathBuf),
    Failed(PathBuf),
}

/// Run the driver. Without paths the source is read from `input` and the
/// result written to `output`; file modes write their results to `output`
/// only for `--ast` and non-writing `--format`.
pub fn run(options: &Options, input: &mut dyn Read, output: &mut dyn Write) -> Result<Summary> {
    if options.paths.is_empty() {
        let mut source = String::new();
        input
            .read_to_string(&mut source)
            .context("Failed to read source from stdin")?;
        let rendered = render_stdin(options, &source)?;
        output.write_all(rendered.as_bytes())?;
        return Ok(Summary::default());
    }

    let sources = collect_sources(&options.paths)?;
    let mut summary = Summary::default();
    for path in sources {
        let outcome = match options.mode {
            Mode::Compile => compile_file(&path, &options.config, options.force)?,
            Mode::Format { write } => format_file(&path, &options.config, write, output)?,
            Mode::Ast => dump_file(&path, output)?,
        };
        match outcome {
            Outcome::Updated(path) => summary.updated.push(path),
            Outcome::Skipped(path) => summary.skipped.push(path),
            Outcome::Failed(path) => summary.failed.push(path),
        }
    }

    info!("{} files processed", summary.total());
    Ok(summary)
}

fn render_stdin(options: &Options, source: &str) -> Result<String> {
    let config = &options.config;
    match options.mode {
        Mode::Compile => match transpile_with(source, config) {
            Ok(php) => Ok(wrap_php(&php, config)),
            Err(err) => anyhow::bail!("{}", describe_error("<stdin>", source, &err)),
        },
        Mode::Format { .. } => {
            if let Err(err) = parse(source) {
                anyhow::bail!("{}", describe_error("<stdin>", source, &err.into()));
            }
            Ok(piff_core::format_with(source, config))
        }
        Mode::Ast => match parse(source) {
            Ok(parsed) => Ok(format!("{}\n", serde_json::to_string_pretty(&parsed.tree)?)),
            Err(err) => anyhow::bail!("{}", describe_error("<stdin>", source, &err.into())),
        },
    }
}

/// Expand directories into the `.piff` files below them, sorted. Plain file
/// arguments are kept whatever their extension.
pub fn collect_sources(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut sources = Vec::new();
    for path in paths {
        let metadata =
            fs::metadata(path).with_context(|| format!("Cannot read {}", path.display()))?;
        if metadata.is_dir() {
            let mut found = Vec::new();
            walk_dir(path, &mut found)?;
            found.sort();
            sources.extend(found);
        } else {
            sources.push(path.clone());
        }
    }
    Ok(sources)
}

fn walk_dir(dir: &Path, found: &mut Vec<PathBuf>) -> Result<()> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Cannot list directory {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            walk_dir(&path, found)?;
        } else if path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION) {
            found.push(path);
        }
    }
    Ok(())
}

/// `a/b.piff` compiles to `a/b.php`
pub fn output_path(source: &Path) -> PathBuf {
    source.with_extension("php")
}

/// A missing output always needs compiling
pub fn needs_compile(source: &Path, output: &Path) -> bool {
    match (modified(source), modified(output)) {
        (Some(source), Some(output)) => source > output,
        (_, None) => true,
        (None, Some(_)) => false,
    }
}

fn compile_file(path: &Path, config: &PiffConfig, force: bool) -> Result<Outcome> {
    let target = output_path(path);
    if !force && !needs_compile(path, &target) {
        info!("skipped {}", path.display());
        return Ok(Outcome::Skipped(path.to_path_buf()));
    }

    let source = read_source(path)?;
    let php = match transpile_with(&source, config) {
        Ok(php) => php,
        Err(err) => {
            warn!("{}", describe_error(&path.display().to_string(), &source, &err));
            return Ok(Outcome::Failed(path.to_path_buf()));
        }
    };

    fs::write(&target, wrap_php(&php, config))
        .with_context(|| format!("Failed to write {}", target.display()))?;
    info!("updated {}", target.display());
    Ok(Outcome::Updated(target))
}

fn format_file(
    path: &Path,
    config: &PiffConfig,
    write: bool,
    output: &mut dyn Write,
) -> Result<Outcome> {
    let source = read_source(path)?;
    if let Err(err) = parse(&source) {
        warn!("{}", describe_error(&path.display().to_string(), &source, &err.into()));
        return Ok(Outcome::Failed(path.to_path_buf()));
    }

    let formatted = piff_core::format_with(&source, config);
    if !write {
        output.write_all(formatted.as_bytes())?;
        return Ok(Outcome::Updated(path.to_path_buf()));
    }
    if formatted == source {
        debug!("unchanged {}", path.display());
        return Ok(Outcome::Skipped(path.to_path_buf()));
    }
    fs::write(path, formatted).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("formatted {}", path.display());
    Ok(Outcome::Updated(path.to_path_buf()))
}

fn dump_file(path: &Path, output: &mut dyn Write) -> Result<Outcome> {
    let source = read_source(path)?;
    match parse(&source) {
        Ok(parsed) => {
            serde_json::to_writer_pretty(&mut *output, &parsed.tree)?;
            writeln!(output)?;
            Ok(Outcome::Updated(path.to_path_buf()))
        }
        Err(err) => {
            warn!("{}", describe_error(&path.display().to_string(), &source, &err.into()));
            Ok(Outcome::Failed(path.to_path_buf()))
        }
    }
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Error report with the offending line and a caret under the column
pub fn describe_error(origin: &str, source: &str, err: &PiffError) -> String {
    let (line, column) = err.location();
    let excerpt = ParseError::new(err.to_string(), line, column).snippet(source);
    format!("{err} in {origin}\n{excerpt}")
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}
