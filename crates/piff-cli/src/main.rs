use std::{
    io::{self, IsTerminal},
    path::PathBuf,
};

use anyhow::{bail, Result};
use clap::{Arg, ArgAction, Command};
use piff_cli::{run, Mode, Options};
use piff_core::{init_tracing_with, PiffConfig};

fn main() -> Result<()> {
    // Parse command line arguments
    let matches = Command::new("piff")
        .version(piff_core::VERSION)
        .about("Compile Piff sources to PHP")
        .arg(
            Arg::new("paths")
                .value_name("PATH")
                .help("Files or directories to compile; reads stdin when omitted")
                .num_args(0..)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("force")
                .short('f')
                .long("force")
                .help("Recompile files whose output is up to date")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .help("Pretty-print Piff instead of compiling")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("write")
                .short('w')
                .long("write")
                .help("With --format, rewrite files in place")
                .requires("format")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("ast")
                .long("ast")
                .help("Print the parsed tree as JSON")
                .conflicts_with("format")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-tags")
                .long("no-tags")
                .help("Do not wrap compiled output in <?php ?>")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("width")
                .long("width")
                .value_name("COLUMNS")
                .help("Maximum line width before lists are broken")
                .value_parser(clap::value_parser!(usize))
                .default_value("80"),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Enable debug logging")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let debug = matches.get_flag("debug");
    init_tracing_with(if debug { "debug" } else { "info" });

    let paths: Vec<PathBuf> = matches
        .get_many::<PathBuf>("paths")
        .map(|paths| paths.cloned().collect())
        .unwrap_or_default();

    if paths.is_empty() && io::stdin().is_terminal() {
        bail!("no paths given and nothing piped on stdin; see --help");
    }

    let mode = if matches.get_flag("ast") {
        Mode::Ast
    } else if matches.get_flag("format") {
        Mode::Format {
            write: matches.get_flag("write"),
        }
    } else {
        Mode::Compile
    };

    let options = Options {
        paths,
        mode,
        force: matches.get_flag("force"),
        config: PiffConfig {
            max_line_width: matches.get_one::<usize>("width").copied().unwrap_or(80),
            php_open_tag: !matches.get_flag("no-tags"),
            ..PiffConfig::default()
        },
    };

    let summary = run(&options, &mut io::stdin().lock(), &mut io::stdout().lock())?;
    if !summary.is_success() {
        bail!("{} of {} files failed", summary.failed.len(), summary.total());
    }
    Ok(())
}
