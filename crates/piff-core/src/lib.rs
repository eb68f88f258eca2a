//! # Piff Core
//!
//! Compiler from Piff, a small expression-oriented language, to PHP:
//! - syntax tree arena and traversal engine
//! - pest grammar and tree builder
//! - desugaring passes (composition, sigils, string concatenation, parent calls)
//! - free-variable and closure capture analysis
//! - PHP code generator and the Piff pretty-printer, sharing one layout engine
//!
//! The `piff` binary in `piff-cli` drives this crate over files and directories.

#![warn(clippy::all)]

pub mod analysis;
pub mod ast;
pub mod codegen;
pub mod format;
pub mod layout;
pub mod parser;
pub mod passes;
pub mod visit;

use tracing::debug;
use tracing_subscriber::EnvFilter;

pub use analysis::{Captures, Needs};
pub use ast::{Node, NodeId, NodeKind, Tree};
pub use codegen::PhpGenerator;
pub use parser::{parse, ParseError, Parsed};
pub use passes::ComposeError;

/// Piff compiler version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing for Piff components. `RUST_LOG` overrides the default
/// `info` level; a second call is a no-op.
pub fn init_tracing() {
    init_tracing_with("info");
}

/// Initialize tracing with `level` as the default for the Piff crates
pub fn init_tracing_with(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("piff_core={level},piff_cli={level}")));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Compiler configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PiffConfig {
    /// Lists wider than this are laid out one element per line
    pub max_line_width: usize,
    /// One level of indentation
    pub indent: String,
    /// Wrap compiled files in `<?php ... ?>`
    pub php_open_tag: bool,
}

impl Default for PiffConfig {
    fn default() -> Self {
        Self {
            max_line_width: 80,
            indent: "  ".to_string(),
            php_open_tag: true,
        }
    }
}

/// Error types for Piff compilation
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PiffError {
    #[error("Syntax error: {0}")]
    Parse(#[from] ParseError),

    #[error("Composition error: {0}")]
    Compose(#[from] ComposeError),
}

impl PiffError {
    /// 1-based line and column of the offending source
    pub fn location(&self) -> (usize, usize) {
        match self {
            PiffError::Parse(err) => (err.line, err.column),
            PiffError::Compose(err) => {
                let span = err.span();
                (span.line, span.column)
            }
        }
    }
}

/// Result type for Piff operations
pub type Result<T> = std::result::Result<T, PiffError>;

/// Compile Piff source to PHP with the default configuration. The output has
/// no `<?php` wrapper.
pub fn transpile(source: &str) -> Result<String> {
    transpile_with(source, &PiffConfig::default())
}

pub fn transpile_with(source: &str, config: &PiffConfig) -> Result<String> {
    let Parsed { mut tree, root } = parse(source)?;
    passes::desugar(&mut tree, root)?;

    let needs = Needs::compute(&tree, root);
    let captures = Captures::compute(&tree, root, &needs);
    passes::parent_call::run(&mut tree, root);

    let mut generator = PhpGenerator::new(&tree, &captures);
    let fragment = generator.generate(root);
    let php = layout::render(fragment, config);
    debug!(bytes = php.len(), "transpiled");
    Ok(php)
}

/// Wrap compiled PHP for a standalone `.php` file when the config asks for it
pub fn wrap_php(php: &str, config: &PiffConfig) -> String {
    if config.php_open_tag {
        format!("<?php\n{php}?>\n")
    } else {
        php.to_string()
    }
}

/// Pretty-print Piff source with the default configuration. Text that does
/// not parse is returned unchanged.
pub fn format(source: &str) -> String {
    format::format_with(source, &PiffConfig::default())
}

pub fn format_with(source: &str, config: &PiffConfig) -> String {
    format::format_with(source, config)
}
