// Piff parser: pest grammar plus a builder that lowers pairs into the
// arena tree

mod builder;

#[cfg(test)]
mod parser_tests;

use pest::error::LineColLocation;
use pest::Parser;
use pest_derive::Parser;
use thiserror::Error;
use tracing::debug;

use crate::ast::{NodeId, Tree};

#[derive(Parser)]
#[grammar = "parser/piff.pest"]
pub struct PiffParser;

/// A parsed compilation unit
#[derive(Debug, Clone)]
pub struct Parsed {
    pub tree: Tree,
    pub root: NodeId,
}

/// Syntax error with a 1-based source position
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at line {line}, column {column}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            line,
            column,
        }
    }

    /// The offending source line followed by a caret under the error column
    pub fn snippet(&self, source: &str) -> String {
        let text = source
            .lines()
            .nth(self.line.saturating_sub(1))
            .unwrap_or_default();
        let gutter = format!("{} | ", self.line);
        format!(
            "{gutter}{text}\n{}^",
            " ".repeat(gutter.len() + self.column.saturating_sub(1))
        )
    }
}

impl From<pest::error::Error<Rule>> for ParseError {
    fn from(err: pest::error::Error<Rule>) -> Self {
        let (line, column) = match err.line_col {
            LineColLocation::Pos(pos) => pos,
            LineColLocation::Span(start, _) => start,
        };
        ParseError::new(err.variant.message().into_owned(), line, column)
    }
}

/// Parse Piff source into a tree rooted at a `Program` node
pub fn parse(source: &str) -> Result<Parsed, ParseError> {
    let mut pairs = PiffParser::parse(Rule::program, source)?;
    let program = pairs
        .next()
        .ok_or_else(|| ParseError::new("empty parse result", 1, 1))?;

    let mut builder = builder::TreeBuilder::new(source);
    let root = builder.program(program)?;
    let tree = builder.finish();
    debug!(nodes = tree.len(), "parsed program");
    Ok(Parsed { tree, root })
}
