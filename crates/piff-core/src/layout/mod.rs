/*!
# Layout

Both emitters (the PHP generator and the Piff pretty-printer) describe their
output as [`Fragment`]s of typed [`Token`]s and leave line breaking,
spacing and indentation to this module. [`render`] runs the rewrites in a
fixed order:

1. elision of redundant terminators and separators,
2. list decisions (one line, or one element per line),
3. spacing, producing text pieces and indent markers,
4. indentation.

Word contents (literals, comments) are copied into the output untouched;
spacing pieces are dropped at line ends and blank lines never stack.
*/

#[cfg(test)]
mod layout_tests;

use crate::PiffConfig;

/// Keywords that take a space before an opening parenthesis
const PAREN_KEYWORDS: &[&str] = &[
    "if", "catch", "for", "foreach", "while", "switch", "function", "fn",
];

/// Keywords that continue the statement a closing brace belongs to
const CONTINUATIONS: &[&str] = &["else", "catch", "finally", "while"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Text emitted as is: names, keywords, literals, comments
    Word(String),
    Space,
    Newline,
    BlankLine,
    /// Statement terminator
    Semi,
    /// Case label terminator
    Colon,
    BlockOpen,
    BlockClose,
    ListOpen(&'static str),
    ListClose(&'static str),
    Comma,
    /// Operator with a space on both sides
    Op(String),
    /// Comment placed at the end of the previous line
    TrailingComment(String),
}

impl Token {
    pub fn word(text: impl Into<String>) -> Self {
        Token::Word(text.into())
    }

    pub fn op(text: impl Into<String>) -> Self {
        Token::Op(text.into())
    }

    fn is_break(&self) -> bool {
        matches!(self, Token::Newline | Token::BlankLine)
    }

    /// Width of the token when its list is kept on one line
    fn flat_width(&self) -> usize {
        match self {
            Token::Word(text) => text.lines().map(|l| l.chars().count()).max().unwrap_or(0),
            Token::Space | Token::Semi | Token::Colon | Token::BlockClose => 1,
            Token::Newline | Token::BlankLine => 0,
            Token::BlockOpen | Token::Comma => 2,
            Token::ListOpen(text) | Token::ListClose(text) => text.len(),
            Token::Op(text) => text.chars().count() + 2,
            Token::TrailingComment(text) => text.chars().count() + 1,
        }
    }
}

/// Emitter output before flattening
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Token(Token),
    Group(Vec<Fragment>),
}

impl Fragment {
    pub fn empty() -> Self {
        Fragment::Group(Vec::new())
    }

    /// Leftmost token, looking through empty groups
    pub fn first_token(&self) -> Option<&Token> {
        match self {
            Fragment::Token(token) => Some(token),
            Fragment::Group(parts) => parts.iter().find_map(Fragment::first_token),
        }
    }

    pub fn flatten(self) -> Vec<Token> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(self, out: &mut Vec<Token>) {
        match self {
            Fragment::Token(token) => out.push(token),
            Fragment::Group(parts) => {
                for part in parts {
                    part.flatten_into(out);
                }
            }
        }
    }
}

impl From<Token> for Fragment {
    fn from(token: Token) -> Self {
        Fragment::Token(token)
    }
}

impl From<Vec<Fragment>> for Fragment {
    fn from(parts: Vec<Fragment>) -> Self {
        Fragment::Group(parts)
    }
}

impl From<Option<Fragment>> for Fragment {
    fn from(part: Option<Fragment>) -> Self {
        part.unwrap_or_else(Fragment::empty)
    }
}

/// Build a [`Fragment::Group`] from tokens and fragments
macro_rules! group {
    ($($part:expr),* $(,)?) => {
        $crate::layout::Fragment::Group(vec![$($crate::layout::Fragment::from($part)),*])
    };
}

pub(crate) use group;

/// Join fragments with a separator token
pub fn join(parts: Vec<Fragment>, separator: Token) -> Fragment {
    let mut out = Vec::with_capacity(parts.len() * 2);
    for (i, part) in parts.into_iter().enumerate() {
        if i > 0 {
            out.push(Fragment::Token(separator.clone()));
        }
        out.push(part);
    }
    Fragment::Group(out)
}

/// `open a, b, c close`, subject to the list decision
pub fn list(open: &'static str, items: Vec<Fragment>, close: &'static str) -> Fragment {
    group![Token::ListOpen(open), join(items, Token::Comma), Token::ListClose(close)]
}

/// Lay a fragment out as text
pub fn render(fragment: Fragment, config: &PiffConfig) -> String {
    let tokens = elide(fragment.flatten());
    let multiline = decide_lists(&tokens, config);
    let pieces = space(&tokens, &multiline);
    finish(&indent(&pieces, &config.indent))
}

fn elide(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens {
        let prev = out.last();
        let redundant = match (&token, prev) {
            (Token::Semi, None | Some(Token::Semi | Token::BlockOpen)) => true,
            (Token::Space, None | Some(Token::Space | Token::Newline | Token::BlankLine)) => true,
            (Token::Newline, None | Some(Token::Newline | Token::BlankLine)) => true,
            (Token::BlankLine, None | Some(Token::BlankLine)) => true,
            _ => false,
        };
        if redundant {
            continue;
        }
        match (&token, out.last()) {
            (Token::BlankLine, Some(Token::Newline)) => {
                out.pop();
            }
            (Token::Newline | Token::BlankLine, Some(Token::Space)) => {
                out.pop();
            }
            _ => {}
        }
        out.push(token);
    }
    out
}

/// For each `ListOpen`, whether its list goes one element per line
fn decide_lists(tokens: &[Token], config: &PiffConfig) -> Vec<bool> {
    let mut multiline = vec![false; tokens.len()];
    let mut block_depth = 0usize;
    for (start, token) in tokens.iter().enumerate() {
        match token {
            Token::BlockOpen => block_depth += 1,
            Token::BlockClose => block_depth = block_depth.saturating_sub(1),
            Token::ListOpen(_) => {
                let Some(end) = matching_close(tokens, start) else {
                    continue;
                };
                let inner = &tokens[start + 1..end];
                if inner.is_empty() {
                    continue;
                }
                let elements = top_level_commas(inner) + 1;
                let width: usize = tokens[start..=end].iter().map(Token::flat_width).sum();
                let too_wide = width + block_depth * config.indent.len() > config.max_line_width;
                let nested = inner
                    .iter()
                    .any(|t| matches!(t, Token::BlockOpen | Token::TrailingComment(_)));
                multiline[start] = elements >= 2 && (too_wide || nested);
            }
            _ => {}
        }
    }
    multiline
}

fn matching_close(tokens: &[Token], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(start) {
        match token {
            Token::ListOpen(_) => depth += 1,
            Token::ListClose(_) => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn top_level_commas(inner: &[Token]) -> usize {
    let mut depth = 0usize;
    let mut commas = 0;
    for token in inner {
        match token {
            Token::ListOpen(_) | Token::BlockOpen => depth += 1,
            Token::ListClose(_) | Token::BlockClose => depth = depth.saturating_sub(1),
            Token::Comma if depth == 0 => commas += 1,
            _ => {}
        }
    }
    commas
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Text(String),
    /// Separator space, dropped at the end of a line
    Space,
    Break,
    Blank,
    Indent,
    Dedent,
}

fn text(s: &str) -> Piece {
    Piece::Text(s.to_string())
}

fn space(tokens: &[Token], multiline: &[bool]) -> Vec<Piece> {
    let mut out = Vec::with_capacity(tokens.len() * 2);
    // One entry per open list: whether it was broken
    let mut lists: Vec<bool> = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let prev = i.checked_sub(1).map(|p| &tokens[p]);
        match &tokens[i] {
            Token::Word(word) => out.push(Piece::Text(word.clone())),
            Token::Space => out.push(Piece::Space),
            Token::Newline => out.push(Piece::Break),
            Token::BlankLine => out.push(Piece::Blank),
            Token::Semi => out.extend([text(";"), Piece::Break]),
            Token::Colon => out.extend([text(":"), Piece::Break]),
            Token::BlockOpen => {
                if matches!(prev, Some(Token::ListClose(")"))) {
                    out.push(Piece::Space);
                }
                let close = (i + 1..tokens.len())
                    .find(|&j| !(tokens[j].is_break() || tokens[j] == Token::Space));
                match close {
                    Some(j) if tokens[j] == Token::BlockClose => {
                        out.push(text("{}"));
                        i = j;
                        after_close(tokens.get(j + 1), &mut out);
                    }
                    _ => out.extend([text("{"), Piece::Indent, Piece::Break]),
                }
            }
            Token::BlockClose => {
                out.extend([Piece::Dedent, Piece::Break, text("}")]);
                after_close(tokens.get(i + 1), &mut out);
            }
            Token::ListOpen(open) => {
                if let Some(Token::Word(word)) = prev {
                    if *open == "(" && PAREN_KEYWORDS.contains(&word.as_str()) {
                        out.push(Piece::Space);
                    }
                }
                out.push(text(open));
                let broken = multiline[i];
                if broken {
                    out.extend([Piece::Indent, Piece::Break]);
                }
                lists.push(broken);
            }
            Token::ListClose(close) => {
                if lists.pop().unwrap_or(false) {
                    out.extend([Piece::Dedent, Piece::Break]);
                }
                out.push(text(close));
            }
            Token::Comma if matches!(tokens.get(i + 1), Some(Token::ListClose(_))) => {}
            Token::Comma => {
                out.push(text(","));
                if lists.last().copied().unwrap_or(false) {
                    out.push(Piece::Break);
                } else {
                    out.push(Piece::Space);
                }
            }
            Token::Op(op) => out.extend([Piece::Space, text(op), Piece::Space]),
            Token::TrailingComment(comment) => {
                while matches!(out.last(), Some(Piece::Break)) {
                    out.pop();
                }
                out.extend([Piece::Space, text(comment), Piece::Break]);
            }
        }
        i += 1;
    }
    out
}

fn after_close(next: Option<&Token>, out: &mut Vec<Piece>) {
    match next {
        Some(Token::Word(word)) if CONTINUATIONS.contains(&word.as_str()) => out.push(Piece::Space),
        Some(Token::Semi | Token::ListClose(_) | Token::Comma) => {}
        _ => out.push(Piece::Break),
    }
}

fn indent(pieces: &[Piece], unit: &str) -> String {
    let mut out = String::new();
    let mut level = 0usize;
    let mut line_start = true;
    // A blank line was just written; another one would stack
    let mut after_blank = true;
    let mut pending_space = false;
    for piece in pieces {
        match piece {
            Piece::Indent => level += 1,
            Piece::Dedent => level = level.saturating_sub(1),
            Piece::Space => pending_space = !line_start,
            Piece::Break => {
                pending_space = false;
                if !line_start {
                    out.push('\n');
                    line_start = true;
                }
            }
            Piece::Blank => {
                pending_space = false;
                if !line_start {
                    out.push('\n');
                    line_start = true;
                }
                if !after_blank {
                    out.push('\n');
                    after_blank = true;
                }
            }
            Piece::Text(t) => {
                if t.is_empty() {
                    continue;
                }
                if line_start {
                    out.push_str(&unit.repeat(level));
                    line_start = false;
                } else if pending_space {
                    out.push(' ');
                }
                pending_space = false;
                after_blank = false;
                out.push_str(t);
            }
        }
    }
    out
}

/// Exactly one final newline, none for empty output
fn finish(text: &str) -> String {
    let text = text.trim_end_matches(['\n', ' ', '\t']);
    if text.is_empty() {
        String::new()
    } else {
        format!("{text}\n")
    }
}
