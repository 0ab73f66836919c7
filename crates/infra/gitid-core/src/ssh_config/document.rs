//! Structural view of an OpenSSH client config.
//!
//! The document keeps every line verbatim (including its line ending) so that
//! serializing an unmodified document reproduces the input byte-for-byte.
//! Lines are grouped into a preamble (everything before the first `Host` or
//! `Match`) and blocks that run until the next `Host`/`Match` header.

use std::fmt;

/// Indentation used when the file gives no hint.
pub const DEFAULT_INDENT: &str = "  ";

const TAB_WIDTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Host,
    Match,
}

/// A `Host` or `Match` header and the lines that follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    kind: BlockKind,
    header: String,
    patterns: Vec<String>,
    body: Vec<String>,
}

impl Block {
    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    /// Host patterns listed on the header (empty for `Match` blocks).
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Whether this is a `Host` block listing `hostname` exactly (case-insensitive).
    pub fn matches_host(&self, hostname: &str) -> bool {
        self.kind == BlockKind::Host
            && self
                .patterns
                .iter()
                .any(|p| p.eq_ignore_ascii_case(hostname))
    }

    /// Value of the first directive named `keyword` in this block.
    pub fn get(&self, keyword: &str) -> Option<String> {
        self.body.iter().find_map(|line| {
            let d = Directive::parse(line)?;
            d.keyword(line)
                .eq_ignore_ascii_case(keyword)
                .then(|| unquote(d.value(line)).to_string())
        })
    }

    /// Replace the value of the first `keyword` directive, keeping its layout.
    ///
    /// Returns the previous value, or `None` when the block has no such directive.
    pub fn replace_value(&mut self, keyword: &str, value: &str) -> Option<String> {
        for line in &mut self.body {
            let Some(d) = Directive::parse(line) else {
                continue;
            };
            if !d.keyword(line).eq_ignore_ascii_case(keyword) {
                continue;
            }
            let previous = unquote(d.value(line)).to_string();
            let mut patched = String::with_capacity(line.len() + value.len());
            patched.push_str(&line[..d.value_start]);
            patched.push_str(value);
            patched.push_str(&line[d.value_end..]);
            *line = patched;
            return Some(previous);
        }
        None
    }

    /// Insert `<keyword> <value>` directly after the header line.
    pub fn insert_after_header(&mut self, keyword: &str, value: &str, fallback_indent: &str) {
        let newline = line_ending(&self.header).unwrap_or("\n");
        if !self.header.ends_with('\n') {
            self.header.push_str(newline);
        }
        let indent = self
            .body
            .iter()
            .find(|l| Directive::parse(l).is_some())
            .map_or_else(
                || fallback_indent.to_string(),
                |l| leading_whitespace(l).to_string(),
            );
        self.body
            .insert(0, format!("{indent}{keyword} {value}{newline}"));
    }

    fn write_to(&self, out: &mut String) {
        out.push_str(&self.header);
        for line in &self.body {
            out.push_str(line);
        }
    }
}

/// Parsed SSH client configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SshConfigDocument {
    preamble: Vec<String>,
    blocks: Vec<Block>,
    indent: String,
    newline: &'static str,
}

impl SshConfigDocument {
    pub fn parse(text: &str) -> Self {
        let mut preamble = Vec::new();
        let mut blocks: Vec<Block> = Vec::new();

        for line in text.split_inclusive('\n') {
            let header = Directive::parse(line).and_then(|d| {
                let keyword = d.keyword(line);
                let kind = if keyword.eq_ignore_ascii_case("host") {
                    BlockKind::Host
                } else if keyword.eq_ignore_ascii_case("match") {
                    BlockKind::Match
                } else {
                    return None;
                };
                let patterns = match kind {
                    BlockKind::Host => d
                        .value(line)
                        .split_whitespace()
                        .map(|p| unquote(p).to_string())
                        .collect(),
                    BlockKind::Match => Vec::new(),
                };
                Some((kind, patterns))
            });

            if let Some((kind, patterns)) = header {
                blocks.push(Block {
                    kind,
                    header: line.to_string(),
                    patterns,
                    body: Vec::new(),
                });
            } else if let Some(block) = blocks.last_mut() {
                block.body.push(line.to_string());
            } else {
                preamble.push(line.to_string());
            }
        }

        Self {
            preamble,
            blocks,
            indent: detect_indent(text),
            newline: if text.contains("\r\n") { "\r\n" } else { "\n" },
        }
    }

    /// Indentation unit for generated lines.
    pub fn indent(&self) -> &str {
        &self.indent
    }

    /// Line ending used by the file (`\n` unless the file already uses CRLF).
    pub fn newline(&self) -> &'static str {
        if self.newline.is_empty() {
            "\n"
        } else {
            self.newline
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// True when the document holds nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        self.blocks.is_empty() && self.preamble.iter().all(|l| l.trim().is_empty())
    }

    pub fn find_host(&self, hostname: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.matches_host(hostname))
    }

    pub fn find_host_mut(&mut self, hostname: &str) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|b| b.matches_host(hostname))
    }
}

impl fmt::Display for SshConfigDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        for line in &self.preamble {
            out.push_str(line);
        }
        for block in &self.blocks {
            block.write_to(&mut out);
        }
        f.write_str(&out)
    }
}

/// Detect the indentation unit from the first indented, non-blank line.
///
/// Unindented lines are skipped: the first non-blank line is usually a `Host`
/// header or comment at column zero and says nothing about option indentation.
/// Tabs count as four spaces. Falls back to [`DEFAULT_INDENT`].
pub fn detect_indent(text: &str) -> String {
    text.lines()
        .filter(|l| !l.trim().is_empty())
        .map(leading_whitespace)
        .find(|ws| !ws.is_empty())
        .map_or_else(
            || DEFAULT_INDENT.to_string(),
            |ws| {
                let width: usize = ws
                    .chars()
                    .map(|c| if c == '\t' { TAB_WIDTH } else { 1 })
                    .sum();
                " ".repeat(width)
            },
        )
}

/// Byte layout of a `Keyword value` / `Keyword=value` line.
#[derive(Debug, Clone, Copy)]
struct Directive {
    keyword_start: usize,
    keyword_end: usize,
    value_start: usize,
    value_end: usize,
}

impl Directive {
    /// Parse a config line; comments and blank lines yield `None`.
    fn parse(line: &str) -> Option<Self> {
        let keyword_start = line.len() - line.trim_start().len();
        let rest = &line[keyword_start..];
        if rest.trim().is_empty() || rest.starts_with('#') {
            return None;
        }

        let keyword_len = rest
            .find(|c: char| c.is_whitespace() || c == '=')
            .unwrap_or(rest.len());
        let keyword_end = keyword_start + keyword_len;

        let after = &line[keyword_end..];
        let sep = after.trim_start();
        let sep = sep.strip_prefix('=').unwrap_or(sep).trim_start();
        let value_start = line.len() - sep.len();
        let value_end = value_start + sep.trim_end().len();

        Some(Self {
            keyword_start,
            keyword_end,
            value_start,
            value_end,
        })
    }

    fn keyword<'a>(&self, line: &'a str) -> &'a str {
        &line[self.keyword_start..self.keyword_end]
    }

    fn value<'a>(&self, line: &'a str) -> &'a str {
        &line[self.value_start..self.value_end]
    }
}

fn leading_whitespace(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

fn line_ending(line: &str) -> Option<&'static str> {
    if line.ends_with("\r\n") {
        Some("\r\n")
    } else if line.ends_with('\n') {
        Some("\n")
    } else {
        None
    }
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}
