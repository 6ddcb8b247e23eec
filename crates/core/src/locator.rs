//! Test-case discovery over raw test source.
//!
//! This is a lexical scan, not a parse. A declaration is the keyword `it` or
//! `test`, optionally followed by `.skip`, optionally followed by a
//! `.each(<table>)` call, followed by the opening `(` of the test call itself.
//! The keyword must sit at the start of a line or after whitespace, so
//! identifiers such as `testing(` or member calls such as `expect(x).test(`
//! are never picked up.
//!
//! Known limitations of the pattern:
//! - `.each(...)` tables containing a `)` are not recognized.
//! - Tagged-template tables (``it.each`...` ``) are not recognized.
//! - Declarations inside comments or strings are counted like any other text.
//!   A title such as `'handles it (twice)'` yields a second case, and
//!   skipping that case rewrites the title.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)(?:^|\s)(it|test)(\.skip)?(\.each\([^)]*\))?\s*\(")
        .expect("declaration pattern is a valid regex")
});

/// The two accepted spellings of a test declaration. They are synonyms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Keyword {
    It,
    Test,
}

impl Keyword {
    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::It => "it",
            Keyword::Test => "test",
        }
    }
}

/// One test declaration found in the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// 1-based position in declaration order.
    pub ordinal: usize,
    /// First string argument of the call; used for reporting and name filters.
    pub display_name: String,
    pub keyword: Keyword,
    /// Byte offset of the keyword token.
    pub keyword_offset: usize,
    /// Byte span from the keyword through the opening `(` of the test call.
    pub span: Range<usize>,
    /// 1-based line of the keyword.
    pub line: usize,
    /// Declaration already carries `.skip`.
    pub skipped: bool,
    /// Declaration uses `.each(...)`.
    pub parameterized: bool,
}

impl TestCase {
    /// Offset directly after the keyword, where a skip marker belongs.
    pub fn skip_insertion_offset(&self) -> usize {
        self.keyword_offset + self.keyword.as_str().len()
    }
}

/// Scan `source` for test declarations in textual order.
///
/// Returns an empty vector when nothing matches; that is "nothing to bisect",
/// not an error.
pub fn locate(source: &str) -> Vec<TestCase> {
    let mut cases: Vec<TestCase> = Vec::new();
    let mut line = 1;
    let mut line_cursor = 0;

    for caps in DECLARATION.captures_iter(source) {
        let (Some(whole), Some(keyword)) = (caps.get(0), caps.get(1)) else {
            continue;
        };

        line += source[line_cursor..keyword.start()].matches('\n').count();
        line_cursor = keyword.start();

        let ordinal = cases.len() + 1;
        let display_name = display_name(&source[whole.end()..])
            .unwrap_or_else(|| format!("<anonymous #{ordinal}>"));

        cases.push(TestCase {
            ordinal,
            display_name,
            keyword: if keyword.as_str() == "it" { Keyword::It } else { Keyword::Test },
            keyword_offset: keyword.start(),
            span: keyword.start()..whole.end(),
            line,
            skipped: caps.get(2).is_some(),
            parameterized: caps.get(3).is_some(),
        });
    }

    cases
}

/// Extract the label from the text following the call's opening paren.
///
/// A leading string literal (any of the three JS quote styles) wins; otherwise
/// the raw first argument up to `,` or `)` is used as-is.
fn display_name(args: &str) -> Option<String> {
    let trimmed = args.trim_start();
    let mut chars = trimmed.chars();

    match chars.next()? {
        quote @ ('\'' | '"' | '`') => {
            let mut name = String::new();
            let mut escaped = false;
            for c in chars {
                if escaped {
                    name.push(c);
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == quote {
                    return Some(name);
                } else {
                    name.push(c);
                }
            }
            // Unterminated literal.
            None
        }
        _ => {
            let raw = trimmed.split([',', ')', '\n']).next().unwrap_or_default().trim();
            (!raw.is_empty()).then(|| raw.to_string())
        }
    }
}
