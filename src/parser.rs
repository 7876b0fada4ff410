//! Description file parsing.
//!
//! A description file is line oriented:
//!
//! ```text
//! # link step
//! app: a.o b.o
//! 	cc -o app a.o b.o
//! a.o b.o: common.h
//! 	cc -c $<
//! CFLAGS = -O2
//! ```
//!
//! A `targets: dependencies` line opens a rule and every following line that
//! starts with a tab belongs to that rule's recipe. `#` starts a comment
//! outside recipes. `NAME = value` (or `NAME := value`) assignments are
//! collected but never expanded.

use std::fs;

use anyhow::{Context, Result};
use camino::Utf8Path;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// One rule record: several targets sharing a dependency list and recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Target names declared left of the colon.
    pub targets: Vec<String>,
    /// Dependency names declared right of the colon.
    pub deps: Vec<String>,
    /// Recipe lines with the leading tab removed.
    pub recipe: Vec<String>,
    /// One-based line number of the rule header.
    pub line: usize,
}

/// A variable assignment. Values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    /// Variable name.
    pub name: String,
    /// Assigned text.
    pub value: String,
    /// One-based line number of the assignment.
    pub line: usize,
}

/// Parsed contents of a description file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Makefile {
    /// Rules in file order.
    pub rules: Vec<Rule>,
    /// Variable assignments in file order.
    pub variables: Vec<Variable>,
}

/// Errors raised for malformed description files.
#[derive(Debug, Error, Diagnostic)]
pub enum ParseError {
    /// A tab-indented line appeared before any rule header.
    #[error("{file}:{line}: recipe commences before first target")]
    #[diagnostic(
        code(mymake::parse::orphan_recipe),
        help("add a `target: dependencies` line above the recipe")
    )]
    OrphanRecipe {
        /// Description file name.
        file: String,
        /// One-based line number.
        line: usize,
        /// File contents for rendering.
        #[source_code]
        src: NamedSource<String>,
        /// Offending line.
        #[label("recipe line without a rule")]
        span: SourceSpan,
    },
    /// A rule header with nothing left of the colon.
    #[error("{file}:{line}: rule has no target")]
    #[diagnostic(code(mymake::parse::empty_target))]
    EmptyTarget {
        /// Description file name.
        file: String,
        /// One-based line number.
        line: usize,
        /// File contents for rendering.
        #[source_code]
        src: NamedSource<String>,
        /// Offending line.
        #[label("expected at least one target name")]
        span: SourceSpan,
    },
    /// A line that is neither a rule, a recipe, an assignment nor a comment.
    #[error("{file}:{line}: missing separator")]
    #[diagnostic(
        code(mymake::parse::missing_separator),
        help("recipe lines must start with a tab; rule lines need a `:`")
    )]
    MissingSeparator {
        /// Description file name.
        file: String,
        /// One-based line number.
        line: usize,
        /// File contents for rendering.
        #[source_code]
        src: NamedSource<String>,
        /// Offending line.
        #[label("not a rule or assignment")]
        span: SourceSpan,
    },
}

impl ParseError {
    /// One-based line number the error points at.
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::OrphanRecipe { line, .. }
            | Self::EmptyTarget { line, .. }
            | Self::MissingSeparator { line, .. } => *line,
        }
    }
}

enum LineKind<'a> {
    Blank,
    Recipe(&'a str),
    Rule { targets: &'a str, deps: &'a str },
    Variable { name: &'a str, value: &'a str },
    Unknown,
}

fn strip_comment(text: &str) -> &str {
    text.split_once('#').map_or(text, |(before, _)| before)
}

fn classify(raw: &str) -> LineKind<'_> {
    if let Some(command) = raw.strip_prefix('\t') {
        return if command.trim().is_empty() {
            LineKind::Blank
        } else {
            LineKind::Recipe(command)
        };
    }
    let text = strip_comment(raw).trim();
    if text.is_empty() {
        return LineKind::Blank;
    }
    let Some(idx) = text.find([':', '=']) else {
        return LineKind::Unknown;
    };
    let (head, rest) = text.split_at(idx);
    if let Some(value) = rest.strip_prefix(":=").or_else(|| rest.strip_prefix('=')) {
        let name = head.trim();
        if name.is_empty() || name.contains(char::is_whitespace) {
            return LineKind::Unknown;
        }
        return LineKind::Variable {
            name,
            value: value.trim(),
        };
    }
    rest.strip_prefix(':')
        .map_or(LineKind::Unknown, |deps| LineKind::Rule {
            targets: head,
            deps,
        })
}

fn words(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_owned).collect()
}

/// Parse description file `source`; `file` names it in diagnostics.
///
/// # Errors
///
/// Returns a [`ParseError`] pointing at the first malformed line.
///
/// # Examples
///
/// ```
/// use mymake::parser::parse;
///
/// let makefile = parse("app: main.o\n\tcc -o app main.o\n", "Makefile.mymake").expect("parse");
/// assert_eq!(makefile.rules[0].targets, vec!["app"]);
/// assert_eq!(makefile.rules[0].recipe, vec!["cc -o app main.o"]);
/// ```
pub fn parse(source: &str, file: &str) -> Result<Makefile, ParseError> {
    let mut makefile = Makefile::default();
    let mut current: Option<Rule> = None;
    let mut offset = 0usize;

    for (idx, segment) in source.split_inclusive('\n').enumerate() {
        let line = idx + 1;
        let raw = segment.trim_end_matches(['\n', '\r']);
        let span = SourceSpan::from((offset, raw.len()));
        offset += segment.len();

        match classify(raw) {
            LineKind::Blank => {}
            LineKind::Recipe(command) => {
                let Some(rule) = current.as_mut() else {
                    return Err(ParseError::OrphanRecipe {
                        file: file.to_owned(),
                        line,
                        src: NamedSource::new(file, source.to_owned()),
                        span,
                    });
                };
                rule.recipe.push(command.to_owned());
            }
            LineKind::Rule { targets, deps } => {
                let targets = words(targets);
                if targets.is_empty() {
                    return Err(ParseError::EmptyTarget {
                        file: file.to_owned(),
                        line,
                        src: NamedSource::new(file, source.to_owned()),
                        span,
                    });
                }
                makefile.rules.extend(current.take());
                current = Some(Rule {
                    targets,
                    deps: words(deps),
                    recipe: Vec::new(),
                    line,
                });
            }
            LineKind::Variable { name, value } => {
                makefile.rules.extend(current.take());
                makefile.variables.push(Variable {
                    name: name.to_owned(),
                    value: value.to_owned(),
                    line,
                });
            }
            LineKind::Unknown => {
                return Err(ParseError::MissingSeparator {
                    file: file.to_owned(),
                    line,
                    src: NamedSource::new(file, source.to_owned()),
                    span,
                });
            }
        }
    }
    makefile.rules.extend(current);
    Ok(makefile)
}

/// Read and parse the description file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or fails to parse.
pub fn from_path(path: &Utf8Path) -> Result<Makefile> {
    let source =
        fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
    parse(&source, path.as_str()).with_context(|| format!("failed to parse {path}"))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, reason = "parser tests use expect for clearer failures")]
    use super::*;
    use rstest::rstest;

    fn rule(targets: &[&str], deps: &[&str], recipe: &[&str], line: usize) -> Rule {
        Rule {
            targets: targets.iter().map(|s| (*s).to_owned()).collect(),
            deps: deps.iter().map(|s| (*s).to_owned()).collect(),
            recipe: recipe.iter().map(|s| (*s).to_owned()).collect(),
            line,
        }
    }

    #[rstest]
    fn parses_rules_recipes_and_comments() {
        let src = "# build app\napp: a.o b.o # link\n\tcc -o app a.o b.o\n\n a.o:\n\tcc -c a.c\n\techo '# kept'\n";
        let makefile = parse(src, "Makefile.mymake").expect("parse");
        assert_eq!(
            makefile.rules,
            vec![
                rule(&["app"], &["a.o", "b.o"], &["cc -o app a.o b.o"], 2),
                rule(&["a.o"], &[], &["cc -c a.c", "echo '# kept'"], 5),
            ]
        );
        assert!(makefile.variables.is_empty());
    }

    #[rstest]
    fn multiple_targets_share_one_record() {
        let makefile = parse("a b: c\n\ttouch a b\n", "f").expect("parse");
        assert_eq!(makefile.rules, vec![rule(&["a", "b"], &["c"], &["touch a b"], 1)]);
    }

    #[rstest]
    #[case("CC = gcc\n", "CC", "gcc")]
    #[case("FLAGS := -O2 -g\n", "FLAGS", "-O2 -g")]
    #[case("EMPTY =\n", "EMPTY", "")]
    fn assignments_are_collected(#[case] src: &str, #[case] name: &str, #[case] value: &str) {
        let makefile = parse(src, "f").expect("parse");
        assert_eq!(
            makefile.variables,
            vec![Variable {
                name: name.into(),
                value: value.into(),
                line: 1
            }]
        );
    }

    #[rstest]
    fn crlf_line_endings_are_accepted() {
        let makefile = parse("app: a\r\n\tcc a\r\n", "f").expect("parse");
        assert_eq!(makefile.rules, vec![rule(&["app"], &["a"], &["cc a"], 1)]);
    }

    #[rstest]
    fn recipe_before_rule_is_rejected() {
        let err = parse("\n\techo hi\n", "Makefile.mymake").expect_err("orphan");
        assert!(matches!(err, ParseError::OrphanRecipe { line: 2, .. }));
        assert_eq!(
            err.to_string(),
            "Makefile.mymake:2: recipe commences before first target"
        );
    }

    #[rstest]
    #[case("app: a\n    cc a\n", 2)]
    #[case("just words\n", 1)]
    fn lines_without_separator_are_rejected(#[case] src: &str, #[case] line: usize) {
        let err = parse(src, "f").expect_err("missing separator");
        assert!(matches!(err, ParseError::MissingSeparator { .. }));
        assert_eq!(err.line(), line);
    }

    #[rstest]
    fn rule_without_target_is_rejected() {
        let err = parse(": dep\n", "f").expect_err("empty target");
        assert!(matches!(err, ParseError::EmptyTarget { line: 1, .. }));
    }

    #[rstest]
    fn empty_source_has_no_rules() {
        assert_eq!(parse("", "f").expect("parse"), Makefile::default());
    }
}
