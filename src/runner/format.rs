// src/runner/format.rs

//! Run-command templates.
//!
//! A template such as `"valgrind --error-exitcode=1 %s"` wraps every test
//! executable: `%s` is replaced by the executable path, `%%` is a literal
//! percent sign. Anything else after a `%` is rejected, as is a template
//! without exactly one `%s`.

use std::fmt;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::errors::{Result, RunnerError};

// A `%` followed by any single character, or a trailing lone `%`.
static DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"%.?").expect("static regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Executable,
}

/// A validated run-command template.
///
/// The template is split into whitespace-separated words up front, so the
/// substituted executable path always stays within a single argument even if
/// it contains spaces.
#[derive(Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    source: String,
    words: Vec<Vec<Segment>>,
}

impl fmt::Debug for CommandTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CommandTemplate").field(&self.source).finish()
    }
}

impl fmt::Display for CommandTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl CommandTemplate {
    pub fn parse(template: &str) -> Result<Self> {
        let invalid = |reason: String| RunnerError::InvalidTemplate {
            template: template.to_string(),
            reason,
        };

        let mut words = Vec::new();
        let mut placeholders = 0usize;

        for word in template.split_whitespace() {
            let mut segments = Vec::new();
            let mut literal = String::new();
            let mut last = 0;

            for m in DIRECTIVE.find_iter(word) {
                literal.push_str(&word[last..m.start()]);
                last = m.end();

                match &m.as_str()[1..] {
                    "s" => {
                        placeholders += 1;
                        if !literal.is_empty() {
                            segments.push(Segment::Literal(std::mem::take(&mut literal)));
                        }
                        segments.push(Segment::Executable);
                    }
                    "%" => literal.push('%'),
                    "" => return Err(invalid("trailing '%' without a directive".to_string())),
                    other => {
                        return Err(invalid(format!(
                            "unsupported directive '%{other}' (only %s and %% are allowed)"
                        )));
                    }
                }
            }

            literal.push_str(&word[last..]);
            if !literal.is_empty() {
                segments.push(Segment::Literal(literal));
            }
            words.push(segments);
        }

        match placeholders {
            1 => Ok(Self {
                source: template.to_string(),
                words,
            }),
            0 => Err(invalid("no %s placeholder for the executable".to_string())),
            n => Err(invalid(format!("{n} %s placeholders; exactly one is allowed"))),
        }
    }

    /// Argument vector with `executable` substituted.
    pub fn argv(&self, executable: &str) -> Vec<String> {
        self.words
            .iter()
            .map(|segments| {
                segments
                    .iter()
                    .map(|s| match s {
                        Segment::Literal(text) => text.as_str(),
                        Segment::Executable => executable,
                    })
                    .collect::<String>()
            })
            .collect()
    }

    /// The template text with `executable` substituted, whitespace kept as
    /// written.
    pub fn render(&self, executable: &str) -> String {
        DIRECTIVE
            .replace_all(&self.source, |caps: &Captures<'_>| match &caps[0] {
                "%s" => executable.to_string(),
                _ => "%".to_string(),
            })
            .into_owned()
    }
}

/// Final command line for `executable`: wrapped by `template` if there is one,
/// the executable unchanged otherwise.
pub fn format_command(template: Option<&CommandTemplate>, executable: &str) -> String {
    match template {
        Some(t) => t.render(executable),
        None => executable.to_string(),
    }
}

/// Same as [`format_command`], as an argument vector.
pub fn format_argv(template: Option<&CommandTemplate>, executable: &str) -> Vec<String> {
    match template {
        Some(t) => t.argv(executable),
        None => vec![executable.to_string()],
    }
}
