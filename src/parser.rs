//! Tokenizer for question bank source files.
//!
//! A source file holds tuples of eleven bracketed groups:
//!
//! ```text
//! (source)(question)(A)(text)(B)(text)(C)(text)(D)(text)(letter)
//! ```
//!
//! Groups may span lines and may contain parentheses of their own; see
//! `closes_group` for where a group ends. Whitespace between groups is
//! ignored. Other text outside a group ends the current run of groups, and a
//! tuple never spans two runs.

use std::fmt;

use crate::models::Letter;

const TUPLE_GROUPS: usize = 11;
const MARKERS: [(usize, &str); 4] = [(2, "A"), (4, "B"), (6, "C"), (8, "D")];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTuple {
    pub line: usize,
    pub source: String,
    pub question: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct: Letter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    InvalidCorrectLetter(String),
    MissingCorrectLetter,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::InvalidCorrectLetter(found) => {
                write!(f, "correct letter '{}' is not one of A, B, C, D", found)
            }
            SkipReason::MissingCorrectLetter => write!(f, "correct letter is missing"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Parsed(ParsedTuple),
    Skipped { line: usize, reason: SkipReason },
}

impl ParseOutcome {
    pub fn line(&self) -> usize {
        match self {
            ParseOutcome::Parsed(tuple) => tuple.line,
            ParseOutcome::Skipped { line, .. } => *line,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Group {
    text: String,
    line: usize,
}

/// Whether the `)` at `at` ends the group it belongs to.
///
/// A group ends at the first `)` followed, after optional whitespace, by `(`
/// or the end of input. A `)` that leaves the group balanced also ends it when
/// nothing but spaces sit between it and the end of the line. Any other `)`
/// is part of the text, so `:(` and `a) yes b) no` survive inside a group.
fn closes_group(chars: &[char], at: usize, depth: usize) -> bool {
    let rest = &chars[at + 1..];
    match rest.iter().find(|c| !c.is_whitespace()) {
        None | Some('(') => return true,
        Some(_) => {}
    }
    depth == 0
        && rest
            .iter()
            .find(|c| !c.is_whitespace() || **c == '\n')
            .is_some_and(|c| *c == '\n')
}

/// Splits the input into runs of adjacent bracketed groups.
fn scan_runs(input: &str) -> Vec<Vec<Group>> {
    let chars: Vec<char> = input.chars().collect();
    let mut runs = Vec::new();
    let mut run: Vec<Group> = Vec::new();
    let mut line = 1;
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '(' => {
                let mut depth = 0usize;
                let mut end = None;
                for (j, c) in chars.iter().enumerate().skip(i + 1) {
                    match c {
                        '(' => depth += 1,
                        ')' if closes_group(&chars, j, depth) => {
                            end = Some(j);
                            break;
                        }
                        ')' => depth = depth.saturating_sub(1),
                        _ => {}
                    }
                }

                let Some(end) = end else {
                    // Unclosed group runs to end of input
                    break;
                };
                let text: String = chars[i + 1..end].iter().collect();
                let start_line = line;
                line += text.matches('\n').count();
                run.push(Group {
                    text,
                    line: start_line,
                });
                i = end + 1;
                continue;
            }
            '\n' => line += 1,
            c if c.is_whitespace() => {}
            _ => {
                if !run.is_empty() {
                    runs.push(std::mem::take(&mut run));
                }
            }
        }
        i += 1;
    }

    if !run.is_empty() {
        runs.push(run);
    }
    runs
}

fn starts_tuple(run: &[Group], at: usize) -> bool {
    at + TUPLE_GROUPS - 1 <= run.len()
        && MARKERS
            .iter()
            .all(|(offset, marker)| run[at + offset].text.trim() == *marker)
}

fn parse_run(run: &[Group], out: &mut Vec<ParseOutcome>) {
    let mut i = 0;
    while i < run.len() {
        if !starts_tuple(run, i) {
            i += 1;
            continue;
        }

        let line = run[i].line;
        let start = i;
        let field = move |offset: usize| run[start + offset].text.trim().to_string();

        match run.get(i + TUPLE_GROUPS - 1) {
            Some(letter_group) => match Letter::from_str(&letter_group.text) {
                Some(correct) => {
                    out.push(ParseOutcome::Parsed(ParsedTuple {
                        line,
                        source: field(0),
                        question: field(1),
                        option_a: field(3),
                        option_b: field(5),
                        option_c: field(7),
                        option_d: field(9),
                        correct,
                    }));
                    i += TUPLE_GROUPS;
                }
                None => {
                    out.push(ParseOutcome::Skipped {
                        line,
                        reason: SkipReason::InvalidCorrectLetter(
                            letter_group.text.trim().to_string(),
                        ),
                    });
                    // The offending group may open the next tuple
                    i += TUPLE_GROUPS - 1;
                }
            },
            None => {
                out.push(ParseOutcome::Skipped {
                    line,
                    reason: SkipReason::MissingCorrectLetter,
                });
                i += TUPLE_GROUPS - 1;
            }
        }
    }
}

/// Extracts every recognizable tuple from a source file's text, in file order.
pub fn parse(input: &str) -> Vec<ParseOutcome> {
    let mut outcomes = Vec::new();
    for run in scan_runs(input) {
        parse_run(&run, &mut outcomes);
    }
    outcomes
}
