//! Image approval gate.
//!
//! Each image search produces an ordered list of candidates. The gate walks
//! them one at a time and settles on exactly one outcome for the whole
//! search:
//!
//! ```text
//! Pending(i) --accept--> Accepted(i)
//! Pending(i) --reject--> Pending(i + 1)   (or Exhausted after the last one)
//! Pending(i) --skip----> Skipped
//! []                      Exhausted
//! ```
//!
//! The state lives in [`GateState`] and only changes through
//! [`GateState::transition`], so a rejected candidate can never come back.
//!
//! Two modes share the same gate. [`ApprovalMode::Interactive`] previews
//! every candidate and asks the operator; [`ApprovalMode::Auto`] takes the
//! first candidate that downloads, without preview. A candidate whose
//! download fails is rejected on the operator's behalf in either mode.

use crate::config::ApprovalMode;
use crate::media::{ImageCandidate, MediaError, Previewer};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// Operator verdict on one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Reject,
    Skip,
}

/// Map a typed response to a decision. `None` means "ask again".
pub fn parse_response(input: &str) -> Option<Decision> {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(Decision::Accept),
        "n" | "no" => Some(Decision::Reject),
        "s" | "skip" => Some(Decision::Skip),
        _ => None,
    }
}

/// Where one image search stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Waiting for a verdict on candidate `index`.
    Pending { index: usize },
    Accepted { index: usize },
    /// Every candidate was rejected, or there were none.
    Exhausted,
    Skipped,
}

impl GateState {
    pub fn start(candidates: usize) -> Self {
        if candidates == 0 {
            GateState::Exhausted
        } else {
            GateState::Pending { index: 0 }
        }
    }

    /// Apply a decision. Terminal states ignore further decisions.
    pub fn transition(self, decision: Decision, candidates: usize) -> Self {
        let GateState::Pending { index } = self else {
            return self;
        };
        match decision {
            Decision::Accept => GateState::Accepted { index },
            Decision::Skip => GateState::Skipped,
            Decision::Reject if index + 1 < candidates => GateState::Pending { index: index + 1 },
            Decision::Reject => GateState::Exhausted,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, GateState::Pending { .. })
    }
}

/// Final outcome of one image search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Accepted {
        candidate: ImageCandidate,
        path: PathBuf,
    },
    Exhausted,
    Skipped,
}

/// Source of operator responses.
pub trait Operator {
    /// Show `prompt` and read one line. `Ok(None)` means input is closed.
    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>>;

    /// Tell the operator something without expecting an answer.
    fn tell(&mut self, message: &str);
}

/// Operator on the process's stdin/stdout.
pub struct TerminalOperator;

impl Operator for TerminalOperator {
    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let mut stdout = io::stdout();
        write!(stdout, "{prompt}")?;
        stdout.flush()?;
        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        Ok((read > 0).then_some(line))
    }

    fn tell(&mut self, message: &str) {
        println!("{message}");
    }
}

pub struct ApprovalGate<'a> {
    mode: ApprovalMode,
    previewer: &'a dyn Previewer,
    operator: Box<dyn Operator + 'a>,
}

impl<'a> ApprovalGate<'a> {
    pub fn new(
        mode: ApprovalMode,
        previewer: &'a dyn Previewer,
        operator: Box<dyn Operator + 'a>,
    ) -> Self {
        Self {
            mode,
            previewer,
            operator,
        }
    }

    /// Auto gate: no previewer, no operator.
    pub fn auto() -> ApprovalGate<'static> {
        ApprovalGate {
            mode: ApprovalMode::Auto,
            previewer: &NoPreview,
            operator: Box::new(ClosedInput),
        }
    }

    /// Walk `candidates` until one is accepted, all are rejected, or the
    /// operator skips. `fetch` downloads a candidate; a fetch error counts
    /// as a rejection.
    pub fn select<F>(&mut self, term: &str, candidates: &[ImageCandidate], mut fetch: F) -> Selection
    where
        F: FnMut(&ImageCandidate) -> Result<PathBuf, MediaError>,
    {
        let total = candidates.len();
        let mut state = GateState::start(total);
        let mut accepted_path = None;

        while let GateState::Pending { index } = state {
            let candidate = &candidates[index];
            let decision = match fetch(candidate) {
                Ok(path) => {
                    let decision = self.decide(term, &path, index, total);
                    accepted_path = Some(path);
                    decision
                }
                Err(e) => {
                    log::warn!("Candidate {} for '{}' unusable: {}", candidate.source_url, term, e);
                    accepted_path = None;
                    Decision::Reject
                }
            };
            state = state.transition(decision, total);
        }

        match (state, accepted_path) {
            (GateState::Accepted { index }, Some(path)) => {
                let mut candidate = candidates[index].clone();
                candidate.local_path = Some(path.clone());
                Selection::Accepted { candidate, path }
            }
            (GateState::Skipped, _) => Selection::Skipped,
            _ => Selection::Exhausted,
        }
    }

    /// Verdict on one downloaded candidate.
    fn decide(&mut self, term: &str, path: &Path, index: usize, total: usize) -> Decision {
        if self.mode == ApprovalMode::Auto {
            return Decision::Accept;
        }
        if let Err(e) = self.previewer.preview(path) {
            log::warn!(
                "Cannot preview {} ({}); accepting it without approval",
                path.display(),
                e
            );
            return Decision::Accept;
        }
        let prompt = format!(
            "Image {}/{} for '{}' ({}). Use it? [y]es / [n]o / [s]kip: ",
            index + 1,
            total,
            term,
            path.display()
        );
        loop {
            match self.operator.ask(&prompt) {
                Ok(Some(line)) => match parse_response(&line) {
                    Some(decision) => return decision,
                    None => self
                        .operator
                        .tell(&format!("Unrecognized answer '{}'", line.trim())),
                },
                Ok(None) => {
                    log::warn!("Input closed; skipping image for '{}'", term);
                    return Decision::Skip;
                }
                Err(e) => {
                    log::warn!("Cannot read response ({}); skipping image for '{}'", e, term);
                    return Decision::Skip;
                }
            }
        }
    }
}

struct NoPreview;

impl Previewer for NoPreview {
    fn preview(&self, _path: &Path) -> Result<(), MediaError> {
        Err(MediaError::PreviewUnavailable("auto mode".into()))
    }
}

struct ClosedInput;

impl Operator for ClosedInput {
    fn ask(&mut self, _prompt: &str) -> io::Result<Option<String>> {
        Ok(None)
    }

    fn tell(&mut self, _message: &str) {}
}
