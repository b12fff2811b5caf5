//! Run lifecycle as data. Stages report a [`StageResult`]; [`transition`]
//! is the only place that decides what happens next.

use std::fmt;

use newsdesk_common::CandidateArticle;

pub const NO_RESULTS_MESSAGE: &str = "No particular news was found regarding your query.";
pub const NO_SCRAPES_MESSAGE: &str =
    "Something went wrong while getting news articles. Please try again later.";
pub const NO_SUMMARIES_MESSAGE: &str = "Something went wrong while summarizing the news articles: no summaries were generated. Please try again later.";
pub const SYNTH_FAILED_MESSAGE: &str =
    "Something went wrong while generating the final response. Please try again later.";
pub const ERRORED_MESSAGE: &str =
    "Sorry, something went wrong while processing your query. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Rejected,
    NoResults,
    NoScrapes,
    NoSummaries,
    SynthFailed,
    Errored,
    Done,
}

impl Outcome {
    pub const ALL: [Outcome; 7] = [
        Outcome::Rejected,
        Outcome::NoResults,
        Outcome::NoScrapes,
        Outcome::NoSummaries,
        Outcome::SynthFailed,
        Outcome::Errored,
        Outcome::Done,
    ];

    /// Fixed user-facing text. `Rejected` and `Done` carry run-specific text.
    pub fn fixed_message(&self) -> Option<&'static str> {
        match self {
            Outcome::NoResults => Some(NO_RESULTS_MESSAGE),
            Outcome::NoScrapes => Some(NO_SCRAPES_MESSAGE),
            Outcome::NoSummaries => Some(NO_SUMMARIES_MESSAGE),
            Outcome::SynthFailed => Some(SYNTH_FAILED_MESSAGE),
            Outcome::Errored => Some(ERRORED_MESSAGE),
            Outcome::Rejected | Outcome::Done => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Rejected => "rejected",
            Outcome::NoResults => "no_results",
            Outcome::NoScrapes => "no_scrapes",
            Outcome::NoSummaries => "no_summaries",
            Outcome::SynthFailed => "synth_failed",
            Outcome::Errored => "errored",
            Outcome::Done => "done",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Validating,
    Searching,
    Scraping,
    Summarizing,
    Synthesizing,
    Finished(Outcome),
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Finished(_))
    }
}

/// What a stage produced, reduced to what the next transition needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageResult {
    Verdict { valid: bool },
    Found(usize),
    Scraped(usize),
    Summarized(usize),
    Synthesized { ok: bool },
    Fault,
}

pub fn transition(state: RunState, result: StageResult) -> RunState {
    use RunState::*;
    use StageResult::*;

    match (state, result) {
        (Finished(outcome), _) => Finished(outcome),
        (_, Fault) => Finished(Outcome::Errored),

        (Validating, Verdict { valid: true }) => Searching,
        (Validating, Verdict { valid: false }) => Finished(Outcome::Rejected),

        (Searching, Found(0)) => Finished(Outcome::NoResults),
        (Searching, Found(_)) => Scraping,

        (Scraping, Scraped(0)) => Finished(Outcome::NoScrapes),
        (Scraping, Scraped(_)) => Summarizing,

        (Summarizing, Summarized(0)) => Finished(Outcome::NoSummaries),
        (Summarizing, Summarized(_)) => Synthesizing,

        (Synthesizing, Synthesized { ok: true }) => Finished(Outcome::Done),
        (Synthesizing, Synthesized { ok: false }) => Finished(Outcome::SynthFailed),

        // Result reported by the wrong stage.
        _ => Finished(Outcome::Errored),
    }
}

// --- Progress announcements ---

pub fn searching_message() -> String {
    "Searching trusted Nepali news sources...".to_string()
}

pub fn found_message(candidates: &[CandidateArticle]) -> String {
    let mut msg = format!(
        "Found {} news article{}:\n",
        candidates.len(),
        plural(candidates.len())
    );
    for (i, c) in candidates.iter().enumerate() {
        let title = if c.title.trim().is_empty() {
            "Untitled"
        } else {
            c.title.trim()
        };
        msg.push_str(&format!("\n{}. {} ({})", i + 1, title, c.link));
    }
    msg
}

pub fn scraped_message(scraped: usize, found: usize) -> String {
    format!("Read {scraped} of {found} article{}.", plural(found))
}

pub fn summarizing_message(count: usize) -> String {
    format!("Summarizing {count} article{}...", plural(count))
}

pub fn finalizing_message() -> String {
    "Putting together the final answer...".to_string()
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
