use anyhow::{Context, Result};
use regex::Regex;

use crate::labels::{PageLabels, starts_with_any, starts_with_keyword};
use crate::normalize::{integer_tokens, strip_label};

/// Loose numeric lines only count as capacity when every figure is below this.
const LOOSE_NUMBER_LIMIT: i64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityFigures {
    /// Pool size, the first figure; never emitted.
    pub pool: Option<i64>,
    pub free_beds: i64,
    pub waiting_referrals: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass {
    Updated(String),
    Message(String),
    Capacity(CapacityFigures),
    Boilerplate,
    /// Numbers found without the capacity label (detached label variant).
    LooseNumbers(CapacityFigures),
    Unclassified,
}

type Matcher = fn(&Classifier, &str) -> Option<LineClass>;

/// Tried in order; the first matcher that recognizes a line decides it.
/// New page variants get a new entry here instead of a new scan loop.
const MATCHERS: &[(&str, Matcher)] = &[
    ("updated", match_updated),
    ("message", match_message),
    ("capacity", match_capacity),
    ("boilerplate", match_boilerplate),
    ("loose_numbers", match_loose_numbers),
];

#[derive(Debug, Clone)]
pub struct Classifier {
    labels: PageLabels,
    updated_pattern: Regex,
}

impl Classifier {
    pub fn new(labels: PageLabels) -> Result<Self> {
        let alternatives = labels
            .updated
            .iter()
            .map(|label| regex::escape(label))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = format!(r"(?i)^(?:{alternatives})\s*(\d{{4}}-\d{{2}}-\d{{2}}\s+\d{{2}}:\d{{2}})");
        let updated_pattern = Regex::new(&pattern)
            .with_context(|| format!("failed to compile timestamp pattern {pattern}"))?;
        Ok(Self {
            labels,
            updated_pattern,
        })
    }

    pub fn labels(&self) -> &PageLabels {
        &self.labels
    }

    pub fn classify(&self, line: &str) -> LineClass {
        MATCHERS
            .iter()
            .find_map(|(_, matcher)| matcher(self, line))
            .unwrap_or(LineClass::Unclassified)
    }

    /// Name of the matcher that decides `line`, for layout diagnostics.
    pub fn matcher_name(&self, line: &str) -> Option<&'static str> {
        MATCHERS
            .iter()
            .find(|(_, matcher)| matcher(self, line).is_some())
            .map(|(name, _)| *name)
    }
}

fn match_updated(classifier: &Classifier, line: &str) -> Option<LineClass> {
    if let Some(captures) = classifier.updated_pattern.captures(line) {
        return captures
            .get(1)
            .map(|stamp| LineClass::Updated(stamp.as_str().to_string()));
    }
    starts_with_any(line, &classifier.labels.updated).then_some(LineClass::Boilerplate)
}

fn match_message(classifier: &Classifier, line: &str) -> Option<LineClass> {
    classifier
        .labels
        .message
        .iter()
        .find_map(|label| strip_label(line, label))
        .map(|rest| LineClass::Message(rest.trim().to_string()))
}

fn match_capacity(classifier: &Classifier, line: &str) -> Option<LineClass> {
    let rest = strip_label(line, &classifier.labels.capacity)?;
    // Only integer tokens count, so words between the figures are skipped.
    let figures = integer_tokens(rest);
    if figures.len() < 2 {
        return Some(LineClass::Boilerplate);
    }
    Some(LineClass::Capacity(CapacityFigures {
        pool: Some(figures[0]),
        free_beds: figures[1],
        waiting_referrals: figures.get(2).copied().unwrap_or(0),
    }))
}

fn match_boilerplate(classifier: &Classifier, line: &str) -> Option<LineClass> {
    let labels = &classifier.labels;
    let known = labels.is_phone_line(line)
        || starts_with_keyword(line, &labels.boilerplate)
        || strip_label(line, labels.capacity.trim_end_matches(':')) == Some("");
    known.then_some(LineClass::Boilerplate)
}

fn match_loose_numbers(_classifier: &Classifier, line: &str) -> Option<LineClass> {
    let figures = integer_tokens(line)
        .into_iter()
        .filter(|value| value.abs() < LOOSE_NUMBER_LIMIT)
        .collect::<Vec<_>>();
    if figures.len() < 2 {
        return None;
    }
    Some(LineClass::LooseNumbers(CapacityFigures {
        pool: Some(figures[0]),
        free_beds: figures[1],
        waiting_referrals: figures.get(2).copied().unwrap_or(0),
    }))
}
