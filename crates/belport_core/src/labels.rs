use serde::{Deserialize, Serialize};

use crate::normalize::strip_label;

/// Vocabulary of the status page. Every list can be overridden from the
/// `[labels]` section of the config file; missing keys keep the defaults.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct PageLabels {
    pub phone_markers: Vec<String>,
    pub updated: Vec<String>,
    pub message: Vec<String>,
    pub capacity: String,
    pub boilerplate: Vec<String>,
}

impl Default for PageLabels {
    fn default() -> Self {
        Self {
            phone_markers: strings(&["Telefon:", "Tel:", "Phone:"]),
            updated: strings(&["Uppdaterad:", "Updated:"]),
            message: strings(&["Meddelande:", "Message:"]),
            capacity: "Geriatrik:".to_string(),
            boilerplate: strings(&[
                "Jour",
                "On call",
                "Område",
                "Area",
                "Enhet",
                "Unit",
                "Prioritet",
                "Priority",
                "Disponibla",
                "Lediga",
                "Väntande",
            ]),
        }
    }
}

impl PageLabels {
    pub fn is_phone_line(&self, line: &str) -> bool {
        starts_with_any(line, &self.phone_markers)
    }
}

pub(crate) fn starts_with_any(line: &str, labels: &[String]) -> bool {
    labels
        .iter()
        .any(|label| strip_label(line, label).is_some())
}

/// Like `starts_with_any`, but the keyword must end at a word boundary:
/// end of line, whitespace or a colon. `Unit` does not match `Unitas`.
pub(crate) fn starts_with_keyword(line: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|keyword| {
        strip_label(line, keyword).is_some_and(|rest| {
            rest.chars()
                .next()
                .is_none_or(|next| next.is_whitespace() || next == ':')
        })
    })
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}
