use serde::{Deserialize, Serialize};

pub const COLUMN_UNIT: &str = "Geriatrikenhet";
pub const COLUMN_UPDATED: &str = "Uppdaterad senast";
pub const COLUMN_FREE_BEDS: &str = "Lediga vårdplatser";
pub const COLUMN_WAITING: &str = "Väntande godkända remisser";
pub const COLUMN_MESSAGE: &str = "Meddelande";

pub const COLUMNS: [&str; 5] = [
    COLUMN_UNIT,
    COLUMN_UPDATED,
    COLUMN_FREE_BEDS,
    COLUMN_WAITING,
    COLUMN_MESSAGE,
];

/// Capacity status of one care unit as published on the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct UnitRecord {
    #[serde(rename = "Geriatrikenhet")]
    pub name: String,
    /// `YYYY-MM-DD HH:MM`, or empty when the unit never showed one.
    #[serde(rename = "Uppdaterad senast")]
    pub updated_at: String,
    #[serde(rename = "Lediga vårdplatser")]
    pub free_beds: i64,
    #[serde(rename = "Väntande godkända remisser")]
    pub waiting_referrals: i64,
    #[serde(rename = "Meddelande")]
    pub message: String,
}

impl UnitRecord {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Cells in `COLUMNS` order.
    pub fn to_row(&self) -> [String; 5] {
        [
            self.name.clone(),
            self.updated_at.clone(),
            self.free_beds.to_string(),
            self.waiting_referrals.to_string(),
            self.message.clone(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OutputPayload {
    pub source_url: String,
    pub scraped_at_utc: String,
    pub rows: Vec<UnitRecord>,
}
