use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One predicted song inside a slate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongPick {
    pub title: String,
    pub artist: String,
    #[serde(default, alias = "leadSingle")]
    pub lead_single: bool,
    #[serde(default, alias = "songId")]
    pub song_id: Option<String>,
    #[serde(default, alias = "imageURL")]
    pub image_url: Option<String>,
}

impl SongPick {
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            lead_single: false,
            song_id: None,
            image_url: None,
        }
    }

    pub fn lead(mut self) -> Self {
        self.lead_single = true;
        self
    }
}

/// A user's ordered prediction for the open round of a chart.
///
/// The position of a pick in `picks` is the rank the user claims for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionSlate {
    pub id: Uuid,
    pub chart_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub picks: Vec<SongPick>,
    pub submitted_at: DateTime<Utc>,
}
