// src/models.rs
use serde::{Deserialize, Serialize};

use crate::dates::{FieldDisplay, WindowStatus};

/// The contract stores exactly three choice slots in its global schema.
pub const CHOICE_COUNT: usize = 3;

/// An in-progress poll configuration, mutated field-by-field as the user
/// types. Dates are ISO `YYYY-MM-DD` strings straight from the date picker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub choices: [String; CHOICE_COUNT],
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
}

/// Voting window in epoch seconds, the contract's canonical time form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteWindow {
    pub start: i64,
    pub end: i64,
}

/// Read model of one poll app's global state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollSnapshot {
    pub app_id: u64,
    pub creator: String,
    pub title: String,
    pub choices: [String; CHOICE_COUNT],
    pub tallies: [u64; CHOICE_COUNT],
    pub total_votes: u64,
    pub accounts_opted_in: u64,
    /// `DD/MM/YYYY` display strings, as stored on chain. Empty until the
    /// vote dates have been set.
    pub start_date: String,
    pub end_date: String,
    pub window: Option<VoteWindow>,
    pub finalized: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePollRequest {
    /// Falls back to the wallet's active address when omitted.
    pub sender: Option<String>,
    pub draft: PollDraft,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatePollResponse {
    pub app_id: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountRequest {
    pub sender: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VoteRequest {
    pub sender: Option<String>,
    /// 1-based choice number, matching the contract's argument convention.
    pub choice: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct PollView {
    #[serde(flatten)]
    pub poll: PollSnapshot,
    pub voting_open: WindowStatus,
}

/// Per-field highlighting plus the overall verdict for a draft, shaped for
/// the poll form to consume directly.
#[derive(Debug, Clone, Serialize)]
pub struct DraftReport {
    pub submittable: bool,
    pub message: String,
    pub fields: DraftFieldReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct DraftFieldReport {
    pub title: FieldDisplay,
    pub choices: [FieldDisplay; CHOICE_COUNT],
    pub start_date: FieldDisplay,
    pub end_date: FieldDisplay,
}
