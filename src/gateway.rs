// src/gateway.rs
//
// Seam to the VoteChain smart contract. The service validates everything
// before calling in here, but the contract re-asserts on chain; `Rejected`
// carries those assertion reasons back as data.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;

use crate::models::{PollSnapshot, VoteWindow, CHOICE_COUNT};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("transaction rejected: {0}")]
    Rejected(String),
    #[error("no poll app with id {0}")]
    UnknownApp(u64),
    #[error("chain node unavailable: {0}")]
    Unavailable(String),
}

/// Operations the poll contract exposes. Arguments arrive already validated;
/// fee and minimum-balance handling live entirely behind this seam.
#[async_trait]
pub trait ContractGateway: Send + Sync {
    /// Deploys a new poll app and returns its id.
    async fn create_poll(
        &self,
        creator: &str,
        title: &str,
        choices: &[String; CHOICE_COUNT],
    ) -> Result<u64, GatewayError>;

    /// Opts an account in to the app's local storage.
    async fn opt_in(&self, app_id: u64, account: &str) -> Result<(), GatewayError>;

    /// Closes the account out of local storage and refunds its balance lock.
    async fn opt_out(&self, app_id: u64, account: &str) -> Result<(), GatewayError>;

    /// Sets the voting window and finalizes the poll. One-shot: the contract
    /// only allows a poll to be set up once.
    async fn set_vote_dates(
        &self,
        app_id: u64,
        creator: &str,
        start_date: &str,
        start_epoch: i64,
        end_date: &str,
        end_epoch: i64,
    ) -> Result<(), GatewayError>;

    /// Casts a vote for a 1-based choice number.
    async fn submit_vote(&self, app_id: u64, account: &str, choice: u8)
        -> Result<(), GatewayError>;

    /// Deletes the app; creator only.
    async fn delete_poll(&self, app_id: u64, creator: &str) -> Result<(), GatewayError>;

    /// Reads the app's global state.
    async fn fetch_poll(&self, app_id: u64) -> Result<PollSnapshot, GatewayError>;
}

struct PollRecord {
    creator: String,
    title: String,
    choices: [String; CHOICE_COUNT],
    start_date: String,
    end_date: String,
    window: Option<VoteWindow>,
    finalized: bool,
    opted_in: HashSet<String>,
    // Local vote state per opted-in account; cleared when the account opts
    // out, while the tallies below persist like the contract's global state.
    votes: HashMap<String, u8>,
    tallies: [u64; CHOICE_COUNT],
}

/// In-memory stand-in for the chain-backed gateway, mirroring the contract's
/// observable accept/reject behaviour. Used by local development wiring and
/// by tests; the production implementation lives with the chain SDK.
pub struct InMemoryGateway {
    polls: Mutex<HashMap<u64, PollRecord>>,
    next_app_id: AtomicU64,
    frozen_now: Option<i64>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        InMemoryGateway {
            polls: Mutex::new(HashMap::new()),
            next_app_id: AtomicU64::new(1001),
            frozen_now: None,
        }
    }

    /// Pins "now" for deterministic window checks in tests.
    pub fn with_frozen_clock(now_epoch: i64) -> Self {
        InMemoryGateway {
            frozen_now: Some(now_epoch),
            ..InMemoryGateway::new()
        }
    }

    fn now(&self) -> i64 {
        self.frozen_now.unwrap_or_else(|| Utc::now().timestamp())
    }

    fn table(&self) -> MutexGuard<'_, HashMap<u64, PollRecord>> {
        self.polls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        InMemoryGateway::new()
    }
}

fn rejected(reason: &str) -> GatewayError {
    GatewayError::Rejected(reason.to_string())
}

#[async_trait]
impl ContractGateway for InMemoryGateway {
    async fn create_poll(
        &self,
        creator: &str,
        title: &str,
        choices: &[String; CHOICE_COUNT],
    ) -> Result<u64, GatewayError> {
        let app_id = self.next_app_id.fetch_add(1, Ordering::Relaxed);
        self.table().insert(
            app_id,
            PollRecord {
                creator: creator.to_string(),
                title: title.to_string(),
                choices: choices.clone(),
                start_date: String::new(),
                end_date: String::new(),
                window: None,
                finalized: false,
                opted_in: HashSet::new(),
                votes: HashMap::new(),
                tallies: [0; CHOICE_COUNT],
            },
        );
        Ok(app_id)
    }

    async fn opt_in(&self, app_id: u64, account: &str) -> Result<(), GatewayError> {
        let mut table = self.table();
        let record = table.get_mut(&app_id).ok_or(GatewayError::UnknownApp(app_id))?;
        if !record.opted_in.insert(account.to_string()) {
            return Err(rejected("account is already opted in"));
        }
        Ok(())
    }

    async fn opt_out(&self, app_id: u64, account: &str) -> Result<(), GatewayError> {
        let mut table = self.table();
        let record = table.get_mut(&app_id).ok_or(GatewayError::UnknownApp(app_id))?;
        if !record.opted_in.contains(account) {
            return Err(rejected("account must be opted in before closing out"));
        }
        // Voters stay locked in until the voting period is over.
        let voted = record.votes.contains_key(account);
        let window_over = record
            .window
            .map(|w| self.now() > w.end)
            .unwrap_or(false);
        if voted && !window_over {
            return Err(rejected(
                "voted accounts can only close out after the voting period ends",
            ));
        }
        record.opted_in.remove(account);
        record.votes.remove(account);
        Ok(())
    }

    async fn set_vote_dates(
        &self,
        app_id: u64,
        creator: &str,
        start_date: &str,
        start_epoch: i64,
        end_date: &str,
        end_epoch: i64,
    ) -> Result<(), GatewayError> {
        let mut table = self.table();
        let record = table.get_mut(&app_id).ok_or(GatewayError::UnknownApp(app_id))?;
        if record.creator != creator {
            return Err(rejected("only the app creator can set vote dates"));
        }
        if record.finalized {
            return Err(rejected("poll can only be set up once"));
        }
        // The contract re-asserts the window policy on chain.
        if let crate::dates::Verdict::Invalid(violation) =
            crate::dates::validate_window(start_epoch, end_epoch)
        {
            return Err(rejected(&violation.to_string()));
        }
        record.start_date = start_date.to_string();
        record.end_date = end_date.to_string();
        record.window = Some(VoteWindow {
            start: start_epoch,
            end: end_epoch,
        });
        record.finalized = true;
        Ok(())
    }

    async fn submit_vote(
        &self,
        app_id: u64,
        account: &str,
        choice: u8,
    ) -> Result<(), GatewayError> {
        let now = self.now();
        let mut table = self.table();
        let record = table.get_mut(&app_id).ok_or(GatewayError::UnknownApp(app_id))?;
        if !record.opted_in.contains(account) {
            return Err(rejected("account must be opted in before voting"));
        }
        let window = record
            .window
            .ok_or_else(|| rejected("poll dates have not been set"))?;
        // Exclusive bounds, exactly as the contract checks them.
        if now <= window.start {
            return Err(rejected("voting period has not started yet"));
        }
        if now >= window.end {
            return Err(rejected("voting period has ended"));
        }
        if record.votes.contains_key(account) {
            return Err(rejected("this account already submitted a vote"));
        }
        if !(1..=CHOICE_COUNT as u8).contains(&choice) {
            return Err(rejected("invalid choice, must be 1, 2 or 3"));
        }
        record.votes.insert(account.to_string(), choice);
        record.tallies[usize::from(choice) - 1] += 1;
        Ok(())
    }

    async fn delete_poll(&self, app_id: u64, creator: &str) -> Result<(), GatewayError> {
        let mut table = self.table();
        let record = table.get(&app_id).ok_or(GatewayError::UnknownApp(app_id))?;
        if record.creator != creator {
            return Err(rejected("only the app creator can delete the app"));
        }
        table.remove(&app_id);
        Ok(())
    }

    async fn fetch_poll(&self, app_id: u64) -> Result<PollSnapshot, GatewayError> {
        let table = self.table();
        let record = table.get(&app_id).ok_or(GatewayError::UnknownApp(app_id))?;
        Ok(PollSnapshot {
            app_id,
            creator: record.creator.clone(),
            title: record.title.clone(),
            choices: record.choices.clone(),
            tallies: record.tallies,
            total_votes: record.tallies.iter().sum(),
            accounts_opted_in: record.opted_in.len() as u64,
            start_date: record.start_date.clone(),
            end_date: record.end_date.clone(),
            window: record.window,
            finalized: record.finalized,
        })
    }
}
