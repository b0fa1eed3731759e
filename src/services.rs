// src/services.rs
//
// Orchestration flows from the poll UI: validate locally first, then
// sequence the gateway calls. A draft that fails validation never reaches
// the chain.

use thiserror::Error;
use tracing::info;

use crate::dates::{self, DraftError, FieldDisplay};
use crate::gateway::{ContractGateway, GatewayError};
use crate::models::{
    CreatePollRequest, DraftFieldReport, DraftReport, PollDraft, PollView, VoteRequest,
    CHOICE_COUNT,
};
use crate::wallet::WalletProvider;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("connect a wallet or supply a sender address")]
    NoSender,
    #[error(transparent)]
    Draft(#[from] DraftError),
    #[error("invalid choice {0}, expected 1 through {CHOICE_COUNT}")]
    ChoiceOutOfRange(u8),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// An explicit sender wins; otherwise fall back to the connected wallet.
pub fn resolve_sender(
    explicit: Option<String>,
    wallet: &dyn WalletProvider,
) -> Result<String, ServiceError> {
    explicit
        .filter(|sender| !sender.is_empty())
        .or_else(|| wallet.active_address())
        .ok_or(ServiceError::NoSender)
}

/// Create flow: check the draft, deploy the app, opt the creator in, set the
/// vote dates. Mirrors the order the original app performed these calls in.
pub async fn create_poll(
    gateway: &dyn ContractGateway,
    wallet: &dyn WalletProvider,
    request: CreatePollRequest,
) -> Result<u64, ServiceError> {
    let sender = resolve_sender(request.sender, wallet)?;
    let draft = request.draft;
    let window = dates::check_draft(&draft)?;
    let start_date = dates::format_for_chain(&draft.start_date);
    let end_date = dates::format_for_chain(&draft.end_date);

    let app_id = gateway.create_poll(&sender, &draft.title, &draft.choices).await?;
    gateway.opt_in(app_id, &sender).await?;
    gateway
        .set_vote_dates(app_id, &sender, &start_date, window.start, &end_date, window.end)
        .await?;

    info!(app_id, creator = %sender, title = %draft.title, "poll created");
    Ok(app_id)
}

pub async fn join_poll(
    gateway: &dyn ContractGateway,
    wallet: &dyn WalletProvider,
    app_id: u64,
    sender: Option<String>,
) -> Result<(), ServiceError> {
    let sender = resolve_sender(sender, wallet)?;
    gateway.opt_in(app_id, &sender).await?;
    info!(app_id, account = %sender, "account opted in");
    Ok(())
}

pub async fn leave_poll(
    gateway: &dyn ContractGateway,
    wallet: &dyn WalletProvider,
    app_id: u64,
    sender: Option<String>,
) -> Result<(), ServiceError> {
    let sender = resolve_sender(sender, wallet)?;
    gateway.opt_out(app_id, &sender).await?;
    info!(app_id, account = %sender, "account opted out");
    Ok(())
}

pub async fn cast_vote(
    gateway: &dyn ContractGateway,
    wallet: &dyn WalletProvider,
    app_id: u64,
    request: VoteRequest,
) -> Result<(), ServiceError> {
    let sender = resolve_sender(request.sender, wallet)?;
    if !(1..=CHOICE_COUNT as u8).contains(&request.choice) {
        return Err(ServiceError::ChoiceOutOfRange(request.choice));
    }
    gateway.submit_vote(app_id, &sender, request.choice).await?;
    info!(app_id, account = %sender, choice = request.choice, "vote submitted");
    Ok(())
}

pub async fn delete_poll(
    gateway: &dyn ContractGateway,
    wallet: &dyn WalletProvider,
    app_id: u64,
    sender: Option<String>,
) -> Result<(), ServiceError> {
    let sender = resolve_sender(sender, wallet)?;
    gateway.delete_poll(app_id, &sender).await?;
    info!(app_id, account = %sender, "poll deleted");
    Ok(())
}

/// Read flow: the snapshot plus a display-only open/closed status for the
/// supplied time. Polls without dates set yet simply read as closed.
pub async fn view_poll(
    gateway: &dyn ContractGateway,
    app_id: u64,
    now_epoch: i64,
) -> Result<PollView, ServiceError> {
    let poll = gateway.fetch_poll(app_id).await?;
    let voting_open = match poll.window {
        Some(window) => dates::is_window_currently_open(window.start, window.end, now_epoch),
        None => dates::WindowStatus {
            is_open: false,
            label: "No",
        },
    };
    Ok(PollView { poll, voting_open })
}

/// Judges a draft for the form: overall verdict, human-readable reason, and
/// per-field highlighting. Pure; safe to call on every keystroke.
pub fn review_draft(draft: &PollDraft) -> DraftReport {
    let outcome = dates::check_draft(draft);
    let message = match &outcome {
        Ok(_) => "All information valid, ready to create the poll".to_string(),
        Err(problem) => problem.to_string(),
    };
    let presence = |value: &str| {
        if value.trim().is_empty() {
            FieldDisplay::Missing
        } else {
            FieldDisplay::Ok
        }
    };
    let fields = DraftFieldReport {
        title: presence(&draft.title),
        choices: std::array::from_fn(|i| presence(&draft.choices[i])),
        start_date: dates::classify_field_for_display(&draft.start_date, draft),
        end_date: dates::classify_field_for_display(&draft.end_date, draft),
    };
    DraftReport {
        submittable: outcome.is_ok(),
        message,
        fields,
    }
}
