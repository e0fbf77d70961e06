//! `location` subcommands.

use std::fmt::Write as _;
use std::time::Duration;

use clap::{Args, Subcommand};
use domain::models::{LocationSnapshot, LocationSource};
use domain::services::LocationState;

use crate::context::AppContext;
use crate::error::AppError;

#[derive(Subcommand, Debug)]
pub enum LocationCommand {
    /// Show the stored location without prompting the device
    Show,
    /// Reuse a fresh location or ask the device
    Init,
    /// Ask the device again
    Refresh,
    /// Search for a place and use it as the current location
    Manual(ManualArgs),
    /// Forget the stored location
    Clear,
}

#[derive(Args, Debug)]
pub struct ManualArgs {
    /// Place to search for
    pub query: String,

    /// Which suggestion to use (1-based)
    #[arg(long, default_value_t = 1)]
    pub pick: usize,
}

pub async fn run(ctx: &AppContext, command: LocationCommand) -> Result<String, AppError> {
    match command {
        LocationCommand::Show => {
            let state = ctx.location.restore().await;
            Ok(render(ctx, &state).await)
        }
        LocationCommand::Init => {
            let state = ctx.location.initialize().await;
            Ok(render(ctx, &state).await)
        }
        LocationCommand::Refresh => {
            ctx.location.restore().await;
            let state = ctx.location.refresh().await;
            Ok(render(ctx, &state).await)
        }
        LocationCommand::Manual(args) => manual(ctx, args).await,
        LocationCommand::Clear => {
            ctx.location.restore().await;
            ctx.location.clear().await;
            Ok("Location cleared".to_string())
        }
    }
}

async fn manual(ctx: &AppContext, args: ManualArgs) -> Result<String, AppError> {
    let min_len = ctx.config.location.min_query_len;
    if args.query.trim().chars().count() < min_len {
        return Err(AppError::InvalidInput(format!(
            "Enter at least {min_len} characters to search"
        )));
    }

    ctx.location.restore().await;
    ctx.location.request_manual_entry().await;

    let debouncer = ctx.search_debouncer();
    let mut suggestions_rx = debouncer.subscribe();
    debouncer.on_query_changed(&args.query);

    let wait = Duration::from_millis(
        ctx.config.location.search_debounce_ms + ctx.config.places.timeout_ms + 1000,
    );
    if tokio::time::timeout(wait, suggestions_rx.changed()).await.is_err() {
        return Err(AppError::Timeout(wait.as_millis() as u64));
    }
    let suggestions = suggestions_rx.borrow_and_update().clone();
    if suggestions.is_empty() {
        return Err(AppError::InvalidInput(format!(
            "No places found for '{}'",
            args.query
        )));
    }

    let index = args.pick.max(1) - 1;
    let chosen = suggestions.get(index).ok_or_else(|| {
        AppError::InvalidInput(format!(
            "only {} suggestion(s) available",
            suggestions.len()
        ))
    })?;

    let selection = debouncer
        .select(chosen)
        .await
        .map_err(AppError::Domain)?;
    let snapshot = ctx.location.confirm_manual(selection).await?;

    let mut out = String::new();
    for (i, suggestion) in suggestions.iter().enumerate() {
        let marker = if i == index { '*' } else { ' ' };
        let _ = writeln!(out, "{marker} {}. {}", i + 1, suggestion.description);
    }
    let _ = write!(out, "Location set to {}", snapshot.display_label());
    Ok(out)
}

fn describe_snapshot(snapshot: &LocationSnapshot, now_millis: i64) -> String {
    let source = match snapshot.source {
        LocationSource::DeviceGps => "device",
        LocationSource::ManualEntry => "manual entry",
    };
    let age_minutes = (now_millis - snapshot.timestamp).max(0) / 60_000;
    let mut out = format!(
        "{} ({source}, {age_minutes} min old)",
        snapshot.display_label()
    );
    if snapshot.source == LocationSource::DeviceGps {
        if let Some(address) = &snapshot.address {
            let _ = write!(out, "\n  {address}");
        }
    }
    out
}

async fn render(ctx: &AppContext, state: &LocationState) -> String {
    let now = ctx.clock.now_millis();
    let permission = ctx.location.permission().await;
    let mut out = match state {
        LocationState::Available(snapshot) => {
            format!("Current location: {}", describe_snapshot(snapshot, now))
        }
        LocationState::Denied(reason) => {
            format!("Location unavailable: {reason}. Use `location manual <place>` to enter it.")
        }
        LocationState::Unknown | LocationState::Requesting | LocationState::ManualPending => {
            "No current location".to_string()
        }
    };
    if state.snapshot().is_none() {
        if let Some(stale) = ctx.location.last_known().await {
            let _ = write!(out, "\nLast known: {}", describe_snapshot(&stale, now));
        }
    }
    let _ = write!(out, "\nPermission: {permission}");
    out
}
