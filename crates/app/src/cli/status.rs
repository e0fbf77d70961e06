//! `status` command.

use std::io::Write;

use clap::Args;

use crate::context::AppContext;
use crate::error::AppError;
use crate::services::Connectivity;

#[derive(Args, Debug, Default)]
pub struct StatusArgs {
    /// Keep probing and print every change until interrupted
    #[arg(long)]
    pub watch: bool,

    /// Stop watching after this many reported changes
    #[arg(long, requires = "watch")]
    pub changes: Option<usize>,
}

pub async fn run(ctx: &AppContext, args: StatusArgs) -> Result<String, AppError> {
    if !args.watch {
        let connectivity = ctx.connectivity.check_connection().await;
        return Ok(format!("Network: {connectivity}"));
    }

    let reported = watch(ctx, args.changes, &mut std::io::stdout()).await?;
    Ok(format!("Stopped watching after {reported} change(s)"))
}

/// Runs the periodic monitor and writes one line per connectivity change.
/// Returns when `limit` changes were written, the monitor stops, or on Ctrl-C.
pub async fn watch<W: Write>(
    ctx: &AppContext,
    limit: Option<usize>,
    out: &mut W,
) -> Result<usize, AppError> {
    let mut rx = ctx.connectivity.subscribe();
    let handle = ctx.connectivity.clone().spawn();

    let mut last = Connectivity::Unknown;
    let mut reported = 0;
    let result = loop {
        if limit.is_some_and(|limit| reported >= limit) {
            break Ok(reported);
        }
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break Ok(reported);
                }
                let status = *rx.borrow_and_update();
                if status == last {
                    continue;
                }
                last = status;
                if let Err(e) = writeln!(out, "Network: {status}").and_then(|_| out.flush()) {
                    break Err(AppError::Output(e));
                }
                reported += 1;
            }
            _ = tokio::signal::ctrl_c() => break Ok(reported),
        }
    };

    handle.abort();
    result
}
