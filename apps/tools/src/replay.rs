use std::sync::Arc;

use anyhow::Result;
use catalog::HandlerCatalog;
use dispatcher::DispatchOutcome;
use sdk_integration::SdkProvider;
use serde::{Deserialize, Serialize};
use shared::domain::{EnvContext, HandlerId, UiEvent};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::warn;

/// One JSON Lines record of a replay file.
#[derive(Debug, Deserialize)]
pub struct ReplayLine {
    pub handler: HandlerId,
    pub event: UiEvent,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    pub performed: usize,
    pub ignored: usize,
    pub failed: usize,
}

/// Dispatches every line in input order. Bad lines are counted as failed.
pub async fn replay<R>(
    input: R,
    catalog: &HandlerCatalog,
    provider: Arc<dyn SdkProvider>,
    env: Option<&EnvContext>,
) -> Result<ReplaySummary>
where
    R: AsyncBufRead + Unpin,
{
    let mut summary = ReplaySummary::default();
    let mut lines = input.lines();
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }

        let record: ReplayLine = match serde_json::from_str(&line) {
            Ok(record) => record,
            Err(err) => {
                warn!(line = line_no, error = %err, "unreadable replay line");
                summary.failed += 1;
                continue;
            }
        };

        let Some(dispatcher) =
            catalog.dispatcher(record.handler.as_str(), Arc::clone(&provider), env.cloned())
        else {
            warn!(line = line_no, handler = %record.handler, "unknown handler");
            summary.failed += 1;
            continue;
        };

        match dispatcher.handle(record.event) {
            Ok(DispatchOutcome::Performed { .. }) => summary.performed += 1,
            Ok(DispatchOutcome::Ignored) => summary.ignored += 1,
            Err(err) => {
                warn!(line = line_no, error = %err, "dispatch failed");
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
#[path = "tests/replay_tests.rs"]
mod tests;
