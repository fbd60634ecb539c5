// SPDX-License-Identifier: Apache-2.0

//! Poll waits with an optional terminal spinner.

use std::time::Duration;

use async_trait::async_trait;
use clarity_core::Sleeper;
use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::OutputContext;

/// Creates a styled spinner (only if interactive).
fn maybe_spinner(ctx: &OutputContext, message: &str) -> Option<ProgressBar> {
    if !ctx.is_interactive() {
        return None;
    }
    let s = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        s.set_style(style);
    }
    s.set_message(message.to_string());
    s.enable_steady_tick(Duration::from_millis(100));
    Some(s)
}

/// `Sleeper` that shows a spinner while waiting for analysis results.
pub struct SpinnerSleeper {
    ctx: OutputContext,
}

impl SpinnerSleeper {
    /// Creates a sleeper for the output context.
    pub fn new(ctx: OutputContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Sleeper for SpinnerSleeper {
    async fn sleep(&self, duration: Duration) {
        let spinner = maybe_spinner(
            &self.ctx,
            &format!("Waiting {}s for analysis results...", duration.as_secs()),
        );
        tokio::time::sleep(duration).await;
        if let Some(s) = spinner {
            s.finish_and_clear();
        }
    }
}
