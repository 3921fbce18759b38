//! Out-of-band cache warm-up

use crate::engine::ValuationEngine;
use crate::ui;
use anyhow::Result;
use tracing::info;

/// Force-refreshes every price bucket and reports per-bucket outcomes.
pub async fn run_refresh(engine: &ValuationEngine) -> Result<()> {
    let pb = ui::new_progress_bar(5, true);
    pb.set_message("Refreshing price buckets...");

    let outcomes = engine
        .refresh_all(|_bucket| {
            pb.inc(1);
        })
        .await;
    pb.finish_and_clear();

    for outcome in &outcomes {
        let status = if outcome.ok {
            ui::style_text("ok", ui::StyleType::Success)
        } else {
            ui::style_text("failed", ui::StyleType::Error)
        };
        println!("{:>10}  {}", outcome.bucket, status);
    }

    let failed: Vec<&str> = outcomes.iter().filter(|o| !o.ok).map(|o| o.bucket).collect();
    info!(
        "Bucket refresh completed: {} ok, {} failed",
        outcomes.len() - failed.len(),
        failed.len()
    );
    if !failed.is_empty() {
        anyhow::bail!("Failed to refresh buckets: {}", failed.join(", "));
    }
    Ok(())
}
