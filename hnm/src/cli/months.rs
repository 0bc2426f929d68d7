use anyhow::Result;
use hnmapped::prelude::*;
use tracing::info;

use crate::cli::AppContext;

pub async fn handle(ctx: &AppContext) -> Result<()> {
    let months = MonthList::new(ctx.source.available_months().await?);
    if months.is_empty() {
        info!("no months found in {}", ctx.source.describe());
    }
    ctx.output.emit_table(months.entries())
}
