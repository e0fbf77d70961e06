//! `crops` command.

use std::fmt::Write as _;

use clap::Args;
use domain::services::filter_and_sort;

use super::parse_date;
use crate::context::AppContext;
use crate::error::AppError;

#[derive(Args, Debug)]
pub struct CropsArgs {
    /// Reference date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub date: Option<String>,
}

pub async fn run(ctx: &AppContext, args: CropsArgs) -> Result<String, AppError> {
    let reference = match args.date.as_deref() {
        Some(date) => parse_date(date)?,
        None => ctx.clock.now().date_naive(),
    };
    let horizon = ctx.config.crops.horizon_days;

    ctx.location.initialize().await;
    let origin = ctx.location.current_coordinates().await;

    let crops = filter_and_sort(&ctx.crops, origin, reference, horizon);
    let mut out = String::new();
    if origin.is_none() {
        out.push_str("Location unavailable; distances not shown\n");
    }
    if crops.is_empty() {
        let _ = write!(out, "No upcoming crops found in the next {horizon} days");
        return Ok(out);
    }

    let _ = writeln!(out, "Upcoming crops (next {horizon} days)");
    for annotated in &crops {
        let crop = &annotated.crop;
        let _ = writeln!(out, "\n{}  [{}]", crop.name, crop.status(reference));
        let _ = writeln!(out, "  Flowering: {}", crop.format_flowering_window());
        if let Some(label) = annotated.distance_label() {
            let _ = writeln!(out, "  {label}");
        }
        if let Some(density) = crop.recommended_hive_density {
            let _ = writeln!(out, "  Recommended: {density} hives/acre");
        }
    }
    Ok(out.trim_end().to_string())
}
