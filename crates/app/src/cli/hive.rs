//! `hive` subcommands.

use std::fmt::Write as _;

use clap::{Args, Subcommand};
use domain::models::{HiveForm, HivePatch, HiveRecord};
use domain::services::{filter, EditOutcome, HiveFilter};
use domain::DomainError;
use shared::Coordinates;

use super::parse_timestamp;
use crate::context::AppContext;
use crate::error::AppError;

#[derive(Subcommand, Debug)]
pub enum HiveCommand {
    /// Log a new hive
    Add(AddArgs),
    /// Show one hive
    Show { hive_id: String },
    /// List hives, optionally filtered
    List(ListArgs),
    /// Change fields of an existing hive (not its ID)
    Update(UpdateArgs),
    /// Edit a hive; changing the ID needs --yes
    Edit(EditArgs),
    /// Delete a hive
    Remove { hive_id: String },
    /// Delete every hive
    Clear {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
pub struct AddArgs {
    #[arg(long = "id")]
    pub hive_id: String,

    /// Number of colonies
    #[arg(long)]
    pub colonies: String,

    /// Date placed (YYYY-MM-DD or RFC 3339); defaults to now
    #[arg(long)]
    pub date: Option<String>,

    /// Latitude; defaults to the current location
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Match hive ID or colony count
    #[arg(long)]
    pub query: Option<String>,

    /// Only hives within this distance of the current location
    #[arg(long)]
    pub radius_km: Option<f64>,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    pub hive_id: String,

    #[arg(long)]
    pub colonies: Option<u32>,

    #[arg(long)]
    pub date: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub lat: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    pub lon: Option<f64>,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    pub hive_id: String,

    /// New hive ID
    #[arg(long = "id")]
    pub new_id: Option<String>,

    #[arg(long)]
    pub colonies: Option<String>,

    #[arg(long)]
    pub date: Option<String>,

    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// Confirm an ID change
    #[arg(long)]
    pub yes: bool,
}

pub async fn run(ctx: &AppContext, command: HiveCommand) -> Result<String, AppError> {
    match command {
        HiveCommand::Add(args) => add(ctx, args).await,
        HiveCommand::Show { hive_id } => show(ctx, &hive_id).await,
        HiveCommand::List(args) => list(ctx, args).await,
        HiveCommand::Update(args) => update(ctx, args).await,
        HiveCommand::Edit(args) => edit(ctx, args).await,
        HiveCommand::Remove { hive_id } => {
            if ctx.hives.remove(&hive_id).await {
                Ok(format!("Hive {hive_id} removed"))
            } else {
                Err(DomainError::NotFound(hive_id).into())
            }
        }
        HiveCommand::Clear { yes } => {
            if !yes {
                return Ok("This deletes every hive. Re-run with --yes to confirm.".to_string());
            }
            let count = ctx.hives.len().await;
            ctx.hives.clear().await;
            Ok(format!("Removed {count} hive(s)"))
        }
    }
}

fn coordinates_arg(lat: Option<f64>, lon: Option<f64>) -> Option<Coordinates> {
    match (lat, lon) {
        (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
        _ => None,
    }
}

async fn add(ctx: &AppContext, args: AddArgs) -> Result<String, AppError> {
    let location = match coordinates_arg(args.lat, args.lon) {
        Some(location) => Some(location),
        None => {
            ctx.location.restore().await;
            ctx.location.current_coordinates().await
        }
    };
    let form = HiveForm {
        hive_id: args.hive_id,
        num_colonies: args.colonies,
        date_placed: args.date.as_deref().map(parse_timestamp).transpose()?,
        location,
    };

    let record = form.validate_and_build(ctx.clock.now())?;
    ctx.hives.add(record.clone()).await?;
    Ok(format!("Hive added\n{}", describe(&record, None)))
}

async fn show(ctx: &AppContext, hive_id: &str) -> Result<String, AppError> {
    let record = ctx
        .hives
        .find_by_id(hive_id)
        .await
        .ok_or_else(|| DomainError::NotFound(hive_id.to_string()))?;
    ctx.location.restore().await;
    let origin = ctx.location.current_coordinates().await;
    Ok(describe(&record, origin))
}

async fn list(ctx: &AppContext, args: ListArgs) -> Result<String, AppError> {
    if let Some(radius) = args.radius_km {
        shared::validation::validate_radius_km(radius)
            .map_err(|_| AppError::InvalidInput(format!("invalid radius {radius}")))?;
    }
    let criteria = HiveFilter::new(args.query, args.radius_km);

    ctx.location.restore().await;
    let origin = ctx.location.current_coordinates().await;

    let all = ctx.hives.list_all().await;
    let matching = filter(&all, &criteria, origin);

    let mut out = String::new();
    if all.is_empty() {
        out.push_str("No hives logged yet");
        return Ok(out);
    }
    let active = criteria.active_filter_count();
    let _ = write!(out, "{} of {} hive(s)", matching.len(), all.len());
    if active > 0 {
        let _ = write!(out, " ({active} filter active)");
    }
    out.push('\n');
    if criteria.radius_km.is_some() && !criteria.radius_applies(origin) {
        out.push_str("Radius filter not applied: current location unknown\n");
    }
    for record in &matching {
        out.push_str(&describe_line(record, origin));
        out.push('\n');
    }
    Ok(out.trim_end().to_string())
}

async fn update(ctx: &AppContext, args: UpdateArgs) -> Result<String, AppError> {
    let patch = HivePatch {
        date_placed: args.date.as_deref().map(parse_timestamp).transpose()?,
        num_colonies: args.colonies,
        latitude: args.lat,
        longitude: args.lon,
    };
    if patch.is_empty() {
        return Err(AppError::InvalidInput("nothing to update".to_string()));
    }
    patch.validate_at(ctx.clock.now())?;

    if !ctx.hives.update(&args.hive_id, &patch).await {
        return Err(DomainError::NotFound(args.hive_id).into());
    }
    Ok(format!("Hive {} updated", args.hive_id))
}

async fn edit(ctx: &AppContext, args: EditArgs) -> Result<String, AppError> {
    let existing = ctx
        .hives
        .find_by_id(&args.hive_id)
        .await
        .ok_or_else(|| DomainError::NotFound(args.hive_id.clone()))?;

    let mut form = HiveForm::from_record(&existing);
    if let Some(new_id) = args.new_id {
        form.hive_id = new_id;
    }
    if let Some(colonies) = args.colonies {
        form.num_colonies = colonies;
    }
    if let Some(date) = args.date.as_deref() {
        form.date_placed = Some(parse_timestamp(date)?);
    }
    if let Some(location) = coordinates_arg(args.lat, args.lon) {
        form.location = Some(location);
    }

    let record = form.validate_and_build(ctx.clock.now())?;
    match ctx.hives.save_edit(&args.hive_id, record).await? {
        EditOutcome::Updated => Ok(format!("Hive {} updated", args.hive_id)),
        EditOutcome::RenameRequiresConfirmation(command) => {
            if !args.yes {
                return Ok(format!(
                    "Changing the Hive ID from {} to {} will create a new hive. \
                     Re-run with --yes to continue.",
                    command.old_id(),
                    command.new_id()
                ));
            }
            let message = format!("Hive {} is now {}", command.old_id(), command.new_id());
            ctx.hives.apply_rename(command).await?;
            Ok(message)
        }
    }
}

fn describe_line(record: &HiveRecord, origin: Option<Coordinates>) -> String {
    let mut line = format!(
        "{}  colonies: {}  placed: {}  at {}",
        record.hive_id,
        record.num_colonies,
        record.date_placed.format("%Y-%m-%d"),
        record.coordinates().display_short()
    );
    if let Some(origin) = origin {
        let _ = write!(line, "  ({:.1} km away)", origin.distance_to(&record.coordinates()));
    }
    line
}

fn describe(record: &HiveRecord, origin: Option<Coordinates>) -> String {
    let mut out = format!(
        "Hive ID:       {}\nColonies:      {}\nDate placed:   {}\nLocation:      {}",
        record.hive_id,
        record.num_colonies,
        record.date_placed.format("%Y-%m-%d %H:%M UTC"),
        record.coordinates().display_short()
    );
    if let Some(origin) = origin {
        let _ = write!(
            out,
            "\nDistance:      {:.1} km",
            origin.distance_to(&record.coordinates())
        );
    }
    out
}
