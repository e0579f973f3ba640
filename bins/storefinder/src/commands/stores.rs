//! Stores command - load, geocode, filter and sort a store list

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use storefinder_cli::output::{format_count, format_km, format_rating, print_json, truncate, Status};
use storefinder_cli::{progress, OutputFormat};
use storefinder_core::error::exit_codes;
use storefinder_geo::{validate_coordinate, Coordinate};
use storefinder_stores::{apply_filters, FilterState, HoursTag, IngestReport, JsonFileSource, SortKey, StoreCatalog, StoreRecord};
use storefinder_telemetry::{metrics, Timer};

use super::{report_invalid, Context};
use crate::services::Services;

#[derive(Args)]
pub struct StoresArgs {
    /// JSON file holding an array of store rows
    file: PathBuf,

    /// Reference latitude
    #[arg(long, allow_negative_numbers = true, requires = "lng")]
    lat: Option<f64>,

    /// Reference longitude
    #[arg(long, allow_negative_numbers = true, requires = "lat")]
    lng: Option<f64>,

    /// Only stores within this many km of the reference
    #[arg(long = "max-km")]
    max_km: Option<f64>,

    /// Opening-hours tag (24h, early, late, weekends); repeatable
    #[arg(long = "hours")]
    hours: Vec<HoursTag>,

    /// Sort order (distance, alphabetical, rating)
    #[arg(long, default_value = "distance")]
    sort: SortKey,

    /// Never call the maps provider
    #[arg(long)]
    offline: bool,

    /// Shorthand for --format json
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct StoresOutput<'a> {
    reference: Option<Coordinate>,
    filter: &'a FilterState,
    ingest: IngestReport,
    geocoded: usize,
    total: usize,
    stores: &'a [StoreRecord],
}

pub async fn run(ctx: &Context, args: StoresArgs) -> anyhow::Result<i32> {
    let format = if args.json { OutputFormat::Json } else { ctx.format };

    let reference = match (args.lat, args.lng) {
        (Some(lat), Some(lng)) => match validate_coordinate(Coordinate::new(lat, lng)) {
            Ok(c) => Some(c),
            Err(e) => return report_invalid(format, &e),
        },
        _ => None,
    };

    let mut filter = FilterState::default().with_sort(args.sort);
    if let Some(km) = args.max_km {
        anyhow::ensure!(km.is_finite() && km >= 0.0, "--max-km must be a non-negative number");
        filter = filter.with_max_distance(km);
    }
    for tag in args.hours {
        filter = filter.with_tag(tag);
    }

    let timer = Timer::start("stores.load_ms");
    let mut catalog = StoreCatalog::default();
    let ingest = catalog
        .load_from(&JsonFileSource::new(&args.file))
        .await
        .with_context(|| format!("failed to load stores from {}", args.file.display()))?;

    let services = Services::build(&ctx.config, args.offline)?;
    let spinner = (!format.is_json()).then(|| progress::spinner("Locating stores"));
    let geocoded = catalog.resolve_coordinates(&services.geocoder).await;
    if let Some(pb) = &spinner {
        progress::finish_clear(pb);
    }

    let shown = apply_filters(catalog.stores(), &filter, reference);
    timer.stop();

    metrics().gauge("catalog.stores", catalog.len() as u64);
    metrics().increment_by("stores.skipped", ingest.skipped as u64);
    metrics().increment_by("stores.geocoded", geocoded as u64);
    tracing::debug!(summary = %metrics().export_json(), "stores run complete");

    if format.is_json() {
        print_json(&StoresOutput {
            reference,
            filter: &filter,
            ingest,
            geocoded,
            total: catalog.len(),
            stores: &shown,
        })?;
        return Ok(exit_codes::SUCCESS);
    }

    if ingest.skipped > 0 {
        Status::warning(&format!(
            "skipped {}",
            format_count(ingest.skipped, "unusable row", "unusable rows")
        ));
    }
    if filter.max_distance_km.is_some() && reference.is_none() {
        Status::warning("--max-km ignored without --lat/--lng");
    }

    Status::header(&format!("Stores ({} of {})", shown.len(), catalog.len()));
    if shown.is_empty() {
        Status::info("no stores match the current filters");
    }
    for (i, store) in shown.iter().enumerate() {
        println!(
            "{:>3}. {:<30} {:>10}  {:>5}  {}",
            i + 1,
            truncate(&store.name, 30).bold(),
            format_km(store.distance_km),
            format_rating(store.rating),
            truncate(&store.location, 40).dimmed(),
        );
        if let Some(hours) = &store.hours {
            println!("     {}", hours.dimmed());
        }
    }
    Ok(exit_codes::SUCCESS)
}
