//! Geocode command - resolve addresses through cache, provider and gazetteer

use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use storefinder_cli::output::{format_count, format_duration, print_json, Status};
use storefinder_cli::progress;
use storefinder_core::error::exit_codes;
use storefinder_geocode::{ResolvedAddress, StatsSnapshot};
use storefinder_telemetry::{metrics, Timer};

use super::Context;
use crate::services::Services;

#[derive(Args)]
pub struct GeocodeArgs {
    /// Addresses to resolve
    #[arg(required = true)]
    addresses: Vec<String>,

    /// Never call the maps provider
    #[arg(long)]
    offline: bool,
}

#[derive(Serialize)]
struct GeocodeOutput {
    online: bool,
    results: Vec<ResolvedAddress>,
    stats: StatsSnapshot,
}

pub async fn run(ctx: &Context, args: GeocodeArgs) -> anyhow::Result<i32> {
    let services = Services::build(&ctx.config, args.offline)?;

    let timer = Timer::start("geocode.batch_ms");
    let spinner = (!ctx.format.is_json()).then(|| {
        progress::spinner(&format!("Resolving {}", format_count(args.addresses.len(), "address", "addresses")))
    });
    let results = services.geocoder.batch_resolve(&args.addresses).await;
    if let Some(pb) = &spinner {
        progress::finish_clear(pb);
    }
    let elapsed = timer.stop();

    let stats = services.geocoder.stats();
    let unresolved = results.iter().filter(|r| r.coordinate.is_none()).count();
    metrics().increment_by("geocode.requested", args.addresses.len() as u64);
    metrics().increment_by("geocode.unresolved", unresolved as u64);
    tracing::debug!(summary = %metrics().export_json(), "geocode run complete");

    let code = if unresolved == 0 {
        exit_codes::SUCCESS
    } else {
        exit_codes::FAILURE
    };

    if ctx.format.is_json() {
        print_json(&GeocodeOutput {
            online: services.online,
            results,
            stats,
        })?;
        return Ok(code);
    }

    for result in &results {
        match result.coordinate {
            Some(c) => Status::success(&format!("{} {} {}", result.address, "→".dimmed(), c)),
            None => Status::warning(&format!("{} {} not found", result.address, "→".dimmed())),
        }
    }
    let source = if services.online { "provider" } else { "offline gazetteer" };
    Status::info(&format!(
        "{} via {source} in {} ({} from cache)",
        format_count(results.len() - unresolved, "address resolved", "addresses resolved"),
        format_duration(elapsed),
        stats.hits,
    ));
    Ok(code)
}
