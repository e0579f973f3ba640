//! Distance command - great-circle distance, optionally a driving route

use clap::Args;
use serde::Serialize;
use storefinder_cli::output::{print_json, Status};
use storefinder_core::error::exit_codes;
use storefinder_geo::{distance_km, haversine_distance_meters, validate_coordinate, Coordinate};
use storefinder_geocode::Route;

use super::{report_invalid, Context};
use crate::services::Services;

#[derive(Args)]
pub struct DistanceArgs {
    /// Start latitude
    #[arg(allow_negative_numbers = true)]
    lat1: f64,
    /// Start longitude
    #[arg(allow_negative_numbers = true)]
    lng1: f64,
    /// End latitude
    #[arg(allow_negative_numbers = true)]
    lat2: f64,
    /// End longitude
    #[arg(allow_negative_numbers = true)]
    lng2: f64,

    /// Also fetch a driving route
    #[arg(long)]
    route: bool,

    /// Never call the maps provider
    #[arg(long)]
    offline: bool,
}

#[derive(Serialize)]
struct DistanceOutput {
    from: Coordinate,
    to: Coordinate,
    distance_km: f64,
    distance_m: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    route: Option<Route>,
}

pub async fn run(ctx: &Context, args: DistanceArgs) -> anyhow::Result<i32> {
    let from = match validate_coordinate(Coordinate::new(args.lat1, args.lng1)) {
        Ok(c) => c,
        Err(e) => return report_invalid(ctx.format, &e),
    };
    let to = match validate_coordinate(Coordinate::new(args.lat2, args.lng2)) {
        Ok(c) => c,
        Err(e) => return report_invalid(ctx.format, &e),
    };

    let route = if args.route {
        let services = Services::build(&ctx.config, args.offline)?;
        // Endpoints are already validated, so this cannot fail on input
        Some(services.directions.route(from, to).await?)
    } else {
        None
    };

    let output = DistanceOutput {
        from,
        to,
        distance_km: distance_km(&from, &to),
        distance_m: haversine_distance_meters(&from, &to),
        route,
    };

    if ctx.format.is_json() {
        print_json(&output)?;
        return Ok(exit_codes::SUCCESS);
    }

    Status::success(&format!("{:.2} km ({:.0} m)", output.distance_km, output.distance_m));
    if let Some(route) = &output.route {
        let label = if route.estimated { "Estimated" } else { "Driving" };
        Status::field(label, format!("{}, {}", route.distance_text, route.duration_text));
        Status::field("Waypoints", route.route_coordinates.len());
    }
    Ok(exit_codes::SUCCESS)
}
