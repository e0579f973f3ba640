//! Validate command - range checks and 6-decimal normalisation

use clap::Args;
use serde::Serialize;
use storefinder_cli::output::{print_json, Status};
use storefinder_core::error::exit_codes;
use storefinder_geo::{validate_coordinate, Coordinate};

use super::{report_invalid, Context};

#[derive(Args)]
pub struct ValidateArgs {
    /// Latitude
    #[arg(allow_negative_numbers = true)]
    lat: f64,
    /// Longitude
    #[arg(allow_negative_numbers = true)]
    lng: f64,
}

#[derive(Serialize)]
struct ValidOutput {
    ok: bool,
    coordinate: Coordinate,
}

pub fn run(ctx: &Context, args: &ValidateArgs) -> anyhow::Result<i32> {
    let coordinate = match validate_coordinate(Coordinate::new(args.lat, args.lng)) {
        Ok(c) => c,
        Err(e) => return report_invalid(ctx.format, &e),
    };

    if ctx.format.is_json() {
        print_json(&ValidOutput { ok: true, coordinate })?;
    } else {
        Status::success(&format!("valid: {coordinate}"));
    }
    Ok(exit_codes::SUCCESS)
}
