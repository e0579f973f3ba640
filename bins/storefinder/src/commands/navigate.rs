//! Navigate command - platform-aware directions links

use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use storefinder_cli::output::{print_json, Status};
use storefinder_core::error::exit_codes;
use storefinder_geo::Coordinate;
use storefinder_navigation::{
    ClientEnvironment, HostMessage, HostRelay, LaunchOutcome, LinkKind, LinkLauncher, NavigationError,
    NavigationLink, NavigationOutcome, NavigationRequest, Navigator, PlatformInfo, WithGrace,
};

use super::{parse_point, report_failure, Context};

#[derive(Args)]
pub struct NavigateArgs {
    /// Start point as LAT,LNG
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    from: Coordinate,

    /// Destination as LAT,LNG
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    to: Coordinate,

    /// Destination name
    #[arg(long)]
    name: Option<String>,

    /// Destination address
    #[arg(long)]
    address: Option<String>,

    /// Client user agent used for platform detection
    #[arg(long = "user-agent")]
    user_agent: Option<String>,

    /// Client touch points
    #[arg(long = "touch-points", default_value_t = 0)]
    touch_points: u32,

    /// Client viewport width in CSS pixels
    #[arg(long)]
    viewport: Option<u32>,

    /// Print the hand-off message an embedding host would receive
    #[arg(long)]
    host: bool,
}

/// A terminal cannot open apps: every link is handed off unconfirmed.
struct TerminalLauncher;

impl LinkLauncher for TerminalLauncher {
    async fn launch(&self, link: &NavigationLink) -> LaunchOutcome {
        tracing::debug!(strategy = link.strategy, "handing link to the terminal");
        LaunchOutcome::Attempted
    }
}

#[derive(Serialize)]
struct NavigateOutput {
    platform: PlatformInfo,
    #[serde(flatten)]
    outcome: NavigationOutcome,
}

fn environment(args: &NavigateArgs) -> ClientEnvironment {
    let mut env = ClientEnvironment::from_user_agent(args.user_agent.clone().unwrap_or_default())
        .with_touch_points(args.touch_points);
    if let Some(width) = args.viewport {
        env = env.with_viewport(width);
    }
    env
}

fn request(args: &NavigateArgs) -> NavigationRequest {
    let mut request = NavigationRequest::new(args.from, args.to);
    if let Some(name) = &args.name {
        request = request.with_name(name);
    }
    if let Some(address) = &args.address {
        request = request.with_address(address);
    }
    request
}

fn report_navigation_error(ctx: &Context, err: &NavigationError) -> anyhow::Result<i32> {
    let exit_code = match err {
        NavigationError::InvalidOrigin(_) | NavigationError::InvalidDestination(_) => exit_codes::VALIDATION_ERROR,
        NavigationError::TryAgainShortly { .. } => exit_codes::TRY_AGAIN,
        NavigationError::NoStrategy | NavigationError::HostUnavailable => exit_codes::FAILURE,
    };
    report_failure(ctx.format, err.code(), &err.to_string(), exit_code)
}

pub async fn run(ctx: &Context, args: NavigateArgs) -> anyhow::Result<i32> {
    let navigator = Navigator::from_config(&ctx.config.navigation);
    let env = environment(&args);
    let request = request(&args);

    if args.host {
        let plan = match navigator.plan(&request, &env) {
            Ok(plan) => plan,
            Err(e) => return report_navigation_error(ctx, &e),
        };
        let (relay, mut inbox) = HostRelay::channel(1);
        relay.delegate(&plan).await?;
        let message: HostMessage = inbox.recv().await.ok_or(NavigationError::HostUnavailable)?;
        print_json(&message)?;
        return Ok(exit_codes::SUCCESS);
    }

    let launcher = WithGrace::new(TerminalLauncher, ctx.config.navigation.app_open_grace());
    let outcome = match navigator.navigate(&request, &env, &launcher).await {
        Ok(outcome) => outcome,
        Err(e) => return report_navigation_error(ctx, &e),
    };
    let platform = PlatformInfo::detect(&env);

    if ctx.format.is_json() {
        print_json(&NavigateOutput { platform, outcome })?;
        return Ok(exit_codes::SUCCESS);
    }

    let target = args.name.as_deref().unwrap_or("destination");
    Status::header(&format!("Directions to {target}"));
    let device = if platform.is_mobile { "mobile" } else { "desktop" };
    Status::field("Platform", format!("{} ({device})", platform.os));
    for (i, attempt) in outcome.attempts.iter().enumerate() {
        let kind = match attempt.link.kind {
            LinkKind::AppScheme => "app",
            LinkKind::Web => "web",
        };
        println!(
            "{:>3}. {:<16} {:<4} {}",
            i + 1,
            attempt.link.strategy.bold(),
            kind.dimmed(),
            attempt.link.url
        );
    }
    Status::info(&format!("Open: {}", outcome.final_link.url));
    Ok(exit_codes::SUCCESS)
}
