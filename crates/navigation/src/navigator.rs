//! Navigation driver
//!
//! [`Navigator::plan`] turns a request into an ordered list of links;
//! [`Navigator::navigate`] walks that list with a [`LinkLauncher`] until one
//! link is confirmed open. A launcher that cannot confirm reports
//! [`LaunchOutcome::Attempted`], which never counts as success.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use storefinder_core::clock::SharedClock;
use storefinder_core::config::NavigationConfig;
use storefinder_geo::validate_coordinate;
use tracing::{debug, info, warn};

use crate::cooldown::Cooldown;
use crate::error::{NavigationError, Result};
use crate::links::NavigationRequest;
use crate::platform::{ClientEnvironment, PlatformInfo};
use crate::strategy::{strategies_for, NavigationLink};

/// Result of one launch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum LaunchOutcome {
    /// The target app or page confirmed it opened
    Opened,
    /// Handed off without confirmation inside the grace period
    Attempted,
    /// Launch failed outright
    Failed(String),
}

/// Opens links on the client.
pub trait LinkLauncher: Send + Sync {
    /// Try to open `link`.
    fn launch(&self, link: &NavigationLink) -> impl Future<Output = LaunchOutcome> + Send;
}

/// Launcher wrapper that reports [`LaunchOutcome::Attempted`] when the inner
/// launcher has not answered within the grace period.
#[derive(Debug, Clone)]
pub struct WithGrace<L> {
    inner: L,
    grace: Duration,
}

impl<L: LinkLauncher> WithGrace<L> {
    /// Wrap `inner` with a grace period.
    pub fn new(inner: L, grace: Duration) -> Self {
        Self { inner, grace }
    }
}

impl<L: LinkLauncher> LinkLauncher for WithGrace<L> {
    async fn launch(&self, link: &NavigationLink) -> LaunchOutcome {
        match tokio::time::timeout(self.grace, self.inner.launch(link)).await {
            Ok(outcome) => outcome,
            Err(_) => LaunchOutcome::Attempted,
        }
    }
}

/// Ordered links for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationPlan {
    /// Detected platform
    pub platform: PlatformInfo,
    /// Links in the order they should be tried; never empty
    pub links: Vec<NavigationLink>,
}

impl NavigationPlan {
    /// First link to try.
    pub fn primary(&self) -> Option<&NavigationLink> {
        self.links.first()
    }

    /// URLs after the primary one.
    pub fn fallback_urls(&self) -> Vec<String> {
        self.links.iter().skip(1).map(|l| l.url.clone()).collect()
    }
}

/// One attempt during [`Navigator::navigate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaunchAttempt {
    /// The link tried
    pub link: NavigationLink,
    /// What happened
    pub outcome: LaunchOutcome,
}

/// Outcome of a navigation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationOutcome {
    /// Every attempt in order
    pub attempts: Vec<LaunchAttempt>,
    /// The link the user ends up on: the opened one, else the last tried
    pub final_link: NavigationLink,
    /// True only if a launcher reported [`LaunchOutcome::Opened`]
    pub confirmed: bool,
}

/// Plans and drives navigation for one session.
#[derive(Debug, Default)]
pub struct Navigator {
    cooldown: Cooldown,
}

impl Navigator {
    /// Navigator with the given cooldown.
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown: Cooldown::new(cooldown),
        }
    }

    /// Navigator from the `[navigation]` config section.
    pub fn from_config(config: &NavigationConfig) -> Self {
        Self::new(config.cooldown())
    }

    /// Navigator with an injected clock.
    pub fn with_clock(cooldown: Duration, clock: SharedClock) -> Self {
        Self {
            cooldown: Cooldown::with_clock(cooldown, clock),
        }
    }

    /// Build the link plan.
    ///
    /// The cooldown is checked and armed first, then both coordinates are
    /// validated. A request that fails validation gives the cooldown back, so
    /// only produced plans keep it armed.
    ///
    /// # Errors
    ///
    /// - [`NavigationError::TryAgainShortly`] inside the cooldown
    /// - [`NavigationError::InvalidOrigin`] / [`NavigationError::InvalidDestination`]
    /// - [`NavigationError::NoStrategy`] if no strategy built a link
    pub fn plan(&self, request: &NavigationRequest, env: &ClientEnvironment) -> Result<NavigationPlan> {
        let permit = self.cooldown.try_begin().map_err(|retry_after| {
            debug!(?retry_after, "navigation inside cooldown");
            NavigationError::TryAgainShortly { retry_after }
        })?;

        match build_plan(request, env) {
            Ok(plan) => {
                info!(
                    os = %plan.platform.os,
                    mobile = plan.platform.is_mobile,
                    links = plan.links.len(),
                    "navigation planned"
                );
                Ok(plan)
            }
            Err(e) => {
                permit.release();
                Err(e)
            }
        }
    }

    /// Plan, then try each link until one is confirmed open.
    ///
    /// # Errors
    ///
    /// Same as [`Navigator::plan`]; launch failures are recorded in the
    /// outcome instead.
    pub async fn navigate<L: LinkLauncher>(
        &self,
        request: &NavigationRequest,
        env: &ClientEnvironment,
        launcher: &L,
    ) -> Result<NavigationOutcome> {
        let plan = self.plan(request, env)?;
        drive(plan, launcher).await
    }

    /// Forget the cooldown.
    pub fn reset_cooldown(&self) {
        self.cooldown.reset();
    }
}

fn build_plan(request: &NavigationRequest, env: &ClientEnvironment) -> Result<NavigationPlan> {
    let request = NavigationRequest {
        origin: validate_coordinate(request.origin).map_err(NavigationError::InvalidOrigin)?,
        destination: validate_coordinate(request.destination).map_err(NavigationError::InvalidDestination)?,
        ..request.clone()
    };

    let platform = PlatformInfo::detect(env);
    let mut links = Vec::new();
    for strategy in strategies_for(platform) {
        match strategy.build(&request) {
            Ok(link) => links.push(link),
            Err(e) => warn!(strategy = strategy.name(), error = %e, "strategy failed"),
        }
    }

    if links.is_empty() {
        return Err(NavigationError::NoStrategy);
    }
    Ok(NavigationPlan { platform, links })
}

async fn drive<L: LinkLauncher>(plan: NavigationPlan, launcher: &L) -> Result<NavigationOutcome> {
    let mut final_link = plan.links.last().cloned().ok_or(NavigationError::NoStrategy)?;
    let mut attempts = Vec::with_capacity(plan.links.len());
    let mut confirmed = false;

    for link in plan.links {
        let outcome = launcher.launch(&link).await;
        debug!(strategy = link.strategy, ?outcome, "launch attempt");
        if outcome == LaunchOutcome::Opened {
            final_link = link.clone();
            confirmed = true;
        }
        attempts.push(LaunchAttempt { link, outcome });
        if confirmed {
            break;
        }
    }

    Ok(NavigationOutcome {
        attempts,
        final_link,
        confirmed,
    })
}
