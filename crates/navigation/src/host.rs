//! Delegating navigation to an embedding host
//!
//! When the store finder runs inside another app, the host opens links
//! itself. The plan is handed over as a [`HostMessage`] on a channel.

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::{NavigationError, Result};
use crate::navigator::NavigationPlan;

/// Message kind understood by hosts.
pub const NAVIGATE_KIND: &str = "navigate";

/// Serializable navigation hand-off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostMessage {
    /// Always [`NAVIGATE_KIND`]
    pub kind: &'static str,
    /// Primary URL
    pub url: String,
    /// URLs to try if the primary does not open
    pub fallback_urls: Vec<String>,
    /// Strategy that built the primary URL
    pub strategy: &'static str,
}

impl HostMessage {
    /// Message for a plan, or `None` if the plan has no links.
    pub fn from_plan(plan: &NavigationPlan) -> Option<Self> {
        let primary = plan.primary()?;
        Some(Self {
            kind: NAVIGATE_KIND,
            url: primary.url.clone(),
            fallback_urls: plan.fallback_urls(),
            strategy: primary.strategy,
        })
    }
}

/// Sending half of the host channel.
#[derive(Debug, Clone)]
pub struct HostRelay {
    tx: mpsc::Sender<HostMessage>,
}

impl HostRelay {
    /// Create a relay and the receiver the host listens on.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<HostMessage>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Hand the plan to the host.
    ///
    /// # Errors
    ///
    /// [`NavigationError::NoStrategy`] for an empty plan,
    /// [`NavigationError::HostUnavailable`] if the receiver is gone.
    pub async fn delegate(&self, plan: &NavigationPlan) -> Result<()> {
        let message = HostMessage::from_plan(plan).ok_or(NavigationError::NoStrategy)?;
        debug!(strategy = message.strategy, "delegating navigation to host");
        self.tx
            .send(message)
            .await
            .map_err(|_| NavigationError::HostUnavailable)
    }
}
