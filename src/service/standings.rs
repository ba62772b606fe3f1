//! Standings trigger seam.
//!
//! Standings recalculation is an external collaborator; the pipeline only
//! notifies it when a game finalizes. Fire-and-forget: the trigger has no
//! result the pipeline could act on.

use async_trait::async_trait;
use uuid::Uuid;

/// Invoked after a game reaches FINAL.
#[async_trait]
pub trait StandingsTrigger: Send + Sync + std::fmt::Debug {
    /// Notifies the standings system that a game in `season_id` finalized.
    async fn game_finalized(&self, tenant_id: Uuid, season_id: Uuid);
}

/// Default trigger: records the invocation in the log and nothing else.
///
/// Deployments wire a real recalculation client here.
#[derive(Debug, Default, Clone)]
pub struct LoggingStandingsTrigger;

#[async_trait]
impl StandingsTrigger for LoggingStandingsTrigger {
    async fn game_finalized(&self, tenant_id: Uuid, season_id: Uuid) {
        tracing::info!(%tenant_id, %season_id, "standings recalculation triggered");
    }
}
