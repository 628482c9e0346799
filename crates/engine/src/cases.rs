//! Case subsystem boundary and the post-commit side-effect dispatcher
//!
//! After a committed review changes a screening's aggregate status, the
//! case subsystem is notified so it can refresh derived state (SLA,
//! inbox). The notification is enqueued on an in-process channel and
//! delivered by a background worker: a failure is logged and dropped,
//! never propagated into the already-committed review.

use async_trait::async_trait;
use sentinel_core::ScreeningStatus;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// The case a decision belongs to, as handed back by the case subsystem
#[derive(Debug, Clone)]
pub struct Case {
    pub id: String,
    pub organization_id: String,
}

/// Errors from the case subsystem
#[derive(Debug, Error)]
pub enum CaseError {
    #[error("Case subsystem unavailable: {0}")]
    Unavailable(String),

    #[error("Case not found: {0}")]
    NotFound(String),
}

/// The case-management subsystem, seen from the screening engine.
///
/// The decision-to-case join is owned by the case subsystem; the engine
/// only stores decision ids.
#[async_trait]
pub trait CaseGateway: Send + Sync {
    /// Resolve the case a decision belongs to, if any
    async fn case_for_decision(&self, decision_id: &str) -> Result<Option<Case>, CaseError>;

    /// Let the case subsystem react to a changed screening status
    async fn perform_side_effects(&self, case: &Case) -> Result<(), CaseError>;
}

/// One queued notification about a committed status change
#[derive(Debug, Clone)]
pub struct CaseNotification {
    pub screening_id: String,
    pub decision_id: String,
    pub status: ScreeningStatus,
}

/// Post-commit dispatcher for case side effects.
///
/// Owns the sending half of an unbounded channel; a spawned worker
/// drains it and calls the gateway. Dropping the notifier closes the
/// channel and lets the worker finish the queue before exiting.
pub struct CaseNotifier {
    tx: mpsc::UnboundedSender<CaseNotification>,
}

impl CaseNotifier {
    /// Spawn the delivery worker on the current runtime
    pub fn spawn(gateway: Arc<dyn CaseGateway>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<CaseNotification>();
        tokio::spawn(async move {
            while let Some(notification) = rx.recv().await {
                Self::deliver(gateway.as_ref(), notification).await;
            }
        });
        Self { tx }
    }

    /// Enqueue a notification; called only after the review transaction
    /// committed
    pub fn enqueue(&self, notification: CaseNotification) {
        if self.tx.send(notification).is_err() {
            warn!("Case notifier worker is gone; dropping notification");
        }
    }

    async fn deliver(gateway: &dyn CaseGateway, notification: CaseNotification) {
        match gateway.case_for_decision(&notification.decision_id).await {
            Ok(Some(case)) => {
                if let Err(err) = gateway.perform_side_effects(&case).await {
                    warn!(
                        "Case side effects failed for screening {} (case {}): {}",
                        notification.screening_id, case.id, err
                    );
                }
            }
            Ok(None) => {
                debug!(
                    "Screening {} has no case linked to decision {}; nothing to notify",
                    notification.screening_id, notification.decision_id
                );
            }
            Err(err) => {
                warn!(
                    "Case lookup failed for decision {} (screening {}): {}",
                    notification.decision_id, notification.screening_id, err
                );
            }
        }
    }
}
