use crate::config::HandoffConfig;
use crate::domain::payment::{self, GatewayOutcome, PackageDetails, PaymentContext};
use crate::domain::phase::Phase;
use crate::domain::ports::PickConfirmerRef;
use crate::error::{MarketError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{error, info, instrument, warn};

/// What a reconciliation attempt did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandoffOutcome {
    /// The confirmation call was issued and succeeded.
    Confirmed(PackageDetails),
    /// The gateway reported a failed payment. Nothing was confirmed.
    Declined { response_code: Option<String> },
    /// A confirmation was already issued (or is in flight) for this page.
    AlreadyHandled,
}

/// Reconciles the gateway's return with the pending pick, confirming it at
/// most once per handoff instance.
///
/// One handoff lives for one payment return page. The [`PaymentContext`]
/// given at construction is consumed when the confirmation succeeds.
pub struct PaymentHandoff {
    confirmer: PickConfirmerRef,
    config: HandoffConfig,
    context: Mutex<PaymentContext>,
    phase: Mutex<Phase>,
    processed: AtomicBool,
}

impl PaymentHandoff {
    pub fn new(confirmer: PickConfirmerRef, context: PaymentContext, config: HandoffConfig) -> Self {
        Self {
            confirmer,
            config,
            context: Mutex::new(context),
            phase: Mutex::new(Phase::Idle),
            processed: AtomicBool::new(false),
        }
    }

    pub fn phase(&self) -> Phase {
        *lock(&self.phase)
    }

    /// True once the payment context has been consumed by a confirmed pick.
    pub fn context_cleared(&self) -> bool {
        lock(&self.context).is_empty()
    }

    pub fn is_processed(&self) -> bool {
        self.processed.load(Ordering::SeqCst)
    }

    /// Decodes a raw gateway return (URL or query string) and reconciles it.
    ///
    /// A malformed callback fails the handoff without any mutation.
    #[instrument(skip_all)]
    pub async fn reconcile(&self, callback: &str) -> Result<HandoffOutcome> {
        self.set_phase_before_confirm(Phase::Validating);
        match payment::decode_callback(callback) {
            Ok(outcome) => self.reconcile_outcome(outcome).await,
            Err(e) => {
                warn!(error = %e, "payment callback rejected");
                self.set_phase_before_confirm(Phase::Failed);
                Err(e)
            }
        }
    }

    pub async fn reconcile_outcome(&self, outcome: GatewayOutcome) -> Result<HandoffOutcome> {
        if !outcome.success {
            let response_code = outcome.response_code().map(str::to_string);
            info!(code = ?response_code, "payment declined by gateway");
            self.set_phase_before_confirm(Phase::Failed);
            return Ok(HandoffOutcome::Declined { response_code });
        }

        let details = {
            let context = lock(&self.context);
            payment::resolve_details(outcome.package_details, context.details())
        };
        let details = match details {
            Ok(details) => details,
            Err(e) if self.is_processed() => {
                // The context is gone after a confirmed pick; a replay is a duplicate.
                info!(error = %e, "callback replayed after confirmation");
                return Ok(HandoffOutcome::AlreadyHandled);
            }
            Err(e) => {
                warn!(error = %e, "payment callback carries no usable pick");
                self.set_phase_before_confirm(Phase::Failed);
                return Err(e);
            }
        };

        // The only gate: exactly one caller flips it, before the first await.
        if self
            .processed
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            info!(request = %details.request, "duplicate payment callback ignored");
            return Ok(HandoffOutcome::AlreadyHandled);
        }
        self.set_phase(Phase::Submitting);

        let result = tokio::time::timeout(
            self.config.confirm_timeout,
            self.confirmer.confirm_pick(details.package, details.request),
        )
        .await;

        match result {
            Ok(Ok(())) => {
                lock(&self.context).consume();
                self.set_phase(Phase::Done);
                info!(request = %details.request, package = %details.package, "pick confirmed");
                Ok(HandoffOutcome::Confirmed(details))
            }
            Ok(Err(e)) => {
                error!(request = %details.request, error = %e, "pick confirmation failed");
                self.set_phase(Phase::Failed);
                Err(e)
            }
            Err(_) => {
                error!(request = %details.request, timeout = ?self.config.confirm_timeout, "pick confirmation timed out");
                self.set_phase(Phase::Failed);
                Err(MarketError::BackendUnavailable(format!(
                    "pick confirmation timed out after {:?}",
                    self.config.confirm_timeout
                )))
            }
        }
    }

    fn set_phase(&self, phase: Phase) {
        *lock(&self.phase) = phase;
    }

    // Once a confirmation was issued only its own result moves the phase.
    fn set_phase_before_confirm(&self, phase: Phase) {
        let mut current = lock(&self.phase);
        if !self.is_processed() {
            *current = phase;
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
