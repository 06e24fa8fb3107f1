use crate::application::requests::RequestService;
use crate::domain::ids::{DesignerId, QuotationId, RequestId};
use crate::domain::phase::Phase;
use crate::domain::ports::{ClockRef, QuotationStoreRef, RequestStoreRef};
use crate::domain::pricing::{self, QuotationDraft, ValidatedQuotation};
use crate::domain::quotation::{Quotation, QuotationStatus};
use crate::domain::request::{DesignRequest, RequestStatus};
use crate::domain::rules::Rule;
use crate::error::{MarketError, Result};
use tracing::{debug, error, info, instrument, warn};

/// The quotation lifecycle: submit, accept, reject.
#[derive(Clone)]
pub struct QuotationService {
    quotations: QuotationStoreRef,
    requests: RequestStoreRef,
    lifecycle: RequestService,
    clock: ClockRef,
}

impl QuotationService {
    pub fn new(quotations: QuotationStoreRef, requests: RequestStoreRef, clock: ClockRef) -> Self {
        let lifecycle = RequestService::new(requests.clone(), clock.clone());
        Self {
            quotations,
            requests,
            lifecycle,
            clock,
        }
    }

    /// Validates `draft` against today's date and, if every rule passes,
    /// records a pending quotation.
    pub async fn submit(
        &self,
        request: RequestId,
        designer: DesignerId,
        draft: &QuotationDraft,
    ) -> Result<Quotation> {
        let terms = pricing::validate_quotation(draft, self.clock.today()).map_err(|rules| {
            debug!(request = %request, ?rules, "quotation rejected by pricing rules");
            MarketError::validation(rules)
        })?;
        self.submit_validated(request, designer, terms).await
    }

    #[instrument(skip(self, terms))]
    async fn submit_validated(
        &self,
        request: RequestId,
        designer: DesignerId,
        terms: ValidatedQuotation,
    ) -> Result<Quotation> {
        self.lifecycle.get(request).await?.ensure_open()?;

        let quotation = Quotation::new(request, designer, terms, self.clock.now());
        self.quotations.store(quotation.clone()).await?;
        info!(quotation = %quotation.id, price = %quotation.price, "quotation submitted");
        Ok(quotation)
    }

    pub async fn get(&self, id: QuotationId) -> Result<Quotation> {
        self.quotations
            .get(id)
            .await?
            .ok_or_else(|| MarketError::not_found(format!("quotation {id}")))
    }

    /// Quotations for a request, newest first.
    pub async fn list_for_request(&self, request: RequestId) -> Result<Vec<Quotation>> {
        let mut quotations = self.quotations.for_request(request).await?;
        quotations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(quotations)
    }

    /// Accepts one quotation up to and including its deadline day.
    ///
    /// The quotation settles first under the quotation store's lock, then the
    /// owning request moves `created -> pending`. If the request is no longer
    /// open the acceptance is undone and `StaleRequestState` is returned, so a
    /// request never selects a quotation that is not stored as accepted.
    #[instrument(skip(self))]
    pub async fn accept(&self, id: QuotationId) -> Result<Quotation> {
        let today = self.clock.today();
        let quotation = self
            .quotations
            .update(
                id,
                Box::new(move |quotation: &mut Quotation| {
                    if !quotation.status().is_terminal() && quotation.is_expired(today) {
                        return Err(MarketError::validation(Rule::QuotationExpired));
                    }
                    quotation.accept()
                }),
            )
            .await
            .inspect_err(|e| warn!(quotation = %id, error = %e, "quotation could not be accepted"))?;

        let selected = self
            .requests
            .update(
                quotation.request,
                Box::new(move |request: &mut DesignRequest| request.select_quotation(id)),
            )
            .await;
        if let Err(e) = selected {
            warn!(quotation = %id, error = %e, "request moved on, acceptance undone");
            let reopened = self
                .quotations
                .update(
                    id,
                    Box::new(|quotation: &mut Quotation| {
                        quotation.reopen();
                        Ok(())
                    }),
                )
                .await;
            if let Err(rollback) = reopened {
                error!(quotation = %id, error = %rollback, "accepted quotation could not be reopened");
            }
            return Err(e);
        }

        info!(quotation = %id, request = %quotation.request, "quotation accepted");
        Ok(quotation)
    }

    /// Rejects a pending quotation. The request is not touched.
    pub async fn reject(&self, id: QuotationId) -> Result<Quotation> {
        let quotation = self
            .quotations
            .update(id, Box::new(|quotation: &mut Quotation| quotation.reject()))
            .await?;
        info!(quotation = %id, "quotation rejected");
        Ok(quotation)
    }

    /// Payment for an accepted quotation went through: `pending -> imported`.
    ///
    /// The request must still have this quotation selected.
    #[instrument(skip(self))]
    pub async fn confirm_payment(&self, id: QuotationId) -> Result<DesignRequest> {
        let quotation = self.get(id).await?;
        if quotation.status() != QuotationStatus::Accepted {
            return Err(MarketError::IllegalStateTransition {
                from: quotation.status().as_str(),
                to: RequestStatus::Imported.as_str(),
            });
        }

        let request = self
            .requests
            .update(
                quotation.request,
                Box::new(move |request: &mut DesignRequest| {
                    if request.selected_quotation() != Some(id) {
                        return Err(MarketError::StaleRequestState {
                            request: request.id,
                            status: request.status(),
                        });
                    }
                    request.transition_to(RequestStatus::Imported)
                }),
            )
            .await?;
        info!(quotation = %id, request = %request.id, "quotation paid, request imported");
        Ok(request)
    }
}

/// A designer's quotation form.
///
/// Tracks the submission [`Phase`] and the rules the last attempt broke, so
/// the view renders from this state instead of its own flags.
#[derive(Debug, Default)]
pub struct QuotationForm {
    phase: Phase,
    violations: Vec<Rule>,
    submitted: Option<Quotation>,
    last_error: Option<String>,
}

impl QuotationForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn violations(&self) -> &[Rule] {
        &self.violations
    }

    pub fn submitted(&self) -> Option<&Quotation> {
        self.submitted.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Back to `idle`, keeping nothing from the previous attempt.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub async fn submit(
        &mut self,
        service: &QuotationService,
        request: RequestId,
        designer: DesignerId,
        draft: &QuotationDraft,
    ) -> Result<Quotation> {
        if self.phase.is_busy() {
            return Err(MarketError::IllegalStateTransition {
                from: self.phase.as_str(),
                to: Phase::Submitting.as_str(),
            });
        }

        self.phase = Phase::Validating;
        self.violations.clear();
        self.last_error = None;

        let terms = match pricing::validate_quotation(draft, service.clock.today()) {
            Ok(terms) => terms,
            Err(rules) => {
                self.violations = rules.clone();
                self.phase = Phase::Failed;
                return Err(MarketError::validation(rules));
            }
        };

        self.phase = Phase::Submitting;
        match service.submit_validated(request, designer, terms).await {
            Ok(quotation) => {
                self.phase = Phase::Done;
                self.submitted = Some(quotation.clone());
                Ok(quotation)
            }
            Err(e) => {
                self.phase = Phase::Failed;
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }
}
