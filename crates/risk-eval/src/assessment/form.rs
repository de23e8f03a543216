//! Multi-step form session: field entry, per-section completion, linear navigation and the
//! submission lifecycle.
//!
//! Navigation is never gated on completeness; only submission is.

use serde::Serialize;

use super::catalog::{self, FieldDefinition, Section};
use super::domain::{RawFormState, SessionContext};
use super::interpret::RiskAssessment;

/// Error enumeration for form session operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("form is incomplete; missing fields: {}", .missing.join(", "))]
    Incomplete { missing: Vec<&'static str> },
    #[error("unknown form field `{0}`")]
    UnknownField(String),
    #[error("submission was superseded or abandoned")]
    StaleSubmission,
}

/// Where the session stands with respect to scoring.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionPhase {
    Editing,
    Scoring,
    Completed(Box<RiskAssessment>),
}

/// Proof that a submission was started. Carries a snapshot of the form taken at that moment;
/// it only counts while no edit, resubmission or abandonment has happened since.
#[derive(Debug, Clone)]
pub struct SubmissionTicket {
    generation: u64,
    raw: RawFormState,
}

impl SubmissionTicket {
    pub fn raw(&self) -> &RawFormState {
        &self.raw
    }
}

/// Completion flag for one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SectionProgress {
    pub section: Section,
    pub complete: bool,
}

#[derive(Debug)]
pub struct FormSession {
    context: SessionContext,
    raw: RawFormState,
    completion: [bool; Section::ALL.len()],
    active: Section,
    generation: u64,
    phase: SubmissionPhase,
}

impl FormSession {
    pub fn new(context: SessionContext) -> Self {
        Self {
            context,
            raw: RawFormState::new(),
            completion: [false; Section::ALL.len()],
            active: Section::FIRST,
            generation: 0,
            phase: SubmissionPhase::Editing,
        }
    }

    /// Session pre-populated from a raw map; unknown keys are rejected.
    pub fn with_fields<'a>(
        context: SessionContext,
        fields: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, FormError> {
        let mut session = Self::new(context);
        for (key, value) in fields {
            session.set(key, value)?;
        }
        Ok(session)
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn raw(&self) -> &RawFormState {
        &self.raw
    }

    pub fn active_section(&self) -> Section {
        self.active
    }

    pub fn phase(&self) -> &SubmissionPhase {
        &self.phase
    }

    pub fn assessment(&self) -> Option<&RiskAssessment> {
        match &self.phase {
            SubmissionPhase::Completed(assessment) => Some(assessment.as_ref()),
            _ => None,
        }
    }

    /// Store `value` verbatim, overwriting any prior value. An empty value unsets the field.
    pub fn set_field(&mut self, field: &'static FieldDefinition, value: impl Into<String>) {
        self.raw.set(field.key, value.into());
        self.completion[field.section.index()] = self.section_filled(field.section);
        self.invalidate_submission();
    }

    /// Boundary variant of [`FormSession::set_field`] resolving `key` against the catalog.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<(), FormError> {
        let field = catalog::field(key).ok_or_else(|| FormError::UnknownField(key.to_string()))?;
        self.set_field(field, value);
        Ok(())
    }

    pub fn advance(&mut self) -> Section {
        if let Some(next) = self.active.next() {
            self.active = next;
        }
        self.active
    }

    pub fn retreat(&mut self) -> Section {
        if let Some(previous) = self.active.previous() {
            self.active = previous;
        }
        self.active
    }

    pub fn is_section_complete(&self, section: Section) -> bool {
        self.completion[section.index()]
    }

    pub fn completion(&self) -> Vec<SectionProgress> {
        Section::ALL
            .iter()
            .map(|section| SectionProgress {
                section: *section,
                complete: self.is_section_complete(*section),
            })
            .collect()
    }

    pub fn is_submittable(&self) -> bool {
        self.completion.iter().all(|complete| *complete)
    }

    /// Declared fields still unset, in catalog order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        catalog::all_fields()
            .iter()
            .filter(|field| !self.raw.is_set(field.key))
            .map(|field| field.key)
            .collect()
    }

    /// Set fields whose value falls outside the declared domain. Informational only.
    pub fn out_of_domain(&self) -> Vec<&'static str> {
        catalog::all_fields()
            .iter()
            .filter(|field| {
                self.raw
                    .get(field.key)
                    .is_some_and(|value| !field.accepts(value))
            })
            .map(|field| field.key)
            .collect()
    }

    /// Start a submission. Any earlier outstanding ticket becomes stale.
    pub fn begin_submission(&mut self) -> Result<SubmissionTicket, FormError> {
        if !self.is_submittable() {
            return Err(FormError::Incomplete {
                missing: self.missing_fields(),
            });
        }

        self.generation += 1;
        self.phase = SubmissionPhase::Scoring;
        Ok(SubmissionTicket {
            generation: self.generation,
            raw: self.raw.clone(),
        })
    }

    /// Record the scoring outcome, unless the ticket was superseded in the meantime.
    pub fn complete_submission(
        &mut self,
        ticket: &SubmissionTicket,
        assessment: RiskAssessment,
    ) -> Result<(), FormError> {
        if !self.is_current(ticket) {
            return Err(FormError::StaleSubmission);
        }
        self.phase = SubmissionPhase::Completed(Box::new(assessment));
        Ok(())
    }

    /// Return to editing after a failed scoring attempt; the form is left intact.
    pub fn fail_submission(&mut self, ticket: &SubmissionTicket) -> Result<(), FormError> {
        if !self.is_current(ticket) {
            return Err(FormError::StaleSubmission);
        }
        self.phase = SubmissionPhase::Editing;
        Ok(())
    }

    /// Discard the session's input and orphan any outstanding submission.
    pub fn abandon(&mut self) {
        self.generation += 1;
        self.raw.clear();
        self.completion = [false; Section::ALL.len()];
        self.active = Section::FIRST;
        self.phase = SubmissionPhase::Editing;
    }

    fn is_current(&self, ticket: &SubmissionTicket) -> bool {
        ticket.generation == self.generation && self.phase == SubmissionPhase::Scoring
    }

    fn invalidate_submission(&mut self) {
        if self.phase != SubmissionPhase::Editing {
            self.generation += 1;
            self.phase = SubmissionPhase::Editing;
        }
    }

    fn section_filled(&self, section: Section) -> bool {
        catalog::fields_of(section).all(|field| self.raw.is_set(field.key))
    }
}
