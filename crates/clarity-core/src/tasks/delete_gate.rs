//! Two-step delete confirmation.
//!
//! Requesting a delete only stages an id. The destructive call fires on
//! confirmation, and while it is in flight neither confirm nor cancel is
//! accepted. A failed delete keeps the id staged with an inline error so the
//! same confirmation can be retried.

use crate::error::{Error, Result};
use crate::models::TaskId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DeleteState {
    /// No confirmation open
    #[default]
    Idle,
    /// Confirmation open for `id`, with the error of the last failed attempt
    Staged { id: TaskId, error: Option<String> },
    /// Delete request for `id` awaiting the backend
    InFlight { id: TaskId },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteGate {
    state: DeleteState,
}

impl DeleteGate {
    #[must_use]
    pub const fn state(&self) -> &DeleteState {
        &self.state
    }

    /// Id shown in the confirmation, staged or in flight.
    #[must_use]
    pub const fn staged_id(&self) -> Option<&TaskId> {
        match &self.state {
            DeleteState::Idle => None,
            DeleteState::Staged { id, .. } | DeleteState::InFlight { id } => Some(id),
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            DeleteState::Staged { error, .. } => error.as_deref(),
            _ => None,
        }
    }

    /// Whether the confirmation is showing.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        !matches!(self.state, DeleteState::Idle)
    }

    #[must_use]
    pub const fn is_in_flight(&self) -> bool {
        matches!(self.state, DeleteState::InFlight { .. })
    }

    #[must_use]
    pub const fn can_confirm(&self) -> bool {
        matches!(self.state, DeleteState::Staged { .. })
    }

    #[must_use]
    pub const fn can_cancel(&self) -> bool {
        matches!(self.state, DeleteState::Staged { .. })
    }

    /// Stage `id`, replacing any previously staged candidate.
    pub fn stage(&mut self, id: TaskId) -> Result<()> {
        if self.is_in_flight() {
            return Err(Error::DeleteInFlight);
        }
        self.state = DeleteState::Staged { id, error: None };
        Ok(())
    }

    /// Close the confirmation without deleting.
    pub fn cancel(&mut self) -> Result<()> {
        if self.is_in_flight() {
            return Err(Error::DeleteInFlight);
        }
        self.state = DeleteState::Idle;
        Ok(())
    }

    /// Move the staged id in flight.
    ///
    /// The returned guard must be settled with [`PendingDelete::succeed`] or
    /// [`PendingDelete::fail`]; dropping it unsettled re-stages the id.
    pub(crate) fn begin(&mut self) -> Result<PendingDelete<'_>> {
        let id = match &self.state {
            DeleteState::Idle => return Err(Error::NothingStaged),
            DeleteState::InFlight { .. } => return Err(Error::DeleteInFlight),
            DeleteState::Staged { id, .. } => id.clone(),
        };
        self.state = DeleteState::InFlight { id: id.clone() };
        Ok(PendingDelete {
            gate: self,
            id,
            settled: false,
        })
    }
}

pub(crate) struct PendingDelete<'a> {
    gate: &'a mut DeleteGate,
    id: TaskId,
    settled: bool,
}

impl PendingDelete<'_> {
    pub(crate) const fn id(&self) -> &TaskId {
        &self.id
    }

    pub(crate) fn succeed(mut self) {
        self.gate.state = DeleteState::Idle;
        self.settled = true;
    }

    pub(crate) fn fail(mut self, message: String) {
        self.gate.state = DeleteState::Staged {
            id: self.id.clone(),
            error: Some(message),
        };
        self.settled = true;
    }
}

impl Drop for PendingDelete<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.gate.state = DeleteState::Staged {
                id: self.id.clone(),
                error: None,
            };
        }
    }
}
