//! Mutation gateway - turns user intents into record store calls.
//!
//! Calls are fire-and-forget relative to the local cache: the gateway never
//! touches the cache, it only reports success or failure as a notification.
//! The visible grid changes when the store pushes its next snapshot.

use std::sync::Arc;

use crate::book::{BookFields, BookId};
use crate::error::StoreError;
use crate::notify::{Notification, Notifier};
use crate::store::RecordStore;

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this book?";

/// A blocking yes/no prompt.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The user said no; the store was not called.
    Declined,
}

#[derive(Clone)]
pub struct MutationGateway {
    store: Arc<dyn RecordStore>,
    notifier: Arc<dyn Notifier>,
}

impl MutationGateway {
    pub fn new(store: Arc<dyn RecordStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Add a record. The store stamps its creation time.
    pub fn create(&self, fields: BookFields) -> Result<BookId, StoreError> {
        match self.store.insert(fields) {
            Ok(id) => {
                tracing::info!(%id, "book added");
                self.notifier
                    .notify(Notification::success("Book added successfully!"));
                Ok(id)
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to add book");
                self.notifier
                    .notify(Notification::failure("Error adding book. Please try again."));
                Err(err)
            }
        }
    }

    /// Overwrite an existing record. The store stamps its update time.
    pub fn update(&self, id: &BookId, fields: BookFields) -> Result<(), StoreError> {
        match self.store.update(id, fields) {
            Ok(()) => {
                tracing::info!(%id, "book updated");
                self.notifier
                    .notify(Notification::success("Book updated successfully!"));
                Ok(())
            }
            Err(err) => {
                tracing::error!(%id, error = %err, "failed to update book");
                self.notifier.notify(Notification::failure(
                    "Error updating book. Please try again.",
                ));
                Err(err)
            }
        }
    }

    /// Remove a record once `confirm` agrees.
    pub fn delete(&self, id: &BookId, confirm: &dyn Confirm) -> Result<DeleteOutcome, StoreError> {
        if !confirm.confirm(DELETE_PROMPT) {
            tracing::debug!(%id, "delete declined");
            return Ok(DeleteOutcome::Declined);
        }

        match self.store.delete(id) {
            Ok(()) => {
                tracing::info!(%id, "book deleted");
                self.notifier
                    .notify(Notification::success("Book deleted successfully!"));
                Ok(DeleteOutcome::Deleted)
            }
            Err(err) => {
                tracing::error!(%id, error = %err, "failed to delete book");
                self.notifier.notify(Notification::failure(
                    "Error deleting book. Please try again.",
                ));
                Err(err)
            }
        }
    }

    /// Delete every record whose month token is not in `year`. Returns how many went.
    pub fn prune_outside_year(&self, year: i32) -> Result<usize, StoreError> {
        let prefix = format!("{:04}-", year);
        let stale: Vec<BookId> = self
            .store
            .snapshot()?
            .books()
            .iter()
            .filter(|book| !book.month().starts_with(&prefix))
            .map(|book| book.id.clone())
            .collect();

        for id in &stale {
            self.store.delete(id)?;
        }
        if !stale.is_empty() {
            tracing::info!(year, removed = stale.len(), "pruned books outside year");
        }
        Ok(stale.len())
    }
}
