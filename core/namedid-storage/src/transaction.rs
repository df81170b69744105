//! Scoped write transactions.

use crate::document::DocumentStorage;
use crate::error::StorageResult;
use tracing::{debug, warn};

/// RAII guard over a document write transaction.
///
/// A guard either owns the transaction (it opened it) or joins one the
/// caller already had open. Only an owned guard commits or rolls back;
/// dropping an unfinished owned guard rolls back.
pub struct Transaction<'d, D: DocumentStorage + ?Sized> {
    doc: &'d mut D,
    owned: bool,
    finished: bool,
}

impl<'d, D: DocumentStorage + ?Sized> Transaction<'d, D> {
    /// Opens a new transaction. Fails if one is already open.
    pub fn begin(doc: &'d mut D, label: &str) -> StorageResult<Self> {
        doc.begin_transaction(label)?;
        debug!(document = %doc.title(), label, "Transaction opened");
        Ok(Self {
            doc,
            owned: true,
            finished: false,
        })
    }

    /// Joins the caller's open transaction, or opens a new one if none is open.
    pub fn begin_or_join(doc: &'d mut D, label: &str) -> StorageResult<Self> {
        if doc.is_transaction_open() {
            debug!(document = %doc.title(), label, "Joining caller transaction");
            return Ok(Self {
                doc,
                owned: false,
                finished: false,
            });
        }
        Self::begin(doc, label)
    }

    /// Whether this guard opened the transaction.
    pub fn is_owned(&self) -> bool {
        self.owned
    }

    pub fn document(&self) -> &D {
        &*self.doc
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut *self.doc
    }

    /// Commits an owned transaction. A joined transaction is left to the caller.
    ///
    /// If the commit fails, the transaction is rolled back before the error
    /// is returned.
    pub fn commit(mut self) -> StorageResult<()> {
        self.finished = true;
        if !self.owned {
            return Ok(());
        }
        if let Err(e) = self.doc.commit_transaction() {
            warn!(document = %self.doc.title(), error = %e, "Commit failed, rolling back");
            if self.doc.is_transaction_open() {
                if let Err(rb) = self.doc.rollback_transaction() {
                    warn!(document = %self.doc.title(), error = %rb, "Rollback after failed commit failed");
                }
            }
            return Err(e);
        }
        Ok(())
    }

    /// Rolls back an owned transaction. A joined transaction is left to the caller.
    pub fn rollback(mut self) -> StorageResult<()> {
        self.finished = true;
        if self.owned {
            self.doc.rollback_transaction()?;
        }
        Ok(())
    }
}

impl<D: DocumentStorage + ?Sized> Drop for Transaction<'_, D> {
    fn drop(&mut self) {
        if self.finished || !self.owned || !self.doc.is_transaction_open() {
            return;
        }
        debug!(document = %self.doc.title(), "Rolling back unfinished transaction");
        if let Err(e) = self.doc.rollback_transaction() {
            warn!(document = %self.doc.title(), error = %e, "Rollback on drop failed");
        }
    }
}
