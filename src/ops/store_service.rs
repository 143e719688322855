use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use crate::io::database::TicketGateway;
use crate::model::{Status, Ticket, TicketId};

use super::ticket_store::{StoreError, TicketStore};

/// A requested store mutation, as inert data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCommand {
    Load,
    Create {
        title: String,
        description: String,
    },
    UpdateContent {
        id: TicketId,
        title: String,
        description: String,
    },
    UpdateStatus {
        id: TicketId,
        status: Status,
    },
    MoveToNextStatus(TicketId),
    MoveToPreviousStatus(TicketId),
    RankBefore {
        id: TicketId,
        before: TicketId,
    },
    RankAfter {
        id: TicketId,
        after: TicketId,
    },
    Delete(TicketId),
}

/// Result of a store command, delivered back to the event loop
#[derive(Debug)]
pub enum StoreEvent {
    /// The full ticket list after a successful command
    TicketsUpdated(Vec<Ticket>),
    Failed(StoreError),
}

impl StoreCommand {
    /// Run this command against the store. `None` means the command was a
    /// no-op that emits nothing.
    pub fn apply<G: TicketGateway>(self, store: &mut TicketStore<G>) -> Option<StoreEvent> {
        let result = match self {
            StoreCommand::Load => store.load().map(|()| true),
            StoreCommand::Create { title, description } => {
                store.create(&title, &description).map(|_| true)
            }
            StoreCommand::UpdateContent {
                id,
                title,
                description,
            } => store.update_content(id, &title, &description).map(|()| true),
            StoreCommand::UpdateStatus { id, status } => {
                store.update_status(id, status).map(|()| true)
            }
            StoreCommand::MoveToNextStatus(id) => store.move_to_next_status(id),
            StoreCommand::MoveToPreviousStatus(id) => store.move_to_previous_status(id),
            StoreCommand::RankBefore { id, before } => store.rank_before(id, before),
            StoreCommand::RankAfter { id, after } => store.rank_after(id, after),
            StoreCommand::Delete(id) => store.delete(id).map(|()| true),
        };
        match result {
            Ok(true) => Some(StoreEvent::TicketsUpdated(store.tickets().to_vec())),
            Ok(false) => None,
            Err(e) => {
                tracing::warn!(summary = e.summary(), error = %e, "store command failed");
                Some(StoreEvent::Failed(e))
            }
        }
    }
}

/// Error returned when the store worker is gone
#[derive(Debug, thiserror::Error)]
#[error("ticket store worker has stopped")]
pub struct ServiceStopped;

/// Handle to the store worker thread.
///
/// The worker owns the [`TicketStore`] and is its only writer: commands are
/// queued in a mailbox and applied one at a time, in the order they were
/// dispatched. Each applied command sends at most one [`StoreEvent`] to the
/// sink. Dropping the last handle closes the mailbox and stops the worker.
#[derive(Clone)]
pub struct StoreService {
    tx: mpsc::Sender<StoreCommand>,
}

impl StoreService {
    pub fn spawn<G, F>(store: TicketStore<G>, sink: F) -> std::io::Result<(Self, JoinHandle<()>)>
    where
        G: TicketGateway + 'static,
        F: Fn(StoreEvent) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<StoreCommand>();
        let handle = thread::Builder::new()
            .name("ticket-store".into())
            .spawn(move || {
                let mut store = store;
                tracing::debug!("ticket store worker started");
                for command in rx {
                    tracing::trace!(?command, "applying store command");
                    if let Some(event) = command.apply(&mut store) {
                        sink(event);
                    }
                }
                tracing::debug!("ticket store worker stopped");
            })?;
        Ok((StoreService { tx }, handle))
    }

    /// Queue a command. Never blocks.
    pub fn dispatch(&self, command: StoreCommand) -> Result<(), ServiceStopped> {
        self.tx.send(command).map_err(|_| ServiceStopped)
    }
}
