use crate::io::database::{GatewayError, TicketGateway};
use crate::model::{Status, Ticket, TicketId};

use super::rank::{RankError, compute_rank, reposition};

/// Error type for store operations. `summary()` is the short operator-facing
/// description, `Display` carries the detail.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{source}")]
    Gateway {
        summary: &'static str,
        source: GatewayError,
    },
    #[error("{source}")]
    Rank {
        summary: &'static str,
        source: RankError,
    },
    #[error("ticket {id} has unknown status {value:?}")]
    UnknownStatus { id: TicketId, value: String },
    #[error("ranking before should only be used when {id} is not already before {anchor}")]
    AlreadyBefore { id: TicketId, anchor: TicketId },
    #[error("ranking after should only be used when {id} is not already after {anchor}")]
    AlreadyAfter { id: TicketId, anchor: TicketId },
}

impl StoreError {
    pub fn summary(&self) -> &'static str {
        match self {
            StoreError::Gateway { summary, .. } | StoreError::Rank { summary, .. } => summary,
            StoreError::UnknownStatus { .. } => "Failed to load tickets",
            StoreError::AlreadyBefore { .. } | StoreError::AlreadyAfter { .. } => {
                "Failed to update rank"
            }
        }
    }
}

fn gateway(summary: &'static str) -> impl FnOnce(GatewayError) -> StoreError {
    move |source| StoreError::Gateway { summary, source }
}

/// Authoritative ordered ticket collection. Every write goes to the gateway
/// first; memory changes only after the gateway succeeded.
pub struct TicketStore<G> {
    tickets: Vec<Ticket>,
    gateway: G,
}

impl<G: TicketGateway> TicketStore<G> {
    pub fn new(gateway: G) -> Self {
        TicketStore {
            tickets: Vec::new(),
            gateway,
        }
    }

    /// All tickets in global rank order
    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    fn index_of(&self, id: TicketId) -> Option<usize> {
        self.tickets.iter().position(|t| t.id == id)
    }

    /// Replace the collection with every persisted row
    pub fn load(&mut self) -> Result<(), StoreError> {
        let rows = self
            .gateway
            .get_tickets()
            .map_err(gateway("Failed to load tickets"))?;
        let mut tickets = Vec::with_capacity(rows.len());
        for row in rows {
            let id = TicketId::new(row.id);
            let status = row
                .status
                .parse::<Status>()
                .map_err(|e| StoreError::UnknownStatus { id, value: e.0 })?;
            tickets.push(Ticket {
                id,
                status,
                title: row.title,
                description: row.description.unwrap_or_default(),
                rank: row.rank,
            });
        }
        self.tickets = tickets;
        Ok(())
    }

    /// Append a new Todo ticket after every existing one
    pub fn create(&mut self, title: &str, description: &str) -> Result<TicketId, StoreError> {
        let added = self
            .gateway
            .add_ticket(title, non_empty(description))
            .map_err(gateway("Failed to write new ticket to db"))?;
        let id = TicketId::new(added.id);
        self.tickets.push(Ticket {
            id,
            status: Status::Todo,
            title: title.to_string(),
            description: description.to_string(),
            rank: added.rank,
        });
        Ok(id)
    }

    /// Absent ids are a silent no-op
    pub fn update_content(
        &mut self,
        id: TicketId,
        title: &str,
        description: &str,
    ) -> Result<(), StoreError> {
        let Some(index) = self.index_of(id) else {
            return Ok(());
        };
        self.gateway
            .update_ticket_content(id.number(), title, non_empty(description))
            .map_err(gateway("Failed to update ticket"))?;
        let ticket = &mut self.tickets[index];
        ticket.title = title.to_string();
        ticket.description = description.to_string();
        Ok(())
    }

    /// Absent ids are a silent no-op
    pub fn update_status(&mut self, id: TicketId, status: Status) -> Result<(), StoreError> {
        let Some(index) = self.index_of(id) else {
            return Ok(());
        };
        self.gateway
            .update_status(id.number(), status.as_str())
            .map_err(gateway("Failed to update ticket status"))?;
        self.tickets[index].status = status;
        Ok(())
    }

    /// Returns `false` without writing when the ticket is absent or already Done
    pub fn move_to_next_status(&mut self, id: TicketId) -> Result<bool, StoreError> {
        self.step_status(id, Status::next)
    }

    /// Returns `false` without writing when the ticket is absent or still Todo
    pub fn move_to_previous_status(&mut self, id: TicketId) -> Result<bool, StoreError> {
        self.step_status(id, Status::previous)
    }

    fn step_status(
        &mut self,
        id: TicketId,
        step: fn(Status) -> Option<Status>,
    ) -> Result<bool, StoreError> {
        let Some(status) = self
            .index_of(id)
            .and_then(|i| step(self.tickets[i].status))
        else {
            return Ok(false);
        };
        self.update_status(id, status)?;
        Ok(true)
    }

    /// Rank `id` directly before `before`. `id` must currently sit after it.
    /// Returns `false` when either ticket is absent.
    pub fn rank_before(&mut self, id: TicketId, before: TicketId) -> Result<bool, StoreError> {
        let (Some(index), Some(before_index)) = (self.index_of(id), self.index_of(before)) else {
            return Ok(false);
        };
        if index <= before_index {
            return Err(StoreError::AlreadyBefore { id, anchor: before });
        }
        self.rank_ticket(index, before_index)?;
        Ok(true)
    }

    /// Rank `id` directly after `after`. `id` must currently sit before it.
    /// Returns `false` when either ticket is absent.
    pub fn rank_after(&mut self, id: TicketId, after: TicketId) -> Result<bool, StoreError> {
        let (Some(index), Some(after_index)) = (self.index_of(id), self.index_of(after)) else {
            return Ok(false);
        };
        if index >= after_index {
            return Err(StoreError::AlreadyAfter { id, anchor: after });
        }
        self.rank_ticket(index, after_index + 1)?;
        Ok(true)
    }

    fn rank_ticket(&mut self, current: usize, target: usize) -> Result<(), StoreError> {
        let rank = compute_rank(&self.tickets, current, target).map_err(|source| {
            StoreError::Rank {
                summary: "Failed to update rank",
                source,
            }
        })?;
        let id = self.tickets[current].id;
        self.gateway
            .update_rank(id.number(), rank)
            .map_err(gateway("Failed to update rank"))?;
        self.tickets[current].rank = rank;
        reposition(&mut self.tickets, current, target);
        Ok(())
    }

    /// Absent ids are a silent no-op after the gateway write
    pub fn delete(&mut self, id: TicketId) -> Result<(), StoreError> {
        self.gateway
            .delete_ticket(id.number())
            .map_err(gateway("Failed to delete ticket"))?;
        self.tickets.retain(|t| t.id != id);
        Ok(())
    }
}

fn non_empty(text: &str) -> Option<&str> {
    (!text.is_empty()).then_some(text)
}
