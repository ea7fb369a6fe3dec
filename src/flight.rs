//! Single-flight bookkeeping shared by every network-crossing component.
//!
//! Each request kind owns one [`Flight`]. Starting a request hands out a
//! [`Ticket`]; a response is only applied if its ticket is still the current
//! one. Abandoning a flight (e.g. clearing a conversation mid-request) makes
//! any late response stale so it is dropped instead of applied.

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
pub struct Flight {
    kind: &'static str,
    issued: u64,
    current: Option<Ticket>,
}

impl Flight {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            issued: 0,
            current: None,
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn is_busy(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<Ticket> {
        self.current
    }

    pub fn begin(&mut self) -> CoreResult<Ticket> {
        if self.current.is_some() {
            return Err(CoreError::Busy(self.kind));
        }
        self.issued += 1;
        let ticket = Ticket(self.issued);
        self.current = Some(ticket);
        Ok(ticket)
    }

    /// Returns `true` when `ticket` was the outstanding request.
    pub fn finish(&mut self, ticket: Ticket) -> bool {
        if self.current == Some(ticket) {
            self.current = None;
            true
        } else {
            tracing::debug!(kind = self.kind, ticket = ticket.0, "stale response discarded");
            false
        }
    }

    pub fn abandon(&mut self) {
        if let Some(t) = self.current.take() {
            tracing::debug!(kind = self.kind, ticket = t.0, "in-flight request abandoned");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_begin_is_rejected_until_finished() {
        let mut flight = Flight::new("search");
        let t = flight.begin().expect("first begin");
        assert_eq!(flight.begin(), Err(CoreError::Busy("search")));
        assert!(flight.finish(t));
        assert!(!flight.is_busy());
        let t2 = flight.begin().expect("begin after finish");
        assert_ne!(t, t2);
    }

    #[test]
    fn abandoned_ticket_is_stale() {
        let mut flight = Flight::new("chat");
        let t = flight.begin().expect("begin");
        flight.abandon();
        assert!(!flight.is_busy());
        assert!(!flight.finish(t));
    }
}
