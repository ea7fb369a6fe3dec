//! The in-progress meal as a small reducer over [`CartEvent`]s.

use time::Date;

use crate::catalog::CatalogItem;
use crate::error::{CoreError, CoreResult};
use crate::flight::{Flight, Ticket};
use crate::meals::dto::{LogMealRequest, MealItem};
use crate::nutrition::Macros;

#[derive(Debug, Clone, PartialEq)]
pub struct CartEntry {
    pub item: CatalogItem,
    pub quantity: f64,
}

impl CartEntry {
    pub fn macros(&self) -> Macros {
        self.item.macros() * self.quantity
    }
}

#[derive(Debug, Clone)]
pub enum CartEvent {
    /// Add one serving, or bump an existing entry by one.
    Add(CatalogItem),
    /// Set an absolute quantity. Zero, negative or NaN removes the entry;
    /// an infinite quantity is ignored.
    SetQuantity { id: i64, quantity: f64 },
    Clear,
}

/// Ordered by first insertion. Stored quantities are always `> 0`.
#[derive(Debug)]
pub struct Cart {
    entries: Vec<CartEntry>,
    submit: Flight,
}

impl Default for Cart {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            submit: Flight::new("meal submission"),
        }
    }
}

impl Cart {
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_submitting(&self) -> bool {
        self.submit.is_busy()
    }

    pub fn get(&self, id: i64) -> Option<&CartEntry> {
        self.entries.iter().find(|e| e.item.id == id)
    }

    pub fn apply(&mut self, event: CartEvent) {
        match event {
            CartEvent::Add(item) => {
                match self.entries.iter_mut().find(|e| e.item.id == item.id) {
                    Some(entry) => entry.quantity += 1.0,
                    None => self.entries.push(CartEntry {
                        item,
                        quantity: 1.0,
                    }),
                }
            }
            CartEvent::SetQuantity { id, quantity } => {
                if quantity.is_nan() || quantity <= 0.0 {
                    self.entries.retain(|e| e.item.id != id);
                } else if quantity.is_infinite() {
                    tracing::debug!(id, "infinite quantity ignored");
                } else if let Some(entry) = self.entries.iter_mut().find(|e| e.item.id == id) {
                    entry.quantity = quantity;
                }
            }
            CartEvent::Clear => self.entries.clear(),
        }
    }

    pub fn add_item(&mut self, item: CatalogItem) {
        self.apply(CartEvent::Add(item));
    }

    pub fn update_quantity(&mut self, id: i64, quantity: f64) {
        self.apply(CartEvent::SetQuantity { id, quantity });
    }

    /// Always a fresh summation over the current entries.
    pub fn totals(&self) -> Macros {
        self.entries.iter().map(CartEntry::macros).sum()
    }

    /// Validates and snapshots the cart for submission. Nothing is mutated
    /// except the in-flight marker.
    pub fn begin_submit(&mut self, date: Option<Date>) -> CoreResult<(Ticket, LogMealRequest)> {
        if self.entries.is_empty() {
            return Err(CoreError::validation("Please add some foods to your meal"));
        }
        let ticket = self.submit.begin()?;
        let items = self
            .entries
            .iter()
            .map(|e| MealItem {
                name: e.item.name.clone(),
                qty: e.quantity,
            })
            .collect();
        let date = date.map(crate::iso_date);
        Ok((ticket, LogMealRequest { items, date }))
    }

    /// Clears the cart only when the submission succeeded; on failure every
    /// entry stays exactly as it was.
    pub fn finish_submit(&mut self, ticket: Ticket, outcome: CoreResult<()>) -> CoreResult<()> {
        if !self.submit.finish(ticket) {
            return outcome;
        }
        if outcome.is_ok() {
            self.apply(CartEvent::Clear);
        }
        outcome
    }
}
