use std::path::PathBuf;
use chrono::{DateTime, Utc};
use derive_more::{Display, Error};
use serde::Serialize;
use log::{info, warn};
use crate::server::model::menu::{EntryId, MenuCatalog, MenuEntry};
use crate::server::model::receipt::{CustomerId, Receipt};
use crate::server::store::OrderStore;

/// Largest quantity the kiosk offers for a single entry.
pub(crate) const MAX_QUANTITY: u8 = 10;

#[derive(Debug, Display, Error)]
pub(crate) enum OrderError {
    #[display("no menu entry with id {id}")]
    UnknownEntry { id: EntryId },
    #[display("quantity {quantity} is outside 1..={}", MAX_QUANTITY)]
    InvalidQuantity { quantity: u32 },
    #[display("customer id must not be empty")]
    InvalidCustomerId,
    #[display("nothing was ordered")]
    EmptyOrder,
    #[display("failed to write order file {path}: {source}")]
    OrderFileWriteFailed { path: String, source: std::io::Error },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub(crate) struct Quantity(u8);

impl Quantity {
    pub fn new(quantity: u32) -> Result<Self, OrderError> {
        match u8::try_from(quantity) {
            Ok(q) if (1..=MAX_QUANTITY).contains(&q) => Ok(Self(q)),
            _ => Err(OrderError::InvalidQuantity { quantity }),
        }
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

/// An entry of the catalog together with the quantity ordered in one session.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SelectedEntry<'a> {
    pub id: EntryId,
    pub entry: &'a MenuEntry,
    pub quantity: Quantity,
}

/// Selection state of a single in-progress order.
///
/// Catalog entries are never mutated; quantities live here, keyed by [`EntryId`],
/// so any number of sessions can share one catalog.
#[derive(Debug)]
pub(crate) struct OrderSession {
    /// selection order, no duplicates
    selections: Vec<(EntryId, Quantity)>,
    created_at: DateTime<Utc>,
    /// bumped on every change of the selection
    revision: u64,
}

/// A rendered order waiting to be persisted, tied to the selection it was rendered from.
#[derive(Debug, Clone)]
pub(crate) struct Checkout {
    pub customer: CustomerId,
    pub receipt: Receipt,
    revision: u64,
}

impl OrderSession {
    pub fn new(created_at: DateTime<Utc>) -> Self {
        Self {
            selections: vec![],
            created_at,
            revision: 0,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn position(&self, id: EntryId) -> Option<usize> {
        self.selections.iter().position(|(selected, _)| *selected == id)
    }

    /// Adds the entry at the end of the selection, or updates its quantity if it is already there.
    pub fn select(&mut self, id: EntryId, quantity: Quantity) {
        match self.position(id) {
            Some(idx) => self.selections[idx].1 = quantity,
            None => self.selections.push((id, quantity)),
        }
        self.revision += 1;
    }

    /// Returns whether the entry was selected.
    pub fn deselect(&mut self, id: EntryId) -> bool {
        match self.position(id) {
            Some(idx) => {
                self.selections.remove(idx);
                self.revision += 1;
                true
            }
            None => false,
        }
    }

    /// Changes the quantity of a selected entry. Unselected entries are left alone
    /// and `false` is returned.
    pub fn update_quantity(&mut self, id: EntryId, quantity: Quantity) -> bool {
        match self.position(id) {
            Some(idx) => {
                self.selections[idx].1 = quantity;
                self.revision += 1;
                true
            }
            None => false,
        }
    }

    /// Checkbox semantics: checked selects with the current quantity, unchecked deselects.
    /// The quantity is only validated when checking.
    pub fn toggle(&mut self, id: EntryId, checked: bool, quantity: u32) -> Result<(), OrderError> {
        if checked {
            self.select(id, Quantity::new(quantity)?);
        } else {
            self.deselect(id);
        }
        Ok(())
    }

    /// 0 means not ordered
    pub fn quantity_of(&self, id: EntryId) -> u8 {
        self.position(id).map_or(0, |idx| self.selections[idx].1.get())
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    /// Selected entries in selection order, resolved against the catalog.
    pub fn selected_entries<'a>(&self, catalog: &'a MenuCatalog) -> Result<Vec<SelectedEntry<'a>>, OrderError> {
        self.selections
            .iter()
            .map(|&(id, quantity)| {
                catalog
                    .get(id)
                    .map(|entry| SelectedEntry { id, entry, quantity })
                    .ok_or(OrderError::UnknownEntry { id })
            })
            .collect()
    }

    pub fn reset(&mut self) {
        self.selections.clear();
        self.revision += 1;
    }

    /// Receipt of the current selection, without finalizing anything.
    pub fn preview(&self, catalog: &MenuCatalog) -> Result<Receipt, OrderError> {
        Ok(Receipt::render(&self.selected_entries(catalog)?, None))
    }

    /// First half of a submit: render the order for `customer`, nothing changes yet.
    pub fn checkout(&self, catalog: &MenuCatalog, customer: CustomerId) -> Result<Checkout, OrderError> {
        if self.is_empty() {
            return Err(OrderError::EmptyOrder);
        }
        let receipt = Receipt::render(&self.selected_entries(catalog)?, Some(customer.clone()));
        Ok(Checkout {
            customer,
            receipt,
            revision: self.revision,
        })
    }

    /// Second half of a submit, once the order is persisted: reset the session unless it
    /// was changed since `checkout`. Returns whether it was reset.
    pub fn finish(&mut self, checkout: &Checkout) -> bool {
        if checkout.revision != self.revision {
            warn!(
                "order of customer={} saved but the selection changed meanwhile, keeping it",
                checkout.customer
            );
            return false;
        }
        info!(
            "order of customer={} finalized, total={}",
            checkout.customer, checkout.receipt.grand_total
        );
        self.reset();
        true
    }
}

impl Checkout {
    pub fn save(&self, store: &dyn OrderStore) -> Result<PathBuf, OrderError> {
        store.save(&self.customer, &self.receipt.to_order_file())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::server::store::order_file::OrderFileStore;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn catalog() -> MenuCatalog {
        MenuCatalog::parse("Soup\nFirst Course\n5\nSteak\nMain Course\n20\nCake\nLast Course\n7\nTea\nDrink\n2\n").unwrap()
    }

    fn session() -> OrderSession {
        OrderSession::new(Utc.timestamp_opt(0, 0).unwrap())
    }

    fn q(n: u32) -> Quantity {
        Quantity::new(n).unwrap()
    }

    /// checkout, save and finish in one go
    fn submit(
        s: &mut OrderSession,
        catalog: &MenuCatalog,
        customer: CustomerId,
        store: &dyn OrderStore,
    ) -> Result<(Receipt, PathBuf), OrderError> {
        let checkout = s.checkout(catalog, customer)?;
        let path = checkout.save(store)?;
        assert!(s.finish(&checkout));
        Ok((checkout.receipt, path))
    }

    fn ids(session: &OrderSession, catalog: &MenuCatalog) -> Vec<usize> {
        session.selected_entries(catalog).unwrap().iter().map(|s| s.id.0).collect()
    }

    #[test]
    fn quantity_range() {
        assert!(matches!(Quantity::new(0), Err(OrderError::InvalidQuantity { quantity: 0 })));
        assert!(matches!(Quantity::new(11), Err(OrderError::InvalidQuantity { quantity: 11 })));
        assert!(matches!(Quantity::new(300), Err(OrderError::InvalidQuantity { quantity: 300 })));
        assert_eq!(Quantity::new(1).unwrap().get(), 1);
        assert_eq!(Quantity::new(10).unwrap().get(), 10);
    }

    #[test]
    fn select_is_idempotent_and_updates_quantity() {
        let catalog = catalog();
        let mut s = session();
        s.select(EntryId(2), q(1));
        s.select(EntryId(0), q(2));
        s.select(EntryId(2), q(4));
        assert_eq!(ids(&s, &catalog), vec![2, 0]);
        assert_eq!(s.quantity_of(EntryId(2)), 4);
        assert_eq!(s.quantity_of(EntryId(0)), 2);
    }

    #[test]
    fn reselect_after_deselect_appends() {
        let catalog = catalog();
        let mut s = session();
        s.select(EntryId(0), q(1));
        s.select(EntryId(1), q(1));
        s.select(EntryId(2), q(1));
        assert!(s.deselect(EntryId(0)));
        assert_eq!(s.quantity_of(EntryId(0)), 0);
        s.select(EntryId(0), q(3));
        assert_eq!(ids(&s, &catalog), vec![1, 2, 0]);
    }

    #[test]
    fn deselect_unselected_is_noop() {
        let catalog = catalog();
        let mut s = session();
        s.select(EntryId(1), q(2));
        assert!(!s.deselect(EntryId(3)));
        assert_eq!(ids(&s, &catalog), vec![1]);
    }

    #[test]
    fn update_quantity_ignores_unselected_entries() {
        let catalog = catalog();
        let mut s = session();
        s.select(EntryId(1), q(2));
        assert!(!s.update_quantity(EntryId(3), q(5)));
        assert_eq!(ids(&s, &catalog), vec![1]);
        assert_eq!(s.quantity_of(EntryId(3)), 0);
        assert_eq!(s.quantity_of(EntryId(1)), 2);

        assert!(s.update_quantity(EntryId(1), q(9)));
        assert_eq!(s.quantity_of(EntryId(1)), 9);
    }

    #[test]
    fn toggle_maps_to_select_and_deselect() {
        let catalog = catalog();
        let mut s = session();
        s.toggle(EntryId(3), true, 2).unwrap();
        s.toggle(EntryId(0), true, 1).unwrap();
        s.toggle(EntryId(3), false, 2).unwrap();
        assert_eq!(ids(&s, &catalog), vec![0]);
    }

    #[test]
    fn unchecking_ignores_quantity() {
        let catalog = catalog();
        let mut s = session();
        s.toggle(EntryId(1), true, 3).unwrap();
        s.toggle(EntryId(1), false, 0).unwrap();
        assert!(s.is_empty());
        assert!(matches!(s.toggle(EntryId(2), true, 0), Err(OrderError::InvalidQuantity { quantity: 0 })));
        assert!(matches!(s.toggle(EntryId(2), true, 11), Err(OrderError::InvalidQuantity { quantity: 11 })));
        assert_eq!(ids(&s, &catalog), Vec::<usize>::new());
    }

    #[test]
    fn finish_keeps_selection_changed_after_checkout() {
        let catalog = catalog();
        let mut s = session();
        s.select(EntryId(0), q(1));
        let checkout = s.checkout(&catalog, CustomerId::new("eve").unwrap()).unwrap();
        s.select(EntryId(3), q(2));
        assert!(!s.finish(&checkout));
        assert_eq!(ids(&s, &catalog), vec![0, 3]);

        let checkout = s.checkout(&catalog, CustomerId::new("eve").unwrap()).unwrap();
        assert_eq!(checkout.receipt.lines.len(), 2);
        assert!(s.finish(&checkout));
        assert!(s.is_empty());
    }

    #[test]
    fn reset_clears_everything() {
        let mut s = session();
        for i in 0..4 {
            s.select(EntryId(i), q(i as u32 + 1));
        }
        s.reset();
        assert!(s.is_empty());
        assert!((0..4).all(|i| s.quantity_of(EntryId(i)) == 0));
    }

    #[test]
    fn sessions_do_not_share_quantities() {
        let catalog = catalog();
        let (mut a, mut b) = (session(), session());
        a.select(EntryId(0), q(3));
        b.select(EntryId(0), q(1));
        a.reset();
        assert_eq!(b.quantity_of(EntryId(0)), 1);
        assert_eq!(catalog.get(EntryId(0)).unwrap().description, "Soup");
    }

    struct FailingStore;

    impl OrderStore for FailingStore {
        fn save(&self, customer: &CustomerId, _content: &str) -> Result<PathBuf, OrderError> {
            Err(OrderError::OrderFileWriteFailed {
                path: format!("{}.txt", customer.file_stem()),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }
    }

    #[test]
    fn submit_writes_order_and_resets() {
        let dir = tempfile::tempdir().unwrap();
        let store = OrderFileStore::new(dir.path());
        let catalog = MenuCatalog::parse("Pasta\nFirst Course\n10.00\nJuice\nDrink\n3.50\n").unwrap();
        let mut s = session();
        s.toggle(EntryId(0), true, 2).unwrap();
        s.toggle(EntryId(1), true, 1).unwrap();

        let (receipt, path) = submit(&mut s, &catalog, CustomerId::new("alice123").unwrap(), &store).unwrap();
        assert_eq!(receipt.grand_total, dec!(23.50));
        assert_eq!(path, dir.path().join("alice123.txt"));
        assert!(s.is_empty());

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("alice123's order:\n"));
        assert!(content.contains("Pasta\t10.00\t2\t20.00"));
        assert!(content.contains("Juice\t3.50\t1\t3.50"));
        assert!(content.ends_with("Total price:\t23.50\n"));
    }

    #[test]
    fn failed_write_keeps_selection() {
        let catalog = catalog();
        let mut s = session();
        s.select(EntryId(1), q(2));
        let err = submit(&mut s, &catalog, CustomerId::new("bob").unwrap(), &FailingStore).unwrap_err();
        assert!(matches!(err, OrderError::OrderFileWriteFailed { .. }));
        assert_eq!(s.quantity_of(EntryId(1)), 2);
        assert_eq!(ids(&s, &catalog), vec![1]);
    }

    #[test]
    fn empty_order_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = OrderFileStore::new(dir.path());
        let mut s = session();
        let err = submit(&mut s, &catalog(), CustomerId::new("carol").unwrap(), &store).unwrap_err();
        assert!(matches!(err, OrderError::EmptyOrder));
        assert!(!dir.path().join("carol.txt").exists());
    }

    #[test]
    fn preview_does_not_reset() {
        let catalog = catalog();
        let mut s = session();
        s.select(EntryId(0), q(2));
        let receipt = s.preview(&catalog).unwrap();
        assert_eq!(receipt.grand_total, dec!(10));
        assert!(receipt.customer_id.is_none());
        assert_eq!(s.quantity_of(EntryId(0)), 2);
    }

    #[test]
    fn unknown_entry_is_reported_when_resolving() {
        let catalog = catalog();
        let mut s = session();
        s.select(EntryId(42), q(1));
        assert!(matches!(
            s.selected_entries(&catalog),
            Err(OrderError::UnknownEntry { id: EntryId(42) })
        ));
    }
}
