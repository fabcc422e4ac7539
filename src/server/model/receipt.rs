use std::fmt;
use std::fmt::Write;
use rust_decimal::Decimal;
use serde::Serialize;
use crate::server::model::menu::CourseType;
use crate::server::model::order::{OrderError, SelectedEntry};

/// Free-text customer identification (name and ID), as typed at the kiosk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub(crate) struct CustomerId(String);

impl CustomerId {
    pub fn new(raw: &str) -> Result<Self, OrderError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(OrderError::InvalidCustomerId);
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name stem safe to join onto a directory. Letters and digits of any script
    /// are kept; path separators, dots, control and shell-reserved characters become `_`.
    pub fn file_stem(&self) -> String {
        self.0
            .chars()
            .map(|c| match c {
                '/' | '\\' | '.' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
                c if c.is_control() => '_',
                c => c,
            })
            .collect()
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct ReceiptLine {
    pub number: usize,
    pub course_type: CourseType,
    pub description: String,
    pub unit_price: Decimal,
    pub quantity: u8,
    pub line_total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct Receipt {
    pub customer_id: Option<CustomerId>,
    pub lines: Vec<ReceiptLine>,
    pub grand_total: Decimal,
}

const HEADER: &str = "    Course type\tDescription\tPrice\tQuantity\tTotal";

impl Receipt {
    /// Numbered lines in selection order, with exact decimal totals.
    pub fn render(selected: &[SelectedEntry<'_>], customer_id: Option<CustomerId>) -> Self {
        let lines = selected
            .iter()
            .enumerate()
            .map(|(i, s)| ReceiptLine {
                number: i + 1,
                course_type: s.entry.course_type,
                description: s.entry.description.clone(),
                unit_price: s.entry.unit_price,
                quantity: s.quantity.get(),
                line_total: s.entry.unit_price * Decimal::from(s.quantity.get()),
            })
            .collect::<Vec<_>>();
        let grand_total = lines.iter().map(|l| l.line_total).sum();

        Self {
            customer_id,
            lines,
            grand_total,
        }
    }

    /// Header, one row per line, then the total.
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        // writing into a String cannot fail
        let _ = writeln!(text, "{HEADER}");
        for line in &self.lines {
            let _ = writeln!(
                text,
                "({}) {}\t{}\t{:.2}\t{}\t{:.2}",
                line.number, line.course_type, line.description, line.unit_price, line.quantity, line.line_total
            );
        }
        let _ = write!(text, "\nTotal price:\t{:.2}\n", self.grand_total);
        text
    }

    /// Content persisted for a finalized order.
    pub fn to_order_file(&self) -> String {
        match &self.customer_id {
            Some(customer) => format!("{customer}'s order:\n\n{}", self.to_text()),
            None => self.to_text(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::server::model::menu::{EntryId, MenuCatalog};
    use crate::server::model::order::{OrderSession, Quantity};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn receipt_for(menu: &str, picks: &[(usize, u32)], customer: Option<&str>) -> Receipt {
        let catalog = MenuCatalog::parse(menu).unwrap();
        let mut session = OrderSession::new(Utc.timestamp_opt(0, 0).unwrap());
        for &(id, quantity) in picks {
            session.select(EntryId(id), Quantity::new(quantity).unwrap());
        }
        let selected = session.selected_entries(&catalog).unwrap();
        Receipt::render(&selected, customer.map(|c| CustomerId::new(c).unwrap()))
    }

    #[test]
    fn totals_are_exact() {
        let receipt = receipt_for(
            "Soup\nFirst Course\n12.50\nCola\nDrink\n7.99\nCake\nLast Course\n4.25\n",
            &[(0, 2), (1, 1), (2, 3)],
            None,
        );
        let totals = receipt.lines.iter().map(|l| l.line_total).collect::<Vec<_>>();
        assert_eq!(totals, vec![dec!(25.00), dec!(7.99), dec!(12.75)]);
        assert_eq!(receipt.grand_total, dec!(45.74));
    }

    #[test]
    fn lines_follow_selection_order() {
        let receipt = receipt_for(
            "Soup\nFirst Course\n5\nCola\nDrink\n2\n",
            &[(1, 1), (0, 1)],
            None,
        );
        let rows = receipt.lines.iter().map(|l| (l.number, l.description.as_str())).collect::<Vec<_>>();
        assert_eq!(rows, vec![(1, "Cola"), (2, "Soup")]);
    }

    #[test]
    fn empty_selection_renders_zero_total() {
        let receipt = receipt_for("Soup\nFirst Course\n5\n", &[], None);
        assert!(receipt.lines.is_empty());
        assert_eq!(receipt.grand_total, Decimal::ZERO);
        assert!(receipt.to_text().ends_with("Total price:\t0.00\n"));
    }

    #[test]
    fn text_rendering() {
        let receipt = receipt_for(
            "Pasta\nFirst Course\n10.00\nJuice\nDrink\n3.5\n",
            &[(0, 2), (1, 1)],
            Some("alice123"),
        );
        let expected = "alice123's order:\n\n    Course type\tDescription\tPrice\tQuantity\tTotal\n\
            (1) First Course\tPasta\t10.00\t2\t20.00\n\
            (2) Drink\tJuice\t3.50\t1\t3.50\n\
            \nTotal price:\t23.50\n";
        assert_eq!(receipt.to_order_file(), expected);
    }

    #[test]
    fn customer_id_is_trimmed_and_required() {
        assert!(matches!(CustomerId::new("   "), Err(OrderError::InvalidCustomerId)));
        assert_eq!(CustomerId::new("  bob 42 ").unwrap().as_str(), "bob 42");
    }

    #[test]
    fn file_stem_strips_path_characters() {
        let id = CustomerId::new("../etc/passwd").unwrap();
        assert_eq!(id.file_stem(), "___etc_passwd");
        assert_eq!(CustomerId::new("..\\x\ty").unwrap().file_stem(), "___x_y");
        assert_eq!(CustomerId::new("Dana Levi-7_x").unwrap().file_stem(), "Dana Levi-7_x");
    }

    #[test]
    fn file_stem_keeps_non_ascii_names_apart() {
        let dani = CustomerId::new("דני 1").unwrap().file_stem();
        let ron = CustomerId::new("רון 1").unwrap().file_stem();
        assert_eq!(dani, "דני 1");
        assert_ne!(dani, ron);
    }

    #[test]
    fn printed_lines_add_up_to_printed_total() {
        let receipt = receipt_for(
            "Mint\nDrink\n0.12\nGum\nLast Course\n0.13\n",
            &[(0, 3), (1, 3)],
            None,
        );
        let text = receipt.to_text();
        assert!(text.contains("Mint\t0.12\t3\t0.36\n"));
        assert!(text.contains("Gum\t0.13\t3\t0.39\n"));
        assert!(text.ends_with("Total price:\t0.75\n"));
        assert_eq!(receipt.grand_total, dec!(0.75));
    }
}
