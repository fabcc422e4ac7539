use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;
use derive_more::{Display, Error};
use log::info;
use rust_decimal::Decimal;
use serde::Serialize;

/// Menu sections, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub(crate) enum CourseType {
    FirstCourse,
    MainCourse,
    LastCourse,
    Drink,
}

impl CourseType {
    pub const ALL: [CourseType; 4] = [
        CourseType::FirstCourse,
        CourseType::MainCourse,
        CourseType::LastCourse,
        CourseType::Drink,
    ];

    /// label used both in the catalog file and on the receipt
    pub fn label(&self) -> &'static str {
        match self {
            CourseType::FirstCourse => "First Course",
            CourseType::MainCourse => "Main Course",
            CourseType::LastCourse => "Last Course",
            CourseType::Drink => "Drink",
        }
    }
}

impl fmt::Display for CourseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CourseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        CourseType::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Invalid course type: {s}"))
    }
}

/// Position of an entry in the catalog, stable for the process lifetime.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub(crate) struct EntryId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MenuEntry {
    pub description: String,
    pub course_type: CourseType,
    pub unit_price: Decimal,
}

#[derive(Debug, Display, Error)]
pub(crate) enum CatalogError {
    #[display("menu catalog unavailable at {path}: {source}")]
    Unavailable { path: String, source: io::Error },
    #[display("malformed menu catalog at line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

/// The static, ordered set of orderable entries.
#[derive(Debug, Default)]
pub(crate) struct MenuCatalog {
    entries: Vec<MenuEntry>,
}

const RECORD_LINES: usize = 3;
/// prices are whole cents at most
const MAX_PRICE_SCALE: u32 = 2;

/// Plain decimal notation only: digits with at most one `.`.
fn parse_price(raw: &str) -> Result<Decimal, String> {
    let plain = !raw.is_empty()
        && raw.chars().all(|c| c.is_ascii_digit() || c == '.')
        && raw.chars().filter(|&c| c == '.').count() <= 1
        && raw.chars().any(|c| c.is_ascii_digit());
    if !plain {
        return Err(format!("invalid price {raw:?}"));
    }
    let price = Decimal::from_str(raw).map_err(|e| format!("invalid price {raw:?}, {e}"))?;
    if price.scale() > MAX_PRICE_SCALE {
        return Err(format!("price {raw} has more than {MAX_PRICE_SCALE} decimal places"));
    }
    Ok(price)
}

impl MenuCatalog {
    /// Load a catalog file, one record per three lines: description, course type, price.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = fs::read_to_string(path).map_err(|source| CatalogError::Unavailable {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::parse(&text)?;
        info!("loaded {} menu entries from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn parse(text: &str) -> Result<Self, CatalogError> {
        let mut lines: Vec<&str> = text.lines().map(|l| l.trim_end_matches('\r')).collect();
        while lines.last().is_some_and(|l| l.trim().is_empty()) {
            lines.pop();
        }

        let mut entries = Vec::with_capacity(lines.len() / RECORD_LINES);
        for (i, record) in lines.chunks(RECORD_LINES).enumerate() {
            let first_line = i * RECORD_LINES + 1;
            let [description, course_type, price] = record else {
                return Err(CatalogError::Malformed {
                    line: first_line + record.len(),
                    reason: "truncated record, expected description, course type and price".to_string(),
                });
            };

            let description = description.trim();
            if description.is_empty() {
                return Err(CatalogError::Malformed {
                    line: first_line,
                    reason: "empty description".to_string(),
                });
            }
            let course_type = course_type
                .parse::<CourseType>()
                .map_err(|reason| CatalogError::Malformed { line: first_line + 1, reason })?;
            let unit_price = parse_price(price.trim())
                .map_err(|reason| CatalogError::Malformed { line: first_line + 2, reason })?;

            entries.push(MenuEntry {
                description: description.to_string(),
                course_type,
                unit_price,
            });
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: EntryId) -> Option<&MenuEntry> {
        self.entries.get(id.0)
    }

    /// all entries in file order
    pub fn entries(&self) -> impl Iterator<Item = (EntryId, &MenuEntry)> {
        self.entries.iter().enumerate().map(|(i, e)| (EntryId(i), e))
    }

    /// Entries grouped by course type in display order, file order within a group.
    /// Course types without entries are left out.
    pub fn grouped(&self) -> Vec<(CourseType, Vec<(EntryId, &MenuEntry)>)> {
        CourseType::ALL
            .into_iter()
            .map(|course| {
                (
                    course,
                    self.entries().filter(|(_, e)| e.course_type == course).collect::<Vec<_>>(),
                )
            })
            .filter(|(_, group)| !group.is_empty())
            .collect()
    }
}
