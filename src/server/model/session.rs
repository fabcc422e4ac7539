use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use crate::server::model::menu::{CourseType, EntryId};
use crate::server::model::receipt::Receipt;

pub(crate) type SessionId = u64;

#[derive(Debug, Serialize)]
pub(crate) struct GetMenuResponse {
    pub groups: Vec<MenuGroup>,
}

#[derive(Debug, Serialize)]
pub(crate) struct MenuGroup {
    pub course_type: CourseType,
    pub label: &'static str,
    pub entries: Vec<MenuItem>,
}

#[derive(Debug, Serialize)]
pub(crate) struct MenuItem {
    pub entry_id: EntryId,
    pub description: String,
    pub unit_price: Decimal,
}

#[derive(Debug, Serialize)]
pub(crate) struct PostSessionsResponse {
    pub session_id: SessionId,
}

#[derive(Debug, Serialize)]
pub(crate) struct GetSessionResponse {
    pub session_id: SessionId,
    pub created_at: String,
    pub selections: Vec<Selection>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Selection {
    pub entry_id: EntryId,
    pub description: String,
    pub quantity: u8,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuantityRequest {
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ToggleRequest {
    pub checked: bool,
    pub quantity: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct PatchItemResponse {
    /// false when the entry is not part of the order
    pub updated: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PostSubmitRequest {
    pub customer_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReceiptResponse {
    pub receipt: Receipt,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct PostSubmitResponse {
    pub receipt: Receipt,
    pub text: String,
    pub saved_to: String,
}
