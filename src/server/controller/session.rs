use std::time::Duration;
use actix_web::{delete, get, patch, post, put, web, HttpResponse, Responder};
use actix_web::rt::time;
use log::{info, warn};
use crate::server::controller::error::CustomError;
use crate::server::controller::ORDER_WRITE_TIMEOUT_SECONDS;
use crate::server::model::menu::EntryId;
use crate::server::model::order::{OrderError, Quantity};
use crate::server::model::receipt::CustomerId;
use crate::server::model::session::{
    GetSessionResponse, PatchItemResponse, PostSessionsResponse, PostSubmitRequest, PostSubmitResponse,
    QuantityRequest, ReceiptResponse, Selection, SessionId, ToggleRequest,
};
use crate::server::state::AppState;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Entry ids in a path must point into the catalog.
fn entry_id(data: &AppState, raw: usize) -> Result<EntryId, CustomError> {
    let id = EntryId(raw);
    match data.catalog().get(id) {
        Some(_) => Ok(id),
        None => Err(OrderError::UnknownEntry { id }.into()),
    }
}

#[post("/v1/sessions")]
/// start a new order
pub(crate) async fn post_sessions(data: web::Data<AppState>) -> impl Responder {
    let session_id = data.sessions().open().await;
    web::Json(PostSessionsResponse { session_id })
}

#[get("/v1/session/{id}")]
pub(crate) async fn get_session(id: web::Path<SessionId>, data: web::Data<AppState>) -> Result<impl Responder, CustomError> {
    let session_id = id.into_inner();
    let catalog = data.catalog();
    let response = data
        .sessions()
        .with_session(session_id, |s| {
            s.selected_entries(catalog).map(|selected| GetSessionResponse {
                session_id,
                created_at: s.created_at().format(TIMESTAMP_FORMAT).to_string(),
                selections: selected
                    .into_iter()
                    .map(|e| Selection {
                        entry_id: e.id,
                        description: e.entry.description.clone(),
                        quantity: e.quantity.get(),
                    })
                    .collect(),
            })
        })
        .await
        .ok_or(CustomError::ResourceNotFound)??;
    Ok(web::Json(response))
}

#[delete("/v1/session/{id}")]
/// leave the kiosk without ordering
pub(crate) async fn delete_session(id: web::Path<SessionId>, data: web::Data<AppState>) -> Result<impl Responder, CustomError> {
    match data.sessions().close(id.into_inner()).await {
        true => Ok(HttpResponse::Ok()),
        false => Err(CustomError::ResourceNotFound),
    }
}

#[put("/v1/session/{id}/item/{entry_id}")]
/// select an entry, or change its quantity if already selected
pub(crate) async fn put_item(
    path: web::Path<(SessionId, usize)>,
    body: web::Json<QuantityRequest>,
    data: web::Data<AppState>,
) -> Result<impl Responder, CustomError> {
    let (session_id, raw_entry_id) = path.into_inner();
    let entry = entry_id(&data, raw_entry_id)?;
    let quantity = Quantity::new(body.quantity)?;
    data.sessions()
        .with_session(session_id, |s| s.select(entry, quantity))
        .await
        .ok_or(CustomError::ResourceNotFound)?;
    Ok(HttpResponse::Ok())
}

#[patch("/v1/session/{id}/item/{entry_id}")]
/// change the quantity of a selected entry, ignored for unselected ones
pub(crate) async fn patch_item(
    path: web::Path<(SessionId, usize)>,
    body: web::Json<QuantityRequest>,
    data: web::Data<AppState>,
) -> Result<impl Responder, CustomError> {
    let (session_id, raw_entry_id) = path.into_inner();
    let entry = entry_id(&data, raw_entry_id)?;
    let quantity = Quantity::new(body.quantity)?;
    let updated = data
        .sessions()
        .with_session(session_id, |s| s.update_quantity(entry, quantity))
        .await
        .ok_or(CustomError::ResourceNotFound)?;
    Ok(web::Json(PatchItemResponse { updated }))
}

#[delete("/v1/session/{id}/item/{entry_id}")]
pub(crate) async fn delete_item(path: web::Path<(SessionId, usize)>, data: web::Data<AppState>) -> Result<impl Responder, CustomError> {
    let (session_id, raw_entry_id) = path.into_inner();
    let entry = entry_id(&data, raw_entry_id)?;
    data.sessions()
        .with_session(session_id, |s| s.deselect(entry))
        .await
        .ok_or(CustomError::ResourceNotFound)?;
    Ok(HttpResponse::Ok())
}

#[post("/v1/session/{id}/toggle/{entry_id}")]
/// checkbox style selection
pub(crate) async fn post_toggle(
    path: web::Path<(SessionId, usize)>,
    body: web::Json<ToggleRequest>,
    data: web::Data<AppState>,
) -> Result<impl Responder, CustomError> {
    let (session_id, raw_entry_id) = path.into_inner();
    let entry = entry_id(&data, raw_entry_id)?;
    let ToggleRequest { checked, quantity } = body.into_inner();
    data.sessions()
        .with_session(session_id, |s| s.toggle(entry, checked, quantity))
        .await
        .ok_or(CustomError::ResourceNotFound)??;
    Ok(HttpResponse::Ok())
}

#[get("/v1/session/{id}/receipt")]
/// order details before confirming, the session keeps going
pub(crate) async fn get_receipt(id: web::Path<SessionId>, data: web::Data<AppState>) -> Result<impl Responder, CustomError> {
    let catalog = data.catalog();
    let receipt = data
        .sessions()
        .with_session(id.into_inner(), |s| s.preview(catalog))
        .await
        .ok_or(CustomError::ResourceNotFound)??;
    let text = receipt.to_text();
    Ok(web::Json(ReceiptResponse { receipt, text }))
}

#[post("/v1/session/{id}/submit")]
/// finalize the order and save it for the customer
///
/// The file is written off the session lock, the session is reset only once it is saved.
pub(crate) async fn post_submit(
    id: web::Path<SessionId>,
    body: web::Json<PostSubmitRequest>,
    data: web::Data<AppState>,
) -> Result<impl Responder, CustomError> {
    let session_id = id.into_inner();
    let customer = CustomerId::new(&body.customer_id)?;
    let catalog = data.catalog();
    let checkout = data
        .sessions()
        .with_session(session_id, |s| s.checkout(catalog, customer))
        .await
        .ok_or(CustomError::ResourceNotFound)??;

    let store = data.order_store();
    let write = web::block(move || {
        let saved = checkout.save(store.as_ref());
        (checkout, saved)
    });
    let sleep = time::sleep(Duration::from_secs(ORDER_WRITE_TIMEOUT_SECONDS));
    tokio::pin!(sleep);
    let (checkout, saved) = tokio::select! {
        result = write => result.map_err(|e| {
            warn!("post_submit failed for session={}, {}", session_id, e);
            CustomError::OrderNotSaved
        })?,
        _ = &mut sleep => {
            warn!("timeout saving the order of session={}", session_id);
            return Err(CustomError::Timeout);
        }
    };
    let path = match saved {
        Ok(path) => path,
        Err(e) => {
            warn!("post_submit failed for session={}, {}", session_id, e);
            return Err(e.into());
        }
    };

    if data.sessions().with_session(session_id, |s| s.finish(&checkout)).await.is_none() {
        info!("session={} was closed while its order was saved", session_id);
    }
    info!("session={} submitted", session_id);
    let text = checkout.receipt.to_order_file();
    Ok(web::Json(PostSubmitResponse {
        receipt: checkout.receipt,
        text,
        saved_to: path.display().to_string(),
    }))
}

#[post("/v1/session/{id}/cancel")]
/// drop every selection, the session stays open
pub(crate) async fn post_cancel(id: web::Path<SessionId>, data: web::Data<AppState>) -> Result<impl Responder, CustomError> {
    data.sessions()
        .with_session(id.into_inner(), |s| s.reset())
        .await
        .ok_or(CustomError::ResourceNotFound)?;
    Ok(HttpResponse::Ok())
}
