pub(crate) mod error;
pub(crate) mod menu;
pub(crate) mod session;

use actix_web::web;

/// upper bound for persisting a finalized order
pub(crate) const ORDER_WRITE_TIMEOUT_SECONDS: u64 = 5;

/// Register every kiosk route.
pub(crate) fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(menu::get_menu)
        .service(session::post_sessions)
        .service(session::get_session)
        .service(session::delete_session)
        .service(session::put_item)
        .service(session::patch_item)
        .service(session::delete_item)
        .service(session::post_toggle)
        .service(session::get_receipt)
        .service(session::post_submit)
        .service(session::post_cancel);
}
