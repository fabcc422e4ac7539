//! main file for the server

pub mod model;
mod controller;
mod state;
mod store;
mod util;

use std::io;
use std::sync::Arc;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::{error, info, warn};
use crate::server::model::config::ServerConfig;
use crate::server::model::menu::{CatalogError, MenuCatalog};
use crate::server::state::AppState;
use crate::server::store::order_file::OrderFileStore;

/// Load the catalog, falling back to an empty one when the file is missing
/// unless the config requires it.
fn load_catalog(config: &ServerConfig) -> io::Result<MenuCatalog> {
    match MenuCatalog::load(&config.menu_path) {
        Ok(catalog) => Ok(catalog),
        Err(e @ CatalogError::Unavailable { .. }) if !config.require_menu => {
            warn!("{}, continuing with an empty menu", e);
            Ok(MenuCatalog::default())
        }
        Err(e) => {
            error!("{}, aborting", e);
            Err(io::Error::new(io::ErrorKind::InvalidData, e))
        }
    }
}

/// Run the server
pub async fn run(config: ServerConfig) -> io::Result<()> {
    let catalog = load_catalog(&config)?;
    info!(
        "serving {} menu entries, orders are saved to {}",
        catalog.len(),
        config.orders_dir.display()
    );
    let state = AppState::new(catalog, Arc::new(OrderFileStore::new(config.orders_dir)));

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(controller::configure)
    })
        .bind(config.addr)?
        .run()
        .await
}
