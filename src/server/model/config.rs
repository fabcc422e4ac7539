use std::net::SocketAddrV4;
use std::path::PathBuf;

/// Server configs
#[derive(Debug)]
pub(crate) struct ServerConfig {
    pub addr: SocketAddrV4,
    /// catalog text file
    pub menu_path: PathBuf,
    /// where finalized orders are written
    pub orders_dir: PathBuf,
    /// refuse to start without a readable catalog
    pub require_menu: bool,
}

impl ServerConfig {
    pub fn new(addr: SocketAddrV4, menu_path: PathBuf, orders_dir: PathBuf, require_menu: bool) -> Self {
        Self {
            addr,
            menu_path,
            orders_dir,
            require_menu,
        }
    }
}
