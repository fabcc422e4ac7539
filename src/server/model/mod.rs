pub(crate) mod config;
pub(crate) mod menu;
pub(crate) mod order;
pub(crate) mod receipt;
pub(crate) mod session;
