use std::fs;
use std::path::PathBuf;
use log::{info, warn};
use crate::server::model::order::OrderError;
use crate::server::model::receipt::CustomerId;
use crate::server::store::OrderStore;

const ORDER_FILE_EXTENSION: &str = "txt";

/// One plain text file per customer inside a directory.
#[derive(Debug, Clone)]
pub(crate) struct OrderFileStore {
    dir: PathBuf,
}

impl OrderFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, customer: &CustomerId) -> PathBuf {
        self.dir
            .join(customer.file_stem())
            .with_extension(ORDER_FILE_EXTENSION)
    }
}

impl OrderStore for OrderFileStore {
    fn save(&self, customer: &CustomerId, content: &str) -> Result<PathBuf, OrderError> {
        let path = self.path_for(customer);
        match fs::write(&path, content) {
            Ok(_) => {
                info!("order of customer={} saved to {}", customer, path.display());
                Ok(path)
            }
            Err(source) => {
                warn!("failed to save order of customer={}, {}", customer, source);
                Err(OrderError::OrderFileWriteFailed {
                    path: path.display().to_string(),
                    source,
                })
            }
        }
    }
}
