use std::sync::Arc;

use crate::config::Config;
use crate::reader::Library;
use crate::source::Source;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub library: Arc<Library<Source>>,
}

impl AppState {
    pub fn new(config: Config, library: Library<Source>) -> Self {
        Self {
            config: Arc::new(config),
            library: Arc::new(library),
        }
    }
}
