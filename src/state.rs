use std::sync::Arc;

use crate::grader::Grader;
use crate::store::Store;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub grader: Grader,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, grader: Grader) -> Self {
        AppState { store, grader }
    }
}
