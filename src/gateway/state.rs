use std::sync::Arc;

use crate::service::MatchService;

#[derive(Clone)]
pub struct HandlerState {
    pub service: Arc<MatchService>,
}

impl HandlerState {
    pub fn new(service: Arc<MatchService>) -> Self {
        Self { service }
    }
}
