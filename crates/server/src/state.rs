use std::sync::Arc;

use service::likes::LikesService;

#[derive(Clone)]
pub struct AppState {
    pub likes: Arc<LikesService>,
}

impl AppState {
    pub fn new(likes: Arc<LikesService>) -> Self {
        Self { likes }
    }
}
