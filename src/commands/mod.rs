use std::sync::Arc;

use crate::model::PointsModel;

pub mod view_action;

/// Entry point for views: turns user actions into model calls
pub struct ViewActions<A> {
    model: Arc<PointsModel<A>>,
}

impl<A> ViewActions<A> {
    pub fn new(model: Arc<PointsModel<A>>) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &Arc<PointsModel<A>> {
        &self.model
    }
}

impl<A> Clone for ViewActions<A> {
    fn clone(&self) -> Self {
        Self {
            model: self.model.clone(),
        }
    }
}
