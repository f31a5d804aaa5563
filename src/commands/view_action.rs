use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use tower::Service;
use tracing::debug;

use crate::{
    domain::{Point, PointDraft, UpdateType},
    model::Error,
    ports::points_api::PointsApiPort,
};

use super::ViewActions;

pub struct ViewActionRequest {
    /// How much of the view should re-render once the action succeeds
    pub update_type: UpdateType,
    pub action: ViewAction,
}

pub enum ViewAction {
    /// The user saved the "new event" form
    AddPoint(PointDraft),
    /// The user saved changes to an existing point
    UpdatePoint(Point),
    /// The user deleted a point
    DeletePoint(Point),
}

impl ViewAction {
    fn name(&self) -> &'static str {
        match self {
            ViewAction::AddPoint(_) => "add_point",
            ViewAction::UpdatePoint(_) => "update_point",
            ViewAction::DeletePoint(_) => "delete_point",
        }
    }
}

impl<A> Service<ViewActionRequest> for ViewActions<A>
where
    A: PointsApiPort + Send + Sync + 'static,
{
    /// The point the action produced or removed
    type Response = Point;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ViewActionRequest) -> Self::Future {
        let model = self.model.clone();
        Box::pin(async move {
            debug!(action = req.action.name(), update_type = ?req.update_type, "handling view action");
            match req.action {
                ViewAction::AddPoint(draft) => model.add_point(req.update_type, draft).await,
                ViewAction::UpdatePoint(point) => model.update_point(req.update_type, &point).await,
                ViewAction::DeletePoint(point) => {
                    model.delete_point(req.update_type, &point).await?;
                    Ok(point)
                }
            }
        })
    }
}
