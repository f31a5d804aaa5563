use crate::{
    domain::{Destination, OffersByType, PointId},
    ports::points_api::{Error, PointsApiPort, WirePoint, WirePointDraft},
};
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

/// In-process stand-in for the remote points service
///
/// Clones share the same data, so a test can keep a handle and inspect what the model sent.
#[derive(Clone, Debug, Default)]
pub struct MemoryPointsApi {
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    points: Vec<WirePoint>,
    destinations: Vec<Destination>,
    offers: Vec<OffersByType>,
}

impl MemoryPointsApi {
    pub fn new(
        points: Vec<WirePoint>,
        destinations: Vec<Destination>,
        offers: Vec<OffersByType>,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState {
                points,
                destinations,
                offers,
            })),
        }
    }

    /// Points as currently stored by the service
    pub fn stored_points(&self) -> Result<Vec<WirePoint>, Error> {
        Ok(self.state.lock()?.points.clone())
    }
}

#[async_trait::async_trait]
impl PointsApiPort for MemoryPointsApi {
    async fn points(&self) -> Result<Vec<WirePoint>, Error> {
        Ok(self.state.lock()?.points.clone())
    }

    async fn destinations(&self) -> Result<Vec<Destination>, Error> {
        Ok(self.state.lock()?.destinations.clone())
    }

    async fn offers_by_type(&self) -> Result<Vec<OffersByType>, Error> {
        Ok(self.state.lock()?.offers.clone())
    }

    async fn add_point(&self, point: WirePointDraft) -> Result<WirePoint, Error> {
        let point = point.with_id(PointId(Uuid::new_v4().to_string()));
        self.state.lock()?.points.push(point.clone());

        Ok(point)
    }

    async fn update_point(&self, point: WirePoint) -> Result<WirePoint, Error> {
        let mut state = self.state.lock()?;
        let stored = state
            .points
            .iter_mut()
            .find(|stored| stored.id == point.id)
            .ok_or_else(|| Error::PointDoesNotExist(point.id.clone()))?;
        *stored = point.clone();

        Ok(point)
    }

    async fn delete_point(&self, point_id: PointId) -> Result<(), Error> {
        let mut state = self.state.lock()?;
        let index = state
            .points
            .iter()
            .position(|stored| stored.id == point_id)
            .ok_or(Error::PointDoesNotExist(point_id))?;
        state.points.remove(index);

        Ok(())
    }
}

/// Message of a [`PoisonError`] from the service state lock
///
/// The guard inside `PoisonError` cannot cross threads, so only its text goes into
/// [`Error::Adapter`].
#[derive(Debug, thiserror::Error)]
#[error("points service state poisoned: {0}")]
pub struct StatePoisoned(String);

impl<T> From<PoisonError<T>> for Error {
    fn from(err: PoisonError<T>) -> Self {
        Self::Adapter(Box::new(StatePoisoned(err.to_string())))
    }
}
