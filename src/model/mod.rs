//! Client-side cache of trip points and their reference data
//!
//! The cache is never edited in place. Every successful operation builds a new vector and
//! swaps it in, so a snapshot returned by [`PointsModel::points`] stays valid and unchanged
//! for as long as the caller holds it.

use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{
    domain::{
        Destination, DestinationId, Offer, OffersByType, Point, PointDraft, PointId, PointType,
        UpdateType,
    },
    observable::{Observable, SubscriptionId},
    ports::points_api::{self, PointsApiPort, WirePoint, WirePointDraft},
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The point is not in the local cache
    ///
    /// Checked before the remote call, which is then skipped, and again when installing its
    /// result.
    #[error("point {0} does not exist locally")]
    NotFound(PointId),
    #[error("can not add point: {0}")]
    AddFailed(#[source] points_api::Error),
    #[error("can not update point: {0}")]
    UpdateFailed(#[source] points_api::Error),
    #[error("can not delete point: {0}")]
    DeleteFailed(#[source] points_api::Error),
}

#[derive(Default)]
struct Cache {
    points: Arc<Vec<Point>>,
    destinations: Arc<Vec<Destination>>,
    offers: Arc<Vec<OffersByType>>,
}

pub struct PointsModel<A> {
    api: Arc<A>,
    cache: RwLock<Cache>,
    /// Held from the local lookup until the notification of every init and mutation, so
    /// concurrent calls apply one after the other instead of overwriting each other.
    mutations: Mutex<()>,
    observable: Observable,
}

impl<A> PointsModel<A>
where
    A: PointsApiPort,
{
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            cache: RwLock::default(),
            mutations: Mutex::new(()),
            observable: Observable::new(),
        }
    }

    /// Load points, destinations and offers from the remote service
    ///
    /// Failures are not returned: the cache falls back to empty collections. Observers are
    /// notified with [`UpdateType::Init`] in both cases.
    pub async fn init(&self) {
        let _permit = self.mutations.lock().await;

        let cache = match self.fetch_all().await {
            Ok(cache) => {
                debug!(
                    points = cache.points.len(),
                    destinations = cache.destinations.len(),
                    offers = cache.offers.len(),
                    "trip data loaded"
                );
                cache
            }
            Err(err) => {
                warn!(error = %err, "failed to load trip data, starting empty");
                Cache::default()
            }
        };
        *self.write_cache() = cache;

        self.observable.notify(UpdateType::Init, None);
    }

    async fn fetch_all(&self) -> Result<Cache, points_api::Error> {
        let points = self.api.points().await?;
        let destinations = self.api.destinations().await?;
        let offers = self.api.offers_by_type().await?;

        Ok(Cache {
            points: Arc::new(points.into_iter().map(adapt_to_client).collect()),
            destinations: Arc::new(destinations),
            offers: Arc::new(offers),
        })
    }

    /// Current points, in service order followed by local prepends and removals
    pub fn points(&self) -> Arc<Vec<Point>> {
        self.read_cache(|cache| cache.points.clone())
    }

    /// Replace the cached points without notifying observers
    ///
    /// The caller is responsible for keeping ids unique.
    pub fn set_points(&self, points: Vec<Point>) {
        self.write_cache().points = Arc::new(points);
    }

    pub fn destinations(&self) -> Arc<Vec<Destination>> {
        self.read_cache(|cache| cache.destinations.clone())
    }

    pub fn offers(&self) -> Arc<Vec<OffersByType>> {
        self.read_cache(|cache| cache.offers.clone())
    }

    pub fn destination(&self, id: &DestinationId) -> Option<Destination> {
        self.read_cache(|cache| {
            cache
                .destinations
                .iter()
                .find(|destination| &destination.id == id)
                .cloned()
        })
    }

    /// Offers available for a point type, empty if the service has none for it
    pub fn offers_for_type(&self, point_type: PointType) -> Vec<Offer> {
        self.read_cache(|cache| {
            cache
                .offers
                .iter()
                .find(|group| group.point_type == point_type)
                .map(|group| group.offers.clone())
                .unwrap_or_default()
        })
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(UpdateType, Option<&Point>) + Send + Sync + 'static,
    {
        self.observable.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.observable.unsubscribe(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.observable.subscriber_count()
    }

    /// Persist changes to an existing point and replace it in place
    pub async fn update_point(
        &self,
        update_type: UpdateType,
        update: &Point,
    ) -> Result<Point, Error> {
        let _permit = self.mutations.lock().await;
        self.ensure_cached(&update.id)?;

        let response = self
            .api
            .update_point(adapt_to_server(update))
            .await
            .map_err(|err| {
                warn!(point_id = %update.id, error = %err, "remote update failed");
                Error::UpdateFailed(err)
            })?;
        let updated = adapt_to_client(response);

        // Replace at the slot of the requested id, whatever id the service sends back.
        let swapped = self.swap_points(|points| {
            let index = position(points, &update.id)?;
            let mut next = points.to_vec();
            next[index] = updated.clone();
            Some(next)
        });
        if !swapped {
            warn!(point_id = %update.id, "point left the cache during remote update");
            return Err(Error::NotFound(update.id.clone()));
        }
        debug!(point_id = %updated.id, "point updated");

        self.observable.notify(update_type, Some(&updated));
        Ok(updated)
    }

    /// Create a point remotely and put it first in the list
    pub async fn add_point(
        &self,
        update_type: UpdateType,
        update: PointDraft,
    ) -> Result<Point, Error> {
        let _permit = self.mutations.lock().await;

        let response = self
            .api
            .add_point(adapt_draft_to_server(update))
            .await
            .map_err(|err| {
                warn!(error = %err, "remote add failed");
                Error::AddFailed(err)
            })?;
        let created = adapt_to_client(response);

        self.swap_points(|points| {
            let mut next = Vec::with_capacity(points.len() + 1);
            next.push(created.clone());
            next.extend_from_slice(points);
            Some(next)
        });
        debug!(point_id = %created.id, "point added");

        self.observable.notify(update_type, Some(&created));
        Ok(created)
    }

    /// Delete a point remotely and drop it from the list
    ///
    /// Observers receive the point that was passed in, as the service returns nothing.
    pub async fn delete_point(&self, update_type: UpdateType, update: &Point) -> Result<(), Error> {
        let _permit = self.mutations.lock().await;
        self.ensure_cached(&update.id)?;

        self.api
            .delete_point(update.id.clone())
            .await
            .map_err(|err| {
                warn!(point_id = %update.id, error = %err, "remote delete failed");
                Error::DeleteFailed(err)
            })?;

        let swapped = self.swap_points(|points| {
            let index = position(points, &update.id)?;
            let mut next = points.to_vec();
            next.remove(index);
            Some(next)
        });
        if !swapped {
            warn!(point_id = %update.id, "point left the cache during remote delete");
            return Err(Error::NotFound(update.id.clone()));
        }
        debug!(point_id = %update.id, "point deleted");

        self.observable.notify(update_type, Some(update));
        Ok(())
    }

    fn ensure_cached(&self, id: &PointId) -> Result<(), Error> {
        match position(&self.points(), id) {
            Some(_) => Ok(()),
            None => Err(Error::NotFound(id.clone())),
        }
    }

    /// Build the next point list from the current one and install it
    ///
    /// Returns `false`, leaving the cache as it is, when `next` yields nothing.
    fn swap_points(&self, next: impl FnOnce(&[Point]) -> Option<Vec<Point>>) -> bool {
        let mut cache = self.write_cache();
        match next(cache.points.as_slice()) {
            Some(points) => {
                cache.points = Arc::new(points);
                true
            }
            None => false,
        }
    }

    fn read_cache<T>(&self, f: impl FnOnce(&Cache) -> T) -> T {
        // The lock only guards whole-value swaps, so a poisoned cache is still consistent.
        f(&self.cache.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn write_cache(&self) -> RwLockWriteGuard<'_, Cache> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn position(points: &[Point], id: &PointId) -> Option<usize> {
    points.iter().position(|point| &point.id == id)
}

fn adapt_to_client(point: WirePoint) -> Point {
    Point {
        id: point.id,
        point_type: point.point_type,
        destination: point.destination,
        date_from: point.date_from,
        date_to: point.date_to,
        base_price: point.base_price,
        offers: point.offers.into_iter().collect(),
    }
}

fn adapt_to_server(point: &Point) -> WirePoint {
    WirePoint {
        id: point.id.clone(),
        point_type: point.point_type,
        destination: point.destination.clone(),
        base_price: point.base_price,
        date_from: point.date_from,
        date_to: point.date_to,
        offers: point.offers.iter().cloned().collect(),
    }
}

fn adapt_draft_to_server(point: PointDraft) -> WirePointDraft {
    WirePointDraft {
        point_type: point.point_type,
        destination: point.destination,
        base_price: point.base_price,
        date_from: point.date_from,
        date_to: point.date_to,
        offers: point.offers.into_iter().collect(),
    }
}
