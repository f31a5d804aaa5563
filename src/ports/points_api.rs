use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Destination, DestinationId, OfferId, OffersByType, PointId, PointType};

/// Remote service owning trip points and their reference data
#[mockall::automock]
#[async_trait::async_trait]
pub trait PointsApiPort {
    async fn points(&self) -> Result<Vec<WirePoint>, Error>;
    async fn destinations(&self) -> Result<Vec<Destination>, Error>;
    async fn offers_by_type(&self) -> Result<Vec<OffersByType>, Error>;
    /// Create a point, returning it with its server-assigned id
    async fn add_point(&self, point: WirePointDraft) -> Result<WirePoint, Error>;
    async fn update_point(&self, point: WirePoint) -> Result<WirePoint, Error>;
    /// Delete a point. There is no response payload.
    async fn delete_point(&self, point_id: PointId) -> Result<(), Error>;
}

/// Point as exchanged with the remote service
///
/// Field names follow the service's snake_case convention. Dates travel as ISO-8601 strings
/// or `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePoint {
    pub id: PointId,
    #[serde(rename = "type")]
    pub point_type: PointType,
    #[serde(default)]
    pub destination: Option<DestinationId>,
    pub base_price: u32,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub offers: Vec<OfferId>,
}

/// Creation payload, identical to [`WirePoint`] minus the id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePointDraft {
    #[serde(rename = "type")]
    pub point_type: PointType,
    pub destination: Option<DestinationId>,
    pub base_price: u32,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub offers: Vec<OfferId>,
}

impl WirePointDraft {
    pub fn with_id(self, id: PointId) -> WirePoint {
        WirePoint {
            id,
            point_type: self.point_type,
            destination: self.destination,
            base_price: self.base_price,
            date_from: self.date_from,
            date_to: self.date_to,
            offers: self.offers,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The remote service does not know this point
    #[error("point {0} does not exist")]
    PointDoesNotExist(PointId),

    /// Concrete adapter errors
    ///
    /// This could represent any errors from a concrete adapter that is not part of the domain
    /// model, such as connectivity, serialization, or permission errors.
    #[error("adapter error: {0:?}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}
