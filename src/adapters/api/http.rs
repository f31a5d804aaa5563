use reqwest::{header::AUTHORIZATION, Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    config::Settings,
    domain::{Destination, OffersByType, PointId},
    ports::points_api::{Error, PointsApiPort, WirePoint, WirePointDraft},
};

/// REST client for the points service
#[derive(Clone, Debug)]
pub struct HttpPointsApi {
    http: Client,
    end_point: Url,
    authorization: String,
}

impl HttpPointsApi {
    /// Fails if `end_point` is not a URL that resource paths can be appended to
    pub fn new(end_point: &str, authorization: impl Into<String>) -> Result<Self, Error> {
        let end_point = Url::parse(end_point).map_err(|err| Error::Adapter(Box::new(err)))?;
        if end_point.cannot_be_a_base() {
            return Err(Error::Adapter(
                format!("end point '{end_point}' cannot hold resource paths").into(),
            ));
        }

        Ok(Self {
            http: Client::new(),
            end_point,
            authorization: authorization.into(),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, Error> {
        Self::new(&settings.end_point, &settings.authorization)
    }

    /// End point followed by `segments`, each percent-encoded as a single path segment
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.end_point.clone();
        // `new` rejected URLs without path segments.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn fetch<T: DeserializeOwned>(&self, resource: &str) -> Result<T, Error> {
        debug!(resource, "fetching from points service");
        let body = self
            .authorized(self.http.get(self.url(&[resource])))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(body)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(AUTHORIZATION, &self.authorization)
    }
}

#[async_trait::async_trait]
impl PointsApiPort for HttpPointsApi {
    async fn points(&self) -> Result<Vec<WirePoint>, Error> {
        self.fetch("points").await
    }

    async fn destinations(&self) -> Result<Vec<Destination>, Error> {
        self.fetch("destinations").await
    }

    async fn offers_by_type(&self) -> Result<Vec<OffersByType>, Error> {
        self.fetch("offers").await
    }

    async fn add_point(&self, point: WirePointDraft) -> Result<WirePoint, Error> {
        let created = self
            .authorized(self.http.post(self.url(&["points"])))
            .json(&point)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(created)
    }

    async fn update_point(&self, point: WirePoint) -> Result<WirePoint, Error> {
        let response = self
            .authorized(self.http.put(self.url(&["points", &point.id.0])))
            .json(&point)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::PointDoesNotExist(point.id));
        }

        Ok(response.error_for_status()?.json().await?)
    }

    async fn delete_point(&self, point_id: PointId) -> Result<(), Error> {
        let response = self
            .authorized(self.http.delete(self.url(&["points", &point_id.0])))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::PointDoesNotExist(point_id));
        }
        response.error_for_status()?;

        Ok(())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Adapter(Box::new(err))
    }
}
