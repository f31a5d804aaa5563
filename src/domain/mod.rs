use std::{collections::BTreeSet, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

id_newtype!(PointId);
id_newtype!(DestinationId);
id_newtype!(OfferId);

/// Category of a travel event
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PointType {
    Taxi,
    Bus,
    Train,
    Ship,
    Drive,
    Flight,
    CheckIn,
    Sightseeing,
    Restaurant,
}

impl PointType {
    pub const ALL: [PointType; 9] = [
        PointType::Taxi,
        PointType::Bus,
        PointType::Train,
        PointType::Ship,
        PointType::Drive,
        PointType::Flight,
        PointType::CheckIn,
        PointType::Sightseeing,
        PointType::Restaurant,
    ];
}

impl fmt::Display for PointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PointType::Taxi => "taxi",
            PointType::Bus => "bus",
            PointType::Train => "train",
            PointType::Ship => "ship",
            PointType::Drive => "drive",
            PointType::Flight => "flight",
            PointType::CheckIn => "check-in",
            PointType::Sightseeing => "sightseeing",
            PointType::Restaurant => "restaurant",
        };
        f.write_str(name)
    }
}

/// How much of the trip list a change invalidates
///
/// The model only ever emits `Init` by itself. The other kinds are chosen by whoever calls a
/// mutator and are passed through untouched to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateType {
    /// A single point changed
    Patch,
    /// The list changed
    Minor,
    /// The whole board changed
    Major,
    /// Initial data finished loading, successfully or not
    Init,
}

/// A travel event, in client format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Point {
    /// Assigned by the remote service
    pub id: PointId,
    #[serde(rename = "type")]
    pub point_type: PointType,
    pub destination: Option<DestinationId>,
    /// `None` means the date is unset
    pub date_from: Option<DateTime<Utc>>,
    /// Not guaranteed to be after `date_from`
    pub date_to: Option<DateTime<Utc>>,
    pub base_price: u32,
    /// Selected offers, which should belong to the offers of `point_type`
    pub offers: BTreeSet<OfferId>,
}

impl Point {
    /// Resolve the selected offer ids against the offers available for this point's type
    ///
    /// Ids that are not valid for the type are skipped.
    pub fn selected_offers<'a>(&self, offers: &'a [OffersByType]) -> Vec<&'a Offer> {
        offers
            .iter()
            .filter(|group| group.point_type == self.point_type)
            .flat_map(|group| group.offers.iter())
            .filter(|offer| self.offers.contains(&offer.id))
            .collect()
    }
}

/// A point that has not been created on the remote service yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointDraft {
    #[serde(rename = "type")]
    pub point_type: PointType,
    pub destination: Option<DestinationId>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub base_price: u32,
    pub offers: BTreeSet<OfferId>,
}

impl PointDraft {
    /// Starting state of the "new event" form
    pub fn blank() -> Self {
        let now = Utc::now();
        Self {
            point_type: PointType::ALL[0],
            destination: None,
            date_from: Some(now),
            date_to: Some(now),
            base_price: 0,
            offers: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Picture {
    pub src: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub id: DestinationId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub pictures: Option<Vec<Picture>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub id: OfferId,
    pub title: String,
    pub price: u32,
}

/// Offers available for one point type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffersByType {
    #[serde(rename = "type")]
    pub point_type: PointType,
    pub offers: Vec<Offer>,
}
