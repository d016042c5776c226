use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Id;
use crate::account::{self, model::DisplayInfo};
use crate::group::model::Guidance;
use crate::integration::storage::Picture;

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct RideDocument {
    #[serde(rename = "_id")]
    pub id: Option<Id>,
    pub owner_account_id: Option<account::Id>,
    pub source_text: Option<String>,
    pub destination_text: Option<String>,
    pub scheduled_at: Option<mongodb::bson::DateTime>,
    pub vacant_places: Option<i64>,
    pub cost: Option<f64>,
    pub comment: Option<String>,
    pub contact_phone_override: Option<String>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Ride {
    id: Id,
    owner_id: account::Id,
    source: String,
    destination: String,
    scheduled_at: DateTime<Utc>,
    vacant_places: u32,
    cost: f64,
    comment: String,
    contact_phone: Option<String>,
}

impl Ride {
    pub fn publish(owner: &account::Id, new: NewRide) -> super::Result<Self> {
        let source = new.source.trim();
        if source.is_empty() {
            return Err(super::Error::MissingSource);
        }
        let destination = new.destination.trim();
        if destination.is_empty() {
            return Err(super::Error::MissingDestination);
        }
        if !new.cost.is_finite() || new.cost < 0.0 {
            return Err(super::Error::InvalidCost(new.cost));
        }

        Ok(Self {
            id: Id::random(),
            owner_id: owner.clone(),
            source: source.to_owned(),
            destination: destination.to_owned(),
            scheduled_at: new.scheduled_at,
            vacant_places: new.vacant_places,
            cost: new.cost,
            comment: new.comment,
            contact_phone: new
                .contact_phone
                .map(|p| p.trim().to_owned())
                .filter(|p| !p.is_empty()),
        })
    }

    pub const fn id(&self) -> &Id {
        &self.id
    }

    pub const fn owner_id(&self) -> &account::Id {
        &self.owner_id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub const fn scheduled_at(&self) -> DateTime<Utc> {
        self.scheduled_at
    }

    #[cfg(test)]
    pub(crate) fn test(id: &str, owner: &str, source: &str, scheduled_at: DateTime<Utc>) -> Self {
        Self {
            id: Id::from(id),
            owner_id: account::Id::from(owner),
            source: source.to_owned(),
            destination: String::from("Tel Aviv"),
            scheduled_at,
            vacant_places: 3,
            cost: 20.0,
            comment: String::new(),
            contact_phone: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_contact_phone(mut self, phone: &str) -> Self {
        self.contact_phone = Some(phone.to_owned());
        self
    }
}

impl TryFrom<RideDocument> for Ride {
    type Error = super::Error;

    fn try_from(doc: RideDocument) -> super::Result<Self> {
        let id = doc
            .id
            .ok_or(super::Error::MalformedDocument(Id::from("<unknown>"), "_id"))?;
        let missing = |field| super::Error::MalformedDocument(id.clone(), field);

        let scheduled_at = doc
            .scheduled_at
            .and_then(|at| DateTime::from_timestamp_millis(at.timestamp_millis()))
            .ok_or_else(|| missing("scheduledAt"))?;
        let vacant_places = doc
            .vacant_places
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| missing("vacantPlaces"))?;
        let cost = doc
            .cost
            .filter(|c| c.is_finite() && *c >= 0.0)
            .ok_or_else(|| missing("cost"))?;

        Ok(Self {
            owner_id: doc.owner_account_id.ok_or_else(|| missing("ownerAccountId"))?,
            source: doc.source_text.ok_or_else(|| missing("sourceText"))?,
            destination: doc
                .destination_text
                .ok_or_else(|| missing("destinationText"))?,
            scheduled_at,
            vacant_places,
            cost,
            comment: doc.comment.unwrap_or_default(),
            contact_phone: doc.contact_phone_override.filter(|p| !p.trim().is_empty()),
            id,
        })
    }
}

impl From<&Ride> for RideDocument {
    fn from(r: &Ride) -> Self {
        Self {
            id: Some(r.id.clone()),
            owner_account_id: Some(r.owner_id.clone()),
            source_text: Some(r.source.clone()),
            destination_text: Some(r.destination.clone()),
            scheduled_at: Some(mongodb::bson::DateTime::from_millis(
                r.scheduled_at.timestamp_millis(),
            )),
            vacant_places: Some(i64::from(r.vacant_places)),
            cost: Some(r.cost),
            comment: Some(r.comment.clone()),
            contact_phone_override: r.contact_phone.clone(),
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct NewRide {
    pub source: String,
    pub destination: String,
    pub scheduled_at: DateTime<Utc>,
    pub vacant_places: u32,
    pub cost: f64,
    #[serde(default)]
    pub comment: String,
    pub contact_phone: Option<String>,
}

/// A ride as shown in the feed, enriched with its owner's data.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub id: Id,
    pub owner_id: account::Id,
    pub owner_name: String,
    pub source: String,
    pub destination: String,
    pub scheduled_at: DateTime<Utc>,
    pub vacant_places: u32,
    pub cost: f64,
    pub comment: String,
    pub contact_phone: Option<String>,
    pub group_picture: Picture,
}

impl FeedItem {
    /// The ride's own contact number wins over the owner's profile phone.
    pub fn new(ride: Ride, owner: &DisplayInfo, group_picture: Picture) -> Self {
        Self {
            contact_phone: ride.contact_phone.or_else(|| owner.phone.clone()),
            id: ride.id,
            owner_id: ride.owner_id,
            owner_name: owner.name.clone(),
            source: ride.source,
            destination: ride.destination,
            scheduled_at: ride.scheduled_at,
            vacant_places: ride.vacant_places,
            cost: ride.cost,
            comment: ride.comment,
            group_picture,
        }
    }
}

#[derive(Serialize, Debug, Default)]
pub struct Feed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guidance: Option<Guidance>,
    pub rides: Vec<FeedItem>,
}

impl Feed {
    pub fn guidance(g: Guidance) -> Self {
        Self {
            guidance: Some(g),
            rides: vec![],
        }
    }
}

#[derive(Deserialize, Default)]
pub struct FeedParams {
    pub q: Option<String>,
}
