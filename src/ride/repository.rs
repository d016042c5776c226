use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{Database, bson::doc};

use super::model::{Ride, RideDocument};
use crate::account;

const RIDES_COLLECTION: &str = "rides";

#[async_trait]
pub trait RideRepository {
    async fn find_by_owner(&self, owner: &account::Id) -> super::Result<Vec<Ride>>;

    async fn insert(&self, ride: &Ride) -> super::Result<()>;
}

pub struct MongoRideRepository {
    col: mongodb::Collection<RideDocument>,
}

impl MongoRideRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            col: db.collection(RIDES_COLLECTION),
        }
    }
}

#[async_trait]
impl RideRepository for MongoRideRepository {
    async fn find_by_owner(&self, owner: &account::Id) -> super::Result<Vec<Ride>> {
        let docs: Vec<RideDocument> = self
            .col
            .find(doc! { "ownerAccountId": owner })
            .await?
            .try_collect()
            .await?;

        docs.into_iter().map(Ride::try_from).collect()
    }

    async fn insert(&self, ride: &Ride) -> super::Result<()> {
        self.col.insert_one(RideDocument::from(ride)).await?;
        Ok(())
    }
}
