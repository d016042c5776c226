use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::{join_all, try_join_all};
use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use super::Repository;
use super::feed::{self, Batch};
use super::model::{Feed, NewRide, Ride};
use crate::auth::Session;
use crate::group::model::{Guidance, Membership, Participant, Resolution};
use crate::group::resolver::MembershipResolver;
use crate::integration::storage::{ImageKey, ImageStore};

#[async_trait]
pub trait RideService {
    async fn publish(&self, session: &Session, new: NewRide) -> super::Result<Ride>;

    /// Builds the caller's feed as of `now`. Either the complete feed or an
    /// error: any failed ride query fails the whole load. Once `token` is
    /// cancelled the load stops and yields [`super::Error::Aborted`].
    async fn load_feed(
        &self,
        session: &Session,
        now: DateTime<Utc>,
        token: &CancellationToken,
    ) -> super::Result<Feed>;
}

#[derive(Clone)]
pub struct RideServiceImpl {
    repo: Repository,
    resolver: MembershipResolver,
    images: Arc<dyn ImageStore + Send + Sync>,
}

impl RideServiceImpl {
    pub fn new(
        repo: Repository,
        resolver: MembershipResolver,
        images: Arc<dyn ImageStore + Send + Sync>,
    ) -> Self {
        Self {
            repo,
            resolver,
            images,
        }
    }

    async fn aggregate(&self, membership: &Membership, now: DateTime<Utc>) -> super::Result<Feed> {
        let queries: Vec<_> = membership
            .groups
            .iter()
            .enumerate()
            .flat_map(|(group, members)| {
                members.participants.iter().filter_map(move |p| match p {
                    Participant::Member(owner) => Some((group, owner)),
                    Participant::Me => None,
                })
            })
            .collect();
        debug!(
            "loading feed of {} from {} ride queries",
            membership.caller,
            queries.len()
        );

        let keys: Vec<ImageKey> = membership.groups.iter().map(|g| g.group.image_key()).collect();
        let pictures = join_all(keys.iter().map(|key| self.images.resolve(key)));
        let rides = try_join_all(
            queries
                .iter()
                .map(|(_, owner)| self.repo.find_by_owner(&owner.id)),
        );
        let (pictures, rides) = tokio::join!(pictures, rides);
        let rides = rides?;

        let batches = queries
            .into_iter()
            .zip(rides)
            .map(|((group, owner), rides)| Batch {
                group,
                owner,
                rides,
            })
            .collect();

        Ok(Feed {
            guidance: None,
            rides: feed::aggregate(batches, &pictures, now),
        })
    }

    async fn build_feed(&self, session: &Session, now: DateTime<Utc>) -> super::Result<Feed> {
        match self.resolver.resolve(session).await? {
            Resolution::NoGroups => Ok(Feed::guidance(Guidance::NoGroups)),
            Resolution::EmptyGroups => Ok(Feed::guidance(Guidance::EmptyGroups)),
            Resolution::Resolved(membership) => self.aggregate(&membership, now).await,
        }
    }
}

#[async_trait]
impl RideService for RideServiceImpl {
    async fn publish(&self, session: &Session, new: NewRide) -> super::Result<Ride> {
        let ride = Ride::publish(session.account_id(), new)?;
        self.repo.insert(&ride).await?;

        info!("{} published ride {}", session.account_id(), ride.id());
        Ok(ride)
    }

    async fn load_feed(
        &self,
        session: &Session,
        now: DateTime<Utc>,
        token: &CancellationToken,
    ) -> super::Result<Feed> {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                warn!("feed load of {} aborted", session.account_id());
                Err(super::Error::Aborted)
            }
            feed = self.build_feed(session, now) => feed,
        }
    }
}
