use std::sync::Arc;

use axum::extract::FromRef;
use tokio_util::sync::CancellationToken;

use crate::account::repository::{CachedAccountRepository, MongoAccountRepository};
use crate::account::service::AccountServiceImpl;
use crate::auth::TokenValidator;
use crate::contact::service::ContactServiceImpl;
use crate::group::repository::MongoGroupRepository;
use crate::group::resolver::MembershipResolver;
use crate::group::service::GroupServiceImpl;
use crate::integration::{self, storage::ImageStore};
use crate::ride::repository::MongoRideRepository;
use crate::ride::service::RideServiceImpl;
use crate::{account, contact, group, ride};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub account_service: account::Service,
    pub group_service: group::Service,
    pub ride_service: ride::Service,
    pub contact_service: contact::Service,

    pub validator: Arc<TokenValidator>,
    /// Cancelled on server shutdown. Long-running loads hang a child token
    /// off it.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub async fn init(cfg: &integration::Config, shutdown: CancellationToken) -> crate::Result<Self> {
        let db = cfg.mongo.connect()?;
        let redis = cfg.redis.connect().await?;
        let images = Arc::new(cfg.storage.connect()?);

        let account_repo = Arc::new(CachedAccountRepository::new(
            Arc::new(MongoAccountRepository::new(&db)),
            redis,
        ));

        Ok(Self::new(
            account_repo,
            Arc::new(MongoGroupRepository::new(&db)),
            Arc::new(MongoRideRepository::new(&db)),
            images,
            TokenValidator::new(&cfg.idp),
            shutdown,
        ))
    }

    pub fn new(
        account_repo: account::Repository,
        group_repo: group::Repository,
        ride_repo: ride::Repository,
        images: Arc<dyn ImageStore + Send + Sync>,
        validator: TokenValidator,
        shutdown: CancellationToken,
    ) -> Self {
        let account_service: account::Service =
            Arc::new(AccountServiceImpl::new(account_repo.clone(), images.clone()));
        let contact_service: contact::Service =
            Arc::new(ContactServiceImpl::new(account_repo.clone()));
        let resolver =
            MembershipResolver::new(account_repo.clone(), account_service.clone(), group_repo.clone());

        Self {
            group_service: Arc::new(GroupServiceImpl::new(
                group_repo,
                account_repo,
                resolver.clone(),
                contact_service.clone(),
                images.clone(),
            )),
            ride_service: Arc::new(RideServiceImpl::new(ride_repo, resolver, images)),
            account_service,
            contact_service,
            validator: Arc::new(validator),
            shutdown,
        }
    }
}
