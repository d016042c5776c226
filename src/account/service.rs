use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;
use log::debug;

use super::model::{DisplayInfo, Profile};
use super::{Id, Repository};
use crate::auth::Session;
use crate::integration::storage::{ImageKey, ImageStore};

#[async_trait]
pub trait AccountService {
    async fn profile(&self, session: &Session) -> super::Result<Profile>;

    /// Fetches each distinct id exactly once, concurrently. Ids that do not
    /// resolve are left out of the map.
    async fn find_display_infos(&self, ids: &HashSet<Id>) -> super::Result<HashMap<Id, DisplayInfo>>;
}

#[derive(Clone)]
pub struct AccountServiceImpl {
    repo: Repository,
    images: Arc<dyn ImageStore + Send + Sync>,
}

impl AccountServiceImpl {
    pub fn new(repo: Repository, images: Arc<dyn ImageStore + Send + Sync>) -> Self {
        Self { repo, images }
    }
}

#[async_trait]
impl AccountService for AccountServiceImpl {
    async fn profile(&self, session: &Session) -> super::Result<Profile> {
        let id = session.account_id();
        let account = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| super::Error::NotFound(id.clone()))?;

        let picture = self
            .images
            .resolve(&ImageKey::profile(account.email()))
            .await;

        Ok(Profile {
            id: id.clone(),
            full_name: account.full_name(),
            picture,
        })
    }

    async fn find_display_infos(&self, ids: &HashSet<Id>) -> super::Result<HashMap<Id, DisplayInfo>> {
        let accounts = try_join_all(ids.iter().map(|id| self.repo.find_by_id(id))).await?;

        let infos = ids
            .iter()
            .zip(accounts)
            .filter_map(|(id, account)| match account {
                Some(a) => Some((id.clone(), a.display_info())),
                None => {
                    debug!("skipping unknown account {id}");
                    None
                }
            })
            .collect();

        Ok(infos)
    }
}
