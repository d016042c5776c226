use std::collections::HashSet;

use futures::future::try_join_all;
use log::debug;

use super::{Id, Repository};
use crate::account;

/// Applies new participants to a group and mirrors the group on every
/// affected account.
///
/// Both sides use set-union updates, so repeating a call is a no-op. The two
/// documents touched per account are written independently: if the account
/// side succeeds and the group side fails, the relation stays half-written
/// and the failure is returned to the caller.
#[derive(Clone)]
pub struct MembershipMutator {
    account_repo: account::Repository,
    repo: Repository,
}

impl MembershipMutator {
    pub fn new(account_repo: account::Repository, repo: Repository) -> Self {
        Self { account_repo, repo }
    }

    pub async fn add(&self, group_id: &Id, account_ids: &[account::Id]) -> super::Result<()> {
        let mut seen = HashSet::new();
        let account_ids: Vec<_> = account_ids
            .iter()
            .filter(|id| seen.insert(*id))
            .cloned()
            .collect();

        if account_ids.is_empty() {
            return Ok(());
        }

        debug!("adding {} accounts to group {group_id}", account_ids.len());

        try_join_all(
            account_ids
                .iter()
                .map(|id| self.account_repo.add_group(id, group_id)),
        )
        .await?;

        self.repo.add_participants(group_id, &account_ids).await
    }
}
