use std::collections::HashSet;

use futures::future::try_join_all;
use log::debug;

use super::Repository;
use super::model::{GroupMembers, Membership, Participant, Resolution};
use crate::account;
use crate::auth::Session;

/// Resolves the caller's groups and every co-member's display data.
#[derive(Clone)]
pub struct MembershipResolver {
    account_repo: account::Repository,
    account_service: account::Service,
    repo: Repository,
}

impl MembershipResolver {
    pub fn new(
        account_repo: account::Repository,
        account_service: account::Service,
        repo: Repository,
    ) -> Self {
        Self {
            account_repo,
            account_service,
            repo,
        }
    }

    pub async fn resolve(&self, session: &Session) -> super::Result<Resolution> {
        let caller = session.account_id();
        let account = self
            .account_repo
            .find_by_id(caller)
            .await?
            .ok_or_else(|| account::Error::NotFound(caller.clone()))?;

        let Some(group_ids) = account.group_ids() else {
            return Ok(Resolution::NoGroups);
        };

        let mut seen = HashSet::new();
        let group_ids: Vec<_> = group_ids.iter().filter(|id| seen.insert(*id)).collect();

        let groups = try_join_all(group_ids.iter().map(|id| self.repo.find_by_id(id))).await?;
        let groups: Vec<_> = group_ids
            .into_iter()
            .zip(groups)
            .filter_map(|(id, g)| {
                if g.is_none() {
                    debug!("skipping dangling group {id} of {caller}");
                }
                g
            })
            .collect();

        if groups.is_empty() {
            return Ok(Resolution::EmptyGroups);
        }

        let others: HashSet<account::Id> = groups
            .iter()
            .flat_map(|g| g.participant_ids())
            .filter(|id| !session.is(id))
            .cloned()
            .collect();
        debug!(
            "{caller} shares {} groups with {} accounts",
            groups.len(),
            others.len()
        );

        let others = self.account_service.find_display_infos(&others).await?;

        let groups = groups
            .into_iter()
            .map(|group| {
                let participants = std::iter::once(Participant::Me)
                    .chain(
                        group
                            .participant_ids()
                            .iter()
                            .filter_map(|id| others.get(id).cloned())
                            .map(Participant::Member),
                    )
                    .collect();
                GroupMembers {
                    group,
                    participants,
                }
            })
            .collect();

        Ok(Resolution::Resolved(Membership {
            caller: caller.clone(),
            groups,
            others,
        }))
    }
}
