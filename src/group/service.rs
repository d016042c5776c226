use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use log::{debug, info};

use super::model::{
    ContactsAdded, CreatedGroup, Group, GroupDto, GroupList, GroupMembers, Guidance, NewGroup,
    Resolution,
};
use super::mutation::MembershipMutator;
use super::resolver::MembershipResolver;
use super::{Id, Repository};
use crate::account;
use crate::auth::Session;
use crate::contact::{self, model::DeviceContact};
use crate::integration::storage::ImageStore;

#[async_trait]
pub trait GroupService {
    async fn list(&self, session: &Session) -> super::Result<GroupList>;

    async fn create(&self, session: &Session, new: NewGroup) -> super::Result<CreatedGroup>;

    async fn add_contacts(
        &self,
        session: &Session,
        id: &Id,
        contacts: &[DeviceContact],
    ) -> super::Result<ContactsAdded>;

    /// Removes the caller from the group. The group is deleted together with
    /// its last participant.
    async fn leave(&self, session: &Session, id: &Id) -> super::Result<()>;
}

#[derive(Clone)]
pub struct GroupServiceImpl {
    repo: Repository,
    account_repo: account::Repository,
    resolver: MembershipResolver,
    mutator: MembershipMutator,
    contact_service: contact::Service,
    images: Arc<dyn ImageStore + Send + Sync>,
}

impl GroupServiceImpl {
    pub fn new(
        repo: Repository,
        account_repo: account::Repository,
        resolver: MembershipResolver,
        contact_service: contact::Service,
        images: Arc<dyn ImageStore + Send + Sync>,
    ) -> Self {
        Self {
            mutator: MembershipMutator::new(account_repo.clone(), repo.clone()),
            repo,
            account_repo,
            resolver,
            contact_service,
            images,
        }
    }
}

impl GroupServiceImpl {
    async fn find_as_participant(&self, session: &Session, id: &Id) -> super::Result<Group> {
        let group = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| super::Error::NotFound(id.clone()))?;

        if !group.is_participant(session.account_id()) {
            return Err(super::Error::NotMember(id.clone()));
        }
        Ok(group)
    }

    async fn to_dto(&self, session: &Session, members: GroupMembers) -> GroupDto {
        let GroupMembers {
            group,
            participants,
        } = members;
        let picture = self.images.resolve(&group.image_key()).await;

        GroupDto {
            id: group.id().clone(),
            name: group.name().to_owned(),
            description: group.description().to_owned(),
            picture,
            admin: group.is_admin(session.account_id()),
            participants,
        }
    }
}

#[async_trait]
impl GroupService for GroupServiceImpl {
    async fn list(&self, session: &Session) -> super::Result<GroupList> {
        let membership = match self.resolver.resolve(session).await? {
            Resolution::NoGroups => {
                return Ok(GroupList {
                    guidance: Some(Guidance::NoGroups),
                    groups: vec![],
                });
            }
            Resolution::EmptyGroups => {
                return Ok(GroupList {
                    guidance: Some(Guidance::EmptyGroups),
                    groups: vec![],
                });
            }
            Resolution::Resolved(m) => m,
        };

        let groups = join_all(
            membership
                .groups
                .into_iter()
                .map(|members| self.to_dto(session, members)),
        )
        .await;

        Ok(GroupList {
            guidance: None,
            groups,
        })
    }

    async fn create(&self, session: &Session, new: NewGroup) -> super::Result<CreatedGroup> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(super::Error::MissingName);
        }

        let outcome = if new.contacts.is_empty() {
            contact::model::MatchOutcome::default()
        } else {
            self.contact_service.match_contacts(&new.contacts).await?
        };

        let creator = session.account_id();
        let group = Group::new(creator, name, new.description.trim());
        self.repo.insert(&group).await?;
        self.account_repo.add_group(creator, group.id()).await?;

        let mut seen = HashSet::from([creator.clone()]);
        let added: Vec<_> = outcome
            .account_ids()
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .collect();
        self.mutator.add(group.id(), &added).await?;

        info!("{creator} created group {} with {} contacts", group.id(), added.len());
        Ok(CreatedGroup {
            id: group.id().clone(),
            name: group.name().to_owned(),
            added,
            unmatched: outcome.unmatched,
        })
    }

    async fn add_contacts(
        &self,
        session: &Session,
        id: &Id,
        contacts: &[DeviceContact],
    ) -> super::Result<ContactsAdded> {
        let group = self.find_as_participant(session, id).await?;
        let outcome = self.contact_service.match_contacts(contacts).await?;

        let mut seen: HashSet<_> = group.participant_ids().iter().cloned().collect();
        let added: Vec<_> = outcome
            .account_ids()
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .collect();
        debug!(
            "adding {} of {} matched contacts to {id}",
            added.len(),
            outcome.matched.len()
        );
        self.mutator.add(id, &added).await?;

        Ok(ContactsAdded {
            added,
            unmatched: outcome.unmatched,
        })
    }

    async fn leave(&self, session: &Session, id: &Id) -> super::Result<()> {
        self.find_as_participant(session, id).await?;
        let caller = session.account_id();

        let remaining = self
            .repo
            .remove_participant(id, caller)
            .await?
            .ok_or_else(|| super::Error::NotFound(id.clone()))?;
        self.account_repo.remove_group(caller, id).await?;

        if remaining == 0 {
            self.repo.delete(id).await?;
            info!("deleted group {id} after its last participant left");
        }
        Ok(())
    }
}
