//! In-memory backends for service tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Barrier;
use tokio_util::sync::CancellationToken;

use crate::account::{
    self, model::Account, repository::AccountRepository, service::AccountServiceImpl,
};
use crate::auth;
use crate::contact::service::ContactServiceImpl;
use crate::group::{
    self, model::Group, mutation::MembershipMutator, repository::GroupRepository,
    resolver::MembershipResolver, service::GroupServiceImpl,
};
use crate::integration::storage::{ImageKey, ImageStore, Picture};
use crate::ride::{self, model::Ride, repository::RideRepository, service::RideServiceImpl};
use crate::state::AppState;

fn backend_failure() -> mongodb::error::Error {
    std::io::Error::other("injected backend failure").into()
}

#[derive(Default)]
pub struct InMemoryAccounts {
    accounts: Mutex<Vec<Account>>,
    lookups: Mutex<HashMap<account::Id, usize>>,
    scans: Mutex<usize>,
}

impl InMemoryAccounts {
    pub fn with(accounts: Vec<Account>) -> Self {
        Self {
            accounts: Mutex::new(accounts),
            ..Default::default()
        }
    }

    pub fn get(&self, id: &account::Id) -> Option<Account> {
        self.accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id() == id)
            .cloned()
    }

    pub fn put(&self, account: Account) {
        let mut accounts = self.accounts.lock().unwrap();
        accounts.retain(|a| a.id() != account.id());
        accounts.push(account);
    }

    fn update<T>(&self, id: &account::Id, f: impl FnOnce(&mut Account) -> T) -> Option<T> {
        self.accounts
            .lock()
            .unwrap()
            .iter_mut()
            .find(|a| a.id() == id)
            .map(f)
    }

    pub fn lookups(&self, id: &account::Id) -> usize {
        self.lookups.lock().unwrap().get(id).copied().unwrap_or(0)
    }

    pub fn scans(&self) -> usize {
        *self.scans.lock().unwrap()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccounts {
    async fn find_by_id(&self, id: &account::Id) -> Result<Option<Account>, account::Error> {
        *self.lookups.lock().unwrap().entry(id.clone()).or_default() += 1;
        Ok(self.get(id))
    }

    async fn find_all(&self) -> Result<Vec<Account>, account::Error> {
        *self.scans.lock().unwrap() += 1;
        Ok(self.accounts.lock().unwrap().clone())
    }

    async fn add_group(&self, id: &account::Id, group_id: &group::Id) -> Result<(), account::Error> {
        self.update(id, |a| {
            let groups = a.groups_mut();
            if !groups.contains(group_id) {
                groups.push(group_id.clone());
            }
        })
        .ok_or_else(|| account::Error::NotFound(id.clone()))
    }

    async fn remove_group(&self, id: &account::Id, group_id: &group::Id) -> Result<(), account::Error> {
        self.update(id, |a| a.groups_mut().retain(|g| g != group_id))
            .ok_or_else(|| account::Error::NotFound(id.clone()))
    }
}

#[derive(Default)]
pub struct InMemoryGroups {
    groups: Mutex<HashMap<group::Id, Group>>,
}

impl InMemoryGroups {
    pub fn get(&self, id: &group::Id) -> Option<Group> {
        self.groups.lock().unwrap().get(id).cloned()
    }

    pub fn count(&self) -> usize {
        self.groups.lock().unwrap().len()
    }

    pub fn put(&self, group: Group) {
        self.groups
            .lock()
            .unwrap()
            .insert(group.id().clone(), group);
    }
}

#[async_trait]
impl GroupRepository for InMemoryGroups {
    async fn find_by_id(&self, id: &group::Id) -> Result<Option<Group>, group::Error> {
        Ok(self.get(id))
    }

    async fn insert(&self, group: &Group) -> Result<(), group::Error> {
        self.put(group.clone());
        Ok(())
    }

    async fn add_participants(
        &self,
        id: &group::Id,
        account_ids: &[account::Id],
    ) -> Result<(), group::Error> {
        let mut groups = self.groups.lock().unwrap();
        let group = groups
            .get_mut(id)
            .ok_or_else(|| group::Error::NotFound(id.clone()))?;

        let participants = group.participants_mut();
        for account_id in account_ids {
            if !participants.contains(account_id) {
                participants.push(account_id.clone());
            }
        }
        Ok(())
    }

    async fn remove_participant(
        &self,
        id: &group::Id,
        account_id: &account::Id,
    ) -> Result<Option<usize>, group::Error> {
        let mut groups = self.groups.lock().unwrap();
        Ok(groups.get_mut(id).map(|g| {
            g.admins_mut().retain(|a| a != account_id);
            let participants = g.participants_mut();
            participants.retain(|p| p != account_id);
            participants.len()
        }))
    }

    async fn delete(&self, id: &group::Id) -> Result<bool, group::Error> {
        Ok(self.groups.lock().unwrap().remove(id).is_some())
    }
}

#[derive(Default)]
pub struct InMemoryRides {
    rides: Mutex<Vec<Ride>>,
    queries: Mutex<HashMap<account::Id, usize>>,
    failing: Mutex<HashSet<account::Id>>,
    gate: Mutex<Option<Arc<Barrier>>>,
}

impl InMemoryRides {
    /// Holds every query until `n` queries are waiting at once. A load that
    /// issues fewer than `n` concurrent queries never completes.
    pub fn hold_until(&self, n: usize) {
        *self.gate.lock().unwrap() = Some(Arc::new(Barrier::new(n)));
    }

    pub fn put(&self, ride: Ride) {
        self.rides.lock().unwrap().push(ride);
    }

    /// Every query for rides of `owner` fails from now on.
    pub fn fail_for(&self, owner: &account::Id) {
        self.failing.lock().unwrap().insert(owner.clone());
    }

    pub fn owned_by(&self, owner: &account::Id) -> Vec<Ride> {
        self.rides
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.owner_id() == owner)
            .cloned()
            .collect()
    }

    pub fn queries(&self, owner: &account::Id) -> usize {
        self.queries.lock().unwrap().get(owner).copied().unwrap_or(0)
    }

    pub fn total_queries(&self) -> usize {
        self.queries.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl RideRepository for InMemoryRides {
    async fn find_by_owner(&self, owner: &account::Id) -> Result<Vec<Ride>, ride::Error> {
        *self.queries.lock().unwrap().entry(owner.clone()).or_default() += 1;

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.wait().await;
        }

        if self.failing.lock().unwrap().contains(owner) {
            return Err(backend_failure().into());
        }
        Ok(self.owned_by(owner))
    }

    async fn insert(&self, ride: &Ride) -> Result<(), ride::Error> {
        self.put(ride.clone());
        Ok(())
    }
}

/// Resolves only the paths it was given, as `mem://<path>`.
#[derive(Clone, Default)]
pub struct StaticImages(HashSet<String>);

impl StaticImages {
    pub fn with(mut self, path: &str) -> Self {
        self.0.insert(path.to_owned());
        self
    }
}

#[async_trait]
impl ImageStore for StaticImages {
    async fn resolve(&self, key: &ImageKey) -> Picture {
        let path = key.path();
        if self.0.contains(&path) {
            Picture::Url(format!("mem://{path}"))
        } else {
            Picture::Placeholder
        }
    }
}

/// A whole backend in memory, plus factories for every service on top of it.
#[derive(Default)]
pub struct World {
    pub accounts: Arc<InMemoryAccounts>,
    pub groups: Arc<InMemoryGroups>,
    pub rides: Arc<InMemoryRides>,
    pub images: StaticImages,
}

impl World {
    pub fn account(self, account: Account) -> Self {
        let id = account.id().clone();
        let groups = self.accounts.get(&id).and_then(|a| a.group_ids().map(<[_]>::to_vec));
        let account = match groups {
            Some(groups) if account.group_ids().is_none() => account.with_groups(groups),
            _ => account,
        };
        self.accounts.put(account);
        self
    }

    /// Makes `id` list `groups` on its account, creating the account if needed.
    pub fn member_of(self, id: &str, groups: &[&str]) -> Self {
        let id = account::Id::from(id);
        if self.accounts.get(&id).is_none() {
            let name = id.as_str().to_uppercase();
            self.accounts.put(Account::new(id.clone(), name, "", format!("{id}@x.io")));
        }
        self.accounts.update(&id, |a| {
            let own = a.groups_mut();
            for g in groups {
                let g = group::Id::from(*g);
                if !own.contains(&g) {
                    own.push(g);
                }
            }
        });
        self
    }

    pub fn group(self, group: Group) -> Self {
        self.groups.put(group);
        self
    }

    pub fn ride(self, ride: Ride) -> Self {
        self.rides.put(ride);
        self
    }

    pub fn image(mut self, path: &str) -> Self {
        self.images = self.images.with(path);
        self
    }

    fn images(&self) -> Arc<StaticImages> {
        Arc::new(self.images.clone())
    }

    pub fn account_service(&self) -> AccountServiceImpl {
        AccountServiceImpl::new(self.accounts.clone(), self.images())
    }

    pub fn contact_service(&self) -> ContactServiceImpl {
        ContactServiceImpl::new(self.accounts.clone())
    }

    pub fn resolver(&self) -> MembershipResolver {
        MembershipResolver::new(
            self.accounts.clone(),
            Arc::new(self.account_service()),
            self.groups.clone(),
        )
    }

    pub fn mutator(&self) -> MembershipMutator {
        MembershipMutator::new(self.accounts.clone(), self.groups.clone())
    }

    pub fn group_service(&self) -> GroupServiceImpl {
        GroupServiceImpl::new(
            self.groups.clone(),
            self.accounts.clone(),
            self.resolver(),
            Arc::new(self.contact_service()),
            self.images(),
        )
    }

    pub fn ride_service(&self) -> RideServiceImpl {
        RideServiceImpl::new(self.rides.clone(), self.resolver(), self.images())
    }

    pub fn state(&self) -> AppState {
        AppState::new(
            self.accounts.clone(),
            self.groups.clone(),
            self.rides.clone(),
            self.images(),
            auth::test::validator(),
            CancellationToken::new(),
        )
    }
}
