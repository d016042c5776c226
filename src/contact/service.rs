use async_trait::async_trait;
use log::debug;

use super::matcher::{PhoneIndex, match_contacts};
use super::model::{DeviceContact, MatchOutcome};
use crate::account;

#[async_trait]
pub trait ContactService {
    /// Matches caller-selected contacts against every registered account.
    /// Rejects the whole batch before touching the account store if any
    /// contact comes without a phone number. A blank first number counts as
    /// no number.
    async fn match_contacts(&self, contacts: &[DeviceContact]) -> super::Result<MatchOutcome>;
}

#[derive(Clone)]
pub struct ContactServiceImpl {
    account_repo: account::Repository,
}

impl ContactServiceImpl {
    pub fn new(account_repo: account::Repository) -> Self {
        Self { account_repo }
    }
}

#[async_trait]
impl ContactService for ContactServiceImpl {
    async fn match_contacts(&self, contacts: &[DeviceContact]) -> super::Result<MatchOutcome> {
        if let Some(c) = contacts
            .iter()
            .find(|c| c.primary_phone().is_none_or(|p| p.trim().is_empty()))
        {
            return Err(super::Error::MissingPhone(c.id.clone()));
        }

        if contacts.is_empty() {
            return Ok(MatchOutcome::default());
        }

        let accounts = self.account_repo.find_all().await?;
        let index = PhoneIndex::from_accounts(&accounts);
        let outcome = match_contacts(contacts, &index);

        debug!(
            "matched {} of {} contacts against {} phones",
            outcome.matched.len(),
            contacts.len(),
            index.len()
        );
        Ok(outcome)
    }
}
