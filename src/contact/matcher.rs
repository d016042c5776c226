use std::collections::HashMap;

use super::model::{DeviceContact, Match, MatchOutcome};
use crate::account::{self, model::Account};
use crate::phone::Phone;

/// Canonical phone to account lookup.
pub struct PhoneIndex(HashMap<Phone, account::Id>);

impl PhoneIndex {
    /// The first account carrying a number owns it. Accounts without a phone
    /// are left out.
    pub fn from_accounts<'a>(accounts: impl IntoIterator<Item = &'a Account>) -> Self {
        let mut index = HashMap::new();
        for account in accounts {
            let Some(phone) = account.phone() else {
                continue;
            };
            let phone = Phone::from(phone);
            if phone.as_str().is_empty() {
                continue;
            }
            index.entry(phone).or_insert_with(|| account.id().clone());
        }
        Self(index)
    }

    pub fn get(&self, phone: &Phone) -> Option<&account::Id> {
        self.0.get(phone)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Partitions contacts by whether their first number belongs to an account.
/// Contacts without any number land in `unmatched`.
pub fn match_contacts(contacts: &[DeviceContact], index: &PhoneIndex) -> MatchOutcome {
    let mut outcome = MatchOutcome::default();

    for contact in contacts {
        let account_id = contact
            .primary_phone()
            .map(Phone::from)
            .and_then(|phone| index.get(&phone));

        match account_id {
            Some(account_id) => outcome.matched.push(Match {
                contact_id: contact.id.clone(),
                account_id: account_id.clone(),
            }),
            None => outcome.unmatched.push(contact.id.clone()),
        }
    }

    outcome
}
