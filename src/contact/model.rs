use serde::{Deserialize, Serialize};

use super::Id;
use crate::account;

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeviceContact {
    pub id: Id,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone_numbers: Vec<String>,
}

impl DeviceContact {
    /// Only the first number takes part in matching.
    pub fn primary_phone(&self) -> Option<&str> {
        self.phone_numbers.first().map(String::as_str)
    }
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Match {
    pub contact_id: Id,
    pub account_id: account::Id,
}

#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchOutcome {
    pub matched: Vec<Match>,
    pub unmatched: Vec<Id>,
}

impl MatchOutcome {
    /// Matched account ids in contact order. Two contacts sharing a number
    /// yield the same account twice.
    pub fn account_ids(&self) -> Vec<account::Id> {
        self.matched.iter().map(|m| m.account_id.clone()).collect()
    }
}

#[derive(Deserialize)]
pub struct MatchRequest {
    pub contacts: Vec<DeviceContact>,
}
