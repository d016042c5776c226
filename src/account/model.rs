use serde::{Deserialize, Serialize};

use super::Id;
use crate::group;
use crate::integration::storage::Picture;

/// Raw shape of an account in the document store.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct AccountDocument {
    #[serde(rename = "_id")]
    pub id: Option<Id>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_ids: Option<Vec<group::Id>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Account {
    id: Id,
    first_name: String,
    last_name: String,
    email: String,
    phone: Option<String>,
    group_ids: Option<Vec<group::Id>>,
}

impl Account {
    pub fn new(
        id: impl Into<Id>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            phone: None,
            group_ids: None,
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_groups(mut self, group_ids: Vec<group::Id>) -> Self {
        self.group_ids = Some(group_ids);
        self
    }

    pub const fn id(&self) -> &Id {
        &self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    /// `None` means the account never had a membership field at all, which is
    /// not the same as an empty one.
    pub fn group_ids(&self) -> Option<&[group::Id]> {
        self.group_ids.as_deref()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_owned()
    }

    pub fn display_info(&self) -> DisplayInfo {
        DisplayInfo {
            id: self.id.clone(),
            name: self.full_name(),
            phone: self.phone.clone(),
            email: self.email.clone(),
        }
    }

    #[cfg(test)]
    pub(crate) fn groups_mut(&mut self) -> &mut Vec<group::Id> {
        self.group_ids.get_or_insert_with(Vec::new)
    }
}

impl TryFrom<AccountDocument> for Account {
    type Error = super::Error;

    fn try_from(doc: AccountDocument) -> super::Result<Self> {
        let id = doc.id.ok_or(super::Error::MalformedDocument(
            Id::from("<unknown>"),
            "_id",
        ))?;
        let missing = |field| super::Error::MalformedDocument(id.clone(), field);

        Ok(Self {
            first_name: doc.first_name.ok_or_else(|| missing("firstName"))?,
            last_name: doc.last_name.ok_or_else(|| missing("lastName"))?,
            email: doc.email.ok_or_else(|| missing("email"))?,
            phone: doc.phone.filter(|p| !p.trim().is_empty()),
            group_ids: doc.group_ids,
            id,
        })
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DisplayInfo {
    pub id: Id,
    pub name: String,
    pub phone: Option<String>,
    pub email: String,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Profile {
    pub id: Id,
    pub full_name: String,
    pub picture: Picture,
}
