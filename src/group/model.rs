use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::Id;
use crate::account::{self, model::DisplayInfo};
use crate::contact;
use crate::integration::storage::{ImageKey, Picture};

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct GroupDocument {
    #[serde(rename = "_id")]
    pub id: Option<Id>,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub admin_ids: Option<Vec<account::Id>>,
    pub participant_account_ids: Option<Vec<account::Id>>,
    pub image_key: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Group {
    id: Id,
    name: String,
    description: String,
    admin_ids: Vec<account::Id>,
    participant_ids: Vec<account::Id>,
    image_key: Id,
}

impl Group {
    /// A fresh group whose creator is its only admin and participant.
    pub fn new(creator: &account::Id, name: impl Into<String>, description: impl Into<String>) -> Self {
        let id = Id::random();
        Self {
            image_key: id.clone(),
            id,
            name: name.into(),
            description: description.into(),
            admin_ids: vec![creator.clone()],
            participant_ids: vec![creator.clone()],
        }
    }

    pub const fn id(&self) -> &Id {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn participant_ids(&self) -> &[account::Id] {
        &self.participant_ids
    }

    pub fn is_participant(&self, id: &account::Id) -> bool {
        self.participant_ids.contains(id)
    }

    pub fn is_admin(&self, id: &account::Id) -> bool {
        self.admin_ids.contains(id)
    }

    pub fn image_key(&self) -> ImageKey {
        ImageKey::Group(self.image_key.clone())
    }

    #[cfg(test)]
    pub(crate) fn with_id(mut self, id: &str) -> Self {
        self.id = Id::from(id);
        self.image_key = self.id.clone();
        self
    }

    #[cfg(test)]
    pub(crate) fn with_participants(mut self, ids: &[&str]) -> Self {
        for id in ids {
            let id = account::Id::from(*id);
            if !self.participant_ids.contains(&id) {
                self.participant_ids.push(id);
            }
        }
        self
    }

    #[cfg(test)]
    pub(crate) fn participants_mut(&mut self) -> &mut Vec<account::Id> {
        &mut self.participant_ids
    }

    #[cfg(test)]
    pub(crate) fn admins_mut(&mut self) -> &mut Vec<account::Id> {
        &mut self.admin_ids
    }
}

impl TryFrom<GroupDocument> for Group {
    type Error = super::Error;

    fn try_from(doc: GroupDocument) -> super::Result<Self> {
        let id = doc
            .id
            .ok_or(super::Error::MalformedDocument(Id::from("<unknown>"), "_id"))?;
        let missing = |field| super::Error::MalformedDocument(id.clone(), field);

        Ok(Self {
            name: doc.display_name.ok_or_else(|| missing("displayName"))?,
            description: doc.description.unwrap_or_default(),
            admin_ids: doc.admin_ids.unwrap_or_default(),
            participant_ids: doc
                .participant_account_ids
                .ok_or_else(|| missing("participantAccountIds"))?,
            image_key: doc.image_key.map(Id).unwrap_or_else(|| id.clone()),
            id,
        })
    }
}

impl From<&Group> for GroupDocument {
    fn from(g: &Group) -> Self {
        Self {
            id: Some(g.id.clone()),
            display_name: Some(g.name.clone()),
            description: Some(g.description.clone()),
            admin_ids: Some(g.admin_ids.clone()),
            participant_account_ids: Some(g.participant_ids.clone()),
            image_key: Some(g.image_key.0.clone()),
        }
    }
}

/// Entry of a group's participant list. The caller is always listed first and
/// never fetched.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Participant {
    Me,
    Member(DisplayInfo),
}

#[derive(Clone, Debug)]
pub struct GroupMembers {
    pub group: Group,
    pub participants: Vec<Participant>,
}

/// Groups of the caller together with every co-member's display data,
/// fetched once per distinct account.
#[derive(Clone, Debug)]
pub struct Membership {
    pub caller: account::Id,
    pub groups: Vec<GroupMembers>,
    pub others: HashMap<account::Id, DisplayInfo>,
}

#[derive(Clone, Debug)]
pub enum Resolution {
    /// The account has no membership field at all.
    NoGroups,
    /// The membership field exists but resolves to no group.
    EmptyGroups,
    Resolved(Membership),
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Guidance {
    NoGroups,
    EmptyGroups,
}

#[derive(Deserialize)]
pub struct NewGroup {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub contacts: Vec<contact::model::DeviceContact>,
}

#[derive(Serialize, Clone, Debug)]
pub struct GroupDto {
    pub id: Id,
    pub name: String,
    pub description: String,
    pub picture: Picture,
    pub admin: bool,
    pub participants: Vec<Participant>,
}

#[derive(Serialize, Debug)]
pub struct GroupList {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guidance: Option<Guidance>,
    pub groups: Vec<GroupDto>,
}

#[derive(Serialize, Debug)]
pub struct ContactsAdded {
    pub added: Vec<account::Id>,
    pub unmatched: Vec<contact::Id>,
}

#[derive(Serialize, Debug)]
pub struct CreatedGroup {
    pub id: Id,
    pub name: String,
    pub added: Vec<account::Id>,
    pub unmatched: Vec<contact::Id>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn should_make_creator_sole_admin_and_participant() {
        let creator = account::Id::from("u1");
        let g = Group::new(&creator, "Commute", "");

        assert_eq!(g.participant_ids(), &[creator.clone()][..]);
        assert!(g.is_admin(&creator));
        assert_eq!(g.image_key(), ImageKey::Group(g.id().clone()));
    }

    #[test]
    fn should_default_optional_fields() {
        let doc = GroupDocument {
            id: Some(Id::from("g1")),
            display_name: Some("Haifa riders".into()),
            participant_account_ids: Some(vec![account::Id::from("u1")]),
            ..Default::default()
        };

        let g = Group::try_from(doc).unwrap();

        assert_eq!(g.description(), "");
        assert!(!g.is_admin(&account::Id::from("u1")));
        assert_eq!(g.image_key(), ImageKey::Group(Id::from("g1")));
    }

    #[test]
    fn should_fail_closed_without_participants() {
        let doc = GroupDocument {
            id: Some(Id::from("g1")),
            display_name: Some("Haifa riders".into()),
            ..Default::default()
        };

        let err = Group::try_from(doc).unwrap_err();

        assert!(matches!(
            err,
            super::super::Error::MalformedDocument(_, "participantAccountIds")
        ));
    }

    #[test]
    fn should_round_trip_through_document() {
        let g = Group::new(&account::Id::from("u1"), "Commute", "weekday mornings");

        let back = Group::try_from(GroupDocument::from(&g)).unwrap();

        assert_eq!(back, g);
    }
}
