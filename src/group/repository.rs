use async_trait::async_trait;
use mongodb::{Database, bson::doc, options::ReturnDocument};

use super::Id;
use super::model::{Group, GroupDocument};
use crate::account;

const GROUPS_COLLECTION: &str = "groups";

#[async_trait]
pub trait GroupRepository {
    async fn find_by_id(&self, id: &Id) -> super::Result<Option<Group>>;

    async fn insert(&self, group: &Group) -> super::Result<()>;

    /// Set-union append to the participant set, atomic on the group document.
    async fn add_participants(&self, id: &Id, account_ids: &[account::Id]) -> super::Result<()>;

    /// Drops the account from participants and admins. Returns how many
    /// participants remain, or `None` if the group does not exist.
    async fn remove_participant(
        &self,
        id: &Id,
        account_id: &account::Id,
    ) -> super::Result<Option<usize>>;

    async fn delete(&self, id: &Id) -> super::Result<bool>;
}

pub struct MongoGroupRepository {
    col: mongodb::Collection<GroupDocument>,
}

impl MongoGroupRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            col: db.collection(GROUPS_COLLECTION),
        }
    }
}

#[async_trait]
impl GroupRepository for MongoGroupRepository {
    async fn find_by_id(&self, id: &Id) -> super::Result<Option<Group>> {
        let doc = self.col.find_one(doc! { "_id": id }).await?;
        doc.map(Group::try_from).transpose()
    }

    async fn insert(&self, group: &Group) -> super::Result<()> {
        self.col.insert_one(GroupDocument::from(group)).await?;
        Ok(())
    }

    async fn add_participants(&self, id: &Id, account_ids: &[account::Id]) -> super::Result<()> {
        let res = self
            .col
            .update_one(
                doc! { "_id": id },
                doc! { "$addToSet": { "participantAccountIds": { "$each": account_ids.to_vec() } } },
            )
            .await?;

        if res.matched_count == 0 {
            return Err(super::Error::NotFound(id.clone()));
        }
        Ok(())
    }

    async fn remove_participant(
        &self,
        id: &Id,
        account_id: &account::Id,
    ) -> super::Result<Option<usize>> {
        let updated = self
            .col
            .find_one_and_update(
                doc! { "_id": id },
                doc! { "$pull": {
                    "participantAccountIds": account_id,
                    "adminIds": account_id,
                } },
            )
            .return_document(ReturnDocument::After)
            .await?;

        Ok(updated.map(|g| g.participant_account_ids.map_or(0, |p| p.len())))
    }

    async fn delete(&self, id: &Id) -> super::Result<bool> {
        let res = self.col.delete_one(doc! { "_id": id }).await?;
        Ok(res.deleted_count > 0)
    }
}

#[cfg(test)]
mod test {
    use testcontainers_modules::{mongo::Mongo, testcontainers::runners::AsyncRunner};

    use super::*;
    use crate::integration::db;

    #[tokio::test]
    #[ignore = "requires a docker daemon"]
    async fn should_insert_and_find() {
        let node = Mongo::default().start().await.unwrap();
        let db = db::Config::test(&node).await.connect().unwrap();
        let repo = MongoGroupRepository::new(&db);

        let g = Group::new(&account::Id::from("u1"), "Commute", "");
        repo.insert(&g).await.unwrap();

        let found = repo.find_by_id(g.id()).await.unwrap().unwrap();
        assert_eq!(found, g);
        assert!(repo.find_by_id(&Id::random()).await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore = "requires a docker daemon"]
    async fn should_add_participants_with_set_semantics() {
        let node = Mongo::default().start().await.unwrap();
        let db = db::Config::test(&node).await.connect().unwrap();
        let repo = MongoGroupRepository::new(&db);

        let g = Group::new(&account::Id::from("u1"), "Commute", "");
        repo.insert(&g).await.unwrap();

        let ids = [account::Id::from("u2"), account::Id::from("u1")];
        tokio::try_join!(
            repo.add_participants(g.id(), &ids),
            repo.add_participants(g.id(), &ids[..1]),
        )
        .unwrap();

        let found = repo.find_by_id(g.id()).await.unwrap().unwrap();
        assert_eq!(found.participant_ids().len(), 2);
    }

    #[tokio::test]
    #[ignore = "requires a docker daemon"]
    async fn should_not_add_participants_to_missing_group() {
        let node = Mongo::default().start().await.unwrap();
        let db = db::Config::test(&node).await.connect().unwrap();
        let repo = MongoGroupRepository::new(&db);

        let res = repo
            .add_participants(&Id::random(), &[account::Id::from("u2")])
            .await;

        assert!(matches!(res, Err(super::super::Error::NotFound(_))));
    }

    #[tokio::test]
    #[ignore = "requires a docker daemon"]
    async fn should_report_remaining_participants() {
        let node = Mongo::default().start().await.unwrap();
        let db = db::Config::test(&node).await.connect().unwrap();
        let repo = MongoGroupRepository::new(&db);

        let g = Group::new(&account::Id::from("u1"), "Commute", "");
        repo.insert(&g).await.unwrap();
        repo.add_participants(g.id(), &[account::Id::from("u2")])
            .await
            .unwrap();

        let left = repo
            .remove_participant(g.id(), &account::Id::from("u1"))
            .await
            .unwrap();
        assert_eq!(left, Some(1));

        let found = repo.find_by_id(g.id()).await.unwrap().unwrap();
        assert!(!found.is_admin(&account::Id::from("u1")));

        let missing = repo
            .remove_participant(&Id::random(), &account::Id::from("u1"))
            .await
            .unwrap();
        assert_eq!(missing, None);
    }
}
