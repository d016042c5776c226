use async_trait::async_trait;
use futures::TryStreamExt;
use log::debug;
use mongodb::{Database, bson::doc};

use super::Id;
use super::model::{Account, AccountDocument};
use crate::group;
use crate::integration::cache;

const ACCOUNTS_COLLECTION: &str = "accounts";

#[async_trait]
pub trait AccountRepository {
    async fn find_by_id(&self, id: &Id) -> super::Result<Option<Account>>;

    async fn find_all(&self) -> super::Result<Vec<Account>>;

    /// Set-union append of `group_id` to the account's group set.
    async fn add_group(&self, id: &Id, group_id: &group::Id) -> super::Result<()>;

    async fn remove_group(&self, id: &Id, group_id: &group::Id) -> super::Result<()>;
}

pub struct MongoAccountRepository {
    col: mongodb::Collection<AccountDocument>,
}

impl MongoAccountRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            col: db.collection(ACCOUNTS_COLLECTION),
        }
    }
}

#[async_trait]
impl AccountRepository for MongoAccountRepository {
    async fn find_by_id(&self, id: &Id) -> super::Result<Option<Account>> {
        let doc = self.col.find_one(doc! { "_id": id }).await?;
        doc.map(Account::try_from).transpose()
    }

    async fn find_all(&self) -> super::Result<Vec<Account>> {
        let docs: Vec<AccountDocument> = self.col.find(doc! {}).await?.try_collect().await?;
        docs.into_iter().map(Account::try_from).collect()
    }

    async fn add_group(&self, id: &Id, group_id: &group::Id) -> super::Result<()> {
        let res = self
            .col
            .update_one(
                doc! { "_id": id },
                doc! { "$addToSet": { "groupIds": group_id } },
            )
            .await?;

        if res.matched_count == 0 {
            return Err(super::Error::NotFound(id.clone()));
        }
        Ok(())
    }

    async fn remove_group(&self, id: &Id, group_id: &group::Id) -> super::Result<()> {
        let res = self
            .col
            .update_one(
                doc! { "_id": id },
                doc! { "$pull": { "groupIds": group_id } },
            )
            .await?;

        if res.matched_count == 0 {
            return Err(super::Error::NotFound(id.clone()));
        }
        Ok(())
    }
}

/// Read-through cache in front of another repository.
///
/// Writes evict the cached entry both before and after reaching the inner
/// repository. A stale entry can still survive one case: a `find_by_id` that
/// read the old document before the write landed and stores it after the
/// second eviction. That entry lives until the cache TTL expires
/// (`ACCOUNT_CACHE_TTL`).
pub struct CachedAccountRepository {
    inner: super::Repository,
    redis: cache::Redis,
}

impl CachedAccountRepository {
    pub fn new(inner: super::Repository, redis: cache::Redis) -> Self {
        Self { inner, redis }
    }
}

#[async_trait]
impl AccountRepository for CachedAccountRepository {
    async fn find_by_id(&self, id: &Id) -> super::Result<Option<Account>> {
        if let Some(account) = self.redis.json_get::<Account>(cache::Key::Account(id)).await {
            return Ok(Some(account));
        }

        debug!("account {id} not cached");
        let account = self.inner.find_by_id(id).await?;
        if let Some(a) = &account {
            self.redis.json_set_ex(cache::Key::Account(id), a).await;
        }
        Ok(account)
    }

    async fn find_all(&self) -> super::Result<Vec<Account>> {
        self.inner.find_all().await
    }

    async fn add_group(&self, id: &Id, group_id: &group::Id) -> super::Result<()> {
        self.redis.del(cache::Key::Account(id)).await;
        let res = self.inner.add_group(id, group_id).await;
        self.redis.del(cache::Key::Account(id)).await;
        res
    }

    async fn remove_group(&self, id: &Id, group_id: &group::Id) -> super::Result<()> {
        self.redis.del(cache::Key::Account(id)).await;
        let res = self.inner.remove_group(id, group_id).await;
        self.redis.del(cache::Key::Account(id)).await;
        res
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use mongodb::bson::doc;
    use testcontainers_modules::redis::Redis as RedisImage;
    use testcontainers_modules::testcontainers::ContainerAsync;
    use testcontainers_modules::{mongo::Mongo, testcontainers::runners::AsyncRunner};

    use super::*;
    use crate::integration::db;

    async fn cached(
        mongo: &ContainerAsync<Mongo>,
        redis: &ContainerAsync<RedisImage>,
    ) -> (Arc<MongoAccountRepository>, CachedAccountRepository) {
        let db = db::Config::test(mongo).await.connect().unwrap();
        let store = Arc::new(MongoAccountRepository::new(&db));
        let redis = cache::Config::test(redis).await.connect().await.unwrap();
        (store.clone(), CachedAccountRepository::new(store, redis))
    }

    async fn seed(repo: &MongoAccountRepository, id: &str, groups: Option<Vec<&str>>) {
        let doc = AccountDocument {
            id: Some(Id::from(id)),
            first_name: Some("Dana".into()),
            last_name: Some("Mizrahi".into()),
            email: Some(format!("{id}@example.com")),
            phone: Some("0501234567".into()),
            group_ids: groups.map(|g| g.into_iter().map(group::Id::from).collect()),
        };
        repo.col.insert_one(doc).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a docker daemon"]
    async fn should_find_by_id() {
        let node = Mongo::default().start().await.unwrap();
        let db = db::Config::test(&node).await.connect().unwrap();
        let repo = MongoAccountRepository::new(&db);
        seed(&repo, "dana", None).await;

        let account = repo.find_by_id(&Id::from("dana")).await.unwrap().unwrap();

        assert_eq!(account.full_name(), "Dana Mizrahi");
        assert!(account.group_ids().is_none());
        assert!(repo.find_by_id(&Id::from("ghost")).await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore = "requires a docker daemon"]
    async fn should_add_group_with_set_semantics() {
        let node = Mongo::default().start().await.unwrap();
        let db = db::Config::test(&node).await.connect().unwrap();
        let repo = MongoAccountRepository::new(&db);
        seed(&repo, "dana", None).await;

        let id = Id::from("dana");
        let g = group::Id::from("g1");
        repo.add_group(&id, &g).await.unwrap();
        repo.add_group(&id, &g).await.unwrap();

        let account = repo.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(account.group_ids(), Some(&[g][..]));
    }

    #[tokio::test]
    #[ignore = "requires a docker daemon"]
    async fn should_remove_group() {
        let node = Mongo::default().start().await.unwrap();
        let db = db::Config::test(&node).await.connect().unwrap();
        let repo = MongoAccountRepository::new(&db);
        seed(&repo, "dana", Some(vec!["g1", "g2"])).await;

        let id = Id::from("dana");
        repo.remove_group(&id, &group::Id::from("g1")).await.unwrap();

        let account = repo.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(account.group_ids(), Some(&[group::Id::from("g2")][..]));
    }

    #[tokio::test]
    #[ignore = "requires a docker daemon"]
    async fn should_not_add_group_to_missing_account() {
        let node = Mongo::default().start().await.unwrap();
        let db = db::Config::test(&node).await.connect().unwrap();
        let repo = MongoAccountRepository::new(&db);

        let res = repo
            .add_group(&Id::from("ghost"), &group::Id::from("g1"))
            .await;

        assert!(matches!(res, Err(super::super::Error::NotFound(_))));
    }

    #[tokio::test]
    #[ignore = "requires a docker daemon"]
    async fn should_fail_closed_on_malformed_document() {
        let node = Mongo::default().start().await.unwrap();
        let db = db::Config::test(&node).await.connect().unwrap();
        let repo = MongoAccountRepository::new(&db);
        db.collection::<mongodb::bson::Document>(ACCOUNTS_COLLECTION)
            .insert_one(doc! { "_id": "broken", "firstName": "X" })
            .await
            .unwrap();

        let res = repo.find_all().await;

        assert!(matches!(
            res,
            Err(super::super::Error::MalformedDocument(_, "lastName"))
        ));
    }

    #[tokio::test]
    #[ignore = "requires a docker daemon"]
    async fn should_serve_cached_account_until_evicted() {
        let mongo = Mongo::default().start().await.unwrap();
        let redis = RedisImage::default().start().await.unwrap();
        let (store, repo) = cached(&mongo, &redis).await;
        seed(&store, "dana", None).await;
        let id = Id::from("dana");

        let first = repo.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(first.full_name(), "Dana Mizrahi");

        store
            .col
            .update_one(doc! { "_id": &id }, doc! { "$set": { "lastName": "Levi" } })
            .await
            .unwrap();
        let cached = repo.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(cached.full_name(), "Dana Mizrahi");

        repo.add_group(&id, &group::Id::from("g1")).await.unwrap();
        let fresh = repo.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(fresh.full_name(), "Dana Levi");
    }

    #[tokio::test]
    #[ignore = "requires a docker daemon"]
    async fn should_evict_cached_account_on_group_change() {
        let mongo = Mongo::default().start().await.unwrap();
        let redis = RedisImage::default().start().await.unwrap();
        let (store, repo) = cached(&mongo, &redis).await;
        seed(&store, "dana", Some(vec!["g1"])).await;
        let id = Id::from("dana");
        let (g1, g2) = (group::Id::from("g1"), group::Id::from("g2"));

        let before = repo.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(before.group_ids(), Some(&[g1.clone()][..]));

        repo.add_group(&id, &g2).await.unwrap();
        let added = repo.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(added.group_ids(), Some(&[g1.clone(), g2.clone()][..]));

        repo.remove_group(&id, &g1).await.unwrap();
        let removed = repo.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(removed.group_ids(), Some(&[g2][..]));
    }

    #[tokio::test]
    #[ignore = "requires a docker daemon"]
    async fn should_report_missing_account_through_cache() {
        let mongo = Mongo::default().start().await.unwrap();
        let redis = RedisImage::default().start().await.unwrap();
        let (_, repo) = cached(&mongo, &redis).await;

        let res = repo
            .remove_group(&Id::from("ghost"), &group::Id::from("g1"))
            .await;

        assert!(matches!(res, Err(super::super::Error::NotFound(_))));
        assert!(repo.find_by_id(&Id::from("ghost")).await.unwrap().is_none());
    }
}
