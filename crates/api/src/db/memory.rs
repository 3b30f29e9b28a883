//! In-memory store.
//!
//! Backs the router and end-to-end tests, and lets the server run without a
//! database. Behaves like [`super::PgStore`]: unique emails, owner-scoped
//! products, newest-first listing.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use catalog_core::dto::Product;
use catalog_core::{Email, ProductId, UserId};

use super::{CatalogStore, ProductStore, RepositoryError, UserStore};
use crate::models::{NewUser, ProductChanges, ProductFields, User};

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<UserId, (User, String)>,
    emails: HashMap<String, UserId>,
    /// Products with their insertion sequence, used to break `created_at` ties.
    products: HashMap<ProductId, (u64, Product)>,
    next_seq: u64,
}

/// Store that keeps everything in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, new_user: NewUser) -> Result<User, RepositoryError> {
        let mut inner = self.inner.write().await;
        if inner.emails.contains_key(new_user.email.as_str()) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let user = User {
            id: UserId::generate(),
            username: new_user.username().to_owned(),
            email: new_user.email,
            name: new_user.name,
            created_at: Utc::now(),
        };
        inner
            .emails
            .insert(user.email.as_str().to_owned(), user.id);
        inner
            .users
            .insert(user.id, (user.clone(), new_user.password_hash));
        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(&id).map(|(user, _)| user.clone()))
    }

    async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner
            .emails
            .get(email.as_str())
            .and_then(|id| inner.users.get(id))
            .cloned())
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn list_products(
        &self,
        owner: UserId,
        category: Option<&str>,
    ) -> Result<Vec<Product>, RepositoryError> {
        let inner = self.inner.read().await;
        let mut matches: Vec<&(u64, Product)> = inner
            .products
            .values()
            .filter(|(_, p)| p.user_id == owner)
            .filter(|(_, p)| category.is_none_or(|c| p.category.as_str() == c))
            .collect();
        matches.sort_by(|(seq_a, a), (seq_b, b)| {
            b.created_at.cmp(&a.created_at).then(seq_b.cmp(seq_a))
        });
        Ok(matches.into_iter().map(|(_, p)| p.clone()).collect())
    }

    async fn get_product(
        &self,
        owner: UserId,
        id: ProductId,
    ) -> Result<Option<Product>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner
            .products
            .get(&id)
            .filter(|(_, p)| p.user_id == owner)
            .map(|(_, p)| p.clone()))
    }

    async fn insert_product(
        &self,
        owner: UserId,
        fields: &ProductFields,
    ) -> Result<Product, RepositoryError> {
        let mut inner = self.inner.write().await;
        let now = Utc::now();
        let product = Product {
            id: ProductId::generate(),
            user_id: owner,
            title: fields.title.clone(),
            price: fields.price,
            description: fields.description.clone(),
            category: fields.category.clone(),
            image: fields.image.clone(),
            created_at: now,
            updated_at: now,
        };
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.products.insert(product.id, (seq, product.clone()));
        Ok(product)
    }

    async fn replace_product(
        &self,
        owner: UserId,
        id: ProductId,
        fields: &ProductFields,
    ) -> Result<Option<Product>, RepositoryError> {
        let mut inner = self.inner.write().await;
        let Some((_, product)) = inner
            .products
            .get_mut(&id)
            .filter(|entry| entry.1.user_id == owner)
        else {
            return Ok(None);
        };

        product.title.clone_from(&fields.title);
        product.price = fields.price;
        product.description.clone_from(&fields.description);
        product.category = fields.category.clone();
        product.image = fields.image.clone();
        product.updated_at = Utc::now();
        Ok(Some(product.clone()))
    }

    async fn patch_product(
        &self,
        owner: UserId,
        id: ProductId,
        changes: &ProductChanges,
    ) -> Result<Option<Product>, RepositoryError> {
        // Merge under the write lock so no other update lands in between
        let mut inner = self.inner.write().await;
        let Some((_, product)) = inner
            .products
            .get_mut(&id)
            .filter(|entry| entry.1.user_id == owner)
        else {
            return Ok(None);
        };

        changes.apply_to(product).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid stored image: {e}"))
        })?;
        product.updated_at = Utc::now();
        Ok(Some(product.clone()))
    }

    async fn delete_product(&self, owner: UserId, id: ProductId) -> Result<bool, RepositoryError> {
        let mut inner = self.inner.write().await;
        let owned = inner
            .products
            .get(&id)
            .is_some_and(|(_, p)| p.user_id == owner);
        if owned {
            inner.products.remove(&id);
        }
        Ok(owned)
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use catalog_core::{Category, Price, ProductImage};

    use super::*;

    fn fields(title: &str, category: &str) -> ProductFields {
        ProductFields {
            title: title.to_owned(),
            price: Price::parse("1").unwrap(),
            description: String::new(),
            category: Category::new(category),
            image: ProductImage::None,
        }
    }

    fn new_user(email: &str) -> NewUser {
        NewUser::new(Email::parse(email).unwrap(), None, "hash".to_owned())
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store.create_user(new_user("a@b.c")).await.unwrap();
        let err = store.create_user(new_user("A@B.C")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_filtered() {
        let store = MemoryStore::new();
        let owner = UserId::generate();
        let other = UserId::generate();

        store.insert_product(owner, &fields("first", "books")).await.unwrap();
        store.insert_product(owner, &fields("second", "toys")).await.unwrap();
        store.insert_product(owner, &fields("third", "books")).await.unwrap();
        store.insert_product(other, &fields("foreign", "books")).await.unwrap();

        let all = store.list_products(owner, None).await.unwrap();
        let titles: Vec<_> = all.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["third", "second", "first"]);

        let books = store.list_products(owner, Some("books")).await.unwrap();
        let titles: Vec<_> = books.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["third", "first"]);
    }

    #[tokio::test]
    async fn test_foreign_products_are_invisible() {
        let store = MemoryStore::new();
        let owner = UserId::generate();
        let intruder = UserId::generate();
        let product = store.insert_product(owner, &fields("mine", "")).await.unwrap();

        assert!(store.get_product(intruder, product.id).await.unwrap().is_none());
        assert!(
            store
                .replace_product(intruder, product.id, &fields("stolen", ""))
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            store
                .patch_product(intruder, product.id, &ProductChanges::default())
                .await
                .unwrap()
                .is_none()
        );
        assert!(!store.delete_product(intruder, product.id).await.unwrap());
        assert_eq!(
            store.get_product(owner, product.id).await.unwrap().unwrap().title,
            "mine"
        );
    }

    #[tokio::test]
    async fn test_concurrent_patches_of_different_fields_both_land() {
        let store = MemoryStore::new();
        let owner = UserId::generate();
        let product = store.insert_product(owner, &fields("Mug", "kitchen")).await.unwrap();

        let rename = ProductChanges {
            title: Some("Renamed".to_owned()),
            ..ProductChanges::default()
        };
        let reprice = ProductChanges {
            price: Some(Price::parse("12").unwrap()),
            ..ProductChanges::default()
        };
        let (a, b) = tokio::join!(
            store.patch_product(owner, product.id, &rename),
            store.patch_product(owner, product.id, &reprice),
        );
        a.unwrap().unwrap();
        b.unwrap().unwrap();

        let stored = store.get_product(owner, product.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Renamed");
        assert_eq!(stored.price, Price::parse("12").unwrap());
        assert_eq!(stored.category.as_str(), "kitchen");
    }
}
