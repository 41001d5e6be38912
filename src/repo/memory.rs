use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;

use super::{NewPost, NewUser, Post, Repository, User};
use crate::auth::password;
use crate::errors::{Error, Result};

/// In-memory stand-in for the live store, behind the same [`Repository`]
/// contract. Lets handler tests run without a database. Uniqueness, foreign
/// keys and ordering behave as the Postgres implementation does.
#[derive(Default)]
pub struct MemoryRepository {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    posts: Vec<Post>,
    next_user_id: i64,
    next_post_id: i64,
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn get_all(&self) -> Result<Vec<User>> {
        let inner = self.inner.lock().expect("repository mutex poisoned");
        let mut users = inner.users.clone();
        users.sort_by(|a, b| (&a.full_name, a.id).cmp(&(&b.full_name, b.id)));
        Ok(users)
    }

    async fn get_by_email(&self, email: &str) -> Result<User> {
        let inner = self.inner.lock().expect("repository mutex poisoned");
        inner
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(Error::NotFound)
    }

    async fn get_one(&self, id: i64) -> Result<User> {
        let inner = self.inner.lock().expect("repository mutex poisoned");
        inner
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(Error::NotFound)
    }

    async fn insert(&self, user: NewUser) -> Result<User> {
        // Hash outside the lock; hashing is deliberately slow.
        let hash = password::hash_password(&user.password)?;
        let mut inner = self.inner.lock().expect("repository mutex poisoned");
        if inner.users.iter().any(|u| u.email == user.email) {
            return Err(Error::Duplicate);
        }
        inner.next_user_id += 1;
        let now = OffsetDateTime::now_utc();
        let stored = User {
            id: inner.next_user_id,
            email: user.email,
            full_name: user.full_name,
            password_hash: hash,
            active: user.active,
            created_at: now,
            updated_at: now,
        };
        inner.users.push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, user: &User) -> Result<()> {
        let mut inner = self.inner.lock().expect("repository mutex poisoned");
        let row = inner
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(Error::NotFound)?;
        row.email = user.email.clone();
        row.full_name = user.full_name.clone();
        row.active = user.active;
        row.updated_at = OffsetDateTime::now_utc();
        Ok(())
    }

    async fn delete_by_id(&self, id: i64) -> Result<()> {
        let mut inner = self.inner.lock().expect("repository mutex poisoned");
        let before = inner.users.len();
        inner.users.retain(|u| u.id != id);
        if inner.users.len() == before {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    async fn reset_password(&self, plain: &str, user: &User) -> Result<()> {
        let hash = password::hash_password(plain)?;
        let mut inner = self.inner.lock().expect("repository mutex poisoned");
        let row = inner
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(Error::NotFound)?;
        row.password_hash = hash;
        Ok(())
    }

    async fn get_all_posts(&self) -> Result<Vec<Post>> {
        let inner = self.inner.lock().expect("repository mutex poisoned");
        let mut posts = inner.posts.clone();
        posts.sort_by_key(|p| (p.user_id, p.id));
        Ok(posts)
    }

    async fn get_one_post(&self, id: i64) -> Result<Post> {
        let inner = self.inner.lock().expect("repository mutex poisoned");
        inner
            .posts
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(Error::NotFound)
    }

    async fn insert_post(&self, post: NewPost) -> Result<Post> {
        let mut inner = self.inner.lock().expect("repository mutex poisoned");
        if !inner.users.iter().any(|u| u.id == post.user_id) {
            return Err(Error::ForeignKey);
        }
        inner.next_post_id += 1;
        let now = OffsetDateTime::now_utc();
        let stored = Post {
            id: inner.next_post_id,
            title: post.title,
            content: post.content,
            user_id: post.user_id,
            created_at: now,
            updated_at: now,
        };
        inner.posts.push(stored.clone());
        Ok(stored)
    }

    async fn delete_post(&self, id: i64) -> Result<()> {
        let mut inner = self.inner.lock().expect("repository mutex poisoned");
        let before = inner.posts.len();
        inner.posts.retain(|p| p.id != id);
        if inner.posts.len() == before {
            return Err(Error::NotFound);
        }
        Ok(())
    }
}
