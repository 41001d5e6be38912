use async_trait::async_trait;

use crate::errors::Result;

pub mod memory;
mod models;
pub mod postgres;

pub use memory::MemoryRepository;
pub use models::{NewPost, NewUser, Post, User};
pub use postgres::PgRepository;

/// Single point of access to persisted users and posts.
///
/// Both implementations present the same contract: single-entity lookups
/// fail with `Error::NotFound` on zero rows, multi-row queries return an
/// empty Vec, and store constraint violations are translated into the
/// crate-wide error taxonomy.
#[async_trait]
pub trait Repository: Send + Sync {
    /// All users, ordered by full name (id breaks ties).
    async fn get_all(&self) -> Result<Vec<User>>;
    async fn get_by_email(&self, email: &str) -> Result<User>;
    async fn get_one(&self, id: i64) -> Result<User>;
    /// Hashes the password, persists the user, and returns the stored row
    /// with its assigned id.
    async fn insert(&self, user: NewUser) -> Result<User>;
    /// Full overwrite of email, full name and active flag. Leaves the
    /// password hash untouched.
    async fn update(&self, user: &User) -> Result<()>;
    async fn delete_by_id(&self, id: i64) -> Result<()>;
    /// The only operation that rewrites a stored password hash.
    async fn reset_password(&self, plain: &str, user: &User) -> Result<()>;

    /// All posts, ordered by owner id (id breaks ties).
    async fn get_all_posts(&self) -> Result<Vec<Post>>;
    async fn get_one_post(&self, id: i64) -> Result<Post>;
    async fn insert_post(&self, post: NewPost) -> Result<Post>;
    async fn delete_post(&self, id: i64) -> Result<()>;
}
