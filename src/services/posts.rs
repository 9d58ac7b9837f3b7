use axum::async_trait;
use diesel::prelude::*;

use crate::models::post::*;
use diesel_async::RunQueryDsl;

use crate::schema;

use super::{Pool, Svc};

/// The post catalog. Listings carry no ORDER BY; callers get whatever order
/// the store yields.
#[async_trait]
pub trait PostService<E = anyhow::Error>: Svc {
    async fn get_posts(&self) -> Result<Vec<Post>, E>;
    async fn get_trending_posts(&self) -> Result<Vec<Post>, E>;
    async fn get_post(&self, post_id: i32) -> Result<Option<Post>, E>;
    async fn create_post(&self, post: &NewPost) -> Result<Post, E>;
    async fn delete_post(&self, post_id: i32) -> Result<bool, E>;
}

#[derive(Clone)]
pub struct PostServiceDb {
    db: Pool,
}

impl Svc for PostServiceDb {}

#[async_trait]
impl PostService<anyhow::Error> for PostServiceDb {
    async fn get_posts(&self) -> anyhow::Result<Vec<Post>> {
        use schema::posts::dsl::*;

        let mut conn = self.db.get().await?;
        let ps: Vec<Post> = posts.select(Post::as_select()).load(&mut conn).await?;
        Ok(ps)
    }

    async fn get_trending_posts(&self) -> anyhow::Result<Vec<Post>> {
        use schema::posts::dsl::*;

        let mut conn = self.db.get().await?;
        let ps: Vec<Post> = posts
            .filter(is_trending.eq(true))
            .select(Post::as_select())
            .load(&mut conn)
            .await?;
        Ok(ps)
    }

    async fn get_post(&self, post_id: i32) -> anyhow::Result<Option<Post>> {
        use schema::posts::dsl::*;

        let mut conn = self.db.get().await?;
        let post = posts
            .find(post_id)
            .select(Post::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        Ok(post)
    }

    async fn create_post(&self, p: &NewPost) -> anyhow::Result<Post> {
        use schema::posts::dsl::*;

        let mut conn = self.db.get().await?;

        let post = diesel::insert_into(posts)
            .values(p)
            .get_result::<Post>(&mut conn)
            .await?;

        Ok(post)
    }

    async fn delete_post(&self, post_id: i32) -> anyhow::Result<bool> {
        use schema::posts::dsl::*;

        let mut conn = self.db.get().await?;
        let deleted = diesel::delete(posts.find(post_id))
            .execute(&mut conn)
            .await?;
        Ok(deleted > 0)
    }
}

impl PostServiceDb {
    pub fn new(db: Pool) -> Self {
        Self { db }
    }
}
