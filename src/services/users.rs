use axum::async_trait;
use diesel::prelude::*;

use crate::models::user::*;
use diesel_async::RunQueryDsl;

use crate::schema;

use super::{Pool, Svc};

#[async_trait]
pub trait UserService<E = anyhow::Error>: Svc {
    async fn get_user(&self, user_id: i32) -> Result<Option<User>, E>;
    async fn get_user_by_username(&self, name: &str) -> Result<Option<User>, E>;
    async fn get_user_by_email(&self, address: &str) -> Result<Option<User>, E>;
    async fn create_user(&self, user: &NewUser) -> Result<User, E>;
    /// Removes the user; their posts go with them (`ON DELETE CASCADE`).
    /// No route exposes this yet, account deletion is driven elsewhere.
    async fn delete_user(&self, user_id: i32) -> Result<bool, E>;
}

#[derive(Clone)]
pub struct UserServiceDb {
    db: Pool,
}

impl Svc for UserServiceDb {}

#[async_trait]
impl UserService<anyhow::Error> for UserServiceDb {
    async fn get_user(&self, user_id: i32) -> anyhow::Result<Option<User>> {
        use schema::users::dsl::*;

        let mut conn = self.db.get().await?;
        let user = users
            .find(user_id)
            .select(User::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        Ok(user)
    }

    async fn get_user_by_username(&self, name: &str) -> anyhow::Result<Option<User>> {
        use schema::users::dsl::*;

        let mut conn = self.db.get().await?;
        let user = users
            .filter(username.eq(name))
            .select(User::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        Ok(user)
    }

    async fn get_user_by_email(&self, address: &str) -> anyhow::Result<Option<User>> {
        use schema::users::dsl::*;

        let mut conn = self.db.get().await?;
        let user = users
            .filter(email.eq(address))
            .select(User::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        Ok(user)
    }

    async fn create_user(&self, u: &NewUser) -> anyhow::Result<User> {
        use schema::users::dsl::*;

        let mut conn = self.db.get().await?;

        let user = diesel::insert_into(users)
            .values(u)
            .get_result::<User>(&mut conn)
            .await?;

        Ok(user)
    }

    async fn delete_user(&self, user_id: i32) -> anyhow::Result<bool> {
        use schema::users::dsl::*;

        let mut conn = self.db.get().await?;
        let deleted = diesel::delete(users.find(user_id))
            .execute(&mut conn)
            .await?;
        Ok(deleted > 0)
    }
}

impl UserServiceDb {
    pub fn new(db: Pool) -> Self {
        Self { db }
    }
}
