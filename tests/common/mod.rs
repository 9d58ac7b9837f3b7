//! Shared fixtures: in-memory implementations of the service traits the
//! router is generic over, plus a small client that carries the session
//! cookie between requests the way a browser would.

// Each test binary uses a different slice of this module.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::async_trait;
use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt as _;
use tera::Tera;
use tower::ServiceExt as _;

use blogapp::auth::Hasher;
use blogapp::models::post::{NewPost, Post};
use blogapp::models::user::{NewUser, User};
use blogapp::services::posts::PostService;
use blogapp::services::users::UserService;
use blogapp::services::Svc;

/// 64 bytes, the shortest key the cookie signer accepts.
pub const SECRET_KEY: &[u8] =
    b"0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    posts: Vec<Post>,
    next_user_id: i32,
    next_post_id: i32,
}

/// One set of tables behind both service handles, like the real schema.
/// Vecs keep insertion order; nothing in here sorts.
#[derive(Clone, Default)]
pub struct MemStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemStore {
    pub fn users(&self) -> MemUsers {
        MemUsers(self.clone())
    }

    pub fn posts(&self) -> MemPosts {
        MemPosts(self.clone())
    }

    pub fn seed_user(&self, username: &str, email: &str, password_hash: &str) -> User {
        let mut t = self.tables.lock().unwrap();
        t.next_user_id += 1;
        let user = User {
            id: t.next_user_id,
            username: username.to_owned(),
            email: email.to_owned(),
            password_hash: password_hash.to_owned(),
        };
        t.users.push(user.clone());
        user
    }

    pub fn seed_post(
        &self,
        user_id: i32,
        title: &str,
        content: &str,
        is_trending: bool,
    ) -> Post {
        let mut t = self.tables.lock().unwrap();
        t.next_post_id += 1;
        let post = Post {
            id: t.next_post_id,
            title: title.to_owned(),
            subtitle: format!("{title}, continued"),
            content: content.to_owned(),
            user_id,
            is_trending,
        };
        t.posts.push(post.clone());
        post
    }

    pub fn user_count(&self) -> usize {
        self.tables.lock().unwrap().users.len()
    }

    pub fn user_by_username(&self, name: &str) -> Option<User> {
        self.tables
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.username == name)
            .cloned()
    }

    pub fn post_count(&self) -> usize {
        self.tables.lock().unwrap().posts.len()
    }

    pub fn all_posts(&self) -> Vec<Post> {
        self.tables.lock().unwrap().posts.clone()
    }
}

#[derive(Clone)]
pub struct MemUsers(MemStore);

impl Svc for MemUsers {}

#[async_trait]
impl UserService<anyhow::Error> for MemUsers {
    async fn get_user(&self, user_id: i32) -> anyhow::Result<Option<User>> {
        let t = self.0.tables.lock().unwrap();
        Ok(t.users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn get_user_by_username(&self, name: &str) -> anyhow::Result<Option<User>> {
        Ok(self.0.user_by_username(name))
    }

    async fn get_user_by_email(&self, address: &str) -> anyhow::Result<Option<User>> {
        let t = self.0.tables.lock().unwrap();
        Ok(t.users.iter().find(|u| u.email == address).cloned())
    }

    async fn create_user(&self, user: &NewUser) -> anyhow::Result<User> {
        let mut t = self.0.tables.lock().unwrap();
        // the UNIQUE constraints from the migration, acting as the backstop
        if t.users
            .iter()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            anyhow::bail!("duplicate key value violates unique constraint");
        }
        t.next_user_id += 1;
        let user = User {
            id: t.next_user_id,
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
        };
        t.users.push(user.clone());
        Ok(user)
    }

    async fn delete_user(&self, user_id: i32) -> anyhow::Result<bool> {
        let mut t = self.0.tables.lock().unwrap();
        let before = t.users.len();
        t.users.retain(|u| u.id != user_id);
        // owned posts go with the row, like ON DELETE CASCADE
        t.posts.retain(|p| p.user_id != user_id);
        Ok(t.users.len() < before)
    }
}

#[derive(Clone)]
pub struct MemPosts(MemStore);

impl Svc for MemPosts {}

#[async_trait]
impl PostService<anyhow::Error> for MemPosts {
    async fn get_posts(&self) -> anyhow::Result<Vec<Post>> {
        Ok(self.0.all_posts())
    }

    async fn get_trending_posts(&self) -> anyhow::Result<Vec<Post>> {
        let t = self.0.tables.lock().unwrap();
        Ok(t.posts.iter().filter(|p| p.is_trending).cloned().collect())
    }

    async fn get_post(&self, post_id: i32) -> anyhow::Result<Option<Post>> {
        let t = self.0.tables.lock().unwrap();
        Ok(t.posts.iter().find(|p| p.id == post_id).cloned())
    }

    async fn create_post(&self, post: &NewPost) -> anyhow::Result<Post> {
        let mut t = self.0.tables.lock().unwrap();
        t.next_post_id += 1;
        let post = Post {
            id: t.next_post_id,
            title: post.title.clone(),
            subtitle: post.subtitle.clone(),
            content: post.content.clone(),
            user_id: post.user_id,
            is_trending: post.is_trending,
        };
        t.posts.push(post.clone());
        Ok(post)
    }

    async fn delete_post(&self, post_id: i32) -> anyhow::Result<bool> {
        let mut t = self.0.tables.lock().unwrap();
        let before = t.posts.len();
        t.posts.retain(|p| p.id != post_id);
        Ok(t.posts.len() < before)
    }
}

/// Low argon2 costs keep the suite quick; real costs come from config.
pub fn test_hasher() -> Hasher {
    Hasher::new(4096, 2, 1).unwrap()
}

/// The real application (templates, sessions, routes) over the in-memory
/// services.
pub fn test_app(store: &MemStore) -> Router {
    let tera = Arc::new(Tera::new("src/templates/**/*").unwrap());
    blogapp::app(
        (store.users(), store.posts(), tera, test_hasher()),
        "static",
        SECRET_KEY,
    )
    .unwrap()
}

/// Sends requests to the router and carries the session cookie forward,
/// which is all the state a browser keeps for this app.
pub struct Client {
    app: Router,
    cookie: Option<String>,
}

impl Client {
    pub fn new(app: Router) -> Self {
        Self { app, cookie: None }
    }

    pub async fn get(&mut self, uri: &str) -> Response {
        let request = Request::get(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn post_form(&mut self, uri: &str, form: &str) -> Response {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_owned()))
            .unwrap();
        self.send(request).await
    }

    async fn send(&mut self, mut request: Request<Body>) -> Response {
        if let Some(cookie) = &self.cookie {
            request
                .headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }
        let response = self.app.clone().oneshot(request).await.unwrap();
        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap();
            self.cookie = Some(pair.split(';').next().unwrap_or(pair).to_owned());
        }
        response
    }
}

pub async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("response should be a redirect")
        .to_str()
        .unwrap()
}
