pub mod auth;
pub mod pages;
pub mod posts;

use std::sync::Arc;

use axum::response::Html;
use axum::routing::get;
use axum::Router;
use tera::Tera;
use tower_sessions::Session;

use crate::auth::{Hasher, SessionIdentity};
use crate::error::AppError;
use crate::helpers::take_flashes;
use crate::services::posts::PostService;
use crate::services::users::UserService;

/// Shared handler state: user store, post store, templates, password hasher.
pub type AppState<U, P> = (U, P, Arc<Tera>, Hasher);

pub fn router<U: UserService, P: PostService>(state: AppState<U, P>) -> Router {
    Router::new()
        .route("/", get(posts::home::<U, P>))
        .route(
            "/login",
            get(auth::login_page::<U, P>).post(auth::login::<U, P>),
        )
        .route(
            "/signup",
            get(auth::signup_page::<U, P>).post(auth::signup::<U, P>),
        )
        .route(
            "/dashboard",
            get(auth::dashboard_page::<U, P>).post(auth::dashboard_signup::<U, P>),
        )
        .route("/logout", get(auth::logout))
        .route(
            "/create_post",
            get(posts::create_post_page::<U, P>).post(posts::create_post::<U, P>),
        )
        .route("/delete_post/:post_id", get(posts::delete_post::<U, P>))
        .route(
            "/read_more/:post_id",
            get(posts::read_more::<U, P>).post(posts::read_more::<U, P>),
        )
        .route("/history", get(pages::history::<U, P>))
        .route("/magazine", get(pages::magazine::<U, P>))
        .with_state(state)
}

/// Context every page starts from: the current identity (for the navbar)
/// and any queued flash messages, which are consumed here.
pub(crate) async fn base_context(
    session: &Session,
    identity: &Option<SessionIdentity>,
) -> Result<tera::Context, AppError> {
    let mut ctx = tera::Context::new();
    ctx.insert("user", identity);
    ctx.insert("flashes", &take_flashes(session).await?);
    Ok(ctx)
}

pub(crate) fn render(
    tera: &Tera,
    template: &str,
    ctx: &tera::Context,
) -> Result<Html<String>, AppError> {
    Ok(Html(tera.render(template, ctx)?))
}
