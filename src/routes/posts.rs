use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use tower_sessions::Session;
use tracing::info;

use crate::auth;
use crate::error::AppError;
use crate::helpers::{flash, flash_field_errors};
use crate::models::forms::{validate_post, PostForm};
use crate::models::post::NewPost;
use crate::services::posts::PostService;
use crate::services::users::UserService;

use super::{base_context, render, AppState};

/// Home feed: the trending strip plus every post.
pub async fn home<U: UserService, P: PostService>(
    State((users, posts, tera, _)): State<AppState<U, P>>,
    session: Session,
) -> Result<Html<String>, AppError> {
    let identity = auth::current_identity(&users, &session).await?;

    let trending = posts.get_trending_posts().await?;
    let all = posts.get_posts().await?;

    let mut ctx = base_context(&session, &identity).await?;
    ctx.insert("trending", &trending);
    ctx.insert("posts", &all);
    render(&tera, "index.html", &ctx)
}

pub async fn create_post_page<U: UserService, P: PostService>(
    State((users, _, tera, _)): State<AppState<U, P>>,
    session: Session,
) -> Result<Html<String>, AppError> {
    let identity = auth::current_identity(&users, &session).await?;
    auth::require_privileged(identity.as_ref())?;

    let ctx = base_context(&session, &identity).await?;
    render(&tera, "create.html", &ctx)
}

pub async fn create_post<U: UserService, P: PostService>(
    State((users, posts, _, _)): State<AppState<U, P>>,
    session: Session,
    Form(form): Form<PostForm>,
) -> Result<Redirect, AppError> {
    let identity = auth::current_identity(&users, &session).await?;
    let author = auth::require_privileged(identity.as_ref())?;

    let errors = validate_post(&form);
    if !errors.is_empty() {
        flash_field_errors(&session, &errors).await?;
        return Ok(Redirect::to("/create_post"));
    }

    let post = posts
        .create_post(&NewPost::from_form(&form, author.user_id))
        .await?;
    info!(post_id = post.id, author = %author.username, "post created");

    flash(&session, "Post created successfully!").await?;
    Ok(Redirect::to("/"))
}

pub async fn delete_post<U: UserService, P: PostService>(
    State((users, posts, _, _)): State<AppState<U, P>>,
    session: Session,
    Path(post_id): Path<i32>,
) -> Result<Redirect, AppError> {
    let identity = auth::current_identity(&users, &session).await?;
    auth::require_privileged(identity.as_ref())?;

    if posts.delete_post(post_id).await? {
        info!(post_id, "post deleted");
    } else {
        // recovered NotFound: flash and send the caller home
        flash(&session, "That post no longer exists.").await?;
    }
    Ok(Redirect::to("/"))
}

pub async fn read_more<U: UserService, P: PostService>(
    State((users, posts, tera, _)): State<AppState<U, P>>,
    session: Session,
    Path(post_id): Path<i32>,
) -> Result<Response, AppError> {
    let identity = auth::current_identity(&users, &session).await?;

    let Some(post) = posts.get_post(post_id).await? else {
        flash(&session, "That post no longer exists.").await?;
        return Ok(Redirect::to("/").into_response());
    };

    let mut ctx = base_context(&session, &identity).await?;
    ctx.insert("post", &post);
    Ok(render(&tera, "read_more.html", &ctx)?.into_response())
}
