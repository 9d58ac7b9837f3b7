//! Static informational pages. They still resolve the identity so the
//! navbar can reflect login state.

use axum::extract::State;
use axum::response::Html;
use tower_sessions::Session;

use crate::auth;
use crate::error::AppError;
use crate::services::posts::PostService;
use crate::services::users::UserService;

use super::{base_context, render, AppState};

pub async fn history<U: UserService, P: PostService>(
    State((users, _, tera, _)): State<AppState<U, P>>,
    session: Session,
) -> Result<Html<String>, AppError> {
    let identity = auth::current_identity(&users, &session).await?;
    let ctx = base_context(&session, &identity).await?;
    render(&tera, "history.html", &ctx)
}

pub async fn magazine<U: UserService, P: PostService>(
    State((users, _, tera, _)): State<AppState<U, P>>,
    session: Session,
) -> Result<Html<String>, AppError> {
    let identity = auth::current_identity(&users, &session).await?;
    let ctx = base_context(&session, &identity).await?;
    render(&tera, "magazine.html", &ctx)
}
