use diesel::prelude::*;
use serde::Serialize;

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewPost {
    pub title: String,
    pub subtitle: String,
    pub content: String,
    pub user_id: i32,
    pub is_trending: bool,
}

impl NewPost {
    /// A post as the create form produces it: owned by `user_id`, not trending.
    pub fn from_form(form: &super::forms::PostForm, user_id: i32) -> Self {
        Self {
            title: form.title.clone(),
            subtitle: form.subtitle.clone(),
            content: form.body.clone(),
            user_id,
            is_trending: false,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = crate::schema::posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Post {
    pub id: i32,
    pub title: String,
    pub subtitle: String,
    /// Rich text as submitted by the editor; stored and rendered as markup.
    pub content: String,
    pub user_id: i32,
    pub is_trending: bool,
}
