pub mod posts;
pub mod users;

use diesel_async::AsyncPgConnection;

pub type Pool = diesel_async::pooled_connection::deadpool::Pool<AsyncPgConnection>;

/// Marker for service handles that are cheap to clone into router state.
pub trait Svc: Clone + Send + Sync + 'static {}
