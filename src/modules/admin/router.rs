use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_admin, delete_admin, get_admin, get_admin_by_username, get_permissions, get_roles,
    list_admins, login_admin, search_admins, update_admin,
};

pub fn init_admin_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login_admin))
        .route("/all", get(list_admins))
        .route("/permissions", get(get_permissions))
        .route("/roles", get(get_roles))
        .route("/create", post(create_admin))
        .route("/search", get(search_admins))
        .route("/u/{username}", get(get_admin_by_username))
        .route(
            "/{id}",
            get(get_admin).put(update_admin).delete(delete_admin),
        )
}
