use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{get_me, login_user, logout_user, refresh_token, register_user};

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register_user))
        .route("/login", post(login_user))
        .route("/logout", post(logout_user))
        .route("/refresh", post(refresh_token))
        .route("/me", get(get_me))
}
