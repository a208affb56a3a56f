use axum::response::Html;
use tracing::instrument;

use crate::auth::extract::{AdminUser, CurrentUser, OptionalUser};
use crate::pages::views;
use crate::users::UserRole;

#[instrument(skip(user))]
pub async fn home(OptionalUser(user): OptionalUser) -> Html<String> {
    Html(views::home(user.as_ref()))
}

/// Role-specific dashboard: admins land on the admin view.
#[instrument(skip(user))]
pub async fn dashboard(CurrentUser(user): CurrentUser) -> Html<String> {
    match user.role {
        UserRole::Admin => Html(views::admin_dashboard(&user)),
        UserRole::User => Html(views::user_dashboard(&user)),
    }
}

#[instrument(skip(user))]
pub async fn admin(AdminUser(user): AdminUser) -> Html<String> {
    Html(views::admin_dashboard(&user))
}
