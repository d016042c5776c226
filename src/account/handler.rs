pub(super) mod api {
    use axum::{Extension, Json, extract::State};

    use crate::account::{self, model::Profile};
    use crate::auth::Session;

    pub async fn profile(
        Extension(session): Extension<Session>,
        account_service: State<account::Service>,
    ) -> crate::Result<Json<Profile>> {
        let profile = account_service.profile(&session).await?;
        Ok(Json(profile))
    }
}
