pub(super) mod api {
    use axum::{
        Extension, Json,
        extract::{Path, State},
        http::StatusCode,
    };

    use crate::auth::Session;
    use crate::contact::model::MatchRequest;
    use crate::group::{
        self,
        model::{ContactsAdded, CreatedGroup, GroupList, NewGroup},
    };

    pub async fn list(
        Extension(session): Extension<Session>,
        group_service: State<group::Service>,
    ) -> crate::Result<Json<GroupList>> {
        let list = group_service.list(&session).await?;
        Ok(Json(list))
    }

    pub async fn create(
        Extension(session): Extension<Session>,
        group_service: State<group::Service>,
        Json(new): Json<NewGroup>,
    ) -> crate::Result<(StatusCode, Json<CreatedGroup>)> {
        let created = group_service.create(&session, new).await?;
        Ok((StatusCode::CREATED, Json(created)))
    }

    pub async fn add_contacts(
        Extension(session): Extension<Session>,
        group_service: State<group::Service>,
        Path(id): Path<group::Id>,
        Json(req): Json<MatchRequest>,
    ) -> crate::Result<Json<ContactsAdded>> {
        let added = group_service
            .add_contacts(&session, &id, &req.contacts)
            .await?;
        Ok(Json(added))
    }

    pub async fn leave(
        Extension(session): Extension<Session>,
        group_service: State<group::Service>,
        Path(id): Path<group::Id>,
    ) -> crate::Result<StatusCode> {
        group_service.leave(&session, &id).await?;
        Ok(StatusCode::NO_CONTENT)
    }
}
