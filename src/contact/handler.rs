pub(super) mod api {
    use axum::{Json, extract::State};

    use crate::contact::{
        self,
        model::{MatchOutcome, MatchRequest},
    };

    pub async fn match_contacts(
        contact_service: State<contact::Service>,
        Json(req): Json<MatchRequest>,
    ) -> crate::Result<Json<MatchOutcome>> {
        let outcome = contact_service.match_contacts(&req.contacts).await?;
        Ok(Json(outcome))
    }
}
