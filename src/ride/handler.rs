pub(super) mod api {
    use axum::{
        Extension, Json,
        extract::{Query, State},
        http::StatusCode,
    };
    use chrono::Utc;
    use tokio_util::sync::CancellationToken;

    use crate::auth::Session;
    use crate::ride::{
        self, feed,
        model::{Feed, FeedParams, NewRide, Ride},
    };

    pub async fn feed(
        Extension(session): Extension<Session>,
        ride_service: State<ride::Service>,
        shutdown: State<CancellationToken>,
        Query(params): Query<FeedParams>,
    ) -> crate::Result<Json<Feed>> {
        let token = shutdown.child_token();
        let mut f = ride_service.load_feed(&session, Utc::now(), &token).await?;

        if let Some(q) = params.q {
            f.rides = feed::search(f.rides, &q);
        }
        Ok(Json(f))
    }

    pub async fn publish(
        Extension(session): Extension<Session>,
        ride_service: State<ride::Service>,
        Json(new): Json<NewRide>,
    ) -> crate::Result<(StatusCode, Json<Ride>)> {
        let ride = ride_service.publish(&session, new).await?;
        Ok((StatusCode::CREATED, Json(ride)))
    }
}
