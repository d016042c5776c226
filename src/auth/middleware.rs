use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use log::debug;

use super::TokenValidator;

pub async fn authorize(
    validator: State<Arc<TokenValidator>>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> crate::Result<Response> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(super::Error::Unauthorized)?;

    let session = validator.validate(bearer.token())?;
    debug!("authorized {:?}", session.account_id());
    req.extensions_mut().insert(session);

    Ok(next.run(req).await)
}
