//! Services page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::CspNonce;
use crate::models::{Contact, Service};
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "services.html")]
pub struct ServicesTemplate {
    pub nonce: String,
    pub services: Vec<Service>,
    pub contact: Option<Contact>,
}

#[instrument(skip(state, nonce))]
pub async fn index(State(state): State<AppState>, nonce: CspNonce) -> Result<ServicesTemplate> {
    let (services, contact) = tokio::join!(state.api().services(), state.api().contacts());

    Ok(ServicesTemplate {
        nonce: nonce.0,
        services: services?,
        contact: contact.ok(),
    })
}
