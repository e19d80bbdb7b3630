//! Contacts page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use crate::client::ApiError;
use crate::error::Result;
use crate::filters;
use crate::middleware::CspNonce;
use crate::models::Contact;
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "contacts.html")]
pub struct ContactsTemplate {
    pub nonce: String,
    /// `None` until contacts are saved in the admin console.
    pub contact: Option<Contact>,
}

#[instrument(skip(state, nonce))]
pub async fn index(State(state): State<AppState>, nonce: CspNonce) -> Result<ContactsTemplate> {
    let contact = match state.api().contacts().await {
        Ok(contact) => Some(contact),
        Err(ApiError::NotFound(_)) => None,
        Err(e) => return Err(e.into()),
    };

    Ok(ContactsTemplate {
        nonce: nonce.0,
        contact,
    })
}
