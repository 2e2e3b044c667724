//! Binding this client to a playlstr account.
//!
//! A client starts out [`LinkState::Unlinked`] and becomes
//! [`LinkState::Linked`] only through [`link_account`]. Uploads need a
//! [`LinkedClient`], which [`require_linked`] hands out for linked
//! settings only.

use log::info;
use thiserror::Error;

use crate::{
    http::{client::ApiClient, error::LinkError},
    settings::{ClientId, LinkState, Settings, SettingsStore},
};

#[derive(Debug, Error)]
#[error("no account is linked to client {client_id}")]
pub struct NotLinked {
    pub client_id: ClientId,
}

/// Proof that the settings of this run carry a server-acknowledged link
#[derive(Debug, Clone, Copy)]
pub struct LinkedClient<'a> {
    settings: &'a Settings,
}

impl LinkedClient<'_> {
    pub fn client_id(&self) -> &ClientId {
        &self.settings.id
    }
}

pub fn require_linked(settings: &Settings) -> Result<LinkedClient<'_>, NotLinked> {
    match settings.link_state() {
        LinkState::Linked => Ok(LinkedClient { settings }),
        LinkState::Unlinked => Err(NotLinked {
            client_id: settings.id.clone(),
        }),
    }
}

/// Links with `code` and stores the link right away.
///
/// On failure neither `settings` nor the settings file are modified.
pub fn link_account(
    client: &ApiClient,
    store: &SettingsStore,
    settings: &mut Settings,
    code: &str,
) -> Result<(), LinkError> {
    client.link(code, &settings.id)?;
    info!("client {} linked", settings.id);

    settings.link = Some(code.to_string());
    store.save(settings)?;
    Ok(())
}
