//! Borrower registration and lookup.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::applications::domain::{mask_document, Client, ClientId};
use crate::applications::repository::{ClientRepository, RepositoryError};
use crate::clock::Clock;

/// Registration payload for a new borrower.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClient {
    pub document_number: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Editable client fields. The document number cannot be changed once set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactUpdate {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Outward representation of a client with the document number masked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientView {
    pub id: ClientId,
    pub document_number: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Client> for ClientView {
    fn from(client: &Client) -> Self {
        Self {
            id: client.id.clone(),
            document_number: client.masked_document(),
            first_name: client.first_name.clone(),
            last_name: client.last_name.clone(),
            phone_number: client.phone_number.clone(),
            email: client.email.clone(),
            created_at: client.created_at,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("a client with document {0} already exists")]
    DuplicateDocument(String),
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub struct ClientDirectory<C> {
    clients: Arc<C>,
    clock: Arc<dyn Clock>,
    sequence: AtomicU64,
}

impl<C> ClientDirectory<C>
where
    C: ClientRepository + 'static,
{
    pub fn new(clients: Arc<C>, clock: Arc<dyn Clock>) -> Self {
        Self {
            clients,
            clock,
            sequence: AtomicU64::new(1),
        }
    }

    pub fn register(&self, new_client: NewClient) -> Result<Client, ClientError> {
        let document_number = required(&new_client.document_number, "document number")?;
        let first_name = required(&new_client.first_name, "first name")?;
        let last_name = required(&new_client.last_name, "last name")?;

        if self.clients.exists_by_document(&document_number)? {
            return Err(ClientError::DuplicateDocument(mask_document(
                &document_number,
            )));
        }

        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        let client = Client {
            id: ClientId(format!("client-{id:06}")),
            document_number,
            first_name,
            last_name,
            phone_number: optional(new_client.phone_number),
            email: optional(new_client.email),
            created_at: self.clock.now(),
        };

        let stored = self.clients.insert(client).map_err(|err| match err {
            RepositoryError::Conflict => {
                ClientError::DuplicateDocument(mask_document(&new_client.document_number))
            }
            other => ClientError::Repository(other),
        })?;

        info!(
            client_id = %stored.id,
            document = %stored.masked_document(),
            "client registered"
        );
        Ok(stored)
    }

    pub fn get(&self, id: &ClientId) -> Result<Client, ClientError> {
        Ok(self.clients.fetch(id)?.ok_or(RepositoryError::NotFound)?)
    }

    pub fn find_by_document(&self, document_number: &str) -> Result<Client, ClientError> {
        Ok(self
            .clients
            .find_by_document(document_number.trim())?
            .ok_or(RepositoryError::NotFound)?)
    }

    pub fn search(&self, name_fragment: &str) -> Result<Vec<Client>, ClientError> {
        Ok(self.clients.search_by_name(name_fragment)?)
    }

    pub fn update_contact(
        &self,
        id: &ClientId,
        update: ContactUpdate,
    ) -> Result<Client, ClientError> {
        let mut client = self.get(id)?;

        if let Some(first_name) = update.first_name {
            client.first_name = required(&first_name, "first name")?;
        }
        if let Some(last_name) = update.last_name {
            client.last_name = required(&last_name, "last name")?;
        }
        if update.phone_number.is_some() {
            client.phone_number = optional(update.phone_number);
        }
        if update.email.is_some() {
            client.email = optional(update.email);
        }

        Ok(self.clients.update(client)?)
    }
}

fn required(value: &str, field: &'static str) -> Result<String, ClientError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ClientError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
