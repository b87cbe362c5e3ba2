//! Mutex-backed stores used by the API service and the test suites.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use rust_decimal::Decimal;

use super::domain::{
    ApplicationId, ApplicationStatus, Client, ClientId, CreditApplication,
};
use super::repository::{ApplicationRepository, ClientRepository, RepositoryError};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("in-memory store mutex poisoned".to_string()))
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryApplicationRepository {
    records: Arc<Mutex<HashMap<ApplicationId, CreditApplication>>>,
}

impl InMemoryApplicationRepository {
    fn collect<F>(&self, predicate: F) -> Result<Vec<CreditApplication>, RepositoryError>
    where
        F: Fn(&CreditApplication) -> bool,
    {
        let guard = lock(&self.records)?;
        let mut matches: Vec<_> = guard
            .values()
            .filter(|application| predicate(application))
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(matches)
    }
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn insert(&self, application: CreditApplication) -> Result<CreditApplication, RepositoryError> {
        let mut guard = lock(&self.records)?;
        if guard.contains_key(&application.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn update(&self, application: CreditApplication) -> Result<CreditApplication, RepositoryError> {
        let mut guard = lock(&self.records)?;
        let existing = guard
            .get_mut(&application.id)
            .ok_or(RepositoryError::NotFound)?;

        let created_at = existing.created_at;
        let decided_at = existing.decided_at.or(application.decided_at);
        *existing = CreditApplication {
            created_at,
            decided_at,
            ..application
        };
        Ok(existing.clone())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<CreditApplication>, RepositoryError> {
        let guard = lock(&self.records)?;
        Ok(guard.get(id).cloned())
    }

    fn all(&self) -> Result<Vec<CreditApplication>, RepositoryError> {
        self.collect(|_| true)
    }

    fn by_status(
        &self,
        status: ApplicationStatus,
    ) -> Result<Vec<CreditApplication>, RepositoryError> {
        self.collect(|application| application.status == status)
    }

    fn count_by_status(&self, status: ApplicationStatus) -> Result<u64, RepositoryError> {
        let guard = lock(&self.records)?;
        Ok(guard
            .values()
            .filter(|application| application.status == status)
            .count() as u64)
    }

    fn by_client(&self, client_id: &ClientId) -> Result<Vec<CreditApplication>, RepositoryError> {
        self.collect(|application| &application.client_id == client_id)
    }

    fn by_amount_range(
        &self,
        min: Decimal,
        max: Decimal,
    ) -> Result<Vec<CreditApplication>, RepositoryError> {
        self.collect(|application| application.amount >= min && application.amount <= max)
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryClientRepository {
    clients: Arc<Mutex<HashMap<ClientId, Client>>>,
}

impl ClientRepository for InMemoryClientRepository {
    fn insert(&self, client: Client) -> Result<Client, RepositoryError> {
        let mut guard = lock(&self.clients)?;
        let duplicate = guard.contains_key(&client.id)
            || guard
                .values()
                .any(|existing| existing.document_number == client.document_number);
        if duplicate {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(client.id.clone(), client.clone());
        Ok(client)
    }

    fn update(&self, client: Client) -> Result<Client, RepositoryError> {
        let mut guard = lock(&self.clients)?;
        let existing = guard.get_mut(&client.id).ok_or(RepositoryError::NotFound)?;

        let document_number = existing.document_number.clone();
        let created_at = existing.created_at;
        *existing = Client {
            document_number,
            created_at,
            ..client
        };
        Ok(existing.clone())
    }

    fn fetch(&self, id: &ClientId) -> Result<Option<Client>, RepositoryError> {
        let guard = lock(&self.clients)?;
        Ok(guard.get(id).cloned())
    }

    fn find_by_document(&self, document_number: &str) -> Result<Option<Client>, RepositoryError> {
        let guard = lock(&self.clients)?;
        Ok(guard
            .values()
            .find(|client| client.document_number == document_number)
            .cloned())
    }

    fn exists_by_document(&self, document_number: &str) -> Result<bool, RepositoryError> {
        Ok(self.find_by_document(document_number)?.is_some())
    }

    fn search_by_name(&self, fragment: &str) -> Result<Vec<Client>, RepositoryError> {
        let needle = fragment.trim().to_lowercase();
        let guard = lock(&self.clients)?;
        let mut matches: Vec<_> = guard
            .values()
            .filter(|client| {
                client.first_name.to_lowercase().contains(&needle)
                    || client.last_name.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(matches)
    }
}
