// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper for schedule documents.
//!
//! Each user has one document in `schedules/{user_id}` holding the whole
//! activity list plus a version counter.

use super::ScheduleStore;
use crate::db::collections;
use crate::error::AppError;
use crate::models::{Activity, ScheduleDocument, StoredActivities, VersionedSchedule};
use async_trait::async_trait;
use firestore::errors::FirestoreError;
use firestore::FirestoreConsistencySelector;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create an offline client.
    ///
    /// Reports not ready, so schedule operations fail with
    /// "Database not initialized" instead of touching the network.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Read a schedule document through `client`, which may be bound to a
    /// transaction by its consistency selector.
    async fn get_document(
        client: &firestore::FirestoreDb,
        user_id: &str,
    ) -> Result<Option<ScheduleDocument>, AppError> {
        client
            .fluent()
            .select()
            .by_id_in(collections::SCHEDULES)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[async_trait]
impl ScheduleStore for FirestoreDb {
    fn is_ready(&self) -> bool {
        self.client.is_some()
    }

    async fn load_schedule(&self, user_id: &str) -> Result<VersionedSchedule, AppError> {
        Ok(Self::get_document(self.get_client()?, user_id)
            .await?
            .map(VersionedSchedule::from)
            .unwrap_or_default())
    }

    /// Versioned write inside a Firestore transaction.
    ///
    /// The version is re-read inside the transaction, so Firestore aborts the
    /// commit if another writer touches the document first. Both a version
    /// mismatch and an aborted commit report a conflict so the caller can
    /// re-apply its change.
    async fn save_schedule(
        &self,
        user_id: &str,
        activities: &[Activity],
        expected_version: u64,
    ) -> Result<u64, AppError> {
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let tx_client = client.clone_with_consistency_selector(
            FirestoreConsistencySelector::Transaction(transaction.transaction_id().clone()),
        );

        let current = match Self::get_document(&tx_client, user_id).await {
            Ok(doc) => doc,
            Err(e) => {
                let _ = transaction.rollback().await;
                return Err(e);
            }
        };
        let current_version = current.map(|doc| doc.version).unwrap_or(0);

        if current_version != expected_version {
            tracing::debug!(
                user_id,
                expected_version,
                current_version,
                "Schedule version moved, rolling back"
            );
            let _ = transaction.rollback().await;
            return Err(AppError::Conflict);
        }

        let version = expected_version + 1;
        let doc = ScheduleDocument {
            activities: StoredActivities::List(activities.to_vec()),
            version,
            updated_at: chrono::Utc::now().to_rfc3339(),
        };

        client
            .fluent()
            .update()
            .in_col(collections::SCHEDULES)
            .document_id(user_id)
            .object(&doc)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add schedule to transaction: {}", e))
            })?;

        transaction.commit().await.map_err(|e| {
            if is_aborted(&e) {
                tracing::debug!(
                    user_id,
                    expected_version,
                    "Schedule commit aborted by a concurrent write"
                );
                AppError::Conflict
            } else {
                AppError::Database(format!("Transaction commit failed: {}", e))
            }
        })?;

        tracing::debug!(
            user_id,
            version,
            activities = activities.len(),
            "Schedule saved"
        );

        Ok(version)
    }
}

/// Firestore aborts a transaction whose reads were invalidated by another
/// writer before commit.
fn is_aborted(err: &FirestoreError) -> bool {
    matches!(err, FirestoreError::DatabaseError(db_err) if db_err.public.code == "Aborted")
}
