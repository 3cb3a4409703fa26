// ==================== ID REGISTRY ====================
// Read-modify-write sequences over the flat-file store.
// Callers serialize access; nothing here locks.

use crate::{
    database::JsonStore,
    models::UserRecord,
    utils::AppError,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed(UserRecord),
    NotFound,
}

/// Stores (or fully overwrites) the record for `user_id`.
pub fn add_entry(
    store: &JsonStore,
    user_id: &str,
    display_name: &str,
    identifier: &str,
) -> Result<UserRecord, AppError> {
    let mut registry = store.load()?;
    let record = UserRecord::new(display_name, identifier);

    match registry.insert(user_id.to_string(), record.clone()) {
        Some(previous) => log::info!(
            "🔁 Overwriting ID for user {}: {} -> {}",
            user_id, previous.external_id, record.external_id
        ),
        None => log::info!("📝 New ID for user {}: {}", user_id, record.external_id),
    }

    store.save(&registry)?;
    Ok(record)
}

/// All records in stored order.
pub fn list_entries(store: &JsonStore) -> Result<Vec<UserRecord>, AppError> {
    let registry = store.load()?;
    Ok(registry.into_values().collect())
}

/// Deletes the caller's own record. Nothing is written when there is none.
pub fn remove_entry(store: &JsonStore, user_id: &str) -> Result<RemoveOutcome, AppError> {
    let mut registry = store.load()?;

    match registry.shift_remove(user_id) {
        Some(record) => {
            store.save(&registry)?;
            log::info!("🗑️  Removed ID for user {}", user_id);
            Ok(RemoveOutcome::Removed(record))
        }
        None => {
            log::info!("ℹ️  User {} had no ID to remove", user_id);
            Ok(RemoveOutcome::NotFound)
        }
    }
}
