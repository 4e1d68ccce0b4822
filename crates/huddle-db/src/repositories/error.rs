//! Error handling utilities for repositories

use huddle_core::error::DomainError;
use huddle_core::value_objects::Snowflake;
use sqlx::Error as SqlxError;

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

/// Check for unique violation and return appropriate error or fallback
pub fn map_unique_violation<F>(e: SqlxError, on_unique: F) -> DomainError
where
    F: FnOnce() -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return on_unique();
        }
    }
    DomainError::DatabaseError(e.to_string())
}

/// Check for a foreign key violation (unknown referenced row)
pub fn map_foreign_key_violation<F>(e: SqlxError, on_violation: F) -> DomainError
where
    F: FnOnce() -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_foreign_key_violation() {
            return on_violation();
        }
    }
    DomainError::DatabaseError(e.to_string())
}

/// Create a "conversation not found" error
pub fn conversation_not_found(id: Snowflake) -> DomainError {
    DomainError::ConversationNotFound(id)
}

/// Create a "message not found" error
pub fn message_not_found(id: Snowflake) -> DomainError {
    DomainError::MessageNotFound(id)
}

/// Create a "not a member" error
pub fn not_member(conversation_id: Snowflake) -> DomainError {
    DomainError::NotMember(conversation_id)
}
