use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

use crate::error::{AppError, ConstraintParser};

/// Utility for converting database errors to structured AppError variants.
///
/// Constraint violations the caller can act on become `Duplicate` or
/// `Validation`; everything else becomes `Database` and keeps the driver
/// message as its source for logging.
pub struct DatabaseErrorConverter;

impl DatabaseErrorConverter {
    /// Converts a Diesel error to an appropriate AppError variant.
    ///
    /// `operation` names the failed statement in logs and 500 responses.
    pub fn convert_diesel_error(error: DieselError, operation: &str) -> AppError {
        match error {
            DieselError::DatabaseError(kind, info) => {
                Self::convert_database_error(kind, info.as_ref(), operation)
            }
            DieselError::NotFound => AppError::NotFound {
                entity: "resource".to_string(),
                field: "id".to_string(),
                value: "unknown".to_string(),
            },
            other => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::from(other),
            },
        }
    }

    fn convert_database_error(
        kind: DatabaseErrorKind,
        info: &(dyn DatabaseErrorInformation + Send + Sync),
        operation: &str,
    ) -> AppError {
        let message = info.message();
        let constraint_name = info.constraint_name();
        // The offending key lives in DETAIL, not in the primary message.
        let text = match info.details() {
            Some(details) => format!("{}\n{}", message, details),
            None => message.to_string(),
        };

        let parsed = match kind {
            DatabaseErrorKind::UniqueViolation => {
                ConstraintParser::parse_unique_violation(&text, constraint_name).map(
                    |(entity, field, value)| AppError::Duplicate {
                        entity,
                        field,
                        value,
                    },
                )
            }
            DatabaseErrorKind::NotNullViolation => {
                ConstraintParser::parse_not_null_violation(&text, constraint_name).map(
                    |(entity, field)| AppError::Validation {
                        field,
                        reason: format!("Field is required for {}", entity),
                    },
                )
            }
            DatabaseErrorKind::CheckViolation => {
                ConstraintParser::parse_check_violation(&text, constraint_name).map(
                    |(entity, field)| AppError::Validation {
                        field,
                        reason: format!("Check constraint failed for {} field", entity),
                    },
                )
            }
            _ => None,
        };

        parsed.unwrap_or_else(|| AppError::Database {
            operation: operation.to_string(),
            source: anyhow::anyhow!("{:?}: {}", kind, text),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockDatabaseErrorInfo {
        message: String,
        details: Option<String>,
        constraint_name: Option<String>,
    }

    impl DatabaseErrorInformation for MockDatabaseErrorInfo {
        fn message(&self) -> &str {
            &self.message
        }

        fn details(&self) -> Option<&str> {
            self.details.as_deref()
        }

        fn hint(&self) -> Option<&str> {
            None
        }

        fn table_name(&self) -> Option<&str> {
            None
        }

        fn column_name(&self) -> Option<&str> {
            None
        }

        fn constraint_name(&self) -> Option<&str> {
            self.constraint_name.as_deref()
        }

        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn db_error(kind: DatabaseErrorKind, info: MockDatabaseErrorInfo) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(info))
    }

    #[test]
    fn test_unique_violation_reads_details() {
        let error = db_error(
            DatabaseErrorKind::UniqueViolation,
            MockDatabaseErrorInfo {
                message: "duplicate key value violates unique constraint \"users_username_key\""
                    .to_string(),
                details: Some("Key (username)=(ada) already exists.".to_string()),
                constraint_name: Some("users_username_key".to_string()),
            },
        );

        match DatabaseErrorConverter::convert_diesel_error(error, "insert user") {
            AppError::Duplicate {
                entity,
                field,
                value,
            } => {
                assert_eq!(entity, "users");
                assert_eq!(field, "username");
                assert_eq!(value, "ada");
            }
            other => panic!("Expected Duplicate error, got: {:?}", other),
        }
    }

    #[test]
    fn test_not_null_violation_becomes_validation() {
        let error = db_error(
            DatabaseErrorKind::NotNullViolation,
            MockDatabaseErrorInfo {
                message: "null value in column \"hash\" of relation \"users\" violates not-null constraint"
                    .to_string(),
                details: None,
                constraint_name: None,
            },
        );

        match DatabaseErrorConverter::convert_diesel_error(error, "insert user") {
            AppError::Validation { field, reason } => {
                assert_eq!(field, "hash");
                assert!(reason.contains("users"));
            }
            other => panic!("Expected Validation error, got: {:?}", other),
        }
    }

    #[test]
    fn test_unparsable_violation_keeps_operation() {
        let error = db_error(
            DatabaseErrorKind::SerializationFailure,
            MockDatabaseErrorInfo {
                message: "could not serialize access".to_string(),
                details: None,
                constraint_name: None,
            },
        );

        match DatabaseErrorConverter::convert_diesel_error(error, "update password") {
            AppError::Database { operation, source } => {
                assert_eq!(operation, "update password");
                assert!(source.to_string().contains("could not serialize access"));
            }
            other => panic!("Expected Database error, got: {:?}", other),
        }
    }

    #[test]
    fn test_not_found_and_other_errors() {
        assert!(matches!(
            DatabaseErrorConverter::convert_diesel_error(DieselError::NotFound, "find user"),
            AppError::NotFound { .. }
        ));
        assert!(matches!(
            DatabaseErrorConverter::convert_diesel_error(
                DieselError::RollbackTransaction,
                "delete users"
            ),
            AppError::Database { .. }
        ));
    }
}
