//! Classification of constraint violations

/// Constraint failure worth reporting to the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintViolation {
    Unique,
    ForeignKey,
    Check,
}

pub fn constraint_violation(error: &sqlx::Error) -> Option<ConstraintViolation> {
    let sqlx::Error::Database(db_err) = error else {
        return None;
    };
    if db_err.is_unique_violation() {
        Some(ConstraintViolation::Unique)
    } else if db_err.is_foreign_key_violation() {
        Some(ConstraintViolation::ForeignKey)
    } else if db_err.is_check_violation() {
        Some(ConstraintViolation::Check)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_errors_are_not_violations() {
        assert_eq!(constraint_violation(&sqlx::Error::RowNotFound), None);
        assert_eq!(constraint_violation(&sqlx::Error::PoolTimedOut), None);
    }
}
