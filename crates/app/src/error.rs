//! Errors raised by the type registries.

/// A type contribution was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Another module already contributes a type with the same UID.
    #[error("{kind} '{uid}' is already provided by module '{owner}'")]
    DuplicateUid {
        kind: &'static str,
        uid: String,
        owner: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_name_owner_in_duplicate_message() {
        let err = RegistryError::DuplicateUid {
            kind: "ThingType",
            uid: "acme:sensor".to_string(),
            owner: "acme-core".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "ThingType 'acme:sensor' is already provided by module 'acme-core'"
        );
    }
}
