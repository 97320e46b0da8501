//! Outcome type for best-effort derivation steps.

use std::path::PathBuf;

use crate::frontmatter::FrontmatterError;

/// Why a derivation fell back to its default.
#[derive(Debug, thiserror::Error)]
pub enum MetaError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Ignoring front matter in {path}: {source}")]
    Frontmatter {
        path: PathBuf,
        #[source]
        source: FrontmatterError,
    },
}

/// Result of a derivation that never fails outright.
///
/// `Degraded` still carries a usable value (usually the empty default) so
/// callers that only care about the value can treat both arms alike.
#[derive(Debug)]
pub enum Derived<T> {
    Value(T),
    Degraded(T, MetaError),
}

impl<T> Derived<T> {
    /// Borrow the carried value.
    pub fn value(&self) -> &T {
        match self {
            Self::Value(value) | Self::Degraded(value, _) => value,
        }
    }

    /// Take the carried value, dropping any degradation reason.
    pub fn into_value(self) -> T {
        match self {
            Self::Value(value) | Self::Degraded(value, _) => value,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(..))
    }

    /// The reason this value is a fallback, if it is one.
    pub fn reason(&self) -> Option<&MetaError> {
        match self {
            Self::Value(_) => None,
            Self::Degraded(_, reason) => Some(reason),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Derived<U> {
        match self {
            Self::Value(value) => Derived::Value(f(value)),
            Self::Degraded(value, reason) => Derived::Degraded(f(value), reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degraded_still_yields_value() {
        let derived: Derived<Vec<u8>> = Derived::Degraded(
            Vec::new(),
            MetaError::Io {
                path: PathBuf::from("missing.adoc"),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            },
        );

        assert!(derived.is_degraded());
        assert!(derived.reason().is_some());
        assert!(derived.value().is_empty());
        assert_eq!(derived.map(|v| v.len()).into_value(), 0);
    }
}
