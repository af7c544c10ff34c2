use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Global string interner for layer IDs.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// An interned layer identifier: 4 bytes, Copy, O(1) Eq/Hash.
///
/// Layer ids are minted by [`LayerStore`](crate::store::LayerStore) as
/// `<kind>_<n>` and never reused within an editing session.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(Spur);

impl LayerId {
    /// Intern a string as a LayerId, or return the existing one.
    pub fn intern(s: &str) -> Self {
        LayerId(INTERNER.get_or_intern(s))
    }

    /// Look up an already-interned id without allocating a new entry.
    pub fn get(s: &str) -> Option<Self> {
        INTERNER.get(s).map(LayerId)
    }

    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// Build the id for the `n`-th layer of a given kind prefix (e.g. `text_3`).
    pub fn numbered(prefix: &str, n: u64) -> Self {
        Self::intern(&format!("{prefix}_{n}"))
    }
}

impl fmt::Debug for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LayerId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LayerId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(LayerId::intern(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = LayerId::intern("headline");
        let b = LayerId::intern("headline");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "headline");
    }

    #[test]
    fn numbered_ids_differ_by_counter() {
        assert_ne!(LayerId::numbered("text", 1), LayerId::numbered("text", 2));
        assert_eq!(LayerId::numbered("shape", 7).as_str(), "shape_7");
    }

    #[test]
    fn get_does_not_intern() {
        assert!(LayerId::get("never_interned_layer_name").is_none());
    }
}
