use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Global string interner for object IDs.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Identifier of a scene object. Interned, so it is `Copy` and compares in O(1).
///
/// Snapshots store the string form; restoring a snapshot re-interns it, so an
/// object keeps the same ID across undo/redo and reloads.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(Spur);

impl ObjectId {
    /// Intern a string as an ObjectId, or return the existing one.
    pub fn intern(s: &str) -> Self {
        ObjectId(INTERNER.get_or_intern(s))
    }

    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// Generate a fresh ID with a kind prefix (e.g. `text_3`, `sticker_7`).
    ///
    /// Skips any candidate that is already interned, which covers IDs that
    /// arrived from a loaded design.
    pub fn with_prefix(prefix: &str) -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        loop {
            let n = COUNTER.fetch_add(1, Ordering::Relaxed);
            let candidate = format!("{prefix}_{n}");
            if INTERNER.get(&candidate).is_none() {
                return Self::intern(&candidate);
            }
        }
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ObjectId::intern(&s))
    }
}
