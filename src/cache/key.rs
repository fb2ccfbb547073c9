// Computation key derivation
//
// A key is the computation's label plus an FNV-1a digest over the identity
// of every dependency it declares. Fields a computation does not declare
// never reach the digest.

use crate::artifacts::{ArtifactId, Dependency, MetricInputs};
use fnv::FnvHasher;
use std::fmt;
use std::hash::Hasher;

/// Marker hashed in place of an absent dependency
const ABSENT: &[u8] = b"<absent>";

/// Identity of one cached computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComputationKey {
    label: &'static str,
    digest: u64,
}

impl ComputationKey {
    /// Derive a key from explicit `(dependency, identity)` pairs
    ///
    /// # Example
    /// ```
    /// use blocktime::artifacts::Dependency;
    /// use blocktime::cache::ComputationKey;
    ///
    /// let a = ComputationKey::from_parts("Interactive", [(Dependency::Trace, None)]);
    /// let b = ComputationKey::from_parts("Interactive", [(Dependency::Trace, None)]);
    /// assert_eq!(a, b);
    /// ```
    pub fn from_parts<I>(label: &'static str, parts: I) -> Self
    where
        I: IntoIterator<Item = (Dependency, Option<ArtifactId>)>,
    {
        let mut hasher = FnvHasher::default();
        hasher.write(label.as_bytes());
        for (dependency, id) in parts {
            hasher.write(b"::");
            hasher.write(dependency.name().as_bytes());
            hasher.write(b"=");
            match id {
                Some(id) => hasher.write(&id.as_u64().to_le_bytes()),
                None => hasher.write(ABSENT),
            }
        }

        Self {
            label,
            digest: hasher.finish(),
        }
    }

    /// Derive a key from the declared dependencies of a computation
    pub fn derive(label: &'static str, dependencies: &[Dependency], inputs: &MetricInputs) -> Self {
        Self::from_parts(
            label,
            dependencies
                .iter()
                .map(|&dependency| (dependency, inputs.artifact_id(dependency))),
        )
    }
}

impl fmt::Display for ComputationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{:016x}", self.label, self.digest)
    }
}
