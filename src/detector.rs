use std::collections::HashMap;

/// Last observed response fingerprint per endpoint.
#[derive(Debug, Default)]
pub struct ChangeDetector {
    last_hashes: HashMap<String, String>,
}

impl ChangeDetector {
    /// Compares `fingerprint` against the stored value for `name` and records
    /// it as the new last-seen fingerprint. Returns true only when a stored
    /// fingerprint existed and differs; the first observation establishes the
    /// baseline. An absent fingerprint leaves the stored state untouched.
    pub fn detect(&mut self, name: &str, fingerprint: Option<&str>) -> bool {
        let current = match fingerprint {
            Some(fingerprint) => fingerprint,
            None => return false,
        };
        match self.last_hashes.insert(name.to_string(), current.to_string()) {
            Some(previous) => previous != current,
            None => false,
        }
    }
}
