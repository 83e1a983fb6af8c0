/// Metadata slot holding the identifier in the structural (METS) layer.
pub const DEFAULT_PRIMARY_SLOT: &str = "_urn";

/// Metadata slot holding the identifier in the descriptive (MODS) layer.
pub const DEFAULT_SECONDARY_SLOT: &str = "URN";

/// Per-run settings of a [`crate::UrnAssigner`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssignConfig {
    /// Prefix of every synthesized identifier. Identifiers outside it are
    /// never updated remotely.
    pub namespace: String,
    pub infix: Option<String>,
    pub primary_slot: String,
    pub secondary_slot: String,
    /// Also store new identifiers in the secondary slot.
    pub write_secondary: bool,
    /// Target URL templates; `{pi.urn}` is replaced per identifier.
    pub target_urls: Vec<String>,
}

impl AssignConfig {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            infix: None,
            primary_slot: DEFAULT_PRIMARY_SLOT.to_owned(),
            secondary_slot: DEFAULT_SECONDARY_SLOT.to_owned(),
            write_secondary: false,
            target_urls: Vec::new(),
        }
    }

    pub fn with_infix(mut self, infix: Option<String>) -> Self {
        self.infix = infix.filter(|i| !i.trim().is_empty());
        self
    }

    pub fn with_slots(mut self, primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        self.primary_slot = primary.into();
        self.secondary_slot = secondary.into();
        self
    }

    pub fn with_write_secondary(mut self, write_secondary: bool) -> Self {
        self.write_secondary = write_secondary;
        self
    }

    pub fn with_target_urls(mut self, target_urls: Vec<String>) -> Self {
        self.target_urls = target_urls;
        self
    }

    /// Whether `urn` was issued under this run's namespace.
    pub fn owns(&self, urn: &str) -> bool {
        urn.starts_with(self.namespace.trim_end_matches('-'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = AssignConfig::new("urn:nbn:de:gbv:NN");
        assert_eq!(config.primary_slot, "_urn");
        assert_eq!(config.secondary_slot, "URN");
        assert!(!config.write_secondary);
        assert!(config.target_urls.is_empty());
    }

    #[test]
    fn blank_infix_is_dropped() {
        let config = AssignConfig::new("x").with_infix(Some("  ".into()));
        assert_eq!(config.infix, None);
        let config = AssignConfig::new("x").with_infix(Some("abc".into()));
        assert_eq!(config.infix.as_deref(), Some("abc"));
    }

    #[test]
    fn namespace_ownership() {
        let config = AssignConfig::new("urn:nbn:de:gbv:NN-");
        assert!(config.owns("urn:nbn:de:gbv:NN-17"));
        assert!(!config.owns("urn:nbn:de:bvb:19-146642"));
    }
}
