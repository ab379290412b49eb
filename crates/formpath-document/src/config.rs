/// How an `Index` segment is read against a keyed mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MappingAddressing {
    /// `3` addresses the entry whose key is `"3"`.
    #[default]
    Key,
    /// Try the key `"3"` first, then fall back to the fourth inserted entry.
    ///
    /// Kept for form state saved by clients that addressed mapping entries
    /// by position. Misresolves when keys are themselves small integers.
    KeyThenPosition,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AccessConfig {
    pub mapping_addressing: MappingAddressing,
}

impl AccessConfig {
    pub fn with_mapping_addressing(mut self, addressing: MappingAddressing) -> Self {
        self.mapping_addressing = addressing;
        self
    }
}
