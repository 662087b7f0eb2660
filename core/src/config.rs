/// The number of bytes requested from the underlying reader at once if
/// nothing else has been configured
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Settings for reading XML documents with [`parse`](crate::input::xml::parse)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Capacity of the read buffer in bytes. Zero is treated as one.
    pub buffer_size: usize,

    /// Remove leading and trailing whitespace from text and drop text that
    /// consists of whitespace only. This changes which text listeners see,
    /// so it is off by default.
    pub trim_text: bool,
}

impl ReaderConfig {
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn with_trim_text(mut self, trim_text: bool) -> Self {
        self.trim_text = trim_text;
        self
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            trim_text: false,
        }
    }
}
