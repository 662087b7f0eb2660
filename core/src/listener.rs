use std::fmt::{Debug, Formatter};

use anyhow::Result;

use crate::{attributes::Attributes, path::Path};

/// Called when an element at the listener's path has been opened
pub type OpenedCallback<'a> = Box<dyn FnMut(&Path, &Attributes<'_>) -> Result<()> + 'a>;

/// Called when an element at the listener's path is about to be closed
pub type ClosedCallback<'a> = Box<dyn FnMut(&Path) -> Result<()> + 'a>;

/// Called with the text collected directly inside an element at the
/// listener's path
pub type TextCallback<'a> = Box<dyn FnMut(&Path, &str) -> Result<()> + 'a>;

/// A subscription to one absolute path. All callbacks are optional. Text is
/// only collected for listeners that have a text callback.
///
/// ```
/// use pathwatch_core::listener::Listener;
///
/// let listener = Listener::new()
///     .opened(|path, attributes| {
///         println!("<{}> #{} ({} attributes)", path.name(), path.instance(), attributes.len());
///         Ok(())
///     })
///     .text(|path, text| {
///         println!("text of {}: {text}", path.name());
///         Ok(())
///     });
/// assert!(listener.wants_text());
/// ```
#[derive(Default)]
pub struct Listener<'a> {
    pub(crate) on_opened: Option<OpenedCallback<'a>>,
    pub(crate) on_closed: Option<ClosedCallback<'a>>,
    pub(crate) on_text: Option<TextCallback<'a>>,
}

impl<'a> Listener<'a> {
    /// Creates a listener without any callbacks
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the callback for opened elements
    pub fn opened<F>(mut self, f: F) -> Self
    where
        F: FnMut(&Path, &Attributes<'_>) -> Result<()> + 'a,
    {
        self.on_opened = Some(Box::new(f));
        self
    }

    /// Sets the callback for closed elements
    pub fn closed<F>(mut self, f: F) -> Self
    where
        F: FnMut(&Path) -> Result<()> + 'a,
    {
        self.on_closed = Some(Box::new(f));
        self
    }

    /// Sets the callback for text content
    pub fn text<F>(mut self, f: F) -> Self
    where
        F: FnMut(&Path, &str) -> Result<()> + 'a,
    {
        self.on_text = Some(Box::new(f));
        self
    }

    /// Returns `true` if this listener collects text
    pub fn wants_text(&self) -> bool {
        self.on_text.is_some()
    }
}

impl Debug for Listener<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listener")
            .field("opened", &self.on_opened.is_some())
            .field("closed", &self.on_closed.is_some())
            .field("text", &self.on_text.is_some())
            .finish()
    }
}
