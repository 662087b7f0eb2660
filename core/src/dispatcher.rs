use anyhow::Result;
use tracing::{event, Level};

use crate::{
    attributes::Attributes,
    input::ElementConsumer,
    listener::Listener,
    path::Path,
    registry::{GroupId, ListenerRegistry},
};

/// Turns raw element events into callbacks of listeners registered for
/// absolute paths.
///
/// The dispatcher keeps track of the absolute path of the current element.
/// Text is collected per listener and delivered in one piece when the
/// element it belongs to is closed or when a child element is opened.
/// Every listener counts how often its path has been opened; the count is
/// available through [`Path::instance`] in all callbacks.
///
/// ```
/// use std::cell::RefCell;
///
/// use pathwatch_core::{dispatcher::PathDispatcher, input::xml::parse_str, listener::Listener};
///
/// let names = RefCell::new(Vec::new());
/// let mut dispatcher = PathDispatcher::new();
/// dispatcher.listen_for(
///     "/root/a",
///     Listener::new().text(|path, text| {
///         names.borrow_mut().push(format!("{}#{}={text}", path.name(), path.instance()));
///         Ok(())
///     }),
/// );
///
/// parse_str("<root><a>hi</a><a>bye</a></root>", &mut dispatcher).unwrap();
/// drop(dispatcher);
/// assert_eq!(names.into_inner(), vec!["a#1=hi", "a#2=bye"]);
/// ```
#[derive(Debug, Default)]
pub struct PathDispatcher<'a> {
    registry: ListenerRegistry<'a>,

    /// The current element
    path: Path,

    /// Records registered for the current path
    matched: Option<GroupId>,
}

impl<'a> PathDispatcher<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener for the given absolute path (e.g. `/root/a`)
    pub fn listen_for(&mut self, path: impl Into<String>, listener: Listener<'a>) -> &mut Self {
        self.registry.register(path, listener);
        self
    }

    /// Returns the current path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the registered listeners and their state
    pub fn registry(&self) -> &ListenerRegistry<'a> {
        &self.registry
    }

    /// Prepares the dispatcher for a new document. Listeners stay
    /// registered but their instance counters and unsent text are dropped.
    pub fn reset(&mut self) {
        self.registry.reset();
        self.path = Path::default();
        self.matched = None;
    }
}

impl ElementConsumer for PathDispatcher<'_> {
    fn element_opened(&mut self, name: &str, attributes: &Attributes<'_>) -> Result<()> {
        // text collected so far belongs to the parent
        if let Some(id) = self.matched {
            for record in self.registry.records_mut(id) {
                self.path.set_instance(record.instance_count());
                record.flush(&self.path)?;
            }
        }

        self.path.push(name);
        self.matched = self.registry.lookup(self.path.as_str());
        event!(Level::TRACE, path = %self.path, matched = self.matched.is_some(), "element opened");

        if let Some(id) = self.matched {
            for record in self.registry.records_mut(id) {
                record.open(&mut self.path, attributes)?;
            }
        }

        Ok(())
    }

    fn element_closed(&mut self, name: &str) -> Result<()> {
        self.path.set_name(name);

        self.matched = self.registry.lookup(self.path.as_str());
        if let Some(id) = self.matched {
            for record in self.registry.records_mut(id) {
                record.close(&mut self.path)?;
            }
        }

        self.path.pop();
        self.matched = self.registry.lookup(self.path.as_str());
        event!(Level::TRACE, path = %self.path, "element closed");

        Ok(())
    }

    fn text_observed(&mut self, text: &str) -> Result<()> {
        if let Some(id) = self.matched {
            for record in self.registry.records_mut(id) {
                record.append_text(text);
            }
        }
        Ok(())
    }
}
