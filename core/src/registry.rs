use anyhow::Result;
use rustc_hash::FxHashMap;
use tracing::{event, Level};

use crate::{attributes::Attributes, listener::Listener, path::Path};

/// Identifies all listener records registered for one path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupId(usize);

/// A registered [`Listener`] together with its per-document state
#[derive(Debug)]
pub struct ListenerRecord<'a> {
    /// The absolute path the listener has been registered for
    path: String,

    listener: Listener<'a>,

    /// How often an element at `path` has been opened so far
    instance_count: u64,

    /// Text collected since the element was opened or since the last flush
    pending_text: String,
}

impl<'a> ListenerRecord<'a> {
    fn new(path: String, listener: Listener<'a>) -> Self {
        Self {
            path,
            listener,
            instance_count: 0,
            pending_text: String::new(),
        }
    }

    /// Returns the path this record has been registered for
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns how often an element at this record's path has been opened
    pub fn instance_count(&self) -> u64 {
        self.instance_count
    }

    /// Returns the text that has been collected but not delivered yet
    pub fn pending_text(&self) -> &str {
        &self.pending_text
    }

    /// Counts a new occurrence and calls the opened callback
    pub(crate) fn open(&mut self, path: &mut Path, attributes: &Attributes<'_>) -> Result<()> {
        self.instance_count += 1;
        path.set_instance(self.instance_count);
        if let Some(cb) = &mut self.listener.on_opened {
            cb(path, attributes)?;
        }
        Ok(())
    }

    /// Delivers pending text (if any) and calls the closed callback
    pub(crate) fn close(&mut self, path: &mut Path) -> Result<()> {
        path.set_instance(self.instance_count);
        self.flush(path)?;
        if let Some(cb) = &mut self.listener.on_closed {
            cb(path)?;
        }
        Ok(())
    }

    /// Delivers pending text to the text callback and clears the buffer
    pub(crate) fn flush(&mut self, path: &Path) -> Result<()> {
        if let Some(cb) = &mut self.listener.on_text {
            if !self.pending_text.is_empty() {
                cb(path, &self.pending_text)?;
                self.pending_text.clear();
            }
        }
        Ok(())
    }

    /// Collects text. Records without a text callback ignore it.
    pub(crate) fn append_text(&mut self, text: &str) {
        if self.listener.wants_text() {
            self.pending_text.push_str(text);
        }
    }

    fn reset(&mut self) {
        self.instance_count = 0;
        self.pending_text.clear();
    }
}

/// Maps absolute paths to the listeners registered for them. Listeners for
/// the same path are kept in registration order.
#[derive(Debug, Default)]
pub struct ListenerRegistry<'a> {
    index: FxHashMap<String, GroupId>,
    groups: Vec<Vec<ListenerRecord<'a>>>,
}

impl<'a> ListenerRegistry<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a listener for the given absolute path. Registering several
    /// listeners for the same path is allowed; all of them will be called.
    pub fn register(&mut self, path: impl Into<String>, listener: Listener<'a>) {
        let path = path.into();
        if !path.starts_with('/') || path.ends_with('/') {
            event!(
                Level::WARN,
                path = %path,
                "listener path is not an absolute element path and will never match"
            );
        }
        event!(Level::DEBUG, path = %path, ?listener, "registering listener");

        let id = *self.index.entry(path.clone()).or_insert_with(|| {
            self.groups.push(Vec::new());
            GroupId(self.groups.len() - 1)
        });
        self.groups[id.0].push(ListenerRecord::new(path, listener));
    }

    /// Finds the group of records registered for exactly the given path
    pub fn lookup(&self, path: &str) -> Option<GroupId> {
        self.index.get(path).copied()
    }

    /// Returns the records of a group in registration order
    pub fn records_mut(&mut self, id: GroupId) -> &mut [ListenerRecord<'a>] {
        &mut self.groups[id.0]
    }

    /// Returns all records registered for the given path in registration
    /// order. The slice is empty if there are none.
    pub fn range_for(&self, path: &str) -> &[ListenerRecord<'a>] {
        match self.lookup(path) {
            Some(id) => &self.groups[id.0],
            None => &[],
        }
    }

    /// Returns the total number of registered listeners
    pub fn len(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    /// Returns `true` if no listener has been registered
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Clears instance counters and pending text of all records
    pub fn reset(&mut self) {
        self.groups
            .iter_mut()
            .flatten()
            .for_each(ListenerRecord::reset);
    }
}
