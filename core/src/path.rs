use std::fmt::{Display, Formatter};

/// The location of the current element in the document. A single `Path` is
/// maintained while a document is being parsed. Listeners only ever see it
/// through a shared reference.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Path {
    /// The name of the current element (or of the element that has just been
    /// closed)
    name: String,

    /// The absolute, slash-delimited address of the current element, e.g.
    /// `/root/a`. Empty outside the document element.
    path: String,

    /// The number of elements in `path`
    depth: usize,

    /// The 1-based occurrence of the current element for the listener being
    /// invoked
    instance: u64,
}

impl Path {
    /// Returns the name of the current element
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the absolute path of the current element
    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// Returns the nesting depth of the current element. The document
    /// element has depth 1.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns how often the listener currently being invoked has seen an
    /// element at this path so far, including the current one. Always 0 for
    /// consumers of an [`ElementRouter`](crate::router::ElementRouter),
    /// which does not count occurrences.
    pub fn instance(&self) -> u64 {
        self.instance
    }

    /// Descends into a child element with the given name
    pub(crate) fn push(&mut self, name: &str) {
        self.name.clear();
        self.name.push_str(name);
        self.path.push('/');
        self.path.push_str(name);
        self.depth += 1;
    }

    /// Overwrites the name of the current element. Needed when several
    /// elements are closed in a row and the name still refers to the
    /// innermost one.
    pub(crate) fn set_name(&mut self, name: &str) {
        self.name.clear();
        self.name.push_str(name);
    }

    /// Ascends to the parent element. After the document element has been
    /// closed, the path is empty and the name is left untouched.
    pub(crate) fn pop(&mut self) {
        let cut = self.path.rfind('/').unwrap_or(0);
        self.path.truncate(cut);
        self.depth = self.depth.saturating_sub(1);

        if let Some(sep) = self.path.rfind('/') {
            let parent = &self.path[sep + 1..];
            self.name.clear();
            self.name.push_str(parent);
        }
    }

    pub(crate) fn set_instance(&mut self, instance: u64) {
        self.instance = instance;
    }
}

impl AsRef<str> for Path {
    fn as_ref(&self) -> &str {
        &self.path
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path)
    }
}
