use std::{
    fmt::{Debug, Formatter},
    slice::ChunksExact,
};

/// A single attribute of an XML element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute<'a> {
    /// The attribute's name as written in the document
    pub name: &'a str,

    /// The attribute's unescaped value
    pub value: &'a str,
}

/// A read-only view of the attributes of an element that has just been
/// opened. The view borrows a flat list of alternating names and values and
/// is only valid for the duration of the callback it has been passed to.
#[derive(Clone, Copy)]
pub struct Attributes<'a> {
    items: &'a [&'a str],
}

impl<'a> Attributes<'a> {
    /// Wraps a flat list of alternating names and values. A trailing name
    /// without a value is ignored.
    pub fn new(items: &'a [&'a str]) -> Self {
        Self { items }
    }

    /// Returns a view without any attributes
    pub fn empty() -> Self {
        Self { items: &[] }
    }

    /// Returns the number of attributes
    pub fn len(&self) -> usize {
        self.items.len() / 2
    }

    /// Returns `true` if the element has no attributes
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over all attributes in document order
    pub fn iter(&self) -> Iter<'a> {
        Iter {
            inner: self.items.chunks_exact(2),
        }
    }

    /// Returns the value of the first attribute with the given name or
    /// [`None`] if there is no such attribute
    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.iter().find(|a| a.name == name).map(|a| a.value)
    }

    /// Returns the value of the attribute with the given name or `default`
    pub fn get_or(&self, name: &str, default: &'a str) -> &'a str {
        self.get(name).unwrap_or(default)
    }

    /// Returns `true` if an attribute with the given name exists
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

impl Default for Attributes<'_> {
    fn default() -> Self {
        Self::empty()
    }
}

impl Debug for Attributes<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|a| (a.name, a.value)))
            .finish()
    }
}

impl<'a> IntoIterator for Attributes<'a> {
    type Item = Attribute<'a>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> IntoIterator for &Attributes<'a> {
    type Item = Attribute<'a>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the [`Attribute`]s of an [`Attributes`] view
#[derive(Clone)]
pub struct Iter<'a> {
    inner: ChunksExact<'a, &'a str>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = Attribute<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|pair| Attribute {
            name: pair[0],
            value: pair[1],
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

#[cfg(test)]
mod tests {
    use assertor::{assert_that, EqualityAssertion, OptionAssertion};

    use super::{Attribute, Attributes};

    #[test]
    fn empty() {
        let atts = Attributes::empty();
        assert!(atts.is_empty());
        assert_that!(atts.len()).is_equal_to(0);
        assert_that!(atts.iter().next()).is_none();
        assert_that!(atts.get("x")).is_none();
    }

    /// Iterate over all pairs in document order
    #[test]
    fn iterate() {
        let items = ["x", "1", "y", "two", "z", ""];
        let atts = Attributes::new(&items);
        assert_that!(atts.len()).is_equal_to(3);

        let all = atts.iter().collect::<Vec<_>>();
        assert_that!(all).is_equal_to(vec![
            Attribute {
                name: "x",
                value: "1",
            },
            Attribute {
                name: "y",
                value: "two",
            },
            Attribute {
                name: "z",
                value: "",
            },
        ]);

        let names = (&atts).into_iter().map(|a| a.name).collect::<Vec<_>>();
        assert_that!(names).is_equal_to(vec!["x", "y", "z"]);
    }

    /// Look up attributes by name
    #[test]
    fn lookup() {
        let items = ["srsName", "EPSG:4326", "gml:id", "b1", "srsName", "EPSG:25832"];
        let atts = Attributes::new(&items);

        // first one wins
        assert_that!(atts.get("srsName")).has_value("EPSG:4326");
        assert_that!(atts.get("gml:id")).has_value("b1");
        assert_that!(atts.get("id")).is_none();

        assert!(atts.contains("gml:id"));
        assert!(!atts.contains("srsDimension"));

        assert_that!(atts.get_or("srsDimension", "2")).is_equal_to("2");
        assert_that!(atts.get_or("gml:id", "none")).is_equal_to("b1");
    }

    /// A dangling name at the end of the list is not an attribute
    #[test]
    fn trailing_name() {
        let items = ["a", "1", "b"];
        let atts = Attributes::new(&items);
        assert_that!(atts.len()).is_equal_to(1);
        assert_that!(atts.iter().count()).is_equal_to(1);
        assert_that!(atts.get("b")).is_none();
        assert_that!(atts.get("a")).has_value("1");
    }

    #[test]
    fn debug() {
        let items = ["a", "1", "b", "2"];
        let atts = Attributes::new(&items);
        assert_that!(format!("{atts:?}")).is_equal_to(r#"{"a": "1", "b": "2"}"#.to_string());
    }
}
