use anyhow::Result;
use itertools::Itertools;
use tracing::{event, Level};

use crate::{attributes::Attributes, input::ElementConsumer, path::Path};

/// Receives the events of elements at one absolute path. In contrast to a
/// [`Listener`](crate::listener::Listener), text is forwarded piece by piece
/// as it arrives.
pub trait NodeConsumer {
    fn start_element(&mut self, _node: &Path, _attributes: &Attributes<'_>) -> Result<()> {
        Ok(())
    }

    fn end_element(&mut self, _node: &Path) -> Result<()> {
        Ok(())
    }

    fn character_data(&mut self, _node: &Path, _text: &str) -> Result<()> {
        Ok(())
    }
}

impl<T> NodeConsumer for &mut T
where
    T: NodeConsumer + ?Sized,
{
    fn start_element(&mut self, node: &Path, attributes: &Attributes<'_>) -> Result<()> {
        (**self).start_element(node, attributes)
    }

    fn end_element(&mut self, node: &Path) -> Result<()> {
        (**self).end_element(node)
    }

    fn character_data(&mut self, node: &Path, text: &str) -> Result<()> {
        (**self).character_data(node, text)
    }
}

/// Routes raw element events to the consumers registered for the current
/// absolute path. Events of elements nobody is interested in go to the
/// default consumer, if there is one.
#[derive(Default)]
pub struct ElementRouter<'a> {
    /// Consumers sorted by path. Consumers for the same path are kept in
    /// registration order.
    routes: Vec<(String, Box<dyn NodeConsumer + 'a>)>,

    default_consumer: Option<Box<dyn NodeConsumer + 'a>>,

    /// The current element
    node: Path,
}

impl<'a> ElementRouter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a consumer for the given absolute path
    pub fn add_consumer(&mut self, path: impl Into<String>, consumer: impl NodeConsumer + 'a) {
        let path = path.into();
        event!(Level::DEBUG, path = %path, "adding route");
        let i = self.routes.partition_point(|(p, _)| *p <= path);
        self.routes.insert(i, (path, Box::new(consumer)));
    }

    /// Sets the consumer that receives all events no other consumer is
    /// registered for
    pub fn set_default_consumer(&mut self, consumer: impl NodeConsumer + 'a) {
        self.default_consumer = Some(Box::new(consumer));
    }

    /// Returns all paths consumers have been registered for in sorted order
    pub fn paths(&self) -> Vec<&str> {
        self.routes.iter().map(|(p, _)| p.as_str()).dedup().collect()
    }

    /// Calls `f` for each consumer registered for the current path or for
    /// the default consumer if there is none
    fn route<F>(&mut self, mut f: F) -> Result<()>
    where
        F: FnMut(&mut dyn NodeConsumer, &Path) -> Result<()>,
    {
        let path = self.node.as_str();
        let start = self.routes.partition_point(|(p, _)| p.as_str() < path);
        let matching = self.routes[start..]
            .iter()
            .take_while(|(p, _)| p == path)
            .count();

        if matching > 0 {
            for (_, consumer) in &mut self.routes[start..start + matching] {
                f(&mut **consumer, &self.node)?;
            }
        } else if let Some(consumer) = &mut self.default_consumer {
            f(&mut **consumer, &self.node)?;
        }

        Ok(())
    }
}

impl ElementConsumer for ElementRouter<'_> {
    fn element_opened(&mut self, name: &str, attributes: &Attributes<'_>) -> Result<()> {
        self.node.push(name);
        self.route(|c, node| c.start_element(node, attributes))
    }

    fn element_closed(&mut self, name: &str) -> Result<()> {
        self.node.set_name(name);
        self.route(|c, node| c.end_element(node))?;
        self.node.pop();
        Ok(())
    }

    fn text_observed(&mut self, text: &str) -> Result<()> {
        self.route(|c, node| c.character_data(node, text))
    }
}
