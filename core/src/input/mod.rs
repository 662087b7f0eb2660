use anyhow::Result;

use crate::attributes::Attributes;

pub mod xml;

/// Receives raw element events in document order. Implementations may rely
/// on the stream being well-nested. Returning an error stops the source: no
/// further events will be delivered and the error is handed to the caller of
/// the source unchanged.
pub trait ElementConsumer {
    /// Will be called when an element has been opened
    fn element_opened(&mut self, _name: &str, _attributes: &Attributes<'_>) -> Result<()> {
        Ok(())
    }

    /// Will be called when an element has been closed
    fn element_closed(&mut self, _name: &str) -> Result<()> {
        Ok(())
    }

    /// Will be called for every piece of text inside the document element.
    /// Text of a single element may arrive in several pieces.
    fn text_observed(&mut self, _text: &str) -> Result<()> {
        Ok(())
    }
}

impl<C> ElementConsumer for &mut C
where
    C: ElementConsumer + ?Sized,
{
    fn element_opened(&mut self, name: &str, attributes: &Attributes<'_>) -> Result<()> {
        (**self).element_opened(name, attributes)
    }

    fn element_closed(&mut self, name: &str) -> Result<()> {
        (**self).element_closed(name)
    }

    fn text_observed(&mut self, text: &str) -> Result<()> {
        (**self).text_observed(text)
    }
}
