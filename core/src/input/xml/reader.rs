use std::{
    borrow::Cow,
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use anyhow::{Context, Result};
use quick_xml::{events::Event, Reader};
use tracing::{event, instrument, Level};

use crate::{
    attributes::Attributes,
    config::ReaderConfig,
    input::{
        xml::{
            entities::EntityTable,
            error::{ErrorCode, TokenizationError},
        },
        ElementConsumer,
    },
    util::line_window::LineTrackingRead,
};

type XmlReader<R> = Reader<BufReader<LineTrackingRead<R>>>;

/// Reads an XML document from `src` and forwards its elements and text to
/// `consumer`.
///
/// The consumer only ever sees a well-nested stream of events. Malformed
/// input results in a [`TokenizationError`]. If the consumer returns an
/// error, reading stops immediately and exactly that error is returned.
pub fn parse<R, C>(src: R, consumer: &mut C, config: &ReaderConfig) -> Result<()>
where
    R: Read,
    C: ElementConsumer + ?Sized,
{
    let buffer_size = if config.buffer_size == 0 {
        event!(Level::WARN, "buffer size must not be zero, using one byte");
        1
    } else {
        config.buffer_size
    };

    let bufreader = BufReader::with_capacity(buffer_size, LineTrackingRead::new(src));
    let mut reader = Reader::from_reader(bufreader);
    reader
        .expand_empty_elements(true)
        .trim_text(config.trim_text);

    let mut buf = Vec::new();

    // number of currently open elements
    let mut depth = 0usize;

    // `true` as soon as the document element has been opened
    let mut seen_root = false;

    let mut entities = EntityTable::default();

    loop {
        let e = reader
            .read_event_into(&mut buf)
            .map_err(|err| tokenization_error(&reader, err))?;

        match e {
            Event::Start(s) => {
                if depth == 0 && seen_root {
                    return Err(syntax_error(
                        &reader,
                        ErrorCode::JunkAfterDocumentElement,
                        "found a second top-level element",
                    ));
                }

                let decoder = reader.decoder();
                let qname = s.name();
                let name = decoder
                    .decode(qname.as_ref())
                    .map_err(|err| tokenization_error(&reader, err))?;

                let mut pairs = Vec::new();
                for attr in s.attributes() {
                    let attr = attr.map_err(|err| tokenization_error(&reader, err.into()))?;
                    let key = decoder
                        .decode(attr.key.as_ref())
                        .map_err(|err| tokenization_error(&reader, err))?
                        .into_owned();
                    let raw = decoder
                        .decode(&attr.value)
                        .map_err(|err| tokenization_error(&reader, err))?;
                    let value = entities
                        .unescape(&raw)
                        .map_err(|err| tokenization_error(&reader, err.into()))?
                        .into_owned();
                    pairs.push(key);
                    pairs.push(value);
                }
                let items = pairs.iter().map(String::as_str).collect::<Vec<_>>();

                depth += 1;
                seen_root = true;
                consumer.element_opened(&name, &Attributes::new(&items))?;
            }

            Event::End(end) => {
                if depth == 0 {
                    return Err(syntax_error(
                        &reader,
                        ErrorCode::TagMismatch,
                        "closing tag without matching opening tag",
                    ));
                }

                let qname = end.name();
                let name = reader
                    .decoder()
                    .decode(qname.as_ref())
                    .map_err(|err| tokenization_error(&reader, err))?;
                depth -= 1;
                consumer.element_closed(&name)?;
            }

            Event::Text(t) => {
                let raw = reader
                    .decoder()
                    .decode(&t)
                    .map_err(|err| tokenization_error(&reader, err))?;
                let text = entities
                    .unescape(&raw)
                    .map_err(|err| tokenization_error(&reader, err.into()))?;
                on_text(&reader, consumer, depth, seen_root, text)?;
            }

            Event::CData(c) => {
                let text = reader
                    .decoder()
                    .decode(&c)
                    .map_err(|err| tokenization_error(&reader, err))?;
                on_text(&reader, consumer, depth, seen_root, text)?;
            }

            Event::Eof => {
                if !seen_root {
                    return Err(syntax_error(
                        &reader,
                        ErrorCode::NoElements,
                        "document does not contain an element",
                    ));
                }
                if depth > 0 {
                    return Err(syntax_error(
                        &reader,
                        ErrorCode::UnclosedElement,
                        format!("reached end of input with {depth} unclosed element(s)"),
                    ));
                }
                break;
            }

            Event::DocType(d) => {
                let doctype = reader
                    .decoder()
                    .decode(&d)
                    .map_err(|err| tokenization_error(&reader, err))?;
                entities.declare_from(&doctype);
                event!(Level::DEBUG, entities = entities.len(), "read document type declaration");
            }

            // comments, processing instructions, declarations
            _ => {}
        }

        let pos = reader.buffer_position();
        reader.get_mut().get_mut().window_mut().advance_to(pos)?;
        buf.clear();
    }

    Ok(())
}

/// Forwards text inside the document element. Outside of it, only
/// whitespace is allowed.
fn on_text<R, C>(
    reader: &XmlReader<R>,
    consumer: &mut C,
    depth: usize,
    seen_root: bool,
    text: Cow<'_, str>,
) -> Result<()>
where
    C: ElementConsumer + ?Sized,
{
    if depth > 0 {
        return consumer.text_observed(&text);
    }

    if text.trim_start_matches('\u{feff}').trim().is_empty() {
        return Ok(());
    }

    let code = if seen_root {
        ErrorCode::JunkAfterDocumentElement
    } else {
        ErrorCode::Syntax
    };
    Err(syntax_error(
        reader,
        code,
        "text is not allowed outside of the document element",
    ))
}

fn line<R>(reader: &XmlReader<R>) -> u64 {
    reader
        .get_ref()
        .get_ref()
        .window()
        .line_at(reader.buffer_position())
        .unwrap_or(0)
}

fn tokenization_error<R>(reader: &XmlReader<R>, err: quick_xml::Error) -> anyhow::Error {
    TokenizationError::from_xml(err, line(reader)).into()
}

fn syntax_error<R>(
    reader: &XmlReader<R>,
    code: ErrorCode,
    message: impl Into<String>,
) -> anyhow::Error {
    TokenizationError::new(code, message, line(reader)).into()
}

/// Parses an XML document held in memory with the default configuration
pub fn parse_str<C>(xml: &str, consumer: &mut C) -> Result<()>
where
    C: ElementConsumer + ?Sized,
{
    parse(xml.as_bytes(), consumer, &ReaderConfig::default())
}

/// Opens the given file and parses it
#[instrument(skip(consumer, config))]
pub fn parse_file<P, C>(path: P, consumer: &mut C, config: &ReaderConfig) -> Result<()>
where
    P: AsRef<Path> + std::fmt::Debug,
    C: ElementConsumer + ?Sized,
{
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("Unable to open file `{}'", path.display()))?;

    event!(Level::DEBUG, "parsing file");
    parse(file, consumer, config)?;
    event!(Level::DEBUG, "finished parsing file");

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{fs, io::Cursor};

    use assertor::{assert_that, EqualityAssertion, OptionAssertion};
    use pretty_assertions::assert_eq;
    use tempdir::TempDir;

    use crate::{
        attributes::Attributes,
        config::ReaderConfig,
        input::{
            xml::{parse_file, ErrorCode, TokenizationError},
            ElementConsumer,
        },
    };

    use super::{parse, parse_str};

    /// Records raw events
    #[derive(Default)]
    struct Events(Vec<String>);

    impl ElementConsumer for Events {
        fn element_opened(&mut self, name: &str, attributes: &Attributes<'_>) -> anyhow::Result<()> {
            let atts = attributes
                .iter()
                .map(|a| format!(" {}={:?}", a.name, a.value))
                .collect::<String>();
            self.0.push(format!("open {name}{atts}"));
            Ok(())
        }

        fn element_closed(&mut self, name: &str) -> anyhow::Result<()> {
            self.0.push(format!("close {name}"));
            Ok(())
        }

        fn text_observed(&mut self, text: &str) -> anyhow::Result<()> {
            // merge pieces so that tests do not depend on buffer boundaries
            match self.0.last_mut() {
                Some(last) if last.starts_with("text ") => last.push_str(text),
                _ => self.0.push(format!("text {text}")),
            }
            Ok(())
        }
    }

    fn events(xml: &str, config: &ReaderConfig) -> Vec<String> {
        let mut e = Events::default();
        parse(Cursor::new(xml), &mut e, config).unwrap();
        e.0
    }

    fn tokenization_error(xml: &str) -> (ErrorCode, u64) {
        let mut e = Events::default();
        let err = parse_str(xml, &mut e).unwrap_err();
        let err = err
            .downcast_ref::<TokenizationError>()
            .expect("expected a tokenization error");
        (err.code(), err.line())
    }

    #[test]
    fn simple() {
        let xml = "<?xml version=\"1.0\"?>\n<!-- c --><root a=\"1\"><b>x &lt; y</b><c/><?pi x?></root>\n";
        assert_eq!(
            events(xml, &ReaderConfig::default()),
            vec![
                r#"open root a="1""#,
                "open b",
                "text x < y",
                "close b",
                "open c",
                "close c",
                "close root",
            ]
        );
    }

    /// Names and attributes keep their prefixes
    #[test]
    fn prefixes() {
        let xml = r#"<gml:root xmlns:gml="http://www.opengis.net/gml"><gml:a gml:id="x"/></gml:root>"#;
        assert_eq!(
            events(xml, &ReaderConfig::default()),
            vec![
                r#"open gml:root xmlns:gml="http://www.opengis.net/gml""#,
                r#"open gml:a gml:id="x""#,
                "close gml:a",
                "close gml:root",
            ]
        );
    }

    /// CDATA is passed on verbatim
    #[test]
    fn cdata() {
        let xml = "<root>a<![CDATA[<b>&amp;</b>]]>c</root>";
        assert_eq!(
            events(xml, &ReaderConfig::default()),
            vec!["open root", "text a<b>&amp;</b>c", "close root"]
        );
    }

    /// Tiny buffers must not change the result
    #[test]
    fn small_buffer() {
        let xml = "<root>\n  <item n=\"1\">first</item>\n  <item n=\"2\">second</item>\n</root>";
        let expected = events(xml, &ReaderConfig::default());
        assert_eq!(
            events(xml, &ReaderConfig::default().with_buffer_size(1)),
            expected
        );
        assert_eq!(
            events(xml, &ReaderConfig::default().with_buffer_size(0)),
            expected
        );
        assert_eq!(
            events(xml, &ReaderConfig::default().with_buffer_size(7)),
            expected
        );
    }

    #[test]
    fn trim_text() {
        let xml = "<root>\n  <a>  x  </a>\n</root>";
        assert_eq!(
            events(xml, &ReaderConfig::default()),
            vec!["open root", "text \n  ", "open a", "text   x  ", "close a", "text \n", "close root"]
        );
        assert_eq!(
            events(xml, &ReaderConfig::default().with_trim_text(true)),
            vec!["open root", "open a", "text x", "close a", "close root"]
        );
    }

    /// Whitespace around the document element is not reported
    #[test]
    fn whitespace_outside_root() {
        let xml = "\u{feff}\n\n<root/>\n  \n";
        assert_eq!(
            events(xml, &ReaderConfig::default()),
            vec!["open root", "close root"]
        );
    }

    #[test]
    fn mismatched_tag() {
        let (code, line) = tokenization_error("<root>\n<a>\n</b>\n</root>");
        assert_that!(code).is_equal_to(ErrorCode::TagMismatch);
        assert_that!(line).is_equal_to(3);
    }

    #[test]
    fn no_elements() {
        let (code, _) = tokenization_error("<?xml version=\"1.0\"?>\n<!-- nothing -->\n");
        assert_that!(code).is_equal_to(ErrorCode::NoElements);

        let (code, line) = tokenization_error("");
        assert_that!(code).is_equal_to(ErrorCode::NoElements);
        assert_that!(line).is_equal_to(1);
    }

    #[test]
    fn junk_after_root() {
        let (code, line) = tokenization_error("<root/>\n<second/>");
        assert_that!(code).is_equal_to(ErrorCode::JunkAfterDocumentElement);
        assert_that!(line).is_equal_to(2);

        let (code, _) = tokenization_error("<root/>junk");
        assert_that!(code).is_equal_to(ErrorCode::JunkAfterDocumentElement);

        let (code, _) = tokenization_error("junk<root/>");
        assert_that!(code).is_equal_to(ErrorCode::Syntax);
    }

    #[test]
    fn duplicate_attribute() {
        let (code, _) = tokenization_error(r#"<root a="1" a="2"/>"#);
        assert_that!(code).is_equal_to(ErrorCode::InvalidAttribute);
    }

    #[test]
    fn unknown_entity() {
        let (code, line) = tokenization_error("<root>\n\n<a>&unknown;</a></root>");
        assert_that!(code).is_equal_to(ErrorCode::InvalidReference);
        assert_that!(line).is_equal_to(3);
    }

    /// Entities declared in the internal subset are expanded in text and
    /// attribute values
    #[test]
    fn internal_entities() {
        let xml = "<!DOCTYPE r [\n  <!ENTITY e \"v\">\n  <!ENTITY who 'World'>\n]>\n<r a=\"&who;!\">&e; &amp; &#65;<b>&who;</b></r>";
        assert_eq!(
            events(xml, &ReaderConfig::default()),
            vec![
                r#"open r a="World!""#,
                "text v & A",
                "open b",
                "text World",
                "close b",
                "close r",
            ]
        );

        let (code, _) = tokenization_error("<!DOCTYPE r [<!ENTITY e \"v\">]><r>&f;</r>");
        assert_that!(code).is_equal_to(ErrorCode::InvalidReference);
    }

    /// Truncated documents are rejected
    #[test]
    fn truncated() {
        let mut e = Events::default();
        let err = parse_str("<root><a>text</a>", &mut e).unwrap_err();
        assert!(err.downcast_ref::<TokenizationError>().is_some());

        let mut e = Events::default();
        let err = parse_str("<root><a", &mut e).unwrap_err();
        assert!(err.downcast_ref::<TokenizationError>().is_some());
    }

    /// A consumer error stops reading and is returned unchanged
    #[test]
    fn consumer_error() {
        #[derive(Debug, thiserror::Error)]
        #[error("stop at {0}")]
        struct Stop(String);

        struct StopAt {
            name: &'static str,
            opened: Vec<String>,
        }

        impl ElementConsumer for StopAt {
            fn element_opened(&mut self, name: &str, _: &Attributes<'_>) -> anyhow::Result<()> {
                if name == self.name {
                    return Err(Stop(name.to_string()).into());
                }
                self.opened.push(name.to_string());
                Ok(())
            }
        }

        let mut c = StopAt {
            name: "b",
            opened: Vec::new(),
        };
        let err = parse_str("<root><a/><b/><c/></root>", &mut c).unwrap_err();
        assert!(err.downcast_ref::<TokenizationError>().is_none());
        assert_that!(err.downcast_ref::<Stop>().map(|s| s.0.clone())).has_value("b".to_string());
        assert_that!(c.opened).is_equal_to(vec!["root".to_string(), "a".to_string()]);
    }

    /// Read a document from a file
    #[test]
    fn file() {
        let dir = TempDir::new("pathwatch").unwrap();
        let path = dir.path().join("doc.xml");
        fs::write(&path, "<root><a>from file</a></root>").unwrap();

        let mut e = Events::default();
        parse_file(&path, &mut e, &ReaderConfig::default()).unwrap();
        assert_eq!(
            e.0,
            vec!["open root", "open a", "text from file", "close a", "close root"]
        );

        let missing = dir.path().join("missing.xml");
        let err = parse_file(&missing, &mut e, &ReaderConfig::default()).unwrap_err();
        assert!(err.downcast_ref::<std::io::Error>().is_some());
    }
}
