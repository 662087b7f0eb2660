use std::io;

use anyhow::Result;
use clap::Args;
use pathwatch_core::{
    config::{ReaderConfig, DEFAULT_BUFFER_SIZE},
    input::{
        xml::{parse, parse_file},
        ElementConsumer,
    },
};
use tracing::{event, Level};

/// Where and how to read the XML document
#[derive(Args, Debug)]
pub struct InputArgs {
    /// The XML file to read (`-` for standard input)
    #[arg(name = "FILE")]
    pub file: String,

    /// Number of bytes to read at once
    #[arg(long, env = "PATHWATCH_BUFFER_SIZE", default_value_t = DEFAULT_BUFFER_SIZE)]
    pub buffer_size: usize,

    /// Strip leading and trailing whitespace from text and skip text that
    /// only consists of whitespace
    #[arg(long)]
    pub trim_text: bool,
}

impl InputArgs {
    pub fn config(&self) -> ReaderConfig {
        ReaderConfig::default()
            .with_buffer_size(self.buffer_size)
            .with_trim_text(self.trim_text)
    }

    /// Read the document and forward its events to `consumer`
    pub fn parse_into<C>(&self, consumer: &mut C) -> Result<()>
    where
        C: ElementConsumer + ?Sized,
    {
        let config = self.config();
        if self.file == "-" {
            parse(io::stdin().lock(), consumer, &config)
        } else {
            warn_if_not_xml(&self.file);
            parse_file(&self.file, consumer, &config)
        }
    }
}

/// Log a warning if the file name suggests something other than XML
fn warn_if_not_xml(path: &str) {
    let mime = mime_guess::from_path(path);
    if let Some(t) = mime.first() {
        let is_xml = t.subtype().as_str() == "xml"
            || t.subtype().as_str() == "gml"
            || t.suffix().map(|s| s.as_str() == "xml").unwrap_or(false);
        if !is_xml {
            event!(Level::WARN, "`{path}' does not look like an XML file ({t})");
        }
    }
}
