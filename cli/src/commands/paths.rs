use std::{
    collections::BTreeMap,
    io::{self, BufWriter, Write},
    time::{Duration, Instant},
};

use anyhow::Result;
use clap::Args;
use humantime::format_duration;
use pathwatch_core::{
    attributes::Attributes,
    path::Path,
    router::{ElementRouter, NodeConsumer},
};

use super::input::InputArgs;

/// Count how often each absolute path occurs in an XML document
#[derive(Args, Debug)]
pub struct PathsArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Do not count elements at this absolute path (their children are
    /// still counted)
    #[arg(long)]
    skip: Vec<String>,
}

/// Counts element occurrences per absolute path
#[derive(Default)]
struct PathCounter {
    counts: BTreeMap<String, usize>,
    max_depth: usize,
}

impl NodeConsumer for PathCounter {
    fn start_element(&mut self, node: &Path, _: &Attributes<'_>) -> Result<()> {
        *self.counts.entry(node.as_str().to_string()).or_default() += 1;
        self.max_depth = self.max_depth.max(node.depth());
        Ok(())
    }
}

/// Swallows all events
struct Ignore;

impl NodeConsumer for Ignore {}

/// Run the `paths` command
pub fn run_paths(args: PathsArgs) -> Result<()> {
    let start = Instant::now();

    let mut counter = PathCounter::default();
    {
        let mut router = ElementRouter::new();
        for path in &args.skip {
            router.add_consumer(path.as_str(), Ignore);
        }
        router.set_default_consumer(&mut counter);
        args.input.parse_into(&mut router)?;
    }

    let mut out = BufWriter::new(io::stdout().lock());
    for (path, count) in &counter.counts {
        writeln!(out, "{count:>8}  {path}")?;
    }
    out.flush()?;

    eprintln!(
        "Found {} distinct paths (maximum depth {}) in {}",
        counter.counts.len(),
        counter.max_depth,
        format_duration(Duration::from_millis(start.elapsed().as_millis() as u64))
    );

    Ok(())
}
