use std::{
    borrow::Cow,
    cell::RefCell,
    io::{self, BufWriter, Write},
};

use anyhow::Result;
use clap::Args;
use itertools::Itertools;
use pathwatch_core::{dispatcher::PathDispatcher, listener::Listener, path::Path};
use thiserror::Error;

use super::input::InputArgs;

/// Print what happens at the given paths of an XML document
#[derive(Args, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Absolute path of the elements to report (e.g. `/root/a`)
    #[arg(long = "path", short = 'p', required = true)]
    paths: Vec<String>,

    /// Abort as soon as an element at this absolute path is opened
    #[arg(long)]
    fail_on: Vec<String>,

    /// Print text as found instead of collapsing whitespace
    #[arg(long)]
    raw_text: bool,
}

/// An error raised on purpose while watching
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("found element `{path}' (occurrence {instance})")]
    FailOn { path: String, instance: u64 },
}

/// Run the `watch` command
pub fn run_watch(args: WatchArgs) -> Result<()> {
    let stdout = io::stdout().lock();
    let out = RefCell::new(BufWriter::new(stdout));

    let mut dispatcher = PathDispatcher::new();
    for path in &args.paths {
        dispatcher.listen_for(path.as_str(), trace(&out, args.raw_text));
    }
    for path in &args.fail_on {
        dispatcher.listen_for(path.as_str(), fail_on());
    }

    args.input.parse_into(&mut dispatcher)?;

    drop(dispatcher);
    out.into_inner().flush()?;

    Ok(())
}

/// Creates a listener that prints every event to `out`
fn trace<'a, W: Write + 'a>(out: &'a RefCell<W>, raw_text: bool) -> Listener<'a> {
    Listener::new()
        .opened(move |p, atts| {
            let mut out = out.borrow_mut();
            let indent = indent(p);
            writeln!(out, "{indent}<{}> (n = {})", p.name(), p.instance())?;
            for a in atts {
                writeln!(out, "{indent}  {} = {}", a.name, a.value)?;
            }
            Ok(())
        })
        .closed(move |p| {
            writeln!(out.borrow_mut(), "{}</{}>", indent(p), p.name())?;
            Ok(())
        })
        .text(move |p, text| {
            let text = if raw_text {
                Cow::from(text)
            } else {
                Cow::from(collapse_whitespace(text))
            };
            if text.is_empty() {
                return Ok(());
            }
            writeln!(out.borrow_mut(), "{}Text of {} = {text}", indent(p), p.name())?;
            Ok(())
        })
}

/// Creates a listener that aborts as soon as its element is opened
fn fail_on<'a>() -> Listener<'a> {
    Listener::new().opened(|p, _| {
        Err(WatchError::FailOn {
            path: p.to_string(),
            instance: p.instance(),
        }
        .into())
    })
}

fn indent(p: &Path) -> String {
    "  ".repeat(p.depth().saturating_sub(1))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().join(" ")
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use pathwatch_core::{dispatcher::PathDispatcher, input::xml::parse_str};
    use pretty_assertions::assert_eq;

    use super::{collapse_whitespace, fail_on, trace, WatchError};

    #[test]
    fn collapse() {
        assert_eq!(collapse_whitespace("  a \n\t b  c\n"), "a b c");
        assert_eq!(collapse_whitespace(" \n "), "");
    }

    /// Whitespace-only text is not printed
    #[test]
    fn output() {
        let out = RefCell::new(Vec::new());
        let mut d = PathDispatcher::new();
        d.listen_for("/root", trace(&out, false));
        d.listen_for("/root/a", trace(&out, false));

        parse_str("<root x=\"1\">\n  <a>hi\n  there</a>\n  <a/>\n  tail\n</root>", &mut d).unwrap();
        drop(d);

        let printed = String::from_utf8(out.into_inner()).unwrap();
        assert_eq!(
            printed,
            concat!(
                "<root> (n = 1)\n",
                "  x = 1\n",
                "  <a> (n = 1)\n",
                "  Text of a = hi there\n",
                "  </a>\n",
                "  <a> (n = 2)\n",
                "  </a>\n",
                "Text of root = tail\n",
                "</root>\n",
            )
        );
    }

    /// The watch stops at the first element it has been told to fail on
    #[test]
    fn fail() {
        let out = RefCell::new(Vec::new());
        let mut d = PathDispatcher::new();
        d.listen_for("/root/a", trace(&out, false));
        d.listen_for("/root/b", fail_on());

        let err = parse_str("<root><a>x</a><b/><a>y</a></root>", &mut d).unwrap_err();
        drop(d);

        match err.downcast_ref::<WatchError>() {
            Some(WatchError::FailOn { path, instance }) => {
                assert_eq!(path, "/root/b");
                assert_eq!(*instance, 1);
            }
            None => panic!("unexpected error: {err:#}"),
        }

        let printed = String::from_utf8(out.into_inner()).unwrap();
        assert_eq!(printed, "  <a> (n = 1)\n  Text of a = x\n  </a>\n");
    }
}
