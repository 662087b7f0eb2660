use std::{collections::VecDeque, io::Read};

use anyhow::{bail, Result};

/// A buffer that acts like a window being moved over a larger input stream.
/// It only keeps the bytes that have been read but not consumed yet and
/// remembers how many line breaks it has been moved past, so that absolute
/// stream positions can be translated into line numbers.
#[derive(Default)]
pub struct LineWindow {
    /// Absolute position of the first byte in `buf`
    pos: usize,

    /// Number of line breaks before `pos`
    lines: u64,

    buf: VecDeque<u8>,
}

impl LineWindow {
    /// Append data to the window (i.e. make it larger)
    pub fn extend(&mut self, buf: &[u8]) {
        self.buf.extend(buf);
    }

    /// Moves the window's start to the given absolute position and counts
    /// the line breaks in the bytes that are dropped
    pub fn advance_to(&mut self, pos: usize) -> Result<()> {
        if pos < self.pos {
            bail!("Unable to advance to a position before the current start of the window");
        }

        if pos > self.pos + self.buf.len() {
            bail!("Unable to advance to a position beyond the current end of the window");
        }

        let consumed = self.buf.drain(0..pos - self.pos).filter(|b| *b == b'\n').count();
        self.lines += consumed as u64;
        self.pos = pos;

        Ok(())
    }

    /// Returns the 1-based line number of the given absolute position.
    /// Positions beyond the end of the window are clamped to it.
    pub fn line_at(&self, pos: usize) -> Result<u64> {
        if pos < self.pos {
            bail!("Unable to get line number from before the start of the window");
        }

        let end = (pos - self.pos).min(self.buf.len());
        let pending = self.buf.iter().take(end).filter(|b| **b == b'\n').count();

        Ok(self.lines + pending as u64 + 1)
    }
}

/// Wrapper around a [`Read`] object that copies everything it reads into a
/// [`LineWindow`]
pub struct LineTrackingRead<R> {
    inner: R,
    window: LineWindow,
}

impl<R> LineTrackingRead<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            window: LineWindow::default(),
        }
    }

    pub fn window(&self) -> &LineWindow {
        &self.window
    }

    pub fn window_mut(&mut self) -> &mut LineWindow {
        &mut self.window
    }
}

impl<R: Read> Read for LineTrackingRead<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let len = self.inner.read(buf)?;
        self.window.extend(&buf[..len]);
        Ok(len)
    }
}
