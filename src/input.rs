//! JSON Lines frame stream from the upstream landmark detector.

use anyhow::{Result, anyhow};
use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use crate::landmarks::Frame;

/// One line per frame; blank lines are skipped.
pub struct FrameReader<R> {
    inner: R,
    line: String,
    line_no: usize,
}

impl<R: BufRead> FrameReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            line: String::new(),
            line_no: 0,
        }
    }

    pub fn line_no(&self) -> usize {
        self.line_no
    }
}

pub fn open(path: Option<&Path>) -> Result<FrameReader<Box<dyn BufRead>>> {
    let inner: Box<dyn BufRead> = match path {
        Some(p) => {
            let f = File::open(p).map_err(|e| anyhow!("failed to open {}: {e}", p.display()))?;
            Box::new(BufReader::new(f))
        }
        None => Box::new(BufReader::new(io::stdin())),
    };
    Ok(FrameReader::new(inner))
}

impl<R: BufRead> Iterator for FrameReader<R> {
    /// Outer error: the stream itself broke. Inner error: this line is bad.
    type Item = io::Result<Result<Frame>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line.clear();
            match self.inner.read_line(&mut self.line) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e)),
            }
            self.line_no += 1;
            let text = self.line.trim();
            if text.is_empty() {
                continue;
            }
            let parsed = serde_json::from_str::<Frame>(text)
                .map_err(|e| anyhow!("line {}: {e}", self.line_no));
            return Some(Ok(parsed));
        }
    }
}
