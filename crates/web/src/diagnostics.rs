//! Paired request/reply capture for debugging.
//!
//! When a recorder is installed, every [`RequestContext`] takes the
//! recorder's lock at construction and gives it back when it replies, so
//! a request record and its reply record always appear together in the
//! sink even under concurrent traffic.
//!
//! The permit is an owned RAII value: a handler that returns early, fails
//! or panics still releases it when its context is dropped.  The price of
//! the pairing is that requests run one at a time while diagnostics are
//! on.
//!
//! [`RequestContext`]: crate::context::RequestContext

use std::fmt;
use std::sync::{Arc, Once};

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use zw_domain::error::{Error, Result};
use zw_domain::trace::TraceEvent;

use crate::media;
use crate::normalize::SPACES;

/// Line end used inside records.
const LE: &str = " \n";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Sinks
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Destination for diagnostic records.  A record arrives as a sequence
/// of loggable values meant to be written back to back.
pub trait DiagnosticSink: Send + Sync {
    fn write(&self, parts: &[&dyn fmt::Display]);
}

impl<F> DiagnosticSink for F
where
    F: Fn(&[&dyn fmt::Display]) + Send + Sync,
{
    fn write(&self, parts: &[&dyn fmt::Display]) {
        self(parts)
    }
}

/// Concatenate record parts.
pub fn join(parts: &[&dyn fmt::Display]) -> String {
    parts.iter().map(|p| p.to_string()).collect()
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl DiagnosticSink for StdoutSink {
    fn write(&self, parts: &[&dyn fmt::Display]) {
        print!("{}", join(parts));
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn write(&self, parts: &[&dyn fmt::Display]) {
        tracing::debug!(record = %join(parts), "diagnostic record");
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Permit
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Holds the recorder's lock for one request/reply window.
#[derive(Debug)]
pub struct DiagnosticPermit {
    _permit: OwnedSemaphorePermit,
    seq: u64,
    released: bool,
}

impl DiagnosticPermit {
    /// Close the window after the reply record was written.
    pub fn release(mut self) {
        self.released = true;
    }
}

impl Drop for DiagnosticPermit {
    fn drop(&mut self) {
        if !self.released {
            tracing::warn!(
                seq = self.seq,
                "request ended without a reply; diagnostic lock released on drop"
            );
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Recorder
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct DiagnosticRecorder {
    sink: Arc<dyn DiagnosticSink>,
    lock: Arc<Semaphore>,
    banner: Once,
    show_banner: bool,
    verbose: bool,
    preview_chars: usize,
}

impl DiagnosticRecorder {
    pub fn new(sink: impl DiagnosticSink + 'static) -> Self {
        Self {
            sink: Arc::new(sink),
            lock: Arc::new(Semaphore::new(1)),
            banner: Once::new(),
            show_banner: true,
            verbose: false,
            preview_chars: 40,
        }
    }

    /// Print full bodies instead of escaped previews.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn preview_chars(mut self, n: usize) -> Self {
        self.preview_chars = n;
        self
    }

    /// Skip the stdout warning banner.  Tests use this to keep output clean.
    pub fn quiet(mut self) -> Self {
        self.show_banner = false;
        self
    }

    /// Whether some request currently holds the lock.
    pub fn is_held(&self) -> bool {
        self.lock.available_permits() == 0
    }

    /// Open a request's diagnostic window, waiting for any open one.
    pub async fn acquire(&self, seq: u64) -> Result<DiagnosticPermit> {
        let permit = self
            .lock
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| Error::Other("diagnostic lock closed".into()))?;
        Ok(DiagnosticPermit {
            _permit: permit,
            seq,
            released: false,
        })
    }

    pub fn record_request(
        &self,
        seq: u64,
        sid: &str,
        method: &str,
        path: &str,
        referer: &str,
        body: &[u8],
    ) {
        let referer = if referer.is_empty() {
            String::new()
        } else {
            format!("ref:{referer}{LE}")
        };
        let postdata = if body.is_empty() {
            String::new()
        } else {
            let text = if self.verbose {
                String::from_utf8_lossy(body).into_owned()
            } else {
                escaped(body)
            };
            format!(
                "postdata:{LE}{}>{LE}{}{LE}<{}{LE}",
                "-".repeat(79),
                text.trim_matches(SPACES),
                "-".repeat(79)
            )
        };
        self.write(&[
            &"REQUEST:", &seq, &" sid:", &sid, &" path:", &method, &" ", &path, &LE,
            &referer, &postdata, &LE,
        ]);
    }

    pub fn record_reply(&self, seq: u64, sid: &str, media_type: &str, data: &[u8]) {
        let crc = format!("{:08X}", crc32(data));
        let preview = if !data.is_empty() && media::has_preview(media_type) {
            let text = if self.verbose {
                String::from_utf8_lossy(data).into_owned()
            } else {
                escaped(data).chars().take(self.preview_chars).collect()
            };
            format!(
                "{}>{LE}{}{LE}<{}{LE}",
                "-".repeat(80),
                text.trim_matches(SPACES),
                "-".repeat(80)
            )
        } else {
            String::new()
        };
        self.write(&[
            &"REPLY:", &seq, &" sid:", &sid, &" type:", &media_type, &" crc:", &crc,
            &" len:", &data.len(), &LE, &preview, &LE,
        ]);
    }

    pub fn record_redirect(&self, seq: u64, sid: &str, url: &str) {
        self.write(&[&"REDIRECT:", &seq, &" sid:", &sid, &" to:", &url, &LE, &LE]);
    }

    fn write(&self, parts: &[&dyn fmt::Display]) {
        self.banner.call_once(|| {
            if self.show_banner {
                for _ in 0..10 {
                    println!("CONTEXT HTTP DEBUGGING!");
                }
            }
            TraceEvent::DiagnosticsEnabled {
                verbose: self.verbose,
            }
            .emit();
        });
        self.sink.write(parts);
    }
}

/// IEEE CRC-32 of a payload.
pub fn crc32(data: &[u8]) -> u32 {
    let mut crc = flate2::Crc::new();
    crc.update(data);
    crc.sum()
}

/// Printable rendering of a payload with control characters escaped.
fn escaped(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len());
    for c in String::from_utf8_lossy(data).chars() {
        if c.is_control() {
            out.extend(c.escape_default());
        } else {
            out.push(c);
        }
    }
    out
}
