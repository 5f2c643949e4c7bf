#![forbid(unsafe_code)]

//! Offline replay of captured LCMGL buffers against a [`RecordingSink`].
//!
//! Buffers are decoded in the order given. By default they share one decoder session, the way
//! consecutive messages on one channel do; [`ReplaySession::independent`] gives every buffer a
//! fresh session instead.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use bot_lcmgl::{DecodeError, DecodeSummary, DecoderConfig, LcmglDecoder, RecordingSink, SinkCall};
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    /// One JSON object per line.
    JsonLines,
}

/// Result of decoding one buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferOutcome {
    pub name: String,
    pub result: Result<DecodeSummary, DecodeError>,
    pub calls: Vec<SinkCall>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayReport {
    pub buffers: usize,
    pub failures: usize,
}

#[derive(Debug)]
pub struct ReplaySession {
    config: DecoderConfig,
    independent: bool,
    decoder: LcmglDecoder,
    sink: RecordingSink,
}

impl ReplaySession {
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            config,
            independent: false,
            decoder: LcmglDecoder::new(config),
            sink: RecordingSink::new(),
        }
    }

    pub fn independent(mut self, independent: bool) -> Self {
        self.independent = independent;
        self
    }

    /// Decodes one buffer. Failures are logged and returned in the outcome; they never stop the
    /// session.
    pub fn replay_buffer(&mut self, name: &str, bytes: &[u8]) -> BufferOutcome {
        if self.independent {
            self.decoder.release_all(&mut self.sink);
            self.decoder = LcmglDecoder::new(self.config);
            self.sink = RecordingSink::new();
        }
        self.sink.clear();

        let result = self.decoder.decode(bytes, &mut self.sink);
        match &result {
            Ok(summary) => tracing::info!(
                buffer = name,
                records = summary.records,
                "replayed lcmgl buffer"
            ),
            Err(err) => tracing::error!(buffer = name, "lcmgl decode failed: {err}"),
        }

        BufferOutcome {
            name: name.to_owned(),
            result,
            calls: self.sink.calls().to_vec(),
        }
    }

    /// Frees every resource still held by the session. Returns the resulting sink calls.
    pub fn finish(mut self) -> Vec<SinkCall> {
        self.sink.clear();
        self.decoder.release_all(&mut self.sink);
        self.sink.into_calls()
    }
}

#[derive(Serialize)]
struct CallLine<'a> {
    buffer: &'a str,
    #[serde(flatten)]
    call: &'a SinkCall,
}

#[derive(Serialize)]
struct ResultLine<'a> {
    buffer: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<&'a DecodeSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn write_outcome(
    out: &mut dyn Write,
    outcome: &BufferOutcome,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            match &outcome.result {
                Ok(s) => writeln!(
                    out,
                    "# {}: ok, {} bytes, {} records, {} primitives, {} vertices",
                    outcome.name, s.bytes, s.records, s.primitives, s.vertices
                )?,
                Err(err) => writeln!(out, "# {}: error: {err}", outcome.name)?,
            }
            for call in &outcome.calls {
                writeln!(out, "{call:?}")?;
            }
        }
        OutputFormat::JsonLines => {
            for call in &outcome.calls {
                let line = CallLine {
                    buffer: &outcome.name,
                    call,
                };
                serde_json::to_writer(&mut *out, &line)?;
                writeln!(out)?;
            }
            let line = ResultLine {
                buffer: &outcome.name,
                summary: outcome.result.as_ref().ok(),
                error: outcome.result.as_ref().err().map(ToString::to_string),
            };
            serde_json::to_writer(&mut *out, &line)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Replays `paths` in order and writes every outcome to `out`.
///
/// Unreadable files are fatal; decode failures are counted in the report.
pub fn replay_files(
    paths: &[PathBuf],
    session: &mut ReplaySession,
    out: &mut dyn Write,
    format: OutputFormat,
) -> anyhow::Result<ReplayReport> {
    let mut report = ReplayReport::default();
    for path in paths {
        let bytes = read_buffer(path)?;
        let outcome = session.replay_buffer(&path.display().to_string(), &bytes);
        report.buffers += 1;
        if outcome.result.is_err() {
            report.failures += 1;
        }
        write_outcome(out, &outcome, format)?;
    }
    Ok(report)
}

fn read_buffer(path: &Path) -> anyhow::Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("read lcmgl buffer {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bot_lcmgl::{ErrorKind, LcmglWriter, PrimitiveKind};

    fn lines() -> Vec<u8> {
        let mut w = LcmglWriter::new();
        w.begin(PrimitiveKind::Lines);
        w.vertex2f(0.0, 0.0);
        w.vertex2f(1.0, 1.0);
        w.end();
        w.finish()
    }

    #[test]
    fn shared_session_keeps_textures_between_buffers() {
        let mut create = LcmglWriter::new();
        create.tex_image_2d(1, 1, 1, bot_lcmgl::TextureFormat::Luminance, &[0]);
        let mut bind = LcmglWriter::new();
        bind.bind_texture(1);

        let mut session = ReplaySession::new(DecoderConfig::default());
        assert!(session.replay_buffer("a", &create.finish()).result.is_ok());
        let bind = bind.finish();
        assert!(session.replay_buffer("b", &bind).result.is_ok());

        let mut fresh = ReplaySession::new(DecoderConfig::default()).independent(true);
        let outcome = fresh.replay_buffer("b", &bind);
        assert_eq!(
            outcome.result.unwrap_err().kind(),
            ErrorKind::UnknownHandle
        );
        assert!(outcome.calls.is_empty());

        assert_eq!(session.finish().len(), 1);
    }

    #[test]
    fn text_output_lists_summary_then_calls() {
        let mut session = ReplaySession::new(DecoderConfig::default());
        let outcome = session.replay_buffer("lines.bin", &lines());
        let mut out = Vec::new();
        write_outcome(&mut out, &outcome, OutputFormat::Text).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut it = text.lines();
        assert_eq!(
            it.next(),
            Some("# lines.bin: ok, 24 bytes, 4 records, 1 primitives, 2 vertices")
        );
        assert_eq!(it.next(), Some("Begin(Lines)"));
        assert_eq!(text.lines().count(), 5);
    }

    #[test]
    fn json_lines_are_tagged_with_the_buffer() {
        let mut session = ReplaySession::new(DecoderConfig::default());
        let outcome = session.replay_buffer("x", &[0xff]);
        let mut out = Vec::new();
        write_outcome(&mut out, &outcome, OutputFormat::JsonLines).unwrap();
        let text = String::from_utf8(out).unwrap();
        let v: serde_json::Value = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(v["buffer"], "x");
        assert!(v["error"].as_str().unwrap().contains("0xff"));
        assert!(v.get("summary").is_none());
    }
}
