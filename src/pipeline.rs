//! Streaming transcode from a byte source to a byte sink
//!
//! The source is read in fixed-size chunks. Each chunk is decoded into
//! text, the text is encoded into the target encoding, and the result is
//! written to the sink before the next chunk is read. The whole input is
//! never held in memory.
//!
//! Transcoding stops at the first malformed input sequence or unmappable
//! character. Everything converted before that point has already reached
//! the sink, and the error reports how far into the input the good part
//! extends.

use std::fmt;
use std::io::{self, Read, Write};
use std::slice;

use thiserror::Error;
use tracing::debug;

use crate::codec::{Decoder, EncodingRef, Malformed, Unmappable};

/// Default read chunk size
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Bytes of each chunk the trailing decoder replays one at a time
const TAIL: usize = 8;

/// Tuning knobs for a [`Transcoder`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranscodeOptions {
    /// Bytes requested from the source per read. Zero is treated as one.
    pub chunk_size: usize,
}

impl Default for TranscodeOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Totals for a completed transcode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transcoded {
    /// Bytes read from the source
    pub consumed: u64,
    /// Bytes written to the sink
    pub written: u64,
}

/// Why a transcode stopped
#[derive(Debug, Error)]
pub enum Fault {
    /// The input was not valid in the source encoding
    #[error("input is not valid {encoding}")]
    Decode {
        /// Name of the source encoding
        encoding: &'static str,
    },
    /// A character has no representation in the target encoding
    #[error("character {ch:?} (U+{:04X}) cannot be represented in {encoding}", code_point(.ch))]
    Encode {
        /// The offending character
        ch: char,
        /// Name of the target encoding
        encoding: &'static str,
    },
    /// Reading, writing or flushing failed
    #[error(transparent)]
    Io(#[from] io::Error),
}

fn code_point(ch: &char) -> u32 {
    u32::from(*ch)
}

/// Names a transcode reports its encodings under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Labels {
    /// Name of the source encoding
    pub input: &'static str,
    /// Name of the target encoding
    pub output: &'static str,
}

impl Labels {
    /// Use the encodings' intrinsic names
    pub fn intrinsic(input: EncodingRef, output: EncodingRef) -> Self {
        Self {
            input: input.name(),
            output: output.name(),
        }
    }
}

/// A transcode that stopped early
#[derive(Debug)]
pub struct TranscodeError {
    consumed: u64,
    written: u64,
    fault: Fault,
}

impl TranscodeError {
    fn io(consumed: u64, written: u64, err: io::Error) -> Self {
        Self {
            consumed,
            written,
            fault: Fault::Io(err),
        }
    }

    /// Input bytes converted successfully before the fault
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Output bytes written before the fault
    pub fn written(&self) -> u64 {
        self.written
    }

    /// The underlying fault
    pub fn fault(&self) -> &Fault {
        &self.fault
    }

    /// Consume the error, returning the underlying fault
    pub fn into_fault(self) -> Fault {
        self.fault
    }

    /// One-based position of the first input byte that could not be
    /// converted. `None` for I/O failures, which have no such byte.
    pub fn offset(&self) -> Option<u64> {
        match self.fault {
            Fault::Io(_) => None,
            Fault::Decode { .. } | Fault::Encode { .. } => Some(self.consumed + 1),
        }
    }
}

impl fmt::Display for TranscodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset() {
            Some(offset) => write!(
                f,
                "could not transcode, read input up to byte {offset}"
            ),
            None => write!(
                f,
                "could not transcode after {} input bytes",
                self.consumed
            ),
        }
    }
}

impl std::error::Error for TranscodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.fault)
    }
}

/// Chunked transcoder
#[derive(Debug, Clone, Default)]
pub struct Transcoder {
    options: TranscodeOptions,
}

impl Transcoder {
    /// Create a transcoder with the given options
    pub fn new(options: TranscodeOptions) -> Self {
        Self { options }
    }

    /// Options in effect
    pub fn options(&self) -> &TranscodeOptions {
        &self.options
    }

    /// Transcode all of `source` from `input` into `output`, writing to `sink`.
    ///
    /// On success the sink has been flushed. On failure the sink holds the
    /// target-encoded form of every input byte before the faulting one and
    /// has been flushed on a best-effort basis.
    pub fn transcode<R, W>(
        &self,
        source: R,
        sink: W,
        input: EncodingRef,
        output: EncodingRef,
    ) -> Result<Transcoded, TranscodeError>
    where
        R: Read,
        W: Write,
    {
        self.transcode_labeled(source, sink, input, output, Labels::intrinsic(input, output))
    }

    /// Like [`Transcoder::transcode`], with faults naming the encodings as
    /// `labels` does
    pub fn transcode_labeled<R, W>(
        &self,
        mut source: R,
        mut sink: W,
        input: EncodingRef,
        output: EncodingRef,
        labels: Labels,
    ) -> Result<Transcoded, TranscodeError>
    where
        R: Read,
        W: Write,
    {
        let chunk_size = self.options.chunk_size.max(1);
        let mut decoder = input.new_decoder();
        let mut encoder = output.new_encoder();
        // Only a target that can fail to encode needs source positions.
        let mut trail = (!output.is_unicode()).then(|| Trail::new(input.new_decoder()));

        let mut chunk = vec![0u8; chunk_size];
        let mut text = String::with_capacity(chunk_size);
        let mut out = Vec::with_capacity(chunk_size);
        let mut consumed: u64 = 0;
        let mut written: u64 = 0;

        debug!(
            input = labels.input,
            output = labels.output,
            chunk_size,
            "transcode started"
        );

        loop {
            let n = read_chunk(&mut source, &mut chunk)
                .map_err(|err| TranscodeError::io(consumed, written, err))?;
            let last = n == 0;
            let window = &chunk[..n];

            text.clear();
            out.clear();
            let decoded = decoder.decode(window, &mut text, last);
            let encoded = encoder.encode(&text, &mut out, last && decoded.is_ok());

            // An unmappable character always precedes a malformed sequence
            // in the same chunk, since only text before the latter exists.
            let stop = match (encoded, decoded) {
                (Err(Unmappable { ch, position }), _) => {
                    let at = trail
                        .as_mut()
                        .map_or(consumed, |t| t.locate(window, consumed, position));
                    Some((at, Fault::Encode {
                        ch,
                        encoding: labels.output,
                    }))
                }
                (Ok(()), Err(Malformed {
                    valid_up_to,
                    carried,
                })) => {
                    let at = (consumed + valid_up_to as u64).saturating_sub(carried as u64);
                    Some((at, Fault::Decode {
                        encoding: labels.input,
                    }))
                }
                (Ok(()), Ok(_)) => None,
            };

            if let Some((at, fault)) = stop {
                if encoder.encode("", &mut out, true).is_err() {
                    debug!("encoder could not be finalized");
                }
                let written = written + salvage(&mut sink, &out);
                debug!(consumed = at, written, %fault, "transcode stopped");
                return Err(TranscodeError {
                    consumed: at,
                    written,
                    fault,
                });
            }

            sink.write_all(&out)
                .map_err(|err| TranscodeError::io(consumed, written, err))?;
            written += out.len() as u64;
            if let Some(trail) = trail.as_mut() {
                trail.advance(window, consumed);
            }
            consumed += n as u64;

            if last {
                break;
            }
        }

        sink.flush()
            .map_err(|err| TranscodeError::io(consumed, written, err))?;
        debug!(consumed, written, "transcode finished");
        Ok(Transcoded { consumed, written })
    }
}

/// Transcode with default options.
///
/// ```
/// use retxt::{charmap, transcode, unicode};
///
/// let mut sink = Vec::new();
/// transcode("café".as_bytes(), &mut sink, &unicode::UTF_8, &charmap::ISO_8859_1)?;
/// assert_eq!(sink, b"caf\xE9");
/// # Ok::<(), retxt::TranscodeError>(())
/// ```
pub fn transcode<R: Read, W: Write>(
    source: R,
    sink: W,
    input: EncodingRef,
    output: EncodingRef,
) -> Result<Transcoded, TranscodeError> {
    Transcoder::default().transcode(source, sink, input, output)
}

fn read_chunk<R: Read>(source: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match source.read(buf) {
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            result => return result,
        }
    }
}

/// Write what was converted before a fault. Failures here are logged and
/// dropped so they never mask the fault itself.
fn salvage<W: Write>(sink: &mut W, out: &[u8]) -> u64 {
    let mut written = out.len() as u64;
    if let Err(err) = sink.write_all(out) {
        debug!(%err, "could not write partial output");
        written = 0;
    }
    if let Err(err) = sink.flush() {
        debug!(%err, "could not flush partial output");
    }
    written
}

/// Second decoder over the same input, one chunk behind the main one.
///
/// Encoders report faults as positions in decoded text. Replaying the
/// faulting chunk through this decoder a byte at a time maps that position
/// back to the input byte where the character began.
struct Trail {
    decoder: Box<dyn Decoder>,
    /// Absolute offset just past the last byte that left the decoder idle
    boundary: u64,
    scratch: String,
}

impl Trail {
    fn new(decoder: Box<dyn Decoder>) -> Self {
        Self {
            decoder,
            boundary: 0,
            scratch: String::new(),
        }
    }

    /// Feed one byte at absolute offset `at`. Returns false if the decoder
    /// rejected it.
    fn step(&mut self, byte: u8, at: u64) -> bool {
        if self
            .decoder
            .decode(slice::from_ref(&byte), &mut self.scratch, false)
            .is_err()
        {
            return false;
        }
        if !self.decoder.is_pending() {
            self.boundary = at + 1;
        }
        true
    }

    /// Catch up over a chunk starting at absolute offset `start` that
    /// transcoded cleanly.
    ///
    /// Most of the chunk goes through in one call. The last few bytes are
    /// fed singly so a character left incomplete at the end of the chunk
    /// still has a known start.
    fn advance(&mut self, chunk: &[u8], start: u64) {
        self.scratch.clear();
        let split = chunk.len().saturating_sub(TAIL);
        let (bulk, tail) = chunk.split_at(split);

        if !bulk.is_empty() {
            let decoded = self.decoder.decode(bulk, &mut self.scratch, false);
            debug_assert!(decoded.is_ok(), "trailing decoder rejected a clean chunk");
            if !self.decoder.is_pending() {
                self.boundary = start + split as u64;
            }
        }
        for (i, &byte) in tail.iter().enumerate() {
            let stepped = self.step(byte, start + (split + i) as u64);
            debug_assert!(stepped, "trailing decoder rejected a clean chunk");
        }
    }

    /// Absolute offset of the input byte that began the character at
    /// `text_index` in the decoded text of `chunk`.
    fn locate(&mut self, chunk: &[u8], start: u64, text_index: usize) -> u64 {
        self.scratch.clear();
        for (i, &byte) in chunk.iter().enumerate() {
            let before = self.boundary;
            if !self.step(byte, start + i as u64) {
                break;
            }
            if self.scratch.len() > text_index {
                return before;
            }
        }
        self.boundary
    }
}
