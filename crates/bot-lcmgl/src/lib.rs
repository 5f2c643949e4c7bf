#![forbid(unsafe_code)]

//! LCMGL: immediate-mode graphics commands carried as opaque byte buffers.
//!
//! A producer encodes drawing calls with [`LcmglWriter`]; the viewer replays each received buffer
//! against its rendering context with [`LcmglDecoder`] (or [`decode`] for one-off buffers). The
//! rendering context is abstracted as [`GraphicsSink`].
//!
//! Wire format: each record is a one-byte [`Opcode`] followed by that opcode's operands. All
//! scalars are big-endian; `f32`/`f64` are IEEE-754. Variable-length payloads (text, vertex
//! arrays, texture data) carry a `u32` element count. There is no header and no version field.

pub mod cmd;
mod config;
mod decoder;
mod error;
mod handles;
mod opcode;
mod queue;
mod reader;
mod recording;
mod sink;
mod state;
mod writer;

pub use cmd::{LcmglCmd, LcmglRecord, LcmglRecordIter};
pub use config::{
    ConfigError, DecoderConfig, DEFAULT_MAX_ARRAY_LEN, DEFAULT_MAX_ATTRIB_DEPTH,
    DEFAULT_MAX_MATRIX_DEPTH, DEFAULT_MAX_RESOURCE_ID, DEFAULT_MAX_TEXTURE_BYTES,
    DEFAULT_MAX_TEXT_LEN,
};
pub use decoder::{decode, DecodeSummary, LcmglDecoder};
pub use error::{DecodeError, ErrorKind, ResourceKind, Violation};
pub use handles::HandleTable;
pub use opcode::Opcode;
pub use queue::{ChannelFailure, DecodeQueue, DrainReport, LcmglBuffer, LcmglSubmitter, QueueClosed};
pub use reader::{LengthError, StreamReader};
pub use recording::{RecordingSink, SinkCall};
pub use sink::{
    GraphicsSink, ListHandle, MatrixMode, PrimitiveKind, TextRun, TextureDesc, TextureFormat,
    TextureHandle,
};
pub use state::{ExecutionState, OpenState, PrimitiveState};
pub use writer::LcmglWriter;
