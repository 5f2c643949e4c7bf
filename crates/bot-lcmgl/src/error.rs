use crate::opcode::Opcode;
use crate::sink::PrimitiveKind;

/// Coarse classification of a [`DecodeError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    TruncatedStream,
    UnknownOpcode,
    ProtocolViolation,
    UnknownHandle,
    UnbalancedStream,
}

/// Which retained-resource table an ID refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Texture,
    DisplayList,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Texture => f.write_str("texture"),
            Self::DisplayList => f.write_str("display list"),
        }
    }
}

/// State-machine rule broken by a record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    #[error("per-vertex opcode outside BEGIN/END")]
    VertexOutsidePrimitive,
    #[error("opcode not allowed inside BEGIN/END (open primitive {0:?})")]
    IllegalInPrimitive(PrimitiveKind),
    #[error("BEGIN while primitive {0:?} is already open")]
    NestedBegin(PrimitiveKind),
    #[error("END without matching BEGIN")]
    EndWithoutBegin,
    #[error("invalid primitive kind {0}")]
    InvalidPrimitiveKind(u32),
    #[error("invalid matrix mode {0}")]
    InvalidMatrixMode(u32),
    #[error("matrix stack underflow")]
    MatrixStackUnderflow,
    #[error("matrix stack overflow (max depth {max})")]
    MatrixStackOverflow { max: u32 },
    #[error("attribute stack underflow")]
    AttribStackUnderflow,
    #[error("attribute stack overflow (max depth {max})")]
    AttribStackOverflow { max: u32 },
    #[error("NEW_LIST while display list {open} is still open")]
    NestedList { open: u32 },
    #[error("END_LIST without matching NEW_LIST")]
    EndListWithoutNewList,
    #[error("resource id {id} exceeds maximum {max}")]
    ResourceIdOutOfRange { id: u32, max: u32 },
    #[error("invalid texture format {0}")]
    InvalidTextureFormat(u8),
    #[error("texture data is {actual} bytes, expected {expected}")]
    TextureSizeMismatch { expected: usize, actual: usize },
    #[error("payload length {len} exceeds limit {max}")]
    PayloadTooLong { len: usize, max: usize },
}

/// Failure of a single decode call.
///
/// Offsets are byte offsets within the buffer. They point at the start of the offending record,
/// except for [`DecodeError::TruncatedStream`], where `offset` is the position of the read that
/// ran out of bytes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("stream truncated at offset {offset}: need {needed} bytes, {remaining} remaining")]
    TruncatedStream {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("unknown opcode 0x{opcode:02x} at offset {offset}")]
    UnknownOpcode { offset: usize, opcode: u8 },

    #[error("protocol violation at offset {offset} ({opcode:?}): {violation}")]
    ProtocolViolation {
        offset: usize,
        opcode: Opcode,
        violation: Violation,
    },

    #[error("{opcode:?} at offset {offset} references unknown {kind} id {id}")]
    UnknownHandle {
        offset: usize,
        opcode: Opcode,
        kind: ResourceKind,
        id: u32,
    },

    #[error(
        "unbalanced stream: open primitive {open_primitive:?}, matrix depth {matrix_depth}, attrib depth {attrib_depth}, open list {open_list:?}"
    )]
    UnbalancedStream {
        open_primitive: Option<PrimitiveKind>,
        matrix_depth: u32,
        attrib_depth: u32,
        open_list: Option<u32>,
    },
}

impl DecodeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TruncatedStream { .. } => ErrorKind::TruncatedStream,
            Self::UnknownOpcode { .. } => ErrorKind::UnknownOpcode,
            Self::ProtocolViolation { .. } => ErrorKind::ProtocolViolation,
            Self::UnknownHandle { .. } => ErrorKind::UnknownHandle,
            Self::UnbalancedStream { .. } => ErrorKind::UnbalancedStream,
        }
    }
}
