//! Typed LCMGL records.
//!
//! A record is decoded completely (tag plus every operand) before anything executes, so a record
//! that is cut short never reaches the sink.

use crate::config::DecoderConfig;
use crate::error::{DecodeError, Violation};
use crate::opcode::Opcode;
use crate::reader::{LengthError, StreamReader};
use crate::sink::{MatrixMode, PrimitiveKind, TextRun, TextureDesc, TextureFormat};

/// Font used by the short TEXT record.
pub const DEFAULT_FONT: u32 = 0;

#[derive(Clone, Debug, PartialEq)]
pub enum LcmglCmd {
    Begin(PrimitiveKind),
    End,
    Vertex([f64; 3]),
    Vertices(Vec<[f32; 3]>),
    Color([f32; 4]),
    Normal([f32; 3]),
    TexCoord([f32; 2]),
    PointSize(f32),
    LineWidth(f32),
    Enable(u32),
    Disable(u32),
    DepthFunc(u32),
    BlendFunc {
        sfactor: u32,
        dfactor: u32,
    },
    Material {
        face: u32,
        pname: u32,
        params: [f32; 4],
    },
    Light {
        light: u32,
        pname: u32,
        params: [f32; 4],
    },
    MatrixMode(MatrixMode),
    PushMatrix,
    PopMatrix,
    LoadIdentity,
    Translate([f64; 3]),
    Rotate {
        angle_deg: f64,
        axis: [f64; 3],
    },
    Scale([f64; 3]),
    MultMatrix([f64; 16]),
    PushAttrib(u32),
    PopAttrib,
    Text(TextRun),
    Box {
        center: [f64; 3],
        size: [f32; 3],
    },
    Circle {
        center: [f64; 3],
        radius: f32,
    },
    Disk {
        center: [f64; 3],
        inner_radius: f32,
        outer_radius: f32,
    },
    Rect {
        center: [f64; 3],
        size: [f64; 2],
        filled: bool,
    },
    Sphere {
        center: [f64; 3],
        radius: f64,
        slices: u32,
        stacks: u32,
    },
    Cylinder {
        base: [f64; 3],
        base_radius: f64,
        top_radius: f64,
        height: f64,
        slices: u32,
        stacks: u32,
    },
    TexImage2d {
        id: u32,
        desc: TextureDesc,
        data: Vec<u8>,
    },
    TextureDrawQuad {
        id: u32,
        corners: [[f64; 3]; 4],
    },
    BindTexture(u32),
    DeleteTexture(u32),
    NewList(u32),
    EndList,
    CallList(u32),
    DeleteList(u32),
    Nop,
}

/// One decoded record and where it started.
#[derive(Clone, Debug, PartialEq)]
pub struct LcmglRecord {
    pub offset: usize,
    pub opcode: Opcode,
    pub cmd: LcmglCmd,
}

fn widen3(v: [f32; 3]) -> [f64; 3] {
    [v[0] as f64, v[1] as f64, v[2] as f64]
}

fn read_counted<'a>(
    r: &mut StreamReader<'a>,
    elem_size: usize,
    max: usize,
    offset: usize,
    opcode: Opcode,
) -> Result<(usize, &'a [u8]), DecodeError> {
    r.read_counted(elem_size, max).map_err(|err| match err {
        LengthError::Decode(err) => err,
        LengthError::TooLong { len, max } => DecodeError::ProtocolViolation {
            offset,
            opcode,
            violation: Violation::PayloadTooLong { len, max },
        },
    })
}

/// Decodes the record starting at the reader's current position.
pub fn decode_record<'a>(
    r: &mut StreamReader<'a>,
    config: &DecoderConfig,
) -> Result<LcmglRecord, DecodeError> {
    let offset = r.offset();
    let tag = r.read_u8()?;
    let opcode = Opcode::from_u8(tag).ok_or(DecodeError::UnknownOpcode {
        offset,
        opcode: tag,
    })?;
    let violation = |violation| DecodeError::ProtocolViolation {
        offset,
        opcode,
        violation,
    };

    let cmd = match opcode {
        Opcode::Begin => {
            let raw = r.read_u32()?;
            let kind = PrimitiveKind::from_u32(raw)
                .ok_or_else(|| violation(Violation::InvalidPrimitiveKind(raw)))?;
            LcmglCmd::Begin(kind)
        }
        Opcode::End => LcmglCmd::End,
        Opcode::Vertex3f => LcmglCmd::Vertex(widen3(r.read_f32x3()?)),
        Opcode::Vertex3d => LcmglCmd::Vertex(r.read_f64x3()?),
        Opcode::Vertex2d => LcmglCmd::Vertex([r.read_f64()?, r.read_f64()?, 0.0]),
        Opcode::Vertex2f => LcmglCmd::Vertex([r.read_f32()? as f64, r.read_f32()? as f64, 0.0]),
        Opcode::Vertices3f => {
            let (count, bytes) = read_counted(r, 12, config.max_array_len, offset, opcode)?;
            let mut sub = StreamReader::new(bytes);
            let mut verts = Vec::with_capacity(count);
            for _ in 0..count {
                verts.push(sub.read_f32x3()?);
            }
            LcmglCmd::Vertices(verts)
        }
        Opcode::Color3f => {
            let [red, green, blue] = r.read_f32x3()?;
            LcmglCmd::Color([red, green, blue, 1.0])
        }
        Opcode::Color4f => LcmglCmd::Color(r.read_f32x4()?),
        Opcode::Normal3f => LcmglCmd::Normal(r.read_f32x3()?),
        Opcode::TexCoord2f => LcmglCmd::TexCoord([r.read_f32()?, r.read_f32()?]),
        Opcode::PointSize => LcmglCmd::PointSize(r.read_f32()?),
        Opcode::LineWidth => LcmglCmd::LineWidth(r.read_f32()?),
        Opcode::Enable => LcmglCmd::Enable(r.read_u32()?),
        Opcode::Disable => LcmglCmd::Disable(r.read_u32()?),
        Opcode::DepthFunc => LcmglCmd::DepthFunc(r.read_u32()?),
        Opcode::BlendFunc => LcmglCmd::BlendFunc {
            sfactor: r.read_u32()?,
            dfactor: r.read_u32()?,
        },
        Opcode::Materialf => LcmglCmd::Material {
            face: r.read_u32()?,
            pname: r.read_u32()?,
            params: r.read_f32x4()?,
        },
        Opcode::Lightfv => LcmglCmd::Light {
            light: r.read_u32()?,
            pname: r.read_u32()?,
            params: r.read_f32x4()?,
        },
        Opcode::MatrixMode => {
            let raw = r.read_u32()?;
            let mode = MatrixMode::from_u32(raw)
                .ok_or_else(|| violation(Violation::InvalidMatrixMode(raw)))?;
            LcmglCmd::MatrixMode(mode)
        }
        Opcode::PushMatrix => LcmglCmd::PushMatrix,
        Opcode::PopMatrix => LcmglCmd::PopMatrix,
        Opcode::LoadIdentity => LcmglCmd::LoadIdentity,
        Opcode::Translated => LcmglCmd::Translate(r.read_f64x3()?),
        Opcode::Rotated => LcmglCmd::Rotate {
            angle_deg: r.read_f64()?,
            axis: r.read_f64x3()?,
        },
        Opcode::Scalef => LcmglCmd::Scale(widen3(r.read_f32x3()?)),
        Opcode::MultMatrixf => {
            let mut m = [0.0; 16];
            for v in &mut m {
                *v = r.read_f32()? as f64;
            }
            LcmglCmd::MultMatrix(m)
        }
        Opcode::MultMatrixd => {
            let mut m = [0.0; 16];
            for v in &mut m {
                *v = r.read_f64()?;
            }
            LcmglCmd::MultMatrix(m)
        }
        Opcode::PushAttrib => LcmglCmd::PushAttrib(r.read_u32()?),
        Opcode::PopAttrib => LcmglCmd::PopAttrib,
        Opcode::Text => {
            let position = r.read_f64x3()?;
            let (_, bytes) = read_counted(r, 1, config.max_text_len, offset, opcode)?;
            LcmglCmd::Text(TextRun {
                position,
                font: DEFAULT_FONT,
                flags: 0,
                text: String::from_utf8_lossy(bytes).into_owned(),
            })
        }
        Opcode::TextLong => {
            let font = r.read_u32()?;
            let flags = r.read_u32()?;
            let position = r.read_f64x3()?;
            let (_, bytes) = read_counted(r, 1, config.max_text_len, offset, opcode)?;
            LcmglCmd::Text(TextRun {
                position,
                font,
                flags,
                text: String::from_utf8_lossy(bytes).into_owned(),
            })
        }
        Opcode::Box => LcmglCmd::Box {
            center: r.read_f64x3()?,
            size: r.read_f32x3()?,
        },
        Opcode::Circle => LcmglCmd::Circle {
            center: r.read_f64x3()?,
            radius: r.read_f32()?,
        },
        Opcode::Disk => LcmglCmd::Disk {
            center: r.read_f64x3()?,
            inner_radius: r.read_f32()?,
            outer_radius: r.read_f32()?,
        },
        Opcode::Rect => LcmglCmd::Rect {
            center: r.read_f64x3()?,
            size: [r.read_f64()?, r.read_f64()?],
            filled: r.read_u8()? != 0,
        },
        Opcode::Sphere => LcmglCmd::Sphere {
            center: r.read_f64x3()?,
            radius: r.read_f64()?,
            slices: r.read_u32()?,
            stacks: r.read_u32()?,
        },
        Opcode::Cylinder => LcmglCmd::Cylinder {
            base: r.read_f64x3()?,
            base_radius: r.read_f64()?,
            top_radius: r.read_f64()?,
            height: r.read_f64()?,
            slices: r.read_u32()?,
            stacks: r.read_u32()?,
        },
        Opcode::TexImage2d => {
            let id = r.read_u32()?;
            let width = r.read_u32()?;
            let height = r.read_u32()?;
            let format_raw = r.read_u8()?;
            let (_, data) = read_counted(r, 1, config.max_texture_bytes, offset, opcode)?;
            let format = TextureFormat::from_u8(format_raw)
                .ok_or_else(|| violation(Violation::InvalidTextureFormat(format_raw)))?;
            let expected = (width as usize)
                .saturating_mul(height as usize)
                .saturating_mul(format.bytes_per_pixel());
            if data.len() != expected {
                return Err(violation(Violation::TextureSizeMismatch {
                    expected,
                    actual: data.len(),
                }));
            }
            LcmglCmd::TexImage2d {
                id,
                desc: TextureDesc {
                    width,
                    height,
                    format,
                },
                data: data.to_vec(),
            }
        }
        Opcode::TextureDrawQuad => {
            let id = r.read_u32()?;
            let mut corners = [[0.0; 3]; 4];
            for corner in &mut corners {
                *corner = r.read_f64x3()?;
            }
            LcmglCmd::TextureDrawQuad { id, corners }
        }
        Opcode::BindTexture => LcmglCmd::BindTexture(r.read_u32()?),
        Opcode::DeleteTexture => LcmglCmd::DeleteTexture(r.read_u32()?),
        Opcode::NewList => LcmglCmd::NewList(r.read_u32()?),
        Opcode::EndList => LcmglCmd::EndList,
        Opcode::CallList => LcmglCmd::CallList(r.read_u32()?),
        Opcode::DeleteList => LcmglCmd::DeleteList(r.read_u32()?),
        Opcode::Nop => LcmglCmd::Nop,
    };

    Ok(LcmglRecord {
        offset,
        opcode,
        cmd,
    })
}

/// Iterator over the records of a buffer, stopping after the first error.
///
/// Decoding only; no state rules are applied. Useful for dumping captured streams.
pub struct LcmglRecordIter<'a> {
    reader: StreamReader<'a>,
    config: DecoderConfig,
    failed: bool,
}

impl<'a> LcmglRecordIter<'a> {
    pub fn new(buf: &'a [u8], config: DecoderConfig) -> Self {
        Self {
            reader: StreamReader::new(buf),
            config,
            failed: false,
        }
    }
}

impl Iterator for LcmglRecordIter<'_> {
    type Item = Result<LcmglRecord, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.reader.is_empty() {
            return None;
        }
        let rec = decode_record(&mut self.reader, &self.config);
        if rec.is_err() {
            self.failed = true;
        }
        Some(rec)
    }
}
