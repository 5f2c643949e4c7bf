//! LCMGL opcode tags.
//!
//! Each record on the wire starts with one of these tags as a single byte. The operand layout that
//! follows is fixed per opcode; see [`crate::cmd::LcmglCmd`].

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Opcode {
    Begin = 0x04,
    End = 0x05,
    Vertex3f = 0x06,
    Vertex3d = 0x07,
    Color3f = 0x08,
    Color4f = 0x09,
    PointSize = 0x0A,
    Enable = 0x0B,
    Disable = 0x0C,
    Box = 0x0D,
    Circle = 0x0E,
    LineWidth = 0x0F,
    Nop = 0x10,
    Vertex2d = 0x11,
    Vertex2f = 0x12,
    Text = 0x13,
    Disk = 0x14,
    Translated = 0x15,
    Rotated = 0x16,
    LoadIdentity = 0x17,
    PushMatrix = 0x18,
    PopMatrix = 0x19,
    Rect = 0x1A,
    TextLong = 0x1B,
    Normal3f = 0x1C,
    Scalef = 0x1D,
    MultMatrixf = 0x1E,
    MultMatrixd = 0x1F,
    Materialf = 0x20,
    PushAttrib = 0x21,
    PopAttrib = 0x22,
    DepthFunc = 0x23,
    TexImage2d = 0x24,
    TextureDrawQuad = 0x25,
    Sphere = 0x26,
    Cylinder = 0x27,
    BindTexture = 0x28,
    DeleteTexture = 0x29,
    NewList = 0x2A,
    EndList = 0x2B,
    CallList = 0x2C,
    DeleteList = 0x2D,
    MatrixMode = 0x2E,
    Lightfv = 0x2F,
    BlendFunc = 0x30,
    Vertices3f = 0x31,
    TexCoord2f = 0x32,
}

impl Opcode {
    pub const fn from_u8(v: u8) -> Option<Self> {
        match v {
            0x04 => Some(Self::Begin),
            0x05 => Some(Self::End),
            0x06 => Some(Self::Vertex3f),
            0x07 => Some(Self::Vertex3d),
            0x08 => Some(Self::Color3f),
            0x09 => Some(Self::Color4f),
            0x0A => Some(Self::PointSize),
            0x0B => Some(Self::Enable),
            0x0C => Some(Self::Disable),
            0x0D => Some(Self::Box),
            0x0E => Some(Self::Circle),
            0x0F => Some(Self::LineWidth),
            0x10 => Some(Self::Nop),
            0x11 => Some(Self::Vertex2d),
            0x12 => Some(Self::Vertex2f),
            0x13 => Some(Self::Text),
            0x14 => Some(Self::Disk),
            0x15 => Some(Self::Translated),
            0x16 => Some(Self::Rotated),
            0x17 => Some(Self::LoadIdentity),
            0x18 => Some(Self::PushMatrix),
            0x19 => Some(Self::PopMatrix),
            0x1A => Some(Self::Rect),
            0x1B => Some(Self::TextLong),
            0x1C => Some(Self::Normal3f),
            0x1D => Some(Self::Scalef),
            0x1E => Some(Self::MultMatrixf),
            0x1F => Some(Self::MultMatrixd),
            0x20 => Some(Self::Materialf),
            0x21 => Some(Self::PushAttrib),
            0x22 => Some(Self::PopAttrib),
            0x23 => Some(Self::DepthFunc),
            0x24 => Some(Self::TexImage2d),
            0x25 => Some(Self::TextureDrawQuad),
            0x26 => Some(Self::Sphere),
            0x27 => Some(Self::Cylinder),
            0x28 => Some(Self::BindTexture),
            0x29 => Some(Self::DeleteTexture),
            0x2A => Some(Self::NewList),
            0x2B => Some(Self::EndList),
            0x2C => Some(Self::CallList),
            0x2D => Some(Self::DeleteList),
            0x2E => Some(Self::MatrixMode),
            0x2F => Some(Self::Lightfv),
            0x30 => Some(Self::BlendFunc),
            0x31 => Some(Self::Vertices3f),
            0x32 => Some(Self::TexCoord2f),
            _ => None,
        }
    }

    /// Per-vertex attribute opcodes. These are only legal between BEGIN and END.
    pub const fn is_per_vertex(self) -> bool {
        matches!(
            self,
            Self::Vertex3f
                | Self::Vertex3d
                | Self::Vertex2d
                | Self::Vertex2f
                | Self::Vertices3f
                | Self::Color3f
                | Self::Color4f
                | Self::Normal3f
                | Self::TexCoord2f
        )
    }

    /// Opcodes accepted while a primitive is open.
    pub const fn allowed_in_primitive(self) -> bool {
        self.is_per_vertex()
            || matches!(
                self,
                Self::End | Self::Materialf | Self::CallList | Self::Nop
            )
    }
}
