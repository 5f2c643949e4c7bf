//! Rendering-context capability driven by the decoder.
//!
//! The decoder never touches a graphics API directly. Everything it does goes through
//! [`GraphicsSink`], so an OpenGL context, a software rasterizer or the
//! [`RecordingSink`](crate::RecordingSink) can be substituted freely.

use serde::{Deserialize, Serialize};

/// Primitive kinds accepted by BEGIN. Values match the wire encoding.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveKind {
    Points = 0,
    Lines = 1,
    LineLoop = 2,
    LineStrip = 3,
    Triangles = 4,
    TriangleStrip = 5,
    TriangleFan = 6,
    Quads = 7,
    QuadStrip = 8,
    Polygon = 9,
}

impl PrimitiveKind {
    pub const fn from_u32(v: u32) -> Option<Self> {
        match v {
            0 => Some(Self::Points),
            1 => Some(Self::Lines),
            2 => Some(Self::LineLoop),
            3 => Some(Self::LineStrip),
            4 => Some(Self::Triangles),
            5 => Some(Self::TriangleStrip),
            6 => Some(Self::TriangleFan),
            7 => Some(Self::Quads),
            8 => Some(Self::QuadStrip),
            9 => Some(Self::Polygon),
            _ => None,
        }
    }
}

#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatrixMode {
    ModelView = 0,
    Projection = 1,
    Texture = 2,
}

impl MatrixMode {
    pub const fn from_u32(v: u32) -> Option<Self> {
        match v {
            0 => Some(Self::ModelView),
            1 => Some(Self::Projection),
            2 => Some(Self::Texture),
            _ => None,
        }
    }
}

/// Pixel layout of TEX_IMAGE_2D payloads.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureFormat {
    Luminance = 0,
    LuminanceAlpha = 1,
    Rgb = 2,
    Rgba = 3,
}

impl TextureFormat {
    pub const fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Luminance),
            1 => Some(Self::LuminanceAlpha),
            2 => Some(Self::Rgb),
            3 => Some(Self::Rgba),
            _ => None,
        }
    }

    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Luminance => 1,
            Self::LuminanceAlpha => 2,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
}

/// Backend texture object issued by [`GraphicsSink::create_texture`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureHandle(pub u32);

/// Backend display list issued by [`GraphicsSink::new_list`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListHandle(pub u32);

/// Text placement and style for raster text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub position: [f64; 3],
    pub font: u32,
    pub flags: u32,
    pub text: String,
}

/// Immediate-mode graphics capability.
///
/// Calls arrive in stream order on the thread that owns the rendering context. Vertex inputs are
/// widened to `f64`; backends may narrow them again.
pub trait GraphicsSink {
    fn begin(&mut self, kind: PrimitiveKind);
    fn end(&mut self);

    fn vertex(&mut self, xyz: [f64; 3]);
    fn color(&mut self, rgba: [f32; 4]);
    fn normal(&mut self, xyz: [f32; 3]);
    fn tex_coord(&mut self, st: [f32; 2]);

    fn point_size(&mut self, size: f32);
    fn line_width(&mut self, width: f32);
    fn enable(&mut self, cap: u32);
    fn disable(&mut self, cap: u32);
    fn depth_func(&mut self, func: u32);
    fn blend_func(&mut self, sfactor: u32, dfactor: u32);
    fn material(&mut self, face: u32, pname: u32, params: [f32; 4]);
    fn light(&mut self, light: u32, pname: u32, params: [f32; 4]);

    fn matrix_mode(&mut self, mode: MatrixMode);
    fn push_matrix(&mut self);
    fn pop_matrix(&mut self);
    fn load_identity(&mut self);
    fn translate(&mut self, xyz: [f64; 3]);
    fn rotate(&mut self, angle_deg: f64, axis: [f64; 3]);
    fn scale(&mut self, xyz: [f64; 3]);
    /// Column-major 4x4 matrix.
    fn mult_matrix(&mut self, m: [f64; 16]);

    fn push_attrib(&mut self, mask: u32);
    fn pop_attrib(&mut self);

    fn draw_text(&mut self, text: &TextRun);

    fn draw_box(&mut self, center: [f64; 3], size: [f32; 3]);
    fn draw_circle(&mut self, center: [f64; 3], radius: f32);
    fn draw_disk(&mut self, center: [f64; 3], inner_radius: f32, outer_radius: f32);
    fn draw_rect(&mut self, center: [f64; 3], size: [f64; 2], filled: bool);
    fn draw_sphere(&mut self, center: [f64; 3], radius: f64, slices: u32, stacks: u32);
    fn draw_cylinder(
        &mut self,
        base: [f64; 3],
        base_radius: f64,
        top_radius: f64,
        height: f64,
        slices: u32,
        stacks: u32,
    );

    /// Uploads a texture image. `data.len()` is `width * height * bytes_per_pixel`.
    fn create_texture(&mut self, desc: TextureDesc, data: &[u8]) -> TextureHandle;
    fn bind_texture(&mut self, texture: TextureHandle);
    fn draw_textured_quad(&mut self, texture: TextureHandle, corners: [[f64; 3]; 4]);
    fn delete_texture(&mut self, texture: TextureHandle);

    /// Starts compiling a display list. Subsequent calls up to [`GraphicsSink::end_list`] are
    /// recorded into it.
    fn new_list(&mut self) -> ListHandle;
    fn end_list(&mut self);
    fn call_list(&mut self, list: ListHandle);
    fn delete_list(&mut self, list: ListHandle);
}
