//! A [`GraphicsSink`] that records calls instead of drawing.

use serde::{Deserialize, Serialize};

use crate::sink::{
    GraphicsSink, ListHandle, MatrixMode, PrimitiveKind, TextRun, TextureDesc, TextureHandle,
};

/// One call made on a [`RecordingSink`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "call", content = "args", rename_all = "snake_case")]
pub enum SinkCall {
    Begin(PrimitiveKind),
    End,
    Vertex([f64; 3]),
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
    MultMatrix(Vec<f64>),
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
    CreateTexture {
        desc: TextureDesc,
        data: Vec<u8>,
        handle: TextureHandle,
    },
    BindTexture(TextureHandle),
    DrawTexturedQuad {
        texture: TextureHandle,
        corners: [[f64; 3]; 4],
    },
    DeleteTexture(TextureHandle),
    NewList(ListHandle),
    EndList,
    CallList(ListHandle),
    DeleteList(ListHandle),
}

/// Records every call in order. Handles are allocated sequentially from 1.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    calls: Vec<SinkCall>,
    next_texture: u32,
    next_list: u32,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[SinkCall] {
        &self.calls
    }

    pub fn into_calls(self) -> Vec<SinkCall> {
        self.calls
    }

    /// Forgets recorded calls; handle numbering continues.
    pub fn clear(&mut self) {
        self.calls.clear();
    }

    fn push(&mut self, call: SinkCall) {
        self.calls.push(call);
    }
}

impl GraphicsSink for RecordingSink {
    fn begin(&mut self, kind: PrimitiveKind) {
        self.push(SinkCall::Begin(kind));
    }

    fn end(&mut self) {
        self.push(SinkCall::End);
    }

    fn vertex(&mut self, xyz: [f64; 3]) {
        self.push(SinkCall::Vertex(xyz));
    }

    fn color(&mut self, rgba: [f32; 4]) {
        self.push(SinkCall::Color(rgba));
    }

    fn normal(&mut self, xyz: [f32; 3]) {
        self.push(SinkCall::Normal(xyz));
    }

    fn tex_coord(&mut self, st: [f32; 2]) {
        self.push(SinkCall::TexCoord(st));
    }

    fn point_size(&mut self, size: f32) {
        self.push(SinkCall::PointSize(size));
    }

    fn line_width(&mut self, width: f32) {
        self.push(SinkCall::LineWidth(width));
    }

    fn enable(&mut self, cap: u32) {
        self.push(SinkCall::Enable(cap));
    }

    fn disable(&mut self, cap: u32) {
        self.push(SinkCall::Disable(cap));
    }

    fn depth_func(&mut self, func: u32) {
        self.push(SinkCall::DepthFunc(func));
    }

    fn blend_func(&mut self, sfactor: u32, dfactor: u32) {
        self.push(SinkCall::BlendFunc { sfactor, dfactor });
    }

    fn material(&mut self, face: u32, pname: u32, params: [f32; 4]) {
        self.push(SinkCall::Material {
            face,
            pname,
            params,
        });
    }

    fn light(&mut self, light: u32, pname: u32, params: [f32; 4]) {
        self.push(SinkCall::Light {
            light,
            pname,
            params,
        });
    }

    fn matrix_mode(&mut self, mode: MatrixMode) {
        self.push(SinkCall::MatrixMode(mode));
    }

    fn push_matrix(&mut self) {
        self.push(SinkCall::PushMatrix);
    }

    fn pop_matrix(&mut self) {
        self.push(SinkCall::PopMatrix);
    }

    fn load_identity(&mut self) {
        self.push(SinkCall::LoadIdentity);
    }

    fn translate(&mut self, xyz: [f64; 3]) {
        self.push(SinkCall::Translate(xyz));
    }

    fn rotate(&mut self, angle_deg: f64, axis: [f64; 3]) {
        self.push(SinkCall::Rotate { angle_deg, axis });
    }

    fn scale(&mut self, xyz: [f64; 3]) {
        self.push(SinkCall::Scale(xyz));
    }

    fn mult_matrix(&mut self, m: [f64; 16]) {
        self.push(SinkCall::MultMatrix(m.to_vec()));
    }

    fn push_attrib(&mut self, mask: u32) {
        self.push(SinkCall::PushAttrib(mask));
    }

    fn pop_attrib(&mut self) {
        self.push(SinkCall::PopAttrib);
    }

    fn draw_text(&mut self, text: &TextRun) {
        self.push(SinkCall::Text(text.clone()));
    }

    fn draw_box(&mut self, center: [f64; 3], size: [f32; 3]) {
        self.push(SinkCall::Box { center, size });
    }

    fn draw_circle(&mut self, center: [f64; 3], radius: f32) {
        self.push(SinkCall::Circle { center, radius });
    }

    fn draw_disk(&mut self, center: [f64; 3], inner_radius: f32, outer_radius: f32) {
        self.push(SinkCall::Disk {
            center,
            inner_radius,
            outer_radius,
        });
    }

    fn draw_rect(&mut self, center: [f64; 3], size: [f64; 2], filled: bool) {
        self.push(SinkCall::Rect {
            center,
            size,
            filled,
        });
    }

    fn draw_sphere(&mut self, center: [f64; 3], radius: f64, slices: u32, stacks: u32) {
        self.push(SinkCall::Sphere {
            center,
            radius,
            slices,
            stacks,
        });
    }

    fn draw_cylinder(
        &mut self,
        base: [f64; 3],
        base_radius: f64,
        top_radius: f64,
        height: f64,
        slices: u32,
        stacks: u32,
    ) {
        self.push(SinkCall::Cylinder {
            base,
            base_radius,
            top_radius,
            height,
            slices,
            stacks,
        });
    }

    fn create_texture(&mut self, desc: TextureDesc, data: &[u8]) -> TextureHandle {
        self.next_texture += 1;
        let handle = TextureHandle(self.next_texture);
        self.push(SinkCall::CreateTexture {
            desc,
            data: data.to_vec(),
            handle,
        });
        handle
    }

    fn bind_texture(&mut self, texture: TextureHandle) {
        self.push(SinkCall::BindTexture(texture));
    }

    fn draw_textured_quad(&mut self, texture: TextureHandle, corners: [[f64; 3]; 4]) {
        self.push(SinkCall::DrawTexturedQuad { texture, corners });
    }

    fn delete_texture(&mut self, texture: TextureHandle) {
        self.push(SinkCall::DeleteTexture(texture));
    }

    fn new_list(&mut self) -> ListHandle {
        self.next_list += 1;
        let handle = ListHandle(self.next_list);
        self.push(SinkCall::NewList(handle));
        handle
    }

    fn end_list(&mut self) {
        self.push(SinkCall::EndList);
    }

    fn call_list(&mut self, list: ListHandle) {
        self.push(SinkCall::CallList(list));
    }

    fn delete_list(&mut self, list: ListHandle) {
        self.push(SinkCall::DeleteList(list));
    }
}
