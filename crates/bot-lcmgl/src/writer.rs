//! Safe LCMGL stream builder.
//!
//! Intended for producers, tests and host-side tooling that need canonical records (big-endian
//! scalars, `u32` length prefixes).

use crate::opcode::Opcode;
use crate::sink::{MatrixMode, PrimitiveKind, TextureFormat};

#[derive(Debug, Default, Clone)]
pub struct LcmglWriter {
    buf: Vec<u8>,
}

impl LcmglWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.buf.clear();
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    fn op(&mut self, opcode: Opcode) {
        self.buf.push(opcode as u8);
    }

    fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    fn f32(&mut self, v: f32) {
        self.u32(v.to_bits());
    }

    fn f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_bits().to_be_bytes());
    }

    fn f64x3(&mut self, v: [f64; 3]) {
        v.into_iter().for_each(|c| self.f64(c));
    }

    fn counted_bytes(&mut self, bytes: &[u8]) {
        assert!(
            bytes.len() <= u32::MAX as usize,
            "payload too large for u32 length prefix"
        );
        self.u32(bytes.len() as u32);
        self.buf.extend_from_slice(bytes);
    }

    pub fn begin(&mut self, kind: PrimitiveKind) {
        self.op(Opcode::Begin);
        self.u32(kind as u32);
    }

    pub fn end(&mut self) {
        self.op(Opcode::End);
    }

    pub fn vertex2f(&mut self, x: f32, y: f32) {
        self.op(Opcode::Vertex2f);
        self.f32(x);
        self.f32(y);
    }

    pub fn vertex2d(&mut self, x: f64, y: f64) {
        self.op(Opcode::Vertex2d);
        self.f64(x);
        self.f64(y);
    }

    pub fn vertex3f(&mut self, x: f32, y: f32, z: f32) {
        self.op(Opcode::Vertex3f);
        self.f32(x);
        self.f32(y);
        self.f32(z);
    }

    pub fn vertex3d(&mut self, x: f64, y: f64, z: f64) {
        self.op(Opcode::Vertex3d);
        self.f64x3([x, y, z]);
    }

    pub fn vertices3f(&mut self, verts: &[[f32; 3]]) {
        assert!(
            verts.len() <= u32::MAX as usize,
            "vertex array too large for u32 count"
        );
        self.op(Opcode::Vertices3f);
        self.u32(verts.len() as u32);
        for v in verts {
            v.iter().for_each(|&c| self.f32(c));
        }
    }

    pub fn color3f(&mut self, r: f32, g: f32, b: f32) {
        self.op(Opcode::Color3f);
        self.f32(r);
        self.f32(g);
        self.f32(b);
    }

    pub fn color4f(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.op(Opcode::Color4f);
        self.f32(r);
        self.f32(g);
        self.f32(b);
        self.f32(a);
    }

    pub fn normal3f(&mut self, x: f32, y: f32, z: f32) {
        self.op(Opcode::Normal3f);
        self.f32(x);
        self.f32(y);
        self.f32(z);
    }

    pub fn tex_coord2f(&mut self, s: f32, t: f32) {
        self.op(Opcode::TexCoord2f);
        self.f32(s);
        self.f32(t);
    }

    pub fn point_size(&mut self, size: f32) {
        self.op(Opcode::PointSize);
        self.f32(size);
    }

    pub fn line_width(&mut self, width: f32) {
        self.op(Opcode::LineWidth);
        self.f32(width);
    }

    pub fn enable(&mut self, cap: u32) {
        self.op(Opcode::Enable);
        self.u32(cap);
    }

    pub fn disable(&mut self, cap: u32) {
        self.op(Opcode::Disable);
        self.u32(cap);
    }

    pub fn depth_func(&mut self, func: u32) {
        self.op(Opcode::DepthFunc);
        self.u32(func);
    }

    pub fn blend_func(&mut self, sfactor: u32, dfactor: u32) {
        self.op(Opcode::BlendFunc);
        self.u32(sfactor);
        self.u32(dfactor);
    }

    pub fn materialf(&mut self, face: u32, pname: u32, params: [f32; 4]) {
        self.op(Opcode::Materialf);
        self.u32(face);
        self.u32(pname);
        params.into_iter().for_each(|c| self.f32(c));
    }

    pub fn lightfv(&mut self, light: u32, pname: u32, params: [f32; 4]) {
        self.op(Opcode::Lightfv);
        self.u32(light);
        self.u32(pname);
        params.into_iter().for_each(|c| self.f32(c));
    }

    pub fn matrix_mode(&mut self, mode: MatrixMode) {
        self.op(Opcode::MatrixMode);
        self.u32(mode as u32);
    }

    pub fn push_matrix(&mut self) {
        self.op(Opcode::PushMatrix);
    }

    pub fn pop_matrix(&mut self) {
        self.op(Opcode::PopMatrix);
    }

    pub fn load_identity(&mut self) {
        self.op(Opcode::LoadIdentity);
    }

    pub fn translated(&mut self, x: f64, y: f64, z: f64) {
        self.op(Opcode::Translated);
        self.f64x3([x, y, z]);
    }

    pub fn rotated(&mut self, angle_deg: f64, x: f64, y: f64, z: f64) {
        self.op(Opcode::Rotated);
        self.f64(angle_deg);
        self.f64x3([x, y, z]);
    }

    pub fn scalef(&mut self, x: f32, y: f32, z: f32) {
        self.op(Opcode::Scalef);
        self.f32(x);
        self.f32(y);
        self.f32(z);
    }

    pub fn mult_matrixf(&mut self, m: &[f32; 16]) {
        self.op(Opcode::MultMatrixf);
        m.iter().for_each(|&c| self.f32(c));
    }

    pub fn mult_matrixd(&mut self, m: &[f64; 16]) {
        self.op(Opcode::MultMatrixd);
        m.iter().for_each(|&c| self.f64(c));
    }

    pub fn push_attrib(&mut self, mask: u32) {
        self.op(Opcode::PushAttrib);
        self.u32(mask);
    }

    pub fn pop_attrib(&mut self) {
        self.op(Opcode::PopAttrib);
    }

    pub fn text(&mut self, position: [f64; 3], text: &str) {
        self.op(Opcode::Text);
        self.f64x3(position);
        self.counted_bytes(text.as_bytes());
    }

    pub fn text_ex(&mut self, position: [f64; 3], font: u32, flags: u32, text: &str) {
        self.op(Opcode::TextLong);
        self.u32(font);
        self.u32(flags);
        self.f64x3(position);
        self.counted_bytes(text.as_bytes());
    }

    pub fn draw_box(&mut self, center: [f64; 3], size: [f32; 3]) {
        self.op(Opcode::Box);
        self.f64x3(center);
        size.into_iter().for_each(|c| self.f32(c));
    }

    pub fn circle(&mut self, center: [f64; 3], radius: f32) {
        self.op(Opcode::Circle);
        self.f64x3(center);
        self.f32(radius);
    }

    pub fn disk(&mut self, center: [f64; 3], inner_radius: f32, outer_radius: f32) {
        self.op(Opcode::Disk);
        self.f64x3(center);
        self.f32(inner_radius);
        self.f32(outer_radius);
    }

    pub fn rect(&mut self, center: [f64; 3], size: [f64; 2], filled: bool) {
        self.op(Opcode::Rect);
        self.f64x3(center);
        self.f64(size[0]);
        self.f64(size[1]);
        self.u8(filled as u8);
    }

    pub fn sphere(&mut self, center: [f64; 3], radius: f64, slices: u32, stacks: u32) {
        self.op(Opcode::Sphere);
        self.f64x3(center);
        self.f64(radius);
        self.u32(slices);
        self.u32(stacks);
    }

    pub fn cylinder(
        &mut self,
        base: [f64; 3],
        base_radius: f64,
        top_radius: f64,
        height: f64,
        slices: u32,
        stacks: u32,
    ) {
        self.op(Opcode::Cylinder);
        self.f64x3(base);
        self.f64(base_radius);
        self.f64(top_radius);
        self.f64(height);
        self.u32(slices);
        self.u32(stacks);
    }

    pub fn tex_image_2d(
        &mut self,
        id: u32,
        width: u32,
        height: u32,
        format: TextureFormat,
        data: &[u8],
    ) {
        self.tex_image_2d_raw(id, width, height, format as u8, data);
    }

    /// Like [`LcmglWriter::tex_image_2d`] but without validating `format` or `data.len()`.
    pub fn tex_image_2d_raw(&mut self, id: u32, width: u32, height: u32, format: u8, data: &[u8]) {
        self.op(Opcode::TexImage2d);
        self.u32(id);
        self.u32(width);
        self.u32(height);
        self.u8(format);
        self.counted_bytes(data);
    }

    pub fn texture_draw_quad(&mut self, id: u32, corners: [[f64; 3]; 4]) {
        self.op(Opcode::TextureDrawQuad);
        self.u32(id);
        corners.into_iter().for_each(|c| self.f64x3(c));
    }

    pub fn bind_texture(&mut self, id: u32) {
        self.op(Opcode::BindTexture);
        self.u32(id);
    }

    pub fn delete_texture(&mut self, id: u32) {
        self.op(Opcode::DeleteTexture);
        self.u32(id);
    }

    pub fn new_list(&mut self, id: u32) {
        self.op(Opcode::NewList);
        self.u32(id);
    }

    pub fn end_list(&mut self) {
        self.op(Opcode::EndList);
    }

    pub fn call_list(&mut self, id: u32) {
        self.op(Opcode::CallList);
        self.u32(id);
    }

    pub fn delete_list(&mut self, id: u32) {
        self.op(Opcode::DeleteList);
        self.u32(id);
    }

    pub fn nop(&mut self) {
        self.op(Opcode::Nop);
    }
}
