//! LCMGL interpreter.
//!
//! [`LcmglDecoder`] replays a buffer against a [`GraphicsSink`]. Each record is decoded in full,
//! checked against the [`ExecutionState`], and only then forwarded to the sink, so a rejected
//! record never produces a sink call. Records that already ran are not undone when a later one
//! fails.

use crate::cmd::{decode_record, LcmglCmd, LcmglRecord};
use crate::config::DecoderConfig;
use crate::error::{DecodeError, ResourceKind, Violation};
use crate::reader::StreamReader;
use crate::sink::GraphicsSink;
use crate::state::{ExecutionState, OpenState};

/// Counters for one successful decode call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct DecodeSummary {
    pub bytes: usize,
    pub records: usize,
    pub primitives: usize,
    pub vertices: usize,
}

/// Session-scoped decoder.
///
/// Texture and display-list IDs created by one buffer stay valid for later buffers decoded by the
/// same instance until the stream deletes them or [`LcmglDecoder::release_all`] is called.
#[derive(Debug, Clone, Default)]
pub struct LcmglDecoder {
    config: DecoderConfig,
    state: ExecutionState,
    left_open: OpenState,
}

/// Decodes `buf` with a fresh decoder and default limits.
///
/// Resources the stream creates are left to the sink; use an [`LcmglDecoder`] to keep them
/// addressable across buffers.
pub fn decode<S: GraphicsSink + ?Sized>(
    buf: &[u8],
    sink: &mut S,
) -> Result<DecodeSummary, DecodeError> {
    LcmglDecoder::default().decode(buf, sink)
}

impl LcmglDecoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            config,
            state: ExecutionState::default(),
            left_open: OpenState::default(),
        }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn state(&self) -> &ExecutionState {
        &self.state
    }

    /// Runs every record in `buf` against `sink`.
    ///
    /// On error the per-buffer state (open primitive, stack depths, open list) is reset so the next
    /// buffer starts from `Idle`; handle tables are kept. What was open is remembered in
    /// [`LcmglDecoder::left_open`]; the sink is left as the last executed record put it.
    pub fn decode<S: GraphicsSink + ?Sized>(
        &mut self,
        buf: &[u8],
        sink: &mut S,
    ) -> Result<DecodeSummary, DecodeError> {
        let res = self.run(buf, sink);
        match &res {
            Ok(summary) => tracing::debug!(
                bytes = summary.bytes,
                records = summary.records,
                primitives = summary.primitives,
                vertices = summary.vertices,
                "lcmgl buffer decoded"
            ),
            Err(err) => {
                tracing::debug!("lcmgl buffer rejected: {err}");
                let open = self.state.halt();
                self.left_open.absorb(open);
            }
        }
        res
    }

    fn run<S: GraphicsSink + ?Sized>(
        &mut self,
        buf: &[u8],
        sink: &mut S,
    ) -> Result<DecodeSummary, DecodeError> {
        let mut reader = StreamReader::new(buf);
        let mut summary = DecodeSummary {
            bytes: buf.len(),
            ..DecodeSummary::default()
        };

        while !reader.is_empty() {
            let record = decode_record(&mut reader, &self.config)?;
            tracing::trace!(offset = record.offset, opcode = ?record.opcode, "lcmgl record");
            self.execute(record, sink, &mut summary)?;
            summary.records += 1;
        }

        self.state.check_balanced()?;
        Ok(summary)
    }

    fn execute<S: GraphicsSink + ?Sized>(
        &mut self,
        record: LcmglRecord,
        sink: &mut S,
        summary: &mut DecodeSummary,
    ) -> Result<(), DecodeError> {
        let LcmglRecord {
            offset,
            opcode,
            cmd,
        } = record;
        let violation = |violation: Violation| DecodeError::ProtocolViolation {
            offset,
            opcode,
            violation,
        };
        let unknown = |kind: ResourceKind, id: u32| DecodeError::UnknownHandle {
            offset,
            opcode,
            kind,
            id,
        };
        let max_id = self.config.max_resource_id;
        let check_id = |id: u32| {
            if id > max_id {
                Err(violation(Violation::ResourceIdOutOfRange { id, max: max_id }))
            } else {
                Ok(())
            }
        };

        self.state.admit(opcode).map_err(violation)?;

        match cmd {
            LcmglCmd::Begin(kind) => {
                sink.begin(kind);
                self.state.begin(kind);
                summary.primitives += 1;
            }
            LcmglCmd::End => {
                sink.end();
                self.state.end();
            }
            LcmglCmd::Vertex(xyz) => {
                sink.vertex(xyz);
                self.state.add_vertices(1);
                summary.vertices += 1;
            }
            LcmglCmd::Vertices(verts) => {
                for v in &verts {
                    sink.vertex([v[0] as f64, v[1] as f64, v[2] as f64]);
                }
                self.state
                    .add_vertices(u32::try_from(verts.len()).unwrap_or(u32::MAX));
                summary.vertices += verts.len();
            }
            LcmglCmd::Color(rgba) => sink.color(rgba),
            LcmglCmd::Normal(xyz) => sink.normal(xyz),
            LcmglCmd::TexCoord(st) => sink.tex_coord(st),
            LcmglCmd::PointSize(size) => sink.point_size(size),
            LcmglCmd::LineWidth(width) => sink.line_width(width),
            LcmglCmd::Enable(cap) => sink.enable(cap),
            LcmglCmd::Disable(cap) => sink.disable(cap),
            LcmglCmd::DepthFunc(func) => sink.depth_func(func),
            LcmglCmd::BlendFunc { sfactor, dfactor } => sink.blend_func(sfactor, dfactor),
            LcmglCmd::Material {
                face,
                pname,
                params,
            } => sink.material(face, pname, params),
            LcmglCmd::Light {
                light,
                pname,
                params,
            } => sink.light(light, pname, params),
            LcmglCmd::MatrixMode(mode) => sink.matrix_mode(mode),
            LcmglCmd::PushMatrix => {
                self.state
                    .check_push_matrix(self.config.max_matrix_depth)
                    .map_err(violation)?;
                sink.push_matrix();
                self.state.push_matrix();
            }
            LcmglCmd::PopMatrix => {
                self.state.check_pop_matrix().map_err(violation)?;
                sink.pop_matrix();
                self.state.pop_matrix();
            }
            LcmglCmd::LoadIdentity => sink.load_identity(),
            LcmglCmd::Translate(xyz) => sink.translate(xyz),
            LcmglCmd::Rotate { angle_deg, axis } => sink.rotate(angle_deg, axis),
            LcmglCmd::Scale(xyz) => sink.scale(xyz),
            LcmglCmd::MultMatrix(m) => sink.mult_matrix(m),
            LcmglCmd::PushAttrib(mask) => {
                self.state
                    .check_push_attrib(self.config.max_attrib_depth)
                    .map_err(violation)?;
                sink.push_attrib(mask);
                self.state.push_attrib();
            }
            LcmglCmd::PopAttrib => {
                self.state.check_pop_attrib().map_err(violation)?;
                sink.pop_attrib();
                self.state.pop_attrib();
            }
            LcmglCmd::Text(run) => sink.draw_text(&run),
            LcmglCmd::Box { center, size } => sink.draw_box(center, size),
            LcmglCmd::Circle { center, radius } => sink.draw_circle(center, radius),
            LcmglCmd::Disk {
                center,
                inner_radius,
                outer_radius,
            } => sink.draw_disk(center, inner_radius, outer_radius),
            LcmglCmd::Rect {
                center,
                size,
                filled,
            } => sink.draw_rect(center, size, filled),
            LcmglCmd::Sphere {
                center,
                radius,
                slices,
                stacks,
            } => sink.draw_sphere(center, radius, slices, stacks),
            LcmglCmd::Cylinder {
                base,
                base_radius,
                top_radius,
                height,
                slices,
                stacks,
            } => sink.draw_cylinder(base, base_radius, top_radius, height, slices, stacks),
            LcmglCmd::TexImage2d { id, desc, data } => {
                check_id(id)?;
                if let Some(prev) = self.state.textures.remove(id) {
                    sink.delete_texture(prev);
                }
                let handle = sink.create_texture(desc, &data);
                self.state.textures.insert(id, handle);
            }
            LcmglCmd::TextureDrawQuad { id, corners } => {
                let handle = self
                    .state
                    .texture(id)
                    .ok_or_else(|| unknown(ResourceKind::Texture, id))?;
                sink.draw_textured_quad(handle, corners);
            }
            LcmglCmd::BindTexture(id) => {
                let handle = self
                    .state
                    .texture(id)
                    .ok_or_else(|| unknown(ResourceKind::Texture, id))?;
                sink.bind_texture(handle);
            }
            LcmglCmd::DeleteTexture(id) => {
                let handle = self
                    .state
                    .textures
                    .remove(id)
                    .ok_or_else(|| unknown(ResourceKind::Texture, id))?;
                sink.delete_texture(handle);
            }
            LcmglCmd::NewList(id) => {
                check_id(id)?;
                self.state.check_new_list().map_err(violation)?;
                if let Some(prev) = self.state.lists.remove(id) {
                    sink.delete_list(prev);
                }
                let handle = sink.new_list();
                self.state.lists.insert(id, handle);
                self.state.open_list_with(id);
            }
            LcmglCmd::EndList => {
                self.state.check_end_list().map_err(violation)?;
                sink.end_list();
                self.state.close_list();
            }
            LcmglCmd::CallList(id) => {
                let handle = self
                    .state
                    .list(id)
                    .ok_or_else(|| unknown(ResourceKind::DisplayList, id))?;
                sink.call_list(handle);
            }
            LcmglCmd::DeleteList(id) => {
                let handle = self
                    .state
                    .lists
                    .remove(id)
                    .ok_or_else(|| unknown(ResourceKind::DisplayList, id))?;
                sink.delete_list(handle);
            }
            LcmglCmd::Nop => {}
        }
        Ok(())
    }

    /// What failed decodes have left open on the sink since the last
    /// [`LcmglDecoder::close_left_open`].
    ///
    /// The decoder's own state is already back to `Idle`; the sink is not. Cleared by
    /// [`LcmglDecoder::close_left_open`].
    pub fn left_open(&self) -> OpenState {
        self.left_open
    }

    /// Closes on `sink` whatever the last failed decode left open, so the sink can be handed to
    /// another stream. The primitive is ended first, then attribute and matrix levels are popped,
    /// then the open display list is ended.
    pub fn close_left_open<S: GraphicsSink + ?Sized>(&mut self, sink: &mut S) -> OpenState {
        let open = std::mem::take(&mut self.left_open);
        if open.primitive.is_some() {
            sink.end();
        }
        for _ in 0..open.attrib_depth {
            sink.pop_attrib();
        }
        for _ in 0..open.matrix_depth {
            sink.pop_matrix();
        }
        if open.list.is_some() {
            sink.end_list();
        }
        if !open.is_clear() {
            tracing::debug!(?open, "closed state left open by failed lcmgl buffer");
        }
        open
    }

    /// Frees every retained texture and display list through `sink` (session teardown).
    pub fn release_all<S: GraphicsSink + ?Sized>(&mut self, sink: &mut S) {
        let textures = self.state.textures.len();
        let lists = self.state.lists.len();
        for (_, handle) in self.state.textures.drain() {
            sink.delete_texture(handle);
        }
        for (_, handle) in self.state.lists.drain() {
            sink.delete_list(handle);
        }
        self.state.halt();
        tracing::debug!(textures, lists, "released lcmgl resources");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{RecordingSink, SinkCall};
    use crate::sink::{PrimitiveKind, TextureDesc, TextureFormat, TextureHandle};
    use crate::writer::LcmglWriter;

    #[test]
    fn empty_buffer_is_a_no_op() {
        let mut sink = RecordingSink::new();
        let summary = decode(&[], &mut sink).unwrap();
        assert_eq!(summary, DecodeSummary::default());
        assert!(sink.calls().is_empty());
    }

    #[test]
    fn summary_counts_primitives_and_vertices() {
        let mut w = LcmglWriter::new();
        w.begin(PrimitiveKind::Triangles);
        w.vertices3f(&[[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        w.end();
        w.begin(PrimitiveKind::Points);
        w.vertex2f(5.0, 6.0);
        w.end();
        let buf = w.finish();

        let mut sink = RecordingSink::new();
        let summary = decode(&buf, &mut sink).unwrap();
        assert_eq!(summary.records, 6);
        assert_eq!(summary.primitives, 2);
        assert_eq!(summary.vertices, 4);
        assert_eq!(summary.bytes, buf.len());
    }

    #[test]
    fn textures_persist_across_buffers() {
        let mut dec = LcmglDecoder::default();
        let mut sink = RecordingSink::new();

        let mut w = LcmglWriter::new();
        w.tex_image_2d(3, 1, 1, TextureFormat::Rgba, &[1, 2, 3, 4]);
        dec.decode(&w.finish(), &mut sink).unwrap();

        let mut w = LcmglWriter::new();
        w.bind_texture(3);
        dec.decode(&w.finish(), &mut sink).unwrap();

        assert_eq!(
            sink.calls(),
            &[
                SinkCall::CreateTexture {
                    desc: TextureDesc {
                        width: 1,
                        height: 1,
                        format: TextureFormat::Rgba,
                    },
                    data: vec![1, 2, 3, 4],
                    handle: TextureHandle(1),
                },
                SinkCall::BindTexture(TextureHandle(1)),
            ]
        );
    }

    #[test]
    fn reuploading_an_id_frees_the_previous_texture() {
        let mut w = LcmglWriter::new();
        w.tex_image_2d(0, 1, 1, TextureFormat::Luminance, &[9]);
        w.tex_image_2d(0, 1, 1, TextureFormat::Luminance, &[8]);
        let mut dec = LcmglDecoder::default();
        let mut sink = RecordingSink::new();
        dec.decode(&w.finish(), &mut sink).unwrap();

        assert_eq!(sink.calls()[1], SinkCall::DeleteTexture(TextureHandle(1)));
        assert_eq!(dec.state().texture(0), Some(TextureHandle(2)));
        assert_eq!(dec.state().texture_count(), 1);
    }

    #[test]
    fn resource_ids_above_limit_are_rejected() {
        let mut dec = LcmglDecoder::new(DecoderConfig {
            max_resource_id: 10,
            ..DecoderConfig::default()
        });
        let mut w = LcmglWriter::new();
        w.new_list(11);
        w.end_list();
        let mut sink = RecordingSink::new();
        let err = dec.decode(&w.finish(), &mut sink).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::ProtocolViolation {
                violation: Violation::ResourceIdOutOfRange { id: 11, max: 10 },
                ..
            }
        ));
        assert!(sink.calls().is_empty());
    }

    #[test]
    fn failed_buffer_leaves_decoder_idle() {
        let mut dec = LcmglDecoder::default();
        let mut sink = RecordingSink::new();

        let mut w = LcmglWriter::new();
        w.push_matrix();
        w.begin(PrimitiveKind::Lines);
        let err = dec.decode(&w.finish(), &mut sink).unwrap_err();
        assert!(matches!(err, DecodeError::UnbalancedStream { .. }));

        let mut w = LcmglWriter::new();
        w.begin(PrimitiveKind::Points);
        w.vertex3f(0.0, 0.0, 0.0);
        w.end();
        dec.decode(&w.finish(), &mut sink).unwrap();
        assert_eq!(dec.state().matrix_depth(), 0);
    }

    #[test]
    fn release_all_frees_everything() {
        let mut dec = LcmglDecoder::default();
        let mut sink = RecordingSink::new();
        let mut w = LcmglWriter::new();
        w.tex_image_2d(1, 1, 1, TextureFormat::Luminance, &[0]);
        w.new_list(2);
        w.end_list();
        dec.decode(&w.finish(), &mut sink).unwrap();
        sink.clear();

        dec.release_all(&mut sink);
        assert_eq!(
            sink.calls(),
            &[
                SinkCall::DeleteTexture(TextureHandle(1)),
                SinkCall::DeleteList(crate::sink::ListHandle(1)),
            ]
        );
        assert_eq!(dec.state().texture_count(), 0);
        assert_eq!(dec.state().list_count(), 0);
    }

    #[test]
    fn close_left_open_unwinds_failed_buffers() {
        let mut w = LcmglWriter::new();
        w.new_list(2);
        w.push_matrix();
        w.push_attrib(1);
        w.push_matrix();
        w.begin(PrimitiveKind::Lines);
        w.vertex2f(0.0, 0.0);
        w.line_width(3.0);
        let mut dec = LcmglDecoder::default();
        let mut sink = RecordingSink::new();
        let err = dec.decode(&w.finish(), &mut sink).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::ProtocolViolation {
                violation: Violation::IllegalInPrimitive(PrimitiveKind::Lines),
                ..
            }
        ));
        assert_eq!(
            dec.left_open(),
            OpenState {
                primitive: Some(PrimitiveKind::Lines),
                matrix_depth: 2,
                attrib_depth: 1,
                list: Some(2),
            }
        );

        sink.clear();
        dec.close_left_open(&mut sink);
        assert_eq!(
            sink.calls(),
            &[
                SinkCall::End,
                SinkCall::PopAttrib,
                SinkCall::PopMatrix,
                SinkCall::PopMatrix,
                SinkCall::EndList,
            ]
        );
        assert!(dec.left_open().is_clear());

        sink.clear();
        assert!(dec.close_left_open(&mut sink).is_clear());
        assert!(sink.calls().is_empty());
    }

    #[test]
    fn left_open_accumulates_until_closed() {
        let mut w = LcmglWriter::new();
        w.push_matrix();
        let buf = w.finish();
        let mut dec = LcmglDecoder::default();
        let mut sink = RecordingSink::new();
        assert!(dec.decode(&buf, &mut sink).is_err());
        assert!(dec.decode(&buf, &mut sink).is_err());
        assert_eq!(dec.left_open().matrix_depth, 2);
        assert_eq!(dec.state().matrix_depth(), 0);
    }
}
