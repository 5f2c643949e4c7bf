//! Interpreter state carried between records (and, for the handle tables, between buffers).

use crate::error::{DecodeError, Violation};
use crate::handles::HandleTable;
use crate::opcode::Opcode;
use crate::sink::{ListHandle, PrimitiveKind, TextureHandle};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimitiveState {
    Idle,
    InPrimitive(PrimitiveKind),
}

/// Per-buffer state that was still open when a decode stopped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OpenState {
    pub primitive: Option<PrimitiveKind>,
    pub matrix_depth: u32,
    pub attrib_depth: u32,
    pub list: Option<u32>,
}

impl OpenState {
    pub fn is_clear(&self) -> bool {
        *self == Self::default()
    }

    /// Adds state left open by a later decode on the same sink.
    pub fn absorb(&mut self, later: OpenState) {
        self.primitive = self.primitive.or(later.primitive);
        self.matrix_depth = self.matrix_depth.saturating_add(later.matrix_depth);
        self.attrib_depth = self.attrib_depth.saturating_add(later.attrib_depth);
        self.list = self.list.or(later.list);
    }
}

#[derive(Debug, Clone)]
pub struct ExecutionState {
    primitive: PrimitiveState,
    vertices_in_primitive: u32,
    matrix_depth: u32,
    attrib_depth: u32,
    open_list: Option<u32>,
    pub(crate) textures: HandleTable<TextureHandle>,
    pub(crate) lists: HandleTable<ListHandle>,
}

impl Default for ExecutionState {
    fn default() -> Self {
        Self {
            primitive: PrimitiveState::Idle,
            vertices_in_primitive: 0,
            matrix_depth: 0,
            attrib_depth: 0,
            open_list: None,
            textures: HandleTable::new(),
            lists: HandleTable::new(),
        }
    }
}

impl ExecutionState {
    pub fn primitive(&self) -> PrimitiveState {
        self.primitive
    }

    pub fn vertices_in_primitive(&self) -> u32 {
        self.vertices_in_primitive
    }

    pub fn matrix_depth(&self) -> u32 {
        self.matrix_depth
    }

    pub fn attrib_depth(&self) -> u32 {
        self.attrib_depth
    }

    pub fn open_list(&self) -> Option<u32> {
        self.open_list
    }

    pub fn texture(&self, id: u32) -> Option<TextureHandle> {
        self.textures.get(id)
    }

    pub fn list(&self, id: u32) -> Option<ListHandle> {
        self.lists.get(id)
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn list_count(&self) -> usize {
        self.lists.len()
    }

    /// Checks whether `opcode` may run in the current primitive state.
    pub fn admit(&self, opcode: Opcode) -> Result<(), Violation> {
        match self.primitive {
            PrimitiveState::Idle if opcode.is_per_vertex() => {
                Err(Violation::VertexOutsidePrimitive)
            }
            PrimitiveState::Idle if opcode == Opcode::End => Err(Violation::EndWithoutBegin),
            PrimitiveState::InPrimitive(kind) if opcode == Opcode::Begin => {
                Err(Violation::NestedBegin(kind))
            }
            PrimitiveState::InPrimitive(kind) if !opcode.allowed_in_primitive() => {
                Err(Violation::IllegalInPrimitive(kind))
            }
            _ => Ok(()),
        }
    }

    pub fn begin(&mut self, kind: PrimitiveKind) {
        self.primitive = PrimitiveState::InPrimitive(kind);
        self.vertices_in_primitive = 0;
    }

    pub fn end(&mut self) {
        self.primitive = PrimitiveState::Idle;
    }

    pub fn add_vertices(&mut self, n: u32) {
        self.vertices_in_primitive = self.vertices_in_primitive.saturating_add(n);
    }

    pub fn check_push_matrix(&self, max: u32) -> Result<(), Violation> {
        if self.matrix_depth >= max {
            return Err(Violation::MatrixStackOverflow { max });
        }
        Ok(())
    }

    pub fn push_matrix(&mut self) {
        self.matrix_depth += 1;
    }

    pub fn check_pop_matrix(&self) -> Result<(), Violation> {
        if self.matrix_depth == 0 {
            return Err(Violation::MatrixStackUnderflow);
        }
        Ok(())
    }

    pub fn pop_matrix(&mut self) {
        self.matrix_depth -= 1;
    }

    pub fn check_push_attrib(&self, max: u32) -> Result<(), Violation> {
        if self.attrib_depth >= max {
            return Err(Violation::AttribStackOverflow { max });
        }
        Ok(())
    }

    pub fn push_attrib(&mut self) {
        self.attrib_depth += 1;
    }

    pub fn check_pop_attrib(&self) -> Result<(), Violation> {
        if self.attrib_depth == 0 {
            return Err(Violation::AttribStackUnderflow);
        }
        Ok(())
    }

    pub fn pop_attrib(&mut self) {
        self.attrib_depth -= 1;
    }

    pub fn check_new_list(&self) -> Result<(), Violation> {
        match self.open_list {
            Some(open) => Err(Violation::NestedList { open }),
            None => Ok(()),
        }
    }

    pub fn open_list_with(&mut self, id: u32) {
        self.open_list = Some(id);
    }

    pub fn check_end_list(&self) -> Result<(), Violation> {
        match self.open_list {
            Some(_) => Ok(()),
            None => Err(Violation::EndListWithoutNewList),
        }
    }

    pub fn close_list(&mut self) {
        self.open_list = None;
    }

    pub fn open_state(&self) -> OpenState {
        OpenState {
            primitive: match self.primitive {
                PrimitiveState::Idle => None,
                PrimitiveState::InPrimitive(kind) => Some(kind),
            },
            matrix_depth: self.matrix_depth,
            attrib_depth: self.attrib_depth,
            list: self.open_list,
        }
    }

    /// End-of-stream balance check.
    pub fn check_balanced(&self) -> Result<(), DecodeError> {
        let open = self.open_state();
        if open.is_clear() {
            return Ok(());
        }
        Err(DecodeError::UnbalancedStream {
            open_primitive: open.primitive,
            matrix_depth: open.matrix_depth,
            attrib_depth: open.attrib_depth,
            open_list: open.list,
        })
    }

    /// Returns the per-buffer state to `Idle` with empty stacks and reports what was open.
    /// Handle tables are kept.
    pub fn halt(&mut self) -> OpenState {
        let open = self.open_state();
        self.primitive = PrimitiveState::Idle;
        self.vertices_in_primitive = 0;
        self.matrix_depth = 0;
        self.attrib_depth = 0;
        self.open_list = None;
        open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_vertex_ops_need_open_primitive() {
        let mut s = ExecutionState::default();
        assert_eq!(
            s.admit(Opcode::Vertex3f),
            Err(Violation::VertexOutsidePrimitive)
        );
        assert_eq!(s.admit(Opcode::End), Err(Violation::EndWithoutBegin));
        s.begin(PrimitiveKind::Lines);
        assert_eq!(s.admit(Opcode::Vertex3f), Ok(()));
        assert_eq!(
            s.admit(Opcode::Begin),
            Err(Violation::NestedBegin(PrimitiveKind::Lines))
        );
        assert_eq!(
            s.admit(Opcode::Translated),
            Err(Violation::IllegalInPrimitive(PrimitiveKind::Lines))
        );
    }

    #[test]
    fn matrix_depth_bounds() {
        let mut s = ExecutionState::default();
        assert_eq!(s.check_pop_matrix(), Err(Violation::MatrixStackUnderflow));
        s.push_matrix();
        assert_eq!(
            s.check_push_matrix(1),
            Err(Violation::MatrixStackOverflow { max: 1 })
        );
        assert_eq!(s.check_pop_matrix(), Ok(()));
    }

    #[test]
    fn halt_resets_stacks_but_keeps_handles() {
        let mut s = ExecutionState::default();
        s.begin(PrimitiveKind::Points);
        s.push_matrix();
        s.open_list_with(3);
        s.textures.insert(1, TextureHandle(9));
        assert!(matches!(
            s.check_balanced(),
            Err(DecodeError::UnbalancedStream {
                open_primitive: Some(PrimitiveKind::Points),
                matrix_depth: 1,
                attrib_depth: 0,
                open_list: Some(3),
            })
        ));
        assert_eq!(
            s.halt(),
            OpenState {
                primitive: Some(PrimitiveKind::Points),
                matrix_depth: 1,
                attrib_depth: 0,
                list: Some(3),
            }
        );
        assert_eq!(s.check_balanced(), Ok(()));
        assert!(s.halt().is_clear());
        assert_eq!(s.texture(1), Some(TextureHandle(9)));
    }
}
