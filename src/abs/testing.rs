//! A recording [`Device`] for unit tests.
//!
//! Handles are plain integers. The fake keeps buffer contents in memory, counts transfers and
//! draw calls, and tracks which objects are alive so tests can check that nothing leaks.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};

use super::Device;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Shader,
    Program,
    Buffer,
    VertexArray,
    Framebuffer,
    Renderbuffer,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Arrays {
        mode: u32,
        first: i32,
        count: i32,
    },
    Elements {
        mode: u32,
        count: i32,
        element_type: u32,
        offset: i32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttribPointer {
    pub size: i32,
    pub data_type: u32,
    pub normalized: bool,
    pub double: bool,
    pub buffer: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UniformCall {
    Int(Option<u32>, i32),
    Float(Option<u32>, Vec<f32>),
    Matrix(Option<u32>, Vec<f32>),
}

#[derive(Debug, Default)]
pub struct State {
    next_id: u32,
    pub live: HashMap<u32, ObjectKind>,
    pub contents: HashMap<u32, Vec<u8>>,
    pub bindings: HashMap<u32, Option<u32>>,
    pub bound_vertex_array: Option<u32>,
    pub bound_program: Option<u32>,
    pub element_buffers: HashMap<u32, Option<u32>>,
    pub pointers: BTreeMap<u32, AttribPointer>,
    pub enabled_attribs: HashSet<u32>,
    pub sources: Vec<(u32, String)>,
    pub uploads: usize,
    pub reallocations: usize,
    pub draws: Vec<DrawCall>,
    pub uniforms: Vec<UniformCall>,
    pub storage: Vec<(u32, i32, u32)>,
    pub capabilities: HashSet<u32>,
    pub blits: Vec<[i32; 8]>,
    pub attribs: Vec<String>,
    pub uniform_names: Vec<String>,
    pub fail_compile: Option<u32>,
    pub fail_link: bool,
    pub framebuffer_status: Option<u32>,
}

#[derive(Debug, Default)]
pub struct FakeDevice {
    pub state: RefCell<State>,
}

impl FakeDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares the vertex inputs every linked program reports, in location order.
    pub fn with_attribs(self, names: &[&str]) -> Self {
        self.state.borrow_mut().attribs = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn with_uniforms(self, names: &[&str]) -> Self {
        self.state.borrow_mut().uniform_names = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn fail_compile(&self, shader_type: u32) {
        self.state.borrow_mut().fail_compile = Some(shader_type);
    }

    pub fn fail_link(&self) {
        self.state.borrow_mut().fail_link = true;
    }

    pub fn set_framebuffer_status(&self, status: u32) {
        self.state.borrow_mut().framebuffer_status = Some(status);
    }

    pub fn uploads(&self) -> usize {
        self.state.borrow().uploads
    }

    pub fn reallocations(&self) -> usize {
        self.state.borrow().reallocations
    }

    pub fn draws(&self) -> Vec<DrawCall> {
        self.state.borrow().draws.clone()
    }

    pub fn live(&self, kind: ObjectKind) -> usize {
        self.state
            .borrow()
            .live
            .values()
            .filter(|k| **k == kind)
            .count()
    }

    pub fn live_total(&self) -> usize {
        self.state.borrow().live.len()
    }

    fn create(&self, kind: ObjectKind) -> u32 {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = state.next_id;
        state.live.insert(id, kind);
        id
    }

    fn delete(&self, id: u32, kind: ObjectKind) {
        let mut state = self.state.borrow_mut();
        match state.live.remove(&id) {
            Some(k) => assert_eq!(k, kind, "deleted object {id} with the wrong kind"),
            None => panic!("double delete of {kind:?} {id}"),
        }
        state.contents.remove(&id);
    }

    fn point(&self, index: u32, size: i32, data_type: u32, normalized: bool, double: bool) {
        let mut state = self.state.borrow_mut();
        let buffer = state.bindings.get(&glow::ARRAY_BUFFER).copied().flatten();
        state.pointers.insert(
            index,
            AttribPointer {
                size,
                data_type,
                normalized,
                double,
                buffer,
            },
        );
    }

    fn bound(&self, target: u32) -> u32 {
        let state = self.state.borrow();
        let target = if target == glow::ELEMENT_ARRAY_BUFFER {
            state
                .bound_vertex_array
                .and_then(|vao| state.element_buffers.get(&vao).copied().flatten())
        } else {
            state.bindings.get(&target).copied().flatten()
        };
        target.expect("no buffer bound to target")
    }
}

#[allow(unused_variables)]
impl Device for FakeDevice {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type VertexArray = u32;
    type Framebuffer = u32;
    type Renderbuffer = u32;
    type UniformLocation = u32;

    unsafe fn create_shader(&self, shader_type: u32) -> Result<u32, String> {
        let id = self.create(ObjectKind::Shader);
        self.state.borrow_mut().sources.push((shader_type, String::new()));
        Ok(id)
    }

    unsafe fn shader_source(&self, shader: u32, source: &str) {
        if let Some(last) = self.state.borrow_mut().sources.last_mut() {
            last.1 = source.to_string();
        }
    }

    unsafe fn compile_shader(&self, shader: u32) {}

    unsafe fn get_shader_compile_status(&self, shader: u32) -> bool {
        let state = self.state.borrow();
        match (state.fail_compile, state.sources.last()) {
            (Some(ty), Some((stage, _))) => ty != *stage,
            _ => true,
        }
    }

    unsafe fn get_shader_info_log(&self, shader: u32) -> String {
        "0:1(1): error: syntax error".to_string()
    }

    unsafe fn delete_shader(&self, shader: u32) {
        self.delete(shader, ObjectKind::Shader);
    }

    unsafe fn create_program(&self) -> Result<u32, String> {
        Ok(self.create(ObjectKind::Program))
    }

    unsafe fn attach_shader(&self, program: u32, shader: u32) {}

    unsafe fn detach_shader(&self, program: u32, shader: u32) {}

    unsafe fn link_program(&self, program: u32) {}

    unsafe fn get_program_link_status(&self, program: u32) -> bool {
        !self.state.borrow().fail_link
    }

    unsafe fn get_program_info_log(&self, program: u32) -> String {
        "error: unresolved symbol".to_string()
    }

    unsafe fn use_program(&self, program: Option<u32>) {
        self.state.borrow_mut().bound_program = program;
    }

    unsafe fn delete_program(&self, program: u32) {
        self.delete(program, ObjectKind::Program);
    }

    unsafe fn get_attrib_location(&self, program: u32, name: &str) -> Option<u32> {
        let state = self.state.borrow();
        state
            .attribs
            .iter()
            .position(|a| a == name)
            .map(|i| i as u32)
    }

    unsafe fn get_uniform_location(&self, program: u32, name: &str) -> Option<u32> {
        let state = self.state.borrow();
        state
            .uniform_names
            .iter()
            .position(|u| u == name)
            .map(|i| i as u32)
    }

    unsafe fn create_vertex_array(&self) -> Result<u32, String> {
        Ok(self.create(ObjectKind::VertexArray))
    }

    unsafe fn bind_vertex_array(&self, vertex_array: Option<u32>) {
        self.state.borrow_mut().bound_vertex_array = vertex_array;
    }

    unsafe fn delete_vertex_array(&self, vertex_array: u32) {
        self.delete(vertex_array, ObjectKind::VertexArray);
    }

    unsafe fn create_buffer(&self) -> Result<u32, String> {
        Ok(self.create(ObjectKind::Buffer))
    }

    unsafe fn bind_buffer(&self, target: u32, buffer: Option<u32>) {
        let mut state = self.state.borrow_mut();
        if target == glow::ELEMENT_ARRAY_BUFFER {
            let vao = state
                .bound_vertex_array
                .expect("element buffer bound without a vertex array");
            state.element_buffers.insert(vao, buffer);
        } else {
            state.bindings.insert(target, buffer);
        }
    }

    unsafe fn buffer_data_u8_slice(&self, target: u32, data: &[u8], usage: u32) {
        let buffer = self.bound(target);
        let mut state = self.state.borrow_mut();
        state.uploads += 1;
        state.reallocations += 1;
        state.contents.insert(buffer, data.to_vec());
    }

    unsafe fn buffer_sub_data_u8_slice(&self, target: u32, offset: i32, src_data: &[u8]) {
        let buffer = self.bound(target);
        let mut state = self.state.borrow_mut();
        state.uploads += 1;
        let contents = state.contents.entry(buffer).or_default();
        let offset = offset as usize;
        contents[offset..offset + src_data.len()].copy_from_slice(src_data);
    }

    unsafe fn get_buffer_sub_data(&self, target: u32, offset: i32, dst_data: &mut [u8]) {
        let buffer = self.bound(target);
        let state = self.state.borrow();
        let contents = &state.contents[&buffer];
        let offset = offset as usize;
        dst_data.copy_from_slice(&contents[offset..offset + dst_data.len()]);
    }

    unsafe fn delete_buffer(&self, buffer: u32) {
        self.delete(buffer, ObjectKind::Buffer);
    }

    unsafe fn enable_vertex_attrib_array(&self, index: u32) {
        self.state.borrow_mut().enabled_attribs.insert(index);
    }

    unsafe fn disable_vertex_attrib_array(&self, index: u32) {
        self.state.borrow_mut().enabled_attribs.remove(&index);
    }

    unsafe fn vertex_attrib_pointer_f32(
        &self,
        index: u32,
        size: i32,
        data_type: u32,
        normalized: bool,
        _stride: i32,
        _offset: i32,
    ) {
        self.point(index, size, data_type, normalized, false);
    }

    unsafe fn vertex_attrib_pointer_f64(
        &self,
        index: u32,
        size: i32,
        data_type: u32,
        _stride: i32,
        _offset: i32,
    ) {
        self.point(index, size, data_type, false, true);
    }

    unsafe fn draw_arrays(&self, mode: u32, first: i32, count: i32) {
        self.state
            .borrow_mut()
            .draws
            .push(DrawCall::Arrays { mode, first, count });
    }

    unsafe fn draw_elements(&self, mode: u32, count: i32, element_type: u32, offset: i32) {
        self.state.borrow_mut().draws.push(DrawCall::Elements {
            mode,
            count,
            element_type,
            offset,
        });
    }

    unsafe fn uniform_1_i32(&self, location: Option<&u32>, x: i32) {
        self.state
            .borrow_mut()
            .uniforms
            .push(UniformCall::Int(location.copied(), x));
    }

    unsafe fn uniform_1_f32(&self, location: Option<&u32>, x: f32) {
        self.state
            .borrow_mut()
            .uniforms
            .push(UniformCall::Float(location.copied(), vec![x]));
    }

    unsafe fn uniform_2_f32(&self, location: Option<&u32>, x: f32, y: f32) {
        self.state
            .borrow_mut()
            .uniforms
            .push(UniformCall::Float(location.copied(), vec![x, y]));
    }

    unsafe fn uniform_3_f32(&self, location: Option<&u32>, x: f32, y: f32, z: f32) {
        self.state
            .borrow_mut()
            .uniforms
            .push(UniformCall::Float(location.copied(), vec![x, y, z]));
    }

    unsafe fn uniform_4_f32(&self, location: Option<&u32>, x: f32, y: f32, z: f32, w: f32) {
        self.state
            .borrow_mut()
            .uniforms
            .push(UniformCall::Float(location.copied(), vec![x, y, z, w]));
    }

    unsafe fn uniform_matrix_4_f32_slice(&self, location: Option<&u32>, transpose: bool, v: &[f32]) {
        self.state
            .borrow_mut()
            .uniforms
            .push(UniformCall::Matrix(location.copied(), v.to_vec()));
    }

    unsafe fn create_renderbuffer(&self) -> Result<u32, String> {
        Ok(self.create(ObjectKind::Renderbuffer))
    }

    unsafe fn bind_renderbuffer(&self, target: u32, renderbuffer: Option<u32>) {
        self.state.borrow_mut().bindings.insert(target, renderbuffer);
    }

    unsafe fn renderbuffer_storage(&self, target: u32, internal_format: u32, width: i32, height: i32) {
        self.state.borrow_mut().storage.push((internal_format, 0, target));
    }

    unsafe fn renderbuffer_storage_multisample(
        &self,
        target: u32,
        samples: i32,
        internal_format: u32,
        width: i32,
        height: i32,
    ) {
        self.state
            .borrow_mut()
            .storage
            .push((internal_format, samples, target));
    }

    unsafe fn delete_renderbuffer(&self, renderbuffer: u32) {
        self.delete(renderbuffer, ObjectKind::Renderbuffer);
    }

    unsafe fn create_framebuffer(&self) -> Result<u32, String> {
        Ok(self.create(ObjectKind::Framebuffer))
    }

    unsafe fn bind_framebuffer(&self, target: u32, framebuffer: Option<u32>) {
        self.state.borrow_mut().bindings.insert(target, framebuffer);
    }

    unsafe fn framebuffer_renderbuffer(
        &self,
        target: u32,
        attachment: u32,
        renderbuffer_target: u32,
        renderbuffer: Option<u32>,
    ) {
    }

    unsafe fn check_framebuffer_status(&self, target: u32) -> u32 {
        self.state
            .borrow()
            .framebuffer_status
            .unwrap_or(glow::FRAMEBUFFER_COMPLETE)
    }

    unsafe fn delete_framebuffer(&self, framebuffer: u32) {
        self.delete(framebuffer, ObjectKind::Framebuffer);
    }

    unsafe fn blit_framebuffer(
        &self,
        src_x0: i32,
        src_y0: i32,
        src_x1: i32,
        src_y1: i32,
        dst_x0: i32,
        dst_y0: i32,
        dst_x1: i32,
        dst_y1: i32,
        mask: u32,
        filter: u32,
    ) {
        self.state.borrow_mut().blits.push([
            src_x0, src_y0, src_x1, src_y1, dst_x0, dst_y0, dst_x1, dst_y1,
        ]);
    }

    unsafe fn draw_buffer(&self, buffer: u32) {}

    unsafe fn read_buffer(&self, src: u32) {}

    unsafe fn enable(&self, parameter: u32) {
        self.state.borrow_mut().capabilities.insert(parameter);
    }

    unsafe fn disable(&self, parameter: u32) {
        self.state.borrow_mut().capabilities.remove(&parameter);
    }
}
