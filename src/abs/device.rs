//! The GL call surface used by this crate.
//!
//! [`Device`] names exactly the OpenGL entry points that [`ShaderProgram`](super::ShaderProgram)
//! and [`Framebuffer`](super::Framebuffer) need. The method names and signatures follow
//! [`glow::HasContext`], and [`glow::Context`] implements the trait by forwarding every call.
//!
//! # Safety
//!
//! Every method is `unsafe` for the same reason the `glow` methods are: the caller must
//! guarantee that a GL context is current on the calling thread and that every handle
//! passed in was created by this device and not yet deleted.

use std::fmt::Debug;

use glow::HasContext;

/// The subset of OpenGL used by the shader and framebuffer wrappers.
#[allow(clippy::missing_safety_doc, clippy::too_many_arguments)]
pub trait Device {
    type Shader: Copy + Debug + PartialEq;
    type Program: Copy + Debug + PartialEq;
    type Buffer: Copy + Debug + PartialEq;
    type VertexArray: Copy + Debug + PartialEq;
    type Framebuffer: Copy + Debug + PartialEq;
    type Renderbuffer: Copy + Debug + PartialEq;
    type UniformLocation: Clone + Debug;

    unsafe fn create_shader(&self, shader_type: u32) -> Result<Self::Shader, String>;
    unsafe fn shader_source(&self, shader: Self::Shader, source: &str);
    unsafe fn compile_shader(&self, shader: Self::Shader);
    unsafe fn get_shader_compile_status(&self, shader: Self::Shader) -> bool;
    unsafe fn get_shader_info_log(&self, shader: Self::Shader) -> String;
    unsafe fn delete_shader(&self, shader: Self::Shader);

    unsafe fn create_program(&self) -> Result<Self::Program, String>;
    unsafe fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    unsafe fn detach_shader(&self, program: Self::Program, shader: Self::Shader);
    unsafe fn link_program(&self, program: Self::Program);
    unsafe fn get_program_link_status(&self, program: Self::Program) -> bool;
    unsafe fn get_program_info_log(&self, program: Self::Program) -> String;
    unsafe fn use_program(&self, program: Option<Self::Program>);
    unsafe fn delete_program(&self, program: Self::Program);

    unsafe fn get_attrib_location(&self, program: Self::Program, name: &str) -> Option<u32>;
    unsafe fn get_uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation>;

    unsafe fn create_vertex_array(&self) -> Result<Self::VertexArray, String>;
    unsafe fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>);
    unsafe fn delete_vertex_array(&self, vertex_array: Self::VertexArray);

    unsafe fn create_buffer(&self) -> Result<Self::Buffer, String>;
    unsafe fn bind_buffer(&self, target: u32, buffer: Option<Self::Buffer>);
    unsafe fn buffer_data_u8_slice(&self, target: u32, data: &[u8], usage: u32);
    unsafe fn buffer_sub_data_u8_slice(&self, target: u32, offset: i32, src_data: &[u8]);
    unsafe fn get_buffer_sub_data(&self, target: u32, offset: i32, dst_data: &mut [u8]);
    unsafe fn delete_buffer(&self, buffer: Self::Buffer);

    unsafe fn enable_vertex_attrib_array(&self, index: u32);
    unsafe fn disable_vertex_attrib_array(&self, index: u32);
    unsafe fn vertex_attrib_pointer_f32(
        &self,
        index: u32,
        size: i32,
        data_type: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    );
    unsafe fn vertex_attrib_pointer_f64(
        &self,
        index: u32,
        size: i32,
        data_type: u32,
        stride: i32,
        offset: i32,
    );

    unsafe fn draw_arrays(&self, mode: u32, first: i32, count: i32);
    unsafe fn draw_elements(&self, mode: u32, count: i32, element_type: u32, offset: i32);

    unsafe fn uniform_1_i32(&self, location: Option<&Self::UniformLocation>, x: i32);
    unsafe fn uniform_1_f32(&self, location: Option<&Self::UniformLocation>, x: f32);
    unsafe fn uniform_2_f32(&self, location: Option<&Self::UniformLocation>, x: f32, y: f32);
    unsafe fn uniform_3_f32(
        &self,
        location: Option<&Self::UniformLocation>,
        x: f32,
        y: f32,
        z: f32,
    );
    unsafe fn uniform_4_f32(
        &self,
        location: Option<&Self::UniformLocation>,
        x: f32,
        y: f32,
        z: f32,
        w: f32,
    );
    unsafe fn uniform_matrix_4_f32_slice(
        &self,
        location: Option<&Self::UniformLocation>,
        transpose: bool,
        v: &[f32],
    );

    unsafe fn create_renderbuffer(&self) -> Result<Self::Renderbuffer, String>;
    unsafe fn bind_renderbuffer(&self, target: u32, renderbuffer: Option<Self::Renderbuffer>);
    unsafe fn renderbuffer_storage(
        &self,
        target: u32,
        internal_format: u32,
        width: i32,
        height: i32,
    );
    unsafe fn renderbuffer_storage_multisample(
        &self,
        target: u32,
        samples: i32,
        internal_format: u32,
        width: i32,
        height: i32,
    );
    unsafe fn delete_renderbuffer(&self, renderbuffer: Self::Renderbuffer);

    unsafe fn create_framebuffer(&self) -> Result<Self::Framebuffer, String>;
    unsafe fn bind_framebuffer(&self, target: u32, framebuffer: Option<Self::Framebuffer>);
    unsafe fn framebuffer_renderbuffer(
        &self,
        target: u32,
        attachment: u32,
        renderbuffer_target: u32,
        renderbuffer: Option<Self::Renderbuffer>,
    );
    unsafe fn check_framebuffer_status(&self, target: u32) -> u32;
    unsafe fn delete_framebuffer(&self, framebuffer: Self::Framebuffer);
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
    );
    unsafe fn draw_buffer(&self, buffer: u32);
    unsafe fn read_buffer(&self, src: u32);

    unsafe fn enable(&self, parameter: u32);
    unsafe fn disable(&self, parameter: u32);
}

impl Device for glow::Context {
    type Shader = glow::Shader;
    type Program = glow::Program;
    type Buffer = glow::Buffer;
    type VertexArray = glow::VertexArray;
    type Framebuffer = glow::Framebuffer;
    type Renderbuffer = glow::Renderbuffer;
    type UniformLocation = glow::UniformLocation;

    unsafe fn create_shader(&self, shader_type: u32) -> Result<glow::Shader, String> {
        unsafe { HasContext::create_shader(self, shader_type) }
    }

    unsafe fn shader_source(&self, shader: glow::Shader, source: &str) {
        unsafe { HasContext::shader_source(self, shader, source) }
    }

    unsafe fn compile_shader(&self, shader: glow::Shader) {
        unsafe { HasContext::compile_shader(self, shader) }
    }

    unsafe fn get_shader_compile_status(&self, shader: glow::Shader) -> bool {
        unsafe { HasContext::get_shader_compile_status(self, shader) }
    }

    unsafe fn get_shader_info_log(&self, shader: glow::Shader) -> String {
        unsafe { HasContext::get_shader_info_log(self, shader) }
    }

    unsafe fn delete_shader(&self, shader: glow::Shader) {
        unsafe { HasContext::delete_shader(self, shader) }
    }

    unsafe fn create_program(&self) -> Result<glow::Program, String> {
        unsafe { HasContext::create_program(self) }
    }

    unsafe fn attach_shader(&self, program: glow::Program, shader: glow::Shader) {
        unsafe { HasContext::attach_shader(self, program, shader) }
    }

    unsafe fn detach_shader(&self, program: glow::Program, shader: glow::Shader) {
        unsafe { HasContext::detach_shader(self, program, shader) }
    }

    unsafe fn link_program(&self, program: glow::Program) {
        unsafe { HasContext::link_program(self, program) }
    }

    unsafe fn get_program_link_status(&self, program: glow::Program) -> bool {
        unsafe { HasContext::get_program_link_status(self, program) }
    }

    unsafe fn get_program_info_log(&self, program: glow::Program) -> String {
        unsafe { HasContext::get_program_info_log(self, program) }
    }

    unsafe fn use_program(&self, program: Option<glow::Program>) {
        unsafe { HasContext::use_program(self, program) }
    }

    unsafe fn delete_program(&self, program: glow::Program) {
        unsafe { HasContext::delete_program(self, program) }
    }

    unsafe fn get_attrib_location(&self, program: glow::Program, name: &str) -> Option<u32> {
        unsafe { HasContext::get_attrib_location(self, program, name) }
    }

    unsafe fn get_uniform_location(
        &self,
        program: glow::Program,
        name: &str,
    ) -> Option<glow::UniformLocation> {
        unsafe { HasContext::get_uniform_location(self, program, name) }
    }

    unsafe fn create_vertex_array(&self) -> Result<glow::VertexArray, String> {
        unsafe { HasContext::create_vertex_array(self) }
    }

    unsafe fn bind_vertex_array(&self, vertex_array: Option<glow::VertexArray>) {
        unsafe { HasContext::bind_vertex_array(self, vertex_array) }
    }

    unsafe fn delete_vertex_array(&self, vertex_array: glow::VertexArray) {
        unsafe { HasContext::delete_vertex_array(self, vertex_array) }
    }

    unsafe fn create_buffer(&self) -> Result<glow::Buffer, String> {
        unsafe { HasContext::create_buffer(self) }
    }

    unsafe fn bind_buffer(&self, target: u32, buffer: Option<glow::Buffer>) {
        unsafe { HasContext::bind_buffer(self, target, buffer) }
    }

    unsafe fn buffer_data_u8_slice(&self, target: u32, data: &[u8], usage: u32) {
        unsafe { HasContext::buffer_data_u8_slice(self, target, data, usage) }
    }

    unsafe fn buffer_sub_data_u8_slice(&self, target: u32, offset: i32, src_data: &[u8]) {
        unsafe { HasContext::buffer_sub_data_u8_slice(self, target, offset, src_data) }
    }

    unsafe fn get_buffer_sub_data(&self, target: u32, offset: i32, dst_data: &mut [u8]) {
        unsafe { HasContext::get_buffer_sub_data(self, target, offset, dst_data) }
    }

    unsafe fn delete_buffer(&self, buffer: glow::Buffer) {
        unsafe { HasContext::delete_buffer(self, buffer) }
    }

    unsafe fn enable_vertex_attrib_array(&self, index: u32) {
        unsafe { HasContext::enable_vertex_attrib_array(self, index) }
    }

    unsafe fn disable_vertex_attrib_array(&self, index: u32) {
        unsafe { HasContext::disable_vertex_attrib_array(self, index) }
    }

    unsafe fn vertex_attrib_pointer_f32(
        &self,
        index: u32,
        size: i32,
        data_type: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    ) {
        unsafe {
            HasContext::vertex_attrib_pointer_f32(
                self, index, size, data_type, normalized, stride, offset,
            )
        }
    }

    unsafe fn vertex_attrib_pointer_f64(
        &self,
        index: u32,
        size: i32,
        data_type: u32,
        stride: i32,
        offset: i32,
    ) {
        unsafe { HasContext::vertex_attrib_pointer_f64(self, index, size, data_type, stride, offset) }
    }

    unsafe fn draw_arrays(&self, mode: u32, first: i32, count: i32) {
        unsafe { HasContext::draw_arrays(self, mode, first, count) }
    }

    unsafe fn draw_elements(&self, mode: u32, count: i32, element_type: u32, offset: i32) {
        unsafe { HasContext::draw_elements(self, mode, count, element_type, offset) }
    }

    unsafe fn uniform_1_i32(&self, location: Option<&glow::UniformLocation>, x: i32) {
        unsafe { HasContext::uniform_1_i32(self, location, x) }
    }

    unsafe fn uniform_1_f32(&self, location: Option<&glow::UniformLocation>, x: f32) {
        unsafe { HasContext::uniform_1_f32(self, location, x) }
    }

    unsafe fn uniform_2_f32(&self, location: Option<&glow::UniformLocation>, x: f32, y: f32) {
        unsafe { HasContext::uniform_2_f32(self, location, x, y) }
    }

    unsafe fn uniform_3_f32(
        &self,
        location: Option<&glow::UniformLocation>,
        x: f32,
        y: f32,
        z: f32,
    ) {
        unsafe { HasContext::uniform_3_f32(self, location, x, y, z) }
    }

    unsafe fn uniform_4_f32(
        &self,
        location: Option<&glow::UniformLocation>,
        x: f32,
        y: f32,
        z: f32,
        w: f32,
    ) {
        unsafe { HasContext::uniform_4_f32(self, location, x, y, z, w) }
    }

    unsafe fn uniform_matrix_4_f32_slice(
        &self,
        location: Option<&glow::UniformLocation>,
        transpose: bool,
        v: &[f32],
    ) {
        unsafe { HasContext::uniform_matrix_4_f32_slice(self, location, transpose, v) }
    }

    unsafe fn create_renderbuffer(&self) -> Result<glow::Renderbuffer, String> {
        unsafe { HasContext::create_renderbuffer(self) }
    }

    unsafe fn bind_renderbuffer(&self, target: u32, renderbuffer: Option<glow::Renderbuffer>) {
        unsafe { HasContext::bind_renderbuffer(self, target, renderbuffer) }
    }

    unsafe fn renderbuffer_storage(
        &self,
        target: u32,
        internal_format: u32,
        width: i32,
        height: i32,
    ) {
        unsafe { HasContext::renderbuffer_storage(self, target, internal_format, width, height) }
    }

    unsafe fn renderbuffer_storage_multisample(
        &self,
        target: u32,
        samples: i32,
        internal_format: u32,
        width: i32,
        height: i32,
    ) {
        unsafe {
            HasContext::renderbuffer_storage_multisample(
                self,
                target,
                samples,
                internal_format,
                width,
                height,
            )
        }
    }

    unsafe fn delete_renderbuffer(&self, renderbuffer: glow::Renderbuffer) {
        unsafe { HasContext::delete_renderbuffer(self, renderbuffer) }
    }

    unsafe fn create_framebuffer(&self) -> Result<glow::Framebuffer, String> {
        unsafe { HasContext::create_framebuffer(self) }
    }

    unsafe fn bind_framebuffer(&self, target: u32, framebuffer: Option<glow::Framebuffer>) {
        unsafe { HasContext::bind_framebuffer(self, target, framebuffer) }
    }

    unsafe fn framebuffer_renderbuffer(
        &self,
        target: u32,
        attachment: u32,
        renderbuffer_target: u32,
        renderbuffer: Option<glow::Renderbuffer>,
    ) {
        unsafe {
            HasContext::framebuffer_renderbuffer(
                self,
                target,
                attachment,
                renderbuffer_target,
                renderbuffer,
            )
        }
    }

    unsafe fn check_framebuffer_status(&self, target: u32) -> u32 {
        unsafe { HasContext::check_framebuffer_status(self, target) }
    }

    unsafe fn delete_framebuffer(&self, framebuffer: glow::Framebuffer) {
        unsafe { HasContext::delete_framebuffer(self, framebuffer) }
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
        unsafe {
            HasContext::blit_framebuffer(
                self, src_x0, src_y0, src_x1, src_y1, dst_x0, dst_y0, dst_x1, dst_y1, mask, filter,
            )
        }
    }

    unsafe fn draw_buffer(&self, buffer: u32) {
        unsafe { HasContext::draw_buffer(self, buffer) }
    }

    unsafe fn read_buffer(&self, src: u32) {
        unsafe { HasContext::read_buffer(self, src) }
    }

    unsafe fn enable(&self, parameter: u32) {
        unsafe { HasContext::enable(self, parameter) }
    }

    unsafe fn disable(&self, parameter: u32) {
        unsafe { HasContext::disable(self, parameter) }
    }
}
