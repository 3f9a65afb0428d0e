//! OpenGL Shaders
//!
//! This module defines the [`ShaderProgram`] struct, which compiles and links GLSL stages and
//! owns a vertex array object together with a registry of named attribute buffers.
//!
//! Attribute buffers are versioned: uploading data under a name whose stored version equals the
//! version passed in skips the transfer entirely, so callers can upload every frame and only
//! pay for data that actually changed. A buffer can also be shared with another program through
//! [`ShaderProgram::share_attrib`], which registers a non-owning alias to the same device buffer.
//!
//! The module also provides the [`Uniform`] trait for setting uniform variables.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::abs::Device;
use crate::asset::ShaderManifest;
use crate::error::{GlError, Result};

/// Reserved attribute name for the index buffer used by [`ShaderProgram::draw_indexed`].
pub const INDICES: &str = "indices";

/// Version sentinel meaning "always upload".
pub const UNVERSIONED: i32 = -1;

/// Component type of an attribute buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Float,
    Double,
    HalfFloat,
    Byte,
    UnsignedByte,
    Short,
    UnsignedShort,
    Int,
    UnsignedInt,
}

impl ElementType {
    /// The matching GL enum.
    pub fn gl_type(self) -> u32 {
        match self {
            ElementType::Float => glow::FLOAT,
            ElementType::Double => glow::DOUBLE,
            ElementType::HalfFloat => glow::HALF_FLOAT,
            ElementType::Byte => glow::BYTE,
            ElementType::UnsignedByte => glow::UNSIGNED_BYTE,
            ElementType::Short => glow::SHORT,
            ElementType::UnsignedShort => glow::UNSIGNED_SHORT,
            ElementType::Int => glow::INT,
            ElementType::UnsignedInt => glow::UNSIGNED_INT,
        }
    }

    /// Size of one component in bytes.
    pub fn size(self) -> u32 {
        match self {
            ElementType::Byte | ElementType::UnsignedByte => 1,
            ElementType::HalfFloat | ElementType::Short | ElementType::UnsignedShort => 2,
            ElementType::Float | ElementType::Int | ElementType::UnsignedInt => 4,
            ElementType::Double => 8,
        }
    }

    pub fn is_integral(self) -> bool {
        !matches!(
            self,
            ElementType::Float | ElementType::Double | ElementType::HalfFloat
        )
    }
}

/// Plain scalar types that can be uploaded as attribute data.
pub trait AttribScalar: bytemuck::Pod {
    const ELEMENT_TYPE: ElementType;
}

macro_rules! attrib_scalar {
    ($($ty:ty => $element:ident),* $(,)?) => {
        $(
            impl AttribScalar for $ty {
                const ELEMENT_TYPE: ElementType = ElementType::$element;
            }
        )*
    };
}

attrib_scalar! {
    f32 => Float,
    f64 => Double,
    i8 => Byte,
    u8 => UnsignedByte,
    i16 => Short,
    u16 => UnsignedShort,
    i32 => Int,
    u32 => UnsignedInt,
}

/// Layout of an attribute buffer: `count` elements of `dim` components each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttribShape {
    pub dim: u32,
    pub count: u32,
    pub comp_size: u32,
    pub ty: ElementType,
}

impl AttribShape {
    pub fn new(dim: u32, count: u32, ty: ElementType) -> Self {
        Self {
            dim,
            count,
            comp_size: ty.size(),
            ty,
        }
    }

    /// Number of scalar components, i.e. the length of a typed download target.
    /// `None` if it does not fit in `usize`.
    pub fn components(&self) -> Option<usize> {
        (self.dim as usize).checked_mul(self.count as usize)
    }

    pub fn byte_size(&self) -> Option<usize> {
        self.components()?.checked_mul(self.comp_size as usize)
    }
}

/// The shader stages a program can be built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Geometry,
    Fragment,
}

impl ShaderStage {
    pub fn gl_type(self) -> u32 {
        match self {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Geometry => glow::GEOMETRY_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Geometry => "geometry",
            ShaderStage::Fragment => "fragment",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inserts one `#define KEY VALUE` line per definition into a shader source.
///
/// The block goes right after a leading `#version` directive, since GLSL requires that
/// directive to come first, and is prepended otherwise.
pub fn inject_definitions(source: &str, definitions: &BTreeMap<String, String>) -> String {
    if definitions.is_empty() {
        return source.to_string();
    }

    let defines: String = definitions
        .iter()
        .map(|(key, value)| format!("#define {key} {value}\n"))
        .collect();

    if source.starts_with("#version") {
        match source.split_once('\n') {
            Some((version, body)) => format!("{version}\n{defines}{body}"),
            None => format!("{source}\n{defines}"),
        }
    } else {
        format!("{defines}{source}")
    }
}

struct AttributeBuffer<D: Device> {
    id: D::Buffer,
    shape: AttribShape,
    integral: bool,
    version: i32,
}

type BufferRef<D> = Rc<RefCell<AttributeBuffer<D>>>;

enum BufferEntry<D: Device> {
    Owned(BufferRef<D>),
    /// Alias into another program's buffer. Expires once the owner releases it.
    Shared(Weak<RefCell<AttributeBuffer<D>>>),
}

impl<D: Device> BufferEntry<D> {
    fn get(&self) -> Option<BufferRef<D>> {
        match self {
            BufferEntry::Owned(buffer) => Some(Rc::clone(buffer)),
            BufferEntry::Shared(alias) => alias.upgrade(),
        }
    }

    fn is_live(&self) -> bool {
        match self {
            BufferEntry::Owned(_) => true,
            BufferEntry::Shared(alias) => alias.strong_count() > 0,
        }
    }
}

/// Represents a uniform value that can be written to a shader program.
pub trait Uniform {
    /// Writes the value at the given location of the currently bound program.
    fn set_uniform<D: Device>(&self, gl: &D, location: Option<&D::UniformLocation>);
}

impl Uniform for bool {
    fn set_uniform<D: Device>(&self, gl: &D, location: Option<&D::UniformLocation>) {
        unsafe {
            gl.uniform_1_i32(location, *self as i32);
        }
    }
}

impl Uniform for i32 {
    fn set_uniform<D: Device>(&self, gl: &D, location: Option<&D::UniformLocation>) {
        unsafe {
            gl.uniform_1_i32(location, *self);
        }
    }
}

impl Uniform for f32 {
    fn set_uniform<D: Device>(&self, gl: &D, location: Option<&D::UniformLocation>) {
        unsafe {
            gl.uniform_1_f32(location, *self);
        }
    }
}

impl Uniform for Vec2 {
    fn set_uniform<D: Device>(&self, gl: &D, location: Option<&D::UniformLocation>) {
        unsafe {
            gl.uniform_2_f32(location, self.x, self.y);
        }
    }
}

impl Uniform for Vec3 {
    fn set_uniform<D: Device>(&self, gl: &D, location: Option<&D::UniformLocation>) {
        unsafe {
            gl.uniform_3_f32(location, self.x, self.y, self.z);
        }
    }
}

impl Uniform for Vec4 {
    fn set_uniform<D: Device>(&self, gl: &D, location: Option<&D::UniformLocation>) {
        unsafe {
            gl.uniform_4_f32(location, self.x, self.y, self.z, self.w);
        }
    }
}

impl Uniform for Mat4 {
    fn set_uniform<D: Device>(&self, gl: &D, location: Option<&D::UniformLocation>) {
        unsafe {
            gl.uniform_matrix_4_f32_slice(location, false, &self.to_cols_array());
        }
    }
}

impl<T: Uniform> Uniform for &T {
    fn set_uniform<D: Device>(&self, gl: &D, location: Option<&D::UniformLocation>) {
        (*self).set_uniform(gl, location);
    }
}

/// Represents an OpenGL shader program with its vertex array object and attribute buffers.
pub struct ShaderProgram<D: Device = glow::Context> {
    gl: Arc<D>,
    name: String,
    vertex: Option<D::Shader>,
    fragment: Option<D::Shader>,
    geometry: Option<D::Shader>,
    program: Option<D::Program>,
    vao: Option<D::VertexArray>,
    buffers: HashMap<String, BufferEntry<D>>,
    definitions: BTreeMap<String, String>,
}

impl<D: Device> ShaderProgram<D> {
    /// Creates an uninitialized shader program.
    pub fn new(gl: &Arc<D>) -> Self {
        Self {
            gl: Arc::clone(gl),
            name: String::new(),
            vertex: None,
            fragment: None,
            geometry: None,
            program: None,
            vao: None,
            buffers: HashMap::new(),
            definitions: BTreeMap::new(),
        }
    }

    /// Compiles and links the program from the given sources.
    ///
    /// Registered definitions are injected into every stage. The geometry stage is optional.
    /// If anything fails, every object created along the way is deleted again and the
    /// diagnostic is both logged and returned.
    pub fn init(
        &mut self,
        name: &str,
        vertex: &str,
        fragment: &str,
        geometry: Option<&str>,
    ) -> Result<()> {
        self.free();
        self.name = name.to_string();

        for (stage, source) in [(ShaderStage::Vertex, vertex), (ShaderStage::Fragment, fragment)] {
            if source.is_empty() {
                return Err(GlError::MissingStage {
                    stage: stage.label(),
                    name: self.name.clone(),
                });
            }
        }

        let sources = [
            (ShaderStage::Vertex, vertex),
            (ShaderStage::Geometry, geometry.unwrap_or_default()),
            (ShaderStage::Fragment, fragment),
        ];

        let mut stages = Vec::with_capacity(sources.len());
        for (stage, source) in sources {
            if source.is_empty() {
                continue;
            }
            match self.compile_stage(stage, source) {
                Ok(shader) => stages.push((stage, shader)),
                Err(err) => {
                    self.release_partial(&stages, None);
                    return Err(err);
                }
            }
        }

        let program = match self.link(&stages) {
            Ok(program) => program,
            Err(err) => {
                self.release_partial(&stages, None);
                return Err(err);
            }
        };

        let vao = match unsafe { self.gl.create_vertex_array() } {
            Ok(vao) => vao,
            Err(err) => {
                self.release_partial(&stages, Some(program));
                return Err(GlError::Device(err));
            }
        };

        for (stage, shader) in stages {
            match stage {
                ShaderStage::Vertex => self.vertex = Some(shader),
                ShaderStage::Geometry => self.geometry = Some(shader),
                ShaderStage::Fragment => self.fragment = Some(shader),
            }
        }
        self.program = Some(program);
        self.vao = Some(vao);

        log::debug!("Linked shader program \"{}\"", self.name);
        Ok(())
    }

    /// Reads the stage sources from disk and calls [`ShaderProgram::init`].
    pub fn init_from_files(
        &mut self,
        name: &str,
        vertex: impl AsRef<Path>,
        fragment: impl AsRef<Path>,
        geometry: Option<&Path>,
    ) -> Result<()> {
        let vertex = read_source(vertex.as_ref())?;
        let fragment = read_source(fragment.as_ref())?;
        let geometry = geometry.map(read_source).transpose()?;
        self.init(name, &vertex, &fragment, geometry.as_deref())
    }

    /// Registers the manifest's definitions and initializes the program from its files,
    /// resolving relative paths against `base_dir`.
    pub fn init_from_manifest(
        &mut self,
        manifest: &ShaderManifest,
        base_dir: impl AsRef<Path>,
    ) -> Result<()> {
        for (key, value) in &manifest.defines {
            self.define(key, value);
        }
        let base_dir = base_dir.as_ref();
        let geometry = manifest.geometry.as_ref().map(|p| base_dir.join(p));
        self.init_from_files(
            &manifest.name,
            base_dir.join(&manifest.vertex),
            base_dir.join(&manifest.fragment),
            geometry.as_deref(),
        )
    }

    /// Sets a preprocessor definition used by the next [`ShaderProgram::init`].
    pub fn define(&mut self, key: &str, value: &str) {
        self.definitions.insert(key.to_string(), value.to_string());
    }

    pub fn definitions(&self) -> &BTreeMap<String, String> {
        &self.definitions
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns whether the program is linked and not freed.
    pub fn is_ready(&self) -> bool {
        self.program.is_some()
    }

    pub fn program(&self) -> Option<D::Program> {
        self.program
    }

    pub fn vertex_array(&self) -> Option<D::VertexArray> {
        self.vao
    }

    /// Selects this program and its vertex array object for subsequent draw calls.
    pub fn bind(&self) {
        unsafe {
            self.gl.use_program(self.program);
            self.gl.bind_vertex_array(self.vao);
        }
    }

    /// Returns the location of a vertex input, logging a warning if it is missing and `warn`.
    pub fn attrib(&self, name: &str, warn: bool) -> Option<u32> {
        let location = self
            .program
            .and_then(|program| unsafe { self.gl.get_attrib_location(program, name) });
        if location.is_none() && warn {
            log::warn!("Did not find attrib {} in shader {}", name, self.name);
        }
        location
    }

    /// Returns the location of a uniform, logging a warning if it is missing and `warn`.
    pub fn uniform(&self, name: &str, warn: bool) -> Option<D::UniformLocation> {
        let location = self
            .program
            .and_then(|program| unsafe { self.gl.get_uniform_location(program, name) });
        if location.is_none() && warn {
            log::warn!("Did not find uniform {} in shader {}", name, self.name);
        }
        location
    }

    /// Sets a uniform variable in the shader program. The program must be bound.
    pub fn set_uniform<T: Uniform>(&self, name: &str, value: T, warn: bool) {
        let location = self.uniform(name, warn);
        value.set_uniform(&*self.gl, location.as_ref());
    }

    /// Uploads raw attribute data under `name`.
    ///
    /// A buffer is created on the first upload of a name. Later uploads are skipped when
    /// `version` is non-negative and equal to the stored version; otherwise the data is
    /// transferred, in place when the byte size is unchanged.
    pub fn upload_attrib_raw(
        &mut self,
        name: &str,
        shape: AttribShape,
        integral: bool,
        data: &[u8],
        version: i32,
    ) -> Result<()> {
        let vao = self
            .vao
            .ok_or_else(|| GlError::NotInitialized(self.name.clone()))?;

        if shape.byte_size() != Some(data.len()) {
            return Err(GlError::SizeMismatch {
                name: name.to_string(),
                expected: shape.byte_size().unwrap_or(usize::MAX),
                actual: data.len(),
            });
        }

        let existing = match self.buffers.get(name) {
            Some(BufferEntry::Shared(_)) => {
                return Err(GlError::SharedAttribute {
                    program: self.name.clone(),
                    name: name.to_string(),
                });
            }
            Some(BufferEntry::Owned(buffer)) => Some(Rc::clone(buffer)),
            None => None,
        };

        if let Some(buffer) = &existing {
            if version >= 0 && buffer.borrow().version == version {
                return Ok(());
            }
        }

        let is_indices = name == INDICES;
        let location = if is_indices {
            None
        } else {
            match self.attrib(name, true) {
                Some(location) => Some(location),
                None => return Ok(()),
            }
        };
        let target = if is_indices {
            glow::ELEMENT_ARRAY_BUFFER
        } else {
            glow::ARRAY_BUFFER
        };

        unsafe {
            self.gl.bind_vertex_array(Some(vao));
            match existing {
                Some(buffer) => {
                    let mut buffer = buffer.borrow_mut();
                    self.gl.bind_buffer(target, Some(buffer.id));
                    if buffer.shape.byte_size() == Some(data.len()) && !data.is_empty() {
                        self.gl.buffer_sub_data_u8_slice(target, 0, data);
                    } else {
                        self.gl.buffer_data_u8_slice(target, data, glow::DYNAMIC_DRAW);
                    }
                    buffer.shape = shape;
                    buffer.integral = integral;
                    buffer.version = version;
                }
                None => {
                    let id = self.gl.create_buffer().map_err(GlError::Device)?;
                    self.gl.bind_buffer(target, Some(id));
                    self.gl.buffer_data_u8_slice(target, data, glow::DYNAMIC_DRAW);
                    self.buffers.insert(
                        name.to_string(),
                        BufferEntry::Owned(Rc::new(RefCell::new(AttributeBuffer {
                            id,
                            shape,
                            integral,
                            version,
                        }))),
                    );
                }
            }
        }

        if let Some(location) = location {
            self.point_attrib(location, &shape, integral);
        }
        Ok(())
    }

    /// Uploads typed attribute data with `dim` components per element.
    pub fn upload_attrib<T: AttribScalar>(
        &mut self,
        name: &str,
        data: &[T],
        dim: u32,
        version: i32,
    ) -> Result<()> {
        let count = if dim == 0 { 0 } else { data.len() / dim as usize };
        let count = u32::try_from(count).map_err(|_| GlError::SizeMismatch {
            name: name.to_string(),
            expected: AttribShape::new(dim, u32::MAX, T::ELEMENT_TYPE)
                .byte_size()
                .unwrap_or(usize::MAX),
            actual: std::mem::size_of_val(data),
        })?;
        let shape = AttribShape::new(dim, count, T::ELEMENT_TYPE);
        self.upload_attrib_raw(
            name,
            shape,
            T::ELEMENT_TYPE.is_integral(),
            bytemuck::cast_slice(data),
            version,
        )
    }

    /// Uploads the index buffer used by [`ShaderProgram::draw_indexed`].
    pub fn upload_indices(&mut self, indices: &[u32], version: i32) -> Result<()> {
        self.upload_attrib(INDICES, indices, 1, version)
    }

    /// Returns the layout of a registered buffer, which is what a download target must match.
    pub fn attrib_shape(&self, name: &str) -> Option<AttribShape> {
        self.buffers
            .get(name)
            .and_then(BufferEntry::get)
            .map(|buffer| buffer.borrow().shape)
    }

    /// Copies a buffer's contents into `out`, which must be exactly the buffer's byte size.
    pub fn download_attrib_raw(&self, name: &str, out: &mut [u8]) -> Result<AttribShape> {
        let buffer = self.lookup(name)?;
        let buffer = buffer.borrow();
        let expected = buffer.shape.byte_size().unwrap_or(usize::MAX);
        if out.len() != expected {
            return Err(GlError::SizeMismatch {
                name: name.to_string(),
                expected,
                actual: out.len(),
            });
        }

        unsafe {
            self.gl.bind_buffer(glow::COPY_READ_BUFFER, Some(buffer.id));
            self.gl.get_buffer_sub_data(glow::COPY_READ_BUFFER, 0, out);
            self.gl.bind_buffer(glow::COPY_READ_BUFFER, None);
        }
        Ok(buffer.shape)
    }

    /// Copies a buffer's contents into a typed slice of [`AttribShape::components`] length.
    pub fn download_attrib<T: AttribScalar>(&self, name: &str, out: &mut [T]) -> Result<AttribShape> {
        let stored = self.lookup(name)?.borrow().shape.ty;
        if stored != T::ELEMENT_TYPE {
            return Err(GlError::TypeMismatch {
                name: name.to_string(),
                stored,
                requested: T::ELEMENT_TYPE,
            });
        }
        self.download_attrib_raw(name, bytemuck::cast_slice_mut(out))
    }

    /// Forces the next upload of every owned buffer to transfer its data.
    pub fn invalidate_attribs(&mut self) {
        for entry in self.buffers.values() {
            if let BufferEntry::Owned(buffer) = entry {
                buffer.borrow_mut().version = UNVERSIONED;
            }
        }
    }

    /// Releases a buffer. Aliases are only unregistered; the owner keeps the device buffer.
    pub fn free_attrib(&mut self, name: &str) {
        if let Some(BufferEntry::Owned(buffer)) = self.buffers.remove(name) {
            unsafe {
                self.gl.delete_buffer(buffer.borrow().id);
            }
        }
    }

    /// Returns whether a live buffer is registered under `name`.
    pub fn has_attrib(&self, name: &str) -> bool {
        self.buffers.get(name).is_some_and(BufferEntry::is_live)
    }

    /// Registers `other`'s buffer `name` in this program as `as_name` (or `name`), without
    /// copying data or taking ownership.
    pub fn share_attrib(
        &mut self,
        other: &ShaderProgram<D>,
        name: &str,
        as_name: Option<&str>,
    ) -> Result<()> {
        let local = as_name.filter(|n| !n.is_empty()).unwrap_or(name);
        let vao = self
            .vao
            .ok_or_else(|| GlError::NotInitialized(self.name.clone()))?;
        let buffer = other.lookup(name)?;

        {
            let source = buffer.borrow();
            if local == INDICES {
                unsafe {
                    self.gl.bind_vertex_array(Some(vao));
                    self.gl
                        .bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(source.id));
                }
            } else {
                let Some(location) = self.attrib(local, true) else {
                    return Ok(());
                };
                unsafe {
                    self.gl.bind_vertex_array(Some(vao));
                    self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(source.id));
                }
                self.point_attrib(location, &source.shape, source.integral);
            }
        }

        self.free_attrib(local);
        self.buffers
            .insert(local.to_string(), BufferEntry::Shared(Rc::downgrade(&buffer)));
        log::debug!(
            "Shared attrib {} of shader {} as {} in shader {}",
            name,
            other.name,
            local,
            self.name
        );
        Ok(())
    }

    /// Returns the version of a buffer, or [`UNVERSIONED`] if it is not registered.
    pub fn attrib_version(&self, name: &str) -> i32 {
        self.buffers
            .get(name)
            .and_then(BufferEntry::get)
            .map_or(UNVERSIONED, |buffer| buffer.borrow().version)
    }

    /// Resets the version of a buffer so that the next upload transfers.
    pub fn reset_attrib_version(&mut self, name: &str) {
        if let Some(buffer) = self.buffers.get(name).and_then(BufferEntry::get) {
            buffer.borrow_mut().version = UNVERSIONED;
        }
    }

    /// Draws `count` vertices starting at `offset` with the bound program.
    pub fn draw_array(&self, mode: u32, offset: u32, count: u32) {
        if count == 0 {
            return;
        }
        let (Ok(first), Ok(count)) = (i32::try_from(offset), i32::try_from(count)) else {
            log::warn!(
                "Skipping draw of {} vertices at {} in shader {}: range too large",
                count,
                offset,
                self.name
            );
            return;
        };
        unsafe {
            self.gl.draw_arrays(mode, first, count);
        }
    }

    /// Draws from the index buffer. For `TRIANGLES` and `LINES`, `offset` and `count` are in
    /// primitives; for other modes they are in indices.
    pub fn draw_indexed(&self, mode: u32, offset: u32, count: u32) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        let indices = self
            .buffers
            .get(INDICES)
            .and_then(BufferEntry::get)
            .ok_or_else(|| GlError::MissingIndices(self.name.clone()))?;
        let shape = indices.borrow().shape;

        let per_primitive = match mode {
            glow::TRIANGLES => 3,
            glow::LINES => 2,
            _ => 1,
        };
        let range = |n: u32, scale: u32| {
            n.checked_mul(scale)
                .and_then(|n| i32::try_from(n).ok())
                .ok_or_else(|| GlError::DrawRange {
                    program: self.name.clone(),
                    offset,
                    count,
                })
        };
        let byte_offset = range(offset, per_primitive * shape.comp_size)?;
        let index_count = range(count, per_primitive)?;

        unsafe {
            self.gl
                .draw_elements(mode, index_count, shape.ty.gl_type(), byte_offset);
        }
        Ok(())
    }

    /// Total byte size of all live buffers, aliases included.
    pub fn buffer_size(&self) -> usize {
        self.buffers
            .values()
            .filter_map(BufferEntry::get)
            .filter_map(|buffer| buffer.borrow().shape.byte_size())
            .sum()
    }

    /// Releases every GL object owned by the program. Calling it again does nothing.
    pub fn free(&mut self) {
        for (_, entry) in self.buffers.drain() {
            if let BufferEntry::Owned(buffer) = entry {
                unsafe {
                    self.gl.delete_buffer(buffer.borrow().id);
                }
            }
        }

        unsafe {
            if let Some(vao) = self.vao.take() {
                self.gl.delete_vertex_array(vao);
            }
            if let Some(program) = self.program.take() {
                self.gl.delete_program(program);
                log::debug!("Freed shader program \"{}\"", self.name);
            }
            for shader in [self.vertex.take(), self.geometry.take(), self.fragment.take()]
                .into_iter()
                .flatten()
            {
                self.gl.delete_shader(shader);
            }
        }
    }

    fn lookup(&self, name: &str) -> Result<BufferRef<D>> {
        match self.buffers.get(name) {
            None => Err(GlError::AttributeNotFound {
                program: self.name.clone(),
                name: name.to_string(),
            }),
            Some(entry) => entry.get().ok_or_else(|| GlError::ExpiredAlias {
                program: self.name.clone(),
                name: name.to_string(),
            }),
        }
    }

    /// Points `location` at the buffer currently bound to `ARRAY_BUFFER`.
    fn point_attrib(&self, location: u32, shape: &AttribShape, integral: bool) {
        unsafe {
            if shape.count == 0 {
                self.gl.disable_vertex_attrib_array(location);
                return;
            }
            self.gl.enable_vertex_attrib_array(location);
            match shape.ty {
                ElementType::Double => {
                    self.gl
                        .vertex_attrib_pointer_f64(location, shape.dim as i32, glow::DOUBLE, 0, 0)
                }
                ty => self.gl.vertex_attrib_pointer_f32(
                    location,
                    shape.dim as i32,
                    ty.gl_type(),
                    integral,
                    0,
                    0,
                ),
            }
        }
    }

    fn compile_stage(&self, stage: ShaderStage, source: &str) -> Result<D::Shader> {
        let source = inject_definitions(source, &self.definitions);
        unsafe {
            let shader = self
                .gl
                .create_shader(stage.gl_type())
                .map_err(GlError::Device)?;
            self.gl.shader_source(shader, &source);
            self.gl.compile_shader(shader);

            if !self.gl.get_shader_compile_status(shader) {
                let log = self.gl.get_shader_info_log(shader);
                self.gl.delete_shader(shader);
                log::error!(
                    "Error while compiling {} shader \"{}\":\n{}\n\nError: {}",
                    stage,
                    self.name,
                    source,
                    log
                );
                return Err(GlError::Compile {
                    stage: stage.label(),
                    name: self.name.clone(),
                    log,
                });
            }

            Ok(shader)
        }
    }

    fn link(&self, stages: &[(ShaderStage, D::Shader)]) -> Result<D::Program> {
        unsafe {
            let program = self.gl.create_program().map_err(GlError::Device)?;

            for (_, shader) in stages {
                self.gl.attach_shader(program, *shader);
            }

            self.gl.link_program(program);

            if !self.gl.get_program_link_status(program) {
                let log = self.gl.get_program_info_log(program);
                self.gl.delete_program(program);
                log::error!("Linker error ({}):\n{}", self.name, log);
                return Err(GlError::Link {
                    name: self.name.clone(),
                    log,
                });
            }

            for (_, shader) in stages {
                self.gl.detach_shader(program, *shader);
            }

            Ok(program)
        }
    }

    fn release_partial(&self, stages: &[(ShaderStage, D::Shader)], program: Option<D::Program>) {
        unsafe {
            if let Some(program) = program {
                self.gl.delete_program(program);
            }
            for (_, shader) in stages {
                self.gl.delete_shader(*shader);
            }
        }
    }
}

impl<D: Device> Drop for ShaderProgram<D> {
    fn drop(&mut self) {
        self.free();
    }
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| GlError::Io {
        path: path.to_path_buf(),
        source,
    })
}
