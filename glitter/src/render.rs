use glow::HasContext;
use rustc_hash::FxHashMap;
use std::path::PathBuf;
use std::rc::Rc;
use thiserror::Error;

pub type Context = Rc<glow::Context>;
type GlDataType = u32;
type Result<T> = std::result::Result<T, Problem>;

#[derive(Error, Debug)]
pub enum Problem {
    #[error("Ran out of memory")]
    OutOfMemory,

    #[error("Cannot create buffer")]
    CannotCreateBuffer,

    #[error("Cannot read shader source from {}: {source}", .path.display())]
    CannotReadShader {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot create {0} shader")]
    CannotCreateShader(ShaderStage),

    #[error("Cannot compile {stage} shader: {log}")]
    CannotCompileShader { stage: ShaderStage, log: String },

    #[error("Cannot create program")]
    CannotCreateProgram,

    #[error("Cannot link program: {0}")]
    CannotLinkProgram(String),

    #[error("Vertex attribute type is not supported")]
    CannotBindUnsupportedVertexType,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn gl_type(self) -> GlDataType {
        match self {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

#[derive(Debug)]
pub struct Buffer {
    context: Context,
    pub id: glow::Buffer,
}

impl Drop for Buffer {
    fn drop(&mut self) {
        unsafe {
            self.context.delete_buffer(self.id);
        }
    }
}

impl Buffer {
    pub fn from_bytes(
        context: &Context,
        data: &[u8],
        buffer_type: u32,
        usage: u32,
    ) -> Result<Self> {
        let buffer = unsafe {
            let buffer = context
                .create_buffer()
                .map_err(|_| Problem::CannotCreateBuffer)?;

            context.bind_buffer(buffer_type, Some(buffer));
            context.buffer_data_u8_slice(buffer_type, data, usage);
            context.bind_buffer(buffer_type, None);

            buffer
        };

        Ok(Self {
            context: Rc::clone(context),
            id: buffer,
        })
    }

    pub fn from_f32(context: &Context, data: &[f32], buffer_type: u32, usage: u32) -> Result<Self> {
        Self::from_bytes(context, bytemuck::cast_slice(data), buffer_type, usage)
    }
}

pub struct Program {
    context: Context,
    pub program: glow::Program,
    attributes: FxHashMap<String, AttributeInfo>,
}

impl Drop for Program {
    fn drop(&mut self) {
        unsafe {
            self.context.delete_program(self.program);
        }
    }
}

impl Program {
    pub fn new(context: &Context, shaders: (&str, &str)) -> Result<Self> {
        let vertex_shader = compile_shader(context, ShaderStage::Vertex, shaders.0)?;
        let fragment_shader = match compile_shader(context, ShaderStage::Fragment, shaders.1) {
            Ok(shader) => shader,
            Err(problem) => {
                unsafe { context.delete_shader(vertex_shader) };
                return Err(problem);
            }
        };

        let program = unsafe {
            let program = context
                .create_program()
                .map_err(|_| Problem::CannotCreateProgram)?;
            context.attach_shader(program, vertex_shader);
            context.attach_shader(program, fragment_shader);

            context.link_program(program);

            // Delete the shaders to free up memory
            context.detach_shader(program, vertex_shader);
            context.detach_shader(program, fragment_shader);
            context.delete_shader(vertex_shader);
            context.delete_shader(fragment_shader);

            if !context.get_program_link_status(program) {
                let log = context.get_program_info_log(program);
                context.delete_program(program);
                return Err(Problem::CannotLinkProgram(log));
            }

            program
        };

        // Get attribute locations
        let mut attributes = FxHashMap::default();
        unsafe {
            let attribute_count = context.get_active_attributes(program);
            for num in 0..attribute_count {
                if let Some(info) = context.get_active_attribute(program, num) {
                    if let Some(location) = context.get_attrib_location(program, &info.name) {
                        log::debug!("Attribute {} at location {}", info.name, location);
                        attributes.insert(info.name, AttributeInfo { location });
                    }
                }
            }
        }

        Ok(Program {
            context: Rc::clone(context),
            program,
            attributes,
        })
    }

    pub fn use_program(&self) {
        unsafe {
            self.context.use_program(Some(self.program));
        }
    }

    pub fn get_attrib_location(&self, name: &str) -> Option<u32> {
        self.attributes.get(name).map(|info| info.location)
    }
}

#[derive(Clone)]
struct AttributeInfo {
    location: u32,
}

pub fn compile_shader(context: &Context, stage: ShaderStage, source: &str) -> Result<glow::Shader> {
    unsafe {
        let shader = context
            .create_shader(stage.gl_type())
            .map_err(|_| Problem::CannotCreateShader(stage))?;
        context.shader_source(shader, source);
        context.compile_shader(shader);

        if context.get_shader_compile_status(shader) {
            Ok(shader)
        } else {
            let log = context.get_shader_info_log(shader);
            context.delete_shader(shader);
            Err(Problem::CannotCompileShader { stage, log })
        }
    }
}

/// Describes how one named attribute reads from a vertex buffer.
///
/// `stride` and `offset` are in bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VertexBufferLayout {
    pub name: &'static str,
    pub size: u32,
    pub type_: u32,
    pub stride: u32,
    pub offset: u32,
}

pub struct VertexArrayObject {
    context: Context,
    pub id: glow::VertexArray,
}

impl Drop for VertexArrayObject {
    fn drop(&mut self) {
        unsafe {
            self.context.delete_vertex_array(self.id);
        }
    }
}

impl VertexArrayObject {
    pub fn empty(context: &Context) -> Result<Self> {
        let id = unsafe {
            context
                .create_vertex_array()
                .map_err(|_| Problem::OutOfMemory)?
        };

        Ok(Self {
            id,
            context: Rc::clone(context),
        })
    }

    pub fn new(
        context: &Context,
        program: &Program,
        vertices: &[(&Buffer, VertexBufferLayout)],
    ) -> Result<Self> {
        let vao = Self::empty(context)?;
        vao.update(program, vertices)?;
        Ok(vao)
    }

    pub fn update(&self, program: &Program, vertices: &[(&Buffer, VertexBufferLayout)]) -> Result<()> {
        unsafe {
            self.context.bind_vertex_array(Some(self.id));

            for (vertex, attribute) in vertices.iter() {
                if let Err(problem) = bind_attributes(&self.context, program, vertex, attribute) {
                    self.context.bind_vertex_array(None);
                    return Err(problem);
                }
            }

            self.context.bind_vertex_array(None);
        }

        Ok(())
    }

    pub fn bind(&self) {
        unsafe {
            self.context.bind_vertex_array(Some(self.id));
        }
    }
}

pub fn bind_attributes(
    context: &Context,
    program: &Program,
    buffer: &Buffer,
    buffer_layout: &VertexBufferLayout,
) -> Result<()> {
    unsafe {
        context.bind_buffer(glow::ARRAY_BUFFER, Some(buffer.id));

        if let Some(location) = program.get_attrib_location(buffer_layout.name) {
            match buffer_layout.type_ {
                glow::FLOAT => context.vertex_attrib_pointer_f32(
                    location,
                    buffer_layout.size as i32,
                    buffer_layout.type_,
                    false,
                    buffer_layout.stride as i32,
                    buffer_layout.offset as i32,
                ),
                _ => {
                    context.bind_buffer(glow::ARRAY_BUFFER, None);
                    return Err(Problem::CannotBindUnsupportedVertexType);
                }
            };

            context.enable_vertex_attrib_array(location);
        } else {
            // The driver is free to drop attributes the shader never reads.
            log::warn!("Attribute {} is not active", buffer_layout.name);
        }

        context.bind_buffer(glow::ARRAY_BUFFER, None);
    }

    Ok(())
}
