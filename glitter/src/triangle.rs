use crate::{data, render, render_loop, settings, shader};
use render::{Buffer, Context, Problem, VertexArrayObject, VertexBufferLayout};
use render_loop::Renderer;
use settings::Settings;
use shader::Shader;

use glow::HasContext;
use std::rc::Rc;

pub const POSITION_ATTRIBUTE: &str = "aPos";
pub const COLOR_ATTRIBUTE: &str = "aColor";

pub struct Triangle {
    context: Context,
    clear_color: [f32; 4],

    // Drop order: the vertex array goes before the buffer it references.
    vertex_array: VertexArrayObject,
    #[allow(unused)]
    vertex_buffer: Buffer,
    // Without a program the triangle only clears the screen.
    shader: Option<Shader>,
}

impl Triangle {
    pub fn new(context: &Context, settings: &Settings) -> Result<Self, Problem> {
        let shader = shader::report_failure(Shader::new(context, &settings.shaders));

        let vertices = data::triangle_floats();
        log::debug!("Uploading {} vertex floats", vertices.len());

        let vertex_buffer =
            Buffer::from_f32(context, vertices, glow::ARRAY_BUFFER, glow::STATIC_DRAW)?;
        let vertex_array = match shader.as_ref() {
            Some(shader) => VertexArrayObject::new(
                context,
                shader.program(),
                &vertex_layout(&vertex_buffer),
            )?,
            None => VertexArrayObject::empty(context)?,
        };

        if settings.wireframe {
            log::info!("Drawing in wireframe mode");
            unsafe {
                context.polygon_mode(glow::FRONT_AND_BACK, glow::LINE);
            }
        }

        Ok(Self {
            context: Rc::clone(context),
            clear_color: settings.clear_color,
            vertex_array,
            vertex_buffer,
            shader,
        })
    }
}

fn vertex_layout(buffer: &Buffer) -> [(&Buffer, VertexBufferLayout); 2] {
    [
        (
            buffer,
            VertexBufferLayout {
                name: POSITION_ATTRIBUTE,
                size: data::POSITION_COMPONENTS,
                type_: glow::FLOAT,
                stride: data::VERTEX_STRIDE,
                offset: data::POSITION_OFFSET,
            },
        ),
        (
            buffer,
            VertexBufferLayout {
                name: COLOR_ATTRIBUTE,
                size: data::COLOR_COMPONENTS,
                type_: glow::FLOAT,
                stride: data::VERTEX_STRIDE,
                offset: data::COLOR_OFFSET,
            },
        ),
    ]
}

impl Renderer for Triangle {
    fn resize(&mut self, width: u32, height: u32) {
        unsafe {
            self.context.viewport(0, 0, width as i32, height as i32);
        }
    }

    fn draw(&mut self) {
        let [r, g, b, a] = self.clear_color;

        unsafe {
            self.context.clear_color(r, g, b, a);
            self.context.clear(glow::COLOR_BUFFER_BIT);

            if let Some(shader) = self.shader.as_ref() {
                shader.activate();
                self.vertex_array.bind();
                self.context
                    .draw_arrays(glow::TRIANGLES, 0, data::TRIANGLE_VERTICES.len() as i32);
            }
        }
    }
}

impl Drop for Triangle {
    fn drop(&mut self) {
        log::debug!("Deleting the triangle's vertex array and buffer");
    }
}
