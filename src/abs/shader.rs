//! OpenGL Shaders
//!
//! This module defines the [`Shader`] and [`ShaderProgram`] structs for managing OpenGL shaders.
//! This module also provides the [`Uniform`] trait for setting uniform variables in shader
//! programs.

use std::{cell::RefCell, sync::Arc};

use fxhash::FxHashMap;
use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};
use glow::HasContext;

/// Represents an individual OpenGL shader.
pub struct Shader {
    gl: Arc<glow::Context>,
    id: glow::Shader,
}

impl Shader {
    /// Compiles a new shader from the given source code.
    pub fn new(gl: &Arc<glow::Context>, shader_type: u32, source: &str) -> Result<Self, String> {
        unsafe {
            let shader = gl.create_shader(shader_type).map_err(|e| e.to_string())?;
            gl.shader_source(shader, source);
            gl.compile_shader(shader);

            if !gl.get_shader_compile_status(shader) {
                let log = gl.get_shader_info_log(shader);
                gl.delete_shader(shader);
                return Err(log);
            }

            Ok(Self {
                gl: Arc::clone(gl),
                id: shader,
            })
        }
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_shader(self.id);
        }
    }
}

/// Represents a uniform variable in a shader program.
pub trait Uniform {
    /// Uploads the value to the given uniform location of the bound program.
    fn set_uniform(&self, gl: &glow::Context, location: &glow::UniformLocation);
}

impl Uniform for bool {
    fn set_uniform(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_1_i32(Some(location), *self as i32) }
    }
}

impl Uniform for f32 {
    fn set_uniform(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_1_f32(Some(location), *self) }
    }
}

impl Uniform for i32 {
    fn set_uniform(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_1_i32(Some(location), *self) }
    }
}

impl Uniform for Vec2 {
    fn set_uniform(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_2_f32(Some(location), self.x, self.y) }
    }
}

impl Uniform for Vec3 {
    fn set_uniform(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_3_f32(Some(location), self.x, self.y, self.z) }
    }
}

impl Uniform for Vec4 {
    fn set_uniform(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_4_f32(Some(location), self.x, self.y, self.z, self.w) }
    }
}

impl Uniform for Mat3 {
    fn set_uniform(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_matrix_3_f32_slice(Some(location), false, self.as_ref()) }
    }
}

impl Uniform for Mat4 {
    fn set_uniform(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_matrix_4_f32_slice(Some(location), false, self.as_ref()) }
    }
}

impl<T: Uniform> Uniform for &T {
    fn set_uniform(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        (*self).set_uniform(gl, location);
    }
}

/// Represents an OpenGL shader program composed of multiple shaders.
///
/// Uniform locations are looked up once per name and cached, since the renderer sets
/// dozens of uniforms per draw call.
pub struct ShaderProgram {
    gl: Arc<glow::Context>,
    id: glow::Program,
    locations: RefCell<FxHashMap<String, Option<glow::UniformLocation>>>,
}

impl ShaderProgram {
    /// Links a new shader program from the given shaders.
    pub fn new(gl: &Arc<glow::Context>, shaders: &[&Shader]) -> Result<Self, String> {
        unsafe {
            let program = gl.create_program().map_err(|e| e.to_string())?;

            for shader in shaders {
                gl.attach_shader(program, shader.id);
            }

            gl.link_program(program);

            if !gl.get_program_link_status(program) {
                let log = gl.get_program_info_log(program);
                gl.delete_program(program);
                return Err(log);
            }

            for shader in shaders {
                gl.detach_shader(program, shader.id);
            }

            Ok(Self {
                gl: Arc::clone(gl),
                id: program,
                locations: RefCell::new(FxHashMap::default()),
            })
        }
    }

    /// Compiles a vertex and a fragment shader and links them into a program.
    pub fn from_sources(
        gl: &Arc<glow::Context>,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self, String> {
        let vert = Shader::new(gl, glow::VERTEX_SHADER, vertex_source)
            .map_err(|e| format!("vertex shader: {e}"))?;
        let frag = Shader::new(gl, glow::FRAGMENT_SHADER, fragment_source)
            .map_err(|e| format!("fragment shader: {e}"))?;
        Self::new(gl, &[&vert, &frag])
    }

    /// Binds the shader program for use.
    pub fn use_program(&self) {
        unsafe {
            self.gl.use_program(Some(self.id));
        }
    }

    /// Sets a uniform variable in the shader program.
    ///
    /// Uniforms the driver optimised away are silently skipped.
    pub fn set_uniform<T: Uniform>(&self, name: &str, value: T) {
        let mut locations = self.locations.borrow_mut();
        let location = locations
            .entry(name.to_string())
            .or_insert_with(|| unsafe { self.gl.get_uniform_location(self.id, name) });
        if let Some(location) = location {
            value.set_uniform(&self.gl, location);
        }
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_program(self.id);
        }
    }
}
