//! Forward renderer drawing a [`Scene`] through a [`PerspectiveCamera`].
//!
//! A frame runs in passes: shadow maps for every shadow-casting directional light, opaque
//! meshes, blended meshes sorted back to front, particle fields and finally helper lines.

use std::sync::Arc;

use glam::{Mat3, Mat4, Vec3};
use glow::HasContext;

use crate::{
    abs::{Framebuffer, Mesh, ShaderProgram, Texture, TextureHandle, TextureOptions},
    render::{
        helpers,
        lights::{LightSet, MAX_DIRECTIONAL_LIGHTS},
    },
    scene::{
        Blending, ColorVertex, GeometryId, Light, MaterialId, NodeId, NodeKind,
        PerspectiveCamera, Scene, ShadowMapType, Side,
    },
};

macro_rules! shader_program {
    ($gl:expr, $name:literal) => {
        ShaderProgram::from_sources(
            $gl,
            include_str!(concat!("shaders/", $name, "/vert.glsl")),
            include_str!(concat!("shaders/", $name, "/frag.glsl")),
        )
        .map_err(|e| format!("{} program: {e}", $name))
    };
}

// Texture units of the mesh program.
const UNIT_COLOR: u32 = 0;
const UNIT_ALPHA: u32 = 1;
const UNIT_AO: u32 = 2;
const UNIT_DISPLACEMENT: u32 = 3;
const UNIT_NORMAL: u32 = 4;
const UNIT_ROUGHNESS: u32 = 5;
const UNIT_METALNESS: u32 = 6;
const UNIT_MATCAP: u32 = 7;
const UNIT_GRADIENT: u32 = 8;
const UNIT_ENVIRONMENT: u32 = 9;
const UNIT_SHADOW: [u32; MAX_DIRECTIONAL_LIGHTS] = [10, 11];

struct MeshDraw {
    geometry: GeometryId,
    material: MaterialId,
    model: Mat4,
    cast_shadow: bool,
    receive_shadow: bool,
}

/// Everything visible this frame, gathered in one walk over the scene.
#[derive(Default)]
struct DrawList {
    opaque: Vec<MeshDraw>,
    blended: Vec<MeshDraw>,
    points: Vec<(NodeId, Mat4)>,
    lines: Vec<ColorVertex>,
}

impl DrawList {
    fn collect(scene: &Scene, camera_position: Vec3) -> Self {
        let mut list = DrawList::default();
        scene.visit_visible(|id, node, world| match &node.kind {
            NodeKind::Mesh {
                geometry,
                material,
                cast_shadow,
                receive_shadow,
            } => {
                let surface = scene.material(*material);
                let draw = MeshDraw {
                    geometry: *geometry,
                    material: *material,
                    model: world,
                    cast_shadow: *cast_shadow,
                    // Unlit shading models never sample shadow maps.
                    receive_shadow: *receive_shadow && surface.shading.is_lit(),
                };
                if surface.is_blended() {
                    list.blended.push(draw);
                } else {
                    list.opaque.push(draw);
                }
            }
            NodeKind::Points(_) => list.points.push((id, world)),
            NodeKind::AxesHelper { size } => helpers::axes_lines(world, *size, &mut list.lines),
            NodeKind::ShadowCameraHelper { light } if scene.is_visible(*light) => {
                if let NodeKind::Light(Light::Directional {
                    target,
                    shadow: Some(shadow),
                    ..
                }) = &scene.node(*light).kind
                {
                    let position = scene.world_position(*light);
                    let corners = shadow.frustum_corners(position, *target);
                    helpers::frustum_lines(position, &corners, &mut list.lines);
                }
            }
            NodeKind::Group | NodeKind::Light(_) | NodeKind::ShadowCameraHelper { .. } => {}
        });

        sort_back_to_front(&mut list.blended, camera_position);
        list
    }
}

fn sort_back_to_front(draws: &mut [MeshDraw], camera_position: Vec3) {
    draws.sort_by(|a, b| {
        let da = a.model.w_axis.truncate().distance_squared(camera_position);
        let db = b.model.w_axis.truncate().distance_squared(camera_position);
        db.total_cmp(&da)
    });
}

/// Vertex capacity for a line buffer that must hold `needed` vertices, given its current
/// `capacity`. Grows in powers of two and never shrinks.
fn line_capacity(capacity: usize, needed: usize) -> usize {
    if needed <= capacity {
        capacity
    } else {
        needed.next_power_of_two().max(64)
    }
}

/// Owns the GPU programs and per-frame state needed to draw scenes.
pub struct Renderer {
    gl: Arc<glow::Context>,
    mesh_program: ShaderProgram,
    depth_program: ShaderProgram,
    points_program: ShaderProgram,
    lines_program: ShaderProgram,
    /// Bound to every sampler without a texture.
    white: Texture,
    shadow_maps: [Option<Framebuffer>; MAX_DIRECTIONAL_LIGHTS],
    /// Helper lines streamed every frame, with the vertex count it was allocated for.
    line_mesh: Option<(Mesh, usize)>,
    viewport: (u32, u32),
    pub shadow_type: ShadowMapType,
    warned_light_overflow: bool,
}

impl Renderer {
    pub fn new(gl: &Arc<glow::Context>, width: u32, height: u32) -> Result<Self, String> {
        let white = Texture::new_from_data(gl, 1, 1, &[255; 4], TextureOptions::nearest())?;
        let mut renderer = Self {
            gl: Arc::clone(gl),
            mesh_program: shader_program!(gl, "mesh")?,
            depth_program: shader_program!(gl, "depth")?,
            points_program: shader_program!(gl, "points")?,
            lines_program: shader_program!(gl, "lines")?,
            white,
            shadow_maps: [None, None],
            line_mesh: None,
            viewport: (width, height),
            shadow_type: ShadowMapType::Pcf,
            warned_light_overflow: false,
        };
        renderer.set_viewport(width, height);
        Ok(renderer)
    }

    /// Resizes the default framebuffer viewport, in pixels.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
        unsafe {
            self.gl.viewport(0, 0, width as i32, height as i32);
        }
    }

    /// Draws one frame of `scene` into the default framebuffer.
    pub fn render(&mut self, scene: &mut Scene, camera: &PerspectiveCamera) -> Result<(), String> {
        self.upload(scene)?;

        let lights = LightSet::gather(scene);
        if lights.dropped > 0 && !self.warned_light_overflow {
            log::warn!(
                "{} lights exceed the per-draw limit and are ignored",
                lights.dropped
            );
            self.warned_light_overflow = true;
        }

        let list = DrawList::collect(scene, camera.position);
        self.shadow_pass(scene, &lights, &list)?;

        let background = scene.background;
        unsafe {
            self.gl
                .viewport(0, 0, self.viewport.0 as i32, self.viewport.1 as i32);
            self.gl
                .clear_color(background.x, background.y, background.z, 1.0);
            self.gl
                .clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
            self.gl.enable(glow::DEPTH_TEST);
            self.gl.depth_mask(true);
            self.gl.disable(glow::BLEND);
        }

        self.mesh_program.use_program();
        self.set_frame_uniforms(scene, camera, &lights);
        for draw in &list.opaque {
            self.draw_mesh(scene, draw);
        }
        unsafe {
            self.gl.enable(glow::BLEND);
            self.gl
                .blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
        }
        for draw in &list.blended {
            self.draw_mesh(scene, draw);
        }

        self.draw_points(scene, camera, &list.points);
        self.draw_lines(camera, &list.lines)?;

        unsafe {
            self.gl.depth_mask(true);
            self.gl.enable(glow::DEPTH_TEST);
            self.gl.disable(glow::BLEND);
            self.gl.polygon_mode(glow::FRONT_AND_BACK, glow::FILL);
        }
        Ok(())
    }

    /// Creates GPU buffers for new geometries and refreshes particle fields that moved.
    fn upload(&self, scene: &mut Scene) -> Result<(), String> {
        for slot in scene.geometries.iter_mut().filter(|slot| slot.gpu.is_none()) {
            slot.gpu = Some(Mesh::new(
                &self.gl,
                &slot.geometry.vertices,
                &slot.geometry.indices,
                glow::TRIANGLES,
            )?);
        }
        for (name, points) in scene.points_iter_mut() {
            if points.field.is_empty() {
                continue;
            }
            match &mut points.gpu {
                Some(mesh) => {
                    if points.field.is_dirty() {
                        mesh.update_vertices(&points.field.take_vertices());
                    }
                }
                None => {
                    log::debug!("Uploading {} particles of {name}", points.field.len());
                    let indices: Vec<u32> = (0..points.field.len() as u32).collect();
                    let vertices = points.field.take_vertices();
                    points.gpu = Some(Mesh::new(&self.gl, &vertices, &indices, glow::POINTS)?);
                }
            }
        }
        Ok(())
    }

    fn shadow_pass(&mut self, scene: &Scene, lights: &LightSet, list: &DrawList) -> Result<(), String> {
        for (slot, light) in lights.directional.iter().enumerate() {
            let Some((shadow, light_matrix)) = &light.shadow else {
                continue;
            };
            let size = shadow.map_size.max(1);
            if self.shadow_maps[slot]
                .as_ref()
                .is_none_or(|map| map.size() != size)
            {
                log::debug!("Allocating {size}x{size} shadow map");
                self.shadow_maps[slot] = Some(Framebuffer::depth_only(&self.gl, size)?);
            }
            let Some(map) = &self.shadow_maps[slot] else {
                continue;
            };

            map.bind();
            unsafe {
                self.gl.viewport(0, 0, size as i32, size as i32);
                self.gl.enable(glow::DEPTH_TEST);
                self.gl.depth_mask(true);
                self.gl.clear(glow::DEPTH_BUFFER_BIT);
            }
            self.depth_program.use_program();
            self.depth_program.set_uniform("u_light_matrix", light_matrix);
            for draw in list.opaque.iter().chain(&list.blended) {
                if !draw.cast_shadow {
                    continue;
                }
                let Some(mesh) = &scene.geometries[draw.geometry.0].gpu else {
                    continue;
                };
                // Front-facing materials cast from their back faces, which keeps acne off lit
                // surfaces.
                self.apply_side(match scene.material(draw.material).side {
                    Side::Front => Side::Back,
                    Side::Back => Side::Front,
                    Side::Double => Side::Double,
                });
                self.depth_program.set_uniform("u_model", draw.model);
                mesh.draw();
            }
        }
        Framebuffer::unbind(&self.gl);
        Ok(())
    }

    fn set_frame_uniforms(&self, scene: &Scene, camera: &PerspectiveCamera, lights: &LightSet) {
        let program = &self.mesh_program;
        program.set_uniform("u_view", camera.view());
        program.set_uniform("u_projection", camera.projection());
        program.set_uniform("u_camera_position", camera.position);

        program.set_uniform("u_ambient", lights.ambient);
        program.set_uniform("u_dir_count", lights.directional.len() as i32);
        for (i, light) in lights.directional.iter().enumerate() {
            program.set_uniform(&format!("u_dir_radiance[{i}]"), light.radiance);
            program.set_uniform(&format!("u_dir_direction[{i}]"), light.direction);
            program.set_uniform(&format!("u_dir_cast_shadow[{i}]"), light.shadow.is_some());
            if let Some((shadow, matrix)) = &light.shadow {
                program.set_uniform(&format!("u_dir_shadow_matrix[{i}]"), matrix);
                program.set_uniform(&format!("u_dir_shadow_bias[{i}]"), shadow.bias);
                program.set_uniform(&format!("u_dir_shadow_radius[{i}]"), shadow.radius);
                program.set_uniform(
                    &format!("u_dir_shadow_texel[{i}]"),
                    1.0 / shadow.map_size.max(1) as f32,
                );
            }
        }
        for (i, unit) in UNIT_SHADOW.into_iter().enumerate() {
            program.set_uniform(&format!("u_shadow_map_{i}"), unit as i32);
            let map = lights.directional.get(i).and_then(|light| light.shadow.as_ref());
            match (map, &self.shadow_maps[i]) {
                (Some(_), Some(framebuffer)) => framebuffer.depth_texture().bind(unit),
                _ => self.white.bind(unit),
            }
        }
        program.set_uniform("u_shadow_type", self.shadow_type.shader_id());

        program.set_uniform("u_point_count", lights.point.len() as i32);
        for (i, light) in lights.point.iter().enumerate() {
            program.set_uniform(&format!("u_point_position[{i}]"), light.position);
            program.set_uniform(&format!("u_point_radiance[{i}]"), light.radiance);
            program.set_uniform(&format!("u_point_distance[{i}]"), light.distance);
        }

        set_fog_uniforms(program, scene);
    }

    fn bind_map(&self, name: &str, unit: u32, map: Option<TextureHandle>) {
        let program = &self.mesh_program;
        program.set_uniform(&format!("u_has_{name}"), map.is_some());
        program.set_uniform(&format!("u_{name}"), unit as i32);
        match map {
            Some(handle) => handle.bind(&self.gl, unit),
            None => self.white.bind(unit),
        }
    }

    fn draw_mesh(&self, scene: &Scene, draw: &MeshDraw) {
        let Some(mesh) = &scene.geometries[draw.geometry.0].gpu else {
            return;
        };
        let material = scene.material(draw.material);
        let program = &self.mesh_program;

        program.set_uniform("u_model", draw.model);
        program.set_uniform(
            "u_normal_matrix",
            Mat3::from_mat4(draw.model).inverse().transpose(),
        );
        program.set_uniform("u_receive_shadow", draw.receive_shadow);

        program.set_uniform("u_shading", material.shading.shader_id());
        program.set_uniform("u_color", material.color);
        program.set_uniform("u_opacity", material.opacity);
        program.set_uniform("u_double_sided", material.side == Side::Double);
        program.set_uniform("u_roughness", material.roughness);
        program.set_uniform("u_metalness", material.metalness);
        program.set_uniform("u_shininess", material.shininess);
        program.set_uniform("u_specular", material.specular);
        program.set_uniform("u_ao_intensity", material.ao_intensity);
        program.set_uniform("u_displacement_scale", material.displacement_scale);
        program.set_uniform("u_normal_scale", material.normal_scale);
        program.set_uniform("u_uv_transform", material.uv_transform.matrix());

        let maps = &material.maps;
        self.bind_map("color_map", UNIT_COLOR, maps.color);
        self.bind_map("alpha_map", UNIT_ALPHA, maps.alpha);
        self.bind_map("ao_map", UNIT_AO, maps.ambient_occlusion);
        self.bind_map("displacement_map", UNIT_DISPLACEMENT, maps.displacement);
        self.bind_map("normal_map", UNIT_NORMAL, maps.normal);
        self.bind_map("roughness_map", UNIT_ROUGHNESS, maps.roughness);
        self.bind_map("metalness_map", UNIT_METALNESS, maps.metalness);
        self.bind_map("matcap", UNIT_MATCAP, maps.matcap);
        self.bind_map("gradient_map", UNIT_GRADIENT, maps.gradient);
        program.set_uniform("u_has_env_map", maps.environment.is_some());
        program.set_uniform("u_env_map", UNIT_ENVIRONMENT as i32);
        if let Some(environment) = maps.environment {
            environment.bind(&self.gl, UNIT_ENVIRONMENT);
        }

        self.apply_side(material.side);
        unsafe {
            self.gl.polygon_mode(
                glow::FRONT_AND_BACK,
                if material.wireframe {
                    glow::LINE
                } else {
                    glow::FILL
                },
            );
        }
        mesh.draw();
    }

    fn apply_side(&self, side: Side) {
        unsafe {
            match side {
                Side::Front => {
                    self.gl.enable(glow::CULL_FACE);
                    self.gl.cull_face(glow::BACK);
                }
                Side::Back => {
                    self.gl.enable(glow::CULL_FACE);
                    self.gl.cull_face(glow::FRONT);
                }
                Side::Double => self.gl.disable(glow::CULL_FACE),
            }
        }
    }

    fn draw_points(&self, scene: &Scene, camera: &PerspectiveCamera, points: &[(NodeId, Mat4)]) {
        if points.is_empty() {
            return;
        }
        let program = &self.points_program;
        program.use_program();
        program.set_uniform("u_view", camera.view());
        program.set_uniform("u_projection", camera.projection());
        program.set_uniform("u_scale", self.viewport.1 as f32 * 0.5);
        program.set_uniform("u_alpha_map", UNIT_COLOR as i32);
        set_fog_uniforms(program, scene);

        unsafe {
            self.gl.enable(glow::PROGRAM_POINT_SIZE);
            self.gl.disable(glow::CULL_FACE);
            self.gl.polygon_mode(glow::FRONT_AND_BACK, glow::FILL);
        }

        for &(id, model) in points {
            let NodeKind::Points(points) = &scene.node(id).kind else {
                continue;
            };
            let Some(mesh) = &points.gpu else {
                continue;
            };
            let material = &points.material;

            program.set_uniform("u_model", model);
            program.set_uniform("u_size", material.size);
            program.set_uniform("u_size_attenuation", material.size_attenuation);
            program.set_uniform("u_color", material.color);
            program.set_uniform("u_vertex_colors", material.vertex_colors);
            program.set_uniform("u_alpha_test", material.alpha_test);
            program.set_uniform("u_has_alpha_map", material.alpha_map.is_some());
            match material.alpha_map {
                Some(handle) => handle.bind(&self.gl, UNIT_COLOR),
                None => self.white.bind(UNIT_COLOR),
            }

            unsafe {
                if material.depth_test {
                    self.gl.enable(glow::DEPTH_TEST);
                } else {
                    self.gl.disable(glow::DEPTH_TEST);
                }
                self.gl.depth_mask(material.depth_write);
                match material.blending {
                    Blending::Additive => {
                        self.gl.enable(glow::BLEND);
                        self.gl.blend_func(glow::SRC_ALPHA, glow::ONE);
                    }
                    Blending::Normal if material.transparent => {
                        self.gl.enable(glow::BLEND);
                        self.gl
                            .blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
                    }
                    Blending::Normal => self.gl.disable(glow::BLEND),
                }
            }
            mesh.draw();
        }
    }

    fn draw_lines(
        &mut self,
        camera: &PerspectiveCamera,
        vertices: &[ColorVertex],
    ) -> Result<(), String> {
        if vertices.is_empty() {
            return Ok(());
        }
        let current = self.line_mesh.as_ref().map_or(0, |(_, capacity)| *capacity);
        let capacity = line_capacity(current, vertices.len());
        if capacity != current {
            log::debug!("Allocating line buffer for {capacity} vertices");
            let blank = vec![
                ColorVertex {
                    position: Vec3::ZERO,
                    color: Vec3::ZERO,
                };
                capacity
            ];
            let indices: Vec<u32> = (0..capacity as u32).collect();
            let mesh = Mesh::new(&self.gl, &blank, &indices, glow::LINES)?;
            self.line_mesh = Some((mesh, capacity));
        }
        let Some((mesh, _)) = &mut self.line_mesh else {
            return Ok(());
        };
        mesh.update_vertices(vertices);

        self.lines_program.use_program();
        self.lines_program
            .set_uniform("u_view_projection", camera.projection() * camera.view());
        unsafe {
            self.gl.enable(glow::DEPTH_TEST);
            self.gl.depth_mask(true);
            self.gl.disable(glow::BLEND);
        }
        mesh.draw_first(vertices.len());
        Ok(())
    }
}

fn set_fog_uniforms(program: &ShaderProgram, scene: &Scene) {
    program.set_uniform("u_fog_enabled", scene.fog.is_some());
    if let Some(fog) = &scene.fog {
        program.set_uniform("u_fog_color", fog.color);
        program.set_uniform("u_fog_near", fog.near);
        program.set_uniform("u_fog_far", fog.far);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Geometry, Material, Shading};

    #[test]
    fn test_blended_meshes_sort_far_to_near() {
        let mut scene = Scene::new();
        let geometry = scene.add_geometry(Geometry::plane(1.0, 1.0, 1, 1));
        let mut glass = Material::basic(Vec3::ONE);
        glass.transparent = true;
        glass.opacity = 0.5;
        let glass = scene.add_material(glass);
        let solid = scene.add_material(Material::basic(Vec3::ONE));

        for z in [-1.0, -5.0, -3.0] {
            let id = scene.add_mesh(None, "glass", geometry, glass);
            scene.transform_mut(id).position = Vec3::new(0.0, 0.0, z);
        }
        scene.add_mesh(None, "solid", geometry, solid);

        let list = DrawList::collect(&scene, Vec3::new(0.0, 0.0, 3.0));
        assert_eq!(list.opaque.len(), 1);
        let depths: Vec<f32> = list.blended.iter().map(|d| d.model.w_axis.z).collect();
        assert_eq!(depths, vec![-5.0, -3.0, -1.0]);
    }

    #[test]
    fn test_hidden_shadow_helper_draws_nothing() {
        let mut scene = Scene::new();
        let sun = scene.add_light(
            None,
            "sun",
            Light::directional(Vec3::ONE, 0.5).with_shadow(Default::default()),
        );
        scene.transform_mut(sun).position = Vec3::new(2.0, 2.0, -1.0);
        let helper = scene.add(None, "helper", NodeKind::ShadowCameraHelper { light: sun });

        assert_eq!(DrawList::collect(&scene, Vec3::ZERO).lines.len(), 32);
        scene.node_mut(helper).visible = false;
        assert!(DrawList::collect(&scene, Vec3::ZERO).lines.is_empty());
    }

    #[test]
    fn test_shadow_helper_of_hidden_light_draws_nothing() {
        let mut scene = Scene::new();
        let rig = scene.add_group(None, "rig");
        let sun = scene.add_light(
            Some(rig),
            "sun",
            Light::directional(Vec3::ONE, 0.5).with_shadow(Default::default()),
        );
        scene.transform_mut(sun).position = Vec3::new(2.0, 2.0, -1.0);
        scene.add(None, "helper", NodeKind::ShadowCameraHelper { light: sun });

        scene.node_mut(rig).visible = false;
        assert!(DrawList::collect(&scene, Vec3::ZERO).lines.is_empty());
    }

    #[test]
    fn test_unlit_meshes_ignore_shadow_receiving() {
        let mut scene = Scene::new();
        let geometry = scene.add_geometry(Geometry::plane(1.0, 1.0, 1, 1));
        let basic = scene.add_material(Material::basic(Vec3::ONE));
        let mut lit = Material::basic(Vec3::ONE);
        lit.shading = Shading::Standard;
        let lit = scene.add_material(lit);
        for material in [basic, lit] {
            let id = scene.add_mesh(None, "floor", geometry, material);
            scene.set_shadows(id, false, true);
        }

        let list = DrawList::collect(&scene, Vec3::ZERO);
        let receives: Vec<bool> = list.opaque.iter().map(|d| d.receive_shadow).collect();
        assert_eq!(receives, vec![false, true]);
    }

    #[test]
    fn test_line_buffer_grows_in_powers_of_two() {
        assert_eq!(line_capacity(0, 6), 64);
        assert_eq!(line_capacity(64, 38), 64);
        assert_eq!(line_capacity(64, 65), 128);
        assert_eq!(line_capacity(128, 6), 128);
        assert_eq!(line_capacity(128, 300), 512);
    }
}
