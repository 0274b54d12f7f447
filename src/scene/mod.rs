//! A small retained-mode scene graph.
//!
//! Nodes are stored in an arena and addressed by [`NodeId`]. Geometries and materials live in
//! their own arenas so several meshes can share them; editing a material through
//! [`Scene::material_mut`] affects every mesh that uses it.

pub mod camera;
pub mod geometry;
pub mod light;
pub mod material;
pub mod particles;

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::abs::Mesh;

pub use camera::*;
pub use geometry::*;
pub use light::*;
pub use material::*;
pub use particles::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GeometryId(pub(crate) usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MaterialId(pub(crate) usize);

/// Local position, rotation and scale of a node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Sets the rotation from Euler angles applied in the given axis order.
    pub fn set_euler(&mut self, order: EulerRot, a: f32, b: f32, c: f32) {
        self.rotation = Quat::from_euler(order, a, b, c);
    }

    /// Rotates around the node's own X axis.
    pub fn rotate_x(&mut self, angle: f32) {
        self.rotation *= Quat::from_rotation_x(angle);
    }

    /// Rotates around the node's own Y axis.
    pub fn rotate_y(&mut self, angle: f32) {
        self.rotation *= Quat::from_rotation_y(angle);
    }

    /// Rotates around the node's own Z axis.
    pub fn rotate_z(&mut self, angle: f32) {
        self.rotation *= Quat::from_rotation_z(angle);
    }
}

/// A particle field together with its material and its lazily created GPU buffer.
pub struct Points {
    pub field: ParticleField,
    pub material: PointsMaterial,
    pub(crate) gpu: Option<Mesh>,
}

/// What a node contributes to the rendered image.
pub enum NodeKind {
    /// Pure transform, used to move several children together.
    Group,
    Mesh {
        geometry: GeometryId,
        material: MaterialId,
        cast_shadow: bool,
        receive_shadow: bool,
    },
    Points(Box<Points>),
    Light(Light),
    /// Red, green and blue lines along the positive X, Y and Z axes.
    AxesHelper { size: f32 },
    /// Wireframe of the shadow camera of the directional light node it references.
    ShadowCameraHelper { light: NodeId },
}

pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub visible: bool,
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

pub(crate) struct GeometrySlot {
    pub geometry: Geometry,
    pub gpu: Option<Mesh>,
}

/// Linear distance fog.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fog {
    pub color: Vec3,
    pub near: f32,
    pub far: f32,
}

/// The root of a scene: nodes, shared geometries and materials, and global settings.
pub struct Scene {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
    pub(crate) geometries: Vec<GeometrySlot>,
    materials: Vec<Material>,
    pub fog: Option<Fog>,
    pub background: Vec3,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            roots: Vec::new(),
            geometries: Vec::new(),
            materials: Vec::new(),
            fog: None,
            background: Vec3::ZERO,
        }
    }

    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryId {
        self.geometries.push(GeometrySlot {
            geometry,
            gpu: None,
        });
        GeometryId(self.geometries.len() - 1)
    }

    pub fn geometry(&self, id: GeometryId) -> &Geometry {
        &self.geometries[id.0].geometry
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    pub fn material(&self, id: MaterialId) -> &Material {
        &self.materials[id.0]
    }

    pub fn material_mut(&mut self, id: MaterialId) -> &mut Material {
        &mut self.materials[id.0]
    }

    /// Adds a node under `parent`, or at the top level when `parent` is `None`.
    pub fn add(&mut self, parent: Option<NodeId>, name: &str, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: name.to_string(),
            transform: Transform::default(),
            visible: true,
            kind,
            parent,
            children: Vec::new(),
        });
        match parent {
            Some(parent) => self.nodes[parent.0].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    pub fn add_group(&mut self, parent: Option<NodeId>, name: &str) -> NodeId {
        self.add(parent, name, NodeKind::Group)
    }

    pub fn add_mesh(
        &mut self,
        parent: Option<NodeId>,
        name: &str,
        geometry: GeometryId,
        material: MaterialId,
    ) -> NodeId {
        self.add(
            parent,
            name,
            NodeKind::Mesh {
                geometry,
                material,
                cast_shadow: false,
                receive_shadow: false,
            },
        )
    }

    pub fn add_light(&mut self, parent: Option<NodeId>, name: &str, light: Light) -> NodeId {
        self.add(parent, name, NodeKind::Light(light))
    }

    pub fn add_points(
        &mut self,
        parent: Option<NodeId>,
        name: &str,
        field: ParticleField,
        material: PointsMaterial,
    ) -> NodeId {
        self.add(
            parent,
            name,
            NodeKind::Points(Box::new(Points {
                field,
                material,
                gpu: None,
            })),
        )
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn transform_mut(&mut self, id: NodeId) -> &mut Transform {
        &mut self.nodes[id.0].transform
    }

    /// Sets shadow flags on a mesh node. Other node kinds are left alone.
    pub fn set_shadows(&mut self, id: NodeId, cast: bool, receive: bool) {
        if let NodeKind::Mesh {
            cast_shadow,
            receive_shadow,
            ..
        } = &mut self.nodes[id.0].kind
        {
            *cast_shadow = cast;
            *receive_shadow = receive;
        }
    }

    pub fn light(&self, id: NodeId) -> Option<&Light> {
        match &self.nodes[id.0].kind {
            NodeKind::Light(light) => Some(light),
            _ => None,
        }
    }

    pub fn light_mut(&mut self, id: NodeId) -> Option<&mut Light> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Light(light) => Some(light),
            _ => None,
        }
    }

    pub fn points_mut(&mut self, id: NodeId) -> Option<&mut Points> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Points(points) => Some(points),
            _ => None,
        }
    }

    /// Matrix taking the node's local space to world space.
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let node = &self.nodes[id.0];
        let local = node.transform.matrix();
        match node.parent {
            Some(parent) => self.world_matrix(parent) * local,
            None => local,
        }
    }

    pub fn world_position(&self, id: NodeId) -> Vec3 {
        self.world_matrix(id).w_axis.truncate()
    }

    /// Whether the node and all of its ancestors are visible.
    pub fn is_visible(&self, id: NodeId) -> bool {
        let node = &self.nodes[id.0];
        node.visible && node.parent.is_none_or(|parent| self.is_visible(parent))
    }

    /// Visits every visible node depth-first with its world matrix.
    pub fn visit_visible(&self, mut visitor: impl FnMut(NodeId, &Node, Mat4)) {
        let mut stack: Vec<(NodeId, Mat4)> = self
            .roots
            .iter()
            .rev()
            .map(|&id| (id, Mat4::IDENTITY))
            .collect();
        while let Some((id, parent_matrix)) = stack.pop() {
            let node = &self.nodes[id.0];
            if !node.visible {
                continue;
            }
            let world = parent_matrix * node.transform.matrix();
            visitor(id, node, world);
            for &child in node.children.iter().rev() {
                stack.push((child, world));
            }
        }
    }

    /// Iterates mutably over every particle field in the scene, with its node name.
    pub fn points_iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Points)> {
        self.nodes.iter_mut().filter_map(|Node { name, kind, .. }| match kind {
            NodeKind::Points(points) => Some((name.as_str(), points.as_mut())),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;

    #[test]
    fn test_world_matrix_composes_parent() {
        let mut scene = Scene::new();
        let group = scene.add_group(None, "group");
        scene.transform_mut(group).position = Vec3::new(1.0, 0.0, 0.0);
        scene.transform_mut(group).rotate_y(FRAC_PI_2);
        let child = scene.add_group(Some(group), "child");
        scene.transform_mut(child).position = Vec3::new(0.0, 0.0, 2.0);

        let position = scene.world_position(child);
        assert!((position - Vec3::new(3.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_scale_does_not_move_children_origin() {
        let mut scene = Scene::new();
        let parent = scene.add_group(None, "parent");
        scene.transform_mut(parent).scale = Vec3::splat(0.5);
        scene.transform_mut(parent).position = Vec3::new(0.8, 0.2, 2.2);
        let child = scene.add_group(Some(parent), "child");
        assert_eq!(scene.world_position(child), Vec3::new(0.8, 0.2, 2.2));
    }

    #[test]
    fn test_hidden_parent_hides_subtree() {
        let mut scene = Scene::new();
        let group = scene.add_group(None, "group");
        let child = scene.add_group(Some(group), "child");
        let sibling = scene.add_group(None, "sibling");
        scene.node_mut(group).visible = false;

        assert!(!scene.is_visible(child));
        assert!(scene.is_visible(sibling));
        let mut seen = Vec::new();
        scene.visit_visible(|id, _, _| seen.push(id));
        assert_eq!(seen, vec![sibling]);
    }

    #[test]
    fn test_visit_order_is_depth_first() {
        let mut scene = Scene::new();
        let a = scene.add_group(None, "a");
        let a1 = scene.add_group(Some(a), "a1");
        let b = scene.add_group(None, "b");
        let a2 = scene.add_group(Some(a), "a2");
        let mut seen = Vec::new();
        scene.visit_visible(|id, _, _| seen.push(id));
        assert_eq!(seen, vec![a, a1, a2, b]);
        assert_eq!(scene.node(a).children, vec![a1, a2]);
        assert_eq!(scene.node(a2).parent, Some(a));
    }

    #[test]
    fn test_shared_material_edit() {
        let mut scene = Scene::new();
        let geometry = scene.add_geometry(Geometry::sphere(0.5, 8, 8));
        let material = scene.add_material(Material::standard(Vec3::ONE));
        let sphere = scene.add_mesh(None, "sphere", geometry, material);
        let plane = scene.add_mesh(None, "plane", geometry, material);
        scene.set_shadows(sphere, true, false);
        scene.material_mut(material).roughness = 0.7;

        for id in [sphere, plane] {
            let NodeKind::Mesh { material, .. } = scene.node(id).kind else {
                panic!("expected a mesh");
            };
            assert_eq!(scene.material(material).roughness, 0.7);
        }
        assert!(matches!(
            scene.node(sphere).kind,
            NodeKind::Mesh {
                cast_shadow: true,
                receive_shadow: false,
                ..
            }
        ));
    }

    #[test]
    fn test_euler_order_matters() {
        let mut xyz = Transform::default();
        xyz.set_euler(EulerRot::XYZ, 0.5, 0.5, 0.0);
        let mut yxz = Transform::default();
        yxz.set_euler(EulerRot::YXZ, 0.5, 0.5, 0.0);
        assert!(xyz.rotation.angle_between(yxz.rotation) > 1e-3);
    }
}
