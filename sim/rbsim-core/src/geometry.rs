//! Solid shapes that supply mass properties to rigid bodies.
//!
//! A [`RigidBody`](crate::RigidBody) only needs three things from its shape:
//! the enclosed volume, the centroid, and the inertia about the centroid for a
//! given mass. That contract is the [`Solid`] trait. Two shapes implement it:
//!
//! - [`Sphere`] - closed-form properties
//! - [`Polyhedron`] - closed polygonal surface, integrated by signed tetrahedra
//!
//! # Polyhedron integration
//!
//! Each face is fanned into triangles from its centroid, and every triangle
//! `(A, B, C)` forms a signed tetrahedron with the local origin:
//!
//! ```text
//! dV  = A·(B×C) / 6
//! Σ dV·(A+B+C)/4                            → first moment
//! Σ dV·(mmoi(A+B) + mmoi(B+C) + mmoi(C+A))/20 → second moment about origin
//! ```
//!
//! Faces must be wound counter-clockwise when seen from outside so the
//! signed volumes add up positive.

use nalgebra::{Matrix3, Vector3};
use rbsim_types::algebra::mmoi;
use rbsim_types::{Pose, VectorExt, SMALL, TINY};
use tracing::warn;

/// Shape contract used to derive a body's mass properties.
pub trait Solid: std::fmt::Debug + Send + Sync {
    /// Enclosed volume.
    fn volume(&self) -> f64;

    /// Centroid in the body's local frame.
    fn center(&self) -> Vector3<f64>;

    /// Inertia tensor about the centroid for a uniform body of `mass`.
    fn inertia_about_center(&self, mass: f64) -> Matrix3<f64>;
}

/// A solid sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    /// Centre in the local frame.
    pub center: Vector3<f64>,
    /// Radius.
    pub radius: f64,
}

impl Sphere {
    /// Sphere of `radius` centred at `center`.
    #[must_use]
    pub fn new(center: Vector3<f64>, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Sphere of `radius` centred at the local origin.
    #[must_use]
    pub fn centered(radius: f64) -> Self {
        Self::new(Vector3::zeros(), radius)
    }

    /// Scalar moment of inertia `2·m·R²/5`.
    #[must_use]
    pub fn moment_of_inertia(&self, mass: f64) -> f64 {
        2.0 * mass * self.radius * self.radius / 5.0
    }

    /// The same sphere seen from the frame that `pose` is expressed in.
    #[must_use]
    pub fn from_local(&self, pose: &Pose) -> Self {
        Self::new(pose.from_local_point(&self.center), self.radius)
    }
}

impl Solid for Sphere {
    fn volume(&self) -> f64 {
        4.0 / 3.0 * std::f64::consts::PI * self.radius.powi(3)
    }

    fn center(&self) -> Vector3<f64> {
        self.center
    }

    fn inertia_about_center(&self, mass: f64) -> Matrix3<f64> {
        Matrix3::from_diagonal_element(self.moment_of_inertia(mass))
    }
}

/// Volume integrals of a polyhedron for unit density.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeProperties {
    /// Signed enclosed volume.
    pub volume: f64,
    /// Centroid (zero when the volume vanishes).
    pub center: Vector3<f64>,
    /// `∫ mmoi(r) dV` about the local origin.
    pub second_moment: Matrix3<f64>,
}

/// A closed surface made of planar polygonal faces.
///
/// Nodes are shared between faces by index. Adding a node that lies within
/// [`SMALL`] of an existing one returns the existing index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polyhedron {
    nodes: Vec<Vector3<f64>>,
    faces: Vec<Vec<usize>>,
}

impl Polyhedron {
    /// Empty polyhedron.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Box with the given side lengths, centred on the origin.
    #[must_use]
    pub fn cuboid(size_x: f64, size_y: f64, size_z: f64) -> Self {
        let mut mesh = Self::new();
        mesh.add_panel(&Vector3::new(0.0, size_y / 2.0, 0.0), &Vector3::x(), size_x, size_z);
        mesh.add_panel(&Vector3::new(0.0, -size_y / 2.0, 0.0), &Vector3::x(), size_x, size_z);
        mesh.add_panel(&Vector3::new(size_x / 2.0, 0.0, 0.0), &Vector3::z(), size_z, size_y);
        mesh.add_panel(&Vector3::new(-size_x / 2.0, 0.0, 0.0), &Vector3::z(), size_z, size_y);
        mesh.add_panel(&Vector3::new(0.0, 0.0, size_z / 2.0), &Vector3::x(), size_x, size_y);
        mesh.add_panel(&Vector3::new(0.0, 0.0, -size_z / 2.0), &Vector3::x(), size_x, size_y);
        mesh
    }

    /// Cube with equal sides, centred on the origin.
    #[must_use]
    pub fn cube(size: f64) -> Self {
        Self::cuboid(size, size, size)
    }

    /// Square pyramid with its base on `z = 0` centred on the origin and its
    /// apex at `(0, 0, height)`.
    #[must_use]
    pub fn pyramid(side: f64, height: f64) -> Self {
        let half = side / 2.0;
        let mut mesh = Self::new();
        let base = [
            mesh.add_node(Vector3::new(-half, -half, 0.0)),
            mesh.add_node(Vector3::new(half, -half, 0.0)),
            mesh.add_node(Vector3::new(half, half, 0.0)),
            mesh.add_node(Vector3::new(-half, half, 0.0)),
        ];
        let apex = mesh.add_node(Vector3::new(0.0, 0.0, height));

        mesh.add_face(&[base[3], base[2], base[1], base[0]]);
        for i in 0..4 {
            mesh.add_face(&[apex, base[i], base[(i + 1) % 4]]);
        }
        mesh
    }

    /// Node positions.
    #[must_use]
    pub fn nodes(&self) -> &[Vector3<f64>] {
        &self.nodes
    }

    /// Faces as lists of node indices.
    #[must_use]
    pub fn faces(&self) -> &[Vec<usize>] {
        &self.faces
    }

    /// Add a node, reusing an existing one within [`SMALL`] of it.
    pub fn add_node(&mut self, node: Vector3<f64>) -> usize {
        if let Some(index) = self
            .nodes
            .iter()
            .position(|n| (n - node).iter().all(|d| d.abs() < SMALL))
        {
            return index;
        }
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Add a face from node indices. Indices past the node list are dropped.
    ///
    /// Returns the indices actually used.
    pub fn add_face(&mut self, indices: &[usize]) -> Vec<usize> {
        let face: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&i| i < self.nodes.len())
            .collect();
        self.faces.push(face.clone());
        face
    }

    /// Add a face from positions, creating or reusing nodes.
    pub fn add_face_from_points(&mut self, points: &[Vector3<f64>]) -> Vec<usize> {
        let indices: Vec<usize> = points.iter().map(|p| self.add_node(*p)).collect();
        self.add_face(&indices)
    }

    /// Add a rectangular panel centred at `center`.
    ///
    /// The panel normal points away from the origin (along `+Z` when `center`
    /// is the origin). `length` runs along `x_axis`, `width` along
    /// `normal × x_axis`.
    pub fn add_panel(
        &mut self,
        center: &Vector3<f64>,
        x_axis: &Vector3<f64>,
        length: f64,
        width: f64,
    ) -> Vec<usize> {
        let x = x_axis.unit_or_self();
        let z = if center.near_zero() {
            Vector3::z()
        } else {
            center.unit_or_self()
        };
        let y = z.cross(&x);
        let (dx, dy) = (x * (length / 2.0), y * (width / 2.0));

        self.add_face_from_points(&[
            center - dx - dy,
            center + dx - dy,
            center + dx + dy,
            center - dx + dy,
        ])
    }

    /// Centroid of a face's nodes.
    #[must_use]
    pub fn face_center(&self, face: usize) -> Option<Vector3<f64>> {
        let indices = self.faces.get(face)?;
        if indices.is_empty() {
            return None;
        }
        let sum: Vector3<f64> = indices.iter().map(|&i| self.nodes[i]).sum();
        Some(sum / indices.len() as f64)
    }

    /// Triangles of every face, fanned from the face centroid.
    pub fn triangles(&self) -> impl Iterator<Item = [Vector3<f64>; 3]> + '_ {
        self.faces
            .iter()
            .enumerate()
            .filter(|(_, face)| face.len() >= 3)
            .flat_map(move |(index, face)| {
                let center = self.face_center(index).unwrap_or_else(Vector3::zeros);
                (0..face.len()).map(move |i| {
                    let next = face[(i + 1) % face.len()];
                    [center, self.nodes[face[i]], self.nodes[next]]
                })
            })
    }

    /// Volume, centroid and second moment for unit density.
    #[must_use]
    pub fn volume_properties(&self) -> VolumeProperties {
        let mut volume = 0.0;
        let mut first = Vector3::zeros();
        let mut second = Matrix3::zeros();

        for [a, b, c] in self.triangles() {
            let dv = a.dot(&b.cross(&c)) / 6.0;
            volume += dv;
            first += (a + b + c) * (dv / 4.0);
            second += (mmoi(&(a + b), 1.0) + mmoi(&(b + c), 1.0) + mmoi(&(c + a), 1.0))
                * (dv / 20.0);
        }

        let center = if volume.abs() < TINY {
            Vector3::zeros()
        } else {
            first / volume
        };

        VolumeProperties {
            volume,
            center,
            second_moment: second,
        }
    }

    /// Nodes moved from the local frame of `pose` into its parent frame.
    #[must_use]
    pub fn from_local(&self, pose: &Pose) -> Self {
        Self {
            nodes: self.nodes.iter().map(|n| pose.from_local_point(n)).collect(),
            faces: self.faces.clone(),
        }
    }

    /// Nodes moved from the parent frame into the local frame of `pose`.
    #[must_use]
    pub fn to_local(&self, pose: &Pose) -> Self {
        Self {
            nodes: self.nodes.iter().map(|n| pose.to_local_point(n)).collect(),
            faces: self.faces.clone(),
        }
    }
}

impl Solid for Polyhedron {
    fn volume(&self) -> f64 {
        self.volume_properties().volume
    }

    fn center(&self) -> Vector3<f64> {
        self.volume_properties().center
    }

    fn inertia_about_center(&self, mass: f64) -> Matrix3<f64> {
        let props = self.volume_properties();
        if props.volume.abs() < TINY {
            warn!(
                faces = self.faces.len(),
                "polyhedron encloses no volume, inertia set to zero"
            );
            return Matrix3::zeros();
        }
        let density = mass / props.volume;
        props.second_moment * density - mmoi(&props.center, mass)
    }
}
