use bevy::prelude::*;
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::components::KinematicsComponent;

/// Accumulates force and moment contributions over one physics tick.
///
/// Contributors push categorized terms during force generation; the summation
/// system folds everything into `net_force`/`net_moment` (body frame), which the
/// host rigid-body solver consumes.
#[derive(Component, Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsComponent {
    pub mass: f64,
    pub inertia: Matrix3<f64>,
    pub inertia_inv: Matrix3<f64>,
    pub net_force: Vector3<f64>,
    pub net_moment: Vector3<f64>,
    pub forces: Vec<Force>,
    pub moments: Vec<Moment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Force {
    pub vector: Vector3<f64>,
    /// Application point relative to the center of mass, body frame.
    /// `None` applies the force at the center of mass (no induced moment).
    pub point: Option<Vector3<f64>>,
    pub frame: ReferenceFrame,
    pub category: ForceCategory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Moment {
    pub vector: Vector3<f64>,
    pub frame: ReferenceFrame,
    pub category: ForceCategory,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ReferenceFrame {
    Body,
    Inertial,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ForceCategory {
    Propulsive,
    Aerodynamic,
    Assist,
    Gravitational,
    Custom(String),
}

impl PhysicsComponent {
    pub fn new(mass: f64, inertia: Matrix3<f64>) -> Self {
        let inertia_inv = inertia.try_inverse().unwrap_or(Matrix3::identity());
        Self {
            mass,
            inertia,
            inertia_inv,
            net_force: Vector3::zeros(),
            net_moment: Vector3::zeros(),
            forces: Vec::new(),
            moments: Vec::new(),
        }
    }

    pub fn add_force(&mut self, force: Force) {
        self.forces.push(force);
    }

    pub fn add_moment(&mut self, moment: Moment) {
        self.moments.push(moment);
    }

    pub fn clear_forces(&mut self) {
        self.forces.clear();
        self.moments.clear();
        self.net_force = Vector3::zeros();
        self.net_moment = Vector3::zeros();
    }

    /// Fold all accumulated contributions into `net_force`/`net_moment` in the
    /// body frame. Forces with an application point induce a moment about the
    /// center of mass.
    pub fn summarize(&mut self, kinematics: &KinematicsComponent) {
        let mut net_force = Vector3::zeros();
        let mut net_moment = Vector3::zeros();

        for force in &self.forces {
            let body_vector = match force.frame {
                ReferenceFrame::Body => force.vector,
                ReferenceFrame::Inertial => kinematics.attitude_inv * force.vector,
            };
            net_force += body_vector;
            if let Some(point) = force.point {
                net_moment += point.cross(&body_vector);
            }
        }

        for moment in &self.moments {
            net_moment += match moment.frame {
                ReferenceFrame::Body => moment.vector,
                ReferenceFrame::Inertial => kinematics.attitude_inv * moment.vector,
            };
        }

        self.net_force = net_force;
        self.net_moment = net_moment;
    }
}
