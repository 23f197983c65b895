//! Simulation dynamics modules: external forces and the contact impulse solver.

pub mod forces;
pub mod solver;

pub use forces::{DragForce, ForceGenerator, ForceRegistry, GeneratorId, GravityForce};
pub use solver::{ContactImpulse, ContactPair, ImpulseModel, ImpulseSolver, SolverStepMetrics};
