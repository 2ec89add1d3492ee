//! Orbital mechanics used by the node: Kepler's equation `M = E − e·sin(E)`.
pub mod solver;
