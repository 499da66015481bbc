//! Data structures consumed by the solvers
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod graph;

pub use self::graph::{Capacity, CapacityEdge, CapacityGraph, EdgeId};
