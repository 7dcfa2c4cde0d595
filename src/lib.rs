// lib.rs
//! Two articulated stick figures made of rigid segments, a crossing-count "linking
//! number" between their X/Y projections, and a pose collection searchable by that
//! number and the figures' separation.

pub mod builtin;
pub mod chain;
pub mod codec;
pub mod config;
pub mod database;
pub mod error;
pub mod features;
pub mod json_loader;
pub mod layout;
pub mod linking;
pub mod pose;
pub mod session;
pub mod skeleton;
pub mod vector;

pub use chain::RigidChain;
pub use config::Config;
pub use database::{load_collection, Sources, Tier};
pub use error::{DecodeError, Error, Result};
pub use features::{FeatureVector, Nearest};
pub use linking::linking_number;
pub use pose::{FigureId, Pose, PoseCollection};
pub use session::{DragOutcome, Figure, Model, PoseState, Session};
pub use skeleton::SkeletonTree;
pub use vector::Vec3;
