//! jarcast-lib: Packaging pipeline for turning a jar archive into a native,
//! self-contained executable.
//!
//! The pipeline has two stages around one seam:
//! - `stub`: generates the launcher source that embeds the payload
//! - `workspace`: assembles the ephemeral build unit
//! - `toolchain`: the external compiler binding (`Toolchain` trait)
//! - `package`: the driver that runs validate → assemble → compile → place
//! - `target`: the (os, arch) descriptor the whole thing is parameterized by

pub mod package;
pub mod stub;
pub mod target;
pub mod toolchain;
pub mod workspace;
