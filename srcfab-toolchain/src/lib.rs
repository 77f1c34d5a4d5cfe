//! Toolchain discovery and execution for srcfab.
//!
//! A toolchain is a directory on the search path (`SRCFABPATH`) holding a
//! `Srcfabtoolchain` descriptor. It runs either as a prebuilt program under
//! `.bin/` or as a Docker image built from its `Dockerfile`. Tools are
//! subcommands of a toolchain that speak JSON on stdin and stdout.

mod container;
mod error;
mod find;
mod info;
mod manage;
mod mode;
mod process;
mod search_path;
mod tool;
mod toolchain;

pub use container::{BUILD_RETRIES, DockerCli};
pub use error::ToolchainError;
pub use find::{dir, list, lookup};
pub use info::{DESCRIPTOR_FILE, DOCKERFILE, Info, PROGRAM_DIR, ToolInfo, ToolchainConfig};
pub use manage::{BuildResult, MAX_PARALLEL_BUILDS, add, build_all, clone_url, get, temp_dir};
pub use mode::Mode;
pub use search_path::{DEFAULT_ROOT_NAME, SEARCH_PATH_ENV, SearchPath};
pub use tool::{Tool, open_tool};
pub use toolchain::{
    CONTAINER_SRC_DIR, ContainerToolchain, ProgramToolchain, Toolchain, image_name, open,
    open_info,
};
