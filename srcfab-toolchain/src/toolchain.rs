use crate::container::{BUILD_RETRIES, DockerCli, retry};
use crate::error::ToolchainError;
use crate::find::lookup;
use crate::info::Info;
use crate::mode::Mode;
use crate::search_path::SearchPath;
use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;
use std::process::Command;
use tracing::{debug, info};

/// Mount point of the working directory inside toolchain containers.
pub const CONTAINER_SRC_DIR: &str = "/src";

/// An executable toolchain. Tools are subcommands of it.
pub trait Toolchain: fmt::Debug + Send + Sync {
    /// Toolchain path, e.g. `github.com/acme/go-tc`.
    fn path(&self) -> &str;

    /// How this toolchain executes.
    fn mode(&self) -> Mode;

    /// Command that starts the toolchain. Callers append the subcommand.
    fn command(&self) -> Result<Command, ToolchainError>;

    /// Prepares the toolchain for execution. Safe to repeat.
    fn build(&self) -> Result<(), ToolchainError>;

    fn is_built(&self) -> Result<bool, ToolchainError>;
}

/// Opens the toolchain at `path`, preferring its program over its container
/// when both are permitted by `mode`.
pub fn open(
    search: &SearchPath,
    path: &str,
    mode: Mode,
) -> Result<Box<dyn Toolchain>, ToolchainError> {
    let info = lookup(search, path)?;
    open_info(&info, mode)
}

pub fn open_info(info: &Info, mode: Mode) -> Result<Box<dyn Toolchain>, ToolchainError> {
    if mode.contains(Mode::PROGRAM)
        && let Some(program) = info.program_path()
    {
        debug!(toolchain = %info.path, program = %program, "using program toolchain");
        return Ok(Box::new(ProgramToolchain {
            path: info.path.clone(),
            program,
        }));
    }
    if mode.contains(Mode::CONTAINER) && info.dockerfile.is_some() {
        debug!(toolchain = %info.path, "using container toolchain");
        return Ok(Box::new(ContainerToolchain::new(info)));
    }
    Err(ToolchainError::NoUsableMethod {
        path: info.path.clone(),
        mode,
    })
}

/// A prebuilt executable under the toolchain's `.bin/`.
#[derive(Debug, Clone)]
pub struct ProgramToolchain {
    path: String,
    program: Utf8PathBuf,
}

impl ProgramToolchain {
    pub fn program(&self) -> &Utf8Path {
        &self.program
    }
}

impl Toolchain for ProgramToolchain {
    fn path(&self) -> &str {
        &self.path
    }

    fn mode(&self) -> Mode {
        Mode::PROGRAM
    }

    fn command(&self) -> Result<Command, ToolchainError> {
        Ok(Command::new(self.program.as_std_path()))
    }

    fn build(&self) -> Result<(), ToolchainError> {
        Ok(())
    }

    fn is_built(&self) -> Result<bool, ToolchainError> {
        Ok(true)
    }
}

/// A toolchain built from its Dockerfile and run as an image.
#[derive(Debug, Clone)]
pub struct ContainerToolchain {
    path: String,
    dir: Utf8PathBuf,
    image: String,
    docker: DockerCli,
    host_dir: Option<Utf8PathBuf>,
}

impl ContainerToolchain {
    pub fn new(info: &Info) -> Self {
        Self {
            path: info.path.clone(),
            dir: info.dir.clone(),
            image: image_name(&info.path),
            docker: DockerCli::default(),
            host_dir: None,
        }
    }

    /// Mounts `dir` instead of the process working directory.
    pub fn with_host_dir(mut self, dir: Utf8PathBuf) -> Self {
        self.host_dir = Some(dir);
        self
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    fn host_dir(&self) -> Result<Utf8PathBuf, ToolchainError> {
        if let Some(dir) = &self.host_dir {
            return Ok(dir.clone());
        }
        let cwd = std::env::current_dir().map_err(|e| ToolchainError::io(".", e))?;
        Utf8PathBuf::from_path_buf(cwd)
            .map_err(|p| anyhow::anyhow!("non-UTF-8 working directory {}", p.display()).into())
    }
}

impl Toolchain for ContainerToolchain {
    fn path(&self) -> &str {
        &self.path
    }

    fn mode(&self) -> Mode {
        Mode::CONTAINER
    }

    fn command(&self) -> Result<Command, ToolchainError> {
        let host = self.host_dir()?;
        let args = vec![
            "--rm".to_string(),
            format!("--volume={host}:{CONTAINER_SRC_DIR}:ro"),
        ];
        Ok(self.docker.run_command(&self.image, &args, true))
    }

    fn build(&self) -> Result<(), ToolchainError> {
        info!(toolchain = %self.path, image = %self.image, "building toolchain image");
        retry(BUILD_RETRIES, "docker build", || {
            self.docker.build(&self.image, &self.dir)
        })
    }

    fn is_built(&self) -> Result<bool, ToolchainError> {
        self.docker.image_exists(&self.image)
    }
}

/// Docker image name for a toolchain path.
pub fn image_name(toolchain_path: &str) -> String {
    toolchain_path.replace('/', "-").to_ascii_lowercase()
}
