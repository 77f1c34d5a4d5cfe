use crate::error::ToolchainError;
use std::fmt;
use std::str::FromStr;

bitflags::bitflags! {
    /// Permitted ways of executing a toolchain.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Mode: u8 {
        /// Run the prebuilt executable under `.bin/`.
        const PROGRAM = 1 << 0;
        /// Build the toolchain's Dockerfile and run the image.
        const CONTAINER = 1 << 1;
    }
}

impl Default for Mode {
    fn default() -> Self {
        Mode::PROGRAM | Mode::CONTAINER
    }
}

impl FromStr for Mode {
    type Err = ToolchainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut mode = Mode::empty();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            mode |= match part {
                "program" => Mode::PROGRAM,
                "docker" | "container" => Mode::CONTAINER,
                _ => {
                    return Err(ToolchainError::InvalidMode {
                        value: s.to_string(),
                    });
                }
            };
        }
        if mode.is_empty() {
            return Err(ToolchainError::InvalidMode {
                value: s.to_string(),
            });
        }
        Ok(mode)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        if self.contains(Mode::PROGRAM) {
            names.push("program");
        }
        if self.contains(Mode::CONTAINER) {
            names.push("docker");
        }
        if names.is_empty() {
            return f.write_str("none");
        }
        f.write_str(&names.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_method_lists() {
        assert_eq!("program".parse::<Mode>().unwrap(), Mode::PROGRAM);
        assert_eq!(
            "program, docker".parse::<Mode>().unwrap(),
            Mode::PROGRAM | Mode::CONTAINER
        );
        assert_eq!("container".parse::<Mode>().unwrap(), Mode::CONTAINER);
    }

    #[test]
    fn rejects_unknown_and_empty() {
        assert!("vm".parse::<Mode>().is_err());
        assert!("".parse::<Mode>().is_err());
        assert!(" , ".parse::<Mode>().is_err());
    }

    #[test]
    fn display_round_trips() {
        let m = Mode::default();
        assert_eq!(m.to_string(), "program,docker");
        assert_eq!(m.to_string().parse::<Mode>().unwrap(), m);
        assert_eq!(Mode::empty().to_string(), "none");
    }
}
