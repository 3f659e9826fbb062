use std::path::Path;

use crate::error::LaunchError;
use crate::launcher::process::{CommandSpec, Output, ProcessRunner};

/// A Python that answered `--version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpreter {
    pub program: String,
    pub version: String,
}

impl Interpreter {
    /// Try each candidate in order; the first one that exits 0 wins.
    pub fn probe(
        runner: &mut dyn ProcessRunner,
        candidates: &[String],
        cwd: &Path,
    ) -> Result<Self, LaunchError> {
        for program in candidates {
            let spec = CommandSpec::new(program.as_str())
                .arg("--version")
                .cwd(cwd)
                .output(Output::Capture);

            match runner.run(&spec) {
                Ok(captured) if captured.status.success() => {
                    // Python 2 and some 3.x launchers print the version on stderr.
                    let version = [captured.stdout.trim(), captured.stderr.trim()]
                        .into_iter()
                        .find(|text| !text.is_empty())
                        .unwrap_or(program.as_str())
                        .to_string();
                    tracing::info!("interpreter found: {program} ({version})");
                    return Ok(Self {
                        program: program.clone(),
                        version,
                    });
                }
                Ok(captured) => {
                    tracing::debug!("{program} --version failed with {}", captured.status);
                }
                Err(err) => {
                    tracing::debug!("{program} unavailable: {err}");
                }
            }
        }

        Err(LaunchError::InterpreterNotFound {
            tried: candidates.to_vec(),
        })
    }

    pub fn command(&self) -> CommandSpec {
        CommandSpec::new(self.program.as_str())
    }

    /// Whether `import <module>` succeeds under this interpreter.
    pub fn can_import(&self, runner: &mut dyn ProcessRunner, module: &str, cwd: &Path) -> bool {
        let spec = self
            .command()
            .args(["-c", &format!("import {module}")])
            .cwd(cwd)
            .output(Output::Discard);

        runner
            .run(&spec)
            .map(|captured| captured.status.success())
            .unwrap_or(false)
    }
}
