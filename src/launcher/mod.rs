//! The launch sequence: interpreter check, dependency install, server run, pause.
//!
//! Only a missing interpreter ends the run early. Install failures and
//! however the server exits are logged and otherwise ignored, so the
//! operator always gets to read the console before it closes.

pub mod base_dir;
pub mod console;
pub mod interpreter;
pub mod interrupt;
pub mod process;
pub mod provision;

use std::path::{Path, PathBuf};

use crate::error::LaunchError;
use crate::model::config::LauncherConfig;
use crate::model::step::Step;

use console::{Console, PAUSE_PROMPT};
use interpreter::Interpreter;
use process::{Output, ProcessRunner, RunStatus};
use provision::{ProvisionReport, Provisioner};

const RULE: &str = "========================================";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    InterpreterMissing,
    /// The server ran, or was at least attempted. `None` means it never started.
    Completed {
        provision: ProvisionReport,
        server: Option<RunStatus>,
    },
}

impl Outcome {
    /// Process exit status. Never reflects the server's own status.
    pub fn exit_status(&self) -> u8 {
        match self {
            Outcome::InterpreterMissing => 1,
            Outcome::Completed { .. } => 0,
        }
    }
}

pub struct Launcher<'a> {
    config: &'a LauncherConfig,
    base_dir: PathBuf,
}

impl<'a> Launcher<'a> {
    pub fn new(config: &'a LauncherConfig, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn run(&self, runner: &mut dyn ProcessRunner, console: &mut dyn Console) -> Outcome {
        self.banner(console);

        tracing::info!("step: {}", Step::CheckInterpreter.label());
        let candidates = self.config.interpreter_candidates();
        let interpreter = match Interpreter::probe(runner, &candidates, &self.base_dir) {
            Ok(interpreter) => interpreter,
            Err(err) => {
                tracing::error!("{err}");
                self.report_missing_interpreter(&err, console);
                self.pause(console);
                return Outcome::InterpreterMissing;
            }
        };
        console.say(&interpreter.version);
        console.say("");

        tracing::info!("step: {}", Step::ProvisionDependencies.label());
        let provision =
            Provisioner::new(&interpreter, &self.config.install, &self.base_dir).run(runner, console);
        tracing::info!(
            "provisioned {} package(s), fallback attempted: {}",
            provision.packages.len(),
            provision.fallback_attempted()
        );
        console.say("");

        tracing::info!("step: {}", Step::LaunchServer.label());
        let server = self.launch_server(&interpreter, runner, console);

        self.pause(console);

        Outcome::Completed { provision, server }
    }

    fn banner(&self, console: &mut dyn Console) {
        console.say(RULE);
        console.say(&format!("   {}", self.config.general.title));
        console.say(RULE);
        console.say("");
    }

    fn report_missing_interpreter(&self, err: &LaunchError, console: &mut dyn Console) {
        tracing::debug!("reporting {err:?}");
        console.say("ERROR: Python is not installed or not in PATH.");
        console.say(&format!(
            "Please install Python from {}",
            self.config.general.download_url
        ));
        console.say("");
    }

    fn launch_server(
        &self,
        interpreter: &Interpreter,
        runner: &mut dyn ProcessRunner,
        console: &mut dyn Console,
    ) -> Option<RunStatus> {
        console.say("Starting server...");

        let script = &self.config.server.script;
        if !self.base_dir.join(script).is_file() {
            tracing::warn!(
                "server script {} not found in {}",
                script.display(),
                self.base_dir.display()
            );
        }

        let spec = interpreter
            .command()
            .arg(script.to_string_lossy())
            .cwd(&self.base_dir)
            .envs(&self.config.server.env)
            .output(Output::Inherit);

        // Ctrl+C stops the server; the launcher itself must survive to pause.
        interrupt::hold();

        match runner.run(&spec) {
            Ok(captured) => {
                tracing::info!("server exited: {}", captured.status);
                Some(captured.status)
            }
            Err(source) => {
                let err = LaunchError::Spawn {
                    program: spec.to_string(),
                    source,
                };
                tracing::error!("{err}");
                None
            }
        }
    }

    fn pause(&self, console: &mut dyn Console) {
        tracing::info!("step: {}", Step::Pause.label());
        if self.config.general.pause {
            console.pause(PAUSE_PROMPT);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::launcher::console::testing::Transcript;
    use crate::launcher::process::testing::{ScriptedRunner, exited, not_found, printed};

    fn config() -> LauncherConfig {
        let mut config = LauncherConfig::defaults().unwrap();
        config.interpreter.candidates = vec!["python".to_string()];
        config
    }

    /// Python present, installs succeed, server exits with `server`.
    fn healthy(server: fn() -> std::io::Result<process::Captured>) -> ScriptedRunner {
        ScriptedRunner::new(move |spec| {
            if spec.args == ["--version"] {
                printed("Python 3.12.1\n", "")
            } else if spec.args.first().map(String::as_str) == Some("server.py") {
                server()
            } else {
                exited(0)
            }
        })
    }

    #[test]
    fn missing_interpreter_exits_one_without_installing() {
        let config = config();
        let mut runner = ScriptedRunner::new(|_| not_found());
        let mut console = Transcript::default();

        let outcome = Launcher::new(&config, "/opt/finaura").run(&mut runner, &mut console);

        assert_eq!(outcome, Outcome::InterpreterMissing);
        assert_eq!(outcome.exit_status(), 1);
        assert_eq!(runner.calls.len(), 1);
        assert_eq!(runner.calls_matching("pip"), 0);
        assert_eq!(runner.calls_matching("server.py"), 0);
        assert!(console.contains("ERROR: Python is not installed or not in PATH."));
        assert!(console.contains("https://www.python.org/downloads/"));
        assert_eq!(console.pauses, 1);
    }

    #[test]
    fn every_invocation_runs_in_the_base_dir() {
        let config = config();
        let mut runner = healthy(|| exited(0));
        let mut console = Transcript::default();

        let launcher = Launcher::new(&config, "/opt/finaura");
        launcher.run(&mut runner, &mut console);

        assert!(!runner.calls.is_empty());
        assert!(
            runner
                .calls
                .iter()
                .all(|spec| spec.cwd.as_deref() == Some(launcher.base_dir()))
        );
    }

    #[test]
    fn full_sequence_in_order() {
        let config = config();
        let mut runner = healthy(|| exited(0));
        let mut console = Transcript::default();

        let outcome = Launcher::new(&config, "/opt/finaura").run(&mut runner, &mut console);

        let rendered: Vec<String> = runner.calls.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            [
                "python --version",
                "python -m pip install flask requests --user",
                "python server.py",
            ]
        );
        assert_eq!(runner.calls[2].output, Output::Inherit);
        assert!(console.contains("FINAURA PRO"));
        assert!(console.contains("Python 3.12.1"));
        assert!(console.contains("Starting server..."));
        assert_eq!(console.lines.last().map(String::as_str), Some(PAUSE_PROMPT));
        assert_eq!(outcome.exit_status(), 0);
    }

    #[test]
    fn server_status_never_changes_exit_status() {
        let cases: [fn() -> std::io::Result<process::Captured>; 4] = [
            || exited(0),
            || exited(3),
            || {
                Ok(process::Captured {
                    status: RunStatus::killed(),
                    stdout: String::new(),
                    stderr: String::new(),
                })
            },
            not_found,
        ];

        for server in cases {
            let config = config();
            let mut runner = healthy(server);
            let mut console = Transcript::default();

            let outcome = Launcher::new(&config, "/opt/finaura").run(&mut runner, &mut console);

            assert_eq!(outcome.exit_status(), 0);
            assert_eq!(console.pauses, 1);
        }
    }

    #[test]
    fn failed_installs_do_not_block_the_server() {
        let config = config();
        let mut runner = ScriptedRunner::new(|spec| {
            if spec.args == ["--version"] {
                printed("Python 3.12.1", "")
            } else if spec.args.iter().any(|a| a == "pip") {
                exited(1)
            } else {
                exited(0)
            }
        });
        let mut console = Transcript::default();

        let outcome = Launcher::new(&config, "/opt/finaura").run(&mut runner, &mut console);

        assert_eq!(runner.calls_matching("pip install"), 2);
        assert_eq!(runner.calls_matching("server.py"), 1);
        match outcome {
            Outcome::Completed { provision, server } => {
                assert!(provision.fallback_attempted());
                assert_eq!(server, Some(RunStatus::exited(0)));
            }
            Outcome::InterpreterMissing => panic!("interpreter was present"),
        }
    }

    #[test]
    fn server_env_is_passed_through() {
        let mut config = config();
        config
            .server
            .env
            .insert("PORT".to_string(), "8080".to_string());
        let mut runner = healthy(|| exited(0));
        let mut console = Transcript::default();

        Launcher::new(&config, "/opt/finaura").run(&mut runner, &mut console);

        let server = runner.calls.last().unwrap();
        assert_eq!(server.env.get("PORT").map(String::as_str), Some("8080"));
    }

    #[test]
    fn pause_can_be_disabled() {
        let mut config = config();
        config.general.pause = false;
        let mut runner = healthy(|| exited(0));
        let mut console = Transcript::default();

        Launcher::new(&config, "/opt/finaura").run(&mut runner, &mut console);

        assert_eq!(console.pauses, 0);
    }

    #[test]
    fn repeated_runs_behave_the_same() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("server.py"), "print('hi')\n").unwrap();
        let config = config();
        let launcher = Launcher::new(&config, dir.path());

        let mut first = healthy(|| exited(0));
        let mut second = healthy(|| exited(0));
        let a = launcher.run(&mut first, &mut Transcript::default());
        let b = launcher.run(&mut second, &mut Transcript::default());

        assert_eq!(a, b);
        assert_eq!(first.calls, second.calls);
    }
}
