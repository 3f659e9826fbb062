use std::fmt;
use std::path::Path;

use crate::launcher::console::Console;
use crate::launcher::interpreter::Interpreter;
use crate::launcher::process::{CommandSpec, Output, ProcessRunner, RunStatus};
use crate::model::config::InstallConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// `pip install --user`
    User,
    /// Plain `pip install`, into whatever site-packages the interpreter uses.
    System,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptResult {
    Installed,
    Failed(RunStatus),
    NotStarted(String),
}

impl AttemptResult {
    pub fn succeeded(&self) -> bool {
        matches!(self, AttemptResult::Installed)
    }
}

impl fmt::Display for AttemptResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptResult::Installed => f.write_str("installed"),
            AttemptResult::Failed(status) => write!(f, "failed with {status}"),
            AttemptResult::NotStarted(err) => write!(f, "could not start: {err}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub scope: Scope,
    pub result: AttemptResult,
}

/// What provisioning did. Never treated as a failure by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionReport {
    pub packages: Vec<String>,
    pub attempts: Vec<Attempt>,
}

impl ProvisionReport {
    pub fn fallback_attempted(&self) -> bool {
        self.attempts.iter().any(|a| a.scope == Scope::System)
    }
}

pub struct Provisioner<'a> {
    interpreter: &'a Interpreter,
    config: &'a InstallConfig,
    cwd: &'a Path,
}

impl<'a> Provisioner<'a> {
    pub fn new(interpreter: &'a Interpreter, config: &'a InstallConfig, cwd: &'a Path) -> Self {
        Self {
            interpreter,
            config,
            cwd,
        }
    }

    /// Best-effort install: a user-scoped attempt, then one unscoped fallback if it fails.
    pub fn run(&self, runner: &mut dyn ProcessRunner, console: &mut dyn Console) -> ProvisionReport {
        console.say("Installing dependencies...");

        let packages = self.packages_to_install(runner, console);
        let mut report = ProvisionReport {
            packages,
            attempts: Vec::new(),
        };

        if report.packages.is_empty() {
            tracing::info!("all packages importable, skipping install");
            return report;
        }

        let user = self.attempt(runner, &report.packages, Scope::User);
        let user_ok = user.result.succeeded();
        report.attempts.push(user);

        if !user_ok {
            let fallback = self.attempt(runner, &report.packages, Scope::System);
            if !fallback.result.succeeded() {
                tracing::warn!("dependency install {}", fallback.result);
            }
            report.attempts.push(fallback);
        }

        report
    }

    fn packages_to_install(
        &self,
        runner: &mut dyn ProcessRunner,
        console: &mut dyn Console,
    ) -> Vec<String> {
        if !self.config.skip_importable {
            return self.config.packages.iter().map(|p| p.name.clone()).collect();
        }

        self.config
            .packages
            .iter()
            .filter(|package| {
                !self
                    .interpreter
                    .can_import(runner, package.import_name(), self.cwd)
            })
            .map(|package| {
                console.say(&format!("Installing {}...", package.name));
                package.name.clone()
            })
            .collect()
    }

    fn attempt(&self, runner: &mut dyn ProcessRunner, packages: &[String], scope: Scope) -> Attempt {
        let spec = self.install_command(packages, scope);
        let result = match runner.run(&spec) {
            Ok(captured) if captured.status.success() => AttemptResult::Installed,
            Ok(captured) => AttemptResult::Failed(captured.status),
            Err(err) => AttemptResult::NotStarted(err.to_string()),
        };
        tracing::info!("{spec}: {result}");
        Attempt { scope, result }
    }

    fn install_command(&self, packages: &[String], scope: Scope) -> CommandSpec {
        let mut spec = self
            .interpreter
            .command()
            .args(["-m", "pip", "install"])
            .args(packages.iter().map(String::as_str))
            .cwd(self.cwd);

        if scope == Scope::User {
            spec = spec.arg("--user");
        }

        if self.config.quiet {
            spec.arg("-q").output(Output::Discard)
        } else {
            spec.output(Output::Inherit)
        }
    }
}
