/// Stages of a launch, run once each in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Make the launcher's own directory the working directory.
    ResolveBaseDir,
    /// Ask the interpreter for its version.
    CheckInterpreter,
    /// Best-effort package install.
    ProvisionDependencies,
    /// Run the server script and wait for it.
    LaunchServer,
    Pause,
}

impl Step {
    pub fn label(&self) -> &'static str {
        match self {
            Step::ResolveBaseDir => "resolve-base-dir",
            Step::CheckInterpreter => "check-interpreter",
            Step::ProvisionDependencies => "provision-dependencies",
            Step::LaunchServer => "launch-server",
            Step::Pause => "pause",
        }
    }
}
