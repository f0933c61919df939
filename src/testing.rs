use std::{collections::HashMap, path::Path};

use crate::{cmd::CommandRunner, error::InstallerError};

/// Records commands instead of running them.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    pub commands: Vec<String>,
    /// stdin passed to `run_with_input`, in order.
    pub inputs: Vec<String>,
    /// Canned stdout for `capture`, keyed by program.
    pub outputs: HashMap<String, String>,
    /// Commands containing any of these fail with exit code 1.
    pub fail_on: Vec<String>,
}

impl RecordingRunner {
    pub fn with_output(mut self, program: &str, stdout: &str) -> Self {
        self.outputs.insert(program.to_string(), stdout.to_string());
        self
    }

    pub fn failing_on(mut self, fragment: &str) -> Self {
        self.fail_on.push(fragment.to_string());
        self
    }

    pub fn position(&self, fragment: &str) -> Option<usize> {
        self.commands.iter().position(|c| c.contains(fragment))
    }

    fn record(&mut self, program: &str, args: &[&str]) -> Result<(), InstallerError> {
        let line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        let fails = self.fail_on.iter().any(|f| line.contains(f.as_str()));
        self.commands.push(line);
        if fails {
            return Err(InstallerError::CommandFailed(program.to_string(), 1));
        }
        Ok(())
    }
}

impl CommandRunner for RecordingRunner {
    fn run(
        &mut self,
        program: &str,
        args: &[&str],
        _spin_msg: &str,
        _done_msg: &str,
    ) -> Result<(), InstallerError> {
        self.record(program, args)
    }

    fn run_interactive(&mut self, program: &str, args: &[&str]) -> Result<(), InstallerError> {
        self.record(program, args)
    }

    fn run_with_input(
        &mut self,
        program: &str,
        args: &[&str],
        input: &str,
    ) -> Result<(), InstallerError> {
        self.inputs.push(input.to_string());
        self.record(program, args)
    }

    fn capture(&mut self, program: &str, args: &[&str]) -> Result<String, InstallerError> {
        self.record(program, args)?;
        Ok(self.outputs.get(program).cloned().unwrap_or_default())
    }

    fn append_to_file(
        &mut self,
        program: &str,
        args: &[&str],
        file_path: &Path,
    ) -> Result<(), InstallerError> {
        let target = format!(">> {}", file_path.display());
        let mut args = args.to_vec();
        args.push(target.as_str());
        self.record(program, &args)
    }
}
