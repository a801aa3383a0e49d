use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use testrun::errors::Result;
use testrun::runner::{EnvOverrides, ExecutionResult, ProcessInvoker};

/// One recorded invocation.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub argv: Vec<String>,
    pub env: EnvOverrides,
}

/// A fake invoker that:
/// - records every argument vector it is asked to run
/// - answers with exit code 0 and `ok <argv[0]>` on stdout, unless an exit
///   code was configured for that program.
#[derive(Debug, Clone, Default)]
pub struct FakeInvoker {
    calls: Arc<Mutex<Vec<Invocation>>>,
    exit_codes: Arc<Mutex<HashMap<String, i32>>>,
}

impl FakeInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make invocations whose argument vector contains `program` exit with `code`.
    pub fn exit_with(self, program: &str, code: i32) -> Self {
        self.exit_codes
            .lock()
            .unwrap()
            .insert(program.to_string(), code);
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl ProcessInvoker for FakeInvoker {
    fn invoke(&self, argv: &[String], env: &EnvOverrides) -> Result<ExecutionResult> {
        self.calls.lock().unwrap().push(Invocation {
            argv: argv.to_vec(),
            env: env.clone(),
        });

        let exit_code = {
            let codes = self.exit_codes.lock().unwrap();
            argv.iter().find_map(|a| codes.get(a).copied()).unwrap_or(0)
        };

        Ok(ExecutionResult {
            command: argv.to_vec(),
            exit_code,
            stdout: format!("ok {}", argv[0]).into_bytes(),
            stderr: Vec::new(),
        })
    }
}
