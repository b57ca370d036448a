//! The transport trait and its mock implementation.

use crate::{TransportDiagnostic, TransportError, TransportResult};
use std::path::Path;

/// One opaque connection to one physical deformable mirror.
///
/// Mirrors the vendor SDK operation set one-to-one. Implementations signal a
/// device-side rejection with [`TransportError::Failed`] and make the reason
/// available through [`MirrorTransport::last_error`] until the next
/// operation; callers that want a readable message must fetch it before
/// issuing further commands.
///
/// The original interface resolved the configuration file by temporarily
/// changing the process working directory. Here the resolution base is an
/// explicit argument to [`MirrorTransport::initialize`]; implementations must
/// not mutate process-global state.
pub trait MirrorTransport: Send {
    /// Connects to the device identified by `serial`, resolving its
    /// configuration relative to `base_dir`.
    fn initialize(&mut self, base_dir: &Path, serial: &str) -> TransportResult<()>;

    /// Releases the device connection. Further operations fail with
    /// [`TransportError::NotInitialized`].
    fn release(&mut self) -> TransportResult<()>;

    /// Reads a named attribute as a raw scalar.
    fn get(&mut self, name: &str) -> TransportResult<f64>;

    /// Writes a named attribute as a raw scalar.
    fn set(&mut self, name: &str, value: f64) -> TransportResult<()>;

    /// Writes a named string attribute.
    fn set_string(&mut self, name: &str, value: &str) -> TransportResult<()>;

    /// Submits one full command vector to the actuators.
    fn send(&mut self, commands: &[f64]) -> TransportResult<()>;

    /// Requests a device reset to its rest position.
    fn reset(&mut self) -> TransportResult<()>;

    /// Requests that the device stop actuator motion.
    fn stop(&mut self) -> TransportResult<()>;

    /// Retrieves the diagnostic for the most recent failure.
    fn last_error(&mut self) -> TransportResult<TransportDiagnostic>;
}

pub mod mock {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    /// Transport operations that can be scripted to fail.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum MockOp {
        Initialize,
        Release,
        Get,
        Set,
        SetString,
        Send,
        Reset,
        Stop,
        LastError,
    }

    #[derive(Debug)]
    struct MockState {
        initialized: bool,
        params: HashMap<String, f64>,
        strings: Vec<(String, String)>,
        sent: Vec<Vec<f64>>,
        reset_count: usize,
        stop_count: usize,
        release_count: usize,
        init_base_dir: Option<PathBuf>,
        init_serial: Option<String>,
        failing: HashSet<MockOp>,
        diagnostic: TransportDiagnostic,
    }

    /// In-memory transport for testing without physical hardware.
    ///
    /// Clones share state, so a test can keep one handle while the session
    /// owns another boxed as `dyn MirrorTransport`.
    #[derive(Clone)]
    pub struct MockMirrorTransport {
        state: Arc<Mutex<MockState>>,
    }

    impl MockMirrorTransport {
        /// Creates a mock mirror with the given actuator count.
        pub fn new(actuator_count: usize) -> Self {
            let mut params = HashMap::new();
            params.insert("nbofactuator".to_string(), actuator_count as f64);
            params.insert("itfstate".to_string(), 0.0);
            params.insert("useexception".to_string(), 1.0);
            params.insert("versioninfo".to_string(), 20_205.0);
            Self {
                state: Arc::new(Mutex::new(MockState {
                    initialized: false,
                    params,
                    strings: Vec::new(),
                    sent: Vec::new(),
                    reset_count: 0,
                    stop_count: 0,
                    release_count: 0,
                    init_base_dir: None,
                    init_serial: None,
                    failing: HashSet::new(),
                    diagnostic: TransportDiagnostic::new(0, "No error"),
                })),
            }
        }

        /// Seeds an attribute value before the session opens.
        pub fn with_param(self, name: &str, value: f64) -> Self {
            {
                let mut state = self.lock();
                state.params.insert(name.to_ascii_lowercase(), value);
            }
            self
        }

        /// Makes `op` fail until [`Self::succeed_on`] clears it.
        pub fn fail_on(&self, op: MockOp) {
            let mut state = self.lock();
            state.failing.insert(op);
            if state.diagnostic.code == 0 {
                state.diagnostic = TransportDiagnostic::new(1, "mock failure");
            }
        }

        /// Clears a scripted failure.
        pub fn succeed_on(&self, op: MockOp) {
            self.lock().failing.remove(&op);
        }

        /// Scripts the diagnostic returned by `last_error`.
        pub fn set_diagnostic(&self, code: u32, message: impl Into<String>) {
            self.lock().diagnostic = TransportDiagnostic::new(code, message);
        }

        /// Attribute value as currently stored device-side.
        pub fn param(&self, name: &str) -> Option<f64> {
            self.lock().params.get(&name.to_ascii_lowercase()).copied()
        }

        /// Every command vector the device accepted, in order.
        pub fn sent_frames(&self) -> Vec<Vec<f64>> {
            self.lock().sent.clone()
        }

        /// String attribute writes, in order.
        pub fn string_writes(&self) -> Vec<(String, String)> {
            self.lock().strings.clone()
        }

        pub fn reset_count(&self) -> usize {
            self.lock().reset_count
        }

        pub fn stop_count(&self) -> usize {
            self.lock().stop_count
        }

        pub fn release_count(&self) -> usize {
            self.lock().release_count
        }

        pub fn is_initialized(&self) -> bool {
            self.lock().initialized
        }

        /// Base directory and serial recorded at initialize time.
        pub fn init_target(&self) -> Option<(PathBuf, String)> {
            let state = self.lock();
            match (&state.init_base_dir, &state.init_serial) {
                (Some(dir), Some(serial)) => Some((dir.clone(), serial.clone())),
                _ => None,
            }
        }

        fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
            self.state.lock().unwrap_or_else(|e| e.into_inner())
        }

        fn check(&self, op: MockOp) -> TransportResult<()> {
            let state = self.lock();
            if state.failing.contains(&op) {
                return Err(TransportError::Failed);
            }
            if op != MockOp::Initialize && !state.initialized {
                return Err(TransportError::NotInitialized);
            }
            Ok(())
        }
    }

    impl MirrorTransport for MockMirrorTransport {
        fn initialize(&mut self, base_dir: &Path, serial: &str) -> TransportResult<()> {
            let mut state = self.lock();
            if state.failing.contains(&MockOp::Initialize) {
                return Err(TransportError::InitFailed {
                    serial: serial.to_string(),
                    reason: state.diagnostic.message.clone(),
                });
            }
            if state.initialized {
                return Err(TransportError::AlreadyInitialized);
            }
            state.initialized = true;
            state.init_base_dir = Some(base_dir.to_path_buf());
            state.init_serial = Some(serial.to_string());
            Ok(())
        }

        fn release(&mut self) -> TransportResult<()> {
            self.check(MockOp::Release)?;
            let mut state = self.lock();
            state.initialized = false;
            state.release_count += 1;
            Ok(())
        }

        fn get(&mut self, name: &str) -> TransportResult<f64> {
            self.check(MockOp::Get)?;
            let mut state = self.lock();
            match state.params.get(&name.to_ascii_lowercase()).copied() {
                Some(value) => Ok(value),
                None => {
                    state.diagnostic =
                        TransportDiagnostic::new(2, format!("unknown attribute {name}"));
                    Err(TransportError::Failed)
                }
            }
        }

        fn set(&mut self, name: &str, value: f64) -> TransportResult<()> {
            self.check(MockOp::Set)?;
            let mut state = self.lock();
            state.params.insert(name.to_ascii_lowercase(), value);
            Ok(())
        }

        fn set_string(&mut self, name: &str, value: &str) -> TransportResult<()> {
            self.check(MockOp::SetString)?;
            let mut state = self.lock();
            state.strings.push((name.to_string(), value.to_string()));
            Ok(())
        }

        fn send(&mut self, commands: &[f64]) -> TransportResult<()> {
            self.check(MockOp::Send)?;
            let mut state = self.lock();
            state.sent.push(commands.to_vec());
            Ok(())
        }

        fn reset(&mut self) -> TransportResult<()> {
            self.check(MockOp::Reset)?;
            let mut state = self.lock();
            state.reset_count += 1;
            Ok(())
        }

        fn stop(&mut self) -> TransportResult<()> {
            self.check(MockOp::Stop)?;
            let mut state = self.lock();
            state.stop_count += 1;
            Ok(())
        }

        fn last_error(&mut self) -> TransportResult<TransportDiagnostic> {
            let state = self.lock();
            if state.failing.contains(&MockOp::LastError) {
                return Err(TransportError::Failed);
            }
            Ok(state.diagnostic.clone())
        }
    }
}
