//! The device session: one open connection to one physical mirror.

use crate::error::{self, MirrorError, MirrorResult};
use crate::pipeline;
use crate::serial;
use openmirror_registry::{self as registry, ValueKind};
use openmirror_transport::MirrorTransport;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

/// A typed parameter value crossing the session boundary.
///
/// The transport itself only moves raw `f64` scalars and strings; the
/// registry's value kind decides which variant a read produces and how a
/// write converts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl ParamValue {
    /// Numeric representation for the transport's scalar slot.
    ///
    /// `None` for string values, which route through set-string instead.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            ParamValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            ParamValue::Integer(i) => Some(*i as f64),
            ParamValue::Float(f) => Some(*f),
            ParamValue::String(_) => None,
        }
    }
}

/// Shared handle to a session's command buffer.
///
/// The buffer lives as long as the session *or* any handle holder, whichever
/// is longer, and is freed exactly once when the last of them drops. A
/// holder sees later sends without copying.
#[derive(Debug, Clone)]
pub struct CommandBuffer {
    inner: Arc<Mutex<Vec<f64>>>,
}

impl CommandBuffer {
    fn zeroed(len: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(vec![0.0; len])),
        }
    }

    /// Number of actuator slots.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> Vec<f64> {
        self.lock().clone()
    }

    /// Value of one actuator slot, if in bounds.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.lock().get(index).copied()
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Vec<f64>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// One open connection to one physical deformable mirror.
///
/// Owns the transport handle exclusively; `transport == None` means the
/// session is closed. The command buffer always holds exactly
/// `actuator_count` values, and once a send has been accepted every value
/// lies in the physical range `[-1.0, +1.0]`.
pub struct MirrorSession {
    transport: Option<Box<dyn MirrorTransport>>,
    serial: String,
    actuator_count: usize,
    commands: Option<CommandBuffer>,
}

impl std::fmt::Debug for MirrorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MirrorSession")
            .field("serial", &self.serial)
            .field("actuator_count", &self.actuator_count)
            .field("open", &self.transport.is_some())
            .finish_non_exhaustive()
    }
}

impl MirrorSession {
    /// Opens a session for the device named by `path`.
    ///
    /// The trailing path component, stripped of a recognized `.acfg` suffix,
    /// is the device serial; its directory becomes the transport's
    /// resolution base (see [`crate::serial::resolve`]). On success the
    /// actuator count has been read from the device, the transport's own
    /// exception mode is disabled (the session owns error translation), and
    /// the command buffer holds `actuator_count` zeros.
    ///
    /// On any failure after transport initialization the transport is
    /// released again; no partial session is ever returned.
    pub fn open(mut transport: Box<dyn MirrorTransport>, path: &str) -> MirrorResult<Self> {
        let location = serial::resolve(path)?;
        tracing::debug!(path, serial = %location.serial, "opening mirror session");

        transport
            .initialize(&location.base_dir, &location.serial)
            .map_err(|e| error::translate(transport.as_mut(), e))?;

        let actuator_count = match Self::configure(transport.as_mut()) {
            Ok(count) => count,
            Err(err) => {
                if let Err(release_err) = transport.release() {
                    tracing::warn!(
                        serial = %location.serial,
                        error = %release_err,
                        "failed to release transport after aborted open"
                    );
                }
                return Err(err);
            }
        };

        tracing::info!(
            serial = %location.serial,
            actuators = actuator_count,
            "mirror session open"
        );

        Ok(Self {
            transport: Some(transport),
            serial: location.serial,
            actuator_count,
            commands: Some(CommandBuffer::zeroed(actuator_count)),
        })
    }

    /// Post-initialize device setup. Runs before the session exists, so the
    /// actuator-count read goes through the transport directly, bypassing
    /// registry access checks.
    fn configure(transport: &mut dyn MirrorTransport) -> MirrorResult<usize> {
        let raw = transport
            .get("NbOfActuator")
            .map_err(|e| error::translate(transport, e))?;
        if !raw.is_finite() || raw < 1.0 {
            return Err(MirrorError::Device {
                code: 0,
                message: format!("device reported invalid actuator count {raw}"),
            });
        }

        // The vendor layer must not throw on its own; failures come back as
        // status codes and are translated here.
        transport
            .set("UseException", 0.0)
            .map_err(|e| error::translate(transport, e))?;

        // Range-checked above, so the cast cannot lose the value.
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        let count = raw.round() as usize;
        Ok(count)
    }

    /// Device serial identifier.
    pub fn serial(&self) -> &str {
        &self.serial
    }

    /// Number of actuators, fixed at open.
    pub fn actuator_count(&self) -> usize {
        self.actuator_count
    }

    /// Whether the transport handle is still held.
    pub fn is_open(&self) -> bool {
        self.transport.is_some()
    }

    /// Shared handle to the command buffer, for reading commanded positions
    /// between calls without copying.
    pub fn commands(&self) -> MirrorResult<CommandBuffer> {
        self.commands.clone().ok_or_else(Self::closed)
    }

    /// Reads a named parameter, converted per its registry value kind.
    pub fn get(&mut self, name: &str) -> MirrorResult<ParamValue> {
        let id = registry::find(name)?;
        registry::check_readable(id)?;
        let entry = registry::descriptor(id);

        if entry.kind == ValueKind::String {
            return Err(MirrorError::Unsupported(format!(
                "string-kind read of {} (reserved for future attributes)",
                entry.name
            )));
        }

        let transport = self.transport.as_mut().ok_or_else(Self::closed)?;
        let raw = transport
            .get(entry.name)
            .map_err(|e| error::translate(transport.as_mut(), e))?;

        Ok(match entry.kind {
            ValueKind::Boolean => ParamValue::Boolean(raw != 0.0),
            ValueKind::Integer => ParamValue::Integer(raw.round() as i64),
            // String is rejected above; only Float remains.
            _ => ParamValue::Float(raw),
        })
    }

    /// Writes a named parameter, converted to its native representation.
    pub fn set(&mut self, name: &str, value: ParamValue) -> MirrorResult<()> {
        let id = registry::find(name)?;
        registry::check_writable(id)?;
        let entry = registry::descriptor(id);

        let transport = self.transport.as_mut().ok_or_else(Self::closed)?;
        match entry.kind {
            ValueKind::String => {
                let ParamValue::String(text) = value else {
                    return Err(MirrorError::InvalidArgument(format!(
                        "{} takes a string value",
                        entry.name
                    )));
                };
                transport
                    .set_string(entry.name, &text)
                    .map_err(|e| error::translate(transport.as_mut(), e))
            }
            ValueKind::Boolean | ValueKind::Integer | ValueKind::Float => {
                let scalar = value.as_scalar().ok_or_else(|| {
                    MirrorError::InvalidArgument(format!(
                        "{} takes a scalar value",
                        entry.name
                    ))
                })?;
                transport
                    .set(entry.name, scalar)
                    .map_err(|e| error::translate(transport.as_mut(), e))
            }
        }
    }

    /// Validates, clamps, buffers, and submits one actuator command vector.
    ///
    /// Length and NaN checks run before any buffer mutation. On transport
    /// failure the buffer keeps the attempted clamped values: the physical
    /// device state after a failed send is unknown, so the caller is
    /// expected to re-query or reset rather than trust a rollback.
    pub fn send(&mut self, commands: &[f64]) -> MirrorResult<()> {
        pipeline::validate(commands, self.actuator_count)?;

        let transport = self.transport.as_mut().ok_or_else(Self::closed)?;
        let buffer = self.commands.as_ref().ok_or_else(Self::closed)?;

        let mut slots = buffer.lock();
        pipeline::write_clamped(&mut slots, commands);
        transport
            .send(&slots)
            .map_err(|e| error::translate(transport.as_mut(), e))
    }

    /// [`MirrorSession::send`] for single-precision callers.
    pub fn send_f32(&mut self, commands: &[f32]) -> MirrorResult<()> {
        let widened: Vec<f64> = commands.iter().map(|&v| f64::from(v)).collect();
        self.send(&widened)
    }

    /// Resets the device and, on success, zeroes the command buffer so the
    /// software state matches the device's known rest position.
    pub fn reset(&mut self) -> MirrorResult<()> {
        let transport = self.transport.as_mut().ok_or_else(Self::closed)?;
        transport
            .reset()
            .map_err(|e| error::translate(transport.as_mut(), e))?;

        let buffer = self.commands.as_ref().ok_or_else(Self::closed)?;
        buffer.lock().fill(0.0);
        Ok(())
    }

    /// Stops actuator motion. The buffer is left untouched: the device's
    /// position after a stop is not assumed to be zero.
    pub fn stop(&mut self) -> MirrorResult<()> {
        let transport = self.transport.as_mut().ok_or_else(Self::closed)?;
        transport
            .stop()
            .map_err(|e| error::translate(transport.as_mut(), e))
    }

    /// Closes the session: releases the transport handle first, then the
    /// owned serial string, then this session's buffer reference, exactly
    /// once. A second close is a no-op, since teardown order at the outer
    /// boundary is not guaranteed.
    pub fn close(&mut self) -> MirrorResult<()> {
        let Some(mut transport) = self.transport.take() else {
            return Ok(());
        };
        let result = transport
            .release()
            .map_err(|e| error::translate(transport.as_mut(), e));
        drop(transport);
        self.serial = String::new();
        // External holders keep the buffer alive; this only drops the
        // session's own reference.
        self.commands = None;
        tracing::debug!("mirror session closed");
        result
    }

    fn closed() -> MirrorError {
        MirrorError::InvalidArgument("session is closed".to_string())
    }
}

impl Drop for MirrorSession {
    fn drop(&mut self) {
        if self.is_open() {
            if let Err(err) = self.close() {
                tracing::warn!(error = %err, "transport release failed during drop");
            }
        }
    }
}
