//! Control core for one deformable mirror device.
//!
//! A [`MirrorSession`] owns the transport handle for one physical mirror and
//! the buffered actuator command vector. Parameter access goes through the
//! static registry (unknown names and forbidden access directions never reach
//! the device), and actuator commands go through a fixed pipeline: length
//! check, NaN rejection, clamp to the physical range, buffered submit.
//!
//! Every operation is blocking and synchronous; a session is single-threaded
//! by construction (`&mut self` on every device-touching method). Transport
//! failures surface as [`MirrorError::Device`] carrying the device's own
//! diagnostic message.
//!
//! ```no_run
//! use openmirror_core::{MirrorSession, ParamValue};
//! use openmirror_transport::mock::MockMirrorTransport;
//!
//! # fn main() -> openmirror_core::MirrorResult<()> {
//! let transport = MockMirrorTransport::new(69);
//! let mut session = MirrorSession::open(Box::new(transport), "BAX153.acfg")?;
//!
//! let count = session.actuator_count();
//! session.send(&vec![0.1; count])?;
//! session.set("AckTimeout", ParamValue::Integer(250))?;
//! session.close()?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod pipeline;
pub mod serial;
pub mod session;

pub use error::{MAX_DIAGNOSTIC_LEN, MirrorError, MirrorResult, PLACEHOLDER_DIAGNOSTIC};
pub use pipeline::{COMMAND_MAX, COMMAND_MIN};
pub use serial::{CONFIG_SUFFIX, DeviceLocation};
pub use session::{CommandBuffer, MirrorSession, ParamValue};
