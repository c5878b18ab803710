//! Safety fallback.
//!
//! Motors must never keep running once the firmware can no longer hear
//! from its client.  Every failure surfaced at the transport boundary, and
//! every loss of connectivity, goes through [`emergency_stop`] **before**
//! the error is logged or propagated.
//!
//! ## Fault lifecycle
//!
//! 1. A transport operation fails (socket error, malformed request, …).
//! 2. [`run_guarded`] stops every motor.
//! 3. An [`AppEvent::EmergencyStop`] is emitted.
//! 4. The original error is returned to the caller, which logs it and
//!    carries on serving.  Motors stay stopped until the next command.

use log::error;

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, PwmPort};
use crate::app::registry::MotorRegistry;

/// Stop every motor and record why.
pub fn emergency_stop<P: PwmPort>(
    registry: &mut MotorRegistry<P>,
    sink: &mut impl EventSink,
    reason: &'static str,
) {
    let was_running = registry.any_running();
    registry.stop_all();
    if was_running {
        error!("SAFETY: motors stopped ({})", reason);
    }
    sink.emit(&AppEvent::EmergencyStop { reason });
}

/// Run `op` against the registry; on `Err`, stop all motors first and then
/// hand the error back.
pub fn run_guarded<P, T, E>(
    registry: &mut MotorRegistry<P>,
    sink: &mut impl EventSink,
    reason: &'static str,
    op: impl FnOnce(&mut MotorRegistry<P>) -> Result<T, E>,
) -> Result<T, E>
where
    P: PwmPort,
{
    let result = op(registry);
    if result.is_err() {
        emergency_stop(registry, sink, reason);
    }
    result
}
