//! Soft real-time scheduling for the control process.
//!
//! The HC-SR04 echo is timed by busy-waiting, so preemption during a
//! measurement shows up directly as distance error. Running under
//! `SCHED_FIFO` pinned to one core keeps that jitter low. Neither call is
//! required for correct operation: failures (usually a missing
//! `CAP_SYS_NICE`) are logged and the program carries on.

use std::io;

use tracing::{info, warn};

use crate::config::RealtimeConfig;

/// Which scheduling requests took effect
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RealtimeStatus {
    pub fifo: bool,
    pub pinned: bool,
}

/// Apply the configured scheduling policy and CPU affinity
pub fn apply(config: &RealtimeConfig) -> RealtimeStatus {
    if !config.enabled {
        info!("[Realtime] Disabled by configuration");
        return RealtimeStatus::default();
    }

    let fifo = match set_fifo_priority(config.priority) {
        Ok(()) => {
            info!("[Realtime] SCHED_FIFO priority {}", config.priority);
            true
        }
        Err(err) => {
            warn!("[Realtime] sched_setscheduler failed: {}", err);
            false
        }
    };

    let pinned = match pin_to_cpu(config.cpu) {
        Ok(()) => {
            info!("[Realtime] Pinned to CPU {}", config.cpu);
            true
        }
        Err(err) => {
            warn!("[Realtime] sched_setaffinity failed: {}", err);
            false
        }
    };

    RealtimeStatus { fifo, pinned }
}

#[cfg(target_os = "linux")]
fn set_fifo_priority(priority: i32) -> io::Result<()> {
    // SAFETY: sched_param is plain data; zeroed is a valid value for every field.
    let mut param: libc::sched_param = unsafe { std::mem::zeroed() };
    param.sched_priority = priority;

    // SAFETY: `param` outlives the call and pid 0 names the calling process.
    let rc = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
    if rc < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(target_os = "linux")]
fn pin_to_cpu(cpu: usize) -> io::Result<()> {
    if cpu >= libc::CPU_SETSIZE as usize {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("CPU index {} out of range", cpu),
        ));
    }

    // SAFETY: cpu_set_t is a plain bitmask and `cpu` was bounds-checked above.
    let rc = unsafe {
        let mut set: libc::cpu_set_t = std::mem::zeroed();
        libc::CPU_ZERO(&mut set);
        libc::CPU_SET(cpu, &mut set);
        libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &set)
    };
    if rc < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn set_fifo_priority(_priority: i32) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "SCHED_FIFO is only available on Linux",
    ))
}

#[cfg(not(target_os = "linux"))]
fn pin_to_cpu(_cpu: usize) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "CPU affinity is only available on Linux",
    ))
}
