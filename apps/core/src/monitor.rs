use std::collections::{HashSet, VecDeque};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

pub type Pid = u32;

/// One row of a process-table snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessRecord {
    pub pid: Pid,
    pub parent: Pid,
}

/// Three-valued per-pid exit-status query. `Unknown` covers the case where
/// the process cannot be opened at all; the monitor treats it as `Exited`,
/// matching the OS-level ambiguity between "gone" and "inaccessible".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Alive,
    Exited,
    Unknown,
}

/// Read-only view of the live process table. Implementations acquire and
/// release any OS handles inside each call; nothing is held across ticks.
pub trait ProcessProbe {
    /// Full (pid, parent-pid) snapshot. An error means "try again next tick".
    fn snapshot(&self) -> Result<Vec<ProcessRecord>, String>;
    fn liveness(&self, pid: Pid) -> Liveness;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorVerdict {
    Completed,
    TimedOut,
}

#[derive(Debug, Clone, Copy)]
pub struct MonitorConfig {
    pub poll_interval: Duration,
    pub deadline: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            deadline: Duration::from_secs(600),
        }
    }
}

/// Polls until the root process and every transitively spawned descendant
/// are gone (`Completed`) or the absolute deadline passes (`TimedOut`).
/// Both verdicts are terminal; no process is ever terminated from here.
///
/// A ticker thread delivers periodic ticks over a channel and the remaining
/// time to the deadline caps the wait for each one, so the periodic and
/// one-shot timers race at a single decision point.
pub fn wait_for_tree_exit(
    probe: &dyn ProcessProbe,
    root: Pid,
    config: &MonitorConfig,
) -> MonitorVerdict {
    let deadline = Instant::now() + config.deadline;
    let ticks = spawn_ticker(config.poll_interval);

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return MonitorVerdict::TimedOut;
        }

        match ticks.recv_timeout(remaining) {
            Ok(()) => {
                if tree_has_exited(probe, root) {
                    return MonitorVerdict::Completed;
                }
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                return MonitorVerdict::TimedOut;
            }
        }
    }
}

/// The ticker stops itself once the receiver is dropped.
fn spawn_ticker(period: Duration) -> mpsc::Receiver<()> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || loop {
        thread::sleep(period);
        if tx.send(()).is_err() {
            break;
        }
    });
    rx
}

fn tree_has_exited(probe: &dyn ProcessProbe, root: Pid) -> bool {
    let snapshot = match probe.snapshot() {
        Ok(snapshot) => snapshot,
        Err(_) => return false,
    };

    descendant_tree(&snapshot, root)
        .iter()
        .all(|pid| probe.liveness(*pid) != Liveness::Alive)
}

/// Root plus every descendant reachable through parent-pid links, found by
/// an explicit queue with a visited set. A pid already visited is never
/// re-expanded, which bounds the walk when the snapshot contains stale or
/// recycled parent links.
pub fn descendant_tree(snapshot: &[ProcessRecord], root: Pid) -> Vec<Pid> {
    let mut visited: HashSet<Pid> = HashSet::from([root]);
    let mut queue: VecDeque<Pid> = VecDeque::from([root]);
    let mut tree = vec![root];

    while let Some(current) = queue.pop_front() {
        for record in snapshot.iter().filter(|record| record.parent == current) {
            if visited.insert(record.pid) {
                tree.push(record.pid);
                queue.push_back(record.pid);
            }
        }
    }

    tree
}

/// Probe over the live OS process table, or an inert stand-in where the
/// platform offers none.
pub fn system_probe() -> Box<dyn ProcessProbe> {
    #[cfg(target_os = "windows")]
    {
        Box::new(windows::ToolhelpProbe)
    }

    #[cfg(not(target_os = "windows"))]
    {
        Box::new(InertProbe)
    }
}

#[cfg(not(target_os = "windows"))]
struct InertProbe;

#[cfg(not(target_os = "windows"))]
impl ProcessProbe for InertProbe {
    fn snapshot(&self) -> Result<Vec<ProcessRecord>, String> {
        Ok(Vec::new())
    }

    fn liveness(&self, _pid: Pid) -> Liveness {
        Liveness::Unknown
    }
}

#[cfg(target_os = "windows")]
mod windows {
    use super::{Liveness, Pid, ProcessProbe, ProcessRecord};

    use windows_sys::Win32::Foundation::{CloseHandle, INVALID_HANDLE_VALUE};
    use windows_sys::Win32::System::Diagnostics::ToolHelp::{
        CreateToolhelp32Snapshot, Process32FirstW, Process32NextW, PROCESSENTRY32W,
        TH32CS_SNAPPROCESS,
    };
    use windows_sys::Win32::System::Threading::{
        GetExitCodeProcess, OpenProcess, PROCESS_QUERY_LIMITED_INFORMATION,
    };

    // Exit code the OS reports for a process that has not terminated yet.
    const STILL_ACTIVE: u32 = 259;

    pub(super) struct ToolhelpProbe;

    impl ProcessProbe for ToolhelpProbe {
        fn snapshot(&self) -> Result<Vec<ProcessRecord>, String> {
            let handle = unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0) };
            if handle == INVALID_HANDLE_VALUE {
                return Err("process snapshot unavailable".to_string());
            }

            let mut records = Vec::new();
            let mut entry: PROCESSENTRY32W = unsafe { std::mem::zeroed() };
            entry.dwSize = std::mem::size_of::<PROCESSENTRY32W>() as u32;

            let mut more = unsafe { Process32FirstW(handle, &mut entry) };
            while more != 0 {
                records.push(ProcessRecord {
                    pid: entry.th32ProcessID,
                    parent: entry.th32ParentProcessID,
                });
                more = unsafe { Process32NextW(handle, &mut entry) };
            }

            unsafe {
                CloseHandle(handle);
            }
            Ok(records)
        }

        fn liveness(&self, pid: Pid) -> Liveness {
            let handle = unsafe { OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, 0, pid) };
            if handle.is_null() {
                return Liveness::Unknown;
            }

            let mut exit_code = 0_u32;
            let queried = unsafe { GetExitCodeProcess(handle, &mut exit_code) };
            unsafe {
                CloseHandle(handle);
            }

            if queried == 0 {
                return Liveness::Unknown;
            }
            if exit_code == STILL_ACTIVE {
                Liveness::Alive
            } else {
                Liveness::Exited
            }
        }
    }
}
