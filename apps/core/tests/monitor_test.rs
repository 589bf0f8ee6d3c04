use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use appsweep_core::monitor::{
    descendant_tree, wait_for_tree_exit, Liveness, MonitorConfig, MonitorVerdict, Pid,
    ProcessProbe, ProcessRecord,
};

fn rec(pid: Pid, parent: Pid) -> ProcessRecord {
    ProcessRecord { pid, parent }
}

/// Steps through a fixed sequence of process-table states, one per
/// snapshot, holding the final state once the script is exhausted.
struct ScriptedProbe {
    states: Vec<(Vec<ProcessRecord>, HashSet<Pid>)>,
    snapshots_taken: Mutex<usize>,
}

impl ScriptedProbe {
    fn new(states: Vec<(Vec<ProcessRecord>, Vec<Pid>)>) -> Self {
        Self {
            states: states
                .into_iter()
                .map(|(table, alive)| (table, alive.into_iter().collect()))
                .collect(),
            snapshots_taken: Mutex::new(0),
        }
    }

    fn current(&self) -> usize {
        let taken = *self.snapshots_taken.lock().unwrap();
        taken.saturating_sub(1).min(self.states.len() - 1)
    }
}

impl ProcessProbe for ScriptedProbe {
    fn snapshot(&self) -> Result<Vec<ProcessRecord>, String> {
        let mut taken = self.snapshots_taken.lock().unwrap();
        let index = (*taken).min(self.states.len() - 1);
        *taken += 1;
        Ok(self.states[index].0.clone())
    }

    fn liveness(&self, pid: Pid) -> Liveness {
        if self.states[self.current()].1.contains(&pid) {
            Liveness::Alive
        } else {
            Liveness::Exited
        }
    }
}

fn fast_config() -> MonitorConfig {
    MonitorConfig {
        poll_interval: Duration::from_millis(5),
        deadline: Duration::from_millis(200),
    }
}

#[test]
fn discovers_grandchildren_through_parent_links() {
    let table = vec![rec(20, 10), rec(21, 10), rec(30, 21), rec(99, 98)];
    assert_eq!(descendant_tree(&table, 10), vec![10, 20, 21, 30]);
}

#[test]
fn completion_waits_for_child_that_outlives_the_root() {
    let table = vec![rec(11, 10), rec(12, 10)];
    // Child 11 exits immediately; child 12 is still alive after the root
    // has exited, so the first two ticks must not complete.
    let probe = ScriptedProbe::new(vec![
        (table.clone(), vec![10, 12]),
        (table.clone(), vec![12]),
        (table, vec![]),
    ]);

    let verdict = wait_for_tree_exit(&probe, 10, &fast_config());

    assert_eq!(verdict, MonitorVerdict::Completed);
    assert!(*probe.snapshots_taken.lock().unwrap() >= 3);
}

#[test]
fn immortal_child_forces_timeout_instead_of_completion() {
    let table = vec![rec(11, 10), rec(12, 10)];
    let probe = ScriptedProbe::new(vec![(table, vec![12])]);

    let verdict = wait_for_tree_exit(&probe, 10, &fast_config());
    assert_eq!(verdict, MonitorVerdict::TimedOut);
}

#[test]
fn already_empty_tree_completes_on_first_tick() {
    let probe = ScriptedProbe::new(vec![(vec![rec(99, 98)], vec![99])]);
    let verdict = wait_for_tree_exit(&probe, 10, &fast_config());
    assert_eq!(verdict, MonitorVerdict::Completed);
}
