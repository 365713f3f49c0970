//! Edge-triggered alerts derived from consecutive derive results.
//!
//! The classifier is stateless; the previous-state memory lives here and is
//! owned by the session.

use serde::Serialize;

use crate::status::{LockState, RangeState, Status};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "alert", rename_all = "snake_case")]
pub enum Alert {
    /// First sample at or above a probe's target.
    ProbeReachedTarget { id: u32, name: String },
    PitLocked,
    PitLockLost,
    /// Pit left the range band (hot or cold).
    PitOutOfRange { range: RangeState },
}

impl std::fmt::Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Alert::ProbeReachedTarget { name, .. } => write!(f, "{name} reached target"),
            Alert::PitLocked => f.write_str("pit locked"),
            Alert::PitLockLost => f.write_str("pit lock lost"),
            Alert::PitOutOfRange { range } => match range {
                RangeState::Hot => f.write_str("pit running hot"),
                RangeState::Cold => f.write_str("pit running cold"),
                RangeState::InRange => f.write_str("pit in range"),
            },
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct AlertTracker {
    lock: Option<LockState>,
    range: Option<RangeState>,
    /// Probe ids currently at/above target.
    done: Vec<u32>,
}

impl AlertTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare against the previous observation and emit transitions.
    ///
    /// `probes` yields `(id, name, reached_target)` for probes with a target.
    /// The first observation never reports a lock transition.
    pub fn observe<'a, I>(&mut self, status: &Status, probes: I) -> Vec<Alert>
    where
        I: IntoIterator<Item = (u32, &'a str, bool)>,
    {
        let mut out = Vec::new();

        if let Some(prev) = self.lock
            && prev != status.lock
        {
            out.push(match status.lock {
                LockState::Locked => Alert::PitLocked,
                LockState::Adjusting => Alert::PitLockLost,
            });
        }
        self.lock = Some(status.lock);

        if status.range != RangeState::InRange && self.range != Some(status.range) {
            out.push(Alert::PitOutOfRange {
                range: status.range,
            });
        }
        self.range = Some(status.range);

        for (id, name, reached) in probes {
            let was = self.done.contains(&id);
            if reached && !was {
                self.done.push(id);
                out.push(Alert::ProbeReachedTarget {
                    id,
                    name: name.to_string(),
                });
            } else if !reached && was {
                // Dropped back below target (probe moved); re-arm.
                self.done.retain(|d| *d != id);
            }
        }
        out
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StatusCfg;
    use crate::status::classify;

    #[test]
    fn lock_transitions_fire_once() {
        let cfg = StatusCfg::default();
        let mut t = AlertTracker::new();
        assert!(t.observe(&classify(222.0, 225.0, 10, &cfg), []).is_empty());
        assert!(t.observe(&classify(221.0, 225.0, 10, &cfg), []).is_empty());
        assert_eq!(
            t.observe(&classify(219.0, 225.0, 10, &cfg), []),
            vec![Alert::PitLockLost]
        );
        assert_eq!(
            t.observe(&classify(224.0, 225.0, 10, &cfg), []),
            vec![Alert::PitLocked]
        );
    }

    #[test]
    fn out_of_range_fires_on_entry() {
        let cfg = StatusCfg::default();
        let mut t = AlertTracker::new();
        let hot = classify(240.0, 225.0, 0, &cfg);
        assert_eq!(
            t.observe(&hot, []),
            vec![Alert::PitOutOfRange {
                range: RangeState::Hot
            }]
        );
        assert!(t.observe(&hot, []).is_empty());
    }

    #[test]
    fn probe_done_is_edge_triggered() {
        let cfg = StatusCfg::default();
        let s = classify(225.0, 225.0, 0, &cfg);
        let mut t = AlertTracker::new();
        assert!(t.observe(&s, [(1, "Brisket", false)]).is_empty());
        let a = t.observe(&s, [(1, "Brisket", true)]);
        assert_eq!(
            a,
            vec![Alert::ProbeReachedTarget {
                id: 1,
                name: "Brisket".into()
            }]
        );
        assert!(t.observe(&s, [(1, "Brisket", true)]).is_empty());
        assert_eq!(a[0].to_string(), "Brisket reached target");
    }
}
