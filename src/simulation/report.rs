//! Run summary returned by the simulation

use std::fmt;

/// Outcome of a simulation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Turns elapsed
    pub simulation_steps: u64,
    /// Turn on which each transporter finished, `None` if it never did
    pub transport_steps: Vec<Option<u64>>,
    /// Sum of all finishing turns, only meaningful once every transporter
    /// has finished
    pub total_work_steps: Option<u64>,
}

impl Report {
    pub fn new(simulation_steps: u64, transport_steps: Vec<Option<u64>>) -> Self {
        let total_work_steps = transport_steps.iter().copied().sum::<Option<u64>>();
        Self {
            simulation_steps,
            transport_steps,
            total_work_steps,
        }
    }

    pub fn all_finished(&self) -> bool {
        self.transport_steps.iter().all(Option::is_some)
    }

    pub fn unfinished_count(&self) -> usize {
        self.transport_steps.iter().filter(|s| s.is_none()).count()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Simulation Report ===")?;
        writeln!(f, "Simulation steps: {}", self.simulation_steps)?;
        for (i, steps) in self.transport_steps.iter().enumerate() {
            match steps {
                Some(turn) => writeln!(f, "  Transporter #{i}: finished on turn {turn}")?,
                None => writeln!(f, "  Transporter #{i}: unfinished")?,
            }
        }
        match self.total_work_steps {
            Some(total) => write!(f, "Total work steps: {total}"),
            None => write!(
                f,
                "Total work steps: n/a ({} unfinished)",
                self.unfinished_count()
            ),
        }
    }
}
