/// Outcome counts of a single poll cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Pending passports the cycle looked at.
    pub attempted: usize,
    pub completed: usize,
    pub failed: usize,
    /// Passports left alone: already terminal, deleted, or changed concurrently.
    pub skipped: usize,
    /// Passports whose result could not be written back.
    pub persist_failures: usize,
}
