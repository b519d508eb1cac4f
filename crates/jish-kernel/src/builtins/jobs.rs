//! jobs — list every live job.

use crate::jobs::JobTable;

/// Print one line per occupied slot: id, status label, display name.
/// Empty slots are omitted. No side effects.
pub(super) fn run(table: &JobTable) {
    for (id, job) in table.iter() {
        println!("[{}] + {}   {}", id, job.status.label(), job.name);
    }
}
