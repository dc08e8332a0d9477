//! Console status lines for a running sweep.

use std::time::Duration;

use listsweep_core::RunStats;
use listsweep_engine::{LogProgressSink, ProgressSink, StepResult, SweepEvent};

/// Prints one line per event on stdout and forwards every event to the log.
#[derive(Debug, Default)]
pub struct ConsoleStatus {
    log: LogProgressSink,
}

impl ConsoleStatus {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressSink for ConsoleStatus {
    fn emit(&self, event: SweepEvent) {
        if let Some(line) = status_line(&event) {
            println!("{line}");
        }
        self.log.emit(event);
    }
}

fn status_line(event: &SweepEvent) -> Option<String> {
    match event {
        SweepEvent::PageFetched {
            page,
            fresh,
            skipped,
        } => Some(format!(
            "Page {page}: {fresh} to process, {skipped} already done"
        )),
        SweepEvent::ItemProcessed { entity_id, outcome } => {
            let mut parts = Vec::new();
            if let Some(add) = &outcome.add {
                parts.push(step_label("add", add));
            }
            if let Some(remove) = &outcome.remove {
                parts.push(step_label("remove", remove));
            }
            Some(format!("{entity_id}: {}", parts.join(", ")))
        }
        SweepEvent::Waiting {
            operation,
            remaining,
        } => Some(format!(
            "Rate limit for {operation} reached, resets in {}",
            format_time(*remaining)
        )),
        SweepEvent::BackingOff {
            operation,
            duration,
        } => Some(format!(
            "Remote refused {operation} on quota, backing off {}",
            format_time(*duration)
        )),
        SweepEvent::Checkpointed { .. } => None,
    }
}

fn step_label(name: &str, step: &StepResult) -> String {
    match step {
        StepResult::Succeeded => format!("{name} ok"),
        StepResult::Failed(err) => format!("{name} failed ({})", err.kind),
    }
}

/// `MM:SS`, minutes growing past two digits for long waits.
pub fn format_time(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

pub fn summary(stats: &RunStats) -> String {
    format!(
        "{} mode: {} of {} processed, {} added, {} removed, {} failed",
        stats.mode, stats.processed, stats.total, stats.added, stats.removed, stats.failed
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use listsweep_core::Mode;
    use listsweep_engine::{ItemOutcome, Operation, RemoteError, RemoteErrorKind};

    #[test]
    fn format_time_pads_minutes_and_seconds() {
        assert_eq!(format_time(Duration::ZERO), "00:00");
        assert_eq!(format_time(Duration::from_secs(65)), "01:05");
        assert_eq!(format_time(Duration::from_millis(899_900)), "14:59");
        assert_eq!(format_time(Duration::from_secs(6000)), "100:00");
    }

    #[test]
    fn item_line_lists_each_attempted_step() {
        let event = SweepEvent::ItemProcessed {
            entity_id: "42".to_string(),
            outcome: ItemOutcome {
                add: Some(StepResult::Failed(RemoteError::new(
                    RemoteErrorKind::Forbidden,
                    "nope",
                ))),
                remove: Some(StepResult::Succeeded),
            },
        };
        assert_eq!(
            status_line(&event).unwrap(),
            format!("42: add failed ({}), remove ok", RemoteErrorKind::Forbidden)
        );
    }

    #[test]
    fn waiting_line_shows_time_to_reset() {
        let event = SweepEvent::Waiting {
            operation: Operation::Remove,
            remaining: Duration::from_secs(125),
        };
        let line = status_line(&event).unwrap();
        assert!(line.ends_with("resets in 02:05"), "{line}");
    }

    #[test]
    fn checkpoints_stay_quiet() {
        assert_eq!(status_line(&SweepEvent::Checkpointed { processed: 3 }), None);
    }

    #[test]
    fn summary_reports_all_counters() {
        let mut stats = RunStats::new(Mode::Both);
        stats.total = 4;
        stats.processed = 3;
        stats.added = 2;
        stats.removed = 3;
        stats.failed = 1;
        assert_eq!(
            summary(&stats),
            "both mode: 3 of 4 processed, 2 added, 3 removed, 1 failed"
        );
    }
}
