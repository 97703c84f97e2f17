//! Progress reporting infrastructure
//!
//! To avoid corrupted terminal output, nothing should be written to stdout
//! or stderr while a report is being displayed. Please use logs for debug
//! messages.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::{
    borrow::Cow,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

/// CLI progress report of ongoing operations
#[derive(Clone, Debug, Default)]
pub struct ProgressReport(MultiProgress);
//
impl ProgressReport {
    /// Prepare to report progress on the cli
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepare to report on a new operation
    pub fn add(&self, what: impl Into<Cow<'static, str>>, work: Work) -> ProgressTracker {
        let template = format!("{{prefix}} {{wide_bar}} {}", work.style_trailer());
        let bar = ProgressBar::new(work.initial_amount())
            .with_prefix(what.into())
            .with_style(
                ProgressStyle::with_template(&template)
                    .expect("the templates above should be valid indicatif styles"),
            );

        // Bars with no known work yet stay hidden until work is added
        let added = work.initial_amount() > 0;
        if added {
            self.0.add(bar.clone());
        }
        ProgressTracker {
            bar,
            report: self.0.clone(),
            added: Arc::new(AtomicBool::new(added)),
            growing: Arc::new(AtomicBool::new(work.can_grow())),
        }
    }
}

/// Work whose progression can be tracked
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum Work {
    /// Steps to be taken, with a precise count display
    Steps(usize),

    /// Steps to be taken, with a percentage-based display
    PercentSteps(usize),

    /// Bytes to be processed, where the total is only discovered along the
    /// way through [`ProgressTracker::add_work()`]
    GrowingBytes,
}
//
impl Work {
    /// Initial length of the progress bar
    fn initial_amount(self) -> u64 {
        match self {
            Work::Steps(steps) | Work::PercentSteps(steps) => steps as u64,
            Work::GrowingBytes => 0,
        }
    }

    /// Truth that more work may be added after initial configuration
    fn can_grow(self) -> bool {
        matches!(self, Work::GrowingBytes)
    }

    /// End of the indicatif style template for this kind of work
    fn style_trailer(self) -> &'static str {
        match self {
            Work::Steps(_) => "{pos}/{len}",
            Work::PercentSteps(_) => "{percent:>2}% (~{eta} left)",
            Work::GrowingBytes => "{decimal_bytes}/{decimal_total_bytes} ({decimal_bytes_per_sec})",
        }
    }
}

/// Mechanism to track the progress of one operation
#[derive(Clone, Debug)]
pub struct ProgressTracker {
    /// Progress bar for this specific operation
    bar: ProgressBar,

    /// Underlying progress report
    report: MultiProgress,

    /// Truth that the progress bar has already been added to the report
    added: Arc<AtomicBool>,

    /// Truth that more work can still be added to this progress bar
    growing: Arc<AtomicBool>,
}
//
impl ProgressTracker {
    /// Record that a certain amount of progress has been made
    ///
    /// Returns the truth that the tracked operation is complete, at which
    /// point the progress bar is removed from the report.
    pub fn make_progress(&self, progress: u64) -> bool {
        self.bar.inc(progress);
        let current = self.bar.position();
        let max = self.bar.length().unwrap_or(0);
        assert!(current <= max, "recorded more progress than expected");

        let finished = current == max && !self.growing.load(Ordering::Acquire);
        if finished {
            self.bar.finish_and_clear();
            self.report.remove(&self.bar);
        }
        finished
    }

    /// Increase the amount of work that remains to be done
    ///
    /// Only valid on [`Work::GrowingBytes`] trackers that have not been
    /// frozen with [`done_adding_work()`](Self::done_adding_work) yet.
    pub fn add_work(&self, remaining: u64) {
        assert!(
            self.growing.load(Ordering::Acquire),
            "should not add work to a tracker whose work amount is frozen"
        );
        if !self.added.swap(true, Ordering::AcqRel) && remaining > 0 {
            self.report.add(self.bar.clone());
        }
        self.bar.inc_length(remaining);
    }

    /// Promise that add_work will not be called anymore
    ///
    /// This allows the progress bar to be hidden once full.
    pub fn done_adding_work(&self) {
        assert!(
            self.growing.swap(false, Ordering::Release),
            "should only need to freeze the work amount once"
        );
    }
}
