//! Extracts runs of Dubins commands from a mainline.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use crate::mission::MainLineItem;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A maximal block of Dubins items, plus the ordinary item either side of it if there is one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DubinsRun<'a, T> {
    /// Index of the first item of the run in the mainline
    pub start: usize,

    /// The items in the run
    pub run: &'a [T],
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Split a mainline into its Dubins runs.
pub fn split_runs(mainline: &[MainLineItem]) -> Vec<DubinsRun<'_, MainLineItem>> {
    split_runs_by(mainline, |item| item.cmd.is_dubins())
}

/// Split any sequence into runs of the items matching `is_marker`.
pub fn split_runs_by<T, F>(items: &[T], is_marker: F) -> Vec<DubinsRun<'_, T>>
where
    F: Fn(&T) -> bool,
{
    let mut runs = Vec::new();
    let mut i = 0;

    while i < items.len() {
        if !is_marker(&items[i]) {
            i += 1;
            continue;
        }

        // Find the end of the block
        let block_start = i;
        while i < items.len() && is_marker(&items[i]) {
            i += 1;
        }

        // Take one anchor either side where they exist
        let start = block_start.saturating_sub(1);
        let end = (i + 1).min(items.len());

        runs.push(DubinsRun {
            start,
            run: &items[start..end],
        });
    }

    runs
}
