//! Permutation safety for untrusted reorder proposals.
//!
//! A proposal is a sequence of 1-based task numbers referring to the baseline
//! list. Nothing about it is trusted: `sanitize_permutation` turns any integer
//! sequence into a permutation of 1..=n, and `clamp_permutation_greedy` then
//! bounds how far each task may move from its baseline slot. Both are total;
//! malformed input is repaired, never rejected.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Keep the first occurrence of each in-range value, then append the missing
/// values in ascending order.
///
/// `sanitize_permutation(&[0, 5, 2, -1, 1], 3) == [2, 1, 3]`
pub fn sanitize_permutation(raw: &[i64], n: usize) -> Vec<usize> {
    let mut seen = vec![false; n + 1];
    let mut out = Vec::with_capacity(n);

    for &v in raw {
        let Ok(v) = usize::try_from(v) else { continue };
        if v == 0 || v > n || seen[v] {
            continue;
        }
        seen[v] = true;
        out.push(v);
    }

    let kept = out.len();
    out.extend((1..=n).filter(|v| !seen[*v]));

    if kept != raw.len() || kept != n {
        log::debug!(
            "sanitized proposal: {} raw values, {} kept, {} appended",
            raw.len(),
            kept,
            n - kept
        );
    }
    out
}

/// True when `perm` holds each of 1..=perm.len() exactly once.
pub fn is_permutation(perm: &[usize]) -> bool {
    let n = perm.len();
    let mut seen = vec![false; n + 1];
    for &v in perm {
        if v == 0 || v > n || seen[v] {
            return false;
        }
        seen[v] = true;
    }
    true
}

/// Largest |position - baseline position| in `perm` (0 for the identity).
pub fn max_displacement(perm: &[usize]) -> usize {
    perm.iter()
        .enumerate()
        .map(|(pos, &task)| pos.abs_diff(task.saturating_sub(1)))
        .max()
        .unwrap_or(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Candidate {
    /// Last slot this task may occupy.
    window_end: usize,
    /// Index of the task in the proposal.
    proposed_pos: usize,
    task: usize,
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; invert so the tightest window pops first,
        // then the earlier proposal position, then the lower task number.
        other
            .window_end
            .cmp(&self.window_end)
            .then_with(|| other.proposed_pos.cmp(&self.proposed_pos))
            .then_with(|| other.task.cmp(&self.task))
    }
}

/// Repair `perm` so that every task `t` ends at a slot `p` with
/// `|p - (t - 1)| <= max_displacement`.
///
/// Slots are filled left to right. A task becomes eligible once the slot
/// reaches the start of its window `max(0, t-1-d)`; among eligible tasks the
/// one whose window closes first wins. That is earliest-deadline-first over
/// unit jobs, and since the identity assignment is feasible it never strands
/// a task. Ties follow the proposal; once `max_displacement >= n - 1` every
/// window ends at the last slot and the proposal comes back unchanged.
///
/// Input that is not a permutation of 1..=len is sanitized first.
pub fn clamp_permutation_greedy(perm: &[usize], max_displacement: usize) -> Vec<usize> {
    let n = perm.len();
    let perm: Vec<usize> = if is_permutation(perm) {
        perm.to_vec()
    } else {
        let raw: Vec<i64> = perm.iter().map(|&v| i64::try_from(v).unwrap_or(-1)).collect();
        sanitize_permutation(&raw, n)
    };

    let mut proposed_pos = vec![0usize; n + 1];
    for (pos, &task) in perm.iter().enumerate() {
        proposed_pos[task] = pos;
    }

    let d = max_displacement;
    let mut heap: BinaryHeap<Candidate> = BinaryHeap::new();
    let mut next_task = 1usize;
    let mut out = Vec::with_capacity(n);

    for slot in 0..n {
        // Window starts are non-decreasing in t, so release tasks in order.
        while next_task <= n && (next_task - 1).saturating_sub(d) <= slot {
            heap.push(Candidate {
                window_end: (next_task - 1).saturating_add(d).min(n - 1),
                proposed_pos: proposed_pos[next_task],
                task: next_task,
            });
            next_task += 1;
        }

        let Some(c) = heap.pop() else {
            log::warn!("clamp found no eligible task for slot {slot}; using baseline order");
            return (1..=n).collect();
        };
        debug_assert!(c.window_end >= slot, "task {} missed its window", c.task);
        out.push(c.task);
    }

    let moved = out.iter().zip(perm.iter()).filter(|(a, b)| a != b).count();
    if moved > 0 {
        log::debug!("clamped proposal to displacement {d}: {moved} of {n} slots changed");
    }
    out
}
