// Copyright (C) 2019, Cloudflare, Inc.
// All rights reserved.
//
// Redistribution and use in source and binary forms, with or without
// modification, are permitted provided that the following conditions are
// met:
//
//     * Redistributions of source code must retain the above copyright notice,
//       this list of conditions and the following disclaimer.
//
//     * Redistributions in binary form must reproduce the above copyright
//       notice, this list of conditions and the following disclaimer in the
//       documentation and/or other materials provided with the distribution.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS
// IS" AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO,
// THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR
// PURPOSE ARE DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR
// CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL,
// EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO,
// PROCUREMENT OF SUBSTITUTE GOODS OR SERVICES; LOSS OF USE, DATA, OR
// PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF
// LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING
// NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE OF THIS
// SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

use std::cmp;
use std::collections::BinaryHeap;
use std::time::Duration;

use crate::segment::Segment;
use crate::Side;

/// A deferred operation dispatched by the connection when its deadline
/// is reached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// The client opens the connection with its SYN.
    Start,

    /// A segment finishes crossing the link and is handed to `dst`.
    Arrive { dst: Side, seg: Segment },

    /// The retransmission timer of `side` fires. The fire is validated
    /// against the endpoint's recorded deadline before it acts, so
    /// fires from superseded armings are no-ops.
    Timeout { side: Side },

    /// The periodic termination check.
    CheckDone,
}

struct Entry {
    time: Duration,
    seq: u64,
    action: Action,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // BinaryHeap is a max-heap, so flip the comparison to pop the
    // earliest deadline first. The sequence number keeps FIFO order
    // among entries with equal deadlines.
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        (other.time, other.seq).cmp(&(self.time, self.seq))
    }
}

/// An ordered multiset of timed actions driving simulated time forward.
///
/// `now` only ever advances, and only to the deadline of the event
/// being dequeued. Actions run to completion before the next dispatch;
/// there is no preemption.
pub struct Timeline {
    now: Duration,

    queue: BinaryHeap<Entry>,

    next_seq: u64,
}

impl Timeline {
    pub fn new() -> Timeline {
        Timeline {
            now: Duration::ZERO,

            queue: BinaryHeap::new(),

            next_seq: 0,
        }
    }

    /// Current simulated time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedules `action` to run at absolute time `t`.
    ///
    /// Scheduling into the past is a programmer error; release builds
    /// clamp the deadline to `now`.
    pub fn schedule(&mut self, t: Duration, action: Action) {
        debug_assert!(
            t >= self.now,
            "scheduled into the past: {:?} < {:?}",
            t,
            self.now
        );

        self.queue.push(Entry {
            time: self.clamp_deadline(t),
            seq: self.next_seq,
            action,
        });

        self.next_seq += 1;
    }

    // Release builds tolerate a past-dated deadline by running the
    // action at `now`.
    fn clamp_deadline(&self, t: Duration) -> Duration {
        cmp::max(t, self.now)
    }

    /// Deadline of the earliest pending event.
    pub fn peek_deadline(&self) -> Option<Duration> {
        self.queue.peek().map(|e| e.time)
    }

    /// Extracts the earliest event and advances `now` to its deadline.
    pub fn pop(&mut self) -> Option<Action> {
        let e = self.queue.pop()?;

        self.now = e.time;

        Some(e.action)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
