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
use std::fmt;
use std::time::Duration;

use crate::segment::Flags;
use crate::segment::Segment;
use crate::Config;
use crate::Side;
use crate::CLIENT_ISS;
use crate::SERVER_ISS;

/// Side effects produced while an endpoint processes one event.
///
/// Endpoints never touch the link or the timeline directly; segments
/// to transmit and the latest timer arming are collected here and
/// drained by the connection after the operation returns.
#[derive(Default)]
pub struct Outbox {
    pub segs: Vec<Segment>,

    pub timer: Option<Duration>,
}

impl Outbox {
    pub fn new() -> Outbox {
        Outbox::default()
    }

    fn push(&mut self, seg: Segment) {
        self.segs.push(seg);
    }

    // The last arming within a dispatch wins; earlier scheduled fires
    // are invalidated by the deadline check in `timer_expired`.
    fn arm(&mut self, deadline: Duration) {
        self.timer = Some(deadline);
    }
}

/// One side of the simulated connection, holding both the sender and
/// receiver halves of the TCP state.
///
/// The client sends the application data; the server acknowledges it.
/// Congestion control is Reno-style: slow start below `ssthresh`,
/// additive increase above it, fast retransmit on the third duplicate
/// ACK, and multiplicative decrease with timer backoff on RTO.
pub struct Endpoint {
    pub side: Side,

    // Receiver state.
    pub rcv_nxt: u32,

    // Sender state.
    pub iss: u32,
    pub snd_una: u32,
    pub snd_nxt: u32,

    pub cwnd: u32,
    pub ssthresh: u32,
    pub dupacks: u32,

    pub mss: u32,
    pub rwnd: u32,

    pub established: bool,
    pub fin_sent: bool,
    pub fin_acked: bool,

    // A single outstanding retransmission timer.
    pub rto: Duration,
    pub max_rto: Duration,
    pub timer_running: bool,
    pub timer_deadline: Duration,

    // Application bytes to push, client only.
    pub app_bytes_total: u64,
    pub app_bytes_sent: u64,

    // Counters.
    pub retransmits: usize,
    pub segments_sent: usize,
    pub acks_received: usize,
}

impl Endpoint {
    pub fn new(side: Side, config: &Config, app_bytes_total: u64) -> Endpoint {
        let mut ep = Endpoint {
            side,

            rcv_nxt: 0,

            iss: 0,
            snd_una: 0,
            snd_nxt: 0,

            cwnd: config.mss,
            ssthresh: config.ssthresh,
            dupacks: 0,

            mss: config.mss,
            rwnd: config.rwnd,

            established: false,
            fin_sent: false,
            fin_acked: false,

            rto: config.initial_rto,
            max_rto: config.max_rto,
            timer_running: false,
            timer_deadline: Duration::ZERO,

            app_bytes_total: 0,
            app_bytes_sent: 0,

            retransmits: 0,
            segments_sent: 0,
            acks_received: 0,
        };

        match side {
            Side::Client => {
                ep.iss = CLIENT_ISS;
                ep.snd_una = CLIENT_ISS;
                ep.snd_nxt = CLIENT_ISS;
                ep.app_bytes_total = app_bytes_total;
            },

            Side::Server => ep.rcv_nxt = SERVER_ISS,
        }

        ep
    }

    /// Opens the connection: sends the SYN and arms the retransmission
    /// timer.
    pub fn start(&mut self, now: Duration, out: &mut Outbox) {
        self.send_segment(self.iss, 0, Flags::SYN, out);

        // The SYN consumes one sequence number.
        self.snd_nxt = self.iss + 1;

        self.arm_timer(now, out);
    }

    /// Processes one segment arriving from the peer.
    pub fn on_segment(&mut self, seg: &Segment, now: Duration, out: &mut Outbox) {
        trace!("{:?} rx {:?}", self.side, seg);

        // Passive open: a pure SYN is answered with a SYN|ACK carrying
        // the local ISN.
        if seg.flags.has(Flags::SYN) && !seg.flags.has(Flags::ACK) {
            self.rcv_nxt = seg.seq + 1;

            out.push(Segment::new(
                SERVER_ISS,
                self.rcv_nxt,
                Flags::SYN | Flags::ACK,
                0,
            ));

            return;
        }

        // Handshake completion. The client learns its SYN was accepted
        // from the SYN|ACK, answers with the final ACK and starts
        // pushing data; the server is established once that ACK
        // arrives. Neither side runs the ACK number through the
        // new-ACK path here, so `snd_una` stays at `iss` until the
        // first data ACK.
        if seg.flags.has(Flags::ACK) && !self.established {
            self.established = true;

            if self.side == Side::Client {
                self.rcv_nxt = seg.seq + 1;

                out.push(Segment::new(self.snd_nxt, self.rcv_nxt, Flags::ACK, 0));

                debug!("{:?} established {:?}", self.side, self);

                self.try_send(now, out);
            } else {
                debug!("{:?} established", self.side);
            }

            return;
        }

        if self.side == Side::Server {
            self.recv_data(seg, out);
            return;
        }

        if seg.flags.has(Flags::ACK) {
            self.on_ack(seg, now, out);
        }
    }

    // Receiver path: in-order data advances `rcv_nxt`, out-of-order
    // payload is discarded without reassembly. Every arrival is
    // answered with a cumulative ACK; the duplicates this generates
    // are what the sender keys fast retransmit on.
    fn recv_data(&mut self, seg: &Segment, out: &mut Outbox) {
        if seg.seq == self.rcv_nxt {
            self.rcv_nxt += seg.seq_space();
        }

        out.push(Segment::new(SERVER_ISS, self.rcv_nxt, Flags::ACK, 0));
    }

    // Cumulative ACK classification: anything above `snd_una` is new,
    // an equal value with bytes outstanding is a duplicate, anything
    // below is stale and ignored.
    fn on_ack(&mut self, seg: &Segment, now: Duration, out: &mut Outbox) {
        if seg.ack > self.snd_una {
            self.on_new_ack(seg, now, out);
        } else if seg.ack == self.snd_una && self.snd_una < self.snd_nxt {
            self.on_dup_ack(now, out);
        }
    }

    fn on_new_ack(&mut self, seg: &Segment, now: Duration, out: &mut Outbox) {
        self.acks_received += 1;
        self.snd_una = seg.ack;
        self.dupacks = 0;

        if self.cwnd < self.ssthresh {
            // Slow start.
            self.cwnd += self.mss;
        } else {
            // Congestion avoidance, roughly one mss per round trip.
            self.cwnd += self.mss * self.mss / cmp::max(1, self.cwnd);
        }

        trace!("{:?} new ack={} {:?}", self.side, seg.ack, self);

        self.cancel_timer();

        if self.snd_una < self.snd_nxt {
            // Bytes still outstanding, keep the timer up.
            self.arm_timer(now, out);
        }

        if self.fin_sent && seg.ack == self.snd_nxt {
            self.fin_acked = true;
        }

        self.try_send(now, out);
    }

    fn on_dup_ack(&mut self, now: Duration, out: &mut Outbox) {
        self.dupacks += 1;

        if self.dupacks == 3 {
            // Fast retransmit: halve the window and resend the oldest
            // unacknowledged segment without waiting for the timer.
            self.ssthresh = cmp::max(2 * self.mss, self.cwnd / 2);
            self.cwnd = self.ssthresh + 3 * self.mss;
            self.retransmits += 1;

            debug!(
                "{:?} fast retransmit seq={} {:?}",
                self.side, self.snd_una, self
            );

            self.send_segment(self.snd_una, self.mss as u16, Flags::NONE, out);
            self.arm_timer(now, out);
        } else if self.dupacks > 3 {
            // Inflate the window so new data keeps flowing during
            // recovery. There is no deflation step on exit; the next
            // new ACK resumes growth from the inflated window.
            self.cwnd += self.mss;

            self.try_send(now, out);
        }
    }

    /// Sends as much new data as the window allows, then the FIN once
    /// the application buffer is drained.
    pub fn try_send(&mut self, now: Duration, out: &mut Outbox) {
        if self.side != Side::Client || !self.established {
            return;
        }

        loop {
            let flight = self.snd_nxt - self.snd_una;
            let allowed = cmp::min(self.cwnd, self.rwnd);

            if flight >= allowed {
                break;
            }

            if self.app_bytes_sent < self.app_bytes_total {
                let can = cmp::min(allowed - flight, self.mss);
                let remaining = cmp::min(
                    u64::from(self.mss),
                    self.app_bytes_total - self.app_bytes_sent,
                ) as u32;

                let len = cmp::min(can, remaining) as u16;
                if len == 0 {
                    break;
                }

                self.send_segment(self.snd_nxt, len, Flags::NONE, out);

                if !self.timer_running {
                    self.arm_timer(now, out);
                }

                self.snd_nxt += u32::from(len);
                self.app_bytes_sent += u64::from(len);
            } else if !self.fin_sent {
                // All data queued, close our half.
                self.send_segment(self.snd_nxt, 0, Flags::FIN, out);

                // The FIN consumes one sequence number.
                self.snd_nxt += 1;
                self.fin_sent = true;

                if !self.timer_running {
                    self.arm_timer(now, out);
                }
            } else {
                break;
            }
        }
    }

    /// Retransmission timeout: multiplicative decrease back to slow
    /// start, binary timer backoff, resend from `snd_una`.
    pub fn on_timeout(&mut self, now: Duration, out: &mut Outbox) {
        self.ssthresh = cmp::max(2 * self.mss, self.cwnd / 2);
        self.cwnd = self.mss;
        self.rto = cmp::min(self.max_rto, self.rto * 2);
        self.dupacks = 0;
        self.retransmits += 1;

        debug!("{:?} rto fired seq={} {:?}", self.side, self.snd_una, self);

        let outstanding = self.snd_nxt - self.snd_una;
        let len = cmp::min(self.mss, if outstanding > 0 {
            outstanding
        } else {
            self.mss
        });

        self.send_segment(self.snd_una, len as u16, Flags::NONE, out);
        self.arm_timer(now, out);
    }

    fn send_segment(&mut self, seq: u32, len: u16, flags: Flags, out: &mut Outbox) {
        let ack = if flags.has(Flags::ACK) { self.rcv_nxt } else { 0 };

        self.segments_sent += 1;

        out.push(Segment::new(seq, ack, flags, len));
    }

    // One retransmission timer per endpoint, with no queue surgery on
    // re-arm or cancel: a scheduled fire is validated against the
    // recorded deadline before it acts, so anything but the most
    // recent arming is a no-op.
    fn arm_timer(&mut self, now: Duration, out: &mut Outbox) {
        self.timer_running = true;
        self.timer_deadline = now + self.rto;

        out.arm(self.timer_deadline);
    }

    fn cancel_timer(&mut self) {
        self.timer_running = false;
    }

    /// Whether a timer fire arriving at `now` corresponds to the live
    /// arming.
    pub fn timer_expired(&self, now: Duration) -> bool {
        self.timer_running && now >= self.timer_deadline
    }

    /// True once the FIN has been sent and acknowledged and nothing is
    /// outstanding.
    pub fn is_complete(&self) -> bool {
        self.fin_sent && self.fin_acked && self.snd_una == self.snd_nxt
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "snd_una={} ", self.snd_una)?;
        write!(f, "snd_nxt={} ", self.snd_nxt)?;
        write!(f, "rcv_nxt={} ", self.rcv_nxt)?;
        write!(f, "cwnd={} ", self.cwnd)?;
        write!(f, "ssthresh={} ", self.ssthresh)?;
        write!(f, "dupacks={} ", self.dupacks)?;
        write!(f, "rto={:?}", self.rto)?;

        Ok(())
    }
}
