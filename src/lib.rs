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

//! Discrete-event simulation of a TCP connection over a lossy link.
//!
//! tcpsim models a single Reno-style TCP connection between a client
//! pushing a fixed amount of application data and a server
//! acknowledging it, over a point-to-point link with configurable
//! bandwidth, propagation delay, and Bernoulli loss. It implements the
//! three-way handshake, cumulative acknowledgment, slow start,
//! congestion avoidance, fast retransmit, retransmission timeout with
//! binary backoff, and FIN teardown, all in simulated time. Scenario
//! selection, multi-trial aggregation, and reporting are left to the
//! application.
//!
//! ## Configuring simulations
//!
//! Link parameters are validated up front by [`Config::new()`];
//! everything else has defaults and can be changed with the mutators:
//!
//! ```
//! let mut config = tcpsim::Config::new(
//!     10e6,                                 // 10 Mbps
//!     std::time::Duration::from_millis(25), // one-way delay
//!     0.0,                                  // loss probability
//! )?;
//!
//! config.set_seed(12345);
//! # Ok::<(), tcpsim::Error>(())
//! ```
//!
//! ## Running a connection
//!
//! [`connect()`] creates the client/server pair, [`Connection::start()`]
//! schedules the opening SYN, and [`Connection::run()`] drives the
//! event loop until the transfer completes or the time cap is reached:
//!
//! ```
//! # let mut config =
//! #     tcpsim::Config::new(10e6, std::time::Duration::from_millis(25), 0.0)?;
//! // Transfer 200 KiB of application data from client to server.
//! let mut conn = tcpsim::connect(200 * 1024, &config)?;
//!
//! conn.start()?;
//! conn.run(tcpsim::DEFAULT_TIME_CAP)?;
//!
//! let stats = conn.stats();
//!
//! assert!(conn.is_complete());
//! assert_eq!(stats.retransmits, 0);
//! # Ok::<(), tcpsim::Error>(())
//! ```
//!
//! ## Determinism
//!
//! All randomness flows from one PRNG owned by the connection and
//! seeded through [`Config::set_seed()`] (default [`DEFAULT_SEED`]),
//! so two runs with identical parameters and seeds produce identical
//! event traces and counters. Concurrent simulations in the same
//! process share no state.

#[macro_use]
extern crate log;

use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::endpoint::Endpoint;
use crate::endpoint::Outbox;
use crate::link::Link;
use crate::sched::Action;
use crate::sched::Timeline;
use crate::segment::Segment;

/// The fixed per-segment header overhead, in bytes, added to the
/// payload length when computing serialization delay.
pub const HEADER_BYTES: usize = 40;

/// The client's initial send sequence number.
pub const CLIENT_ISS: u32 = 1000;

/// The server's initial send sequence number, also carried as the
/// sequence of every acknowledgment it sends.
pub const SERVER_ISS: u32 = 5000;

/// The default PRNG seed for loss sampling.
pub const DEFAULT_SEED: u64 = 12345;

/// The default watchdog cap on simulated time.
pub const DEFAULT_TIME_CAP: Duration = Duration::from_secs(300);

const DEFAULT_MSS: u32 = 1000;

const DEFAULT_RECEIVE_WINDOW: u32 = 1 << 30;

const DEFAULT_SSTHRESH: u32 = 65535;

const DEFAULT_INITIAL_RTO: Duration = Duration::from_secs(1);

const DEFAULT_MAX_RTO: Duration = Duration::from_secs(4);

const DEFAULT_END_CHECK_INTERVAL: Duration = Duration::from_millis(50);

/// A specialized [`Result`] type for simulation operations.
///
/// [`Result`]: https://doc.rust-lang.org/std/result/enum.Result.html
pub type Result<T> = std::result::Result<T, Error>;

/// A simulation error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// There is no more work to do.
    Done,

    /// The provided link or connection parameters are invalid.
    InvalidConfig,

    /// The operation cannot be completed because the connection is in
    /// an invalid state.
    InvalidState,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

/// The two ends of a simulated connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// The active opener, sender of the application data.
    Client,

    /// The passive opener, receiver and acknowledger.
    Server,
}

impl Side {
    pub fn peer(self) -> Side {
        match self {
            Side::Client => Side::Server,
            Side::Server => Side::Client,
        }
    }
}

/// Stores configuration shared between simulations.
#[derive(Clone, Debug)]
pub struct Config {
    bandwidth_bps: f64,
    prop_delay: Duration,
    loss_prob: f64,

    seed: u64,

    mss: u32,
    rwnd: u32,
    ssthresh: u32,

    initial_rto: Duration,
    max_rto: Duration,

    end_check_interval: Duration,
}

impl Config {
    /// Creates a config object with the given link parameters.
    ///
    /// `bandwidth_bps` must be a positive, finite bit rate and
    /// `loss_prob` a probability within `[0, 1]`.
    pub fn new(
        bandwidth_bps: f64, prop_delay: Duration, loss_prob: f64,
    ) -> Result<Config> {
        if !bandwidth_bps.is_finite() || bandwidth_bps <= 0.0 {
            return Err(Error::InvalidConfig);
        }

        if !(0.0..=1.0).contains(&loss_prob) {
            return Err(Error::InvalidConfig);
        }

        Ok(Config {
            bandwidth_bps,
            prop_delay,
            loss_prob,

            seed: DEFAULT_SEED,

            mss: DEFAULT_MSS,
            rwnd: DEFAULT_RECEIVE_WINDOW,
            ssthresh: DEFAULT_SSTHRESH,

            initial_rto: DEFAULT_INITIAL_RTO,
            max_rto: DEFAULT_MAX_RTO,

            end_check_interval: DEFAULT_END_CHECK_INTERVAL,
        })
    }

    /// Sets the PRNG seed used for loss sampling.
    ///
    /// Two simulations with identical parameters and identical seeds
    /// produce identical traces; multi-trial drivers should vary the
    /// seed between trials.
    pub fn set_seed(&mut self, v: u64) {
        self.seed = v;
    }

    /// Sets the maximum segment size, in bytes. Must be nonzero.
    pub fn set_mss(&mut self, v: u16) {
        debug_assert!(v > 0);

        self.mss = u32::from(v);
    }

    /// Sets the receiver window, in bytes.
    pub fn set_receive_window(&mut self, v: u32) {
        self.rwnd = v;
    }

    /// Sets the initial retransmission timeout.
    pub fn set_initial_rto(&mut self, v: Duration) {
        self.initial_rto = v;
    }

    /// Sets the cap on retransmission timer backoff.
    pub fn set_max_rto(&mut self, v: Duration) {
        self.max_rto = v;
    }

    /// Sets the cadence of the periodic termination check.
    pub fn set_end_check_interval(&mut self, v: Duration) {
        self.end_check_interval = v;
    }
}

/// Creates a new simulated connection that will transfer
/// `app_bytes_total` bytes of application data from the client to the
/// server over the configured link.
pub fn connect(app_bytes_total: u64, config: &Config) -> Result<Connection> {
    Ok(Connection {
        timeline: Timeline::new(),

        link: Link::new(config.bandwidth_bps, config.prop_delay, config.loss_prob),

        client: Endpoint::new(Side::Client, config, app_bytes_total),
        server: Endpoint::new(Side::Server, config, 0),

        rng: StdRng::seed_from_u64(config.seed),
        seed: config.seed,

        end_check_interval: config.end_check_interval,

        packets_sent: 0,
        packets_dropped: 0,

        started: false,
        done: false,
    })
}

/// A simulated TCP connection.
///
/// The connection owns the event timeline, the link, both endpoints,
/// and the PRNG; everything an event touches is reached through it, so
/// actions are plain values and dispatch needs no shared references.
pub struct Connection {
    timeline: Timeline,

    link: Link,

    client: Endpoint,
    server: Endpoint,

    rng: StdRng,
    seed: u64,

    end_check_interval: Duration,

    packets_sent: usize,
    packets_dropped: usize,

    started: bool,
    done: bool,
}

impl Connection {
    /// Schedules the client's opening SYN and the first termination
    /// check at the current simulated time.
    pub fn start(&mut self) -> Result<()> {
        if self.started {
            return Err(Error::InvalidState);
        }

        self.started = true;

        let now = self.timeline.now();

        self.timeline.schedule(now, Action::Start);
        self.timeline.schedule(now, Action::CheckDone);

        Ok(())
    }

    /// Runs the event loop until the transfer completes, the queue
    /// drains, or the next event lies beyond `time_cap`.
    ///
    /// Hitting the cap is not an error; the caller can inspect
    /// [`Connection::is_complete()`] and resume with a larger cap.
    pub fn run(&mut self, time_cap: Duration) -> Result<()> {
        if !self.started {
            return Err(Error::InvalidState);
        }

        if self.done {
            return Err(Error::Done);
        }

        while !self.done && !self.timeline.is_empty() {
            let deadline = match self.timeline.peek_deadline() {
                Some(v) => v,

                None => break,
            };

            if deadline > time_cap {
                break;
            }

            if let Some(action) = self.timeline.pop() {
                self.dispatch(action);
            }

            self.check_invariants();
        }

        Ok(())
    }

    /// Returns the PRNG seed the connection's loss trials draw from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns the current simulated time.
    pub fn time(&self) -> Duration {
        self.timeline.now()
    }

    /// Returns true once both sides completed the handshake.
    pub fn is_established(&self) -> bool {
        self.client.established && self.server.established
    }

    /// Returns true once all data and the FIN have been sent and
    /// acknowledged.
    pub fn is_complete(&self) -> bool {
        self.client.is_complete()
    }

    /// Collects and returns statistics about the connection.
    pub fn stats(&self) -> Stats {
        Stats {
            time: self.timeline.now(),

            app_bytes_total: self.client.app_bytes_total,
            app_bytes_sent: self.client.app_bytes_sent,

            retransmits: self.client.retransmits,
            segments_sent: self.client.segments_sent,
            acks_received: self.client.acks_received,

            packets_sent: self.packets_sent,
            packets_dropped: self.packets_dropped,

            cwnd: self.client.cwnd,
            ssthresh: self.client.ssthresh,
            rto: self.client.rto,
        }
    }

    fn dispatch(&mut self, action: Action) {
        let now = self.timeline.now();

        match action {
            Action::Start => {
                let mut out = Outbox::new();

                self.client.start(now, &mut out);

                self.flush(Side::Client, out);
            },

            Action::Arrive { dst, seg } => {
                let mut out = Outbox::new();

                self.endpoint_mut(dst).on_segment(&seg, now, &mut out);

                self.flush(dst, out);
            },

            Action::Timeout { side } => {
                // Only the most recently armed fire is live; stale
                // fires fail the deadline check and fall through.
                if !self.endpoint_mut(side).timer_expired(now) {
                    return;
                }

                let mut out = Outbox::new();

                self.endpoint_mut(side).on_timeout(now, &mut out);

                self.flush(side, out);
            },

            Action::CheckDone => self.check_done(),
        }
    }

    // Turns the side effects of one endpoint operation into link
    // deliveries and a scheduled timer fire.
    fn flush(&mut self, src: Side, out: Outbox) {
        for seg in out.segs {
            self.deliver(src, seg);
        }

        if let Some(deadline) = out.timer {
            self.timeline.schedule(deadline, Action::Timeout { side: src });
        }
    }

    /// Hands a segment to the link: fills in the wire size, computes
    /// the arrival time, and samples loss. A dropped segment produces
    /// no receive event at all.
    fn deliver(&mut self, src: Side, mut seg: Segment) {
        seg.wire_size = usize::from(seg.len) + HEADER_BYTES;

        let now = self.timeline.now();
        let arrival =
            now + self.link.xmit_delay(seg.wire_size) + self.link.prop_delay();

        self.packets_sent += 1;

        if self.link.lost(&mut self.rng) {
            self.packets_dropped += 1;

            trace!("{:?} -> {:?} lost {:?}", src, src.peer(), seg);

            return;
        }

        trace!(
            "{:?} -> {:?} tx {:?} arrival={:?}",
            src,
            src.peer(),
            seg,
            arrival
        );

        self.timeline.schedule(arrival, Action::Arrive {
            dst: src.peer(),
            seg,
        });
    }

    // The periodic liveness probe. It re-schedules itself until the
    // termination predicate holds, then stops, freezing `now` at the
    // detection tick.
    fn check_done(&mut self) {
        if self.client.is_complete() {
            debug!(
                "connection complete at {:?} {:?}",
                self.timeline.now(),
                self.client
            );

            self.done = true;

            return;
        }

        let next = self.timeline.now() + self.end_check_interval;

        self.timeline.schedule(next, Action::CheckDone);
    }

    fn endpoint_mut(&mut self, side: Side) -> &mut Endpoint {
        match side {
            Side::Client => &mut self.client,
            Side::Server => &mut self.server,
        }
    }

    // Sequence and window sanity, checked between event dispatches in
    // debug builds.
    fn check_invariants(&self) {
        let c = &self.client;

        debug_assert!(c.snd_una <= c.snd_nxt);
        debug_assert!(c.app_bytes_sent <= c.app_bytes_total);
        debug_assert!(c.cwnd >= c.mss);
        debug_assert!(c.ssthresh >= 2 * c.mss);
        debug_assert!(c.fin_sent || !c.fin_acked);
        debug_assert!(self.packets_dropped <= self.packets_sent);
    }
}

/// Statistics about a simulated connection.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    /// The simulated time reached by the run.
    pub time: Duration,

    /// The number of application bytes the client was asked to send.
    pub app_bytes_total: u64,

    /// The number of application bytes handed to the network so far.
    pub app_bytes_sent: u64,

    /// The number of retransmissions, timeouts and fast retransmits
    /// combined.
    pub retransmits: usize,

    /// The number of segments sent by the client, retransmissions
    /// included.
    pub segments_sent: usize,

    /// The number of new cumulative acknowledgments the client
    /// received.
    pub acks_received: usize,

    /// The number of packets handed to the link, in both directions.
    pub packets_sent: usize,

    /// The number of packets the link dropped.
    pub packets_dropped: usize,

    /// The client's congestion window, in bytes.
    pub cwnd: u32,

    /// The client's slow-start threshold, in bytes.
    pub ssthresh: u32,

    /// The client's retransmission timeout.
    pub rto: Duration,
}

impl std::fmt::Debug for Stats {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "time={:?} ", self.time)?;
        write!(f, "app={}/{} ", self.app_bytes_sent, self.app_bytes_total)?;
        write!(
            f,
            "segs={} acks={} retrans={} ",
            self.segments_sent, self.acks_received, self.retransmits
        )?;
        write!(
            f,
            "pkts={} dropped={} ",
            self.packets_sent, self.packets_dropped
        )?;
        write!(
            f,
            "cwnd={} ssthresh={} rto={:?}",
            self.cwnd, self.ssthresh, self.rto
        )?;

        Ok(())
    }
}

mod endpoint;
mod link;
mod sched;
mod segment;

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn scenario(
        bandwidth_bps: f64, prop_delay: Duration, loss_prob: f64,
        app_bytes: u64,
    ) -> Connection {
        let config = Config::new(bandwidth_bps, prop_delay, loss_prob).unwrap();

        let mut conn = connect(app_bytes, &config).unwrap();

        conn.start().unwrap();
        conn.run(DEFAULT_TIME_CAP).unwrap();

        conn
    }

    // The universal invariants that must hold after any run.
    fn assert_sane(conn: &Connection) {
        let c = &conn.client;

        assert!(c.snd_una <= c.snd_nxt);
        assert!(
            u64::from(c.snd_nxt) <= u64::from(CLIENT_ISS) + c.app_bytes_total + 2
        );
        assert!(c.app_bytes_sent <= c.app_bytes_total);
        assert!(c.cwnd >= c.mss);
        assert!(c.ssthresh >= 2 * c.mss);
        assert!(conn.packets_dropped <= conn.packets_sent);

        if conn.is_complete() {
            assert_eq!(c.app_bytes_sent, c.app_bytes_total);
            assert!(c.fin_sent);
            assert!(c.fin_acked);
            assert_eq!(c.snd_una, c.snd_nxt);
        }
    }

    #[test]
    fn config_rejects_bad_link_parameters() {
        assert_eq!(
            Config::new(0.0, Duration::ZERO, 0.0).err(),
            Some(Error::InvalidConfig)
        );

        assert_eq!(
            Config::new(-10e6, Duration::ZERO, 0.0).err(),
            Some(Error::InvalidConfig)
        );

        assert_eq!(
            Config::new(f64::INFINITY, Duration::ZERO, 0.0).err(),
            Some(Error::InvalidConfig)
        );

        assert_eq!(
            Config::new(10e6, Duration::ZERO, 1.5).err(),
            Some(Error::InvalidConfig)
        );

        assert_eq!(
            Config::new(10e6, Duration::ZERO, -0.1).err(),
            Some(Error::InvalidConfig)
        );

        assert!(Config::new(10e6, Duration::ZERO, 1.0).is_ok());
    }

    #[test]
    fn lifecycle_errors() {
        init();

        let config = Config::new(10e6, Duration::from_millis(25), 0.0).unwrap();

        let mut conn = connect(1000, &config).unwrap();

        // Running before starting is an error.
        assert_eq!(conn.run(DEFAULT_TIME_CAP), Err(Error::InvalidState));

        conn.start().unwrap();
        assert_eq!(conn.start(), Err(Error::InvalidState));

        conn.run(DEFAULT_TIME_CAP).unwrap();
        assert!(conn.is_complete());

        // Running a finished connection has nothing left to do.
        assert_eq!(conn.run(DEFAULT_TIME_CAP), Err(Error::Done));
    }

    #[test]
    fn lossless_transfer_completes_without_retransmits() {
        init();

        let conn = scenario(10e6, Duration::from_millis(25), 0.0, 200 * 1024);

        let stats = conn.stats();

        assert!(conn.is_established());
        assert!(conn.is_complete());

        assert_eq!(stats.app_bytes_sent, 200 * 1024);
        assert_eq!(stats.retransmits, 0);
        assert_eq!(stats.packets_dropped, 0);

        assert!(stats.time > Duration::from_millis(300));
        assert!(stats.time < Duration::from_millis(1500));

        assert_sane(&conn);
    }

    #[test]
    fn fast_link_transfers_bulk_data() {
        init();

        let conn = scenario(1e9, Duration::from_millis(1), 0.0, 10 * 1024 * 1024);

        let stats = conn.stats();

        assert!(conn.is_complete());
        assert_eq!(stats.retransmits, 0);
        assert_eq!(stats.packets_dropped, 0);
        assert!(stats.time < Duration::from_secs(5));

        assert_sane(&conn);
    }

    #[test]
    fn light_loss_still_completes() {
        init();

        let conn =
            scenario(100e6, Duration::from_millis(10), 0.001, 5 * 1024 * 1024);

        let stats = conn.stats();

        assert!(conn.is_complete());
        assert_eq!(stats.app_bytes_sent, 5 * 1024 * 1024);
        assert!(stats.packets_dropped > 0);
        assert!(stats.time < Duration::from_secs(30));

        assert_sane(&conn);
    }

    #[test]
    fn heavy_loss_recovers_with_retransmissions() {
        init();

        let conn = scenario(1e6, Duration::from_millis(100), 0.05, 512 * 1024);

        let stats = conn.stats();

        assert!(conn.is_complete());
        assert!(stats.retransmits > 0);
        assert!(stats.packets_dropped > 0);
        assert!(stats.time < DEFAULT_TIME_CAP);

        // Retransmissions show up in the segment count.
        assert!(stats.segments_sent > stats.acks_received);

        assert_sane(&conn);
    }

    #[test]
    fn total_loss_stops_at_time_cap() {
        init();

        let conn = scenario(5e6, Duration::from_millis(250), 1.0, 1024 * 1024);

        let stats = conn.stats();

        assert!(!conn.is_established());
        assert!(!conn.is_complete());
        assert!(!conn.client.fin_acked);

        assert_eq!(stats.app_bytes_sent, 0);
        assert_eq!(stats.packets_dropped, stats.packets_sent);
        assert!(stats.packets_sent > 0);
        assert!(stats.retransmits > 0);

        assert!(stats.time >= Duration::from_secs(299));
        assert!(stats.time <= DEFAULT_TIME_CAP);

        assert_sane(&conn);
    }

    #[test]
    fn zero_byte_transfer_closes_immediately() {
        init();

        let conn = scenario(10e6, Duration::from_millis(25), 0.0, 0);

        let stats = conn.stats();

        assert!(conn.is_complete());
        assert_eq!(stats.app_bytes_sent, 0);
        assert_eq!(stats.retransmits, 0);

        // SYN and FIN from the client, SYN|ACK and the cumulative ACK
        // from the server, plus the client's handshake ACK: five
        // packets on the wire in total.
        assert_eq!(stats.segments_sent, 2);
        assert_eq!(stats.packets_sent, 5);

        assert!(stats.time < Duration::from_secs(1));

        assert_sane(&conn);
    }

    #[test]
    fn identical_seeds_reproduce_identical_runs() {
        init();

        let a = scenario(10e6, Duration::from_millis(25), 0.01, 200 * 1024);
        let b = scenario(10e6, Duration::from_millis(25), 0.01, 200 * 1024);

        assert!(a.is_complete());
        assert!(b.is_complete());

        assert_eq!(a.stats(), b.stats());
    }

    #[test]
    fn seed_is_exposed() {
        init();

        let mut config = Config::new(10e6, Duration::from_millis(25), 0.0).unwrap();

        let conn = connect(1000, &config).unwrap();
        assert_eq!(conn.seed(), DEFAULT_SEED);

        config.set_seed(42);

        let conn = connect(1000, &config).unwrap();
        assert_eq!(conn.seed(), 42);
    }

    #[test]
    fn run_resumes_after_small_time_cap() {
        init();

        let config = Config::new(10e6, Duration::from_millis(25), 0.0).unwrap();

        let mut conn = connect(200 * 1024, &config).unwrap();

        conn.start().unwrap();

        // Too small a cap for even the SYN to arrive.
        conn.run(Duration::from_millis(10)).unwrap();
        assert!(!conn.is_complete());
        assert!(!conn.is_established());

        conn.run(DEFAULT_TIME_CAP).unwrap();
        assert!(conn.is_complete());

        assert_sane(&conn);
    }

    #[test]
    fn short_transfer_stays_in_slow_start() {
        init();

        // A few segments worth of data: the transfer finishes within
        // the first round trips and cwnd never reaches ssthresh.
        let conn = scenario(10e6, Duration::from_millis(25), 0.0, 3000);

        let stats = conn.stats();

        assert!(conn.is_complete());
        assert!(stats.cwnd < DEFAULT_SSTHRESH);
        assert_eq!(stats.ssthresh, DEFAULT_SSTHRESH);

        assert_sane(&conn);
    }
}
