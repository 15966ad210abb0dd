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

use std::time::Duration;

use rand::rngs::StdRng;
use rand::Rng;

/// A point-to-point link with fixed bandwidth, one-way propagation
/// delay, and independent Bernoulli loss per delivery.
///
/// The link neither queues nor reorders; the only randomness is the
/// loss trial, drawn from the PRNG owned by the connection.
#[derive(Clone, Copy, Debug)]
pub struct Link {
    bandwidth_bps: f64,
    prop_delay: Duration,
    loss_prob: f64,
}

impl Link {
    pub fn new(bandwidth_bps: f64, prop_delay: Duration, loss_prob: f64) -> Link {
        Link {
            bandwidth_bps,
            prop_delay,
            loss_prob,
        }
    }

    /// Serialization delay for `bytes` on the wire, headers included.
    pub fn xmit_delay(&self, bytes: usize) -> Duration {
        Duration::from_secs_f64(bytes as f64 * 8.0 / self.bandwidth_bps)
    }

    /// One-way propagation delay.
    pub fn prop_delay(&self) -> Duration {
        self.prop_delay
    }

    /// Samples one Bernoulli loss trial.
    ///
    /// Consumes exactly one draw from `rng` regardless of the outcome,
    /// so the PRNG sequence depends only on the number of deliveries.
    pub fn lost(&self, rng: &mut StdRng) -> bool {
        rng.gen::<f64>() < self.loss_prob
    }
}
