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

use std::fmt;
use std::ops::BitOr;

/// TCP header flags carried by a [`Segment`].
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags(u8);

impl Flags {
    pub const NONE: Flags = Flags(0);
    pub const SYN: Flags = Flags(0x01);
    pub const ACK: Flags = Flags(0x02);
    pub const FIN: Flags = Flags(0x04);

    /// Returns true when any of the bits in `other` are set.
    pub fn has(self, other: Flags) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

impl fmt::Debug for Flags {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0 == 0 {
            return write!(f, "-");
        }

        let mut sep = "";

        if self.has(Flags::SYN) {
            write!(f, "{}SYN", sep)?;
            sep = "|";
        }

        if self.has(Flags::ACK) {
            write!(f, "{}ACK", sep)?;
            sep = "|";
        }

        if self.has(Flags::FIN) {
            write!(f, "{}FIN", sep)?;
        }

        Ok(())
    }
}

/// A TCP segment in flight between the two endpoints.
///
/// Segments are plain values; once handed to the link for delivery they
/// are never mutated again. `wire_size` is the on-wire byte count
/// (payload plus the fixed header overhead) and is filled in by the
/// connection at delivery time, since only the link cares about it.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub seq: u32,
    pub ack: u32,
    pub flags: Flags,
    pub len: u16,
    pub wire_size: usize,
}

impl Segment {
    pub fn new(seq: u32, ack: u32, flags: Flags, len: u16) -> Segment {
        Segment {
            seq,
            ack,
            flags,
            len,
            wire_size: 0,
        }
    }

    /// Sequence-number space consumed by this segment: the payload
    /// length, plus one for SYN and one for FIN.
    pub fn seq_space(&self) -> u32 {
        let mut n = u32::from(self.len);

        if self.flags.has(Flags::SYN) {
            n += 1;
        }

        if self.flags.has(Flags::FIN) {
            n += 1;
        }

        n
    }
}

impl fmt::Debug for Segment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:?} seq={} ack={} len={} wire={}",
            self.flags, self.seq, self.ack, self.len, self.wire_size
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_algebra() {
        let fl = Flags::SYN | Flags::ACK;

        assert!(fl.has(Flags::SYN));
        assert!(fl.has(Flags::ACK));
        assert!(!fl.has(Flags::FIN));

        assert!(!Flags::NONE.has(Flags::SYN));
        assert!(!Flags::NONE.has(Flags::ACK));
    }

    #[test]
    fn data_seq_space() {
        let seg = Segment::new(1000, 0, Flags::NONE, 1000);

        assert_eq!(seg.seq_space(), 1000);
    }

    #[test]
    fn syn_and_fin_consume_sequence() {
        let syn = Segment::new(1000, 0, Flags::SYN, 0);
        assert_eq!(syn.seq_space(), 1);

        let fin = Segment::new(2000, 0, Flags::FIN, 0);
        assert_eq!(fin.seq_space(), 1);

        let both = Segment::new(3000, 0, Flags::SYN | Flags::FIN, 10);
        assert_eq!(both.seq_space(), 12);
    }

    #[test]
    fn pure_ack_consumes_nothing() {
        let ack = Segment::new(5000, 1001, Flags::ACK, 0);

        assert_eq!(ack.seq_space(), 0);
    }
}
