//! Mode context selected at run time.

use crate::{
    cbc::Cbc,
    ctr::Ctr,
    ecb::Ecb,
    gcm::{Gcm, GcmParams},
    ops::CipherOps,
    sink::Sink,
    Direction, Error,
};

/// Mode of operation of a [`ModeContext`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Electronic codebook.
    Ecb,
    /// Cipher block chaining.
    Cbc,
    /// Counter mode.
    Ctr,
    /// Galois/counter mode.
    Gcm,
    /// GCM authentication only.
    Gmac,
}

/// Per-session parameters of each mode.
#[derive(Copy, Clone, Debug)]
pub enum Params<'a> {
    /// ECB takes no parameters.
    Ecb,
    /// CBC with a one-block IV.
    Cbc {
        /// Initialization vector.
        iv: &'a [u8],
    },
    /// CTR starting at `counter`, incrementing its low `counter_bits` bits.
    Ctr {
        /// Initial counter block.
        counter: &'a [u8],
        /// Width of the incremented field.
        counter_bits: u32,
    },
    /// GCM.
    Gcm(GcmParams<'a>),
    /// GMAC.
    Gmac(GcmParams<'a>),
}

impl Params<'_> {
    /// Mode selected by these parameters.
    pub fn mode(&self) -> Mode {
        match self {
            Params::Ecb => Mode::Ecb,
            Params::Cbc { .. } => Mode::Cbc,
            Params::Ctr { .. } => Mode::Ctr,
            Params::Gcm(_) => Mode::Gcm,
            Params::Gmac(_) => Mode::Gmac,
        }
    }
}

#[derive(Clone)]
enum Inner<C> {
    Ecb(Ecb<C>),
    Cbc(Cbc<C>),
    Ctr(Ctr<C>),
    Gcm(Gcm<C>),
}

macro_rules! dispatch {
    ($inner:expr, $w:ident => $body:expr) => {
        match $inner {
            Inner::Ecb($w) => $body,
            Inner::Cbc($w) => $body,
            Inner::Ctr($w) => $body,
            Inner::Gcm($w) => $body,
        }
    };
}

/// One cipher session in any supported mode.
///
/// The mode is fixed at creation. A context is used by one caller at a
/// time; independent contexts may share a primitive through `&C`.
#[derive(Clone)]
pub struct ModeContext<C> {
    inner: Inner<C>,
    mode: Mode,
    direction: Direction,
}

impl<C: CipherOps> ModeContext<C> {
    /// Open a session. Every parameter is validated here; no context exists
    /// on error.
    pub fn new(cipher: C, direction: Direction, params: Params<'_>) -> Result<Self, Error> {
        let mode = params.mode();
        let inner = match params {
            Params::Ecb => Inner::Ecb(Ecb::new(cipher, direction)?),
            Params::Cbc { iv } => Inner::Cbc(Cbc::new(cipher, direction, iv)?),
            Params::Ctr {
                counter,
                counter_bits,
            } => Inner::Ctr(Ctr::new(cipher, counter, counter_bits)?),
            Params::Gcm(p) => Inner::Gcm(Gcm::new(cipher, direction, &p)?),
            Params::Gmac(p) => Inner::Gcm(Gcm::gmac(cipher, direction, &p)?),
        };
        Ok(Self {
            inner,
            mode,
            direction,
        })
    }

    /// Mode of this session.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Direction of this session.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Number of input bytes carried over to the next call.
    pub fn buffered_len(&self) -> usize {
        dispatch!(&self.inner, w => w.buffered_len())
    }

    /// Process `data`, writing every completed block to `sink`.
    ///
    /// Either the whole call succeeds or nothing is written.
    pub fn process<S: Sink + ?Sized>(&mut self, data: &[u8], sink: &mut S) -> Result<usize, Error> {
        dispatch!(&mut self.inner, w => w.process(data, sink))
    }

    /// Process `buf` in place, returning the number of output bytes written
    /// to its front.
    pub fn process_in_place(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        dispatch!(&mut self.inner, w => w.process_in_place(buf))
    }

    /// Number of bytes `finish` will write.
    pub fn final_output_len(&self) -> usize {
        dispatch!(&self.inner, w => w.final_output_len())
    }

    /// Flush the session, writing the last partial block and the GCM tag.
    pub fn finish<S: Sink + ?Sized>(self, sink: &mut S) -> Result<usize, Error> {
        dispatch!(self.inner, w => w.finish(sink))
    }

    /// Process the rest of the message and finish, validating everything
    /// before the first byte is written.
    pub fn process_final<S: Sink + ?Sized>(self, data: &[u8], sink: &mut S) -> Result<usize, Error> {
        dispatch!(self.inner, w => w.process_final(data, sink))
    }
}
