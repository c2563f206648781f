// src/onewire/capture.rs

use crate::common::types::{CaptureStatus, Edge};
use core::sync::atomic::{AtomicU16, AtomicU32, AtomicU8, AtomicUsize, Ordering};

// Marker for "no rising edge recorded since reset".
const NO_RISE: u32 = u32::MAX;

#[allow(clippy::declare_interior_mutable_const)]
const EMPTY_SAMPLE: AtomicU16 = AtomicU16::new(0);

/// Interrupt-side bookkeeping between two edges.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct EdgeState {
    /// Samples recorded so far.
    pub index: usize,
    /// Counter value at the last rising edge.
    pub rise: Option<u16>,
    pub status: CaptureStatus,
}

impl EdgeState {
    pub const RESET: EdgeState = EdgeState { index: 0, rise: None, status: CaptureStatus::NotReady };
}

/// Result of feeding one edge to [`on_edge`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct EdgeStep {
    pub state: EdgeState,
    /// `(slot, width)` to store, if this edge closed a pulse.
    pub sample: Option<(usize, u16)>,
}

/// Pure edge-interrupt transition.
///
/// A rising edge stores the counter snapshot. A falling edge closes a pulse
/// whose width is `(now - rise) mod 2^16`, so one counter rollover inside a
/// pulse is harmless. A falling edge with no rising edge before it (the
/// sensor first pulling the line low) records nothing. Once `expected`
/// samples are in, the status becomes `Ready` and further edges are ignored
/// until the store is reset.
pub fn on_edge(state: EdgeState, edge: Edge, snapshot: u16, expected: usize) -> EdgeStep {
    if matches!(state.status, CaptureStatus::Ready | CaptureStatus::Error) {
        return EdgeStep { state, sample: None };
    }

    let mut next = EdgeState { status: CaptureStatus::Measuring, ..state };
    let sample = match (edge, state.rise) {
        (Edge::Rising, _) => {
            next.rise = Some(snapshot);
            None
        }
        (Edge::Falling, None) => None,
        (Edge::Falling, Some(rise)) => {
            let slot = state.index;
            next.rise = None;
            next.index = slot + 1;
            if next.index >= expected {
                next.status = CaptureStatus::Ready;
            }
            Some((slot, snapshot.wrapping_sub(rise)))
        }
    };

    EdgeStep { state: next, sample }
}

/// Pulse-width samples plus capture status, shared by the edge interrupt
/// (writer) and the main loop (reader).
///
/// `B` is the number of pulses one acquisition records: 40 data bits, plus one
/// when the sensor's acknowledgement pulse is captured too.
pub struct PulseCaptureStore<const B: usize> {
    samples: [AtomicU16; B],
    index: AtomicUsize,
    rise: AtomicU32,
    status: AtomicU8,
}

impl<const B: usize> PulseCaptureStore<B> {
    pub const fn new() -> Self {
        PulseCaptureStore {
            samples: [EMPTY_SAMPLE; B],
            index: AtomicUsize::new(0),
            rise: AtomicU32::new(NO_RISE),
            status: AtomicU8::new(CaptureStatus::NotReady as u8),
        }
    }

    /// Splits the store into the edge-interrupt handle and the main-loop handle.
    pub fn split(&mut self) -> (CaptureWriter<'_, B>, CaptureReader<'_, B>) {
        let store: &PulseCaptureStore<B> = self;
        (CaptureWriter { store }, CaptureReader { store })
    }

    fn load_state(&self) -> EdgeState {
        let rise = self.rise.load(Ordering::Relaxed);
        EdgeState {
            index: self.index.load(Ordering::Relaxed),
            rise: if rise == NO_RISE { None } else { Some(rise as u16) },
            status: CaptureStatus::from_u8(self.status.load(Ordering::Acquire)),
        }
    }

    fn store_state(&self, state: EdgeState) {
        self.index.store(state.index, Ordering::Relaxed);
        self.rise.store(state.rise.map_or(NO_RISE, u32::from), Ordering::Relaxed);
        // Status last, so a reader seeing `Ready` also sees every sample.
        self.status.store(state.status.as_u8(), Ordering::Release);
    }
}

impl<const B: usize> Default for PulseCaptureStore<B> {
    fn default() -> Self {
        Self::new()
    }
}

/// Edge-interrupt handle. Fixed, bounded work per call.
pub struct CaptureWriter<'a, const B: usize> {
    store: &'a PulseCaptureStore<B>,
}

impl<'a, const B: usize> CaptureWriter<'a, B> {
    /// Records one edge of the data line with the counter value read in the
    /// interrupt.
    #[inline]
    pub fn on_edge(&mut self, edge: Edge, snapshot: u16) {
        let step = on_edge(self.store.load_state(), edge, snapshot, B);
        if let Some((slot, width)) = step.sample {
            if let Some(cell) = self.store.samples.get(slot) {
                cell.store(width, Ordering::Relaxed);
            }
        }
        self.store.store_state(step.state);
    }
}

/// Main-loop handle.
pub struct CaptureReader<'a, const B: usize> {
    store: &'a PulseCaptureStore<B>,
}

impl<'a, const B: usize> CaptureReader<'a, B> {
    pub fn status(&self) -> CaptureStatus {
        CaptureStatus::from_u8(self.store.status.load(Ordering::Acquire))
    }

    /// Samples recorded since the last reset.
    pub fn captured(&self) -> usize {
        self.store.index.load(Ordering::Relaxed)
    }

    /// Clears the store for the next acquisition. Only valid while the edge
    /// interrupt is disarmed.
    pub fn reset(&mut self) {
        for cell in self.store.samples.iter() {
            cell.store(0, Ordering::Relaxed);
        }
        self.store.store_state(EdgeState::RESET);
    }

    /// Flags an aborted acquisition. Only valid while the edge interrupt is
    /// disarmed.
    pub fn mark_error(&mut self) {
        let state = EdgeState { status: CaptureStatus::Error, ..self.store.load_state() };
        self.store.store_state(state);
    }

    /// Copies the samples out once the capture is complete.
    pub fn samples(&self) -> Option<[u16; B]> {
        if self.status() != CaptureStatus::Ready {
            return None;
        }
        let mut out = [0u16; B];
        for (dst, cell) in out.iter_mut().zip(self.store.samples.iter()) {
            *dst = cell.load(Ordering::Relaxed);
        }
        Some(out)
    }
}
