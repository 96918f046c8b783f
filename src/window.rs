//! Accumulation of host blocks of arbitrary length into a fixed-size
//! analysis window.

use crate::utils::buffer::copy_scaled;

/// What happens to the samples of a block that crosses the window boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum OverflowPolicy {
    /// Samples past the boundary are dropped; the cursor still wraps by the
    /// number of samples received, so the head of the next window keeps the
    /// previous window's content there.
    #[default]
    Truncate,
    /// Samples past the boundary become the head of the next window.
    Carry,
}

/// A fixed-capacity sample window filled by successive [absorb](AnalysisWindow::absorb) calls.
#[derive(Debug, Clone)]
pub struct AnalysisWindow {
    samples: Box<[f32]>,
    carry: Box<[f32]>,
    pending_carry: usize,
    write_position: usize,
    policy: OverflowPolicy,
}

impl AnalysisWindow {
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Self {
        let mut window = AnalysisWindow {
            samples: Box::default(),
            carry: Box::default(),
            pending_carry: 0,
            write_position: 0,
            policy,
        };
        window.configure(capacity);
        window
    }

    /// Reallocate the window for `capacity` samples and rewind the cursor.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn configure(&mut self, capacity: usize) {
        assert!(capacity > 0, "Analysis window capacity must be greater than 0");
        self.samples = vec![0.0; capacity].into_boxed_slice();
        self.carry = match self.policy {
            OverflowPolicy::Truncate => Box::default(),
            OverflowPolicy::Carry => vec![0.0; capacity].into_boxed_slice(),
        };
        self.reset();
    }

    pub fn reset(&mut self) {
        self.write_position = 0;
        self.pending_carry = 0;
    }

    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    pub fn write_position(&self) -> usize {
        self.write_position
    }

    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    /// The window content. Complete right after `absorb` returned `true`.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Copy `input`, multiplied by `sensitivity`, into the window at the
    /// cursor and advance it. Returns `true` when the window filled up, in
    /// which case the cursor wraps by `capacity`.
    ///
    /// # Panics
    ///
    /// Panics if `input` is longer than the capacity.
    pub fn absorb(&mut self, input: &[f32], sensitivity: f32) -> bool {
        let capacity = self.capacity();
        assert!(
            input.len() <= capacity,
            "Block of {} samples exceeds the analysis window capacity of {}",
            input.len(),
            capacity
        );

        if self.pending_carry > 0 {
            let pending = self.pending_carry;
            self.samples[..pending].copy_from_slice(&self.carry[..pending]);
            self.pending_carry = 0;
        }

        let start = self.write_position;
        let (head, tail) = input.split_at(input.len().min(capacity - start));
        copy_scaled(head, &mut self.samples[start..start + head.len()], sensitivity);

        self.write_position += input.len();
        if self.write_position < capacity {
            return false;
        }

        self.write_position -= capacity;
        if self.policy == OverflowPolicy::Carry && !tail.is_empty() {
            copy_scaled(tail, &mut self.carry[..tail.len()], sensitivity);
            self.pending_carry = tail.len();
        }
        true
    }
}
