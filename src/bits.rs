// Axel '0vercl0k' Souchet - October 15 2026
//! Tiny helpers to pull bits and bitfields out of integers.
//!
//! # Examples
//!
//! ```
//! use fifo_dissector::Bits;
//! let hook = 0x0200_0034u32;
//! assert_eq!(hook.bits(0..=4), 0x14);
//! assert_eq!(hook.bit(5), 1);
//! ```
use std::ops::RangeInclusive;

pub trait Bits: Sized + Copy {
    /// Extract the bits in `range` (inclusive on both ends) and shift them
    /// down to bit 0.
    #[must_use]
    fn bits(&self, range: RangeInclusive<u32>) -> Self;

    /// Extract a single bit; the result is either 0 or 1.
    #[must_use]
    fn bit(&self, n: u32) -> Self {
        self.bits(n..=n)
    }
}

macro_rules! impl_bits {
    ($($ty:ident),*) => {
        $(impl Bits for $ty {
            fn bits(&self, range: RangeInclusive<u32>) -> Self {
                let (start, end) = range.into_inner();
                debug_assert!(start <= end && end < $ty::BITS);
                let width = end - start + 1;
                let mask = if width == $ty::BITS {
                    $ty::MAX
                } else {
                    (1 << width) - 1
                };

                (*self >> start) & mask
            }
        })*
    };
}

impl_bits!(u8, u16, u32, u64);
