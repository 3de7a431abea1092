//! Cooperative reductions over one workgroup's shared scratch array.
//!
//! Every reduction here follows the same protocol and must be called from all
//! lanes of the workgroup, with identical arguments except for `value`:
//!
//! 1. each lane publishes its partial result into `scratch[lane]`,
//! 2. after a barrier, the lanes fold the array in `log2(N)` rounds, halving
//!    the number of active lanes each round,
//! 3. each lane reads the combined result from `scratch[0]`, and one more
//!    barrier retires the array so that the next reduction can reuse it.
//!
//! The barriers sit outside of all conditionals, keeping control flow uniform
//! across the workgroup; `N` must be a power of two and `lane` must be below
//! `N`.

use crate::prelude::IndexUnchecked;

/// Blocks until all lanes of the workgroup have arrived and their writes to
/// workgroup memory have become visible to each other.
pub fn workgroup_sync() {
    unsafe {
        spirv_std::arch::workgroup_memory_barrier_with_group_sync();
    }
}

pub fn workgroup_sum<const N: usize>(
    scratch: &mut [f32; N],
    lane: usize,
    value: f32,
) -> f32 {
    unsafe {
        *scratch.index_unchecked_mut(lane) = value;
    }

    workgroup_sync();

    let mut stride = N / 2;

    while stride > 0 {
        if lane < stride {
            unsafe {
                let other = *scratch.index_unchecked(lane + stride);

                *scratch.index_unchecked_mut(lane) += other;
            }
        }

        workgroup_sync();

        stride /= 2;
    }

    let result = scratch[0];

    workgroup_sync();

    result
}

pub fn workgroup_min<const N: usize>(
    scratch: &mut [f32; N],
    lane: usize,
    value: f32,
) -> f32 {
    unsafe {
        *scratch.index_unchecked_mut(lane) = value;
    }

    workgroup_sync();

    let mut stride = N / 2;

    while stride > 0 {
        if lane < stride {
            unsafe {
                let other = *scratch.index_unchecked(lane + stride);
                let entry = scratch.index_unchecked_mut(lane);

                *entry = entry.min(other);
            }
        }

        workgroup_sync();

        stride /= 2;
    }

    let result = scratch[0];

    workgroup_sync();

    result
}

pub fn workgroup_max<const N: usize>(
    scratch: &mut [f32; N],
    lane: usize,
    value: f32,
) -> f32 {
    unsafe {
        *scratch.index_unchecked_mut(lane) = value;
    }

    workgroup_sync();

    let mut stride = N / 2;

    while stride > 0 {
        if lane < stride {
            unsafe {
                let other = *scratch.index_unchecked(lane + stride);
                let entry = scratch.index_unchecked_mut(lane);

                *entry = entry.max(other);
            }
        }

        workgroup_sync();

        stride /= 2;
    }

    let result = scratch[0];

    workgroup_sync();

    result
}
