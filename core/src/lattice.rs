//! Toroidal lattice indexing.
//!
//! Every cell is addressed by a linear index in `0..len()`. Axis 0 varies
//! fastest, so the coordinate of index `i` along axis `j` is `(i /
//! slice_size[j]) % dimension[j]`, where `slice_size[j]` is the product of
//! the extents of all lower axes. Neighbor lookups wrap around every axis.

use itertools::Itertools;
use num::{BigUint, One};
use std::convert::TryFrom;

use crate::error::{SimError, SimResult};

/// Shape of a periodic N-dimensional lattice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lattice {
    dimensions: Box<[usize]>,
    slice_sizes: Box<[usize]>,
    len: usize,
}

impl Lattice {
    /// Constructs a lattice with the given extent along each axis.
    pub fn new(dimensions: &[usize]) -> SimResult<Self> {
        if dimensions.is_empty() {
            return Err(SimError::NoDimensions);
        }
        if let Some(axis) = dimensions.iter().position(|&d| d == 0) {
            return Err(SimError::ZeroDimension { axis });
        }

        let mut slice_sizes = Vec::with_capacity(dimensions.len());
        let mut len = 1_usize;
        for &d in dimensions {
            slice_sizes.push(len);
            len = len
                .checked_mul(d)
                .ok_or_else(|| SimError::LatticeTooLarge(dimensions.to_vec()))?;
        }

        Ok(Self {
            dimensions: dimensions.into(),
            slice_sizes: slice_sizes.into_boxed_slice(),
            len,
        })
    }

    /// Returns the number of axes.
    #[inline]
    pub fn ndim(&self) -> usize {
        self.dimensions.len()
    }
    /// Returns the total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }
    /// Returns the extent along each axis.
    #[inline]
    pub fn dimensions(&self) -> &[usize] {
        &self.dimensions
    }
    /// Returns the stride of each axis in linear index space.
    #[inline]
    pub fn slice_sizes(&self) -> &[usize] {
        &self.slice_sizes
    }

    /// Returns the coordinate of cell `i` along `axis`.
    #[inline]
    pub fn coordinate(&self, i: usize, axis: usize) -> usize {
        (i / self.slice_sizes[axis]) % self.dimensions[axis]
    }

    /// Returns the coordinates of cell `i` along every axis.
    pub fn coords(&self, i: usize) -> Vec<usize> {
        (0..self.ndim()).map(|axis| self.coordinate(i, axis)).collect()
    }

    /// Returns the linear index of the cell at the given coordinates. Each
    /// coordinate is wrapped into range first.
    ///
    /// # Panics
    ///
    /// This function panics if `coords` does not have one entry per axis.
    pub fn index_of(&self, coords: &[usize]) -> usize {
        assert_eq!(self.ndim(), coords.len(), "Wrong number of coordinates");
        coords
            .iter()
            .zip(self.dimensions.iter().zip(&*self.slice_sizes))
            .map(|(&c, (&d, &s))| (c % d) * s)
            .sum()
    }

    /// Returns the linear index of the cell displaced from cell `i` by
    /// `offsets`, wrapping around the edges of the lattice.
    #[inline]
    pub fn neighbor_index(&self, i: usize, offsets: &[isize]) -> usize {
        debug_assert_eq!(self.ndim(), offsets.len());
        self.dimensions
            .iter()
            .zip(&*self.slice_sizes)
            .zip(offsets)
            .map(|((&d, &s), &offset)| wrapping_offset((i / s) % d, offset, d) * s)
            .sum()
    }

    /// Returns whether cell `i` is alive in `state`.
    #[inline]
    pub fn cell(&self, state: &BigUint, i: usize) -> bool {
        i < self.len && state.bit(i as u64)
    }

    /// Returns the number of live cells in `state`, ignoring any bits beyond
    /// the end of the lattice.
    pub fn population(&self, state: &BigUint) -> u64 {
        if state.bits() <= self.len as u64 {
            state.count_ones()
        } else {
            (state & &self.mask()).count_ones()
        }
    }

    /// Returns the state with every cell alive.
    pub fn mask(&self) -> BigUint {
        (BigUint::one() << self.len) - 1_u32
    }
}

/// Adds a signed offset to a coordinate modulo `d`, without leaving unsigned
/// arithmetic.
#[inline]
fn wrapping_offset(coord: usize, offset: isize, d: usize) -> usize {
    let delta = offset.unsigned_abs() % d;
    if offset < 0 {
        if delta <= coord {
            coord - delta
        } else {
            d - (delta - coord)
        }
    } else {
        let room = d - coord;
        if delta < room {
            coord + delta
        } else {
            delta - room
        }
    }
}

/// Moore neighborhood of some radius, as a fixed list of offset vectors.
///
/// Offsets are enumerated with axis 0 varying slowest and each axis running
/// from `-radius` to `+radius`. The position of an offset in this order is the
/// bit it occupies in a neighborhood pattern index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighborhood {
    ndim: usize,
    radius: usize,
    offsets: Box<[isize]>,
}

impl Neighborhood {
    /// Constructs the radius-`radius` Moore neighborhood in `ndim`
    /// dimensions.
    pub fn new(ndim: usize, radius: usize) -> SimResult<Self> {
        if ndim == 0 {
            return Err(SimError::NoDimensions);
        }
        let too_large = || SimError::NeighborhoodTooLarge { ndim, radius };
        let r = isize::try_from(radius).map_err(|_| too_large())?;
        let width = radius
            .checked_mul(2)
            .and_then(|w| w.checked_add(1))
            .ok_or_else(too_large)?;
        let len = u32::try_from(ndim)
            .ok()
            .and_then(|n| width.checked_pow(n))
            .ok_or_else(too_large)?;
        len.checked_mul(ndim).ok_or_else(too_large)?;

        let offsets = (0..ndim)
            .map(|_| -r..=r)
            .multi_cartesian_product()
            .flatten()
            .collect_vec()
            .into_boxed_slice();
        debug_assert_eq!(len * ndim, offsets.len());

        Ok(Self {
            ndim,
            radius,
            offsets,
        })
    }

    /// Returns the number of axes.
    #[inline]
    pub fn ndim(&self) -> usize {
        self.ndim
    }
    /// Returns the radius along each axis.
    #[inline]
    pub fn radius(&self) -> usize {
        self.radius
    }
    /// Returns the number of cells in the neighborhood, including the center.
    #[inline]
    pub fn len(&self) -> usize {
        self.offsets.len() / self.ndim
    }
    /// Returns the number of cells in the neighborhood, excluding the center.
    #[inline]
    pub fn neighbor_count(&self) -> usize {
        self.len() - 1
    }
    /// Returns the position of the all-zero offset in the enumeration.
    #[inline]
    pub fn center(&self) -> usize {
        (self.len() - 1) / 2
    }

    /// Returns an iterator over all offset vectors, in enumeration order.
    #[inline]
    pub fn offsets(&self) -> std::slice::ChunksExact<'_, isize> {
        self.offsets.chunks_exact(self.ndim)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    /// Returns a strategy producing dimensions, a valid index into them, and
    /// an offset vector.
    fn lattice_index_offsets() -> impl Strategy<Value = (Vec<usize>, usize, Vec<isize>)> {
        prop::collection::vec(1..7_usize, 1..5).prop_flat_map(|dims| {
            let len: usize = dims.iter().product();
            let ndim = dims.len();
            (
                Just(dims),
                0..len,
                prop::collection::vec(-9..=9_isize, ndim),
            )
        })
    }

    #[test]
    fn test_lattice_new() {
        let lattice = Lattice::new(&[4, 3, 2]).unwrap();
        assert_eq!(3, lattice.ndim());
        assert_eq!(24, lattice.len());
        assert_eq!(&[1, 4, 12], lattice.slice_sizes());

        assert_eq!(Err(SimError::NoDimensions), Lattice::new(&[]));
        assert_eq!(
            Err(SimError::ZeroDimension { axis: 1 }),
            Lattice::new(&[4, 0, 2]),
        );
        assert_eq!(
            Err(SimError::LatticeTooLarge(vec![usize::MAX, 2])),
            Lattice::new(&[usize::MAX, 2]),
        );
    }

    #[test]
    fn test_coordinate() {
        let lattice = Lattice::new(&[4, 4, 4]).unwrap();
        assert_eq!(vec![0, 0, 0], lattice.coords(0));
        assert_eq!(vec![3, 3, 3], lattice.coords(63));
        assert_eq!(vec![1, 0, 0], lattice.coords(1));
        assert_eq!(vec![0, 1, 0], lattice.coords(4));
        assert_eq!(vec![0, 0, 1], lattice.coords(16));
        assert_eq!(2, lattice.coordinate(38, 2));
    }

    #[test]
    fn test_neighbor_index_wraps() {
        let lattice = Lattice::new(&[8]).unwrap();
        assert_eq!(7, lattice.neighbor_index(0, &[-1]));
        assert_eq!(0, lattice.neighbor_index(7, &[1]));
        assert_eq!(3, lattice.neighbor_index(3, &[16]));
        assert_eq!(3, lattice.neighbor_index(3, &[-16]));

        let lattice = Lattice::new(&[5, 3]).unwrap();
        // (0, 0) + (-1, -1) = (4, 2)
        assert_eq!(4 + 2 * 5, lattice.neighbor_index(0, &[-1, -1]));
        // (4, 2) + (1, 1) = (0, 0)
        assert_eq!(0, lattice.neighbor_index(14, &[1, 1]));
    }

    #[test]
    fn test_degenerate_axis() {
        // Every offset along a size-1 axis lands on the same cell.
        let lattice = Lattice::new(&[1, 3]).unwrap();
        for offset in -3..=3 {
            assert_eq!(1, lattice.neighbor_index(1, &[offset, 0]));
        }
    }

    #[test]
    fn test_population() {
        let lattice = Lattice::new(&[3, 2]).unwrap();
        assert_eq!(0, lattice.population(&BigUint::from(0_u32)));
        assert_eq!(3, lattice.population(&BigUint::from(0b101100_u32)));
        // Bits past the end of the lattice are not cells.
        assert_eq!(1, lattice.population(&BigUint::from(0b11000001_u32)));
        assert_eq!(BigUint::from(0b111111_u32), lattice.mask());
        assert!(lattice.cell(&BigUint::from(0b100_u32), 2));
        assert!(!lattice.cell(&BigUint::from(0b1000000_u32), 6));
    }

    #[test]
    fn test_neighborhood_order() {
        let nbhd = Neighborhood::new(2, 1).unwrap();
        assert_eq!(9, nbhd.len());
        assert_eq!(8, nbhd.neighbor_count());
        assert_eq!(
            vec![
                vec![-1, -1],
                vec![-1, 0],
                vec![-1, 1],
                vec![0, -1],
                vec![0, 0],
                vec![0, 1],
                vec![1, -1],
                vec![1, 0],
                vec![1, 1],
            ],
            nbhd.offsets().map(<[isize]>::to_vec).collect_vec(),
        );
        assert_eq!(4, nbhd.center());

        let nbhd = Neighborhood::new(3, 0).unwrap();
        assert_eq!(1, nbhd.len());
        assert_eq!(0, nbhd.center());
        assert_eq!(
            Err(SimError::NeighborhoodTooLarge {
                ndim: 100,
                radius: 1
            }),
            Neighborhood::new(100, 1),
        );
    }

    proptest! {
        #[test]
        fn test_zero_offset_is_identity((dims, i, _) in lattice_index_offsets()) {
            let lattice = Lattice::new(&dims).unwrap();
            let zero = vec![0; dims.len()];
            prop_assert_eq!(i, lattice.neighbor_index(i, &zero));
        }

        #[test]
        fn test_neighbor_in_range_and_invertible((dims, i, offsets) in lattice_index_offsets()) {
            let lattice = Lattice::new(&dims).unwrap();
            let neighbor = lattice.neighbor_index(i, &offsets);
            prop_assert!(neighbor < lattice.len());
            let back = offsets.iter().map(|&o| -o).collect_vec();
            prop_assert_eq!(i, lattice.neighbor_index(neighbor, &back));
        }

        #[test]
        fn test_coords_round_trip((dims, i, _) in lattice_index_offsets()) {
            let lattice = Lattice::new(&dims).unwrap();
            prop_assert_eq!(i, lattice.index_of(&lattice.coords(i)));
        }

        #[test]
        fn test_center_is_zero_offset(ndim in 1..4_usize, radius in 0..3_usize) {
            let nbhd = Neighborhood::new(ndim, radius).unwrap();
            let center = nbhd.offsets().nth(nbhd.center()).unwrap();
            prop_assert!(center.iter().all(|&o| o == 0));
        }
    }
}
