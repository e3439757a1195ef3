//! Moore neighborhood on a torus.
//!
//! Every offset in `{-1, 0, 1} x {-1, 0, 1}` except `(0, 0)` is applied and
//! wrapped modulo `N` in both dimensions, so edge and corner cells see a full
//! set of eight neighbors. On very small grids the wrap makes the same cell
//! appear more than once (for `N = 1` the cell is its own neighbor eight
//! times); that multiplicity is part of the rule and is kept.

/// Number of cells in a Moore neighborhood.
pub const MOORE_NEIGHBORS: usize = 8;

/// Offsets visited, in row-major order. The order is stable across calls.
const OFFSETS: [(Offset, Offset); MOORE_NEIGHBORS] = [
    (Offset::Back, Offset::Back),
    (Offset::Back, Offset::Stay),
    (Offset::Back, Offset::Forward),
    (Offset::Stay, Offset::Back),
    (Offset::Stay, Offset::Forward),
    (Offset::Forward, Offset::Back),
    (Offset::Forward, Offset::Stay),
    (Offset::Forward, Offset::Forward),
];

/// A single-axis step of -1, 0 or +1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Offset {
    Back,
    Stay,
    Forward,
}

/// The eight Moore neighbors of `(row, col)` on an `N x N` torus.
///
/// With `size == 0` there is no grid to wrap on and every coordinate comes
/// back as `(0, 0)`; [`crate::grid::Grid`] never has a zero size.
pub fn moore_neighbors(row: usize, col: usize, size: usize) -> [(usize, usize); MOORE_NEIGHBORS] {
    OFFSETS.map(|(dr, dc)| (wrap(row, dr, size), wrap(col, dc, size)))
}

/// Apply `offset` to `coord` modulo `size`.
fn wrap(coord: usize, offset: Offset, size: usize) -> usize {
    let shifted = match offset {
        // coord + size - 1 keeps the intermediate value non-negative.
        Offset::Back => coord.checked_add(size).and_then(|v| v.checked_sub(1)),
        Offset::Stay => Some(coord),
        Offset::Forward => coord.checked_add(1),
    };
    shifted.and_then(|v| v.checked_rem(size)).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn corner_of_three_by_three_sees_every_other_cell_once() {
        let neighbors = moore_neighbors(0, 0, 3);
        let unique: BTreeSet<(usize, usize)> = neighbors.iter().copied().collect();
        assert_eq!(unique.len(), 8);
        for expected in [
            (2, 2),
            (2, 0),
            (2, 1),
            (0, 2),
            (1, 2),
            (0, 1),
            (1, 0),
            (1, 1),
        ] {
            assert!(unique.contains(&expected), "missing {expected:?}");
        }
        assert!(!unique.contains(&(0, 0)));
    }

    #[test]
    fn interior_cell_has_plain_neighbors() {
        let neighbors = moore_neighbors(2, 2, 5);
        assert_eq!(
            neighbors,
            [
                (1, 1),
                (1, 2),
                (1, 3),
                (2, 1),
                (2, 3),
                (3, 1),
                (3, 2),
                (3, 3)
            ]
        );
    }

    #[test]
    fn far_edge_wraps_to_zero() {
        let neighbors = moore_neighbors(4, 4, 5);
        assert!(neighbors.contains(&(0, 0)));
        assert!(neighbors.contains(&(3, 3)));
        assert!(neighbors.contains(&(4, 0)));
    }

    #[test]
    fn single_cell_grid_is_its_own_neighbor_eight_times() {
        assert_eq!(moore_neighbors(0, 0, 1), [(0, 0); MOORE_NEIGHBORS]);
    }

    #[test]
    fn two_by_two_repeats_neighbors() {
        let neighbors = moore_neighbors(0, 0, 2);
        let diagonal = neighbors.iter().filter(|&&n| n == (1, 1)).count();
        let below = neighbors.iter().filter(|&&n| n == (1, 0)).count();
        let right = neighbors.iter().filter(|&&n| n == (0, 1)).count();
        assert_eq!((diagonal, below, right), (4, 2, 2));
        assert!(!neighbors.contains(&(0, 0)));
    }

    #[test]
    fn order_is_stable() {
        assert_eq!(moore_neighbors(3, 1, 7), moore_neighbors(3, 1, 7));
    }
}
