//! Greedy rectangle merging of coplanar faces
//!
//! Cells of one slice (same block, direction and depth) are swept in
//! increasing (u, v) order. From each unmerged seed the rectangle grows along
//! u while the next cell exists and is unmerged, then along v while the whole
//! row of `width` cells above it is present and unmerged. The result is
//! deterministic but not globally minimal in quad count.

use std::collections::HashSet;

/// Merged rectangle in slice (u, v) space
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub u: i32,
    pub v: i32,
    pub width: i32,
    pub height: i32,
}

/// Merge a slice's face cells into rectangles
///
/// Duplicate cells are ignored. Every input cell is covered by exactly one
/// output rectangle.
pub fn merge_slice(cells: &[(i32, i32)]) -> Vec<Rect> {
    let present: HashSet<(i32, i32)> = cells.iter().copied().collect();
    let mut order: Vec<(i32, i32)> = present.iter().copied().collect();
    order.sort_unstable();

    let mut merged: HashSet<(i32, i32)> = HashSet::with_capacity(present.len());
    let mut rects = Vec::new();

    let free = |cell: (i32, i32), merged: &HashSet<(i32, i32)>| {
        present.contains(&cell) && !merged.contains(&cell)
    };

    for (u, v) in order {
        if merged.contains(&(u, v)) {
            continue;
        }

        let mut width = 1;
        while free((u + width, v), &merged) {
            width += 1;
        }

        let mut height = 1;
        while (0..width).all(|du| free((u + du, v + height), &merged)) {
            height += 1;
        }

        for dv in 0..height {
            for du in 0..width {
                merged.insert((u + du, v + dv));
            }
        }

        rects.push(Rect { u, v, width, height });
    }

    rects
}

/// One rectangle per cell, for meshing without merging
pub fn unit_rects(cells: &[(i32, i32)]) -> Vec<Rect> {
    let mut seen = HashSet::with_capacity(cells.len());
    cells
        .iter()
        .filter(|c| seen.insert(**c))
        .map(|&(u, v)| Rect { u, v, width: 1, height: 1 })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(rects: &[Rect]) -> i32 {
        rects.iter().map(|r| r.width * r.height).sum()
    }

    fn covered(rects: &[Rect]) -> HashSet<(i32, i32)> {
        let mut out = HashSet::new();
        for r in rects {
            for du in 0..r.width {
                for dv in 0..r.height {
                    assert!(out.insert((r.u + du, r.v + dv)), "overlapping rectangles");
                }
            }
        }
        out
    }

    #[test]
    fn test_full_square_merges_to_one() {
        let cells: Vec<_> = (0..4).flat_map(|u| (0..4).map(move |v| (u, v))).collect();
        let rects = merge_slice(&cells);
        assert_eq!(rects, vec![Rect { u: 0, v: 0, width: 4, height: 4 }]);
    }

    #[test]
    fn test_l_shape() {
        // ##.
        // ###   (v grows downward in this sketch)
        let cells = vec![(0, 0), (1, 0), (0, 1), (1, 1), (2, 1)];
        let rects = merge_slice(&cells);
        assert_eq!(area(&rects), 5);
        assert_eq!(covered(&rects), cells.iter().copied().collect::<HashSet<_>>());
        // Seed (0,0) grows to width 2 then takes row v=1 at width 2; (2,1) remains
        assert_eq!(rects[0], Rect { u: 0, v: 0, width: 2, height: 2 });
        assert_eq!(rects[1], Rect { u: 2, v: 1, width: 1, height: 1 });
    }

    #[test]
    fn test_height_stops_at_gap_in_row() {
        let cells = vec![(0, 0), (1, 0), (2, 0), (0, 1), (2, 1)];
        let rects = merge_slice(&cells);
        assert_eq!(rects[0], Rect { u: 0, v: 0, width: 3, height: 1 });
        assert_eq!(area(&rects), 5);
    }

    #[test]
    fn test_area_conserved_on_scattered_cells() {
        let cells: Vec<_> = (0..16)
            .flat_map(|u| (0..16).map(move |v| (u, v)))
            .filter(|(u, v)| (u * 7 + v * 3) % 5 != 0)
            .collect();
        let rects = merge_slice(&cells);
        assert_eq!(area(&rects) as usize, cells.len());
        assert_eq!(covered(&rects), cells.iter().copied().collect::<HashSet<_>>());
        assert!(rects.len() < cells.len());
    }

    #[test]
    fn test_duplicates_ignored() {
        let cells = vec![(0, 0), (0, 0), (1, 0)];
        assert_eq!(area(&merge_slice(&cells)), 2);
        assert_eq!(unit_rects(&cells).len(), 2);
    }

    #[test]
    fn test_empty() {
        assert!(merge_slice(&[]).is_empty());
    }
}
