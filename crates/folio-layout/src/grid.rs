//! Row packing onto a uniform column grid.
//!
//! Rows of different lengths in one gallery share a grid whose column count
//! is the least common multiple of the row lengths, so every item spans a
//! whole number of columns and every row spans the full width.

use folio_core::{MediaItem, MediaRow};

/// One display row of a packed run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Row<'a> {
    /// Index of the first item within the packed run.
    pub start: usize,
    pub items: &'a [MediaItem],
    /// Columns spanned by each item in this row.
    pub column_span: usize,
}

impl Row<'_> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Packed rows sharing one column grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid<'a> {
    pub columns: usize,
    pub rows: Vec<Row<'a>>,
}

pub fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

/// Least common multiple; `lcm(0, n) == n`.
pub fn lcm(a: usize, b: usize) -> usize {
    if a == 0 || b == 0 {
        return a.max(b);
    }
    (a / gcd(a, b)).saturating_mul(b)
}

/// Split `run` into rows at `breaks` and align them on one grid.
///
/// Each break index starts a new row. Breaks at 0, past the end of the run,
/// or repeated are ignored, and their order does not matter.
pub fn pack<'a>(run: &'a [MediaItem], breaks: &[usize]) -> Grid<'a> {
    let mut starts: Vec<usize> = breaks
        .iter()
        .copied()
        .filter(|&b| b > 0 && b < run.len())
        .collect();
    starts.sort_unstable();
    starts.dedup();

    let mut slices = Vec::with_capacity(starts.len() + 1);
    let mut from = 0;
    for start in starts.into_iter().chain(std::iter::once(run.len())) {
        if start > from {
            slices.push((from, &run[from..start]));
        }
        from = start;
    }
    align(slices)
}

/// Align consecutive media rows on one grid.
pub fn pack_rows<'a>(rows: &[&'a MediaRow]) -> Grid<'a> {
    let mut start = 0;
    let slices = rows
        .iter()
        .copied()
        .filter(|row| !row.is_empty())
        .map(|row| {
            let slice = (start, &row.items[..]);
            start += row.len();
            slice
        })
        .collect();
    align(slices)
}

fn align(slices: Vec<(usize, &[MediaItem])>) -> Grid<'_> {
    let columns = slices.iter().fold(0, |acc, (_, items)| lcm(acc, items.len()));
    let rows = slices
        .into_iter()
        .map(|(start, items)| Row {
            start,
            items,
            column_span: columns / items.len(),
        })
        .collect();
    Grid { columns, rows }
}
