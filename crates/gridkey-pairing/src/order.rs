//! Base traversal orders over the 8×8 index grid.

use gridkey_error::{GridKeyError, Result};
use gridkey_types::{CELL_COUNT, GRID_SIDE};

/// 3-bit reflected Gray code, applied independently to rows and columns.
pub const GRAY_SEQUENCE: [usize; GRID_SIDE] = [0, 1, 3, 2, 6, 7, 5, 4];

/// A named way of walking every cell exactly once.
#[derive(Debug, Clone, Copy)]
pub struct TraversalOrder {
    pub name: &'static str,
    pub build: fn() -> Vec<usize>,
}

pub const BASE_ORDERS: &[TraversalOrder] = &[
    TraversalOrder {
        name: "row_major",
        build: row_major,
    },
    TraversalOrder {
        name: "column_major",
        build: column_major,
    },
    TraversalOrder {
        name: "snake_rows",
        build: snake_rows,
    },
    TraversalOrder {
        name: "snake_cols",
        build: snake_cols,
    },
    TraversalOrder {
        name: "diagonal",
        build: diagonal,
    },
    TraversalOrder {
        name: "diagonal_snake",
        build: diagonal_snake,
    },
    TraversalOrder {
        name: "spiral",
        build: spiral,
    },
    TraversalOrder {
        name: "gray_code",
        build: gray_code,
    },
];

/// Build and validate every base order.
pub fn base_orders() -> Result<Vec<(&'static str, Vec<usize>)>> {
    BASE_ORDERS
        .iter()
        .map(|def| {
            let order = (def.build)();
            validate_order(def.name, &order)?;
            Ok((def.name, order))
        })
        .collect()
}

/// An order must visit each of the 64 cells exactly once.
pub fn validate_order(name: &str, order: &[usize]) -> Result<()> {
    let invalid = |detail: String| GridKeyError::InvalidTraversalOrder {
        name: name.to_owned(),
        detail,
    };
    if order.len() != CELL_COUNT {
        return Err(invalid(format!(
            "has length {}, expected {CELL_COUNT}",
            order.len()
        )));
    }
    let mut seen = [false; CELL_COUNT];
    for &index in order {
        let slot = seen
            .get_mut(index)
            .ok_or_else(|| invalid(format!("index {index} is outside the grid")))?;
        if *slot {
            return Err(invalid(format!("index {index} is visited twice")));
        }
        *slot = true;
    }
    Ok(())
}

const fn cell(row: usize, col: usize) -> usize {
    row * GRID_SIDE + col
}

fn row_major() -> Vec<usize> {
    (0..CELL_COUNT).collect()
}

fn column_major() -> Vec<usize> {
    (0..GRID_SIDE)
        .flat_map(|col| (0..GRID_SIDE).map(move |row| cell(row, col)))
        .collect()
}

fn snake_rows() -> Vec<usize> {
    let mut order = Vec::with_capacity(CELL_COUNT);
    for row in 0..GRID_SIDE {
        let cols: Vec<usize> = (0..GRID_SIDE).collect();
        if row % 2 == 1 {
            order.extend(cols.into_iter().rev().map(|col| cell(row, col)));
        } else {
            order.extend(cols.into_iter().map(|col| cell(row, col)));
        }
    }
    order
}

fn snake_cols() -> Vec<usize> {
    let mut order = Vec::with_capacity(CELL_COUNT);
    for col in 0..GRID_SIDE {
        let rows: Vec<usize> = (0..GRID_SIDE).collect();
        if col % 2 == 1 {
            order.extend(rows.into_iter().rev().map(|row| cell(row, col)));
        } else {
            order.extend(rows.into_iter().map(|row| cell(row, col)));
        }
    }
    order
}

/// Cells on anti-diagonal `sum` (row + col), top row first.
fn anti_diagonal(sum: usize) -> Vec<usize> {
    (0..GRID_SIDE)
        .filter(|&row| row <= sum && sum - row < GRID_SIDE)
        .map(|row| cell(row, sum - row))
        .collect()
}

fn diagonal() -> Vec<usize> {
    (0..2 * GRID_SIDE - 1).flat_map(anti_diagonal).collect()
}

fn diagonal_snake() -> Vec<usize> {
    (0..2 * GRID_SIDE - 1)
        .flat_map(|sum| {
            let mut line = anti_diagonal(sum);
            if sum % 2 == 1 {
                line.reverse();
            }
            line
        })
        .collect()
}

/// Clockwise spiral starting at the top-left corner.
fn spiral() -> Vec<usize> {
    let mut order = Vec::with_capacity(CELL_COUNT);
    let (mut top, mut bottom) = (0, GRID_SIDE - 1);
    let (mut left, mut right) = (0, GRID_SIDE - 1);

    while top <= bottom && left <= right {
        order.extend((left..=right).map(|col| cell(top, col)));
        order.extend((top + 1..=bottom).map(|row| cell(row, right)));
        if top < bottom {
            order.extend((left..right).rev().map(|col| cell(bottom, col)));
        }
        if left < right {
            order.extend((top + 1..bottom).rev().map(|row| cell(row, left)));
        }
        if bottom == 0 || right == 0 {
            break;
        }
        top += 1;
        left += 1;
        bottom -= 1;
        right -= 1;
    }
    order
}

fn gray_code() -> Vec<usize> {
    GRAY_SEQUENCE
        .iter()
        .flat_map(|&row| GRAY_SEQUENCE.iter().map(move |&col| cell(row, col)))
        .collect()
}
