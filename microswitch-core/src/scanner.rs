//! Matrix scanning and edge detection.
//!
//! The converter reads one column at a time through an address selector:
//! the column number goes out on the address lines, the read strobe is pulled
//! low, and after a short settle time the eight row inputs are sampled as one
//! byte. Rows are active low, so a set bit means "released".
//!
//! A column's fresh byte is XORed against the last stable byte for that
//! column; every changed bit becomes a key-down or key-up [`Edge`].

use log::trace;

use crate::{COLUMNS, ROWS};

/// Row byte of a column with every key released.
pub const RELEASED: u8 = 0xFF;

/// Hardware access needed to sample the matrix.
pub trait MatrixPort {
    /// Put `column` on the address lines.
    fn select_column(&mut self, column: u8);
    /// Drive the read strobe low.
    fn assert_strobe(&mut self);
    /// Return the read strobe to its idle high level.
    fn release_strobe(&mut self);
    /// Sample the row inputs. Bit n is row n, low when pressed.
    fn read_row_byte(&mut self) -> u8;
    /// Busy-wait for the row inputs to settle after strobing (~5us).
    fn settle(&mut self);
}

/// A change of state of one matrix position.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Edge {
    Down(usize),
    Up(usize),
}

impl Edge {
    pub fn position(self) -> usize {
        match self {
            Edge::Down(p) | Edge::Up(p) => p,
        }
    }
}

/// Last stable row byte of every column.
pub struct Scanner {
    stable: [u8; COLUMNS],
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner {
    /// All columns start out released, so the first real press is always
    /// seen as a down edge.
    pub const fn new() -> Self {
        Self {
            stable: [RELEASED; COLUMNS],
        }
    }

    /// Strobe one column and return its row byte.
    pub fn read_column<P: MatrixPort>(port: &mut P, column: u8) -> u8 {
        port.select_column(column);
        port.assert_strobe();
        port.settle();
        let keys = port.read_row_byte();
        port.release_strobe();
        keys
    }

    /// Scan the whole matrix, calling `on_edge` for every change in column
    /// order, then row order within a column.
    pub fn scan<P: MatrixPort>(&mut self, port: &mut P, mut on_edge: impl FnMut(Edge)) {
        for column in 0..COLUMNS {
            let keys = Self::read_column(port, column as u8);
            self.update_column(column, keys, &mut on_edge);
        }
    }

    /// Compare a freshly sampled byte with the stable one and emit edges.
    /// `column` must be below [`COLUMNS`].
    pub(crate) fn update_column(&mut self, column: usize, keys: u8, mut on_edge: impl FnMut(Edge)) {
        let change = keys ^ self.stable[column];
        if change == 0 {
            return;
        }
        self.stable[column] = keys;

        for row in 0..ROWS {
            let bit = 1 << row;
            if change & bit == 0 {
                continue;
            }
            let position = column * ROWS + row;
            let edge = if keys & bit != 0 {
                Edge::Up(position)
            } else {
                Edge::Down(position)
            };
            trace!("column {} row {}: {:?}", column, row, edge);
            on_edge(edge);
        }
    }

    /// Stable row byte of `column`.
    pub fn stable(&self, column: usize) -> u8 {
        self.stable[column]
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::vec::Vec;

    use super::*;

    /// Records the strobe protocol and answers reads from a fixed byte per
    /// column.
    struct FakePort {
        columns: [u8; COLUMNS],
        selected: u8,
        strobe_low: bool,
        log: Vec<&'static str>,
    }

    impl FakePort {
        fn new() -> Self {
            Self {
                columns: [RELEASED; COLUMNS],
                selected: 0,
                strobe_low: false,
                log: Vec::new(),
            }
        }
    }

    impl MatrixPort for FakePort {
        fn select_column(&mut self, column: u8) {
            self.selected = column;
            self.log.push("select");
        }

        fn assert_strobe(&mut self) {
            self.strobe_low = true;
            self.log.push("strobe low");
        }

        fn release_strobe(&mut self) {
            self.strobe_low = false;
            self.log.push("strobe high");
        }

        fn read_row_byte(&mut self) -> u8 {
            assert!(self.strobe_low, "read without strobe");
            self.log.push("read");
            self.columns[self.selected as usize]
        }

        fn settle(&mut self) {
            self.log.push("settle");
        }
    }

    fn collect(scanner: &mut Scanner, port: &mut FakePort) -> Vec<Edge> {
        let mut edges = Vec::new();
        scanner.scan(port, |e| edges.push(e));
        edges
    }

    #[test]
    fn test_read_column_strobe_sequence() {
        let mut port = FakePort::new();
        port.columns[3] = 0xFE;
        assert_eq!(Scanner::read_column(&mut port, 3), 0xFE);
        assert_eq!(
            port.log,
            ["select", "strobe low", "settle", "read", "strobe high"]
        );
        assert!(!port.strobe_low);
    }

    #[test]
    fn test_idle_matrix_produces_nothing() {
        let mut scanner = Scanner::new();
        let mut port = FakePort::new();
        assert!(collect(&mut scanner, &mut port).is_empty());
        assert!(collect(&mut scanner, &mut port).is_empty());
    }

    #[test]
    fn test_press_and_release() {
        let mut scanner = Scanner::new();
        let mut port = FakePort::new();

        port.columns[1] = !(1 << 5);
        assert_eq!(collect(&mut scanner, &mut port), [Edge::Down(13)]);
        assert_eq!(scanner.stable(1), 0xDF);

        // Held: no repeat.
        assert!(collect(&mut scanner, &mut port).is_empty());

        port.columns[1] = RELEASED;
        assert_eq!(collect(&mut scanner, &mut port), [Edge::Up(13)]);
        assert_eq!(scanner.stable(1), RELEASED);
    }

    #[test]
    fn test_edges_in_column_then_row_order() {
        let mut scanner = Scanner::new();
        let mut port = FakePort::new();
        port.columns[0] = 0b0111_1110;
        port.columns[15] = 0b1111_1101;

        assert_eq!(
            collect(&mut scanner, &mut port),
            [Edge::Down(0), Edge::Down(7), Edge::Down(121)]
        );

        port.columns[0] = 0b1111_1110;
        port.columns[15] = RELEASED;
        assert_eq!(
            collect(&mut scanner, &mut port),
            [Edge::Up(7), Edge::Up(121)]
        );
    }

    #[test]
    fn test_unchanged_column_keeps_stable_byte() {
        let mut scanner = Scanner::new();
        let mut called = false;
        scanner.update_column(4, RELEASED, |_| called = true);
        assert!(!called);
        assert_eq!(scanner.stable(4), RELEASED);
    }

    #[test]
    fn test_simultaneous_down_and_up_in_one_column() {
        let mut scanner = Scanner::new();
        let mut edges = Vec::new();
        scanner.update_column(2, 0b1111_1011, |e| edges.push(e));
        scanner.update_column(2, 0b1111_0111, |e| edges.push(e));
        assert_eq!(edges, [Edge::Down(18), Edge::Up(18), Edge::Down(19)]);
        assert_eq!(Edge::Down(19).position(), 19);
    }
}
