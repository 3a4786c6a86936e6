/// A byte range of the DNA file scanned by a single worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// Offset of the first byte of the window
    pub offset: u64,
    /// Maximum number of bytes the window covers; the last window may be
    /// cut short by the end of the file
    pub len: usize,
}

/// Splits a file into overlapping windows so that no occurrence of a
/// sequence can fall between two of them.
///
/// Consecutive windows start `buffer_size - gene_len` bytes apart, so every
/// window shares its last `gene_len` bytes with the start of the next one.
#[derive(Debug, Clone, Copy)]
pub struct Partition {
    file_len: u64,
    buffer_size: usize,
    stride: u64,
}

impl Partition {
    /// Returns `None` when the buffer cannot hold the gene plus one byte of
    /// lead room, which would make the stride zero.
    pub fn new(file_len: u64, buffer_size: usize, gene_len: usize) -> Option<Self> {
        if buffer_size <= gene_len {
            return None;
        }
        Some(Self {
            file_len,
            buffer_size,
            stride: (buffer_size - gene_len) as u64,
        })
    }

    /// Distance between consecutive window starts
    pub fn stride(&self) -> u64 {
        self.stride
    }

    /// Number of windows needed to cover the file
    pub fn len(&self) -> usize {
        self.file_len.div_ceil(self.stride) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.file_len == 0
    }

    /// The `index`-th window, or `None` past the end of the file
    pub fn window(&self, index: usize) -> Option<Window> {
        let offset = (index as u64).checked_mul(self.stride)?;
        let remaining = self.file_len.checked_sub(offset).filter(|&n| n > 0)?;
        Some(Window {
            offset,
            len: remaining.min(self.buffer_size as u64) as usize,
        })
    }

    /// Iterates over the windows in file order
    pub fn windows(&self) -> impl Iterator<Item = Window> + '_ {
        (0..self.len()).map_while(move |i| self.window(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_stride() {
        assert!(Partition::new(100, 10, 10).is_none());
        assert!(Partition::new(100, 10, 11).is_none());
        assert!(Partition::new(100, 11, 10).is_some());
    }

    #[test]
    fn test_empty_file_has_no_windows() {
        let partition = Partition::new(0, 16, 4).unwrap();
        assert!(partition.is_empty());
        assert_eq!(partition.len(), 0);
        assert_eq!(partition.windows().count(), 0);
    }

    #[test]
    fn test_small_file_single_window() {
        let partition = Partition::new(50, 64, 14).unwrap();
        let windows: Vec<_> = partition.windows().collect();
        assert_eq!(windows, vec![Window { offset: 0, len: 50 }]);
    }

    #[test]
    fn test_window_layout() {
        // stride = 10 - 4 = 6
        let partition = Partition::new(20, 10, 4).unwrap();
        let windows: Vec<_> = partition.windows().collect();
        assert_eq!(
            windows,
            vec![
                Window { offset: 0, len: 10 },
                Window { offset: 6, len: 10 },
                Window { offset: 12, len: 8 },
                Window { offset: 18, len: 2 },
            ]
        );
    }

    #[test]
    fn test_window_past_end() {
        let partition = Partition::new(20, 10, 4).unwrap();
        assert_eq!(partition.window(3), Some(Window { offset: 18, len: 2 }));
        assert_eq!(partition.window(4), None);
        assert_eq!(partition.window(usize::MAX), None);
        assert_eq!(Partition::new(0, 10, 4).unwrap().window(0), None);
    }

    #[test]
    fn test_coverage_for_many_shapes() {
        for file_len in 0..64u64 {
            for buffer_size in 2..16usize {
                for gene_len in 1..buffer_size {
                    let partition = Partition::new(file_len, buffer_size, gene_len).unwrap();
                    let windows: Vec<_> = partition.windows().collect();
                    let stride = (buffer_size - gene_len) as u64;

                    for pair in windows.windows(2) {
                        assert_eq!(pair[1].offset - pair[0].offset, stride);
                    }
                    for w in &windows {
                        assert!(w.offset < file_len);
                        assert!(w.len <= buffer_size);
                        assert!(w.offset + w.len as u64 <= file_len);
                    }
                    if let Some(last) = windows.last() {
                        assert_eq!(last.offset + last.len as u64, file_len);
                    }

                    // Every placement of the gene lies wholly inside some window
                    if (gene_len as u64) <= file_len {
                        for start in 0..=(file_len - gene_len as u64) {
                            let end = start + gene_len as u64;
                            assert!(
                                windows
                                    .iter()
                                    .any(|w| w.offset <= start && end <= w.offset + w.len as u64),
                                "gene at {start} uncovered (F={file_len}, B={buffer_size}, L={gene_len})"
                            );
                        }
                    }
                }
            }
        }
    }
}
