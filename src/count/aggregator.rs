use rustc_hash::{FxHashMap, FxHashSet};

/// Cell barcode, as stored in the barcode tag of a read
pub type CellKey = String;

/// Matching and total reads of one cell. matched <= total always holds
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CellCount {
    pub matched: u64,
    pub total: u64,
}

impl CellCount {
    pub fn new(matched: u64, total: u64) -> CellCount {
        CellCount { matched, total }
    }

    /// matched / total, or None for a cell without reads
    pub fn fraction(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.matched as f64 / self.total as f64)
        }
    }
}

///////////////////////////////
/// Ordered set of barcodes to restrict counting to.
/// Duplicates collapse onto their first occurrence
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AllowList {
    barcodes: Vec<CellKey>,
}

impl AllowList {
    pub fn barcodes(&self) -> &[CellKey] {
        &self.barcodes
    }

    pub fn len(&self) -> usize {
        self.barcodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.barcodes.is_empty()
    }
}

impl<S: Into<CellKey>> FromIterator<S> for AllowList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut seen = FxHashSet::default();
        let mut barcodes = Vec::new();
        for barcode in iter {
            let barcode = barcode.into();
            if seen.insert(barcode.clone()) {
                barcodes.push(barcode);
            }
        }
        AllowList { barcodes }
    }
}

///////////////////////////////
/// Which barcodes get a counter
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum BarcodeMode {
    /// Any barcode seen in the data
    #[default]
    Open,
    /// Only the listed barcodes; each one is reported even without reads
    Closed(AllowList),
}

///////////////////////////////
/// Per-cell counts of one file, in a stable order: allow-list order for a closed
/// universe, order of first appearance for an open one
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CellCounts {
    cells: Vec<(CellKey, CellCount)>,
    index: FxHashMap<CellKey, usize>,
}

impl CellCounts {
    pub fn get(&self, cell: &str) -> Option<&CellCount> {
        self.index.get(cell).map(|&i| &self.cells[i].1)
    }

    pub fn contains(&self, cell: &str) -> bool {
        self.index.contains_key(cell)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellCount)> {
        self.cells.iter().map(|(key, count)| (key.as_str(), count))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Sum of matched reads over all cells
    pub fn matched_reads(&self) -> u64 {
        self.cells.iter().map(|(_, c)| c.matched).sum()
    }

    /// Sum of counted reads over all cells
    pub fn total_reads(&self) -> u64 {
        self.cells.iter().map(|(_, c)| c.total).sum()
    }

    fn insert_zero(&mut self, cell: CellKey) -> usize {
        let i = self.cells.len();
        self.index.insert(cell.clone(), i);
        self.cells.push((cell, CellCount::default()));
        i
    }
}

///////////////////////////////
/// Per-file result handed to the output stage
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FileResult {
    pub cell_counts: CellCounts,
    /// Records whose barcode or sequence could not be extracted
    pub missed_reads: u64,
    /// Records visited, whatever their fate
    pub records: u64,
}

///////////////////////////////
/// Accumulates reads into per-cell counters for a single file.
/// Consumed by finish(); no mutation is possible afterwards
#[derive(Debug)]
pub struct CellAggregator {
    counts: CellCounts,
    closed: bool,
}

impl CellAggregator {
    pub fn new(mode: &BarcodeMode) -> CellAggregator {
        match mode {
            BarcodeMode::Open => CellAggregator {
                counts: CellCounts::default(),
                closed: false,
            },
            BarcodeMode::Closed(allow_list) => {
                let mut counts = CellCounts::default();
                counts.cells.reserve(allow_list.len());
                for barcode in allow_list.barcodes() {
                    counts.insert_zero(barcode.clone());
                }
                CellAggregator {
                    counts,
                    closed: true,
                }
            }
        }
    }

    /// Count one read for a cell. Returns false if the cell is outside a closed
    /// universe, in which case nothing changes
    pub fn record(&mut self, cell: &str, is_match: bool) -> bool {
        let i = match self.counts.index.get(cell) {
            Some(&i) => i,
            None if self.closed => return false,
            None => self.counts.insert_zero(cell.to_string()),
        };

        let count = &mut self.counts.cells[i].1;
        count.total += 1;
        if is_match {
            count.matched += 1;
        }
        true
    }

    pub fn finish(self) -> CellCounts {
        self.counts
    }
}
