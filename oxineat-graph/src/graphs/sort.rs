//! In-place introspective sort over sets of parallel arrays.
//!
//! Elements are compared through one array (or one pair of arrays)
//! and every swap is applied to all arrays of the set, so that
//! related values stay aligned without building a permutation
//! or allocating copies.
use crate::genomics::DirectedConnection;
use crate::graphs::NodeIndex;
use crate::Innovation;

/// Partitions at or below this size are insertion sorted.
const INSERTION_SORT_THRESHOLD: usize = 24;

/// A set of parallel arrays that can be sorted together.
pub(crate) trait ParallelSlices {
    fn len(&self) -> usize;
    /// Returns whether the element at `a` orders before the element at `b`.
    fn less(&self, a: usize, b: usize) -> bool;
    /// Swaps positions `a` and `b` in every array of the set.
    fn swap(&mut self, a: usize, b: usize);
}

/// Connection genes, compared by connection.
pub(crate) struct GeneSlices<'a> {
    pub connections: &'a mut [DirectedConnection],
    pub weights: &'a mut [f32],
    pub innovations: &'a mut [Innovation],
}

impl ParallelSlices for GeneSlices<'_> {
    fn len(&self) -> usize {
        self.connections.len()
    }

    fn less(&self, a: usize, b: usize) -> bool {
        self.connections[a] < self.connections[b]
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.connections.swap(a, b);
        self.weights.swap(a, b);
        self.innovations.swap(a, b);
    }
}

/// Graph connections, compared by (source, target), carrying
/// along the gene position each connection came from.
pub(crate) struct IndexSlices<'a> {
    pub sources: &'a mut [NodeIndex],
    pub targets: &'a mut [NodeIndex],
    pub connection_index_map: &'a mut [usize],
}

impl ParallelSlices for IndexSlices<'_> {
    fn len(&self) -> usize {
        self.sources.len()
    }

    fn less(&self, a: usize, b: usize) -> bool {
        (self.sources[a], self.targets[a]) < (self.sources[b], self.targets[b])
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.sources.swap(a, b);
        self.targets.swap(a, b);
        self.connection_index_map.swap(a, b);
    }
}

/// Sorts the set in ascending order. Not stable.
pub(crate) fn sort<S: ParallelSlices + ?Sized>(slices: &mut S) {
    let len = slices.len();
    if len < 2 {
        return;
    }
    let depth_limit = 2 * (usize::BITS - len.leading_zeros()) as usize;
    introsort(slices, 0, len, depth_limit);
}

// Sorts [lo, hi), recursing on the upper partition and looping on the lower.
fn introsort<S: ParallelSlices + ?Sized>(
    slices: &mut S,
    lo: usize,
    mut hi: usize,
    mut depth_limit: usize,
) {
    while hi - lo > 1 {
        if hi - lo <= INSERTION_SORT_THRESHOLD {
            insertion_sort(slices, lo, hi);
            return;
        }
        if depth_limit == 0 {
            heapsort(slices, lo, hi);
            return;
        }
        depth_limit -= 1;

        let pivot = partition(slices, lo, hi);
        introsort(slices, pivot + 1, hi, depth_limit);
        hi = pivot;
    }
}

fn swap_if_greater<S: ParallelSlices + ?Sized>(slices: &mut S, a: usize, b: usize) {
    if slices.less(b, a) {
        slices.swap(a, b);
    }
}

// Median-of-three partition. Requires hi - lo > 3.
fn partition<S: ParallelSlices + ?Sized>(slices: &mut S, lo: usize, hi: usize) -> usize {
    let last = hi - 1;
    let mid = lo + (hi - lo - 1) / 2;
    swap_if_greater(slices, lo, mid);
    swap_if_greater(slices, lo, last);
    swap_if_greater(slices, mid, last);

    // slices[lo] <= pivot <= slices[last] bound both scans.
    let pivot = last - 1;
    slices.swap(mid, pivot);
    let mut left = lo;
    let mut right = pivot;
    loop {
        left += 1;
        while slices.less(left, pivot) {
            left += 1;
        }
        right -= 1;
        while slices.less(pivot, right) {
            right -= 1;
        }
        if left >= right {
            break;
        }
        slices.swap(left, right);
    }
    if left != pivot {
        slices.swap(left, pivot);
    }
    left
}

fn insertion_sort<S: ParallelSlices + ?Sized>(slices: &mut S, lo: usize, hi: usize) {
    for i in lo + 1..hi {
        let mut j = i;
        while j > lo && slices.less(j, j - 1) {
            slices.swap(j, j - 1);
            j -= 1;
        }
    }
}

fn heapsort<S: ParallelSlices + ?Sized>(slices: &mut S, lo: usize, hi: usize) {
    let n = hi - lo;
    for root in (0..n / 2).rev() {
        sift_down(slices, lo, root, n);
    }
    for end in (1..n).rev() {
        slices.swap(lo, lo + end);
        sift_down(slices, lo, 0, end);
    }
}

fn sift_down<S: ParallelSlices + ?Sized>(slices: &mut S, lo: usize, mut root: usize, n: usize) {
    loop {
        let mut child = 2 * root + 1;
        if child >= n {
            return;
        }
        if child + 1 < n && slices.less(lo + child, lo + child + 1) {
            child += 1;
        }
        if !slices.less(lo + root, lo + child) {
            return;
        }
        slices.swap(lo + root, lo + child);
        root = child;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::prelude::*;

    fn random_connections(len: usize, rng: &mut StdRng) -> IndexArrays {
        let mut pairs: Vec<(usize, usize)> = (0..len * 2)
            .map(|_| (rng.gen_range(0..len + 1), rng.gen_range(0..len + 1)))
            .collect();
        pairs.sort_unstable();
        pairs.dedup();
        pairs.shuffle(rng);
        pairs.truncate(len);
        IndexArrays::from_pairs(&pairs)
    }

    struct IndexArrays {
        sources: Vec<NodeIndex>,
        targets: Vec<NodeIndex>,
        map: Vec<usize>,
    }

    impl IndexArrays {
        fn from_pairs(pairs: &[(usize, usize)]) -> IndexArrays {
            IndexArrays {
                sources: pairs.iter().map(|p| NodeIndex(p.0)).collect(),
                targets: pairs.iter().map(|p| NodeIndex(p.1)).collect(),
                map: (0..pairs.len()).collect(),
            }
        }

        fn slices(&mut self) -> IndexSlices<'_> {
            IndexSlices {
                sources: &mut self.sources,
                targets: &mut self.targets,
                connection_index_map: &mut self.map,
            }
        }

        fn pairs(&self) -> Vec<(usize, usize)> {
            self.sources
                .iter()
                .zip(&self.targets)
                .map(|(s, t)| (s.0, t.0))
                .collect()
        }

        fn check_against(&self, original: &[(usize, usize)]) {
            let pairs = self.pairs();
            let mut expected = original.to_vec();
            expected.sort_unstable();
            assert_eq!(pairs, expected);
            for (pair, &origin) in pairs.iter().zip(&self.map) {
                assert_eq!(*pair, original[origin]);
            }
        }
    }

    #[test]
    fn sorts_random_inputs() {
        let mut rng = StdRng::seed_from_u64(17);
        for len in [0, 1, 2, 3, 10, 24, 25, 26, 50, 200, 3000] {
            let mut arrays = random_connections(len, &mut rng);
            let original = arrays.pairs();
            sort(&mut arrays.slices());
            arrays.check_against(&original);
        }
    }

    #[test]
    fn sorts_presorted_and_reversed_inputs() {
        let ascending: Vec<(usize, usize)> = (0..500).map(|i| (i / 10, i % 10)).collect();
        let descending: Vec<(usize, usize)> = ascending.iter().rev().copied().collect();
        for original in [ascending, descending] {
            let mut arrays = IndexArrays::from_pairs(&original);
            sort(&mut arrays.slices());
            arrays.check_against(&original);
        }
    }

    #[test]
    fn tolerates_duplicate_keys() {
        let original: Vec<(usize, usize)> = (0..300).map(|i| (i % 3, 0)).collect();
        let mut arrays = IndexArrays::from_pairs(&original);
        sort(&mut arrays.slices());
        arrays.check_against(&original);
    }

    #[test]
    fn heapsort_fallback_sorts_subrange() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut arrays = random_connections(100, &mut rng);
        let original = arrays.pairs();
        heapsort(&mut arrays.slices(), 10, 90);

        let pairs = arrays.pairs();
        assert_eq!(&pairs[..10], &original[..10]);
        assert_eq!(&pairs[90..], &original[90..]);
        assert!(pairs[10..90].windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn depth_limited_introsort() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut arrays = random_connections(400, &mut rng);
        let original = arrays.pairs();
        introsort(&mut arrays.slices(), 0, 400, 1);
        arrays.check_against(&original);
    }
}
