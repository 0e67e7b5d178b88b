/*!
§4.6 MergeSorter: a k-way merge over an arbitrary number of `BgpElement`
iterators using the ordering defined in §3 (primary key `time` ascending,
ties broken by `(collector, peer_asn, peer_address, type)`).
*/
use crate::engine::element::BgpElement;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Wraps one `(element, source index)` pair with a `Reverse`-style ordering
/// so [`BinaryHeap`] (a max-heap) yields the minimum element first.
struct HeapEntry {
    element: BgpElement,
    source: usize,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.element == other.element
    }
}
impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // reversed so the heap's "greatest" entry is the chronologically
        // earliest element.
        other.element.cmp(&self.element)
    }
}

/// A k-way merge over per-collector/per-file [`BgpElement`] sequences.
///
/// Each input must itself be locally time-sorted (§4.6's invariant); the
/// `ParserDriver`/`ChunkScheduler` are responsible for pre-sorting any input
/// that is not already monotone to the granularity promised in §4.6.
pub struct MergeSorter<I> {
    inputs: Vec<I>,
    heap: BinaryHeap<HeapEntry>,
    primed: bool,
}

impl<I> MergeSorter<I>
where
    I: Iterator<Item = BgpElement>,
{
    pub fn new(inputs: Vec<I>) -> Self {
        MergeSorter {
            inputs,
            heap: BinaryHeap::new(),
            primed: false,
        }
    }

    fn prime(&mut self) {
        for (idx, input) in self.inputs.iter_mut().enumerate() {
            if let Some(element) = input.next() {
                self.heap.push(HeapEntry { element, source: idx });
            }
        }
        self.primed = true;
    }

    /// Adds one more input mid-stream (used by the `ChunkScheduler` as files
    /// become ready while the merge is already in progress).
    pub fn add_input(&mut self, mut input: I) {
        if let Some(element) = input.next() {
            let source = self.inputs.len();
            self.inputs.push(input);
            self.heap.push(HeapEntry { element, source });
        } else {
            self.inputs.push(input);
        }
    }
}

impl<I> Iterator for MergeSorter<I>
where
    I: Iterator<Item = BgpElement>,
{
    type Item = BgpElement;

    fn next(&mut self) -> Option<BgpElement> {
        if !self.primed {
            self.prime();
        }
        let HeapEntry { element, source } = self.heap.pop()?;
        if let Some(next) = self.inputs[source].next() {
            self.heap.push(HeapEntry {
                element: next,
                source,
            });
        }
        Some(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::element::{ElemKind, ElementFields};
    use std::net::IpAddr;

    fn elem(time: f64, collector: &str) -> BgpElement {
        BgpElement {
            kind: ElemKind::Announce,
            collector: collector.to_string(),
            time,
            peer_asn: 100,
            peer_address: "192.0.2.1".parse::<IpAddr>().unwrap(),
            fields: ElementFields::default(),
        }
    }

    #[test]
    fn merges_two_sorted_inputs_into_one_time_ordered_sequence() {
        let a = vec![elem(1.0, "rrc00"), elem(3.0, "rrc00"), elem(5.0, "rrc00")];
        let b = vec![elem(2.0, "rrc01"), elem(4.0, "rrc01")];
        let merged: Vec<_> = MergeSorter::new(vec![a.into_iter(), b.into_iter()])
            .map(|e| e.time)
            .collect();
        assert_eq!(merged, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn breaks_ties_by_collector() {
        let a = vec![elem(1.0, "rrc01")];
        let b = vec![elem(1.0, "rrc00")];
        let merged: Vec<_> = MergeSorter::new(vec![a.into_iter(), b.into_iter()])
            .map(|e| e.collector)
            .collect();
        assert_eq!(merged, vec!["rrc00".to_string(), "rrc01".to_string()]);
    }

    #[test]
    fn empty_inputs_yield_empty_output() {
        let merged: Vec<BgpElement> =
            MergeSorter::new(Vec::<std::vec::IntoIter<BgpElement>>::new()).collect();
        assert!(merged.is_empty());
    }

    #[test]
    fn added_input_is_merged_in() {
        let a = vec![elem(1.0, "rrc00"), elem(10.0, "rrc00")];
        let mut sorter = MergeSorter::new(vec![a.into_iter()]);
        assert_eq!(sorter.next().unwrap().time, 1.0);
        sorter.add_input(vec![elem(2.0, "rrc01")].into_iter());
        let rest: Vec<_> = sorter.map(|e| e.time).collect();
        assert_eq!(rest, vec![2.0, 10.0]);
    }
}
