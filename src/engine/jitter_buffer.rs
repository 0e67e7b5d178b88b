/*!
§4.8 JitterBuffer: wraps an unsorted live sequence in a bounded-delay
reordering buffer. Maintains a min-heap keyed by `time` and a running
`max_ts_seen`; yields once an element is more than `delay` seconds behind the
live frontier.
*/
use crate::engine::element::BgpElement;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

struct ByTime(BgpElement);

impl PartialEq for ByTime {
    fn eq(&self, other: &Self) -> bool {
        self.0.time == other.0.time
    }
}
impl Eq for ByTime {}
impl PartialOrd for ByTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for ByTime {
    fn cmp(&self, other: &Self) -> Ordering {
        // reversed: BinaryHeap is a max-heap, we want the earliest time on top.
        other.0.time.partial_cmp(&self.0.time).unwrap_or(Ordering::Equal)
    }
}

/// §4.8. `delay` of `0.0` disables buffering entirely (elements pass
/// through immediately, per §3's `jitter_buffer_delay` default semantics).
pub struct JitterBuffer {
    heap: BinaryHeap<ByTime>,
    max_ts_seen: f64,
    delay: f64,
}

impl JitterBuffer {
    pub fn new(delay: f64) -> Self {
        JitterBuffer {
            heap: BinaryHeap::new(),
            max_ts_seen: f64::NEG_INFINITY,
            delay: delay.max(0.0),
        }
    }

    /// Pushes one newly arrived element. Returns every element now safe to
    /// yield, in ascending time order (usually zero or one, but a burst of
    /// late-arriving elements for the same old timestamp can release more).
    pub fn push(&mut self, element: BgpElement) -> Vec<BgpElement> {
        if element.time > self.max_ts_seen {
            self.max_ts_seen = element.time;
        }
        self.heap.push(ByTime(element));

        if self.delay == 0.0 {
            return self.drain_all();
        }

        let mut ready = Vec::new();
        let threshold = self.max_ts_seen - self.delay;
        while let Some(top) = self.heap.peek() {
            if top.0.time <= threshold {
                ready.push(self.heap.pop().unwrap().0);
            } else {
                break;
            }
        }
        ready
    }

    /// §4.8 "On upstream termination, flush the heap in order."
    pub fn flush(&mut self) -> Vec<BgpElement> {
        self.drain_all()
    }

    fn drain_all(&mut self) -> Vec<BgpElement> {
        let mut out = Vec::with_capacity(self.heap.len());
        while let Some(ByTime(e)) = self.heap.pop() {
            out.push(e);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::element::{ElemKind, ElementFields};

    fn elem(time: f64, collector: &str) -> BgpElement {
        BgpElement {
            kind: ElemKind::Announce,
            collector: collector.to_string(),
            time,
            peer_asn: 100,
            peer_address: "192.0.2.1".parse().unwrap(),
            fields: ElementFields::default(),
        }
    }

    #[test]
    fn holds_elements_within_delay_window() {
        let mut buf = JitterBuffer::new(10.0);
        assert!(buf.push(elem(100.0, "rrc00")).is_empty());
        assert!(buf.push(elem(105.0, "rrc00")).is_empty());
    }

    #[test]
    fn yields_elements_once_frontier_passes_delay() {
        let mut buf = JitterBuffer::new(10.0);
        buf.push(elem(100.0, "rrc00"));
        let ready = buf.push(elem(111.0, "rrc00"));
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].time, 100.0);
    }

    #[test]
    fn zero_delay_passes_through_immediately() {
        let mut buf = JitterBuffer::new(0.0);
        let ready = buf.push(elem(50.0, "rrc00"));
        assert_eq!(ready.len(), 1);
    }

    #[test]
    fn flush_drains_remaining_elements_in_order() {
        let mut buf = JitterBuffer::new(100.0);
        buf.push(elem(5.0, "rrc00"));
        buf.push(elem(2.0, "rrc00"));
        buf.push(elem(9.0, "rrc00"));
        let flushed: Vec<_> = buf.flush().into_iter().map(|e| e.time).collect();
        assert_eq!(flushed, vec![2.0, 5.0, 9.0]);
    }

    #[test]
    fn monotone_output_under_bounded_lateness() {
        let mut buf = JitterBuffer::new(5.0);
        let mut out = Vec::new();
        // frontier advances steadily; one element arrives 3s late (within delay).
        for t in [10.0, 11.0, 9.0, 12.0, 13.0, 14.0, 15.0, 16.0] {
            out.extend(buf.push(elem(t, "rrc00")));
        }
        out.extend(buf.flush());
        let times: Vec<_> = out.iter().map(|e| e.time).collect();
        let mut sorted = times.clone();
        sorted.sort_by(|a: &f64, b: &f64| a.partial_cmp(b).unwrap());
        assert_eq!(times, sorted);
    }
}
