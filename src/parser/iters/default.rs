/*!
Default iterator implementations: parse errors are logged and skipped rather
than surfaced, matching the historical `for record in parser` ergonomics.
*/
use crate::models::*;
use crate::parser::BgpkitParser;
use crate::{Elementor, Filterable};
use log::warn;
use std::io::Read;

/// Iterator over [`MrtRecord`]s, silently skipping records that fail to parse.
pub struct RecordIterator<R> {
    parser: BgpkitParser<R>,
    elementor: Elementor,
}

impl<R> RecordIterator<R> {
    pub(crate) fn new(parser: BgpkitParser<R>) -> Self {
        RecordIterator {
            parser,
            elementor: Elementor::new(),
        }
    }
}

impl<R: Read> Iterator for RecordIterator<R> {
    type Item = MrtRecord;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.parser.next_record() {
                Ok(record) => {
                    let filters = &self.parser.filters;
                    if filters.is_empty() {
                        return Some(record);
                    }
                    if let MrtMessage::TableDumpV2Message(TableDumpV2Message::PeerIndexTable(_)) =
                        &record.message
                    {
                        let _ = self.elementor.record_to_elems(record.clone());
                        return Some(record);
                    }
                    let elems = self.elementor.record_to_elems(record.clone());
                    if elems.iter().any(|e| e.match_filters(filters)) {
                        return Some(record);
                    }
                    continue;
                }
                Err(e) if matches!(e.error, crate::ParserError::EofExpected) => return None,
                Err(e) => {
                    warn!("error parsing MRT record, skipping: {e}");
                    return None;
                }
            }
        }
    }
}

/// Iterator over [`BgpElem`]s, silently skipping records that fail to parse.
pub struct ElemIterator<R> {
    cache_elems: Vec<BgpElem>,
    record_iter: RecordIterator<R>,
    elementor: Elementor,
}

impl<R> ElemIterator<R> {
    pub(crate) fn new(parser: BgpkitParser<R>) -> Self {
        ElemIterator {
            record_iter: RecordIterator::new(parser),
            cache_elems: vec![],
            elementor: Elementor::new(),
        }
    }
}

impl<R: Read> Iterator for ElemIterator<R> {
    type Item = BgpElem;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(elem) = self.cache_elems.pop() {
                if elem.match_filters(&self.record_iter.parser.filters) {
                    return Some(elem);
                }
                continue;
            }

            match self.record_iter.next() {
                None => return None,
                Some(record) => {
                    let mut elems = self.elementor.record_to_elems(record);
                    if elems.is_empty() {
                        continue;
                    }
                    elems.reverse();
                    self.cache_elems = elems;
                    continue;
                }
            }
        }
    }
}
