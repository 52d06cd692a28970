//! Accumulates originated prefixes per border router.

use ipnet::Ipv4Net;

use super::types::PrefixTable;

/// Builds the ASBR prefix-origin table. Insertion is a plain set union, so
/// duplicates are absorbed and no conflicts are possible.
#[derive(Debug, Default)]
pub struct PrefixCollector {
    table: PrefixTable,
}

impl PrefixCollector {
    pub fn new() -> Self {
        PrefixCollector::default()
    }

    /// Record one `asbr prefix` observation.
    pub fn ingest(&mut self, asbr: &str, prefix: Ipv4Net) {
        self.table.entry(asbr.to_string()).or_default().insert(prefix);
    }

    /// Number of distinct border routers seen so far.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn finish(self) -> PrefixTable {
        self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn net(s: &str) -> Ipv4Net {
        s.parse().unwrap()
    }

    #[test]
    fn duplicate_insertions_are_idempotent() {
        let mut collector = PrefixCollector::new();
        collector.ingest("asbr1", net("10.0.0.0/24"));
        collector.ingest("asbr1", net("10.0.0.0/24"));

        let table = collector.finish();
        assert_eq!(table["asbr1"].len(), 1);
    }

    #[test]
    fn prefixes_accumulate_per_router() {
        let mut collector = PrefixCollector::new();
        collector.ingest("asbr1", net("10.0.0.0/24"));
        collector.ingest("asbr1", net("10.0.1.0/24"));
        collector.ingest("asbr2", net("10.0.0.0/24"));

        let table = collector.finish();
        assert_eq!(table.len(), 2);
        assert_eq!(table["asbr1"].len(), 2);
        assert!(table["asbr2"].contains(&net("10.0.0.0/24")));
    }
}
