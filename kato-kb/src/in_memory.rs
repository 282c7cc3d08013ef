//! In-memory knowledge base. Default backend for tests and single-process
//! deployments; `DashMap` shard locking gives `learn_pattern` its atomicity
//! without a separate lock manager.

use async_trait::async_trait;
use dashmap::DashMap;
use kato_core::error::Result;
use kato_core::types::{Emotives, Event, KbTotals, Pattern, SymbolStats};
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::kb_store::KnowledgeBaseStore;

#[derive(Default)]
pub struct InMemoryKb {
    patterns: DashMap<String, Pattern>,
    symbols: DashMap<String, SymbolStats>,
    totals: Mutex<KbTotals>,
}

impl InMemoryKb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Per-symbol occurrence counts (with multiplicity) and the set of
    /// distinct symbols present in `events`, grounded on
    /// `Counter(chain(*sequence))` / `set(chain(*sequence))` in
    /// `knowledge_base.py::learnModel`.
    fn symbol_occurrences(events: &[Event]) -> HashMap<String, u64> {
        let mut counts = HashMap::new();
        for event in events {
            for symbol in event {
                *counts.entry(symbol.clone()).or_insert(0u64) += 1;
            }
        }
        counts
    }
}

#[async_trait]
impl KnowledgeBaseStore for InMemoryKb {
    async fn learn_pattern(&self, events: Vec<Event>, emotives: Emotives, persistence: usize) -> Result<Pattern> {
        let name = kato_core::codec::pattern_name(&events);

        let pattern = match self.patterns.entry(name.clone()) {
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                let pattern = Pattern::new(events.clone(), (!emotives.is_empty()).then(|| emotives.clone()));
                slot.insert(pattern.clone());
                pattern
            }
            dashmap::mapref::entry::Entry::Occupied(mut slot) => {
                slot.get_mut().record_observation(emotives.clone(), persistence);
                slot.get().clone()
            }
        };

        let occurrences = Self::symbol_occurrences(&events);
        let distinct_count = occurrences.len() as u64;
        let total_occurrences: u64 = occurrences.values().sum();

        for (symbol, count) in &occurrences {
            let mut stats = self.symbols.entry(symbol.clone()).or_default();
            stats.frequency += count;
            stats.pattern_member_frequency += 1;
        }

        {
            let mut totals = self.totals.lock();
            totals.total_pattern_frequencies += 1;
            totals.total_symbol_frequencies += total_occurrences;
            totals.total_symbols_in_patterns_frequencies += distinct_count;
        }

        Ok(pattern)
    }

    async fn get_pattern(&self, name: &str) -> Result<Option<Pattern>> {
        Ok(self.patterns.get(name).map(|p| p.clone()))
    }

    async fn all_patterns(&self) -> Result<Vec<Pattern>> {
        Ok(self.patterns.iter().map(|e| e.value().clone()).collect())
    }

    async fn delete_pattern(&self, name: &str) -> Result<()> {
        self.patterns.remove(name);
        Ok(())
    }

    async fn update_pattern(&self, name: &str, frequency: u64, emotives: Vec<Emotives>) -> Result<Option<Pattern>> {
        match self.patterns.get_mut(name) {
            Some(mut entry) => {
                entry.frequency = frequency;
                entry.emotives = emotives;
                Ok(Some(entry.clone()))
            }
            None => Ok(None),
        }
    }

    async fn update_symbol_stats(&self, batch: HashMap<String, u64>) -> Result<()> {
        let mut delta_total = 0u64;
        for (symbol, delta) in &batch {
            let mut stats = self.symbols.entry(symbol.clone()).or_default();
            stats.frequency += delta;
            delta_total += delta;
        }
        self.totals.lock().total_symbol_frequencies += delta_total;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.patterns.clear();
        self.symbols.clear();
        *self.totals.lock() = KbTotals::default();
        Ok(())
    }

    async fn symbol_stats(&self, symbol: &str) -> Result<Option<SymbolStats>> {
        Ok(self.symbols.get(symbol).map(|s| s.clone()))
    }

    async fn totals(&self) -> Result<KbTotals> {
        Ok(self.totals.lock().clone())
    }

    async fn symbol_count(&self) -> Result<usize> {
        Ok(self.symbols.len())
    }

    async fn rebuild_symbol_stats(&self) -> Result<()> {
        self.symbols.clear();
        let mut totals = KbTotals::default();
        for entry in self.patterns.iter() {
            let pattern = entry.value();
            let occurrences = Self::symbol_occurrences(&pattern.pattern_data);
            let distinct_count = occurrences.len() as u64;
            let total_occurrences: u64 = occurrences.values().sum();
            for (symbol, count) in &occurrences {
                let mut stats = self.symbols.entry(symbol.clone()).or_default();
                stats.frequency += count * pattern.frequency;
                stats.pattern_member_frequency += pattern.frequency;
            }
            totals.total_pattern_frequencies += pattern.frequency;
            totals.total_symbol_frequencies += total_occurrences * pattern.frequency;
            totals.total_symbols_in_patterns_frequencies += distinct_count * pattern.frequency;
        }
        *self.totals.lock() = totals;
        Ok(())
    }
}
