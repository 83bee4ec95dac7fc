//! Reduces a windowed cost series into cumulative per-entity totals.
use crate::core::cost::{CostRecord, Snapshot};
use std::collections::BTreeMap;

/// Decimal places kept on accumulated currency fields.
const CURRENCY_PRECISION: f64 = 10_000.0;

pub fn round_currency(value: f64) -> f64 {
    (value * CURRENCY_PRECISION).round() / CURRENCY_PRECISION
}

/// Mean over the strictly positive samples; zeros are "unknown".
#[derive(Debug, Default, Clone, Copy)]
struct PositiveMean {
    sum: f64,
    count: u32,
}

impl PositiveMean {
    fn add(&mut self, value: f64) {
        if value > 0.0 {
            self.sum += value;
            self.count += 1;
        }
    }

    fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / f64::from(self.count)
        }
    }
}

#[derive(Default)]
struct Accumulator {
    record: CostRecord,
    cpu_efficiency: PositiveMean,
    ram_efficiency: PositiveMean,
    total_efficiency: PositiveMean,
    cpu_core_request: PositiveMean,
    cpu_core_usage: PositiveMean,
    ram_byte_request: PositiveMean,
    ram_byte_usage: PositiveMean,
}

impl Accumulator {
    fn add(&mut self, record: &CostRecord) {
        for (total, value) in self.record.monetary_mut().into_iter().zip(record.monetary()) {
            *total += value;
        }
        self.record.minutes += record.minutes;
        self.record.window = self.record.window.span(&record.window);

        self.cpu_efficiency.add(record.cpu_efficiency);
        self.ram_efficiency.add(record.ram_efficiency);
        self.total_efficiency.add(record.total_efficiency);
        self.cpu_core_request.add(record.cpu_core_request_average);
        self.cpu_core_usage.add(record.cpu_core_usage_average);
        self.ram_byte_request.add(record.ram_byte_request_average);
        self.ram_byte_usage.add(record.ram_byte_usage_average);
    }

    fn finish(self) -> CostRecord {
        let mut record = self.record;
        round_monetary(&mut record);
        record.cpu_efficiency = self.cpu_efficiency.mean();
        record.ram_efficiency = self.ram_efficiency.mean();
        record.total_efficiency = self.total_efficiency.mean();
        record.cpu_core_request_average = self.cpu_core_request.mean();
        record.cpu_core_usage_average = self.cpu_core_usage.mean();
        record.ram_byte_request_average = self.ram_byte_request.mean();
        record.ram_byte_usage_average = self.ram_byte_usage.mean();
        record
    }
}

fn round_monetary(record: &mut CostRecord) {
    for field in record.monetary_mut() {
        *field = round_currency(*field);
    }
}

/// Sums every snapshot of `series` into one record per entity name.
///
/// Monetary fields and minutes are added up (an entity missing from a
/// snapshot contributes nothing for it) and rounded to 4 decimal places.
/// Efficiencies and usage averages are averaged over the snapshots that
/// report a non-zero value. A single-snapshot series is returned as is,
/// keyed by name, under the same rounding.
pub fn cumulative(series: &[Snapshot]) -> BTreeMap<String, CostRecord> {
    match series {
        [] => BTreeMap::new(),
        [single] if has_unique_names(single) => single
            .iter()
            .map(|record| {
                let mut record = record.clone();
                round_monetary(&mut record);
                (record.name.clone(), record)
            })
            .collect(),
        _ => {
            let mut accumulators: BTreeMap<String, Accumulator> = BTreeMap::new();
            for record in series.iter().flatten() {
                let acc = accumulators.entry(record.name.clone()).or_default();
                if acc.record.name.is_empty() {
                    acc.record.name = record.name.clone();
                }
                acc.add(record);
            }
            accumulators
                .into_iter()
                .map(|(name, acc)| (name, acc.finish()))
                .collect()
        }
    }
}

fn has_unique_names(snapshot: &Snapshot) -> bool {
    let mut seen = std::collections::HashSet::new();
    snapshot.iter().all(|r| seen.insert(r.name.as_str()))
}

pub fn sort_by_total_cost(records: &mut [CostRecord]) {
    records.sort_by(|a, b| b.total_cost.total_cmp(&a.total_cost));
}

/// Mean `totalEfficiency` across records, skipping idle cost and records
/// whose efficiency is unknown (0).
pub fn average_efficiency(records: &[CostRecord]) -> f64 {
    let mut mean = PositiveMean::default();
    for record in records.iter().filter(|r| !r.is_idle()) {
        mean.add(record.total_efficiency);
    }
    mean.mean()
}

/// Efficiency as a percentage with one decimal, or an em dash when unknown.
pub fn format_efficiency(efficiency: f64) -> String {
    if efficiency > 0.0 {
        format!("{:.1}%", efficiency * 100.0)
    } else {
        "—".to_string()
    }
}

/// Report-wide totals shown above allocation tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CostTotals {
    pub cpu_cost: f64,
    pub gpu_cost: f64,
    pub ram_cost: f64,
    pub pv_cost: f64,
    pub network_cost: f64,
    pub shared_cost: f64,
    pub external_cost: f64,
    pub total_cost: f64,
    pub average_efficiency: f64,
    pub count: usize,
}

pub fn summarize(records: &[CostRecord]) -> CostTotals {
    let mut sums = CostRecord::default();
    for record in records {
        for (total, value) in sums.monetary_mut().into_iter().zip(record.monetary()) {
            *total += value;
        }
    }
    CostTotals {
        cpu_cost: sums.cpu_cost,
        gpu_cost: sums.gpu_cost,
        ram_cost: sums.ram_cost,
        pv_cost: sums.pv_cost,
        network_cost: sums.network_cost,
        shared_cost: sums.shared_cost,
        external_cost: sums.external_cost,
        total_cost: sums.total_cost,
        average_efficiency: average_efficiency(records),
        count: records.len(),
    }
}
