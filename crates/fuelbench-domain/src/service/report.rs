//! Console benchmark report

use crate::model::DataQuality;
use crate::service::benchmark_engine::BenchmarkOutcome;
use fuelbench_types::WorkBasis;

const TOP_WASTEFUL: usize = 10;

pub fn generate_benchmark_report(
    outcome: &BenchmarkOutcome,
    quality: &DataQuality,
    basis: WorkBasis,
    fuel_price: f64,
) -> String {
    let total = outcome.aggregates.len();
    let active = outcome.active().count();
    let inactive = total - active;
    let wasteful = outcome.wasteful().count();
    let total_fuel = outcome.total_fuel();
    let total_waste = outcome.total_waste();

    let mut report = String::new();
    report.push_str("==================================================\n");
    report.push_str("           Laporan Benchmark Efisiensi BBM         \n");
    report.push_str("           Fuel Efficiency Benchmark Report        \n");
    report.push_str("==================================================\n\n");
    report.push_str("[Ringkasan / Summary]\n");
    report.push_str(&format!("  Basis kerja / Work basis:       {}\n", basis));
    report.push_str(&format!("  Total unit / Units:             {}\n", total));
    report.push_str(&format!("  Unit aktif / Active:            {}\n", active));
    report.push_str(&format!("  Unit inaktif / Inactive:        {}\n", inactive));
    report.push_str(&format!("  Unit boros / Wasteful:          {}\n", wasteful));
    report.push_str(&format!(
        "  Nama tak cocok / Unmatched:     {}\n",
        quality.unmatched_names.len()
    ));
    report.push_str(&format!("  Total BBM / Fuel:               {:.1} L\n", total_fuel));
    report.push_str(&format!("  Potensi pemborosan / Waste:     {:.1} L\n", total_waste));
    report.push_str(&format!(
        "  Estimasi kerugian / Loss:       Rp {}\n",
        format_rupiah(total_waste * fuel_price)
    ));
    report.push('\n');

    if !outcome.groups.is_empty() {
        report.push_str("[Benchmark Grup / Group Benchmarks]\n");
        report.push_str("-".repeat(62).as_str());
        report.push('\n');
        report.push_str(&format!(
            "{:<34} {:>6} {:>18}\n",
            "Group",
            "Units",
            format!("Median ({})", basis.ratio_unit())
        ));
        report.push_str("-".repeat(62).as_str());
        report.push('\n');
        for group in &outcome.groups {
            report.push_str(&format!(
                "{:<34} {:>6} {:>18.2}\n",
                truncate_str(group.key(), 33),
                group.len(),
                group.benchmark()
            ));
        }
        report.push('\n');
    }

    if wasteful > 0 {
        let mut worst: Vec<_> = outcome.wasteful().collect();
        worst.sort_by(|a, b| b.potential_waste.total_cmp(&a.potential_waste));
        report.push_str("[Unit Boros Teratas / Top Wasteful Units]\n");
        report.push_str("-".repeat(74).as_str());
        report.push('\n');
        report.push_str(&format!(
            "{:<24} {:>10} {:>10} {:>12} {:>14}\n",
            "Unit", "Ratio", "Median", "Waste (L)", "Loss (Rp)"
        ));
        report.push_str("-".repeat(74).as_str());
        report.push('\n');
        for agg in worst.into_iter().take(TOP_WASTEFUL) {
            report.push_str(&format!(
                "{:<24} {:>10.2} {:>10.2} {:>12.1} {:>14}\n",
                truncate_str(&agg.display_name, 23),
                agg.fuel_ratio.unwrap_or(0.0),
                agg.benchmark.unwrap_or(0.0),
                agg.potential_waste,
                format_rupiah(agg.estimated_loss(fuel_price))
            ));
        }
        report.push('\n');
    } else {
        report.push_str("[Tidak ada unit boros / No Wasteful Units]\n");
        report.push_str("  All active units are at or below their group median.\n\n");
    }

    if !quality.unmatched_names.is_empty() {
        report.push_str("[Nama Tak Cocok / Unmatched Names]\n");
        for name in &quality.unmatched_names {
            report.push_str(&format!("  - {}\n", name));
        }
        report.push('\n');
    }

    if !quality.skipped_sheets.is_empty() || quality.rejected_deltas > 0 {
        report.push_str("[Kualitas Data / Data Quality]\n");
        for skipped in &quality.skipped_sheets {
            report.push_str(&format!("  sheet {} dilewati: {}\n", skipped.sheet, skipped.reason));
        }
        report.push_str(&format!("  Delta ditolak / Rejected deltas: {}\n", quality.rejected_deltas));
        report.push('\n');
    }

    report
}

/// Integer rupiah with dot thousands separators, e.g. `1.234.567`
pub fn format_rupiah(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut out = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    if rounded < 0 {
        format!("-{}", out)
    } else {
        out
    }
}

fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max_chars.saturating_sub(1)).collect();
        out.push('~');
        out
    }
}
