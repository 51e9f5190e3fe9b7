//! End-to-end pipeline tests on generated workbooks

use std::path::{Path, PathBuf};

use calamine::{open_workbook, Data, Reader, Xlsx};
use rust_xlsxwriter::Workbook;

use fuelbench_app::app::{AnalysisRequest, AnalysisService};
use fuelbench_app::config::Config;
use fuelbench_app::export::export_to_excel;
use fuelbench_domain::model::UnitAggregate;
use fuelbench_domain::service::BenchmarkOutcome;
use fuelbench_types::{EfficiencyStatus, Error, InactiveReason};

/// Master on "Sheet2" with a title row above the headers
fn write_master(path: &Path) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Sheet2").unwrap();
    sheet.write_string(0, 0, "DATA ALAT BERAT").unwrap();
    let headers = ["NO", "NAMA ALAT", "DES 2025", "JENIS ALAT BERAT", "TYPE / MERK", "KAPASITAS", "HP"];
    for (col, h) in headers.iter().enumerate() {
        sheet.write_string(1, col as u16, *h).unwrap();
    }
    let rows: [(&str, &str, &str, &str, &str, f64); 5] = [
        ("RS 01", "Tanjung Perak", "Reach Stacker", "KALMAR", "45", 250.0),
        ("RS 02", "Tanjung Perak", "Reach Stacker", "KALMAR", "45", 250.0),
        ("FL 03", "-", "Forklift", "MITSUBHISI", "5 TON", 74.0),
        ("DUMMY 1", "-", "Forklift", "-", "3", 0.0),
        ("L 9025 US", "Surabaya", "Trailer", "HINO", "", 0.0),
    ];
    for (i, (name, loc, cat, brand, cap, hp)) in rows.iter().enumerate() {
        let row = (i + 2) as u32;
        sheet.write_number(row, 0, (i + 1) as f64).unwrap();
        sheet.write_string(row, 1, *name).unwrap();
        sheet.write_string(row, 2, *loc).unwrap();
        sheet.write_string(row, 3, *cat).unwrap();
        sheet.write_string(row, 4, *brand).unwrap();
        sheet.write_string(row, 5, *cap).unwrap();
        sheet.write_number(row, 6, *hp).unwrap();
    }
    workbook.save(path).unwrap();
}

/// Fuel log with one month sheet. Unit names are merged over (HM, LITER) pairs,
/// so only the first cell of each block carries the name.
fn write_fuel_log(path: &Path) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("OKT").unwrap();

    sheet.write_string(0, 0, "TANGGAL").unwrap();
    let blocks = [(1u16, "RS 01"), (3, "RS-02"), (5, "FL 03"), (7, "GENSET 1"), (9, "X 999"), (11, "L.9025/US")];
    for (col, name) in blocks {
        sheet.write_string(0, col, name).unwrap();
        sheet.write_string(2, col, "HM").unwrap();
        sheet.write_string(2, col + 1, "LITER").unwrap();
    }

    let dates = ["01-10-2025", "02-10-2025", "03-10-2025"];
    // (hm, liter) per block per day; None = blank cell
    let data: [[(Option<f64>, Option<f64>); 6]; 3] = [
        [
            (Some(1000.0), None),
            (Some(2000.0), None),
            (Some(500.0), Some(10.0)),
            (None, Some(80.0)),
            (Some(10.0), Some(5.0)),
            (None, Some(30.0)),
        ],
        [
            (Some(1010.0), Some(50.0)),
            (Some(2010.0), Some(100.0)),
            (Some(500.0), Some(10.0)),
            (None, Some(80.0)),
            (Some(20.0), Some(5.0)),
            (None, Some(30.0)),
        ],
        [
            (Some(1020.0), Some(50.0)),
            (Some(2030.0), Some(200.0)),
            (Some(500.0), Some(10.0)),
            (None, Some(80.0)),
            (Some(30.0), Some(5.0)),
            (None, None),
        ],
    ];
    for (d, date) in dates.iter().enumerate() {
        let row = (d + 3) as u32;
        sheet.write_string(row, 0, *date).unwrap();
        for (b, (hm, liter)) in data[d].iter().enumerate() {
            let col = blocks[b].0;
            if let Some(v) = hm {
                sheet.write_number(row, col, *v).unwrap();
            }
            if let Some(v) = liter {
                sheet.write_number(row, col + 1, *v).unwrap();
            }
        }
    }
    sheet.write_string(6, 0, "TOTAL").unwrap();

    let summary = workbook.add_worksheet();
    summary.set_name("REKAP").unwrap();
    summary.write_string(0, 0, "not a month sheet").unwrap();

    workbook.save(path).unwrap();
}

struct Fixture {
    _dir: tempfile::TempDir,
    fuel: PathBuf,
    master: PathBuf,
    root: PathBuf,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let fuel = dir.path().join("bbm.xlsx");
    let master = dir.path().join("master.xlsx");
    write_fuel_log(&fuel);
    write_master(&master);
    let root = dir.path().to_path_buf();
    Fixture { _dir: dir, fuel, master, root }
}

fn find<'a>(outcome: &'a BenchmarkOutcome, key: &str) -> &'a UnitAggregate {
    outcome
        .aggregates
        .iter()
        .find(|a| a.unit == key)
        .unwrap_or_else(|| panic!("unit {} missing", key))
}

#[test]
fn test_hour_meter_benchmark_end_to_end() {
    let fx = fixture();
    let mut service = AnalysisService::new(Config::default()).unwrap();
    let request = AnalysisRequest::new(&fx.fuel, &fx.master).with_preset("hm-daily");
    let report = service.analyze(&request).unwrap();
    let outcome = &report.outcome;

    // DUMMY dropped; L 9025 US kept though it never logged an hour-meter
    assert_eq!(outcome.aggregates.len(), 4);
    assert_eq!(report.quality.dropped_master_rows, 1);

    let rs01 = find(outcome, "RS01");
    let rs02 = find(outcome, "RS02");
    assert_eq!(rs01.group, "Reach Stacker");
    assert_eq!(rs01.fuel_ratio, Some(5.0));
    assert_eq!(rs02.fuel_ratio, Some(10.0));
    assert_eq!(rs01.benchmark, Some(7.5));
    assert_eq!(rs01.status, EfficiencyStatus::Efficient);
    assert_eq!(rs02.status, EfficiencyStatus::Wasteful);
    assert!((rs02.potential_waste - 2.5 * 30.0).abs() < 1e-9);
    assert_eq!(rs01.location.as_deref(), Some("Tanjung Perak"));

    let fl03 = find(outcome, "FL03");
    // first-day litres count even without a delta
    assert_eq!(fl03.total_fuel, 30.0);
    assert_eq!(fl03.status, EfficiencyStatus::Inactive);
    assert_eq!(fl03.inactive_reason, Some(InactiveReason::NoWork));
    assert_eq!(fl03.brand, "MITSUBISHI");
    assert_eq!(fl03.capacity, 5);
    assert_eq!(fl03.potential_waste, 0.0);

    // fuel logged without any hour-meter
    let truck = find(outcome, "L9025US");
    assert_eq!(truck.total_fuel, 60.0);
    assert_eq!(truck.total_work, 0.0);
    assert_eq!(truck.inactive_reason, Some(InactiveReason::NoWork));
    assert_eq!(truck.capacity, 40);

    assert!(report.quality.unmatched_names.contains("X 999"));
    assert_eq!(report.quality.excluded_columns, 2);
    assert_eq!(report.quality.rejected_deltas, 0);

    let text = report.render_text();
    assert!(text.contains("hm-daily"));
    assert!(text.contains("X 999"));
}

#[test]
fn test_ceiling_discards_large_deltas() {
    let fx = fixture();
    let mut service = AnalysisService::new(Config::default()).unwrap();
    let request = AnalysisRequest::new(&fx.fuel, &fx.master)
        .with_preset("hm-daily")
        .with_ceiling(15.0);
    let report = service.analyze(&request).unwrap();

    // RS 02's 20-hour day is rejected, not clamped; its 200 litres still count
    let rs02 = find(&report.outcome, "RS02");
    assert_eq!(rs02.total_work, 10.0);
    assert_eq!(rs02.total_fuel, 300.0);
    assert_eq!(rs02.fuel_ratio, Some(30.0));
    assert_eq!(report.quality.rejected_deltas, 1);
    assert_eq!(report.ceiling, 15.0);
}

#[test]
fn test_presets_share_parsed_workbooks() {
    let fx = fixture();
    let mut service = AnalysisService::new(Config::default()).unwrap();
    let base = AnalysisRequest::new(&fx.fuel, &fx.master);

    let capacity = service.analyze(&base.clone().with_preset("hm-capacity")).unwrap();
    assert_eq!(find(&capacity.outcome, "RS01").group, "REACH STACKER (45T)");
    let power = service.analyze(&base.with_preset("hm-power")).unwrap();
    assert_eq!(find(&power.outcome, "RS01").group, "250 HP");

    let stats = service.cache_stats();
    assert_eq!(stats.misses, 2);
    assert_eq!(stats.hits, 2);
}

#[test]
fn test_ton_km_preset_with_csv_work_log() {
    let fx = fixture();
    let work_log = fx.root.join("dooring.csv");
    std::fs::write(
        &work_log,
        "NOPOL,TANGGAL,TON_KM\nL 9025 US,01-10-2025,100\nL 9025 US,02-10-2025,200\nRS 01,02-10-2025,50\n",
    )
    .unwrap();

    let mut service = AnalysisService::new(Config::default()).unwrap();
    let request = AnalysisRequest::new(&fx.fuel, &fx.master)
        .with_preset("ton-km")
        .with_work_log(work_log);
    let report = service.analyze(&request).unwrap();

    // Trucking scope only
    assert_eq!(report.outcome.aggregates.len(), 1);
    let truck = find(&report.outcome, "L9025US");
    assert_eq!(truck.total_fuel, 60.0);
    assert_eq!(truck.total_work, 300.0);
    assert_eq!(truck.fuel_ratio, Some(0.2));
    assert_eq!(truck.group, "Seluruh Armada");
    assert_eq!(truck.status, EfficiencyStatus::Efficient);
}

#[test]
fn test_kpi_preset_groups_by_external_label() {
    let fx = fixture();
    let kpi = fx.root.join("kpi.csv");
    std::fs::write(&kpi, "NAMA UNIT,GROUP KPI\nRS 01,Alat Besar\nRS 02,Alat Besar\n").unwrap();

    let mut service = AnalysisService::new(Config::default()).unwrap();
    let request = AnalysisRequest::new(&fx.fuel, &fx.master)
        .with_preset("kpi")
        .with_kpi_groups(kpi);
    let report = service.analyze(&request).unwrap();
    assert_eq!(find(&report.outcome, "RS02").group, "Alat Besar");
    assert_eq!(find(&report.outcome, "FL03").group, "Lainnya");
    assert_eq!(report.outcome.group("Alat Besar").unwrap().benchmark(), 7.5);
}

#[test]
fn test_trend_resolves_free_text_name() {
    let fx = fixture();
    let mut service = AnalysisService::new(Config::default()).unwrap();
    let request = AnalysisRequest::new(&fx.fuel, &fx.master).with_preset("hm-daily");

    let trend = service.trend(&request, "rs 02").unwrap().unwrap();
    assert_eq!(trend.unit, "RS02");
    assert_eq!(trend.points.len(), 1);
    assert_eq!(trend.points[0].period.to_string(), "2025-10");
    assert_eq!(trend.points[0].ratio, 10.0);

    assert!(service.trend(&request, "CRANE 99").unwrap().is_none());
}

#[test]
fn test_unusable_master_matches_nothing() {
    let fx = fixture();
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Sheet2").unwrap();
    sheet.write_string(1, 0, "NO").unwrap();
    sheet.write_string(1, 1, "KETERANGAN").unwrap();
    let master = fx.root.join("master_rusak.xlsx");
    workbook.save(&master).unwrap();

    let mut service = AnalysisService::new(Config::default()).unwrap();
    let request = AnalysisRequest::new(&fx.fuel, &master).with_preset("hm-daily");
    let report = service.analyze(&request).unwrap();

    assert!(report.outcome.aggregates.is_empty());
    assert!(report.trends.is_empty());
    assert!(report.quality.skipped_sheets.iter().any(|s| s.sheet == "Sheet2"));
    for name in ["RS 01", "RS-02", "FL 03", "L.9025/US"] {
        assert!(report.quality.unmatched_names.contains(name), "{} should be unmatched", name);
    }
}

#[test]
fn test_missing_fuel_file_is_fatal() {
    let fx = fixture();
    let mut service = AnalysisService::new(Config::default()).unwrap();
    let request = AnalysisRequest::new(fx.root.join("missing.xlsx"), &fx.master);
    assert!(matches!(service.analyze(&request), Err(Error::FileNotFound(_))));
}

#[test]
fn test_export_workbook_columns() {
    let fx = fixture();
    let mut service = AnalysisService::new(Config::default()).unwrap();
    let request = AnalysisRequest::new(&fx.fuel, &fx.master)
        .with_preset("hm-daily")
        .with_fuel_price(10000.0);
    let report = service.analyze(&request).unwrap();

    let out = fx.root.join("hasil.xlsx");
    export_to_excel(&report, &out).unwrap();

    let mut book: Xlsx<_> = open_workbook(&out).unwrap();
    assert_eq!(
        book.sheet_names().to_vec(),
        vec!["Unit_Aktif", "Unit_Inaktif", "Data_Bulanan", "Data_Quality"]
    );

    let active = book.worksheet_range("Unit_Aktif").unwrap();
    assert_eq!(active.get_value((0, 8)), Some(&Data::String("Total_HM_Work".to_string())));
    assert_eq!(active.get_value((0, 11)), Some(&Data::String("Performance_Status".to_string())));
    assert_eq!(active.get_value((2, 0)), Some(&Data::String("RS 02".to_string())));
    assert_eq!(active.get_value((2, 11)), Some(&Data::String("BOROS".to_string())));
    assert_eq!(active.get_value((2, 13)), Some(&Data::Float(750000.0)));

    let inactive = book.worksheet_range("Unit_Inaktif").unwrap();
    assert_eq!(inactive.get_value((0, 10)), Some(&Data::String("Keterangan".to_string())));
    assert_eq!(inactive.height(), 3);

    let monthly = book.worksheet_range("Data_Bulanan").unwrap();
    assert_eq!(monthly.get_value((1, 1)), Some(&Data::String("Oktober 2025".to_string())));

    // monthly rows carry the same display names as the unit sheets
    let column_a = |range: &calamine::Range<Data>| -> Vec<String> {
        range.rows().skip(1).map(|r| r[0].to_string()).collect()
    };
    let mut unit_names = column_a(&active);
    unit_names.extend(column_a(&inactive));
    let monthly_names = column_a(&monthly);
    assert!(monthly_names.contains(&"RS 01".to_string()));
    assert!(monthly_names.iter().all(|n| unit_names.contains(n)), "{:?}", monthly_names);
}
