//! Excel export of benchmark results
//!
//! Column names are read by the dashboard and must not change.

use crate::app::AnalysisReport;
use fuelbench_domain::model::UnitAggregate;
use fuelbench_types::{Error, Result};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::collections::BTreeMap;
use std::path::Path;

pub const ACTIVE_SHEET: &str = "Unit_Aktif";
pub const INACTIVE_SHEET: &str = "Unit_Inaktif";
pub const MONTHLY_SHEET: &str = "Data_Bulanan";
pub const QUALITY_SHEET: &str = "Data_Quality";

/// Columns shared by the active and inactive sheets
const UNIT_COLUMNS: [&str; 8] = [
    "Unit_Name",
    "Jenis_Alat",
    "Type_Merk",
    "Horse_Power",
    "Capacity",
    "Lokasi",
    "Benchmark_Group",
    "Total_Liter",
];

fn excel_err(e: XlsxError) -> Error {
    Error::Excel(e.to_string())
}

/// Write the report to an `.xlsx` workbook
pub fn export_to_excel(report: &AnalysisReport, output_path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();

    let active = workbook.add_worksheet();
    write_active_sheet(active, report)?;

    let inactive = workbook.add_worksheet();
    write_inactive_sheet(inactive, report)?;

    let monthly = workbook.add_worksheet();
    write_monthly_sheet(monthly, report)?;

    let quality = workbook.add_worksheet();
    write_quality_sheet(quality, report)?;

    workbook.save(output_path).map_err(excel_err)?;

    Ok(())
}

fn write_headers(sheet: &mut Worksheet, headers: &[&str]) -> Result<()> {
    let header_format = Format::new().set_bold();
    for (col, header) in headers.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, *header, &header_format)
            .map_err(excel_err)?;
    }
    sheet.set_freeze_panes(1, 0).map_err(excel_err)?;
    Ok(())
}

/// Identity and fuel columns (0..=7) of one unit row
fn write_unit_columns(sheet: &mut Worksheet, row: u32, agg: &UnitAggregate) -> Result<()> {
    sheet.write_string(row, 0, &agg.display_name).map_err(excel_err)?;
    sheet.write_string(row, 1, agg.category.label()).map_err(excel_err)?;
    sheet.write_string(row, 2, &agg.brand).map_err(excel_err)?;
    sheet.write_number(row, 3, agg.power_hp).map_err(excel_err)?;
    sheet.write_number(row, 4, agg.capacity as f64).map_err(excel_err)?;
    sheet.write_string(row, 5, agg.location.as_deref().unwrap_or("-")).map_err(excel_err)?;
    sheet.write_string(row, 6, &agg.group).map_err(excel_err)?;
    sheet.write_number(row, 7, agg.total_fuel).map_err(excel_err)?;
    Ok(())
}

fn write_active_sheet(sheet: &mut Worksheet, report: &AnalysisReport) -> Result<()> {
    sheet.set_name(ACTIVE_SHEET).map_err(excel_err)?;

    let mut headers: Vec<&str> = UNIT_COLUMNS.to_vec();
    headers.extend([
        report.basis().work_column(),
        "Fuel_Ratio",
        "Group_Benchmark_Median",
        "Performance_Status",
        "Potensi_Pemborosan_Liter",
        "Estimasi_Kerugian_Rp",
        "Total_Biaya_BBM",
    ]);
    write_headers(sheet, &headers)?;

    let money = Format::new().set_num_format("#,##0");
    let ratio = Format::new().set_num_format("0.00");
    let price = report.fuel_price;

    for (idx, agg) in report.outcome.active().enumerate() {
        let row = (idx + 1) as u32;
        write_unit_columns(sheet, row, agg)?;
        sheet.write_number(row, 8, agg.total_work).map_err(excel_err)?;
        if let Some(r) = agg.fuel_ratio {
            sheet.write_number_with_format(row, 9, r, &ratio).map_err(excel_err)?;
        }
        if let Some(b) = agg.benchmark {
            sheet.write_number_with_format(row, 10, b, &ratio).map_err(excel_err)?;
        }
        sheet.write_string(row, 11, agg.status.label()).map_err(excel_err)?;
        sheet.write_number(row, 12, agg.potential_waste).map_err(excel_err)?;
        sheet
            .write_number_with_format(row, 13, agg.estimated_loss(price), &money)
            .map_err(excel_err)?;
        sheet
            .write_number_with_format(row, 14, agg.fuel_cost(price), &money)
            .map_err(excel_err)?;
    }

    sheet.set_column_width(0, 28).map_err(excel_err)?;
    sheet.set_column_width(6, 30).map_err(excel_err)?;
    Ok(())
}

fn write_inactive_sheet(sheet: &mut Worksheet, report: &AnalysisReport) -> Result<()> {
    sheet.set_name(INACTIVE_SHEET).map_err(excel_err)?;

    let mut headers: Vec<&str> = UNIT_COLUMNS.to_vec();
    headers.extend([report.basis().work_column(), "Performance_Status", "Keterangan"]);
    write_headers(sheet, &headers)?;

    for (idx, agg) in report.outcome.inactive().enumerate() {
        let row = (idx + 1) as u32;
        write_unit_columns(sheet, row, agg)?;
        sheet.write_number(row, 8, agg.total_work).map_err(excel_err)?;
        sheet.write_string(row, 9, agg.status.label()).map_err(excel_err)?;
        let reason = agg.inactive_reason.map(|r| r.description()).unwrap_or("-");
        sheet.write_string(row, 10, reason).map_err(excel_err)?;
    }

    sheet.set_column_width(0, 28).map_err(excel_err)?;
    sheet.set_column_width(10, 40).map_err(excel_err)?;
    Ok(())
}

fn write_monthly_sheet(sheet: &mut Worksheet, report: &AnalysisReport) -> Result<()> {
    sheet.set_name(MONTHLY_SHEET).map_err(excel_err)?;
    write_headers(
        sheet,
        &[
            "Unit_Name",
            "Bulan",
            "Month_Year",
            "Total_Liter",
            report.basis().work_column(),
            "Fuel_Ratio",
        ],
    )?;

    let names: BTreeMap<&str, &str> = report
        .outcome
        .aggregates
        .iter()
        .map(|a| (a.unit.as_str(), a.display_name.as_str()))
        .collect();

    let mut row = 1u32;
    for trend in &report.trends {
        let name = names.get(trend.unit.as_str()).copied().unwrap_or(trend.unit.as_str());
        for point in &trend.points {
            sheet.write_string(row, 0, name).map_err(excel_err)?;
            sheet.write_string(row, 1, point.period.long_label()).map_err(excel_err)?;
            sheet.write_string(row, 2, point.period.to_string()).map_err(excel_err)?;
            sheet.write_number(row, 3, point.fuel).map_err(excel_err)?;
            sheet.write_number(row, 4, point.work).map_err(excel_err)?;
            sheet.write_number(row, 5, point.ratio).map_err(excel_err)?;
            row += 1;
        }
    }
    Ok(())
}

fn write_quality_sheet(sheet: &mut Worksheet, report: &AnalysisReport) -> Result<()> {
    sheet.set_name(QUALITY_SHEET).map_err(excel_err)?;
    write_headers(sheet, &["Item", "Nilai"])?;

    let quality = &report.quality;
    let counts = [
        ("Nama tidak cocok", quality.unmatched_names.len()),
        ("Sheet dilewati", quality.skipped_sheets.len()),
        ("Kolom non-alat", quality.excluded_columns),
        ("Sel non-angka", quality.non_numeric_cells),
        ("Baris tanpa tanggal", quality.undated_rows),
        ("Baris master dibuang", quality.dropped_master_rows),
        ("Delta ditolak", quality.rejected_deltas),
    ];
    let mut row = 1u32;
    for (label, value) in counts {
        sheet.write_string(row, 0, label).map_err(excel_err)?;
        sheet.write_number(row, 1, value as f64).map_err(excel_err)?;
        row += 1;
    }

    row += 1;
    for name in &quality.unmatched_names {
        sheet.write_string(row, 0, "Nama tidak cocok").map_err(excel_err)?;
        sheet.write_string(row, 1, name).map_err(excel_err)?;
        row += 1;
    }
    for skipped in &quality.skipped_sheets {
        sheet
            .write_string(row, 0, format!("Sheet dilewati: {}", skipped.sheet))
            .map_err(excel_err)?;
        sheet.write_string(row, 1, &skipped.reason).map_err(excel_err)?;
        row += 1;
    }

    sheet.set_column_width(0, 30).map_err(excel_err)?;
    sheet.set_column_width(1, 40).map_err(excel_err)?;
    Ok(())
}
