//! BRI (Bank Rakyat Indonesia) account statement.
//!
//! Expected page shape (pdfplumber/pdftotext word boxes, points):
//!   Tanggal Laporan : 03/06/25          No. Rekening : 0123...
//!   Periode Transaksi : 01/05/25 - 31/05/25
//!   Tanggal Transaksi | Uraian Transaksi | Teller | Debet | Kredit | Saldo
//!   01/05/25 08:12:33   TRANSFER DARI ...  8888    0.00    150,000.00  1,150,000.00
//!                       continuation of the description
//!   Saldo Awal | Total Transaksi Debet | Total Transaksi Kredit | Saldo Akhir
//!   1,000,000.00   50,000.00   150,000.00   1,100,000.00

use mutasi_core::{MetadataField, NumberFormat};

use crate::layout::{
    DEFAULT_DESCRIPTION_SEPARATOR, DEFAULT_HEADER_MARGIN, DEFAULT_LINE_TOLERANCE,
    DEFAULT_TIME_PATTERN, FieldBand, FieldKind, Layout, MetadataLabel,
};

/// Column boundaries: Date | Description | Teller | Debit | Credit | Balance.
pub const COLUMN_BOUNDARIES: [f64; 7] = [0.0, 105.0, 290.0, 360.0, 470.0, 570.0, 700.0];

pub fn bri() -> Layout {
    let kinds = [
        FieldKind::Date,
        FieldKind::Description,
        FieldKind::Teller,
        FieldKind::Debit,
        FieldKind::Credit,
        FieldKind::Balance,
    ];

    Layout {
        bank_name: "BRI".to_string(),
        indicators: [
            "PT. BANK RAKYAT INDONESIA",
            "BRI",
            "Britama",
            "Unit Kerja",
            "Tanggal Laporan",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
        header_label: "Tanggal".to_string(),
        header_margin: DEFAULT_HEADER_MARGIN,
        fallback_table_start: None,
        line_tolerance: DEFAULT_LINE_TOLERANCE,
        bands: FieldBand::from_boundaries(&COLUMN_BOUNDARIES, &kinds),
        // Overflow text spills left of the description column on wrapped rows.
        continuation_fields: vec![FieldKind::Date, FieldKind::Description, FieldKind::Teller],
        description_separator: DEFAULT_DESCRIPTION_SEPARATOR.to_string(),
        date_pattern: r"\d{2}/\d{2}/\d{2}".to_string(),
        date_format: "%d/%m/%y".to_string(),
        time_pattern: DEFAULT_TIME_PATTERN.to_string(),
        number_format: NumberFormat::new(',', '.'),
        summary_markers: vec!["Saldo Awal".to_string(), "Opening Balance".to_string()],
        summary_keys: vec![
            "Opening Balance".to_string(),
            "Total Debit".to_string(),
            "Total Credit".to_string(),
            "Closing Balance".to_string(),
        ],
        words_marker: Some("RUPIAH".to_string()),
        metadata_labels: vec![
            MetadataLabel::new(MetadataField::StatementDate, "Tanggal Laporan"),
            MetadataLabel::new(MetadataField::TransactionPeriod, "Periode Transaksi"),
            MetadataLabel::new(MetadataField::AccountNumber, "No. Rekening"),
            MetadataLabel::new(MetadataField::ProductName, "Nama Produk"),
            MetadataLabel::new(MetadataField::Currency, "Valuta"),
            MetadataLabel::new(MetadataField::BusinessUnit, "Unit Kerja"),
            MetadataLabel::new(MetadataField::BusinessUnitAddress, "Alamat Unit Kerja"),
            MetadataLabel::new(MetadataField::RecipientName, "Kepada Yth."),
        ],
        reconcile_tolerance: Default::default(),
    }
}
