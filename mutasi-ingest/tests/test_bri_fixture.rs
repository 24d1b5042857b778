use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveTime};
use mutasi_core::{BoundingBox, CheckOutcome, Document, Page, Token, summary_keys};
use mutasi_ingest::{Layout, LayoutRegistry, StatementParser, layouts};

// Column anchors inside the BRI bands.
const DATE: f64 = 10.0;
const DESC: f64 = 110.0;
const TELLER: f64 = 300.0;
const DEBIT: f64 = 380.0;
const CREDIT: f64 = 480.0;
const BALANCE: f64 = 580.0;

/// Words of `text` laid out from `x` the way a text extractor reports them.
fn cell(out: &mut Vec<Token>, page: usize, x: f64, y: f64, text: &str) {
    let mut x0 = x;
    for word in text.split_whitespace() {
        let width = 5.0 * word.len() as f64;
        out.push(Token::new(word, BoundingBox::new(x0, x0 + width, y, y + 8.0), page));
        x0 += width + 4.0;
    }
}

fn row(out: &mut Vec<Token>, page: usize, y: f64, cells: &[(f64, &str)]) {
    for (x, text) in cells {
        cell(out, page, *x, y, text);
    }
}

fn header(out: &mut Vec<Token>, page: usize, y: f64) {
    row(
        out,
        page,
        y,
        &[
            (DATE, "Tanggal Transaksi"),
            (DESC, "Uraian Transaksi"),
            (TELLER, "Teller"),
            (DEBIT, "Debet"),
            (CREDIT, "Kredit"),
            (BALANCE, "Saldo"),
        ],
    );
}

fn statement() -> Document {
    let mut p0 = Vec::new();
    row(&mut p0, 0, 20.0, &[(DESC, "PT. BANK RAKYAT INDONESIA (PERSERO) Tbk.")]);
    row(
        &mut p0,
        0,
        40.0,
        &[(DATE, "Tanggal Laporan : 03/06/25"), (350.0, "No. Rekening : 0123-01-000000-50-1")],
    );
    row(
        &mut p0,
        0,
        55.0,
        &[(DATE, "Periode Transaksi : 01/05/25 - 31/05/25"), (350.0, "Nama Produk : Britama-IDR")],
    );
    row(&mut p0, 0, 70.0, &[(DATE, "Unit Kerja : KCP SUCI"), (350.0, "Valuta : IDR")]);
    header(&mut p0, 0, 100.0);
    row(
        &mut p0,
        0,
        120.0,
        &[
            (DATE, "01/05/25 08:12:33"),
            (DESC, "TRANSFER DARI"),
            (TELLER, "8888"),
            (DEBIT, "0.00"),
            (CREDIT, "150,000.00"),
            (BALANCE, "1,150,000.00"),
        ],
    );
    row(&mut p0, 0, 132.0, &[(DESC, "BUDI SANTOSO")]);
    row(
        &mut p0,
        0,
        150.0,
        &[
            (DATE, "02/05/25"),
            (DESC, "BIAYA ADMIN"),
            (DEBIT, "12,500.00"),
            (CREDIT, "0.00"),
            (BALANCE, "1,137,500.00"),
        ],
    );
    row(
        &mut p0,
        0,
        170.0,
        &[
            (DATE, "03/05/25 10:00:00"),
            (DESC, "TARIK TUNAI ATM"),
            (DEBIT, "37,500.00"),
            (BALANCE, "1,100,000.00"),
        ],
    );

    let mut p1 = Vec::new();
    header(&mut p1, 1, 100.0);
    row(&mut p1, 1, 120.0, &[(DESC, "LOKASI BANDUNG")]);
    row(
        &mut p1,
        1,
        140.0,
        &[
            (DATE, "04/05/25 09:00:00"),
            (DESC, "SETORAN"),
            (CREDIT, "50,000.00"),
            (BALANCE, "1,150,000.00"),
        ],
    );
    row(
        &mut p1,
        1,
        155.0,
        &[
            (DATE, "14:20"),
            (DESC, "QRIS MERCHANT"),
            (DEBIT, "50,000.00"),
            (BALANCE, "1,100,000.00"),
        ],
    );
    row(
        &mut p1,
        1,
        200.0,
        &[
            (DATE, "Saldo Awal"),
            (DESC, "Total Transaksi Debet"),
            (CREDIT, "Total Transaksi Kredit"),
            (BALANCE, "Saldo Akhir"),
        ],
    );
    row(
        &mut p1,
        1,
        215.0,
        &[
            (DATE, "1,000,000.00"),
            (DESC, "100,000.00"),
            (CREDIT, "200,000.00"),
            (BALANCE, "1,100,000.00"),
        ],
    );
    row(&mut p1, 1, 230.0, &[(DATE, "Terbilang : SATU JUTA SERATUS RIBU RUPIAH")]);
    row(
        &mut p1,
        1,
        250.0,
        &[(DATE, "05/05/25"), (DESC, "AFTER TRAILER"), (DEBIT, "1.00"), (BALANCE, "1.00")],
    );

    Document::new(vec![Page::new(0, p0), Page::new(1, p1)])
}

fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap()
}

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, d).unwrap()
}

#[test]
fn test_transactions_in_document_order() {
    let result = StatementParser::bri().unwrap().parse(&statement()).unwrap();
    let txns = &result.transactions;

    let summary: Vec<(NaiveDate, &str)> = txns.iter().map(|t| (t.date, t.description.as_str())).collect();
    assert_eq!(
        summary,
        vec![
            (date(1), "TRANSFER DARI BUDI SANTOSO"),
            (date(2), "BIAYA ADMIN"),
            (date(3), "TARIK TUNAI ATM LOKASI BANDUNG"),
            (date(4), "SETORAN"),
            (date(4), "QRIS MERCHANT"),
        ]
    );

    assert_eq!(txns[0].time, NaiveTime::from_hms_opt(8, 12, 33));
    assert_eq!(txns[0].teller.as_deref(), Some("8888"));
    assert_eq!(txns[0].credit, dec("150000"));
    assert_eq!(txns[1].time, None);
    assert_eq!(txns[1].debit, dec("12500"));
    assert_eq!(txns[4].time, NaiveTime::from_hms_opt(14, 20, 0));
    assert_eq!(txns[4].balance, Some(dec("1100000")));
}

#[test]
fn test_page_seam_keeps_wrapped_transaction_whole() {
    let result = StatementParser::bri().unwrap().parse(&statement()).unwrap();
    let wrapped = &result.transactions[2];
    assert_eq!(wrapped.page, 0);
    assert_eq!(wrapped.description, "TARIK TUNAI ATM LOKASI BANDUNG");
    assert_eq!(result.transactions[3].page, 1);
}

#[test]
fn test_side_invariant() {
    let result = StatementParser::bri().unwrap().parse(&statement()).unwrap();
    let zero = BigDecimal::from(0);
    for t in &result.transactions {
        assert!(t.debit >= zero && t.credit >= zero);
        assert!(!(t.debit > zero && t.credit > zero), "{t:?}");
    }
}

#[test]
fn test_metadata() {
    let meta = StatementParser::bri().unwrap().parse(&statement()).unwrap().metadata;
    assert_eq!(meta.statement_date, NaiveDate::from_ymd_opt(2025, 6, 3));
    assert_eq!(meta.transaction_period_start, Some(date(1)));
    assert_eq!(meta.transaction_period_end, Some(date(31)));
    assert_eq!(meta.account_number.as_deref(), Some("0123-01-000000-50-1"));
    assert_eq!(meta.product_name.as_deref(), Some("Britama-IDR"));
    assert_eq!(meta.currency.as_deref(), Some("IDR"));
    assert_eq!(meta.business_unit.as_deref(), Some("KCP SUCI"));
    assert_eq!(meta.bank_name.as_deref(), Some("BRI"));
}

#[test]
fn test_trailer_reconciles() {
    let result = StatementParser::bri().unwrap().parse(&statement()).unwrap();

    assert_eq!(result.summary.get(summary_keys::OPENING_BALANCE), Some(&dec("1000000")));
    assert_eq!(result.summary.get(summary_keys::TOTAL_DEBIT), Some(&result.total_debit()));
    assert_eq!(result.summary.get(summary_keys::TOTAL_CREDIT), Some(&result.total_credit()));
    assert_eq!(
        result.summary.get(summary_keys::CLOSING_BALANCE),
        result.closing_balance()
    );
    assert_eq!(
        result.summary.balance_in_words.as_deref(),
        Some("Terbilang : SATU JUTA SERATUS RIBU RUPIAH")
    );

    let report = &result.reconciliation;
    for key in [summary_keys::TOTAL_DEBIT, summary_keys::TOTAL_CREDIT, summary_keys::CLOSING_BALANCE] {
        assert_eq!(report.check(key).map(|c| &c.outcome), Some(&CheckOutcome::Match), "{key}");
    }
    assert!(report.balance_breaks.is_empty());
    assert!(report.is_reconciled());
}

#[test]
fn test_tampered_amount_is_reported() {
    let mut doc = statement();
    for token in &mut doc.pages[0].tokens {
        if token.text == "12,500.00" {
            token.text = "12,000.00".to_string();
        }
    }

    let result = StatementParser::bri().unwrap().parse(&doc).unwrap();
    let report = &result.reconciliation;
    assert!(!report.is_reconciled());
    assert_eq!(
        report.check(summary_keys::TOTAL_DEBIT).map(|c| &c.outcome),
        Some(&CheckOutcome::Mismatch { delta: dec("-500") })
    );
    assert_eq!(report.balance_breaks.len(), 1);
    assert_eq!(report.balance_breaks[0].index, 1);
}

#[test]
fn test_parse_is_idempotent() {
    let parser = StatementParser::bri().unwrap();
    let doc = statement();
    assert_eq!(parser.parse(&doc).unwrap(), parser.parse(&doc).unwrap());
}

#[test]
fn test_registry_detects_bri() {
    let registry = LayoutRegistry::with_builtin().unwrap();
    let doc = statement();
    assert_eq!(registry.detect(&doc).map(|p| p.bank_name()), Some("BRI"));
    assert_eq!(
        registry.parse(&doc).unwrap(),
        StatementParser::bri().unwrap().parse(&doc).unwrap()
    );
}

#[test]
fn test_document_json_dump_parses_the_same() {
    let doc = statement();
    let json = serde_json::to_string(&doc).unwrap();
    let restored: Document = serde_json::from_str(&json).unwrap();
    let parser = StatementParser::bri().unwrap();
    assert_eq!(parser.parse(&restored).unwrap(), parser.parse(&doc).unwrap());
}

#[test]
fn test_layout_from_toml_parses_the_same() {
    let text = toml::to_string(&layouts::bri()).unwrap();
    let layout: Layout = toml::from_str(&text).unwrap();
    assert_eq!(layout, layouts::bri());

    let doc = statement();
    assert_eq!(
        StatementParser::new(layout).unwrap().parse(&doc).unwrap(),
        StatementParser::bri().unwrap().parse(&doc).unwrap()
    );
}
