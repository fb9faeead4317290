//! Library-level tests for the lookup service over the on-disk layout.

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use dartdex::config::Config;
use dartdex::lookup::DisclosureLookup;
use dartdex::dartdex_core::postprocess::HeaderMode;
use dartdex::dartdex_core::resolve::{MatchTier, Resolution};
use dartdex::dartdex_core::{LookupError, Period};

fn write_record(root: &Path, year: i32, quarter: u8, file: &str, body: serde_json::Value) {
    let dir = root
        .join(year.to_string())
        .join(format!("Q{}", quarter))
        .join("companies");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(file), body.to_string()).unwrap();
}

fn simple(name: &str) -> serde_json::Value {
    serde_json::json!({
        "metadata": {"corp_name": name},
        "api_data": {"api_07": [{"nm": "김철수", "ofcps": "대표이사"}]}
    })
}

fn config(root: &Path) -> Config {
    let mut cfg = Config::with_base_path(root);
    cfg.periods.years = vec![2024, 2025];
    cfg.index.ttl_secs = 0;
    cfg
}

#[test]
fn test_tiers_against_disk() {
    let tmp = TempDir::new().unwrap();
    for (file, name) in [
        ("000010_신한은행.json", "신한은행"),
        ("035720_카카오.json", "카카오"),
        ("323410_카카오뱅크.json", "카카오뱅크"),
        ("005930_삼성전자.json", "삼성전자"),
        ("005380_현대자동차.json", "현대자동차"),
    ] {
        write_record(tmp.path(), 2025, 1, file, simple(name));
    }
    let lookup = DisclosureLookup::from_config(&config(tmp.path()));

    let exact = lookup.resolve("신한은행", 2025, 1).unwrap();
    assert_eq!(exact.tier(), Some(MatchTier::Exact));

    let kakao = lookup.resolve("카카오", 2025, 1).unwrap();
    assert_eq!(kakao.tier(), Some(MatchTier::Exact));
    assert_eq!(kakao.record().unwrap().company_name, "카카오");

    match lookup.resolve("삼성전자우", 2025, 1).unwrap() {
        Resolution::Partial { matched_name, .. } => assert_eq!(matched_name, "삼성전자"),
        other => panic!("expected partial match, got {:?}", other),
    }

    match lookup.resolve("현대차", 2025, 1).unwrap() {
        Resolution::Fuzzy { record, score, .. } => {
            assert_eq!(record.company_name, "현대자동차");
            assert!((score - 0.75).abs() < 1e-9);
        }
        other => panic!("expected fuzzy match, got {:?}", other),
    }

    assert!(!lookup.resolve("네이버", 2025, 1).unwrap().is_found());
}

#[test]
fn test_resolution_is_repeatable() {
    let tmp = TempDir::new().unwrap();
    write_record(tmp.path(), 2025, 2, "035720_카카오.json", simple("카카오"));
    write_record(tmp.path(), 2025, 2, "323410_카카오뱅크.json", simple("카카오뱅크"));
    let lookup = DisclosureLookup::from_config(&config(tmp.path()));

    let first = lookup.resolve("카카", 2025, 2).unwrap();
    let second = lookup.resolve("카카", 2025, 2).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_missing_and_empty_periods() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("2025/Q3/companies")).unwrap();
    let lookup = DisclosureLookup::from_config(&config(tmp.path()));

    let err = lookup.resolve("카카오", 2024, 1).unwrap_err();
    assert!(matches!(err, LookupError::PathNotFound { .. }));

    let res = lookup.resolve("카카오", 2025, 3).unwrap();
    assert!(matches!(res, Resolution::NotFound { .. }));
}

#[test]
fn test_new_file_found_after_index_built() {
    let tmp = TempDir::new().unwrap();
    write_record(tmp.path(), 2025, 1, "035720_카카오.json", simple("카카오"));
    let lookup = DisclosureLookup::from_config(&config(tmp.path()));

    assert!(lookup.resolve("카카오", 2025, 1).unwrap().is_found());
    write_record(tmp.path(), 2025, 1, "000660_SK하이닉스.json", simple("SK하이닉스"));
    assert_eq!(
        lookup.resolve("SK하이닉스", 2025, 1).unwrap().tier(),
        Some(MatchTier::Exact)
    );
}

#[test]
fn test_find_and_load_renders_verbatim_cells() {
    let tmp = TempDir::new().unwrap();
    write_record(
        tmp.path(),
        2025,
        1,
        "005930_삼성전자.json",
        serde_json::json!({
            "metadata": {"corp_name": "삼성전자", "year_quarter": "2025_Q1"},
            "api_data": {
                "api_07": [
                    {"corp_code": "00126380", "nm": "이재용", "ofcps": "회장", "rgist_exctv_at": "미등기"},
                    {"corp_code": "00126380", "nm": "한종희", "ofcps": "부회장", "rgist_exctv_at": "사내이사"}
                ]
            }
        }),
    );
    let lookup = DisclosureLookup::from_config(&config(tmp.path()));

    let loaded = lookup
        .find_and_load("삼성전자", 2025, 1)
        .unwrap()
        .into_record()
        .unwrap();
    let section = &loaded.processed.sections["api_07"];
    assert_eq!(
        section.to_markdown(),
        "## api_07 - 임원현황\n\
         | nm | ofcps | rgist_exctv_at |\n\
         | --- | --- | --- |\n\
         | 이재용 | 회장 | 미등기 |\n\
         | 한종희 | 부회장 | 사내이사 |"
    );
}

#[test]
fn test_first_row_header_mode() {
    let tmp = TempDir::new().unwrap();
    write_record(
        tmp.path(),
        2025,
        1,
        "035720_카카오.json",
        serde_json::json!({
            "api_data": {"api_12": [{"inv_prm": "A"}, {"inv_prm": "B", "frst_acqs_de": "2020.01.01"}]}
        }),
    );
    let mut cfg = config(tmp.path());
    cfg.resolver.header_mode = HeaderMode::FirstRow;
    let lookup = DisclosureLookup::from_config(&cfg);

    let loaded = lookup
        .company_data("카카오", 2025, 1)
        .unwrap()
        .into_record()
        .unwrap();
    let md = loaded.processed.sections["api_12"].to_markdown();
    assert!(md.contains("| inv_prm |\n"));
    assert!(!md.contains("frst_acqs_de"));
}

#[test]
fn test_quarterly_reports_across_periods() {
    let tmp = TempDir::new().unwrap();
    write_record(tmp.path(), 2024, 2, "035720_카카오.json", simple("카카오"));
    write_record(tmp.path(), 2025, 1, "035720_카카오.json", simple("카카오"));
    write_record(tmp.path(), 2024, 3, "005930_삼성전자.json", simple("삼성전자"));
    let lookup = DisclosureLookup::from_config(&config(tmp.path()));

    let target = Period::new(2024, 2).unwrap();
    let listing = lookup.quarterly_reports("카카오", Some(target)).unwrap();
    let periods: Vec<String> = listing.reports.iter().map(|r| r.period.to_string()).collect();
    assert_eq!(periods, vec!["2025Q1", "2024Q2"]);
    assert_eq!(listing.target().unwrap().period, target);

    let err = lookup.quarterly_reports("네이버", None).unwrap_err();
    assert!(matches!(err, LookupError::NotFound { period: None, .. }));
}

#[test]
fn test_disabled_index() {
    let tmp = TempDir::new().unwrap();
    write_record(tmp.path(), 2025, 1, "035720_카카오.json", simple("카카오"));
    let mut cfg = config(tmp.path());
    cfg.index.enabled = false;
    let lookup = DisclosureLookup::from_config(&cfg);
    assert!(lookup.resolve("카카오", 2025, 1).unwrap().is_found());
}
