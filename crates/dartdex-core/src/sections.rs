//! Catalog of the periodic-report sections a record can carry.
//!
//! The collector stores each disclosure API endpoint under a stable
//! identifier (`api_01` … `api_28`). The catalog maps those identifiers to
//! the endpoint name and a human-readable title. Records may also carry
//! identifiers outside the catalog; those render without a title.

use serde::Serialize;

/// One known section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SectionInfo {
    /// Identifier used as the key in the record (`api_04`).
    pub id: &'static str,
    /// Disclosure API endpoint name (`hyslrSttus`).
    pub endpoint: &'static str,
    /// Human-readable title.
    pub title: &'static str,
}

const fn s(id: &'static str, endpoint: &'static str, title: &'static str) -> SectionInfo {
    SectionInfo {
        id,
        endpoint,
        title,
    }
}

pub const SECTIONS: [SectionInfo; 28] = [
    s("api_01", "irdsSttus", "증자감자현황"),
    s("api_02", "alotMatter", "배당에관한사항"),
    s("api_03", "tesstkAcqsDspsSttus", "자기주식취득및처분현황"),
    s("api_04", "hyslrSttus", "최대주주현황"),
    s("api_05", "hyslrChgSttus", "최대주주변동현황"),
    s("api_06", "mrhlSttus", "소액주주현황"),
    s("api_07", "exctvSttus", "임원현황"),
    s("api_08", "empSttus", "직원현황"),
    s("api_09", "hmvAuditIndvdlBySttus", "이사감사개인별보수현황"),
    s("api_10", "hmvAuditAllSttus", "이사감사전체보수현황"),
    s("api_11", "indvdlByPay", "개인별보수지급금액"),
    s("api_12", "otrCprInvstmntSttus", "타법인출자현황"),
    s("api_13", "stockTotqySttus", "주식의총수현황"),
    s("api_14", "detScritsIsuAcmslt", "채무증권발행실적"),
    s("api_15", "entrprsBilScritsNrdmpBlce", "기업어음증권미상환잔액"),
    s("api_16", "srtpdPsndbtNrdmpBlce", "단기사채미상환잔액"),
    s("api_17", "cprndNrdmpBlce", "회사채미상환잔액"),
    s("api_18", "newCaplScritsNrdmpBlce", "신종자본증권미상환잔액"),
    s("api_19", "cndlCaplScritsNrdmpBlce", "조건부자본증권미상환잔액"),
    s("api_20", "accnutAdtorNmNdAdtOpinion", "회계감사인명칭및감사의견"),
    s("api_21", "adtServcCnclsSttus", "감사용역체결현황"),
    s(
        "api_22",
        "accnutAdtorNonAdtServcCnclsSttus",
        "회계감사인비감사용역체결현황",
    ),
    s("api_23", "outcmpnyDrctrNdChangeSttus", "사외이사및변동현황"),
    s("api_24", "unrstExctvMendngSttus", "미등기임원보수현황"),
    s(
        "api_25",
        "drctrAdtAllMendngSttusGmtsckConfmAmount",
        "이사감사전체보수현황주총승인금액",
    ),
    s(
        "api_26",
        "drctrAdtAllMendngSttusMendngPymntamtTyCl",
        "이사감사전체보수현황보수지급금액유형별",
    ),
    s("api_27", "pssrpCptalUseDtls", "공모자금사용내역"),
    s("api_28", "prvsrpCptalUseDtls", "사모자금사용내역"),
];

/// Looks up a section by identifier, endpoint name, or title.
///
/// The collector has written records keyed both ways over time, so a key
/// like `최대주주현황` resolves to the same entry as `api_04`.
pub fn lookup(key: &str) -> Option<&'static SectionInfo> {
    SECTIONS
        .iter()
        .find(|s| s.id == key || s.endpoint == key || s.title == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_ids_are_sequential() {
        for (i, s) in SECTIONS.iter().enumerate() {
            assert_eq!(s.id, format!("api_{:02}", i + 1));
        }
    }

    #[test]
    fn test_lookup_by_any_key() {
        assert_eq!(lookup("api_04").unwrap().title, "최대주주현황");
        assert_eq!(lookup("hyslrSttus").unwrap().id, "api_04");
        assert_eq!(lookup("직원현황").unwrap().id, "api_08");
        assert!(lookup("api_99").is_none());
    }
}
