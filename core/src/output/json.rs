//! JSON serialization of diff reports.

use crate::fragment::DiffReport;

pub fn serialize_diff_report(report: &DiffReport) -> serde_json::Result<String> {
    serde_json::to_string(report)
}

pub fn serialize_diff_report_pretty(report: &DiffReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::{Fragment, FragmentKind};

    #[test]
    fn report_round_trips() {
        let report = DiffReport::new(vec![
            Fragment::structural(FragmentKind::ContainerStart),
            Fragment::structural(FragmentKind::FragmentStart),
            Fragment::new("a", FragmentKind::Same, None),
            Fragment::new("b", FragmentKind::Insert, None),
            Fragment::structural(FragmentKind::FragmentEnd),
            Fragment::structural(FragmentKind::ContainerEnd),
        ]);
        let json = serialize_diff_report(&report).expect("serialize");
        let parsed: DiffReport = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, report);
    }
}
