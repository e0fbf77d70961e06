//! Hive list search and radius filtering.

use serde::{Deserialize, Serialize};
use shared::Coordinates;
use tracing::debug;

use crate::models::HiveRecord;

/// Active criteria for the hive list. Unset criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HiveFilter {
    pub query: Option<String>,
    #[serde(rename = "locationRadius")]
    pub radius_km: Option<f64>,
}

impl HiveFilter {
    pub fn new(query: Option<String>, radius_km: Option<f64>) -> Self {
        Self { query, radius_km }
    }

    fn normalized_query(&self) -> Option<String> {
        self.query
            .as_deref()
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase)
    }

    /// Whether the radius criterion is actually enforced for this origin.
    /// A radius without a known origin is skipped.
    pub fn radius_applies(&self, origin: Option<Coordinates>) -> bool {
        self.radius_km.is_some() && origin.is_some()
    }

    /// Number of filters shown as active (radius only; search is separate).
    pub fn active_filter_count(&self) -> usize {
        usize::from(self.radius_km.is_some())
    }

    pub fn matches(&self, hive: &HiveRecord, origin: Option<Coordinates>) -> bool {
        if let (Some(radius), Some(origin)) = (self.radius_km, origin) {
            if origin.distance_to(&hive.coordinates()) > radius {
                return false;
            }
        }

        match self.normalized_query() {
            Some(query) => {
                hive.hive_id.to_lowercase().contains(&query)
                    || hive.num_colonies.to_string().contains(&query)
            }
            None => true,
        }
    }
}

/// Returns the hives passing every active criterion, in input order.
pub fn filter(hives: &[HiveRecord], criteria: &HiveFilter, origin: Option<Coordinates>) -> Vec<HiveRecord> {
    if criteria.radius_km.is_some() && origin.is_none() {
        debug!("Radius filter set without a known origin; radius not enforced");
    }
    hives
        .iter()
        .filter(|hive| criteria.matches(hive, origin))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use shared::distance_km;

    fn hive(id: &str, colonies: u32, lat: f64, lon: f64) -> HiveRecord {
        HiveRecord {
            hive_id: id.to_string(),
            date_placed: Utc.with_ymd_and_hms(2025, 4, 1, 9, 0, 0).unwrap(),
            num_colonies: colonies,
            latitude: lat,
            longitude: lon,
        }
    }

    fn ids(hives: &[HiveRecord]) -> Vec<&str> {
        hives.iter().map(|h| h.hive_id.as_str()).collect()
    }

    #[test]
    fn test_no_criteria_passes_everything() {
        let hives = vec![hive("A12", 2, 0.0, 0.0), hive("B3", 5, 10.0, 10.0)];
        let result = filter(&hives, &HiveFilter::default(), None);
        assert_eq!(ids(&result), vec!["A12", "B3"]);
    }

    #[test]
    fn test_query_matches_id_substring() {
        let hives = vec![hive("A12", 2, 0.0, 0.0), hive("B3", 5, 0.0, 0.0)];
        let result = filter(&hives, &HiveFilter::new(Some("A1".into()), None), None);
        assert_eq!(ids(&result), vec!["A12"]);
    }

    #[test]
    fn test_query_is_case_insensitive() {
        let hives = vec![hive("North-Field", 2, 0.0, 0.0), hive("B3", 5, 0.0, 0.0)];
        let result = filter(&hives, &HiveFilter::new(Some("nORTH".into()), None), None);
        assert_eq!(ids(&result), vec!["North-Field"]);
    }

    #[test]
    fn test_query_matches_colony_count() {
        let hives = vec![hive("A", 12, 0.0, 0.0), hive("B", 3, 0.0, 0.0), hive("C", 1, 0.0, 0.0)];
        let result = filter(&hives, &HiveFilter::new(Some("1".into()), None), None);
        assert_eq!(ids(&result), vec!["A", "C"]);
    }

    #[test]
    fn test_empty_query_is_inactive() {
        let hives = vec![hive("A", 12, 0.0, 0.0)];
        let result = filter(&hives, &HiveFilter::new(Some(String::new()), None), None);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_radius_excludes_far_and_includes_boundary() {
        let origin = Coordinates::new(0.0, 0.0);
        let boundary = hive("edge", 1, 0.0, 1.0);
        let radius = distance_km(0.0, 0.0, 0.0, 1.0);
        let hives = vec![hive("near", 1, 0.0, 0.5), boundary, hive("far", 1, 0.0, 2.0)];

        let result = filter(&hives, &HiveFilter::new(None, Some(radius)), Some(origin));
        assert_eq!(ids(&result), vec!["near", "edge"]);
    }

    #[test]
    fn test_radius_without_origin_is_skipped() {
        let criteria = HiveFilter::new(None, Some(1.0));
        let hives = vec![hive("A", 1, 50.0, 50.0)];
        assert_eq!(filter(&hives, &criteria, None).len(), 1);
        assert!(!criteria.radius_applies(None));
        assert!(criteria.radius_applies(Some(Coordinates::new(0.0, 0.0))));
    }

    #[test]
    fn test_criteria_are_anded() {
        let origin = Coordinates::new(0.0, 0.0);
        let hives = vec![
            hive("A1-near", 1, 0.0, 0.1),
            hive("A1-far", 1, 0.0, 5.0),
            hive("B2-near", 1, 0.0, 0.1),
        ];
        let criteria = HiveFilter::new(Some("a1".into()), Some(50.0));
        assert_eq!(ids(&filter(&hives, &criteria, Some(origin))), vec!["A1-near"]);
    }

    #[test]
    fn test_active_filter_count() {
        assert_eq!(HiveFilter::default().active_filter_count(), 0);
        assert_eq!(HiveFilter::new(None, Some(3.0)).active_filter_count(), 1);
    }
}
