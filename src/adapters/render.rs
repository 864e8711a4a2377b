use crate::core::page_state::PageState;
use crate::domain::model::{BranchRecord, ReferenceLocation};
use crate::utils::error::{LocatorError, Result};
use serde::{Deserialize, Serialize};
use url::Url;

pub const LOADING_MESSAGE: &str = "Loading branches...";
pub const EMPTY_STATE: &str = "No branches match your search\nTry adjusting your search terms.";
pub const ERROR_STATE: &str =
    "Unable to load branches\nPlease check your connection or try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

/// Status line above the list.
pub fn results_summary(state: &PageState) -> String {
    let shown = state.visible_records().len();
    if shown == 0 {
        return "No branches found.".to_string();
    }

    if state.has_active_query() || state.reference().is_some() {
        let noun = if shown == 1 { "branch" } else { "branches" };
        format!("Showing {} {}", shown, noun)
    } else {
        let pagination = state.pagination();
        let (start, _) = pagination.display_range();
        // A response without `total` still has to cover what was loaded.
        let end = start.saturating_add(state.records().len() - 1);
        let total = pagination.total_count().max(end);
        let noun = if total == 1 { "branch" } else { "branches" };
        format!("Showing {}-{} of {} {}", start, end, total, noun)
    }
}

/// One list card. Absent fields render empty, never as placeholders.
pub fn render_card(record: &BranchRecord) -> String {
    let mut lines = vec![header_line(record), format!("  {}", record.name)];
    lines.extend(detail_lines(record));
    lines.join("\n")
}

pub fn render_list(records: &[&BranchRecord]) -> String {
    if records.is_empty() {
        return EMPTY_STATE.to_string();
    }

    records
        .iter()
        .enumerate()
        .map(|(i, record)| format!("[{}] {}", i + 1, render_card(record)))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Full detail view with a directions link.
pub fn render_detail(record: &BranchRecord, reference: Option<&ReferenceLocation>) -> String {
    let mut lines = vec![
        record.city.clone().unwrap_or_else(|| "Branch".to_string()),
        record.name.clone(),
    ];
    lines.extend(detail_lines(record));
    if let Some(distance) = record.distance_miles {
        lines.push(format!("  Distance: {:.1} mi", distance));
    }
    lines.push(format!("Get Directions: {}", directions_link(record, reference)));
    lines.join("\n")
}

/// Turn-by-turn link when both ends are known, otherwise a search link for
/// the branch's coordinates or address.
pub fn directions_link(record: &BranchRecord, reference: Option<&ReferenceLocation>) -> String {
    match (reference, record.coordinates.as_ref()) {
        (Some(origin), Some(destination)) => format!(
            "https://www.google.com/maps/dir/?api=1&origin={}&destination={}",
            origin, destination
        ),
        (None, Some(destination)) => format!("https://maps.google.com/?q={}", destination),
        (_, None) => {
            let address = format!("{}, {}", record.street_or_empty(), record.city_or_empty());
            Url::parse_with_params("https://maps.google.com/", &[("q", address.as_str())])
                .map(|url| url.to_string())
                .unwrap_or_else(|_| "https://maps.google.com/".to_string())
        }
    }
}

fn header_line(record: &BranchRecord) -> String {
    let city = record.city.as_deref().unwrap_or("Branch");
    match record.distance_miles {
        Some(distance) => format!("{}  ({:.1} mi)", city, distance),
        None => city.to_string(),
    }
}

fn detail_lines(record: &BranchRecord) -> Vec<String> {
    let mut lines = vec![format!(
        "  {} {}",
        record.street_or_empty(),
        record.city_or_empty()
    )
    .trim_end()
    .to_string()];

    if let Some(phone) = &record.phone {
        lines.push(format!("  Phone: {}", phone));
    }
    if let Some(email) = &record.email {
        lines.push(format!("  Email: {}", email));
    }
    lines
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    name: &'a str,
    city: &'a str,
    street: &'a str,
    phone: &'a str,
    email: &'a str,
    latitude: Option<f64>,
    longitude: Option<f64>,
    distance_miles: Option<f64>,
}

pub fn to_csv(records: &[&BranchRecord]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    for record in records {
        writer.serialize(CsvRow {
            name: &record.name,
            city: record.city_or_empty(),
            street: record.street_or_empty(),
            phone: record.phone.as_deref().unwrap_or(""),
            email: record.email.as_deref().unwrap_or(""),
            latitude: record.coordinates.map(|c| c.latitude),
            longitude: record.coordinates.map(|c| c.longitude),
            distance_miles: record.distance_miles,
        })?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| LocatorError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| {
        LocatorError::IoError(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })
}

pub fn to_json(records: &[&BranchRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pagination::Pagination;
    use crate::domain::model::{Coordinates, FetchedPage};

    fn full_record() -> BranchRecord {
        let mut record = BranchRecord::new("Spring Branch")
            .with_city("Springfield")
            .with_street("742 Evergreen Terrace")
            .with_coordinates(39.78, -89.65);
        record.phone = Some("555-0100".to_string());
        record.email = Some("spring@example.com".to_string());
        record
    }

    fn loaded_state(count: usize, total: usize, page: usize) -> PageState {
        let mut state = PageState::new(Pagination::starting_at(30, page));
        let ticket = state.begin_fetch();
        state.complete_fetch(
            &ticket,
            FetchedPage {
                records: (0..count).map(|i| BranchRecord::new(format!("Branch {}", i))).collect(),
                total,
            },
        );
        state
    }

    #[test]
    fn test_card_with_all_fields() {
        let mut record = full_record();
        record.distance_miles = Some(12.345);

        let card = render_card(&record);
        assert!(card.starts_with("Springfield  (12.3 mi)"));
        assert!(card.contains("Spring Branch"));
        assert!(card.contains("742 Evergreen Terrace Springfield"));
        assert!(card.contains("Phone: 555-0100"));
        assert!(card.contains("Email: spring@example.com"));
    }

    #[test]
    fn test_card_with_only_name_has_no_placeholders() {
        let card = render_card(&BranchRecord::new("Lonely"));
        assert!(card.starts_with("Branch"));
        assert!(card.contains("Lonely"));
        assert!(!card.contains("undefined"));
        assert!(!card.contains("None"));
        assert!(!card.contains("Phone"));
        assert!(!card.contains("Email"));
    }

    #[test]
    fn test_empty_list_renders_empty_state() {
        assert_eq!(render_list(&[]), EMPTY_STATE);
    }

    #[test]
    fn test_list_is_numbered_from_one() {
        let a = BranchRecord::new("A");
        let b = BranchRecord::new("B");
        let list = render_list(&[&a, &b]);
        assert!(list.starts_with("[1] Branch"));
        assert!(list.contains("[2] Branch"));
    }

    #[test]
    fn test_directions_with_reference_location() {
        let reference = ReferenceLocation::new(40.7128, -74.006);
        let link = directions_link(&full_record(), Some(&reference));
        assert_eq!(
            link,
            "https://www.google.com/maps/dir/?api=1&origin=40.7128,-74.006&destination=39.78,-89.65"
        );
    }

    #[test]
    fn test_directions_with_coordinates_only() {
        assert_eq!(directions_link(&full_record(), None), "https://maps.google.com/?q=39.78,-89.65");
    }

    #[test]
    fn test_directions_by_address() {
        let record = BranchRecord::new("No Pin").with_city("Springfield").with_street("1 Main St");
        let link = directions_link(&record, Some(&Coordinates::new(1.0, 1.0)));
        assert_eq!(link, "https://maps.google.com/?q=1+Main+St%2C+Springfield");
    }

    #[test]
    fn test_detail_view() {
        let detail = render_detail(&full_record(), None);
        assert!(detail.starts_with("Springfield\nSpring Branch"));
        assert!(detail.contains("Get Directions: https://maps.google.com/?q=39.78,-89.65"));
    }

    #[test]
    fn test_summary_for_plain_page() {
        let state = loaded_state(30, 95, 2);
        assert_eq!(results_summary(&state), "Showing 31-60 of 95 branches");
    }

    #[test]
    fn test_summary_for_last_partial_page() {
        let state = loaded_state(5, 95, 4);
        assert_eq!(results_summary(&state), "Showing 91-95 of 95 branches");
    }

    #[test]
    fn test_summary_without_reported_total() {
        let state = loaded_state(1, 0, 1);
        assert_eq!(results_summary(&state), "Showing 1-1 of 1 branch");

        let state = loaded_state(12, 0, 2);
        assert_eq!(results_summary(&state), "Showing 31-42 of 42 branches");
    }

    #[test]
    fn test_summary_with_query() {
        let mut state = loaded_state(3, 3, 1);
        state.set_query("branch 1");
        assert_eq!(results_summary(&state), "Showing 1 branch");

        state.set_query("branch");
        assert_eq!(results_summary(&state), "Showing 3 branches");

        state.set_query("zzz");
        assert_eq!(results_summary(&state), "No branches found.");
    }

    #[test]
    fn test_csv_export() {
        let mut record = full_record();
        record.distance_miles = Some(2.5);
        let bare = BranchRecord::new("Bare");

        let csv = to_csv(&[&record, &bare]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "name,city,street,phone,email,latitude,longitude,distance_miles");
        assert_eq!(
            lines[1],
            "Spring Branch,Springfield,742 Evergreen Terrace,555-0100,spring@example.com,39.78,-89.65,2.5"
        );
        assert_eq!(lines[2], "Bare,,,,,,,");
    }

    #[test]
    fn test_json_export_omits_unknown_distance() {
        let json = to_json(&[&full_record()]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["name"], "Spring Branch");
        assert!(value[0].get("distance_miles").is_none());
        assert!(value[0].get("is_hidden_by_filter").is_none());
    }
}
