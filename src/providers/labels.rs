use crate::providers::Suggestion;
use serde_json::{Map, Value};

pub const DEFAULT_CITIES: [&str; 11] = [
    "Bengaluru",
    "Mumbai",
    "Delhi NCR",
    "Hyderabad",
    "Chennai",
    "Pune",
    "Kolkata",
    "Ahmedabad",
    "Gurugram",
    "Noida",
    "Other",
];

pub fn default_city_suggestions() -> Vec<Suggestion> {
    DEFAULT_CITIES
        .iter()
        .map(|city| Suggestion {
            id: format!("default-city-{city}"),
            primary: city.to_string(),
            secondary: String::new(),
            full: city.to_string(),
        })
        .collect()
}

/// City label: `name` or `city`, qualified by county, state and country.
/// Features without a usable name are dropped.
pub fn city_suggestion(properties: &Map<String, Value>, index: usize) -> Option<Suggestion> {
    let primary = first_non_blank(&[str_prop(properties, "name"), str_prop(properties, "city")])?;
    let secondary = unique_non_blank(&[
        str_prop(properties, "county"),
        str_prop(properties, "state"),
        str_prop(properties, "country"),
    ]);
    build_suggestion(properties, index, primary, secondary, "photon-city")
}

/// Location label: the most specific of name, street address, street, city
/// or suburb, qualified by postcode, area, county, state and country.
pub fn location_suggestion(properties: &Map<String, Value>, index: usize) -> Option<Suggestion> {
    let street = str_prop(properties, "street");
    let house_number = str_prop(properties, "housenumber");
    let suburb = str_prop(properties, "suburb");
    let city = str_prop(properties, "city");
    let address = join_present(&[house_number, street], " ");
    let area = join_present(&[suburb, city], ", ");

    let primary = first_non_blank(&[str_prop(properties, "name"), address.as_str(), street, city, suburb])
        .unwrap_or("Unknown location");
    let secondary = unique_non_blank(&[
        str_prop(properties, "postcode"),
        area.as_str(),
        str_prop(properties, "county"),
        str_prop(properties, "state"),
        str_prop(properties, "country"),
    ]);
    build_suggestion(properties, index, primary, secondary, "photon-result")
}

fn build_suggestion(
    properties: &Map<String, Value>,
    index: usize,
    primary: &str,
    secondary: Vec<&str>,
    fallback_id: &str,
) -> Option<Suggestion> {
    let secondary_text = secondary.join(", ");
    let full = std::iter::once(primary)
        .chain(secondary.iter().copied())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    if full.trim().is_empty() {
        return None;
    }

    let osm_id = osm_id(properties);
    let secondary_ids = secondary.join(",");
    let id_base = [
        str_prop(properties, "osm_type"),
        osm_id.as_str(),
        primary,
        secondary_ids.as_str(),
    ]
    .iter()
    .map(|part| part.trim())
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join("-");
    let id_base = if id_base.is_empty() {
        fallback_id.to_string()
    } else {
        id_base
    };

    Some(Suggestion {
        id: format!("{id_base}-{index}"),
        primary: primary.to_string(),
        secondary: secondary_text,
        full,
    })
}

fn str_prop<'a>(properties: &'a Map<String, Value>, key: &str) -> &'a str {
    properties.get(key).and_then(Value::as_str).unwrap_or("")
}

fn osm_id(properties: &Map<String, Value>) -> String {
    match properties.get("osm_id") {
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::String(text)) => text.clone(),
        _ => String::new(),
    }
}

fn first_non_blank<'a>(candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .map(|candidate| candidate.trim())
        .find(|candidate| !candidate.is_empty())
}

fn unique_non_blank<'a>(parts: &[&'a str]) -> Vec<&'a str> {
    let mut unique: Vec<&str> = Vec::with_capacity(parts.len());
    for part in parts.iter().map(|part| part.trim()) {
        if !part.is_empty() && !unique.contains(&part) {
            unique.push(part);
        }
    }
    unique
}

fn join_present(parts: &[&str], separator: &str) -> String {
    parts
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn default_cities_have_stable_ids() {
        let defaults = default_city_suggestions();

        assert_eq!(defaults.len(), 11);
        assert_eq!(defaults[0].id, "default-city-Bengaluru");
        assert_eq!(defaults[2].full, "Delhi NCR");
        assert_eq!(defaults[2].secondary, "");
    }

    #[test]
    fn city_label_dedupes_secondary_parts() {
        let properties = props(json!({
            "osm_type": "R",
            "osm_id": 7902476,
            "name": "Bengaluru",
            "county": "Bangalore Urban",
            "state": "Karnataka",
            "country": "India"
        }));

        let suggestion = city_suggestion(&properties, 0).expect("suggestion");

        assert_eq!(suggestion.primary, "Bengaluru");
        assert_eq!(suggestion.secondary, "Bangalore Urban, Karnataka, India");
        assert_eq!(suggestion.full, "Bengaluru, Bangalore Urban, Karnataka, India");
        assert_eq!(
            suggestion.id,
            "R-7902476-Bengaluru-Bangalore Urban,Karnataka,India-0"
        );

        let repeated = props(json!({ "name": "Delhi", "state": "Delhi", "country": "India" }));
        let suggestion = city_suggestion(&repeated, 3).expect("suggestion");
        assert_eq!(suggestion.secondary, "Delhi, India");
        assert_eq!(suggestion.id, "Delhi-Delhi,India-3");
    }

    #[test]
    fn city_without_name_is_dropped() {
        let properties = props(json!({ "name": "  ", "state": "Karnataka", "osm_id": "12" }));

        assert!(city_suggestion(&properties, 0).is_none());
    }

    #[test]
    fn city_falls_back_to_city_property() {
        let properties = props(json!({ "city": "Pune", "name": 42 }));

        let suggestion = city_suggestion(&properties, 1).expect("suggestion");

        assert_eq!(suggestion.primary, "Pune");
        assert_eq!(suggestion.full, "Pune");
    }

    #[test]
    fn location_prefers_name_then_street_address() {
        let named = props(json!({
            "name": "Indiranagar Metro",
            "suburb": "Indiranagar",
            "city": "Bengaluru",
            "postcode": "560038",
            "country": "India"
        }));
        let suggestion = location_suggestion(&named, 0).expect("suggestion");
        assert_eq!(suggestion.primary, "Indiranagar Metro");
        assert_eq!(suggestion.secondary, "560038, Indiranagar, Bengaluru, India");

        let address = props(json!({
            "housenumber": "12",
            "street": "MG Road",
            "city": "Bengaluru"
        }));
        let suggestion = location_suggestion(&address, 1).expect("suggestion");
        assert_eq!(suggestion.primary, "12 MG Road");
        assert_eq!(suggestion.full, "12 MG Road, Bengaluru");
    }

    #[test]
    fn location_without_any_name_is_unknown() {
        let properties = props(json!({}));

        let suggestion = location_suggestion(&properties, 4).expect("suggestion");

        assert_eq!(suggestion.primary, "Unknown location");
        assert_eq!(suggestion.full, "Unknown location");
        assert_eq!(suggestion.id, "Unknown location-4");
    }
}
