use crate::models::Category;

/// Bedroom / bathroom count filter parsed from a listing query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountFilter {
    /// No constraint ("All", empty, or anything unrecognized).
    #[default]
    Any,
    /// Exactly zero bedrooms.
    Studio,
    /// Exactly this many.
    Exact(u32),
    /// This many or more ("3+").
    AtLeast(u32),
}

impl CountFilter {
    /// Parse a bedroom token. "Studio" is only meaningful here.
    pub fn beds(token: &str) -> Self {
        Self::parse(token, true)
    }

    /// Parse a bathroom token.
    pub fn baths(token: &str) -> Self {
        Self::parse(token, false)
    }

    fn parse(token: &str, studio: bool) -> Self {
        let token = token.trim();
        if token.is_empty() || token.eq_ignore_ascii_case("all") {
            return CountFilter::Any;
        }
        if studio && token.eq_ignore_ascii_case("studio") {
            return CountFilter::Studio;
        }
        if let Some(base) = token.strip_suffix('+') {
            if let Ok(n) = base.trim().parse::<u32>() {
                return CountFilter::AtLeast(n);
            }
        }
        if let Ok(n) = token.parse::<u32>() {
            return CountFilter::Exact(n);
        }
        // Malformed tokens fall back to matching everything rather than
        // silently emptying the result list.
        CountFilter::Any
    }

    /// Does a listing with `count` rooms satisfy this filter?
    pub fn matches(&self, count: u32) -> bool {
        match self {
            CountFilter::Any => true,
            CountFilter::Studio => count == 0,
            CountFilter::Exact(n) => count == *n,
            CountFilter::AtLeast(n) => count >= *n,
        }
    }
}

/// Ordering applied after filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Newest first. The default.
    #[default]
    Recent,
    PriceDesc,
    PriceAsc,
    BedroomsDesc,
    BedroomsAsc,
    /// Unrecognized key: leave the filtered order untouched.
    Unordered,
}

impl SortKey {
    pub fn parse(token: &str) -> Self {
        match token {
            "recent" => SortKey::Recent,
            "price-desc" => SortKey::PriceDesc,
            "price-asc" => SortKey::PriceAsc,
            "bedrooms-desc" => SortKey::BedroomsDesc,
            "bedrooms-asc" => SortKey::BedroomsAsc,
            _ => SortKey::Unordered,
        }
    }
}

/// Everything a listing query can constrain. All filters combine with AND;
/// an absent filter matches every listing.
#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    /// Page-level category, set by the caller rather than the query string.
    pub category: Option<Category>,
    /// Case-insensitive substring over address, state, country and title.
    pub location: Option<String>,
    /// Exact match against the listing's property type.
    pub property_type: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub beds: CountFilter,
    pub baths: CountFilter,
    /// Every named amenity must be present on the listing.
    pub amenities: Vec<String>,
    pub sort: SortKey,
}

impl SearchParams {
    /// Parse the browser-style query string of a listing page. Unknown keys
    /// and empty values are ignored; malformed numbers leave their filter
    /// unset.
    pub fn from_query(query: &str) -> Self {
        let mut params = SearchParams::default();
        for pair in query.trim_start_matches('?').split('&') {
            let Some((key, raw)) = pair.split_once('=') else {
                continue;
            };
            let value = decode(raw);
            if value.is_empty() {
                continue;
            }
            match key {
                "location" => params.location = Some(value),
                "propertyType" => params.property_type = Some(value),
                "minPrice" => {
                    params.min_price = value.parse::<f64>().ok().filter(|v| v.is_finite())
                }
                "maxPrice" => {
                    params.max_price = value.parse::<f64>().ok().filter(|v| v.is_finite())
                }
                "beds" => params.beds = CountFilter::beds(&value),
                "baths" => params.baths = CountFilter::baths(&value),
                "amenities" => {
                    params.amenities = value
                        .split(',')
                        .map(str::trim)
                        .filter(|a| !a.is_empty())
                        .map(str::to_string)
                        .collect();
                }
                "sort" => params.sort = SortKey::parse(&value),
                _ => {}
            }
        }
        params
    }
}

/// Form-style decoding: '+' is a space, then percent-escapes.
fn decode(raw: &str) -> String {
    let plus_as_space = raw.replace('+', " ");
    match urlencoding::decode(&plus_as_space) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => plus_as_space,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_query() {
        let params = SearchParams::from_query(
            "?location=palm+jumeirah&propertyType=Villa&minPrice=1000000&maxPrice=5000000\
             &beds=3%2B&baths=2&amenities=Pool,%20Gym&sort=price-asc",
        );
        assert_eq!(params.location.as_deref(), Some("palm jumeirah"));
        assert_eq!(params.property_type.as_deref(), Some("Villa"));
        assert_eq!(params.min_price, Some(1_000_000.0));
        assert_eq!(params.max_price, Some(5_000_000.0));
        assert_eq!(params.beds, CountFilter::AtLeast(3));
        assert_eq!(params.baths, CountFilter::Exact(2));
        assert_eq!(params.amenities, vec!["Pool", "Gym"]);
        assert_eq!(params.sort, SortKey::PriceAsc);
    }

    #[test]
    fn malformed_numbers_leave_filter_unset() {
        let params = SearchParams::from_query("minPrice=abc&maxPrice=NaN");
        assert_eq!(params.min_price, None);
        assert_eq!(params.max_price, None);
    }

    #[test]
    fn empty_values_and_unknown_keys_are_ignored() {
        let params = SearchParams::from_query("?location=&page=3&utm_source=mail");
        assert_eq!(params.location, None);
        assert_eq!(params.beds, CountFilter::Any);
    }

    #[test]
    fn bed_tokens() {
        assert_eq!(CountFilter::beds("All"), CountFilter::Any);
        assert_eq!(CountFilter::beds("Studio"), CountFilter::Studio);
        assert_eq!(CountFilter::beds("studio"), CountFilter::Studio);
        assert_eq!(CountFilter::beds("2"), CountFilter::Exact(2));
        assert_eq!(CountFilter::beds("4+"), CountFilter::AtLeast(4));
        assert_eq!(CountFilter::beds("lots"), CountFilter::Any);
        // Bathrooms have no studio notion.
        assert_eq!(CountFilter::baths("Studio"), CountFilter::Any);
    }

    #[test]
    fn count_filter_matching() {
        assert!(CountFilter::Any.matches(7));
        assert!(CountFilter::Studio.matches(0));
        assert!(!CountFilter::Studio.matches(1));
        assert!(CountFilter::Exact(2).matches(2));
        assert!(!CountFilter::Exact(2).matches(3));
        assert!(CountFilter::AtLeast(3).matches(3));
        assert!(CountFilter::AtLeast(3).matches(5));
        assert!(!CountFilter::AtLeast(3).matches(2));
    }

    #[test]
    fn unrecognized_sort_keys_leave_order_alone() {
        assert_eq!(SortKey::parse("recent"), SortKey::Recent);
        assert_eq!(SortKey::parse("price-desc"), SortKey::PriceDesc);
        assert_eq!(SortKey::parse("alphabetical"), SortKey::Unordered);
        assert_eq!(SortKey::parse(""), SortKey::Unordered);
    }
}
