use crate::models::Property;

use super::params::{SearchParams, SortKey};

/// Filter and order listings for display. Listings come back cloned so the
/// caller's snapshot stays untouched.
pub fn run(listings: &[Property], params: &SearchParams) -> Vec<Property> {
    let mut matched: Vec<Property> = listings
        .iter()
        .filter(|property| matches(property, params))
        .cloned()
        .collect();
    sort(&mut matched, params.sort);
    matched
}

/// All active filters must pass for a listing to survive.
fn matches(property: &Property, params: &SearchParams) -> bool {
    if let Some(category) = params.category {
        if property.category != category {
            return false;
        }
    }
    if let Some(location) = &params.location {
        if !location_matches(property, location) {
            return false;
        }
    }
    if let Some(property_type) = &params.property_type {
        if property.property_type != *property_type {
            return false;
        }
    }
    if let Some(min) = params.min_price {
        if property.price < min {
            return false;
        }
    }
    if let Some(max) = params.max_price {
        if property.price > max {
            return false;
        }
    }
    if !params.beds.matches(property.bedrooms) {
        return false;
    }
    if !params.baths.matches(property.bathrooms) {
        return false;
    }
    params.amenities.iter().all(|wanted| {
        property
            .amenities
            .iter()
            .any(|have| have.eq_ignore_ascii_case(wanted))
    })
}

/// Case-insensitive substring over the fields a visitor would type.
fn location_matches(property: &Property, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    [
        &property.address,
        &property.state,
        &property.country,
        &property.title,
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(&needle))
}

/// Order listings in place. Every branch is a stable sort, so listings that
/// compare equal keep their filtered order.
pub fn sort(listings: &mut [Property], key: SortKey) {
    match key {
        SortKey::Recent => listings.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortKey::PriceDesc => listings.sort_by(|a, b| b.price.total_cmp(&a.price)),
        SortKey::PriceAsc => listings.sort_by(|a, b| a.price.total_cmp(&b.price)),
        SortKey::BedroomsDesc => listings.sort_by(|a, b| b.bedrooms.cmp(&a.bedrooms)),
        SortKey::BedroomsAsc => listings.sort_by(|a, b| a.bedrooms.cmp(&b.bedrooms)),
        SortKey::Unordered => {}
    }
}

/// Listings shown next to a detail page: same category, never the subject
/// itself, listings of the same property type first, newest first within
/// each group.
pub fn related(subject: &Property, listings: &[Property], limit: usize) -> Vec<Property> {
    let mut related: Vec<Property> = listings
        .iter()
        .filter(|p| p.category == subject.category && p.id != subject.id)
        .cloned()
        .collect();
    related.sort_by(|a, b| {
        let a_same = a.property_type == subject.property_type;
        let b_same = b.property_type == subject.property_type;
        b_same
            .cmp(&a_same)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
    related.truncate(limit);
    related
}
