use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Top-level listing category; decides which public page carries the property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Buy,
    Rent,
    #[serde(rename = "Off Plan")]
    OffPlan,
    #[serde(rename = "Commercial for Rent")]
    CommercialRent,
    #[serde(rename = "Commercial for Buy")]
    CommercialBuy,
}

impl Category {
    /// The exact string the backend stores for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Buy => "Buy",
            Category::Rent => "Rent",
            Category::OffPlan => "Off Plan",
            Category::CommercialRent => "Commercial for Rent",
            Category::CommercialBuy => "Commercial for Buy",
        }
    }
}

impl std::str::FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy" => Ok(Category::Buy),
            "rent" => Ok(Category::Rent),
            "off-plan" | "offplan" | "off plan" => Ok(Category::OffPlan),
            "commercial-rent" | "commercial for rent" => Ok(Category::CommercialRent),
            "commercial-buy" | "commercial for buy" => Ok(Category::CommercialBuy),
            other => anyhow::bail!(
                "unknown category '{other}' (expected buy, rent, off-plan, commercial-rent or commercial-buy)"
            ),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single listing as served by the brokerage backend.
///
/// Counts and collections default so that sparse records (older imports,
/// off-plan stubs) still deserialize.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub address: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    pub category: Category,
    /// Open string set: Apartment, Villa, Townhouse, Penthouse, ...
    pub property_type: String,
    pub price: f64,
    #[serde(default)]
    pub size: f64,
    #[serde(default)]
    pub bedrooms: u32,
    #[serde(default)]
    pub bathrooms: u32,
    #[serde(default)]
    pub kitchens: u32,
    #[serde(default)]
    pub rooms: u32,
    /// Ordered gallery of image/video URLs.
    #[serde(default)]
    pub media: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub created_at: DateTime<Utc>,
    /// Id of the agent responsible for the listing, when one is assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
}

/// Flat payload for creating or replacing a listing from the management side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProperty {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub address: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    pub category: Category,
    pub property_type: String,
    pub price: f64,
    #[serde(default)]
    pub size: f64,
    #[serde(default)]
    pub bedrooms: u32,
    #[serde(default)]
    pub bathrooms: u32,
    #[serde(default)]
    pub kitchens: u32,
    #[serde(default)]
    pub rooms: u32,
    #[serde(default)]
    pub media: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_backend_record() {
        let json = serde_json::json!({
            "_id": "66f1a2b3c4d5e6f7a8b9c0d1",
            "title": "Marina Heights 2BR",
            "description": "Bright two-bedroom with full marina view.",
            "address": "Dubai Marina Walk",
            "country": "UAE",
            "state": "Dubai",
            "category": "Buy",
            "propertyType": "Apartment",
            "price": 2450000,
            "size": 1480.5,
            "bedrooms": 2,
            "bathrooms": 2,
            "media": ["https://bucket.s3.amazonaws.com/a.jpg"],
            "featuredImage": "https://bucket.s3.amazonaws.com/a.jpg",
            "amenities": ["Pool", "Gym"],
            "createdAt": "2024-05-01T10:30:00Z",
            "agent": "66f1a2b3c4d5e6f7a8b9c0d2"
        });

        let property: Property = serde_json::from_value(json).unwrap();
        assert_eq!(property.id, "66f1a2b3c4d5e6f7a8b9c0d1");
        assert_eq!(property.category, Category::Buy);
        assert_eq!(property.property_type, "Apartment");
        assert_eq!(property.price, 2_450_000.0);
        assert_eq!(property.bedrooms, 2);
        assert_eq!(property.amenities, vec!["Pool", "Gym"]);
        assert_eq!(property.agent.as_deref(), Some("66f1a2b3c4d5e6f7a8b9c0d2"));
    }

    #[test]
    fn sparse_record_gets_defaults() {
        let json = serde_json::json!({
            "_id": "abc",
            "title": "Plot 14",
            "address": "Al Reem Island",
            "category": "Off Plan",
            "propertyType": "Villa",
            "price": 900000,
            "createdAt": "2024-01-02T00:00:00Z"
        });

        let property: Property = serde_json::from_value(json).unwrap();
        assert_eq!(property.category, Category::OffPlan);
        assert_eq!(property.bedrooms, 0);
        assert!(property.media.is_empty());
        assert!(property.amenities.is_empty());
        assert!(property.featured_image.is_none());
    }

    #[test]
    fn category_wire_strings_round_trip() {
        for category in [
            Category::Buy,
            Category::Rent,
            Category::OffPlan,
            Category::CommercialRent,
            Category::CommercialBuy,
        ] {
            let encoded = serde_json::to_string(&category).unwrap();
            assert_eq!(encoded, format!("\"{}\"", category.as_str()));
            let decoded: Category = serde_json::from_str(&encoded).unwrap();
            assert_eq!(decoded, category);
        }
    }

    #[test]
    fn category_parses_cli_spellings() {
        assert_eq!("buy".parse::<Category>().unwrap(), Category::Buy);
        assert_eq!("Rent".parse::<Category>().unwrap(), Category::Rent);
        assert_eq!("off-plan".parse::<Category>().unwrap(), Category::OffPlan);
        assert_eq!(
            "commercial-rent".parse::<Category>().unwrap(),
            Category::CommercialRent
        );
        assert!("penthouse".parse::<Category>().is_err());
    }

    #[test]
    fn serializes_with_backend_field_names() {
        let property = Property {
            id: "p1".to_string(),
            title: "T".to_string(),
            description: String::new(),
            address: "A".to_string(),
            country: "UAE".to_string(),
            state: "Dubai".to_string(),
            zip: None,
            category: Category::CommercialBuy,
            property_type: "Office".to_string(),
            price: 1.0,
            size: 0.0,
            bedrooms: 0,
            bathrooms: 0,
            kitchens: 0,
            rooms: 0,
            media: vec![],
            featured_image: None,
            amenities: vec![],
            created_at: "2024-01-01T00:00:00Z".parse().unwrap(),
            agent: None,
        };

        let value = serde_json::to_value(&property).unwrap();
        assert_eq!(value["_id"], "p1");
        assert_eq!(value["propertyType"], "Office");
        assert_eq!(value["category"], "Commercial for Buy");
        assert!(value.get("zip").is_none());
    }
}
