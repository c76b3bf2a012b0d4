use serde::{Deserialize, Serialize};

/// One social profile link, normalized to (platform, url).
///
/// The backend has stored these two ways over time: bare URL strings and
/// `{platform, url}` objects. Both shapes deserialize here; bare strings get
/// their platform inferred from the host so nothing downstream has to branch
/// on shape again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SocialLinkRaw")]
pub struct SocialLink {
    pub platform: String,
    pub url: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SocialLinkRaw {
    Entry { platform: String, url: String },
    Url(String),
}

impl From<SocialLinkRaw> for SocialLink {
    fn from(raw: SocialLinkRaw) -> Self {
        match raw {
            SocialLinkRaw::Entry { platform, url } => SocialLink { platform, url },
            SocialLinkRaw::Url(url) => SocialLink {
                platform: platform_from_url(&url).to_string(),
                url,
            },
        }
    }
}

fn platform_from_url(url: &str) -> &'static str {
    let url = url.to_lowercase();
    if url.contains("instagram.") {
        "Instagram"
    } else if url.contains("facebook.") || url.contains("fb.com") {
        "Facebook"
    } else if url.contains("linkedin.") {
        "LinkedIn"
    } else if url.contains("twitter.") || url.contains("://x.com") || url.contains("www.x.com") {
        "X"
    } else if url.contains("youtube.") || url.contains("youtu.be") {
        "YouTube"
    } else if url.contains("tiktok.") {
        "TikTok"
    } else if url.contains("wa.me") || url.contains("whatsapp.") {
        "WhatsApp"
    } else {
        "Website"
    }
}

/// A brokerage agent profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    #[serde(rename = "_id")]
    pub id: String,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default)]
    pub social_links: Vec<SocialLink>,
    #[serde(default)]
    pub languages: Vec<String>,
    /// Downloadable contact card, when the agent uploaded one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vcard: Option<String>,
}

/// Payload for creating or replacing an agent profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAgent {
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default)]
    pub social_links: Vec<SocialLink>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vcard: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn social_links_accept_both_shapes() {
        let json = serde_json::json!({
            "_id": "a1",
            "fullName": "Layla Hassan",
            "socialLinks": [
                "https://www.instagram.com/layla.listings",
                { "platform": "Portfolio", "url": "https://layla.example.com" }
            ]
        });

        let agent: Agent = serde_json::from_value(json).unwrap();
        assert_eq!(
            agent.social_links,
            vec![
                SocialLink {
                    platform: "Instagram".to_string(),
                    url: "https://www.instagram.com/layla.listings".to_string(),
                },
                SocialLink {
                    platform: "Portfolio".to_string(),
                    url: "https://layla.example.com".to_string(),
                },
            ]
        );
    }

    #[test]
    fn bare_links_infer_known_platforms() {
        let cases = [
            ("https://www.linkedin.com/in/someone", "LinkedIn"),
            ("https://facebook.com/page", "Facebook"),
            ("https://x.com/handle", "X"),
            ("https://youtu.be/abc123", "YouTube"),
            ("https://wa.me/971500000000", "WhatsApp"),
            ("https://example.com/me", "Website"),
        ];
        for (url, platform) in cases {
            let link: SocialLink = serde_json::from_value(serde_json::json!(url)).unwrap();
            assert_eq!(link.platform, platform, "for {url}");
        }
    }

    #[test]
    fn normalized_links_serialize_as_objects() {
        let link: SocialLink =
            serde_json::from_value(serde_json::json!("https://tiktok.com/@agent")).unwrap();
        let value = serde_json::to_value(&link).unwrap();
        assert_eq!(value["platform"], "TikTok");
        assert_eq!(value["url"], "https://tiktok.com/@agent");
    }

    #[test]
    fn agent_defaults_for_missing_fields() {
        let json = serde_json::json!({ "_id": "a2", "fullName": "Omar K" });
        let agent: Agent = serde_json::from_value(json).unwrap();
        assert!(agent.email.is_none());
        assert!(agent.social_links.is_empty());
        assert!(agent.languages.is_empty());
        assert!(agent.vcard.is_none());
    }
}
