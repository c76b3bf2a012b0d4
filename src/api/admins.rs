use serde::{Deserialize, Serialize};

use super::{ApiClient, ApiError, ResponseExt};

/// Dashboard login account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Fields an admin record update may change.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdate {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl ApiClient {
    #[tracing::instrument(skip(self))]
    pub async fn list_admins(&self) -> Result<Vec<Admin>, ApiError> {
        Ok(self
            .client
            .get(self.url("/api/admins"))
            .send()
            .await
            .check()
            .await?
            .json()
            .await?)
    }

    #[tracing::instrument(skip(self, update))]
    pub async fn update_admin(&self, id: &str, update: &AdminUpdate) -> Result<Admin, ApiError> {
        Ok(self
            .client
            .put(self.url(&format!("/api/admins/{id}")))
            .json(update)
            .send()
            .await
            .check()
            .await?
            .json()
            .await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_admin(&self, id: &str) -> Result<(), ApiError> {
        self.client
            .delete(self.url(&format!("/api/admins/{id}")))
            .send()
            .await
            .check()
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_uses_backend_field_names() {
        let admin: Admin = serde_json::from_value(serde_json::json!({
            "_id": "adm1",
            "username": "sara",
            "fullName": "Sara K"
        }))
        .unwrap();
        assert_eq!(admin.id, "adm1");
        assert_eq!(admin.full_name.as_deref(), Some("Sara K"));
        assert_eq!(admin.email, None);
    }

    #[test]
    fn update_omits_unset_fields() {
        let update = AdminUpdate {
            username: "sara".to_string(),
            full_name: None,
            email: Some("sara@example.com".to_string()),
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["username"], "sara");
        assert_eq!(json["email"], "sara@example.com");
        assert!(json.get("fullName").is_none());
    }
}
