use crate::models::{NewProperty, Property};

use super::{ApiClient, ApiError, ResponseExt};

impl ApiClient {
    /// Every listing the backend knows about.
    #[tracing::instrument(skip(self))]
    pub async fn list_properties(&self) -> Result<Vec<Property>, ApiError> {
        let mut properties: Vec<Property> = self
            .client
            .get(self.url("/api/properties"))
            .send()
            .await
            .check()
            .await?
            .json()
            .await?;
        if let Some(media) = &self.media {
            for property in &mut properties {
                media.rewrite_property(property);
            }
        }
        Ok(properties)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_property(&self, id: &str) -> Result<Property, ApiError> {
        let mut property: Property = self
            .client
            .get(self.url(&format!("/api/properties/{id}")))
            .send()
            .await
            .check()
            .await?
            .json()
            .await?;
        if let Some(media) = &self.media {
            media.rewrite_property(&mut property);
        }
        Ok(property)
    }

    #[tracing::instrument(skip(self, new))]
    pub async fn create_property(&self, new: &NewProperty) -> Result<Property, ApiError> {
        let mut property: Property = self
            .client
            .post(self.url("/api/properties"))
            .json(new)
            .send()
            .await
            .check()
            .await?
            .json()
            .await?;
        if let Some(media) = &self.media {
            media.rewrite_property(&mut property);
        }
        Ok(property)
    }

    #[tracing::instrument(skip(self, update))]
    pub async fn update_property(
        &self,
        id: &str,
        update: &NewProperty,
    ) -> Result<Property, ApiError> {
        let mut property: Property = self
            .client
            .put(self.url(&format!("/api/properties/{id}")))
            .json(update)
            .send()
            .await
            .check()
            .await?
            .json()
            .await?;
        if let Some(media) = &self.media {
            media.rewrite_property(&mut property);
        }
        Ok(property)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_property(&self, id: &str) -> Result<(), ApiError> {
        self.client
            .delete(self.url(&format!("/api/properties/{id}")))
            .send()
            .await
            .check()
            .await?;
        Ok(())
    }
}
