use async_trait::async_trait;

use crate::feed::NotificationBackend;
use crate::models::{NewNotification, Notification};

use super::{ApiClient, ApiError, ResponseExt};

impl ApiClient {
    #[tracing::instrument(skip(self))]
    pub async fn list_notifications(&self) -> Result<Vec<Notification>, ApiError> {
        Ok(self
            .client
            .get(self.url("/api/notifications"))
            .send()
            .await
            .check()
            .await?
            .json()
            .await?)
    }

    #[tracing::instrument(skip(self, new))]
    pub async fn create_notification(&self, new: &NewNotification) -> Result<Notification, ApiError> {
        Ok(self
            .client
            .post(self.url("/api/notifications"))
            .json(new)
            .send()
            .await
            .check()
            .await?
            .json()
            .await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn mark_notification_read(&self, id: &str) -> Result<(), ApiError> {
        self.client
            .put(self.url(&format!("/api/notifications/{id}/read")))
            .send()
            .await
            .check()
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn mark_all_notifications_read(&self) -> Result<(), ApiError> {
        self.client
            .put(self.url("/api/notifications/mark-all-read"))
            .send()
            .await
            .check()
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_notification(&self, id: &str) -> Result<(), ApiError> {
        self.client
            .delete(self.url(&format!("/api/notifications/{id}")))
            .send()
            .await
            .check()
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn clear_notifications(&self) -> Result<(), ApiError> {
        self.client
            .delete(self.url("/api/notifications/clear-all"))
            .send()
            .await
            .check()
            .await?;
        Ok(())
    }
}

/// The real backend behind the notification feed.
#[async_trait]
impl NotificationBackend for ApiClient {
    async fn fetch(&self) -> anyhow::Result<Vec<Notification>> {
        Ok(self.list_notifications().await?)
    }

    async fn create(&self, new: &NewNotification) -> anyhow::Result<Notification> {
        Ok(self.create_notification(new).await?)
    }

    async fn mark_read(&self, id: &str) -> anyhow::Result<()> {
        Ok(self.mark_notification_read(id).await?)
    }

    async fn mark_all_read(&self) -> anyhow::Result<()> {
        Ok(self.mark_all_notifications_read().await?)
    }

    async fn delete(&self, id: &str) -> anyhow::Result<()> {
        Ok(self.delete_notification(id).await?)
    }

    async fn clear_all(&self) -> anyhow::Result<()> {
        Ok(self.clear_notifications().await?)
    }
}
