use serde::Deserialize;

use crate::models::{Agent, NewAgent};

use super::{ApiClient, ApiError, ResponseExt};

#[derive(Debug, Deserialize)]
struct UsernameCheck {
    available: bool,
}

impl ApiClient {
    #[tracing::instrument(skip(self))]
    pub async fn list_agents(&self) -> Result<Vec<Agent>, ApiError> {
        let mut agents: Vec<Agent> = self
            .client
            .get(self.url("/api/agents"))
            .send()
            .await
            .check()
            .await?
            .json()
            .await?;
        if let Some(media) = &self.media {
            for agent in &mut agents {
                media.rewrite_agent(agent);
            }
        }
        Ok(agents)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_agent(&self, id: &str) -> Result<Agent, ApiError> {
        let mut agent: Agent = self
            .client
            .get(self.url(&format!("/api/agents/{id}")))
            .send()
            .await
            .check()
            .await?
            .json()
            .await?;
        if let Some(media) = &self.media {
            media.rewrite_agent(&mut agent);
        }
        Ok(agent)
    }

    #[tracing::instrument(skip(self, new))]
    pub async fn create_agent(&self, new: &NewAgent) -> Result<Agent, ApiError> {
        let mut agent: Agent = self
            .client
            .post(self.url("/api/agents"))
            .json(new)
            .send()
            .await
            .check()
            .await?
            .json()
            .await?;
        if let Some(media) = &self.media {
            media.rewrite_agent(&mut agent);
        }
        Ok(agent)
    }

    #[tracing::instrument(skip(self, update))]
    pub async fn update_agent(&self, id: &str, update: &NewAgent) -> Result<Agent, ApiError> {
        let mut agent: Agent = self
            .client
            .put(self.url(&format!("/api/agents/{id}")))
            .json(update)
            .send()
            .await
            .check()
            .await?
            .json()
            .await?;
        if let Some(media) = &self.media {
            media.rewrite_agent(&mut agent);
        }
        Ok(agent)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_agent(&self, id: &str) -> Result<(), ApiError> {
        self.client
            .delete(self.url(&format!("/api/agents/{id}")))
            .send()
            .await
            .check()
            .await?;
        Ok(())
    }

    /// Is a login username free? `current_id` excludes the record being
    /// edited from the check.
    #[tracing::instrument(skip(self))]
    pub async fn check_username(
        &self,
        username: &str,
        current_id: Option<&str>,
    ) -> Result<bool, ApiError> {
        let mut request = self
            .client
            .get(self.url("/api/check-username"))
            .query(&[("username", username)]);
        if let Some(current) = current_id {
            request = request.query(&[("currentId", current)]);
        }
        let check: UsernameCheck = request.send().await.check().await?.json().await?;
        Ok(check.available)
    }
}
