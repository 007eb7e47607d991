use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};
use crate::core::domain::Configuration;
use crate::core::library::LibraryResult;
use crate::policies::domain::model::{PolicyEntity, PolicySnapshot};
use crate::policies::domain::PolicyService;
use crate::policies::dto::PolicyDto;
use crate::policies::repository::PolicyRepository;

pub(crate) struct PolicyServiceImpl {
    config: Configuration,
    policy_repository: Box<dyn PolicyRepository>,
}

impl PolicyServiceImpl {
    pub(crate) fn new(config: &Configuration, policy_repository: Box<dyn PolicyRepository>) -> Self {
        Self {
            config: config.clone(),
            policy_repository,
        }
    }
}

#[async_trait]
impl PolicyService for PolicyServiceImpl {
    async fn resolve_policy(&self, category: &str) -> LibraryResult<PolicySnapshot> {
        let found = self.policy_repository.find_by_category(category).await
            .map_err(|err| err.with_context(format!("resolving policy for {}", category).as_str()))?;
        match found {
            Some(policy) => Ok(policy.snapshot()),
            None => {
                debug!(category, "no policy configured, using fallback policy");
                let fallback = PolicySnapshot::fallback(&self.config, category);
                fallback.validate().map_err(|err| err.with_context("checking fallback policy"))?;
                Ok(fallback)
            }
        }
    }

    async fn add_policy(&self, policy: &PolicyDto) -> LibraryResult<PolicyDto> {
        let entity = PolicyEntity::from(policy);
        entity.validate()?;
        self.policy_repository.create(&entity).await?;
        info!(category = entity.category.as_str(), "added lending policy");
        Ok(PolicyDto::from(&entity))
    }

    async fn update_policy(&self, policy: &PolicyDto) -> LibraryResult<PolicyDto> {
        let mut entity = PolicyEntity::from(policy);
        entity.validate()?;
        entity.updated_at = Utc::now().naive_utc();
        self.policy_repository.update(&entity).await?;
        entity.version += 1;
        info!(category = entity.category.as_str(), version = entity.version, "updated lending policy");
        Ok(PolicyDto::from(&entity))
    }

    async fn find_policy_for_category(&self, category: &str) -> LibraryResult<Option<PolicyDto>> {
        let found = self.policy_repository.find_by_category(category).await?;
        Ok(found.as_ref().map(PolicyDto::from))
    }
}

impl From<&PolicyEntity> for PolicyDto {
    fn from(other: &PolicyEntity) -> PolicyDto {
        PolicyDto {
            policy_id: other.policy_id.to_string(),
            version: other.version,
            category: other.category.to_string(),
            loan_days: other.loan_days,
            max_concurrent_loans: other.max_concurrent_loans,
            fine_per_day: other.fine_per_day,
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}

impl From<&PolicyDto> for PolicyEntity {
    fn from(other: &PolicyDto) -> PolicyEntity {
        PolicyEntity {
            policy_id: other.policy_id.to_string(),
            version: other.version,
            category: other.category.to_string(),
            loan_days: other.loan_days,
            max_concurrent_loans: other.max_concurrent_loans,
            fine_per_day: other.fine_per_day,
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}
