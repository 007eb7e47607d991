use async_trait::async_trait;
use crate::core::domain::Configuration;
use crate::core::library::LibraryResult;
use crate::loans::repository::LoanRepository;
use crate::members::domain::MemberService;
use crate::members::domain::model::MemberEntity;
use crate::members::dto::MemberDto;
use crate::members::repository::MemberRepository;

pub(crate) struct MemberServiceImpl {
    member_repository: Box<dyn MemberRepository>,
    loan_repository: Box<dyn LoanRepository>,
}

impl MemberServiceImpl {
    pub(crate) fn new(_config: &Configuration, member_repository: Box<dyn MemberRepository>,
                      loan_repository: Box<dyn LoanRepository>) -> Self {
        MemberServiceImpl {
            member_repository,
            loan_repository,
        }
    }
}

#[async_trait]
impl MemberService for MemberServiceImpl {
    async fn find_member_by_external_id(&self, external_id: &str) -> LibraryResult<MemberDto> {
        self.member_repository.find_by_external_id(external_id).await.map(|m| MemberDto::from(&m))
    }

    async fn find_member_by_id(&self, id: &str) -> LibraryResult<MemberDto> {
        self.member_repository.get(id).await.map(|m| MemberDto::from(&m))
    }

    async fn count_active_loans(&self, member_id: &str) -> LibraryResult<i64> {
        let active = self.loan_repository.find_active_by_member(member_id).await
            .map_err(|err| err.with_context(format!("counting active loans of {}", member_id).as_str()))?;
        Ok(active.len() as i64)
    }
}

impl From<&MemberEntity> for MemberDto {
    fn from(other: &MemberEntity) -> Self {
        Self {
            member_id: other.member_id.to_string(),
            version: other.version,
            external_id: other.external_id.to_string(),
            full_name: other.full_name.to_string(),
            email: other.email.to_string(),
            category: other.category.to_string(),
            status: other.status.to_string(),
            sanctioned: other.sanctioned,
            has_overdue: other.has_overdue,
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}

impl From<&MemberDto> for MemberEntity {
    fn from(other: &MemberDto) -> Self {
        Self {
            member_id: other.member_id.to_string(),
            version: other.version,
            external_id: other.external_id.to_string(),
            full_name: other.full_name.to_string(),
            email: other.email.to_string(),
            category: other.category.to_string(),
            status: other.status.to_string(),
            sanctioned: other.sanctioned,
            has_overdue: other.has_overdue,
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}
