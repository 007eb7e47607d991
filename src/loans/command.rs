pub mod create_loan_cmd;
pub mod get_loan_cmd;
pub mod member_loans_cmd;
