pub mod correct_return_cmd;
pub mod register_return_cmd;
