pub mod api_json;
pub mod bearer_token;
