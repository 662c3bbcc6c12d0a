pub mod deny_prompt;
pub mod static_prompt;
pub mod terminal_prompt;
