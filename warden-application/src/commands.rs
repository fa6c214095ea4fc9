pub mod analyze_commands;
pub mod profile_commands;
