pub mod behavior_analytics;
pub mod fps_aim_assist;
pub mod webhook_notifier;

pub use behavior_analytics::BehaviorAnalyticsPlugin;
pub use fps_aim_assist::FpsAimAssistPlugin;
pub use webhook_notifier::WebhookNotifier;
