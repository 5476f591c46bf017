pub mod audience;
pub mod interactions;
pub mod notifier;

pub use audience::AudienceResolver;
pub use interactions::InteractionService;
pub use notifier::NotificationFanout;
