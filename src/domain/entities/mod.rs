pub mod revenuecat_event;
pub mod subscription;
