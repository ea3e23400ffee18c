pub mod inspect_config;
pub mod reconcile_pr;
