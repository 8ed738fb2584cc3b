pub mod delete;
pub mod deploy;
pub mod lambda_app;
pub mod lambda_instances;
pub mod navigation;
pub mod pagination;
