//! 애플리케이션 포트를 실제 인프라 구현체로 연결하는 어댑터 계층.

mod config_repository;
mod dry_run_gateway;
mod gateway_factory;
mod host_token_resolver;
mod markdown_renderer;
mod reporter;
mod target_resolver;

pub use config_repository::JsonConfigRepository;
pub use dry_run_gateway::DryRunGateway;
pub use gateway_factory::GatewayFactoryAdapter;
pub use host_token_resolver::HostTokenResolverAdapter;
pub use markdown_renderer::MarkdownRendererAdapter;
pub use reporter::ConsoleReporter;
pub use target_resolver::UrlTargetResolver;
