//! Dependency injection modules using Shaku.
//!
//! One module per storage backend:
//! - `MemoryModule`: services over the process-local store
//! - `PostgresModule`: services over the PostgreSQL repositories
//!
//! The clock, the session schedule and the participation policy are not
//! components. They reach the services as component parameters, so the rate
//! limit store behind the policy is picked here and nowhere else.

use metrics_exporter_prometheus::PrometheusHandle;
use shaku::{module, HasComponent};
use std::sync::Arc;
use storyloop_config::{AppConfig, SecurityConfig, StorageBackend};
use storyloop_core::{Clock, HealthCheck, SessionSchedule, StoryResult, SystemClock};
use storyloop_repository::{
    create_pool, seed_demo_story, AnonymousUserRepository, DatabasePool, DatabasePoolParameters, EpisodeRepository,
    MemoryAnonymousUserRepository, MemoryAnonymousUserRepositoryParameters, MemoryEpisodeRepository,
    MemoryEpisodeRepositoryParameters, MemoryStore, MemoryStoryRepository, MemoryStoryRepositoryParameters,
    MemorySubmissionRepository, MemorySubmissionRepositoryParameters, MemoryVoteRepository,
    MemoryVoteRepositoryParameters, PgAnonymousUserRepository, PgEpisodeRepository, PgStoryRepository,
    PgSubmissionRepository, PgVoteRepository, StoryRepository, SubmissionRepository, VoteRepository,
};
use storyloop_resilience::{create_redis_pool, MemoryWindowStore, RedisWindowStore, RequestThrottle, WindowRateLimiter};
use storyloop_rest::AppState;
use storyloop_security::IpHasher;
use storyloop_service::{
    AuthService, AuthServiceImpl, AuthServiceImplParameters, EpisodeService, EpisodeServiceImpl,
    EpisodeServiceImplParameters, IdentityService, IdentityServiceImpl, IdentityServiceImplParameters,
    ParticipationLimits, ParticipationPolicy, SessionService, SessionServiceImpl, SessionServiceImplParameters,
    StoryService, StoryServiceImpl, StoryServiceImplParameters, SubmissionService, SubmissionServiceImpl,
    SubmissionServiceImplParameters, VoteService, VoteServiceImpl, VoteServiceImplParameters,
};
use tokio::task::JoinHandle;
use tracing::info;

// ============================================================================
// Shaku Module Definitions
// ============================================================================

// Single-process deployment on the in-memory store.
module! {
    pub MemoryModule {
        components = [
            MemoryAnonymousUserRepository,
            MemorySubmissionRepository,
            MemoryVoteRepository,
            MemoryStoryRepository,
            MemoryEpisodeRepository,
            SessionServiceImpl,
            IdentityServiceImpl,
            SubmissionServiceImpl,
            VoteServiceImpl,
            StoryServiceImpl,
            EpisodeServiceImpl,
            AuthServiceImpl,
        ],
        providers = [],
    }
}

// Deployment on PostgreSQL. Every repository shares the pool component.
module! {
    pub PostgresModule {
        components = [
            DatabasePool,
            PgAnonymousUserRepository,
            PgSubmissionRepository,
            PgVoteRepository,
            PgStoryRepository,
            PgEpisodeRepository,
            SessionServiceImpl,
            IdentityServiceImpl,
            SubmissionServiceImpl,
            VoteServiceImpl,
            StoryServiceImpl,
            EpisodeServiceImpl,
            AuthServiceImpl,
        ],
        providers = [],
    }
}

// ============================================================================
// Module Builders
// ============================================================================

/// Inputs shared by the service components of every module.
#[derive(Clone)]
pub struct ServiceParameters {
    pub schedule: SessionSchedule,
    pub clock: Arc<dyn Clock>,
    pub policy: ParticipationPolicy,
    pub security: Arc<SecurityConfig>,
}

// Service parameters are the same for every module; only the repositories
// differ between backends.
macro_rules! with_service_parameters {
    ($builder:expr, $services:expr) => {{
        let services: &ServiceParameters = $services;
        $builder
            .with_component_parameters::<SessionServiceImpl>(SessionServiceImplParameters {
                schedule: services.schedule,
                clock: services.clock.clone(),
            })
            .with_component_parameters::<IdentityServiceImpl>(IdentityServiceImplParameters {
                clock: services.clock.clone(),
            })
            .with_component_parameters::<SubmissionServiceImpl>(SubmissionServiceImplParameters {
                policy: services.policy.clone(),
            })
            .with_component_parameters::<VoteServiceImpl>(VoteServiceImplParameters {
                policy: services.policy.clone(),
            })
            .with_component_parameters::<StoryServiceImpl>(StoryServiceImplParameters {
                clock: services.clock.clone(),
            })
            .with_component_parameters::<EpisodeServiceImpl>(EpisodeServiceImplParameters {
                clock: services.clock.clone(),
            })
            .with_component_parameters::<AuthServiceImpl>(AuthServiceImplParameters::from_config(
                services.security.clone(),
            ))
    }};
}

/// Builds the in-memory module. Every repository shares `store`.
#[must_use]
pub fn build_memory_module(store: &MemoryStore, services: &ServiceParameters) -> Arc<MemoryModule> {
    let module = with_service_parameters!(MemoryModule::builder(), services)
        .with_component_parameters::<MemoryAnonymousUserRepository>(MemoryAnonymousUserRepositoryParameters {
            store: store.clone(),
        })
        .with_component_parameters::<MemorySubmissionRepository>(MemorySubmissionRepositoryParameters {
            store: store.clone(),
        })
        .with_component_parameters::<MemoryVoteRepository>(MemoryVoteRepositoryParameters { store: store.clone() })
        .with_component_parameters::<MemoryStoryRepository>(MemoryStoryRepositoryParameters { store: store.clone() })
        .with_component_parameters::<MemoryEpisodeRepository>(MemoryEpisodeRepositoryParameters {
            store: store.clone(),
        })
        .build();

    Arc::new(module)
}

/// Builds the PostgreSQL module over an open pool.
#[must_use]
pub fn build_postgres_module(pool: &DatabasePool, services: &ServiceParameters) -> Arc<PostgresModule> {
    let module = with_service_parameters!(PostgresModule::builder(), services)
        .with_component_parameters::<DatabasePool>(DatabasePoolParameters {
            pool: pool.inner().clone(),
        })
        .build();

    Arc::new(module)
}

// ============================================================================
// Module Resolution Helpers
// ============================================================================

/// Resolves the services the REST layer needs from any module.
pub trait ServiceResolver {
    fn session_service(&self) -> Arc<dyn SessionService>;
    fn identity_service(&self) -> Arc<dyn IdentityService>;
    fn submission_service(&self) -> Arc<dyn SubmissionService>;
    fn vote_service(&self) -> Arc<dyn VoteService>;
    fn story_service(&self) -> Arc<dyn StoryService>;
    fn episode_service(&self) -> Arc<dyn EpisodeService>;
    fn auth_service(&self) -> Arc<dyn AuthService>;
}

impl<M> ServiceResolver for M
where
    M: HasComponent<dyn SessionService>
        + HasComponent<dyn IdentityService>
        + HasComponent<dyn SubmissionService>
        + HasComponent<dyn VoteService>
        + HasComponent<dyn StoryService>
        + HasComponent<dyn EpisodeService>
        + HasComponent<dyn AuthService>,
{
    fn session_service(&self) -> Arc<dyn SessionService> {
        HasComponent::<dyn SessionService>::resolve(self)
    }

    fn identity_service(&self) -> Arc<dyn IdentityService> {
        HasComponent::<dyn IdentityService>::resolve(self)
    }

    fn submission_service(&self) -> Arc<dyn SubmissionService> {
        HasComponent::<dyn SubmissionService>::resolve(self)
    }

    fn vote_service(&self) -> Arc<dyn VoteService> {
        HasComponent::<dyn VoteService>::resolve(self)
    }

    fn story_service(&self) -> Arc<dyn StoryService> {
        HasComponent::<dyn StoryService>::resolve(self)
    }

    fn episode_service(&self) -> Arc<dyn EpisodeService> {
        HasComponent::<dyn EpisodeService>::resolve(self)
    }

    fn auth_service(&self) -> Arc<dyn AuthService> {
        HasComponent::<dyn AuthService>::resolve(self)
    }
}

/// Resolves the repositories of either backend.
pub trait RepositoryResolver {
    fn user_repository(&self) -> Arc<dyn AnonymousUserRepository>;
    fn submission_repository(&self) -> Arc<dyn SubmissionRepository>;
    fn vote_repository(&self) -> Arc<dyn VoteRepository>;
    fn story_repository(&self) -> Arc<dyn StoryRepository>;
    fn episode_repository(&self) -> Arc<dyn EpisodeRepository>;
}

impl<M> RepositoryResolver for M
where
    M: HasComponent<dyn AnonymousUserRepository>
        + HasComponent<dyn SubmissionRepository>
        + HasComponent<dyn VoteRepository>
        + HasComponent<dyn StoryRepository>
        + HasComponent<dyn EpisodeRepository>,
{
    fn user_repository(&self) -> Arc<dyn AnonymousUserRepository> {
        HasComponent::<dyn AnonymousUserRepository>::resolve(self)
    }

    fn submission_repository(&self) -> Arc<dyn SubmissionRepository> {
        HasComponent::<dyn SubmissionRepository>::resolve(self)
    }

    fn vote_repository(&self) -> Arc<dyn VoteRepository> {
        HasComponent::<dyn VoteRepository>::resolve(self)
    }

    fn story_repository(&self) -> Arc<dyn StoryRepository> {
        HasComponent::<dyn StoryRepository>::resolve(self)
    }

    fn episode_repository(&self) -> Arc<dyn EpisodeRepository> {
        HasComponent::<dyn EpisodeRepository>::resolve(self)
    }
}

// ============================================================================
// Application Container
// ============================================================================

/// An opened storage backend.
#[derive(Clone)]
pub enum Storage {
    /// Process-local tables.
    Memory(MemoryStore),
    /// PostgreSQL pool, closed on shutdown.
    Postgres(Arc<DatabasePool>),
}

impl Storage {
    /// Opens the configured backend, running migrations when asked to.
    pub async fn connect(config: &AppConfig) -> StoryResult<Self> {
        match config.database.backend {
            StorageBackend::Memory => {
                info!("Using in-memory storage");
                Ok(Self::Memory(MemoryStore::new()))
            }
            StorageBackend::Postgres => {
                let pool = create_pool(&config.database).await?;
                if config.database.run_migrations {
                    pool.run_migrations().await?;
                }
                Ok(Self::Postgres(pool))
            }
        }
    }

    /// Dependency reported by `/ready`.
    #[must_use]
    pub fn health(&self) -> Arc<dyn HealthCheck> {
        match self {
            Self::Memory(store) => Arc::new(store.clone()),
            Self::Postgres(pool) => pool.clone(),
        }
    }
}

/// Everything the server needs to serve requests.
pub struct AppContainer {
    pub state: AppState,
    pub throttle: Option<RequestThrottle>,
    pub storage: Storage,
    /// Background tasks aborted on shutdown.
    pub background: Vec<JoinHandle<()>>,
}

impl AppContainer {
    /// Wires the application on the wall clock.
    pub async fn build(config: &AppConfig, metrics: Option<PrometheusHandle>) -> StoryResult<Self> {
        let storage = Storage::connect(config).await?;
        Self::with_storage(config, storage, Arc::new(SystemClock), metrics).await
    }

    /// Wires the application over an already opened storage backend.
    pub async fn with_storage(
        config: &AppConfig,
        storage: Storage,
        clock: Arc<dyn Clock>,
        metrics: Option<PrometheusHandle>,
    ) -> StoryResult<Self> {
        let mut background = Vec::new();
        let mut health_checks = vec![storage.health()];

        let limiter: Arc<dyn WindowRateLimiter> = if config.redis.enabled {
            let redis = Arc::new(RedisWindowStore::new(create_redis_pool(&config.redis).await?));
            health_checks.push(redis.clone());
            info!("Rate limit windows stored in Redis");
            redis
        } else {
            let store = MemoryWindowStore::with_clock(clock.clone());
            background.push(store.spawn_cleanup(config.rate_limit.cleanup_interval()));
            Arc::new(store)
        };

        let schedule = SessionSchedule::from_offset_minutes(config.voting.utc_offset_minutes)?;
        let limits = ParticipationLimits::from_config(&config.voting, &config.rate_limit);
        let services = ServiceParameters {
            schedule,
            clock: clock.clone(),
            policy: ParticipationPolicy::new(schedule, clock.clone(), limiter, limits),
            security: Arc::new(config.security.clone()),
        };

        let parts = match &storage {
            Storage::Memory(store) => resolve_parts(build_memory_module(store, &services).as_ref()),
            Storage::Postgres(pool) => resolve_parts(build_postgres_module(pool, &services).as_ref()),
        };

        if config.database.seed_demo_data
            && seed_demo_story(parts.stories.as_ref(), parts.episodes.as_ref(), clock.now()).await?
        {
            info!("Seeded demo story");
        }

        let state = AppState {
            session_service: parts.session_service,
            identity_service: parts.identity_service,
            submission_service: parts.submission_service,
            vote_service: parts.vote_service,
            story_service: parts.story_service,
            episode_service: parts.episode_service,
            auth_service: parts.auth_service,
            ip_hasher: Arc::new(IpHasher::new(config.security.ip_salt.clone())),
            health_checks,
            metrics,
        };

        let throttle = (config.rate_limit.requests_per_second > 0)
            .then(|| RequestThrottle::per_second(config.rate_limit.requests_per_second));

        Ok(Self {
            state,
            throttle,
            storage,
            background,
        })
    }

    /// Stops background tasks and closes the database pool.
    pub async fn shutdown(self) {
        for task in &self.background {
            task.abort();
        }
        if let Storage::Postgres(pool) = &self.storage {
            pool.close().await;
        }
    }
}

/// Services resolved from a module, plus the repositories seeding needs.
struct ResolvedParts {
    session_service: Arc<dyn SessionService>,
    identity_service: Arc<dyn IdentityService>,
    submission_service: Arc<dyn SubmissionService>,
    vote_service: Arc<dyn VoteService>,
    story_service: Arc<dyn StoryService>,
    episode_service: Arc<dyn EpisodeService>,
    auth_service: Arc<dyn AuthService>,
    stories: Arc<dyn StoryRepository>,
    episodes: Arc<dyn EpisodeRepository>,
}

fn resolve_parts<M: ServiceResolver + RepositoryResolver>(module: &M) -> ResolvedParts {
    ResolvedParts {
        session_service: module.session_service(),
        identity_service: module.identity_service(),
        submission_service: module.submission_service(),
        vote_service: module.vote_service(),
        story_service: module.story_service(),
        episode_service: module.episode_service(),
        auth_service: module.auth_service(),
        stories: module.story_repository(),
        episodes: module.episode_repository(),
    }
}
