//! In-memory articles API
//!
//! Serves `/articles` from a `MemoryCollection`. Writes require an
//! `x-user` header; only the author may change or delete an article.
//!
//! ```bash
//! cargo run --example memory-api
//! curl -i -H 'Range: 0-1' 'localhost:8080/articles?order=-id'
//! curl -i -X POST -H 'x-user: alice' -H 'content-type: application/json' \
//!     -d '{"title":"hello","author":"mallory"}' localhost:8080/articles
//! ```

use std::sync::Arc;

use axum::{extract::Request, middleware::Next, response::Response, Router};
use serde::{Deserialize, Serialize};
use terrain::prelude::*;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Article {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    author: String,
}

impl MemoryRecord for Article {
    fn id(&self) -> Option<u64> {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = Some(id);
    }

    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.title.trim().is_empty() {
            errors.add("title", "can't be blank");
        }
        errors
    }
}

fn author_policy(principal: Option<&Principal>, article: &Article, capability: Capability) -> bool {
    match capability {
        Capability::Read => true,
        Capability::Create => principal.is_some(),
        Capability::Update | Capability::Destroy => {
            principal.is_some_and(|p| p.sub == article.author || p.has_role("editor"))
        }
    }
}

/// Stamps new articles with their author
struct Authored;

#[async_trait]
impl ResourceHooks<MemoryCollection<Article>> for Authored {
    async fn build_record(
        &self,
        config: &ResourceConfig<MemoryCollection<Article>>,
        ctx: &RequestContext,
        attributes: Attributes,
    ) -> std::result::Result<Article, Failure> {
        let mut article = config.collection().build(attributes).await?;
        if let Some(principal) = ctx.principal() {
            article.author = principal.sub.clone();
        }
        Ok(article)
    }
}

/// Demo authentication: trust the `x-user` header
async fn authenticate(mut request: Request, next: Next) -> Response {
    let user = request
        .headers()
        .get("x-user")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    if let Some(user) = user {
        let principal = if user == "admin" {
            Principal::new(user).with_role("editor")
        } else {
            Principal::new(user)
        };
        request.extensions_mut().insert(principal);
    }
    next.run(request).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load_for_service("memory-api")?;
    init_tracing(&config)?;

    let store = Arc::new(MemoryCollection::<Article>::new("articles"));
    store.seed([
        Article {
            title: "Welcome".to_string(),
            body: "First post".to_string(),
            author: "admin".to_string(),
            ..Article::default()
        },
        Article {
            title: "Ranges".to_string(),
            body: "Send a Range header to page through lists".to_string(),
            author: "admin".to_string(),
            ..Article::default()
        },
    ])?;

    let articles = Resource::new(
        ResourceConfig::shared(store)
            .permit(["title", "body"])
            .policy(author_policy),
    )
    .with_hooks(Authored)
    .with_pager(Pager::from_config(&config.pagination))
    .with_catalog(StaticCatalog::from_config(&config));

    let app = Router::new()
        .nest("/articles", routes(Arc::new(articles)))
        .layer(axum::middleware::from_fn(authenticate))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
    let addr = listener.local_addr()?;
    info!(service = %config.service.name, %addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;

    Ok(())
}
