use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{ArgAction, Args, Parser, Subcommand};
use helpcenter_ai::answer::{Audience, answer_question};
use helpcenter_ai::browse::{
    ArticleFilter, ArticleStats, ChunkSort, ChunkSortColumn, RegionFilter, SortDirection,
    browse_category, filter_chunks, search_articles, threshold_counts,
};
use helpcenter_ai::facets::Facets;
use helpcenter_ai::insights::build_ops_queues;
use helpcenter_ai::{KeywordRuleSet, ScoredArticle};
use helpcenter_core::{ArticleOverride, Persona, Region, ServiceTier};
use helpcenter_sync::gemini::mask_key;
use helpcenter_sync::{GeminiClient, HelpCenterExport};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;
mod display;

use app::{App, Overrides, resolve_config};

#[derive(Parser)]
#[command(name = "helpcenter")]
#[command(about = "Classify, score, and review help-center articles")]
#[command(version)]
struct Cli {
    /// JSON config file; flags and environment variables override its fields
    #[arg(long, global = true, env = "HELPCENTER_CONFIG")]
    config: Option<PathBuf>,

    /// Help-center API locale root
    #[arg(long, global = true, env = "HELPCENTER_BASE_URL")]
    base_url: Option<String>,

    /// Maximum article pages to fetch (100 articles each)
    #[arg(long, global = true, env = "HELPCENTER_PAGES")]
    pages: Option<u32>,

    /// Usage feed to merge into the fetched articles
    #[arg(long, global = true, env = "HELPCENTER_USAGE")]
    usage: Option<PathBuf>,

    /// Directory holding overrides and settings
    #[arg(long, global = true, env = "HELPCENTER_STATE_DIR")]
    state_dir: Option<PathBuf>,

    /// Generative model used by `ask`
    #[arg(long, global = true, env = "HELPCENTER_GEMINI_MODEL")]
    gemini_model: Option<String>,

    /// Read articles from a saved export instead of the network
    #[arg(long, global = true)]
    from_file: Option<PathBuf>,

    /// Keyword rule tables (JSON) replacing the built-in ones
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Default)]
struct FilterArgs {
    #[arg(long, value_delimiter = ',')]
    persona: Vec<Persona>,
    #[arg(long, value_delimiter = ',')]
    tier: Vec<ServiceTier>,
    #[arg(long, value_delimiter = ',')]
    integration: Vec<String>,
    #[arg(long, value_delimiter = ',')]
    feature: Vec<String>,
    /// domestic or international
    #[arg(long, value_delimiter = ',')]
    region: Vec<RegionFilter>,
    /// Landing category shortcut: getting-started, cards-controls, bill-pay, accounting-close
    #[arg(long)]
    category: Option<String>,
    /// Case-insensitive text search over title and summary
    #[arg(short, long)]
    query: Option<String>,
}

fn slugs(values: &[String]) -> impl Iterator<Item = String> + '_ {
    values
        .iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
}

impl FilterArgs {
    fn to_filter(&self) -> anyhow::Result<ArticleFilter> {
        let mut filter = match &self.category {
            Some(id) => {
                let (filter, label) =
                    browse_category(id).with_context(|| format!("unknown category {id:?}"))?;
                info!(category = %id, %label, "browsing category");
                filter
            }
            None => ArticleFilter::default(),
        };
        filter.personas.extend(self.persona.iter().copied());
        filter.tiers.extend(self.tier.iter().copied());
        filter.integrations.extend(slugs(&self.integration));
        filter.features.extend(slugs(&self.feature));
        filter.regions.extend(self.region.iter().copied());
        filter.query = self.query.clone().unwrap_or_default();
        Ok(filter)
    }

    fn audience(&self) -> Audience {
        Audience {
            personas: self.persona.iter().copied().collect(),
            tiers: self.tier.iter().copied().collect(),
            integrations: slugs(&self.integration).collect(),
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Reader view: filtered articles ranked by votes, freshness, and traffic
    Articles {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long, default_value_t = 20)]
        limit: usize,
        #[arg(long)]
        json: bool,
    },
    /// AI retrieval view: chunks with confidence and approval status
    Chunks {
        #[command(flatten)]
        filter: FilterArgs,
        /// chunk, persona, summary, updated, confidence, or status
        #[arg(long, default_value = "confidence")]
        sort: ChunkSortColumn,
        /// asc or desc
        #[arg(long, default_value = "desc")]
        direction: SortDirection,
        /// Only chunks that pass every approval check
        #[arg(long)]
        approved_only: bool,
        #[arg(long, default_value_t = 50)]
        limit: usize,
        #[arg(long)]
        json: bool,
    },
    /// Operator view: alert and stale queues with editorial insights
    Ops {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long)]
        json: bool,
    },
    /// Vote totals and display-threshold counts
    Stats {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Filter values present in the current articles
    Facets {
        #[arg(long)]
        json: bool,
    },
    /// Manage per-article operator overrides
    Override {
        #[command(subcommand)]
        command: OverrideCommand,
    },
    /// Show or change the display threshold
    Threshold {
        #[command(subcommand)]
        command: ThresholdCommand,
    },
    /// Manage the stored generative API key
    ApiKey {
        #[command(subcommand)]
        command: ApiKeyCommand,
    },
    /// Answer a question from the top-ranked articles
    Ask {
        question: String,
        #[command(flatten)]
        filter: FilterArgs,
        /// Use only articles whose chunk passes the approval gate
        #[arg(long)]
        approved_only: bool,
        #[arg(long, env = "HELPCENTER_GEMINI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },
    /// Fetch articles and save them for offline use with --from-file
    Export {
        #[arg(long)]
        out: PathBuf,
    },
    /// Summarise the active keyword rules
    Rules,
}

#[derive(Subcommand)]
enum OverrideCommand {
    /// Edit an override; given fields replace the stored ones
    Set {
        id: String,
        #[arg(long)]
        title: Option<String>,
        /// Replacement HTML body
        #[arg(long)]
        body: Option<String>,
        #[arg(long, value_delimiter = ',')]
        persona: Vec<Persona>,
        #[arg(long, value_delimiter = ',')]
        tier: Vec<ServiceTier>,
        #[arg(long, value_delimiter = ',')]
        feature: Vec<String>,
        #[arg(long, value_delimiter = ',')]
        integration: Vec<String>,
        #[arg(long, value_delimiter = ',')]
        region: Vec<Region>,
        /// Discard fields not given here instead of merging
        #[arg(long)]
        replace: bool,
    },
    Clear {
        id: String,
    },
    List,
    Show {
        id: String,
    },
}

#[derive(Subcommand)]
enum ThresholdCommand {
    Get,
    /// Percent in [0, 100]; out-of-range values are clamped
    Set {
        #[arg(allow_hyphen_values = true)]
        percent: i64,
    },
}

#[derive(Subcommand)]
enum ApiKeyCommand {
    Set { key: String },
    Clear,
    Status,
}

fn non_empty<T: Ord>(items: impl IntoIterator<Item = T>) -> Option<BTreeSet<T>> {
    let set: BTreeSet<T> = items.into_iter().collect();
    (!set.is_empty()).then_some(set)
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    info!("helpcenter v{}", env!("CARGO_PKG_VERSION"));

    let config = resolve_config(
        cli.config.as_deref(),
        Overrides {
            base_url: cli.base_url,
            article_pages: cli.pages,
            usage_path: cli.usage,
            state_dir: cli.state_dir,
            gemini_model: cli.gemini_model,
        },
    )?;
    let app = App::open(config, cli.rules.as_deref()).await?;
    let from_file = cli.from_file.as_deref();
    let now = Utc::now();

    match cli.command {
        Command::Articles {
            filter,
            limit,
            json,
        } => {
            let eval = app.evaluate(from_file).await?;
            let ranked = search_articles(&eval.articles, &filter.to_filter()?);
            if json {
                print_json(&ranked.iter().take(limit).collect::<Vec<_>>())?;
            } else {
                display::print_articles(&ranked, limit, now);
            }
        }
        Command::Chunks {
            filter,
            sort,
            direction,
            approved_only,
            limit,
            json,
        } => {
            let eval = app.evaluate(from_file).await?;
            let threshold = app.display_threshold().await?;
            let sort = ChunkSort {
                column: sort,
                direction,
            };
            let mut chunks = filter_chunks(&eval.chunks, &filter.to_filter()?, sort);
            if approved_only {
                chunks.retain(|c| c.allowed_for_ai);
            }
            if json {
                print_json(&chunks.iter().take(limit).collect::<Vec<_>>())?;
            } else {
                display::print_threshold_counts(
                    &threshold_counts(chunks.iter().copied(), threshold),
                    threshold,
                );
                println!();
                display::print_chunks(&chunks, threshold, limit, now);
            }
        }
        Command::Ops { filter, json } => {
            let eval = app.evaluate(from_file).await?;
            let filter = filter.to_filter()?;
            let queues = build_ops_queues(eval.articles.iter().filter(|a| filter.matches_article(a)));
            if json {
                print_json(&queues)?;
            } else {
                display::print_ops_queues(&queues, now);
            }
        }
        Command::Stats { filter } => {
            let eval = app.evaluate(from_file).await?;
            let filter = filter.to_filter()?;
            let threshold = app.display_threshold().await?;
            let stats = ArticleStats::collect(eval.articles.iter().filter(|a| filter.matches_article(a)));
            let counts = threshold_counts(
                eval.chunks.iter().filter(|c| filter.matches_chunk(c)),
                threshold,
            );
            display::print_stats(&stats, &counts, threshold);
        }
        Command::Facets { json } => {
            let eval = app.evaluate(from_file).await?;
            let facets = Facets::collect(&eval.articles);
            if json {
                print_json(&facets)?;
            } else {
                display::print_facets(&facets);
            }
        }
        Command::Override { command } => run_override(&app, command).await?,
        Command::Threshold { command } => match command {
            ThresholdCommand::Get => {
                println!("{}%", app.display_threshold().await?.percent());
            }
            ThresholdCommand::Set { percent } => {
                let saved = app.console.set_display_threshold(percent).await?;
                println!("Display threshold set to {}%", saved.percent());
            }
        },
        Command::ApiKey { command } => match command {
            ApiKeyCommand::Set { key } => {
                app.console.set_gemini_api_key(&key).await?;
                println!("API key saved.");
            }
            ApiKeyCommand::Clear => {
                app.console.set_gemini_api_key("").await?;
                println!("API key cleared.");
            }
            ApiKeyCommand::Status => match app.console.gemini_api_key().await? {
                Some(key) => println!("Stored key: {}", mask_key(&key)),
                None => println!("No key stored."),
            },
        },
        Command::Ask {
            question,
            filter,
            approved_only,
            api_key,
        } => {
            let key = app
                .gemini_api_key(api_key.as_deref())
                .await?
                .context("no generative API key; set HELPCENTER_GEMINI_API_KEY or run `helpcenter api-key set`")?;
            let client = GeminiClient::new(&key, &app.config.gemini_model)?;
            let eval = app.evaluate(from_file).await?;
            let mut ranked: Vec<&ScoredArticle> = search_articles(&eval.articles, &filter.to_filter()?);
            if approved_only {
                let approved: BTreeSet<&str> = eval.allowed_chunks().map(|c| c.id.as_str()).collect();
                ranked.retain(|a| approved.contains(a.article.id()));
            }
            let answer = answer_question(&client, &question, &filter.audience(), &ranked).await?;
            display::print_answer(&answer);
        }
        Command::Export { out } => {
            let articles = app.fetch(from_file).await?;
            let export = HelpCenterExport::new(app.config.base_url.clone(), articles);
            export.save(&out)?;
            println!("Saved {} articles to {}", export.articles.len(), out.display());
        }
        Command::Rules => {
            let summary = match &cli.rules {
                Some(path) => {
                    let bytes = std::fs::read(path)
                        .with_context(|| format!("reading keyword rules {}", path.display()))?;
                    KeywordRuleSet::from_json(&bytes)?.summary()
                }
                None => KeywordRuleSet::builtin().summary(),
            };
            display::print_rule_summary(&summary);
        }
    }

    Ok(())
}

async fn run_override(app: &App, command: OverrideCommand) -> anyhow::Result<()> {
    match command {
        OverrideCommand::Set {
            id,
            title,
            body,
            persona,
            tier,
            feature,
            integration,
            region,
            replace,
        } => {
            let edit = ArticleOverride {
                title,
                body,
                persona: non_empty(persona),
                service_tier: non_empty(tier),
                feature_area: non_empty(slugs(&feature)),
                integrations: non_empty(slugs(&integration)),
                regions: non_empty(region),
            };
            let saved = if replace {
                app.console.save_override(&id, &edit).await?;
                edit
            } else {
                app.console.update_override(&id, edit).await?
            };
            if saved.is_empty() {
                println!("{id}: no override stored");
            } else {
                display::print_override(&id, &saved);
            }
        }
        OverrideCommand::Clear { id } => {
            if app.console.remove_override(&id).await? {
                println!("{id}: override cleared");
            } else {
                println!("{id}: no override stored");
            }
        }
        OverrideCommand::List => {
            let ids = app.console.override_ids().await?;
            if ids.is_empty() {
                println!("No overrides stored.");
            }
            for id in ids {
                if let Some(edit) = app.console.get_override(&id).await? {
                    display::print_override(&id, &edit);
                    println!();
                }
            }
        }
        OverrideCommand::Show { id } => match app.console.get_override(&id).await? {
            Some(edit) => display::print_override(&id, &edit),
            None => println!("{id}: no override stored"),
        },
    }
    Ok(())
}
