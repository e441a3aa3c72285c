use anyhow::{Context, Result};
use autopost_common::RejectionPolicy;
use autopost_config::secrets::{self, Secrets};
use autopost_config::{AutopostConfig, GenerationSettings};
use autopost_http::oauth::OAuth1Keys;
use autopost_llm::gemini::GeminiClient;
use autopost_pipeline::{
    Composer, ContentGenerator, DryRunPublisher, GeneratorSettings, LiteralSource, NewsSource,
    Pipeline, PromptStyle, Publisher, Selector, TimelineSource, TweetPublisher,
};
use autopost_social::news::{NewsApi, NewsQuery};
use autopost_social::twitter::{TimelineQuery, TwitterApi};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Reply,
    News,
    Greet,
}

impl JobKind {
    pub fn name(&self) -> &'static str {
        match self {
            JobKind::Reply => "reply",
            JobKind::News => "news",
            JobKind::Greet => "greet",
        }
    }

    /// Credentials this job cannot run without.
    pub fn required_secrets(&self) -> Vec<&'static str> {
        let mut names = secrets::TWITTER_SECRETS.to_vec();
        match self {
            JobKind::Reply => names.push(secrets::GEMINI_API_KEY),
            JobKind::News => names.extend([secrets::GEMINI_API_KEY, secrets::NEWS_API_KEY]),
            JobKind::Greet => {}
        }
        names
    }
}

/// Command-line switches layered over the loaded configuration.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub dry_run: bool,
    pub on_rejection: Option<RejectionPolicy>,
    pub seed: Option<u64>,
}

fn oauth_keys(secrets: &Secrets) -> Result<OAuth1Keys> {
    let creds = secrets.twitter()?;
    Ok(OAuth1Keys {
        consumer_key: creds.consumer_key,
        consumer_secret: creds.consumer_secret,
        access_token: creds.access_token,
        access_token_secret: creds.access_token_secret,
    })
}

fn generator_settings(
    style: PromptStyle,
    generation: &GenerationSettings,
    language: &str,
    system_instruction: Option<String>,
    max_output_tokens: u32,
    policy: RejectionPolicy,
) -> GeneratorSettings {
    GeneratorSettings {
        style,
        language: language.to_string(),
        system_instruction,
        max_output_tokens,
        min_length: generation.min_length,
        char_limit: generation.char_limit,
        policy,
        fallback_template: generation.fallback_template.clone(),
    }
}

fn gemini(cfg: &AutopostConfig, secrets: &Secrets, model: &str) -> Result<GeminiClient> {
    let key = secrets.require(secrets::GEMINI_API_KEY)?;
    GeminiClient::new(&cfg.gemini.base_url, key.to_string(), model.to_string())
        .context("failed to build Gemini client")
}

/// Wire the pipeline for `job`. Nothing here touches the network.
pub fn build_pipeline(
    job: JobKind,
    cfg: &AutopostConfig,
    secrets: &Secrets,
    overrides: &Overrides,
) -> Result<Pipeline> {
    let twitter = TwitterApi::new(&cfg.twitter.base_url, oauth_keys(secrets)?)
        .context("failed to build X API client")?;
    let publisher: Box<dyn Publisher> = if overrides.dry_run {
        Box::new(DryRunPublisher)
    } else {
        Box::new(TweetPublisher::new(twitter.clone()))
    };

    let pipeline = match job {
        JobKind::Reply => {
            let reply = &cfg.reply;
            let settings = generator_settings(
                PromptStyle::Reply,
                &cfg.generation,
                &reply.language,
                None,
                reply.max_output_tokens,
                overrides.on_rejection.unwrap_or(reply.on_rejection),
            );
            let llm = gemini(cfg, secrets, &reply.model)?;
            let query = TimelineQuery {
                max_results: cfg.twitter.max_results,
                exclude: cfg.twitter.exclude.clone(),
            };
            let source = TimelineSource::new(twitter, query).with_user_id(cfg.twitter.user_id.clone());
            Pipeline::new(
                job.name(),
                Box::new(source),
                Selector::MostEngaged,
                Composer::Generate(ContentGenerator::new(Arc::new(llm), settings)),
                publisher,
            )
            .replying()
        }
        JobKind::News => {
            let digest = &cfg.digest;
            let settings = generator_settings(
                PromptStyle::Digest,
                &cfg.generation,
                &digest.language,
                digest.system_instruction.clone(),
                digest.max_output_tokens,
                overrides.on_rejection.unwrap_or(digest.on_rejection),
            );
            let llm = gemini(cfg, secrets, &digest.model)?;
            let news = NewsApi::new(
                &cfg.news.base_url,
                secrets.require(secrets::NEWS_API_KEY)?.to_string(),
            )
            .context("failed to build NewsAPI client")?;
            let query = NewsQuery {
                query: cfg.news.query.clone(),
                sort_by: cfg.news.sort_by.clone(),
                language: cfg.news.language.clone(),
                page_size: cfg.news.page_size,
            };
            Pipeline::new(
                job.name(),
                Box::new(NewsSource::new(news, query)),
                Selector::All,
                Composer::Generate(ContentGenerator::new(Arc::new(llm), settings)),
                publisher,
            )
        }
        JobKind::Greet => Pipeline::new(
            job.name(),
            Box::new(LiteralSource::new(cfg.greetings.messages.clone())),
            Selector::Random {
                seed: overrides.seed,
            },
            Composer::Verbatim {
                char_limit: cfg.generation.char_limit,
            },
            publisher,
        ),
    };
    Ok(pipeline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use autopost_config::SettingsError;
    use autopost_pipeline::RunOutcome;

    fn lookup(name: &str) -> Option<String> {
        match name {
            secrets::NEWS_API_KEY => None,
            other => Some(format!("{}-value", other.to_ascii_lowercase())),
        }
    }

    #[test]
    fn each_job_asks_only_for_what_it_uses() {
        assert_eq!(JobKind::Greet.required_secrets().len(), 4);
        assert!(JobKind::Reply.required_secrets().contains(&secrets::GEMINI_API_KEY));
        assert!(!JobKind::Reply.required_secrets().contains(&secrets::NEWS_API_KEY));
        assert_eq!(JobKind::News.required_secrets().len(), 6);
    }

    #[test]
    fn news_job_reports_missing_key_by_name() {
        let err = Secrets::from_lookup(&JobKind::News.required_secrets(), lookup).unwrap_err();
        assert!(matches!(err, SettingsError::MissingSecrets(ref names) if names == &vec!["NEWS_API_KEY"]));
        assert!(err.to_string().contains("NEWS_API_KEY"));
    }

    #[test]
    fn reply_and_greet_pipelines_build_offline() {
        let cfg = AutopostConfig::default();
        let overrides = Overrides::default();
        for job in [JobKind::Reply, JobKind::Greet] {
            let secrets = Secrets::from_lookup(&job.required_secrets(), lookup).unwrap();
            let pipeline = build_pipeline(job, &cfg, &secrets, &overrides).unwrap();
            assert_eq!(pipeline.name(), job.name());
        }
    }

    #[tokio::test]
    async fn greet_dry_run_posts_a_configured_greeting() {
        let mut cfg = AutopostConfig::default();
        cfg.greetings.messages = vec!["gm everyone".into()];
        let secrets = Secrets::from_lookup(&JobKind::Greet.required_secrets(), lookup).unwrap();
        let overrides = Overrides {
            dry_run: true,
            seed: Some(1),
            ..Overrides::default()
        };

        let outcome = build_pipeline(JobKind::Greet, &cfg, &secrets, &overrides)
            .unwrap()
            .run()
            .await;
        assert_eq!(
            outcome,
            RunOutcome::DryRun {
                text: "gm everyone".into()
            }
        );
    }
}
