//! Census-driven ingestion: crawl each pending Act, parse its articles,
//! annotate cross-references, write a seed, checkpoint the census.

use std::collections::BTreeMap;

use lexitalia_core::{Act, ActStatus, InstrumentType, Provision, dedup_provisions, mark_primary};
use lexitalia_crawl::{Fetcher, SessionFactory};
use lexitalia_parse::{
    LegalTextParser, detect_status, extract_article_targets, extract_cross_references, page_title,
};
use lexitalia_store::{
    CensusEntry, CensusStore, Classification, Outcome, SeedCrossReference, SeedRecord, SeedStore,
};
use reqwest::Url;
use tracing::{debug, info, warn};

use crate::{IngestConfig, IngestError};

/// Which census entries a run touches.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub instrument: Option<InstrumentType>,
    pub year: Option<i32>,
    pub id: Option<String>,
    /// Re-ingest Acts that already have a non-empty seed.
    pub force: bool,
    /// Stop after this many selected Acts.
    pub limit: Option<usize>,
}

/// What happened to one Act.
#[derive(Debug, Clone, PartialEq)]
pub struct ActReport {
    pub id: String,
    pub outcome: Outcome,
    pub provisions: usize,
    pub targets: usize,
    pub failed_targets: usize,
    /// A seed already existed and nothing was fetched.
    pub skipped: bool,
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub passes: u32,
    /// Latest report per Act id.
    pub acts: BTreeMap<String, ActReport>,
}

impl RunReport {
    pub fn count(&self, outcome: Outcome) -> usize {
        self.acts
            .values()
            .filter(|r| !r.skipped && r.outcome == outcome)
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.acts.values().filter(|r| r.skipped).count()
    }

    pub fn provisions(&self) -> usize {
        self.acts.values().map(|r| r.provisions).sum()
    }
}

/// Outcome law for one Act.
///
/// No provisions is always a failure. Otherwise every target succeeding is a
/// success, and a success share of at least `threshold` is partial.
pub fn classify_outcome(provisions: usize, targets: usize, failed: usize, threshold: f64) -> Outcome {
    if provisions == 0 {
        return Outcome::Failed;
    }
    if failed == 0 || targets == 0 {
        return Outcome::Success;
    }
    let ratio = targets.saturating_sub(failed) as f64 / targets as f64;
    if ratio >= threshold {
        Outcome::Partial
    } else {
        Outcome::Failed
    }
}

/// Everything recovered for one Act before it is written.
struct Harvest {
    act: Act,
    provisions: Vec<Provision>,
    targets: usize,
    failed_targets: usize,
}

pub struct Orchestrator<F: SessionFactory> {
    factory: F,
    config: IngestConfig,
    seeds: SeedStore,
    census: CensusStore,
    article_parser: LegalTextParser,
    document_parser: LegalTextParser,
}

impl<F: SessionFactory> Orchestrator<F> {
    pub fn new(factory: F, config: IngestConfig) -> Self {
        Self {
            seeds: SeedStore::new(&config.seeds_dir),
            census: CensusStore::new(&config.census_path),
            factory,
            config,
            article_parser: LegalTextParser::article(),
            document_parser: LegalTextParser::document(),
        }
    }

    pub fn seeds(&self) -> &SeedStore {
        &self.seeds
    }

    fn selects(&self, entry: &CensusEntry, opts: &RunOptions) -> bool {
        let in_scope = match entry.classification {
            Classification::Ingestable => true,
            Classification::PreRepublic => self.config.include_pre_republic,
            Classification::Excluded => false,
        };
        in_scope
            && opts.instrument.is_none_or(|t| t == entry.instrument)
            && opts.year.is_none_or(|y| y == entry.year)
            && opts.id.as_deref().is_none_or(|id| id == entry.id)
    }

    /// Run every configured pass over the selected census entries.
    ///
    /// Per-Act fetch and parse failures are recorded and the run continues;
    /// store failures abort it.
    pub async fn run(&self, opts: &RunOptions) -> Result<RunReport, IngestError> {
        let mut census = self.census.load()?;
        let mut report = RunReport::default();

        let mut pending: Vec<String> = census
            .entries
            .iter()
            .filter(|e| self.selects(e, opts))
            .map(|e| e.id.clone())
            .take(opts.limit.unwrap_or(usize::MAX))
            .collect();
        info!(selected = pending.len(), passes = self.config.passes, "ingestion starting");

        for pass in 1..=self.config.passes {
            if pass > 1 {
                pending.retain(|id| {
                    report
                        .acts
                        .get(id)
                        .is_some_and(|r| !r.skipped && r.outcome == Outcome::Failed)
                });
                if pending.is_empty() {
                    break;
                }
                info!(pass, retrying = pending.len(), pause = ?self.config.pass_pause(), "starting retry pass");
                tokio::time::sleep(self.config.pass_pause()).await;
            }
            report.passes = pass;

            // Retry passes must not be short-circuited by the failed seeds.
            let force = opts.force || pass > 1;
            let mut since_checkpoint = 0;

            for (i, id) in pending.iter().enumerate() {
                let Some(entry) = census.entry(id).cloned() else {
                    continue;
                };
                let act_report = self.process(&entry, force).await?;

                if let Some(slot) = census.entry_mut(id)
                    && (!act_report.skipped || !slot.ingested)
                {
                    slot.mark_ingested(act_report.provisions, act_report.outcome);
                }

                let skipped = act_report.skipped;
                report.acts.insert(id.clone(), act_report);

                since_checkpoint += 1;
                if since_checkpoint >= self.config.checkpoint_every {
                    self.census.save(&mut census)?;
                    since_checkpoint = 0;
                }
                if !skipped && i + 1 < pending.len() {
                    tokio::time::sleep(self.config.act_pause()).await;
                }
            }
            self.census.save(&mut census)?;
        }

        info!(
            passes = report.passes,
            success = report.count(Outcome::Success),
            partial = report.count(Outcome::Partial),
            failed = report.count(Outcome::Failed),
            skipped = report.skipped(),
            provisions = report.provisions(),
            "ingestion finished"
        );
        Ok(report)
    }

    /// Ingest one Act and write its seed. Only store errors escape.
    pub async fn process(&self, entry: &CensusEntry, force: bool) -> Result<ActReport, IngestError> {
        if !force
            && let Some(count) = self.seeds.provision_count(&entry.id)?
            && count > 0
        {
            debug!(id = %entry.id, provisions = count, "seed present, skipping");
            return Ok(ActReport {
                id: entry.id.clone(),
                outcome: entry.outcome.unwrap_or(Outcome::Success),
                provisions: count,
                targets: 0,
                failed_targets: 0,
                skipped: true,
            });
        }

        let harvest = match self.harvest(entry).await {
            Ok(harvest) => harvest,
            Err(e) => {
                warn!(id = %entry.id, error = %e, "act failed");
                let url = self.landing_url(entry).unwrap_or_default();
                self.seeds.write(&SeedRecord::empty(act_for(entry, url)))?;
                return Ok(ActReport {
                    id: entry.id.clone(),
                    outcome: Outcome::Failed,
                    provisions: 0,
                    targets: 0,
                    failed_targets: 0,
                    skipped: false,
                });
            }
        };

        let outcome = classify_outcome(
            harvest.provisions.len(),
            harvest.targets,
            harvest.failed_targets,
            self.config.partial_threshold,
        );

        let mut cross_references: Vec<SeedCrossReference> = harvest
            .provisions
            .iter()
            .flat_map(|p| {
                let provision_ref = p.provision_ref();
                extract_cross_references(&p.body)
                    .into_iter()
                    .map(move |reference| SeedCrossReference {
                        provision_ref: provision_ref.clone(),
                        reference,
                    })
            })
            .collect();
        mark_primary(cross_references.iter_mut().map(|x| &mut x.reference));

        let record = SeedRecord::new(harvest.act, &harvest.provisions, cross_references);
        self.seeds.write(&record)?;

        info!(
            id = %entry.id,
            outcome = outcome.as_str(),
            provisions = record.provisions.len(),
            targets = harvest.targets,
            failed_targets = harvest.failed_targets,
            cross_references = record.cross_references.len(),
            "act ingested"
        );
        Ok(ActReport {
            id: entry.id.clone(),
            outcome,
            provisions: record.provisions.len(),
            targets: harvest.targets,
            failed_targets: harvest.failed_targets,
            skipped: false,
        })
    }

    /// Fetch and parse one Act in a fresh session. An error here fails the
    /// whole Act; individual article failures only lower the outcome.
    async fn harvest(&self, entry: &CensusEntry) -> Result<Harvest, IngestError> {
        let landing_url = self.landing_url(entry)?;
        let session = self.factory.session()?;

        let landing = session
            .fetch(&landing_url)
            .await?
            .into_usable(&landing_url)?;

        let mut act = act_for(entry, landing_url.clone());
        if let Some(observed) = detect_status(&landing.body) {
            act.status = act.status.advance(observed);
        }
        if act.title.trim().is_empty()
            && let Some(title) = page_title(&landing.body)
        {
            act.title = title;
        }

        let targets = extract_article_targets(&landing.body);
        if targets.is_empty() {
            debug!(id = %entry.id, "no article targets, parsing landing page as a document");
            let provisions = self.document_parser.parse_document(&landing.body);
            return Ok(Harvest {
                act,
                provisions,
                targets: 0,
                failed_targets: 0,
            });
        }

        let urls = targets
            .iter()
            .map(|t| resolve(&landing_url, &t.url))
            .collect::<Result<Vec<_>, _>>()?;
        let batch = session.fetch_batch(&urls, self.config.batch_width).await;

        let mut parsed = Vec::with_capacity(batch.successes.len());
        for (url, page) in &batch.successes {
            match self.article_parser.parse(&page.body) {
                Some(provision) => parsed.push(provision),
                None => warn!(id = %entry.id, url = %url, "article page not recognised"),
            }
        }
        // Unrecognised pages count against the Act like failed fetches.
        let failed_targets = urls.len() - parsed.len();

        Ok(Harvest {
            act,
            provisions: dedup_provisions(parsed),
            targets: urls.len(),
            failed_targets,
        })
    }

    /// The census url (resolved against `base_url`), else the URN resolver.
    pub fn landing_url(&self, entry: &CensusEntry) -> Result<String, IngestError> {
        let base = self.config.base_url.trim_end_matches('/');
        if let Some(url) = entry.url.as_deref().filter(|u| !u.trim().is_empty()) {
            return resolve(base, url.trim());
        }
        if let Some(urn) = entry.urn.as_deref().filter(|u| !u.trim().is_empty()) {
            return Ok(format!("{base}/uri-res/N2Ls?{}", urn.trim()));
        }
        Err(IngestError::MissingLocator(entry.id.clone()))
    }
}

fn resolve(base: &str, url: &str) -> Result<String, IngestError> {
    let bad = || IngestError::BadUrl {
        base: base.to_string(),
        url: url.to_string(),
    };
    let base_url = Url::parse(base).map_err(|_| bad())?;
    let joined = base_url.join(url).map_err(|_| bad())?;
    Ok(joined.to_string())
}

fn act_for(entry: &CensusEntry, url: String) -> Act {
    Act {
        id: entry.id.clone(),
        instrument: entry.instrument,
        title: entry.title.clone(),
        short_name: None,
        status: ActStatus::default(),
        issued_date: entry.date.clone(),
        url,
    }
}
