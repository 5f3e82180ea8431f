use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use docnav_navigator::ChangeKind;
use docnav_navigator::IndexDocument;
use docnav_navigator::IndexStore;
use docnav_navigator::LanguageIndex;
use docnav_navigator::NavigatorConfig;
use docnav_navigator::NodeFilter;
use docnav_navigator::NodeRef;
use docnav_navigator::Segment;
use docnav_navigator::fetch::decode_api_changes;
use docnav_navigator::fetch::source_for;
use docnav_navigator::highlight;
use docnav_navigator::index::with_ancestors;
use docnav_navigator::load_document;
use docnav_navigator::paging::page_count;
use docnav_navigator::quick_navigation;
use docnav_navigator::references::ReferenceActivity;
use docnav_navigator::references::activity;
use docnav_navigator::references::filter_references;
use docnav_navigator::store::IndexState;
use serde_json::json;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Parser)]
#[command(name = "docnav", about = "Browse documentation navigator indexes")]
pub struct DocnavCli {
    /// Locale slug of the index to load (e.g. ja-JP).
    #[arg(long = "locale", global = true)]
    pub locale: Option<String>,

    /// Log navigator activity to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: DocnavCommand,
}

#[derive(Debug, Subcommand)]
pub enum DocnavCommand {
    /// Print one page of the flattened outline.
    Flatten(FlattenCommand),
    /// Fuzzy or filtered search over node titles.
    Search(SearchCommand),
    /// List references and whether they are active.
    Refs(RefsCommand),
    /// List technologies found in the index.
    Technologies(TechnologiesCommand),
}

#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Index file, documentation root, or http(s) base url.
    #[arg(value_name = "SOURCE")]
    pub source: String,

    /// Output format.
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub output_format: OutputFormat,
}

#[derive(Copy, Clone, Debug, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    #[default]
    Text,
}

#[derive(Debug, Parser)]
pub struct FlattenCommand {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Interface language (falls back to swift).
    #[arg(long = "lang")]
    pub language: Option<String>,

    /// Nodes per page.
    #[arg(long = "page-size")]
    pub page_size: Option<usize>,

    /// 1-based page number.
    #[arg(long = "page", default_value = "1")]
    pub page: usize,
}

#[derive(Copy, Clone, Debug, Default, ValueEnum, PartialEq, Eq)]
pub enum SearchMode {
    /// Fuzzy subsequence match, tightest match first.
    #[default]
    Quick,
    /// Literal title filter, shown with ancestors.
    Filter,
}

#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum ChangeArg {
    Added,
    Modified,
    Deprecated,
}

impl From<ChangeArg> for ChangeKind {
    fn from(arg: ChangeArg) -> Self {
        match arg {
            ChangeArg::Added => ChangeKind::Added,
            ChangeArg::Modified => ChangeKind::Modified,
            ChangeArg::Deprecated => ChangeKind::Deprecated,
        }
    }
}

#[derive(Debug, Parser)]
pub struct SearchCommand {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Search text.
    #[arg(value_name = "QUERY", num_args = 1.., required = true)]
    pub query: Vec<String>,

    #[arg(long = "lang")]
    pub language: Option<String>,

    /// Maximum number of results.
    #[arg(long = "limit")]
    pub limit: Option<usize>,

    #[arg(long = "mode", value_enum, default_value_t = SearchMode::Quick)]
    pub mode: SearchMode,

    /// Restrict filter mode to node kinds (repeatable).
    #[arg(long = "kind")]
    pub kinds: Vec<String>,

    /// Hide deprecated nodes in filter mode.
    #[arg(long = "hide-deprecated")]
    pub hide_deprecated: bool,

    /// JSON map of node path to API change; filter mode keeps changed nodes only.
    #[arg(long = "changes", value_name = "FILE")]
    pub changes: Option<PathBuf>,

    /// Change kinds that count as a kind match (repeatable).
    #[arg(long = "change", value_enum)]
    pub change_kinds: Vec<ChangeArg>,
}

#[derive(Debug, Parser)]
pub struct RefsCommand {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Treat these archives as loaded instead of the ones the index lists.
    #[arg(long = "include", value_name = "ARCHIVE")]
    pub include: Vec<String>,

    /// Only print inactive references.
    #[arg(long = "inactive-only")]
    pub inactive_only: bool,
}

#[derive(Debug, Parser)]
pub struct TechnologiesCommand {
    #[command(flatten)]
    pub source: SourceArgs,
}

pub async fn run(cli: DocnavCli) -> Result<()> {
    let config = NavigatorConfig::from_env();
    let locale = cli.locale.as_deref();
    match cli.command {
        DocnavCommand::Flatten(cmd) => run_flatten(cmd, &config, locale).await,
        DocnavCommand::Search(cmd) => run_search(cmd, &config, locale).await,
        DocnavCommand::Refs(cmd) => run_refs(cmd, &config, locale).await,
        DocnavCommand::Technologies(cmd) => run_technologies(cmd, &config, locale).await,
    }
}

async fn load(
    args: &SourceArgs,
    config: &NavigatorConfig,
    locale: Option<&str>,
    changes: Option<&Path>,
) -> Result<(IndexDocument, IndexState)> {
    let source = source_for(&args.source, config.request_timeout)
        .with_context(|| format!("invalid index source `{}`", args.source))?;
    let store = IndexStore::new();
    let Some(document) = load_document(source.as_ref(), &store, locale).await else {
        bail!("failed to load navigator index from {}", source.describe());
    };
    if let Some(path) = changes {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read api changes from {}", path.display()))?;
        store.set_api_changes(decode_api_changes(&bytes)?);
    }
    let state = store.snapshot();
    debug!(
        "loaded {} language outline(s) from {}",
        state.flat.languages.len(),
        source.describe()
    );
    Ok((document, state))
}

fn pick_language<'a>(
    state: &'a IndexState,
    requested: Option<&str>,
    config: &NavigatorConfig,
) -> Result<(&'a str, &'a LanguageIndex)> {
    let wanted = requested.unwrap_or(config.default_language.as_str());
    match state.flat.language_or_default(wanted, &config.default_language) {
        Some(picked) => Ok(picked),
        None => bail!("index has no `{wanted}` outline"),
    }
}

async fn run_flatten(
    cmd: FlattenCommand,
    config: &NavigatorConfig,
    locale: Option<&str>,
) -> Result<()> {
    let (_, state) = load(&cmd.source, config, locale, None).await?;
    let (language, index) = pick_language(&state, cmd.language.as_deref(), config)?;
    let page_size = cmd.page_size.unwrap_or(config.page_size);
    let pages = index.pages(page_size)?;
    let total_pages = page_count(index.len(), page_size)?;
    if cmd.page == 0 || (cmd.page > total_pages && total_pages > 0) {
        bail!("page {} is out of range (1..={total_pages})", cmd.page);
    }
    let nodes: &[NodeRef<'_>] = pages
        .get(cmd.page - 1)
        .map(Vec::as_slice)
        .unwrap_or_default();

    match cmd.source.output_format {
        OutputFormat::Json => {
            let out = json!({
                "language": language,
                "page": cmd.page,
                "pages": total_pages,
                "total": index.len(),
                "nodes": nodes,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => {
            println!(
                "{language}: page {} of {total_pages} ({} nodes)",
                cmd.page,
                index.len()
            );
            for node in nodes {
                println!("{}", format_outline_line(node));
            }
        }
    }
    Ok(())
}

fn format_outline_line(node: &NodeRef<'_>) -> String {
    let mut line = format!("{:>4} {}{}", node.id(), "  ".repeat(node.depth), node.title);
    if let Some(kind) = node.kind.as_deref() {
        line.push_str(&format!(" ({kind})"));
    }
    if let Some(path) = node.path.as_deref() {
        line.push_str(&format!(" {path}"));
    }
    if node.beta {
        line.push_str(" [beta]");
    }
    if node.deprecated {
        line.push_str(" [deprecated]");
    }
    line
}

async fn run_search(
    cmd: SearchCommand,
    config: &NavigatorConfig,
    locale: Option<&str>,
) -> Result<()> {
    let (_, state) = load(&cmd.source, config, locale, cmd.changes.as_deref()).await?;
    let (_, index) = pick_language(&state, cmd.language.as_deref(), config)?;
    let query = cmd.query.join(" ");
    let limit = cmd.limit.unwrap_or(config.quick_nav_limit);

    match cmd.mode {
        SearchMode::Quick => {
            let hits = quick_navigation(index, &query, limit);
            match cmd.source.output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&hits)?),
                OutputFormat::Text => {
                    if hits.is_empty() {
                        println!("hits: none");
                    }
                    for hit in &hits {
                        println!(
                            "{:>4} {} {}",
                            hit.id(),
                            render_marked(&hit.segments),
                            hit.node.path.as_deref().unwrap_or_default()
                        );
                    }
                }
            }
        }
        SearchMode::Filter => {
            let mut filter = NodeFilter::new()
                .with_query(&query)?
                .with_kinds(cmd.kinds.iter().cloned())
                .with_change_kinds(cmd.change_kinds.iter().copied().map(ChangeKind::from))
                .hide_deprecated(cmd.hide_deprecated);
            if cmd.changes.is_some() {
                filter = filter.with_changes(Arc::clone(&state.api_changes));
            }
            let mut matched = filter.apply(index);
            matched.truncate(limit);
            match cmd.source.output_format {
                OutputFormat::Json => {
                    let out = json!({
                        "matches": matched,
                        "tree": with_ancestors(index, &matched),
                    });
                    println!("{}", serde_json::to_string_pretty(&out)?);
                }
                OutputFormat::Text => {
                    if matched.is_empty() {
                        println!("hits: none");
                    }
                    for id in matched {
                        let trail: Vec<&str> = index
                            .ancestors(id)
                            .iter()
                            .map(|node| node.node().title.as_str())
                            .collect();
                        let Some((title, parents)) = trail.split_last() else {
                            continue;
                        };
                        let segments: Vec<Segment<'_>> =
                            highlight(title, filter.pattern()).collect();
                        let mut line = format!("{id:>4} ");
                        for parent in parents {
                            line.push_str(&format!("{parent} › "));
                        }
                        line.push_str(&render_marked(&segments));
                        println!("{line}");
                    }
                }
            }
        }
    }
    Ok(())
}

/// Wraps matched runs in `[[` `]]`.
fn render_marked(segments: &[Segment<'_>]) -> String {
    segments
        .iter()
        .map(|segment| {
            if segment.matched {
                format!("[[{}]]", segment.text)
            } else {
                segment.text.to_string()
            }
        })
        .collect()
}

async fn run_refs(cmd: RefsCommand, config: &NavigatorConfig, locale: Option<&str>) -> Result<()> {
    let (document, state) = load(&cmd.source, config, locale, None).await?;
    let (references, archives) = if cmd.include.is_empty() {
        (
            state.references.as_ref().clone(),
            state.included_archive_identifiers.to_vec(),
        )
    } else {
        (
            filter_references(&document.references, &cmd.include),
            cmd.include.clone(),
        )
    };

    let rows: Vec<_> = references
        .iter()
        .map(|(key, record)| (key, record, activity(key, record, &archives)))
        .filter(|(_, _, status)| !cmd.inactive_only || *status == ReferenceActivity::Inactive)
        .collect();

    match cmd.source.output_format {
        OutputFormat::Json => {
            let out: Vec<_> = rows
                .iter()
                .map(|(key, record, status)| {
                    json!({
                        "key": key,
                        "activity": status,
                        "reference": record,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => {
            for (key, record, status) in rows {
                let label = match status {
                    ReferenceActivity::Active => "active",
                    ReferenceActivity::Inactive => "inactive",
                };
                match record.url.as_deref() {
                    Some(url) => println!("{label:<8} {key} -> {url}"),
                    None => println!("{label:<8} {key}"),
                }
            }
        }
    }
    Ok(())
}

async fn run_technologies(
    cmd: TechnologiesCommand,
    config: &NavigatorConfig,
    locale: Option<&str>,
) -> Result<()> {
    let (_, state) = load(&cmd.source, config, locale, None).await?;
    match cmd.source.output_format {
        OutputFormat::Json => {
            let out: Vec<_> = state.technologies.values().collect();
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => {
            for props in state.technologies.values() {
                let beta = if props.beta { " [beta]" } else { "" };
                println!(
                    "{} {} children={} languages={}{beta}",
                    props.title,
                    props.identifier,
                    props.child_count,
                    props.languages.join(",")
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn marks_matched_runs() {
        let segments = [
            Segment {
                text: "So",
                matched: false,
            },
            Segment {
                text: "me String",
                matched: true,
            },
            Segment {
                text: " to Match",
                matched: false,
            },
        ];
        assert_eq!(render_marked(&segments), "So[[me String]] to Match");
    }

    #[test]
    fn picks_requested_then_configured_language() {
        let document: IndexDocument = serde_json::from_value(json!({
            "interfaceLanguages": {
                "swift": [{ "title": "Kit", "path": "/documentation/kit" }],
                "occ": [
                    { "title": "KitObjC", "path": "/documentation/kitobjc" },
                    { "title": "More", "path": "/documentation/more" }
                ],
                "data": []
            }
        }))
        .unwrap();
        let store = IndexStore::new();
        store.populate(docnav_navigator::fetch::prepare(&document));
        let state = store.snapshot();
        let config = NavigatorConfig {
            default_language: "occ".to_string(),
            ..NavigatorConfig::default()
        };
        let picked = |requested: Option<&str>| {
            pick_language(&state, requested, &config)
                .map(|(name, index)| (name.to_string(), index.len()))
                .unwrap()
        };
        assert_eq!(picked(None), ("occ".to_string(), 2));
        assert_eq!(picked(Some("swift")), ("swift".to_string(), 1));
        assert_eq!(picked(Some("data")), ("occ".to_string(), 2));
        assert_eq!(picked(Some("kotlin")), ("occ".to_string(), 2));

        let missing = NavigatorConfig {
            default_language: "kotlin".to_string(),
            ..NavigatorConfig::default()
        };
        assert!(pick_language(&state, None, &missing).is_err());
    }

    #[test]
    fn parses_search_arguments() {
        let cli = DocnavCli::try_parse_from([
            "docnav",
            "search",
            "index.json",
            "sloth",
            "sleep",
            "--mode",
            "filter",
            "--kind",
            "method",
            "--locale",
            "ja-JP",
            "--changes",
            "diff.json",
            "--change",
            "added",
            "--change",
            "deprecated",
        ])
        .unwrap();
        assert_eq!(cli.locale.as_deref(), Some("ja-JP"));
        let DocnavCommand::Search(cmd) = cli.command else {
            panic!("expected search command");
        };
        assert_eq!(cmd.query, vec!["sloth".to_string(), "sleep".to_string()]);
        assert_eq!(cmd.mode, SearchMode::Filter);
        assert_eq!(cmd.kinds, vec!["method".to_string()]);
        assert_eq!(cmd.changes, Some(PathBuf::from("diff.json")));
        assert_eq!(cmd.change_kinds, vec![ChangeArg::Added, ChangeArg::Deprecated]);
        assert_eq!(cmd.source.output_format, OutputFormat::Text);
    }
}
