// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use docsage::exporter::{build_charts, render_terminal};
use docsage::llm::clean_for_display;
use docsage::models::{ProfileOutcome, ReportDocument, Role};
use docsage::utils::logging::{
    format_count, format_error, format_heading, format_info, format_success, format_warning,
};
use docsage::{
    Answer, ChunkIndex, Comparator, ComparisonReport, Config, DocumentAssistant,
    DocumentRegistry, Embedder, GroqClient, HealthCheck, HealthReport, IngestOutcome,
    IngestPipeline, JsonExporter, LanceDbClient, MarkdownRenderer, MemoryIndex, OperationTimer,
    PdfReportWriter, SchemaManager, SessionStore,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "docsage")]
#[command(author = "cipher")]
#[command(version = "0.1.0")]
#[command(about = "Question answering and comparison over PDF documents", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load, chunk and index documents
    Ingest {
        paths: Vec<PathBuf>,

        /// Also ingest every loadable file below this directory
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,

        #[arg(long)]
        force: bool,
    },

    Documents {
        #[command(subcommand)]
        action: DocumentCommand,
    },

    /// Ask one question about a document
    Ask {
        question: String,

        #[arg(long)]
        doc: Option<String>,

        #[arg(long)]
        session: Option<String>,
    },

    /// Interactive question loop
    Chat {
        #[arg(long)]
        doc: Option<String>,

        #[arg(long)]
        session: Option<String>,
    },

    Sessions {
        #[command(subcommand)]
        action: SessionCommand,
    },

    /// Search indexed chunks by semantic similarity
    Search {
        query: String,

        #[arg(long)]
        doc: Option<String>,

        #[arg(short, long, default_value_t = 5)]
        limit: usize,
    },

    /// Compare two or three documents aspect by aspect
    Compare {
        #[arg(conflicts_with = "files")]
        doc_ids: Vec<String>,

        /// Compare files directly without adding them to the index
        #[arg(long, num_args = 1..)]
        files: Vec<PathBuf>,

        #[arg(long = "aspect")]
        aspects: Vec<String>,

        #[arg(long)]
        role: Option<String>,

        #[arg(long)]
        recommend: bool,

        #[arg(long)]
        structured: bool,

        #[arg(long)]
        charts: bool,

        #[arg(long, value_name = "FILE")]
        pdf: Option<PathBuf>,

        #[arg(long, value_name = "DIR")]
        json: Option<PathBuf>,
    },

    Stats,

    Health,

    Reset {
        #[arg(long)]
        confirm: bool,
    },
}

#[derive(Subcommand)]
enum DocumentCommand {
    List,
    Show { id: String },
    Remove { id: String },
    /// Make a document the default for questions
    Use { id: String },
}

#[derive(Subcommand)]
enum SessionCommand {
    List,
    Show {
        id: String,
    },
    Clear {
        id: String,
    },
    Delete {
        id: String,
    },
    Export {
        id: String,

        #[arg(short, long, default_value = "./exports")]
        output: PathBuf,

        #[arg(short, long)]
        pretty: bool,
    },
}

struct CompareOptions {
    aspects: Vec<String>,
    role: Option<String>,
    recommend: bool,
    structured: bool,
    charts: bool,
    pdf: Option<PathBuf>,
    json: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    docsage::utils::logging::init_logger(cli.color, cli.verbose);

    info!("Loading configuration from: {}", cli.config.display());

    let config = if cli.config.exists() {
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?
    } else {
        warn!(
            "Config file {} not found, using default configuration",
            cli.config.display()
        );
        Config::load(None).unwrap_or_else(|e| {
            warn!("Falling back to built-in defaults: {}", e);
            Config::default_config()
        })
    };

    match cli.command {
        Commands::Ingest { paths, dir, force } => {
            cmd_ingest(&config, paths, dir, force, cli.color).await?;
        }
        Commands::Documents { action } => {
            cmd_documents(&config, action).await?;
        }
        Commands::Ask {
            question,
            doc,
            session,
        } => {
            cmd_ask(&config, &question, doc.as_deref(), session).await?;
        }
        Commands::Chat { doc, session } => {
            cmd_chat(&config, doc.as_deref(), session).await?;
        }
        Commands::Sessions { action } => {
            cmd_sessions(&config, action).await?;
        }
        Commands::Search { query, doc, limit } => {
            cmd_search(&config, &query, doc.as_deref(), limit).await?;
        }
        Commands::Compare {
            doc_ids,
            files,
            aspects,
            role,
            recommend,
            structured,
            charts,
            pdf,
            json,
        } => {
            let options = CompareOptions {
                aspects,
                role,
                recommend,
                structured,
                charts,
                pdf,
                json,
            };
            cmd_compare(&config, doc_ids, files, &options).await?;
        }
        Commands::Stats => {
            cmd_stats(&config).await?;
        }
        Commands::Health => {
            cmd_health(&config).await?;
        }
        Commands::Reset { confirm } => {
            cmd_reset(&config, confirm).await?;
        }
    }

    Ok(())
}

async fn connect_index(config: &Config) -> Result<Arc<LanceDbClient>> {
    let client = LanceDbClient::new(config.database.clone(), config.embedding.dimension)
        .await
        .context("Failed to create LanceDB client")?;

    if !client.ping().await? {
        error!("Cannot connect to LanceDB");
        return Err(anyhow::anyhow!("Database connection failed"));
    }

    Ok(Arc::new(client))
}

async fn open_index(config: &Config) -> Result<Arc<LanceDbClient>> {
    let client = connect_index(config).await?;
    SchemaManager::new(&client)
        .verify_schema()
        .await
        .context("Chunk table does not match the configured embeddings")?;
    Ok(client)
}

async fn open_registry(config: &Config) -> Result<DocumentRegistry> {
    DocumentRegistry::open(&config.storage.state_dir)
        .await
        .context("Failed to load document registry")
}

async fn open_sessions(config: &Config) -> Result<SessionStore> {
    SessionStore::open(&config.storage.state_dir)
        .await
        .context("Failed to load chat sessions")
}

fn chat_model(config: &Config) -> Result<Arc<GroqClient>> {
    let client = GroqClient::from_config(&config.llm).context("Failed to create LLM client")?;
    Ok(Arc::new(client))
}

async fn cmd_ingest(
    config: &Config,
    mut paths: Vec<PathBuf>,
    dir: Option<PathBuf>,
    force: bool,
    color: bool,
) -> Result<()> {
    info!("Starting ingestion");
    let start_time = Instant::now();

    let index = open_index(config).await?;
    let embedder = Arc::new(Embedder::from_config(&config.embedding));
    let pipeline = IngestPipeline::new(config, embedder, index)?.with_progress(color);

    if let Some(dir) = dir {
        let found = pipeline
            .scan_directory(&dir)
            .context("Failed to scan directory")?;
        info!("Found {} files in {}", found.len(), dir.display());
        paths.extend(found);
    }

    if paths.is_empty() {
        println!("{}", format_warning("No documents to ingest"));
        return Ok(());
    }

    let mut registry = open_registry(config).await?;
    let (outcomes, stats) = pipeline
        .process_multiple_documents(&mut registry, &paths, force)
        .await?;

    println!();
    for outcome in &outcomes {
        match outcome {
            IngestOutcome::Success(record) => println!(
                "{}",
                format_success(&format!(
                    "{} -> '{}' ({} pages, {} chunks, {} words)",
                    record.filename,
                    record.doc_id,
                    record.stats.total_pages,
                    record.stats.total_chunks,
                    format_count(record.stats.total_words)
                ))
            ),
            IngestOutcome::Skipped(record) => println!(
                "{}",
                format_info(&format!("{} unchanged, skipped", record.filename))
            ),
            IngestOutcome::Failed { path, error } => println!(
                "{}",
                format_error(&format!("{}: {}", path.display(), error))
            ),
        }
    }

    if let Some(last) = outcomes.iter().rev().find_map(IngestOutcome::record) {
        let doc_id = last.doc_id.clone();
        registry.set_active(&doc_id)?;
        registry.save().await?;
        println!("{}", format_info(&format!("Active document: {}", doc_id)));
    }

    info!(
        "Ingestion complete in {:.2}s ({:.1}% succeeded)",
        start_time.elapsed().as_secs_f64(),
        stats.success_rate()
    );

    Ok(())
}

async fn cmd_documents(config: &Config, action: DocumentCommand) -> Result<()> {
    let mut registry = open_registry(config).await?;

    match action {
        DocumentCommand::List => {
            if registry.is_empty() {
                println!("No documents ingested yet. Use `docsage ingest <FILE>`.");
                return Ok(());
            }

            let active = registry.active().map(|r| r.doc_id.clone());
            println!("{}", format_heading("Documents"));
            for record in registry.list() {
                let marker = if active.as_deref() == Some(record.doc_id.as_str()) {
                    "*"
                } else {
                    " "
                };
                println!(
                    "{} {:<30} {:<40} {:>4} pages {:>5} chunks {:>8} words",
                    marker,
                    record.doc_id,
                    record.filename,
                    record.stats.total_pages,
                    record.stats.total_chunks,
                    format_count(record.stats.total_words)
                );
            }
        }
        DocumentCommand::Show { id } => {
            let record = registry.require(&id)?;
            println!("{}", format_heading(&record.doc_id));
            println!("Source: {}", record.source_path);
            println!("Hash: {}", record.content_hash);
            println!(
                "Ingested: {}",
                record.ingested_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
            println!();
            println!("{}", docsage::assistant::statistics_answer(record));
        }
        DocumentCommand::Remove { id } => {
            registry.require(&id)?;
            let index = open_index(config).await?;
            index
                .remove_document(&id)
                .await
                .context("Failed to remove document chunks")?;
            registry.remove(&id);
            registry.save().await?;
            println!("{}", format_success(&format!("Removed '{}'", id)));
        }
        DocumentCommand::Use { id } => {
            registry.set_active(&id)?;
            registry.save().await?;
            println!("{}", format_success(&format!("Active document: {}", id)));
        }
    }

    Ok(())
}

fn print_answer(answer: &Answer) {
    let text = if answer.from_statistics {
        answer.answer.clone()
    } else {
        clean_for_display(&answer.answer)
    };

    println!("\n{}\n", text);

    if !answer.sources.is_empty() {
        println!("{}", format_heading("Sources"));
        for (idx, source) in answer.sources.iter().enumerate() {
            println!("  {}. {}", idx + 1, source.replace('\n', " "));
        }
        println!();
    }

    println!(
        "{}",
        format_info(&format!(
            "Session {} ({} exchanges)",
            answer.session_id, answer.conversation_length
        ))
    );
}

async fn cmd_ask(
    config: &Config,
    question: &str,
    doc: Option<&str>,
    session: Option<String>,
) -> Result<()> {
    let registry = open_registry(config).await?;
    let mut sessions = open_sessions(config).await?;
    let assistant = DocumentAssistant::new(
        chat_model(config)?,
        open_index(config).await?,
        Arc::new(Embedder::from_config(&config.embedding)),
        config.retrieval.clone(),
    );

    let session_id = session.unwrap_or_else(|| sessions.new_session_id());
    let answer = assistant
        .ask_question(&registry, &mut sessions, doc, question, &session_id)
        .await
        .context("Failed to answer question")?;

    print_answer(&answer);
    Ok(())
}

async fn cmd_chat(config: &Config, doc: Option<&str>, session: Option<String>) -> Result<()> {
    let registry = open_registry(config).await?;
    let mut sessions = open_sessions(config).await?;
    let assistant = DocumentAssistant::new(
        chat_model(config)?,
        open_index(config).await?,
        Arc::new(Embedder::from_config(&config.embedding)),
        config.retrieval.clone(),
    );

    let Some(record) = registry.resolve(doc) else {
        println!("{}", format_warning("Please upload and process a document first."));
        return Ok(());
    };

    let mut session_id = session.unwrap_or_else(|| sessions.new_session_id());
    let mut last_sources: Vec<String> = Vec::new();

    println!("{}", format_heading(&format!("Chatting with {}", record.filename)));
    println!("Commands: /new /clear /history /sources /exit\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();

        match input {
            "" => continue,
            "/exit" | "/quit" => break,
            "/new" => {
                session_id = sessions.new_session_id();
                last_sources.clear();
                println!("{}", format_info(&format!("New session {}", session_id)));
            }
            "/clear" => {
                if sessions.clear(&session_id).await? {
                    println!("{}", format_success("Conversation history cleared"));
                } else {
                    println!("{}", format_info("Nothing to clear"));
                }
                last_sources.clear();
            }
            "/history" => print_history(&sessions, &session_id),
            "/sources" => {
                if last_sources.is_empty() {
                    println!("{}", format_info("No sources for the last answer"));
                }
                for (idx, source) in last_sources.iter().enumerate() {
                    println!("  {}. {}", idx + 1, source.replace('\n', " "));
                }
            }
            question => {
                match assistant
                    .ask_question(
                        &registry,
                        &mut sessions,
                        Some(record.doc_id.as_str()),
                        question,
                        &session_id,
                    )
                    .await
                {
                    Ok(answer) => {
                        let text = if answer.from_statistics {
                            answer.answer.clone()
                        } else {
                            clean_for_display(&answer.answer)
                        };
                        println!("\n{}\n", text);
                        last_sources = answer.sources;
                    }
                    Err(e) => println!("{}", format_error(&format!("Error: {}", e))),
                }
            }
        }
    }

    println!("{}", format_info(&format!("Session {} saved", session_id)));
    Ok(())
}

fn print_history(sessions: &SessionStore, session_id: &str) {
    let history = sessions.history(session_id);
    if history.is_empty() {
        println!("{}", format_info("No messages yet"));
        return;
    }

    for message in history {
        let label = match message.role {
            Role::User => "You",
            Role::Assistant => "Assistant",
        };
        println!(
            "[{}] {}: {}",
            message.timestamp.format("%H:%M:%S"),
            label,
            message.content
        );
    }
}

async fn cmd_sessions(config: &Config, action: SessionCommand) -> Result<()> {
    let mut sessions = open_sessions(config).await?;

    match action {
        SessionCommand::List => {
            if sessions.is_empty() {
                println!("No chat sessions yet.");
                return Ok(());
            }
            println!("{}", format_heading("Sessions"));
            for summary in sessions.list() {
                println!(
                    "{}  {:<30} {:>3} exchanges  updated {}",
                    summary.session_id,
                    summary.doc_id.as_deref().unwrap_or("-"),
                    summary.qa_count,
                    summary.updated_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        SessionCommand::Show { id } => {
            if sessions.get(&id).is_none() {
                return Err(anyhow::anyhow!("Unknown session: {}", id));
            }
            print_history(&sessions, &id);
        }
        SessionCommand::Clear { id } => {
            if sessions.clear(&id).await? {
                println!("{}", format_success(&format!("Cleared session {}", id)));
            } else {
                println!("{}", format_warning(&format!("Unknown session: {}", id)));
            }
        }
        SessionCommand::Delete { id } => {
            if sessions.delete(&id).await? {
                println!("{}", format_success(&format!("Deleted session {}", id)));
            } else {
                println!("{}", format_warning(&format!("Unknown session: {}", id)));
            }
        }
        SessionCommand::Export { id, output, pretty } => {
            let export = sessions.export(&id)?;
            let mut exporter = JsonExporter::new(output)?;
            let path = exporter.export_conversation(&export, pretty)?;
            exporter.write_manifest()?;
            println!(
                "{}",
                format_success(&format!("Exported conversation to {}", path.display()))
            );
        }
    }

    Ok(())
}

async fn cmd_search(config: &Config, query: &str, doc: Option<&str>, limit: usize) -> Result<()> {
    info!("Searching for: {}", query);

    let index = open_index(config).await?;
    let embedder = Embedder::from_config(&config.embedding);
    let query_embedding = embedder.embed(query).await?;

    let results = index
        .search(&query_embedding, limit, doc)
        .await
        .context("Vector search failed")?;

    if results.is_empty() {
        println!("\nNo results found for query: \"{}\"\n", query);
        println!("Try:");
        println!("  - Using different search terms");
        println!("  - Removing the document filter");
        println!("  - Checking that documents have been ingested");
        return Ok(());
    }

    println!("\nSearch Results for: \"{}\"\n", query);
    println!("Found {} result(s)\n", results.len());
    println!("{}", "=".repeat(80));

    for (idx, result) in results.iter().enumerate() {
        println!("\n{}. {}", idx + 1, result.format_summary(300));
    }

    println!("{}", "=".repeat(80));
    Ok(())
}

async fn cmd_compare(
    config: &Config,
    doc_ids: Vec<String>,
    files: Vec<PathBuf>,
    options: &CompareOptions,
) -> Result<()> {
    let llm = chat_model(config)?;
    let embedder = Arc::new(Embedder::from_config(&config.embedding));

    if files.is_empty() {
        let index = open_index(config).await?;
        let registry = open_registry(config).await?;
        return run_comparison(config, llm, index, embedder, &registry, doc_ids, options).await;
    }

    info!("Indexing {} files for an ad-hoc comparison", files.len());
    let index = Arc::new(MemoryIndex::new());
    let mut registry = DocumentRegistry::in_memory();
    let pipeline = IngestPipeline::new(config, embedder.clone(), index.clone())?;
    let (outcomes, _) = pipeline
        .process_multiple_documents(&mut registry, &files, true)
        .await?;

    let mut ids = Vec::with_capacity(outcomes.len());
    for outcome in &outcomes {
        match outcome {
            IngestOutcome::Failed { path, error } => println!(
                "{}",
                format_error(&format!("{}: {}", path.display(), error))
            ),
            other => {
                if let Some(record) = other.record() {
                    ids.push(record.doc_id.clone());
                }
            }
        }
    }

    run_comparison(config, llm, index, embedder, &registry, ids, options).await
}

async fn run_comparison<I: ChunkIndex>(
    config: &Config,
    llm: Arc<GroqClient>,
    index: Arc<I>,
    embedder: Arc<Embedder>,
    registry: &DocumentRegistry,
    doc_ids: Vec<String>,
    options: &CompareOptions,
) -> Result<()> {
    let comparator = Comparator::new(llm, index, embedder, config.comparison.clone());
    comparator.validate_selection(&doc_ids)?;

    let aspects = if options.aspects.is_empty() {
        config.comparison_aspects()
    } else {
        options.aspects.clone()
    };

    let timer = OperationTimer::new("comparison report");
    let matrix = comparator
        .compare_documents(registry, &doc_ids, &aspects)
        .await
        .context("Comparison failed")?;

    let documents: Vec<ReportDocument> = doc_ids
        .iter()
        .filter_map(|id| registry.get(id))
        .map(ReportDocument::from)
        .collect();
    let mut report = ComparisonReport::new(documents, matrix);

    println!();
    for aspect in &report.matrix.aspects {
        println!("{}", format_heading(&aspect.aspect));
        for (doc_id, finding) in &aspect.findings {
            println!("{}:", report.display_name(doc_id));
            for line in finding.display_text().lines() {
                println!("  {}", line);
            }
        }
        println!();
    }

    if options.structured || options.charts {
        report.profiles = comparator.extract_profiles(registry, &doc_ids).await;
        timer.checkpoint("profiles extracted");
    }

    if options.structured {
        print_profiles(&report);
    }

    if options.charts {
        report.charts = build_charts(&report.documents, &report.profiles);
        for chart in &report.charts {
            println!("{}", render_terminal(chart, 40));
        }
    }

    if options.recommend {
        match comparator
            .get_recommendation(
                registry,
                &doc_ids,
                Some(&report.matrix),
                options.role.as_deref(),
            )
            .await
        {
            Ok(recommendation) => {
                println!("{}", format_heading("Recommendation"));
                println!("{}\n", MarkdownRenderer::new().to_plain_text(&recommendation));
                report.recommendation = Some(recommendation);
            }
            Err(e) => println!(
                "{}",
                format_error(&format!("Recommendation failed: {}", e))
            ),
        }
    }

    if let Some(path) = &options.pdf {
        write_pdf(&report, path)?;
    }

    if let Some(dir) = &options.json {
        let mut exporter = JsonExporter::new(dir.clone())?;
        let path = exporter.export_report(&report, true)?;
        exporter.write_manifest()?;
        println!(
            "{}",
            format_success(&format!("JSON report written to {}", path.display()))
        );
    }

    timer.finish();
    Ok(())
}

fn print_profiles(report: &ComparisonReport) {
    println!("{}", format_heading("Structured Profiles"));
    for (doc_id, outcome) in &report.profiles {
        let name = report.display_name(doc_id);
        match outcome {
            ProfileOutcome::Parsed { profile } => {
                println!("{}:", name);
                println!("  Name: {}", profile.name);
                println!("  Email: {}", profile.email);
                println!("  Phone: {}", profile.phone);
                println!("  Experience: {} years", profile.experience_years);
                println!("  Skills: {}", profile.skills.join(", "));
                println!("  Education: {}", profile.education.join("; "));
                println!("  Certifications: {}", profile.certifications.join("; "));
                for achievement in &profile.key_achievements {
                    println!("  - {}", achievement);
                }
            }
            ProfileOutcome::Unparsed { raw_response } => println!(
                "{}",
                format_warning(&format!(
                    "{}: could not parse structured data: {}",
                    name, raw_response
                ))
            ),
            ProfileOutcome::Failed { error } => {
                println!("{}", format_error(&format!("{}: {}", name, error)))
            }
        }
    }
    println!();
}

fn write_pdf(report: &ComparisonReport, path: &Path) -> Result<()> {
    PdfReportWriter::new()
        .write(report, path)
        .with_context(|| format!("Failed to write PDF report to {}", path.display()))?;
    println!(
        "{}",
        format_success(&format!("PDF report written to {}", path.display()))
    );
    Ok(())
}

async fn cmd_stats(config: &Config) -> Result<()> {
    info!("Gathering statistics");

    let index = open_index(config).await?;
    let registry = open_registry(config).await?;
    let sessions = open_sessions(config).await?;

    let indexed = index.count(None).await?;

    println!("{}", format_heading("Statistics"));
    println!("Index: {} (table '{}')", index.uri(), index.table_name());
    println!("Indexed chunks: {}", format_count(indexed));
    println!("Documents: {}", registry.len());
    println!("Registered chunks: {}", format_count(registry.total_chunks()));
    println!("Chat sessions: {}", sessions.len());
    if let Some(active) = registry.active() {
        println!("Active document: {}", active.doc_id);
    }

    if indexed != registry.total_chunks() {
        warn!(
            "Index holds {} chunks but the registry expects {}",
            indexed,
            registry.total_chunks()
        );
    }

    Ok(())
}

async fn cmd_health(config: &Config) -> Result<()> {
    let mut checks = Vec::new();

    let start = Instant::now();
    let probe = match LanceDbClient::new(config.database.clone(), config.embedding.dimension).await {
        Ok(client) => match client.ping().await {
            Ok(true) => SchemaManager::new(&client)
                .verify_schema()
                .await
                .map_err(|e| e.to_string()),
            Ok(false) => Err("Ping failed".to_string()),
            Err(e) => Err(e.to_string()),
        },
        Err(e) => Err(e.to_string()),
    };
    checks.push(HealthCheck::from_probe("lancedb", probe, start.elapsed()));

    let start = Instant::now();
    let probe = GroqClient::from_config(&config.llm).map(|_| ());
    checks.push(HealthCheck::from_probe("llm", probe, start.elapsed()));

    let start = Instant::now();
    let embedder = Embedder::from_config(&config.embedding);
    match embedder.embed("health check").await {
        Ok(vector) if vector.len() == embedder.dimension() => {
            if embedder.provider_name() == "remote" {
                checks.push(HealthCheck::healthy("embeddings", start.elapsed()));
            } else {
                checks.push(HealthCheck::degraded(
                    "embeddings",
                    "Using local trigram embeddings".to_string(),
                    start.elapsed(),
                ));
            }
        }
        Ok(vector) => checks.push(HealthCheck::unhealthy(
            "embeddings",
            format!("Unexpected dimension {}", vector.len()),
            start.elapsed(),
        )),
        Err(e) => checks.push(HealthCheck::unhealthy(
            "embeddings",
            e.to_string(),
            start.elapsed(),
        )),
    }

    let start = Instant::now();
    let probe = open_registry(config)
        .await
        .map(|_| ())
        .map_err(|e| format!("{:#}", e));
    checks.push(HealthCheck::from_probe("state", probe, start.elapsed()));

    let report = HealthReport::new(checks, env!("CARGO_PKG_VERSION").to_string());
    println!("{}", report.format());
    Ok(())
}

async fn cmd_reset(config: &Config, confirm: bool) -> Result<()> {
    if !confirm {
        error!("This will delete all data. Use --confirm to proceed");
        return Ok(());
    }

    warn!("Resetting index and registry - all data will be lost");

    let index = connect_index(config).await?;
    index.clear().await.context("Failed to drop tables")?;
    info!("All tables dropped");

    let mut registry = open_registry(config).await?;
    registry.clear();
    registry.save().await?;

    println!("{}", format_success("Index and document registry reset"));
    Ok(())
}
