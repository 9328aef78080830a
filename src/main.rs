use clap::{Args, Parser, Subcommand, ValueEnum};
use std::error::Error;
use std::path::{Path, PathBuf};
use wordflash::approval::{ApprovalGate, TerminalOperator};
use wordflash::cache::MediaCache;
use wordflash::config::{self, ApprovalMode, WordflashConfig};
use wordflash::loader::{self, ListKind};
use wordflash::media::{GoogleTts, SystemPreviewer, WebImageSearch, http_client};
use wordflash::resolve::{MediaResolver, ResolveOptions};
use wordflash::store::WordStore;
use wordflash::workdir::{self, WorkDir};
use wordflash::{analyze, deck, naming, output, package};

#[derive(Parser)]
#[command(name = "wordflash")]
#[command(about = "Turn vocabulary lists and quizzes into Anki decks")]
#[command(long_about = "\
Turn vocabulary lists and quizzes into Anki decks

Every card face can show text, a picture found by web search, and
pronunciation audio. Pictures are previewed one at a time and only the ones
you approve make it into the deck.

Input formats:

  # vocabulary: the front shows a picture of the translation,
  # the back shows and speaks the source word
  words:
    - source: Hund
      target: dog
      gender: masculine
      categories: [animals]
    - Katze: cat

  # quiz: media chosen per side
  quizzes:
    - category: Presidents
      questions:
        - question: Who was the first US president?
          answer: George Washington
          answer_media: { text: true, image: true }

Approval prompt: y = accept, n = next candidate, s = no image for this entry.

Run 'wordflash gen-config' to generate a documented wordflash.toml.")]
#[command(version)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build an Anki package from a list
    Build(BuildArgs),
    /// Load a list and show its categories and entries without building
    Check(CheckArgs),
    /// Report statistics, duplicates and gaps in a vocabulary list
    Analyze(AnalyzeArgs),
    /// List the notes and media of an .apkg file
    Inspect {
        /// Package to read
        package: PathBuf,
    },
    /// Print a stock wordflash.toml with all options documented
    GenConfig,
}

#[derive(Clone, Copy, ValueEnum)]
enum ListType {
    Vocab,
    Quiz,
}

impl From<ListType> for ListKind {
    fn from(t: ListType) -> Self {
        match t {
            ListType::Vocab => ListKind::Vocab,
            ListType::Quiz => ListKind::Quiz,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SearchType {
    Source,
    Target,
    Both,
}

impl From<SearchType> for analyze::SearchField {
    fn from(t: SearchType) -> Self {
        match t {
            SearchType::Source => analyze::SearchField::Source,
            SearchType::Target => analyze::SearchField::Target,
            SearchType::Both => analyze::SearchField::Both,
        }
    }
}

/// Flags shared by commands that load a list.
#[derive(Args)]
struct InputArgs {
    /// YAML word list or quiz
    input: PathBuf,

    /// Config file (default: wordflash.toml next to the input)
    #[arg(long)]
    config: Option<PathBuf>,

    /// List type (default: inferred from the document)
    #[arg(long = "type", value_enum)]
    list_type: Option<ListType>,

    /// Language of source words and questions
    #[arg(long)]
    source_lang: Option<String>,

    /// Language of translations and answers
    #[arg(long)]
    target_lang: Option<String>,
}

#[derive(Args)]
struct BuildArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Deck name (default: derived from the input file name)
    #[arg(long)]
    deck_name: Option<String>,

    /// Directory for the .apkg file
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Take the first image candidate without asking
    #[arg(long)]
    no_image_approval: bool,

    /// Keep downloaded media next to the package
    #[arg(long)]
    keep_media: bool,

    /// Neither read nor update the media cache
    #[arg(long)]
    no_cache: bool,

    /// Do not search for images
    #[arg(long)]
    no_images: bool,

    /// Do not synthesize audio
    #[arg(long)]
    no_audio: bool,
}

#[derive(Args)]
struct CheckArgs {
    #[command(flatten)]
    input: InputArgs,
}

#[derive(Args)]
struct AnalyzeArgs {
    /// YAML vocabulary list (optional with --db)
    #[arg(required_unless_present = "db")]
    input: Option<PathBuf>,

    /// Word store: INPUT is merged into it, then the stored words are analyzed
    #[arg(long)]
    db: Option<PathBuf>,

    /// Show words containing this text
    #[arg(long)]
    search: Option<String>,

    /// Which side --search looks at
    #[arg(long, value_enum, default_value = "both")]
    search_type: SearchType,

    /// Show words in this category
    #[arg(long)]
    category: Option<String>,

    /// Show words with this gender
    #[arg(long)]
    gender: Option<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Build(args) => run_build(args)?,
        Command::Check(args) => {
            let config = load_run_config(&args.input)?;
            let (kind, categories) = loader::load_categories(
                &args.input.input,
                args.input.list_type.map(ListKind::from),
                &config.languages,
                &config.vocab,
            )?;
            output::print_check_output(kind, &categories, &args.input.input);
        }
        Command::Analyze(args) => run_analyze(args)?,
        Command::Inspect { package } => {
            let contents = package::read_package(&package)?;
            output::print_inspect_output(&contents);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// Load the config for a list and apply the shared command-line overrides.
fn load_run_config(args: &InputArgs) -> Result<WordflashConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => config::load_config_file(path)?,
        None => config::load_config(input_dir(&args.input))?,
    };
    if let Some(lang) = &args.source_lang {
        config.languages.source = lang.clone();
    }
    if let Some(lang) = &args.target_lang {
        config.languages.target = lang.clone();
    }
    config.validate()?;
    Ok(config)
}

fn input_dir(input: &Path) -> &Path {
    match input.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

fn run_build(args: BuildArgs) -> Result<(), Box<dyn Error>> {
    let mut config = load_run_config(&args.input)?;
    if let Some(name) = args.deck_name {
        config.deck.name = Some(name);
    }
    if let Some(dir) = &args.output_dir {
        config.deck.output_dir = dir.to_string_lossy().into_owned();
    }
    if args.no_image_approval {
        config.approval.mode = ApprovalMode::Auto;
    }
    config.deck.keep_media |= args.keep_media;
    config.cache.enabled &= !args.no_cache;
    config.images.enabled &= !args.no_images;
    config.audio.enabled &= !args.no_audio;
    config.validate()?;

    let input = &args.input.input;
    let (kind, categories) = loader::load_categories(
        input,
        args.input.list_type.map(ListKind::from),
        &config.languages,
        &config.vocab,
    )?;
    let name = deck::deck_name(config.deck.name.as_deref(), input);
    log::info!("Building {} deck '{}' from {}", kind, name, input.display());

    let output_dir = PathBuf::from(&config.deck.output_dir);
    std::fs::create_dir_all(&output_dir)?;
    workdir::sweep_stale(&output_dir)?;
    workdir::install_interrupt_cleanup()?;
    let package_path = output_dir.join(naming::package_filename(&name));
    let work = if config.deck.keep_media {
        WorkDir::persistent(kept_media_dir(&package_path))?
    } else {
        WorkDir::scoped_in(&output_dir)?
    };

    let search = WebImageSearch::new(http_client(config.images.timeout_secs)?, &config.images);
    let speech = GoogleTts::new(http_client(config.audio.timeout_secs)?, config.audio.slow);
    let previewer = SystemPreviewer::new(config.approval.viewer.clone());
    let gate = match config.approval.mode {
        ApprovalMode::Interactive => ApprovalGate::new(
            ApprovalMode::Interactive,
            &previewer,
            Box::new(TerminalOperator),
        ),
        ApprovalMode::Auto => ApprovalGate::auto(),
    };

    let mut cache = if config.cache.enabled {
        match MediaCache::open(PathBuf::from(&config.cache.dir)) {
            Ok(cache) => Some(cache),
            Err(e) => {
                log::warn!("Media cache unavailable, continuing without it: {}", e);
                None
            }
        }
    } else {
        None
    };

    println!("==> Building '{}' from {}", name, input.display());
    let report = {
        let mut resolver = MediaResolver::new(&search, &speech, gate, &work)
            .with_options(ResolveOptions::from_config(&config));
        if let Some(cache) = cache.as_mut() {
            resolver = resolver.with_cache(cache);
        }
        deck::build(
            &name,
            &categories,
            &mut resolver,
            &config.languages,
            |event| output::print_build_event(&event),
        )
    };

    if let Some(cache) = &cache
        && let Err(e) = cache.save()
    {
        log::warn!("Could not save media cache: {}", e);
    }

    let summary = package::write_package(&report.deck, &package_path)?;
    output::print_build_summary(
        &summary,
        &report.warnings,
        cache.as_ref().map(MediaCache::stats),
    );
    if !work.is_scoped() {
        println!("Media kept in {}", work.path().display());
    }
    Ok(())
}

/// `output/animals_de.apkg` keeps its media in `output/animals_de_media/`.
fn kept_media_dir(package_path: &Path) -> PathBuf {
    let stem = package_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    package_path.with_file_name(format!("{stem}_media"))
}

fn run_analyze(args: AnalyzeArgs) -> Result<(), Box<dyn Error>> {
    let (words, source) = match (&args.db, &args.input) {
        (Some(db), input) => {
            let mut store = WordStore::open(db)?;
            if let Some(input) = input {
                let summary = store.upsert_all(&loader::load_vocabulary(input)?)?;
                output::print_store_update(&summary, store.word_count()?, db);
            }
            (store.words()?, db.clone())
        }
        (None, Some(input)) => (loader::load_vocabulary(input)?, input.clone()),
        (None, None) => return Err("an input list or --db is required".into()),
    };
    let merged = analyze::merge_words(&words);

    let mut filtered = false;
    if let Some(query) = &args.search {
        let hits = analyze::search(&merged, query, args.search_type.into());
        output::print_word_list(&format!("Search results for '{query}'"), &hits);
        filtered = true;
    }
    if let Some(category) = &args.category {
        let hits = analyze::by_category(&merged, category);
        output::print_word_list(&format!("Words in category '{category}'"), &hits);
        filtered = true;
    }
    if let Some(gender) = &args.gender {
        let hits = analyze::by_gender(&merged, gender);
        output::print_word_list(&format!("Words with gender '{gender}'"), &hits);
        filtered = true;
    }
    if !filtered {
        output::print_analysis(&analyze::analyze(&words), &source);
    }
    Ok(())
}
