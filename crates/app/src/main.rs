use std::error::Error;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use services::{
    Clock, CurriculumService, HttpTextGenerator, QuizRun, StudyRun, WordOrigin, WordSource,
};
use storage::repository::Storage;
use storage::snapshot::SnapshotRepository;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vocab_core::Curriculum;
use vocab_core::diagnostic::{DiagnosticRun, DifficultyBand};
use vocab_core::due::{learned_count, partition_due};
use vocab_core::model::{LevelId, LevelTier, PASS_THRESHOLD, SessionReport, UnlockStatus};
use vocab_core::progression::{SessionCompletion, SessionRef};

mod args;
mod seed;
mod terminal;

use args::{Args, Command, Parsed, prepare_sqlite_file, print_usage};
use terminal::Terminal;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"));
    let Ok(filter) = filter else {
        return;
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Everything a command needs, wired once at startup.
struct App {
    clock: Clock,
    curriculum: CurriculumService,
    words: WordSource,
    seed: Option<u64>,
}

impl App {
    fn rng(&self) -> StdRng {
        self.seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64)
    }
}

/// Resolve `--level`/`--session` against the curriculum.
///
/// Missing parts default to the entry point; a level without a session
/// starts at its first session.
fn resolve_target(
    curriculum: &Curriculum,
    level: Option<LevelId>,
    session: Option<usize>,
) -> Result<SessionRef, Box<dyn Error>> {
    let entry = curriculum.entry_point();
    let target = match (level, session) {
        (Some(level), session) => SessionRef::new(level, session.map_or(0, |n| n - 1)),
        (None, Some(n)) => {
            let level = entry.map_or(LevelId::FIRST, |at| at.level);
            SessionRef::new(level, n - 1)
        }
        (None, None) => entry.ok_or("every session is completed; run `reset` to start over")?,
    };

    curriculum.session(target)?;
    if !curriculum.can_start(target) {
        return Err(format!(
            "level {} session {} is locked",
            target.level,
            target.index + 1
        )
        .into());
    }
    Ok(target)
}

fn status_symbol(status: UnlockStatus) -> &'static str {
    match status {
        UnlockStatus::Locked => "locked",
        UnlockStatus::Unlocked => "open",
        UnlockStatus::Completed => "done",
    }
}

//
// ─── COMMANDS ──────────────────────────────────────────────────────────────────
//

async fn show_status<R: BufRead, W: Write>(
    app: &App,
    term: &mut Terminal<R, W>,
) -> Result<(), Box<dyn Error>> {
    let curriculum = app.curriculum.load().await?;
    let words: Vec<_> = curriculum.all_words().cloned().collect();
    let now = app.clock.now();

    for level in curriculum.levels() {
        let tier = LevelTier::for_level(level.id());
        term.say(format!(
            "Level {:>3} [{:<6}] {:<12} {}/{} sessions",
            level.id().value(),
            status_symbol(level.status()),
            tier.label(),
            level.completed_sessions(),
            level.sessions().len(),
        ))?;
    }

    term.say("")?;
    match curriculum.entry_point() {
        Some(at) => term.say(format!(
            "Next up: level {} session {}",
            at.level,
            at.index + 1
        ))?,
        None => term.say("Every unlocked session is completed.")?,
    }
    term.say(format!(
        "Learned: {}/{} words, due now: {}",
        learned_count(&words),
        words.len(),
        curriculum.due_words(now).len(),
    ))?;
    Ok(())
}

async fn run_study<R: BufRead, W: Write>(
    app: &App,
    term: &mut Terminal<R, W>,
    args: &Args,
) -> Result<(), Box<dyn Error>> {
    let mut curriculum = app.curriculum.load().await?;
    let target = resolve_target(&curriculum, args.level, args.session)?;
    let batch = app.words.session_words(curriculum.session(target)?).await;
    announce(term, target, batch.origin)?;

    let mut run = StudyRun::new(target, batch.words, app.clock.now())?;
    while let Some(word) = run.current().cloned() {
        let progress = run.progress();
        term.say(format!(
            "\n[{}/{}] {}",
            progress.position(),
            progress.total,
            word.word()
        ))?;
        if !term.wait_for_enter("Press enter to reveal... ")? {
            term.say("Study stopped; progress on rated words was kept.")?;
            return Ok(());
        }
        term.say(format!("  {}", word.definition()))?;
        term.say(format!("  \"{}\"", word.example()))?;

        let Some(known) = term.ask_yes_no("Did you know it?")? else {
            term.say("Study stopped; progress on rated words was kept.")?;
            return Ok(());
        };
        run.rate(known, app.clock.now())?;
        app.curriculum
            .record_rating(&mut curriculum, run.session(), word.id(), known)
            .await?;
    }

    let report = run.finish(app.clock.now())?;
    print_report(term, &report)?;
    let completion = app
        .curriculum
        .complete_session(&mut curriculum, target, &report)
        .await?;
    print_completion(term, &report, &completion)
}

async fn run_quiz<R: BufRead, W: Write>(
    app: &App,
    term: &mut Terminal<R, W>,
    args: &Args,
) -> Result<(), Box<dyn Error>> {
    let curriculum = app.curriculum.load().await?;
    let target = resolve_target(&curriculum, args.level, args.session)?;
    let batch = app.words.session_words(curriculum.session(target)?).await;
    announce(term, target, batch.origin)?;

    let mut rng = app.rng();
    let mut run = QuizRun::new(batch.words, app.clock.now())?;
    loop {
        let progress = run.progress();
        let Some(question) = run.question(&mut rng)? else {
            break;
        };
        let word = question.word.word().to_string();
        let ids: Vec<_> = question.options.iter().map(|w| w.id().clone()).collect();
        let labels: Vec<String> = question
            .options
            .iter()
            .map(|w| w.definition().to_string())
            .collect();

        term.say(format!(
            "\n[{}/{}] What does \"{word}\" mean?",
            progress.position(),
            progress.total
        ))?;
        let Some(pick) = term.choose(&labels)? else {
            term.say("Quiz stopped.")?;
            return Ok(());
        };
        let answer = run.answer(&ids[pick])?;
        if answer.correct {
            term.say("Correct!")?;
        } else if let Some(right) = ids.iter().position(|id| *id == answer.expected) {
            term.say(format!("Not quite. It means: {}", labels[right]))?;
        }
    }

    let report = run.finish(app.clock.now())?;
    print_report(term, &report)?;
    Ok(())
}

async fn run_diagnostic<R: BufRead, W: Write>(
    app: &App,
    term: &mut Terminal<R, W>,
) -> Result<(), Box<dyn Error>> {
    let mut curriculum = app.curriculum.load().await?;
    let batch = app.words.diagnostic_words(&curriculum).await;
    if !batch.is_generated() {
        term.say("Using built-in words for the placement test.")?;
    }

    let mut run = DiagnosticRun::new(batch.words)?;
    let mut recommended = None;
    while let Some(word) = run.current().cloned() {
        term.say(format!(
            "\n[{}/{} · {}%] {} ({})",
            run.step(),
            run.len(),
            run.progress_percent(),
            word.word(),
            DifficultyBand::for_difficulty(word.difficulty()).label(),
        ))?;
        let Some(known) = term.ask_yes_no("Do you know this word?")? else {
            term.say("Placement test stopped; nothing was changed.")?;
            return Ok(());
        };
        recommended = run.answer(known)?;
    }

    let level = recommended.unwrap_or_else(|| run.recommendation());
    let unlocked = app.curriculum.apply_diagnostic(&mut curriculum, level).await?;
    term.say(format!(
        "\nRecommended start: level {level} ({})",
        LevelTier::for_level(level).label()
    ))?;
    if !unlocked.is_empty() {
        term.say(format!("Unlocked {} level(s).", unlocked.len()))?;
    }
    Ok(())
}

async fn list_due<R: BufRead, W: Write>(
    app: &App,
    term: &mut Terminal<R, W>,
) -> Result<(), Box<dyn Error>> {
    let curriculum = app.curriculum.load().await?;
    let words: Vec<_> = curriculum.all_words().cloned().collect();
    let (due, later) = partition_due(&words, app.clock.now());
    let pending: Vec<_> = due.iter().filter(|w| w.next_review().is_some()).collect();
    term.say(format!(
        "{} words due ({} scheduled reviews, {} never studied), {} scheduled later",
        due.len(),
        pending.len(),
        due.len() - pending.len(),
        later.len()
    ))?;
    for word in pending {
        term.say(format!("  {:<16} box {}", word.word(), word.level()))?;
    }
    Ok(())
}

async fn reset<R: BufRead, W: Write>(
    app: &App,
    term: &mut Terminal<R, W>,
) -> Result<(), Box<dyn Error>> {
    if term.ask_yes_no("Erase all progress?")? != Some(true) {
        term.say("Nothing changed.")?;
        return Ok(());
    }
    let curriculum = app.curriculum.reset().await?;
    term.say(format!(
        "Progress erased. {} levels ready.",
        curriculum.levels().len()
    ))?;
    Ok(())
}

//
// ─── OUTPUT ────────────────────────────────────────────────────────────────────
//

fn announce<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    at: SessionRef,
    origin: WordOrigin,
) -> io::Result<()> {
    let source = match origin {
        WordOrigin::Generated => "fresh words",
        WordOrigin::Static => "session words",
    };
    term.say(format!(
        "Level {} session {} ({source})",
        at.level,
        at.index + 1
    ))
}

fn print_report<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    report: &SessionReport,
) -> io::Result<()> {
    term.say(format!(
        "\nScore: {}/{} ({}%) in {}s",
        report.score(),
        report.total(),
        report.percentage(),
        report.time_spent_secs()
    ))?;
    if !report.troublesome_words().is_empty() {
        let words: Vec<&str> = report.troublesome_words().iter().map(|w| w.word()).collect();
        term.say(format!("Review again: {}", words.join(", ")))?;
    }
    Ok(())
}

fn print_completion<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    report: &SessionReport,
    completion: &SessionCompletion,
) -> Result<(), Box<dyn Error>> {
    if !report.passed() {
        term.say(format!(
            "Score at least {:.0}% to unlock the next session.",
            PASS_THRESHOLD * 100.0
        ))?;
        return Ok(());
    }
    if let Some(at) = completion.unlocked_session {
        term.say(format!(
            "Unlocked level {} session {}.",
            at.level,
            at.index + 1
        ))?;
    }
    if let Some(level) = completion.completed_level {
        term.say(format!("Level {level} complete!"))?;
    }
    if let Some(level) = completion.unlocked_level {
        term.say(format!("Level {level} is now open."))?;
    }
    Ok(())
}

//
// ─── ENTRY ─────────────────────────────────────────────────────────────────────
//

async fn run() -> Result<(), Box<dyn Error>> {
    let parsed = Args::parse(std::env::args().skip(1), std::env::var("VOCAB_DB_URL").ok())
        .inspect_err(|e| {
            eprintln!("{e}");
            print_usage();
        })?;
    let args = match parsed {
        Parsed::Help => {
            print_usage();
            return Ok(());
        }
        Parsed::Run(args) => args,
    };

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&args.db_url)?;
    let storage = Storage::sqlite(&args.db_url).await?;

    let clock = Clock::system();
    let curriculum = CurriculumService::new(
        clock,
        Arc::clone(&storage.snapshots),
        seed::starter_vocabulary()?,
    )?
    .with_seed(args.seed);
    let generator = HttpTextGenerator::from_env();
    if !generator.enabled() {
        info!("VOCAB_AI_URL is not set; using built-in words");
    }
    let words = WordSource::new(
        clock,
        Arc::new(generator),
        SnapshotRepository::new(Arc::clone(&storage.snapshots)),
    );
    let app = App {
        clock,
        curriculum,
        words,
        seed: args.seed,
    };

    let stdin = io::stdin();
    let mut term = Terminal::new(stdin.lock(), io::stdout().lock());
    match args.command {
        Command::Status => show_status(&app, &mut term).await,
        Command::Study => run_study(&app, &mut term, &args).await,
        Command::Quiz => run_quiz(&app, &mut term, &args).await,
        Command::Diagnostic => run_diagnostic(&app, &mut term).await,
        Command::Due => list_due(&app, &mut term).await,
        Command::Reset => reset(&app, &mut term).await,
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
