//! Hand Cricket CLI
//!
//! Plays a full two-innings match against the seeded opponent, sourcing
//! the player's digits from recorded frames, synthetic frames or typed
//! digits, and records feedback corrections.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hc_core::{
    Config, Digit, DumpExtractor, FeedbackStore, Frame, FrameSource, GesturePipeline,
    LandmarkExtractor, MatchState, ModelStore, Opponent, Outcome, Phase, RecordedFrames,
    ServingModel, SyntheticExtractor, TurnEngine,
};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "hc_cli")]
#[command(about = "Gesture-driven hand cricket", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one match
    Play {
        /// Config file (defaults when omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Opponent seed, for replayable matches
        #[arg(long)]
        seed: Option<u64>,

        /// Recorded frames file (JSON array of landmark dumps)
        #[arg(long, conflicts_with = "synthetic")]
        frames: Option<PathBuf>,

        /// Draw the player's frames synthetically instead of typing digits
        #[arg(long, default_value = "false")]
        synthetic: bool,
    },

    /// Record a correction for a misclassified image
    Feedback {
        /// Config file (defaults when omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Image file the prediction was made on
        #[arg(long)]
        image: PathBuf,

        /// What the classifier predicted, if anything
        #[arg(long)]
        predicted: Option<u8>,

        /// The correct digit
        #[arg(long)]
        correct: u8,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Play { config, seed, frames, synthetic } => {
            let config = Config::load_or_default(config.as_deref())
                .context("failed to load config")?;
            play(&config, seed, frames, synthetic)
        }
        Commands::Feedback { config, image, predicted, correct } => {
            let config = Config::load_or_default(config.as_deref())
                .context("failed to load config")?;
            feedback(&config, &image, predicted, correct)
        }
    }
}

/// Where the player's digits come from.
enum PlayerInput {
    Frames(Box<dyn FrameSource>),
    Typed,
}

fn play(config: &Config, seed: Option<u64>, frames: Option<PathBuf>, synthetic: bool) -> Result<()> {
    let store = ModelStore::new(&config.model_dir);
    let serving = Arc::new(
        ServingModel::from_store(&store)
            .context("no serving model; run `hc_trainer retrain` first")?,
    );

    let extractor: Box<dyn LandmarkExtractor> = if synthetic {
        Box::new(SyntheticExtractor)
    } else {
        Box::new(DumpExtractor)
    };
    let pipeline = GesturePipeline::new(extractor, serving);

    let mut input = match (frames, synthetic) {
        (Some(path), _) => PlayerInput::Frames(Box::new(
            RecordedFrames::load(&path).context("failed to load recorded frames")?,
        )),
        (None, true) => PlayerInput::Frames(Box::new(SyntheticSource::new(seed.unwrap_or(0)))),
        (None, false) => PlayerInput::Typed,
    };

    let mut opponent = match seed {
        Some(seed) => Opponent::from_seed(seed),
        None => Opponent::from_entropy(),
    };

    let mut engine = TurnEngine::new();
    engine.start();
    println!("You bat first. Matching digits and you're out!\n");

    while engine.state().phase != Phase::Complete {
        let Some(player) = next_player_digit(&pipeline, &mut input)? else {
            println!("\nOut of frames, match abandoned.");
            return Ok(());
        };
        let bowled = opponent.bowl();
        let state = engine.advance(player, bowled);
        print_ball(player, bowled, &state);
    }

    print_result(&engine.state());
    Ok(())
}

/// Classifies frames until one yields a digit; detection misses re-prompt
/// the same ball with the next frame. Typed input just parses digits.
fn next_player_digit(
    pipeline: &GesturePipeline,
    input: &mut PlayerInput,
) -> Result<Option<Digit>> {
    match input {
        PlayerInput::Frames(source) => loop {
            let Some(frame) = source.next_frame() else {
                return Ok(None);
            };
            match pipeline.classify(&frame)? {
                Some(digit) => return Ok(Some(digit)),
                None => println!("No hand detected, showing the next frame..."),
            }
        },
        PlayerInput::Typed => {
            let stdin = std::io::stdin();
            loop {
                print!("Your digit (1-10): ");
                std::io::stdout().flush()?;
                let mut line = String::new();
                if stdin.lock().read_line(&mut line)? == 0 {
                    return Ok(None);
                }
                match line.trim().parse::<u8>().ok().and_then(|v| Digit::new(v).ok()) {
                    Some(digit) => return Ok(Some(digit)),
                    None => println!("Not a digit in 1-10, try again."),
                }
            }
        }
    }
}

fn print_ball(player: Digit, bowled: Digit, state: &MatchState) {
    println!("You: {player} | Opponent: {bowled}");
    match state.phase {
        // a dismissal that lands in the second innings is the innings switch
        Phase::SecondInnings if player == bowled => {
            println!(
                "OUT! You made {}. Opponent needs {} to win.\n",
                state.target.unwrap_or(0),
                state.target.unwrap_or(0) + 1
            );
        }
        _ => println!(
            "   Score: you {} / opponent {}{}\n",
            state.player_runs,
            state.opponent_runs,
            state
                .target
                .map_or_else(String::new, |t| format!(" (target {t})"))
        ),
    }
}

fn print_result(state: &MatchState) {
    println!("--------------------------------");
    println!("Final: you {} / opponent {}", state.player_runs, state.opponent_runs);
    match state.outcome {
        Outcome::PlayerWin => println!("You win!"),
        Outcome::OpponentWin => println!("Opponent wins."),
        Outcome::Tie => println!("It's a tie."),
        Outcome::Pending => println!("Match unfinished."),
    }
}

fn feedback(config: &Config, image: &PathBuf, predicted: Option<u8>, correct: u8) -> Result<()> {
    let corrected = Digit::new(correct)?;
    let predicted = match predicted {
        Some(v) => Some(Digit::new(v)?),
        None => None,
    };

    let bytes = std::fs::read(image)
        .with_context(|| format!("failed to read image: {}", image.display()))?;
    let store = FeedbackStore::open(&config.feedback_dir);
    let id = store.record(&Frame::new(bytes), predicted, corrected)?;

    println!("Feedback recorded: {id}");
    println!("It will be folded in on the next `hc_trainer retrain` run.");
    Ok(())
}

/// Endless synthetic frames: a deterministic sweep through the digits,
/// so `--synthetic` demo matches are replayable with `--seed`.
struct SyntheticSource {
    seed: u64,
    count: u64,
}

impl SyntheticSource {
    fn new(seed: u64) -> Self {
        SyntheticSource { seed, count: 0 }
    }
}

impl FrameSource for SyntheticSource {
    fn next_frame(&mut self) -> Option<Frame> {
        self.count += 1;
        let value = ((self.seed.wrapping_add(self.count * 7)) % 10 + 1) as u8;
        Some(Frame::new(vec![value]))
    }
}
