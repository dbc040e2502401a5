use clap::Parser;
use minesweeper_agent::{Board, KnowledgeBase, MoveSelector, Point};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::thread;
use std::time::Duration;
use tracing::{Level, info, warn};

/// Plays a game of Minesweeper with the knowledge-based agent.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Board height in rows
    #[arg(long, default_value_t = 8)]
    height: usize,

    /// Board width in columns
    #[arg(long, default_value_t = 8)]
    width: usize,

    /// Number of mines to plant
    #[arg(long, default_value_t = 8)]
    mines: usize,

    /// Seed for both the board and the agent's guesses
    #[arg(long)]
    seed: Option<u64>,

    /// Pause between moves, in milliseconds
    #[arg(long, default_value_t = 0)]
    delay_ms: u64,

    /// Log every deduction
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Won,
    Lost,
    Stuck,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .init();

    // --- 1. Initialization ---
    let (mut rng, mut selector) = match args.seed {
        Some(seed) => (StdRng::seed_from_u64(seed), MoveSelector::seeded(seed)),
        None => (StdRng::from_os_rng(), MoveSelector::new()),
    };
    let mut board = Board::random(args.height, args.width, args.mines, &mut rng)?;
    let mut kb = KnowledgeBase::new(args.height, args.width, args.mines);

    info!(
        "Playing a {}x{} board with {} mines",
        args.height, args.width, args.mines
    );
    println!("--- Knowledge-Based Minesweeper Agent ---");
    println!("Strategy: play proven safe cells, otherwise the least risky guess.");

    // --- 2. Game Loop ---
    let mut move_count = 0;
    let mut all_found = false;
    let outcome = loop {
        // --- 3. Agent's Decision ---
        let point = match selector.make_safe_move(&kb) {
            Some(point) => {
                info!("Safe move at {}", point);
                point
            }
            None => match selector.make_guess_move(&kb) {
                Some(point) => {
                    info!("No known safe move, guessing {}", point);
                    point
                }
                None => break Outcome::Stuck,
            },
        };

        move_count += 1;
        println!("\n--- Move #{} ---", move_count);

        // --- 4. Execute the Chosen Move ---
        if board.is_mine(point) {
            warn!("Hit a mine at {}", point);
            break Outcome::Lost;
        }

        let count = board.nearby_mines(point);
        kb.observe(point, count)?;

        for &mine in kb.known_mines() {
            board.flag(mine);
        }
        if !all_found && kb.all_mines_found() {
            all_found = true;
            info!("All {} mines found", kb.total_mines());
        }

        print_board(&board, &kb);

        if board.won() {
            break Outcome::Won;
        }

        if args.delay_ms > 0 {
            thread::sleep(Duration::from_millis(args.delay_ms));
        }
    };

    // --- 5. Final Result ---
    println!("\n--- Game Over ---");
    print_board(&board, &kb);

    match outcome {
        Outcome::Won => println!("Result: The agent flagged every mine and won!"),
        Outcome::Lost => println!("Result: The agent hit a mine and lost."),
        Outcome::Stuck => println!("Result: The agent ran out of moves."),
    }
    println!(
        "Moves: {}, mines known: {}/{}",
        move_count,
        kb.known_mines().len(),
        board.mine_count()
    );

    Ok(())
}

fn print_board(board: &Board, kb: &KnowledgeBase) {
    // Print header
    print!("   ");
    for col in 0..board.width {
        print!("{:^3}", col);
    }
    println!("\n  +{}", "---".repeat(board.width));

    // Print rows
    for row in 0..board.height {
        print!("{:^2}|", row);
        for col in 0..board.width {
            let point = Point::new(row, col);
            let display = if board.is_flagged(point) {
                " ⚑ ".to_string()
            } else if kb.moves_made().contains(&point) {
                format!(" {} ", board.nearby_mines(point))
            } else {
                " ■ ".to_string()
            };
            print!("{}", display);
        }
        println!();
    }
    println!();
}
